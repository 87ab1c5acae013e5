//! Upstream change filtering
//!
//! Decides which file-change events are worth coalescing at all. Editor temp
//! files, minified outputs, vendor directories, and files the bundler cannot
//! process never reach the coalescer.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// File extensions the bundler accepts as inputs.
const SUPPORTED_EXTENSIONS: &[&str] = &["js", "css", "html", "htm", "json"];

/// Package-manager directories whose contents are never bundler inputs.
const VENDOR_DIRS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// Filters raw file-change events before they reach the coalescer.
pub struct ChangeFilter {
    config: FilterConfig,
}

impl ChangeFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// True if a change to `path` should be queued for a rebuild.
    pub fn is_relevant(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };

        // Editors save through `~`-suffixed temp files; `.min.` marks the
        // bundler's own output.
        if file_name.contains('~') || file_name.contains(".min.") {
            return false;
        }

        if self.config.supported_extensions_only && !has_supported_extension(path) {
            return false;
        }

        !self.in_vendor_dir(path)
    }

    /// Check path components against built-in and configured vendor
    /// directory names, case-insensitively.
    fn in_vendor_dir(&self, path: &Path) -> bool {
        path.components().any(|component| {
            let Some(name) = component.as_os_str().to_str() else {
                return false;
            };
            VENDOR_DIRS.iter().any(|dir| name.eq_ignore_ascii_case(dir))
                || self
                    .config
                    .extra_vendor_dirs
                    .iter()
                    .any(|dir| name.eq_ignore_ascii_case(dir))
        })
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// Filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Only pass files the bundler supports (default: true)
    #[serde(default = "default_true")]
    pub supported_extensions_only: bool,

    /// Additional vendor directory names to exclude
    #[serde(default)]
    pub extra_vendor_dirs: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            supported_extensions_only: true,
            extra_vendor_dirs: vec![],
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_files_pass() {
        let filter = ChangeFilter::new(FilterConfig::default());

        assert!(filter.is_relevant(Path::new("wwwroot/js/site.js")));
        assert!(filter.is_relevant(Path::new("wwwroot/css/site.css")));
        assert!(filter.is_relevant(Path::new("views/index.html")));
        assert!(filter.is_relevant(Path::new("data/menu.json")));
        assert!(filter.is_relevant(Path::new("PAGES/ABOUT.HTM")));
    }

    #[test]
    fn test_temp_and_minified_files_rejected() {
        let filter = ChangeFilter::new(FilterConfig::default());

        // VS writes temp files with ~ in the name during saves
        assert!(!filter.is_relevant(Path::new("wwwroot/js/site.js~RF1a2b3c.TMP")));
        assert!(!filter.is_relevant(Path::new("wwwroot/js/~site.js")));

        // Bundler output must not re-trigger the bundler
        assert!(!filter.is_relevant(Path::new("wwwroot/js/site.min.js")));
        assert!(!filter.is_relevant(Path::new("wwwroot/css/site.min.css")));
    }

    #[test]
    fn test_unsupported_extensions_rejected() {
        let filter = ChangeFilter::new(FilterConfig::default());

        assert!(!filter.is_relevant(Path::new("src/Program.cs")));
        assert!(!filter.is_relevant(Path::new("images/logo.png")));
        assert!(!filter.is_relevant(Path::new("README")));
    }

    #[test]
    fn test_vendor_dirs_rejected() {
        let filter = ChangeFilter::new(FilterConfig::default());

        assert!(!filter.is_relevant(Path::new("node_modules/pkg/index.js")));
        assert!(!filter.is_relevant(Path::new("wwwroot/lib/bower_components/a.css")));
        assert!(!filter.is_relevant(Path::new("jspm_packages/npm/b.js")));
        assert!(!filter.is_relevant(Path::new("NODE_MODULES/pkg/index.js")));

        // A vendor name embedded in a longer component is not a match
        assert!(filter.is_relevant(Path::new("my_node_modules_notes/a.js")));
    }

    #[test]
    fn test_extra_vendor_dirs() {
        let filter = ChangeFilter::new(FilterConfig {
            supported_extensions_only: true,
            extra_vendor_dirs: vec!["vendor".to_string()],
        });

        assert!(!filter.is_relevant(Path::new("vendor/lib/a.js")));
        assert!(filter.is_relevant(Path::new("src/a.js")));
    }

    #[test]
    fn test_extension_check_can_be_disabled() {
        let filter = ChangeFilter::new(FilterConfig {
            supported_extensions_only: false,
            extra_vendor_dirs: vec![],
        });

        assert!(filter.is_relevant(Path::new("src/styles.scss")));
        assert!(!filter.is_relevant(Path::new("src/styles.min.scss")));
    }
}
