//! Build triggers for the CLI
//!
//! `LogTrigger` reports each flush; `ExecTrigger` runs a user-supplied shell
//! command with `{config}` and `{file}` substituted.

use std::path::Path;
use std::process::Command;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use watcher::BuildTrigger;

/// Pick the trigger for the given `--exec` argument.
pub fn from_exec(exec: Option<String>) -> Arc<dyn BuildTrigger> {
    match exec {
        Some(template) => Arc::new(ExecTrigger { template }),
        None => Arc::new(LogTrigger),
    }
}

/// Logs each flushed change.
pub struct LogTrigger;

impl BuildTrigger for LogTrigger {
    fn source_file_changed(&self, config: Option<&Path>, path: &Path) -> Result<()> {
        match config {
            Some(config) => info!(
                "Source file changed: {} (config {})",
                path.display(),
                config.display()
            ),
            None => info!("Source file changed: {}", path.display()),
        }
        Ok(())
    }
}

/// Runs a shell command per flushed change.
pub struct ExecTrigger {
    template: String,
}

impl ExecTrigger {
    fn render(&self, config: Option<&Path>, path: &Path) -> String {
        let config = config.map(|c| c.display().to_string()).unwrap_or_default();
        self.template
            .replace("{config}", &config)
            .replace("{file}", &path.display().to_string())
    }
}

impl BuildTrigger for ExecTrigger {
    fn source_file_changed(&self, config: Option<&Path>, path: &Path) -> Result<()> {
        let command = self.render(config, path);
        let status = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .status()
            .with_context(|| format!("spawning `{}`", command))?;
        if !status.success() {
            bail!("`{}` exited with {}", command, status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_placeholders() {
        let trigger = ExecTrigger {
            template: "bundle --config {config} {file}".to_string(),
        };

        let rendered = trigger.render(
            Some(Path::new("proj/bundleconfig.json")),
            Path::new("proj/js/site.js"),
        );
        assert_eq!(
            rendered,
            "bundle --config proj/bundleconfig.json proj/js/site.js"
        );
    }

    #[test]
    fn test_render_with_unknown_config() {
        let trigger = ExecTrigger {
            template: "rebuild {file} ({config})".to_string(),
        };

        let rendered = trigger.render(None, Path::new("a.css"));
        assert_eq!(rendered, "rebuild a.css ()");
    }

    #[test]
    fn test_exec_trigger_runs_command() {
        let trigger = ExecTrigger {
            template: "true".to_string(),
        };
        assert!(trigger.source_file_changed(None, Path::new("a.js")).is_ok());

        let trigger = ExecTrigger {
            template: "false".to_string(),
        };
        assert!(trigger.source_file_changed(None, Path::new("a.js")).is_err());
    }
}
