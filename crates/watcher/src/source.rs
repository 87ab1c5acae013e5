//! Per-project file watching
//!
//! One recursive watcher per project root, started when a project with a
//! bundler config becomes active and dropped when the project goes away.
//! Events pass through the change filter and land in the coalescer tagged
//! with the owning project's config file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use notify::{recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::coalesce::ChangeCoalescer;
use crate::filter::ChangeFilter;

/// Registry of active per-project watchers, keyed by project root.
pub struct ProjectWatchers {
    coalescer: Arc<ChangeCoalescer>,
    filter: Arc<ChangeFilter>,
    watchers: Mutex<HashMap<PathBuf, RecommendedWatcher>>,
}

impl ProjectWatchers {
    pub fn new(coalescer: Arc<ChangeCoalescer>, filter: ChangeFilter) -> Self {
        Self {
            coalescer,
            filter: Arc::new(filter),
            watchers: Mutex::new(HashMap::new()),
        }
    }

    /// Start watching `root`, tagging its changes with `config_path`.
    ///
    /// Projects without an existing config file are refused; the bundler only
    /// activates configured projects. Returns `false` if `root` is already
    /// being watched.
    pub fn add_project(&self, root: &Path, config_path: &Path) -> Result<bool> {
        let mut watchers = self.watchers.lock();
        if watchers.contains_key(root) {
            return Ok(false);
        }

        if !config_path.is_file() {
            bail!("bundler config {} does not exist", config_path.display());
        }

        let coalescer = Arc::clone(&self.coalescer);
        let filter = Arc::clone(&self.filter);
        let config = config_path.to_path_buf();

        let mut watcher = recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) => {
                    if !event.kind.is_modify() && !event.kind.is_create() {
                        return;
                    }
                    for path in event.paths {
                        if filter.is_relevant(&path) {
                            coalescer.notify(path, Some(config.clone()));
                        }
                    }
                }
                Err(e) => warn!("Watch error: {}", e),
            }
        })
        .context("creating file watcher")?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("watching {}", root.display()))?;

        info!("Watching project {}", root.display());
        watchers.insert(root.to_path_buf(), watcher);
        Ok(true)
    }

    /// Stop watching `root`. No-op for unknown roots.
    pub fn remove_project(&self, root: &Path) {
        if self.watchers.lock().remove(root).is_some() {
            debug!("Stopped watching project {}", root.display());
        }
    }

    /// Drop all watchers (host shutdown / solution closing).
    pub fn clear(&self) {
        self.watchers.lock().clear();
    }

    /// Number of projects currently being watched.
    pub fn watched_count(&self) -> usize {
        self.watchers.lock().len()
    }
}
