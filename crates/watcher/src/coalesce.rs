//! Per-path change coalescing
//!
//! Rapid bursts of file changes (a build tool rewriting dozens of files)
//! collapse into one rebuild notification per path, emitted once the path has
//! been quiet for the configured interval.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Downstream build trigger invoked once per flushed path.
///
/// This is a one-way notification: the coalescer logs a returned error and
/// removes the entry regardless. Retries, if wanted, belong inside the
/// trigger.
pub trait BuildTrigger: Send + Sync {
    /// Called with the owning project's config file (if known) and the
    /// changed source file.
    fn source_file_changed(&self, config: Option<&Path>, path: &Path) -> anyhow::Result<()>;
}

/// One file awaiting processing.
#[derive(Debug, Clone)]
struct PendingChange {
    /// Owning project's config file, replaced on re-notification.
    config: Option<PathBuf>,

    /// Most recent observed change to this path.
    last_seen: Instant,
}

/// Debounced per-path change queue.
///
/// `notify` upserts into a concurrent pending map; a single sweep task flushes
/// entries that have been idle for the full quiet interval, then forgets them.
/// A path that keeps changing is never flushed until changes stop for one
/// whole interval, measured from the latest change.
pub struct ChangeCoalescer {
    pending: Arc<DashMap<PathBuf, PendingChange>>,

    /// Debounce delay; also the sweep frequency.
    quiet_interval: Duration,

    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl ChangeCoalescer {
    /// Create a coalescer with the given quiet interval.
    pub fn new(quiet_interval: Duration) -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            quiet_interval,
            sweeper: Mutex::new(None),
        }
    }

    /// Record that `path` changed under the project described by `config`.
    ///
    /// Fast, non-blocking upsert; safe to call from any thread, including a
    /// file-watcher event callback. Re-notifying a pending path refreshes its
    /// timestamp and replaces its config rather than queueing a duplicate.
    /// Empty paths are ignored.
    pub fn notify(&self, path: impl Into<PathBuf>, config: Option<PathBuf>) {
        let path = path.into();
        if path.as_os_str().is_empty() {
            debug!("Ignoring change notification with empty path");
            return;
        }

        self.pending.insert(
            path,
            PendingChange {
                config,
                last_seen: Instant::now(),
            },
        );
    }

    /// Spawn the periodic sweep task. No-op if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, trigger: Arc<dyn BuildTrigger>) {
        let mut sweeper = self.sweeper.lock();
        if sweeper.is_some() {
            return;
        }

        let pending = Arc::clone(&self.pending);
        let quiet = self.quiet_interval;

        *sweeper = Some(tokio::spawn(async move {
            let mut ticker = interval(quiet);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                sweep(&pending, quiet, trigger.as_ref());
            }
        }));
    }

    /// Stop the sweep task and discard pending entries without flushing them.
    pub fn stop(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }
        self.pending.clear();
    }

    /// Number of changes currently awaiting their quiet interval.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Configured quiet interval.
    pub fn quiet_interval(&self) -> Duration {
        self.quiet_interval
    }
}

impl Drop for ChangeCoalescer {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

/// Flush every entry that has been quiet for the full interval.
///
/// Runs on the single sweep task, so sweeps never overlap and the trigger
/// executes synchronously within the tick.
fn sweep(pending: &DashMap<PathBuf, PendingChange>, quiet: Duration, trigger: &dyn BuildTrigger) {
    let now = Instant::now();

    let due: Vec<PathBuf> = pending
        .iter()
        .filter(|entry| now.duration_since(entry.value().last_seen) >= quiet)
        .map(|entry| entry.key().clone())
        .collect();

    for path in due {
        // A notify racing the sweep refreshes last_seen; re-check under the
        // shard lock so such an entry survives until a later tick.
        let Some((path, change)) = pending.remove_if(&path, |_, change| {
            now.duration_since(change.last_seen) >= quiet
        }) else {
            continue;
        };

        if let Err(e) = trigger.source_file_changed(change.config.as_deref(), &path) {
            warn!("Build trigger failed for {}: {:#}", path.display(), e);
        }
    }
}
