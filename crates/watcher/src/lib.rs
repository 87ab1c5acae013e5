//! File system watching for bundlewatch
//!
//! This crate provides:
//! - Per-path change coalescing with a configurable quiet interval
//! - Upstream filtering of editor temp files, minified outputs, and
//!   vendor directories
//! - Per-project recursive watchers feeding the coalescer

pub mod coalesce;
pub mod config;
pub mod filter;
pub mod source;

pub use coalesce::{BuildTrigger, ChangeCoalescer};
pub use config::WatcherConfig;
pub use filter::{ChangeFilter, FilterConfig};
pub use source::ProjectWatchers;
