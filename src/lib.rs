pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod exporter;
pub mod mount;
pub mod types;
pub mod util;

pub use collector::collect;
pub use config::model::{ExclusionFilters, TablePaths, WatchConfig, WatchSource};
pub use types::{CollectionOutcome, StatusRecord, WriteMode};
