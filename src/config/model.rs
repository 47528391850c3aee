use std::net::SocketAddr;
use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::util::paths::RootPrefix;

pub const DEFAULT_EXCLUDE_MOUNTPOINTS: &str = "^/(dev|proc|sys|var/lib/docker/.+)($|/)";
pub const DEFAULT_EXCLUDE_FS_TYPES: &str = "^(proc|procfs|sysfs|swap)$";
pub const DEFAULT_ROOTFS: &str = "/";
pub const DEFAULT_LISTEN_ADDRESS: &str = ":9304";

/// On-disk YAML configuration. Every key is optional; flags win over it.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mountpoints: Option<Vec<String>>,
    #[serde(default, rename = "excludeMountpoints", skip_serializing_if = "Option::is_none")]
    pub exclude_mountpoints: Option<String>,
    #[serde(default, rename = "excludeFsTypes", skip_serializing_if = "Option::is_none")]
    pub exclude_fs_types: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rootfs: Option<String>,
    #[serde(default, rename = "listenAddress", skip_serializing_if = "Option::is_none")]
    pub listen_address: Option<String>,
    #[serde(default, rename = "disableExporterMetrics", skip_serializing_if = "Option::is_none")]
    pub disable_exporter_metrics: Option<bool>,
}

impl Config {
    /// Fills every key unset in `self` from `fallback`.
    pub fn or(self, fallback: Config) -> Config {
        Config {
            mountpoints: self.mountpoints.or(fallback.mountpoints),
            exclude_mountpoints: self.exclude_mountpoints.or(fallback.exclude_mountpoints),
            exclude_fs_types: self.exclude_fs_types.or(fallback.exclude_fs_types),
            rootfs: self.rootfs.or(fallback.rootfs),
            listen_address: self.listen_address.or(fallback.listen_address),
            disable_exporter_metrics: self.disable_exporter_metrics.or(fallback.disable_exporter_metrics),
        }
    }
}

/// Where the watch list comes from for each cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchSource {
    Explicit(Vec<String>),
    StaticTable,
}

/// Filters applied to static table entries when deriving the watch list.
#[derive(Debug, Clone)]
pub struct ExclusionFilters {
    pub mountpoints: Regex,
    pub fs_types: Regex,
}

impl ExclusionFilters {
    pub fn new(mountpoints: Regex, fs_types: Regex) -> Self {
        Self { mountpoints, fs_types }
    }

    pub fn excludes(&self, mountpoint: &str, fs_type: &str) -> bool {
        self.mountpoints.is_match(mountpoint) || self.fs_types.is_match(fs_type)
    }
}

impl Default for ExclusionFilters {
    fn default() -> Self {
        Self {
            mountpoints: Regex::new(DEFAULT_EXCLUDE_MOUNTPOINTS).expect("default mount point pattern"),
            fs_types: Regex::new(DEFAULT_EXCLUDE_FS_TYPES).expect("default fs type pattern"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    pub static_table: PathBuf,
    pub live_table: PathBuf,
}

impl TablePaths {
    pub fn under_root(root: &RootPrefix) -> Self {
        Self {
            static_table: root.join("etc/fstab"),
            live_table: root.join("proc/mounts"),
        }
    }
}

/// Immutable input to one collection cycle.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub source: WatchSource,
    pub filters: ExclusionFilters,
    pub root: RootPrefix,
    pub tables: TablePaths,
}

impl WatchConfig {
    pub fn new(source: WatchSource, filters: ExclusionFilters, root: RootPrefix) -> Self {
        let tables = TablePaths::under_root(&root);
        Self { source, filters, root, tables }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub watch: WatchConfig,
    pub listen_address: SocketAddr,
    pub disable_exporter_metrics: bool,
}
