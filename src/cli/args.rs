use std::path::PathBuf;

use clap::Parser;

use crate::config::model::Config;
use crate::types::MountpointList;

#[derive(Parser, Debug)]
#[command(
    name = "check-mount-exporter",
    about = "Reports whether configured mount points are mounted and read-write",
    disable_version_flag = true
)]
pub struct Cli {
    /// Comma separated list of mountpoints to check
    #[arg(long = "config.mountpoints")]
    pub mountpoints: Option<MountpointList>,
    /// Regex of mountpoints to exclude
    #[arg(long = "config.exclude.mountpoints")]
    pub exclude_mountpoints: Option<String>,
    /// Regex of filesystem types to exclude
    #[arg(long = "config.exclude.fs-types")]
    pub exclude_fs_types: Option<String>,
    /// Path to root filesystem
    #[arg(long = "path.rootfs")]
    pub rootfs: Option<String>,
    /// Address to listen on for web interface and telemetry
    #[arg(long = "web.listen-address")]
    pub listen_address: Option<String>,
    /// Omit check_mount_exporter_build_info; no process or runtime collectors are exported
    #[arg(long = "web.disable-exporter-metrics")]
    pub disable_exporter_metrics: bool,
    /// Log level filter, overridden by RUST_LOG
    #[arg(long = "log.level", default_value = "info")]
    pub log_level: String,
    /// YAML config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub version: bool,
}

impl Cli {
    /// Flag values as a config layer; unset flags stay `None`.
    pub fn overrides(&self) -> Config {
        Config {
            mountpoints: self
                .mountpoints
                .clone()
                .filter(|list| !list.is_empty())
                .map(MountpointList::into_vec),
            exclude_mountpoints: self.exclude_mountpoints.clone(),
            exclude_fs_types: self.exclude_fs_types.clone(),
            rootfs: self.rootfs.clone(),
            listen_address: self.listen_address.clone(),
            disable_exporter_metrics: self.disable_exporter_metrics.then_some(true),
        }
    }
}
