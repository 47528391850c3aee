use std::fs::File;
use std::io::Read;
use std::net::SocketAddr;
use std::path::Path;

use regex::Regex;

use crate::config::model::{
    Config, ExclusionFilters, RuntimeConfig, WatchConfig, WatchSource, DEFAULT_EXCLUDE_FS_TYPES,
    DEFAULT_EXCLUDE_MOUNTPOINTS, DEFAULT_LISTEN_ADDRESS, DEFAULT_ROOTFS,
};
use crate::error::{ConfigError, ExporterError, Result};
use crate::util::paths::RootPrefix;

pub fn load_config(path: &Path) -> Result<Config> {
    let mut contents = String::new();
    File::open(path)
        .map_err(ExporterError::Io)?
        .read_to_string(&mut contents)
        .map_err(ExporterError::Io)?;
    let cfg: Config =
        serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    Ok(cfg)
}

pub fn parse_runtime(cfg: Config) -> Result<RuntimeConfig> {
    let source = match cfg.mountpoints {
        Some(list) if !list.is_empty() => {
            for mountpoint in &list {
                if !mountpoint.starts_with('/') {
                    return Err(ConfigError::Invalid(format!(
                        "mount point {} must be an absolute path",
                        mountpoint
                    ))
                    .into());
                }
            }
            WatchSource::Explicit(list)
        }
        _ => WatchSource::StaticTable,
    };

    let filters = ExclusionFilters::new(
        compile_pattern(
            "mount point exclusion",
            cfg.exclude_mountpoints.as_deref().unwrap_or(DEFAULT_EXCLUDE_MOUNTPOINTS),
        )?,
        compile_pattern(
            "fs type exclusion",
            cfg.exclude_fs_types.as_deref().unwrap_or(DEFAULT_EXCLUDE_FS_TYPES),
        )?,
    );

    let rootfs = cfg.rootfs.unwrap_or_else(|| DEFAULT_ROOTFS.to_string());
    if rootfs.trim().is_empty() {
        return Err(ConfigError::Invalid("rootfs path is empty".to_string()).into());
    }

    let listen_address = parse_listen_address(
        cfg.listen_address.as_deref().unwrap_or(DEFAULT_LISTEN_ADDRESS),
    )?;

    Ok(RuntimeConfig {
        watch: WatchConfig::new(source, filters, RootPrefix::new(rootfs)),
        listen_address,
        disable_exporter_metrics: cfg.disable_exporter_metrics.unwrap_or(false),
    })
}

fn compile_pattern(what: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::Invalid(format!("{} pattern {}: {}", what, pattern, e)).into())
}

/// Accepts `host:port` or a bare `:port` meaning every interface.
pub fn parse_listen_address(value: &str) -> Result<SocketAddr> {
    let value = value.trim();
    let full = if value.starts_with(':') {
        format!("0.0.0.0{}", value)
    } else {
        value.to_string()
    };
    full.parse::<SocketAddr>()
        .map_err(|e| ConfigError::Invalid(format!("listen address {}: {}", value, e)).into())
}
