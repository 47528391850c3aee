use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::args::Cli;
use crate::config::load::{load_config, parse_runtime};
use crate::config::model::{Config, WatchSource};
use crate::exporter::server::{serve, ServerState};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const LICENSE_NAME: &str = "Apache License 2.0";

pub mod args;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("check-mount-exporter {}", VERSION);
        println!("License: {}", LICENSE_NAME);
        return Ok(());
    }
    init_tracing(&cli.log_level);

    let file_cfg = match &cli.config {
        Some(path) => load_config(path).with_context(|| format!("load config {}", path.display()))?,
        None => Config::default(),
    };
    let runtime = parse_runtime(cli.overrides().or(file_cfg))?;

    info!("starting check-mount-exporter {}", VERSION);
    match &runtime.watch.source {
        WatchSource::Explicit(list) => info!("watching mount points {:?}", list),
        WatchSource::StaticTable => info!(
            "watching mount points from {}",
            runtime.watch.tables.static_table.display()
        ),
    }

    let state = ServerState {
        watch: runtime.watch,
        exporter_metrics: !runtime.disable_exporter_metrics,
    };
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("create tokio runtime")?;
    rt.block_on(serve(runtime.listen_address, state))?;
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
