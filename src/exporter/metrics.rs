//! Maps a collection outcome onto Prometheus metric families.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;

use crate::types::CollectionOutcome;

pub const CONTENT_TYPE: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

const VERSION: &str = env!("CARGO_PKG_VERSION");

type Labels = Vec<(String, String)>;

/// Builds a fresh registry for one scrape.
pub fn registry_for(outcome: &CollectionOutcome, exporter_metrics: bool) -> Registry {
    let mut registry = Registry::default();

    let status = Family::<Labels, Gauge>::default();
    registry.register(
        "check_mount_status",
        "Mount point status, 1=mounted 0=not mounted",
        status.clone(),
    );
    let success: Gauge = Gauge::default();
    registry.register("check_mount_success", "Exporter status, 1=successful 0=errors", success.clone());

    success.set(if outcome.succeeded() { 1 } else { 0 });
    for record in outcome.records() {
        let labels = vec![
            ("mountpoint".to_string(), escape_label_value(&record.mountpoint)),
            ("rw".to_string(), record.write_mode.as_str().to_string()),
        ];
        status.get_or_create(&labels).set(record.status_value());
    }

    if exporter_metrics {
        let build_info = Family::<Labels, Gauge>::default();
        registry.register(
            "check_mount_exporter_build_info",
            "Build information of the exporter, value is always 1",
            build_info.clone(),
        );
        build_info
            .get_or_create(&vec![("version".to_string(), VERSION.to_string())])
            .set(1);
    }

    registry
}

/// The text encoder writes label values verbatim, so mount points carrying
/// `\`, `"` or a newline are escaped here.
fn escape_label_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

pub fn encode_outcome(outcome: &CollectionOutcome, exporter_metrics: bool) -> Result<String, std::fmt::Error> {
    let registry = registry_for(outcome, exporter_metrics);
    let mut buf = String::new();
    encode(&mut buf, &registry)?;
    Ok(buf)
}
