use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

/// Register descriptions for every metric the crate emits. Safe to call more
/// than once.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "quire_response_cache_hit_total",
            Unit::Count,
            "Total number of response-cache hits."
        );
        describe_counter!(
            "quire_response_cache_miss_total",
            Unit::Count,
            "Total number of response-cache misses, including stale entries."
        );
        describe_counter!(
            "quire_response_cache_bypass_total",
            Unit::Count,
            "Total number of renders done with the response cache disabled."
        );
        describe_counter!(
            "quire_scan_total",
            Unit::Count,
            "Total number of content scans started."
        );
        describe_counter!(
            "quire_scan_failures_total",
            Unit::Count,
            "Total number of content scans that failed and kept the previous generation."
        );
        describe_counter!(
            "quire_content_file_errors_total",
            Unit::Count,
            "Total number of content files left out of a generation."
        );
        describe_histogram!(
            "quire_scan_ms",
            Unit::Milliseconds,
            "Content scan latency in milliseconds."
        );
    });
}
