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
///
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
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

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "folio_store_cache_hit_total",
            Unit::Count,
            "Total number of list() calls served from a current snapshot."
        );
        describe_counter!(
            "folio_store_cache_miss_total",
            Unit::Count,
            "Total number of list() calls that found no current snapshot."
        );
        describe_counter!(
            "folio_store_fetch_total",
            Unit::Count,
            "Total number of collection fetches sent to the backend."
        );
        describe_counter!(
            "folio_store_fetch_shared_total",
            Unit::Count,
            "Total number of list() calls that joined an in-flight fetch."
        );
        describe_counter!(
            "folio_store_invalidation_total",
            Unit::Count,
            "Total number of store invalidations."
        );
        describe_counter!(
            "folio_contact_rejected_total",
            Unit::Count,
            "Total number of contact submissions dropped before reaching the backend."
        );
        describe_histogram!(
            "folio_store_fetch_ms",
            Unit::Milliseconds,
            "Collection fetch latency in milliseconds."
        );
    });
}
