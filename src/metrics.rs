//! Request metrics shared by both apps.
//!
//! Handlers never talk to the exporter directly: the request middleware in
//! `server` records through the `metrics` facade, and `/metrics` renders
//! whatever the installed Prometheus recorder has collected.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Once, OnceLock};
use std::time::Duration;
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Install the global Prometheus recorder. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus recorder installed");
            let _ = HANDLE.set(handle);
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    });
}

/// Current exposition text; empty when no recorder was installed (admin commands).
pub fn render() -> String {
    HANDLE.get().map(|h| h.render()).unwrap_or_default()
}

pub fn record_request(app: &'static str, method: &str, status: u16, elapsed: Duration) {
    metrics::counter!(
        HTTP_REQUESTS_TOTAL,
        "app" => app,
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION_SECONDS, "app" => app).record(elapsed.as_secs_f64());
}
