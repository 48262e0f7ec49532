//! Application metrics for Prometheus monitoring.
//!
//! Request counters/histograms, save and import counters, and the handle
//! the `/metrics` endpoint renders from.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Global Prometheus handle for rendering metrics.
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at startup, before any metrics are recorded.
/// Returns `true` if initialization succeeded, `false` if already initialized.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        return false;
    }

    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    if metrics::set_global_recorder(recorder).is_err() {
        tracing::warn!("Failed to set global metrics recorder (already set)");
        return false;
    }

    if PROMETHEUS_HANDLE.set(handle).is_err() {
        tracing::warn!("Failed to store Prometheus handle (already set)");
    }

    describe_metrics();

    tracing::info!("Prometheus metrics initialized");
    true
}

fn describe_metrics() {
    describe_counter!("proslide_requests_total", "Total number of API requests");
    describe_histogram!(
        "proslide_request_duration_seconds",
        "Duration of API requests in seconds"
    );

    describe_counter!("proslide_saves_total", "Full-replace saves of the project collection");
    describe_histogram!("proslide_save_duration_seconds", "Duration of saves in seconds");
    describe_gauge!("proslide_projects_stored", "Rows in the project collection after the last save");

    describe_counter!("proslide_imports_total", "Spreadsheet imports processed");
    describe_counter!("proslide_imported_rows_total", "Rows produced by spreadsheet imports");
}

/// Render current metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(|h| h.render())
}

/// Record a completed API request.
pub fn record_request(endpoint: &str, status: &str, duration: Duration) {
    counter!("proslide_requests_total", "endpoint" => endpoint.to_string(), "status" => status.to_string())
        .increment(1);
    histogram!("proslide_request_duration_seconds", "endpoint" => endpoint.to_string())
        .record(duration.as_secs_f64());
}

/// Record a full-replace save of `rows` rows.
pub fn record_save(rows: usize, duration: Duration) {
    counter!("proslide_saves_total").increment(1);
    histogram!("proslide_save_duration_seconds").record(duration.as_secs_f64());
    gauge!("proslide_projects_stored").set(rows as f64);

    tracing::info!(
        rows,
        duration_ms = duration.as_millis() as u64,
        "Saved project collection"
    );
}

/// Record a processed import that produced `rows` rows.
pub fn record_import(rows: usize) {
    counter!("proslide_imports_total").increment(1);
    counter!("proslide_imported_rows_total").increment(rows as u64);
}

/// Helper for timing request handlers.
///
/// ```ignore
/// let timer = RequestTimer::new("projects_list");
/// // ... do work ...
/// timer.finish_ok(); // or timer.finish_err(status_code)
/// ```
pub struct RequestTimer {
    endpoint: &'static str,
    start: Instant,
}

impl RequestTimer {
    pub fn new(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish_ok(self) {
        record_request(self.endpoint, "200", self.start.elapsed());
    }

    pub fn finish_err(self, status: u16) {
        record_request(self.endpoint, &status.to_string(), self.start.elapsed());
    }
}
