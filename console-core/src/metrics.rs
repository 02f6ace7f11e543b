use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

static METRICS: OnceLock<ConsoleMetrics> = OnceLock::new();

struct ConsoleMetrics {
    registry: Registry,
    http_requests_total: IntCounterVec,
    http_request_duration_seconds: HistogramVec,
    backend_requests_total: IntCounterVec,
}

impl ConsoleMetrics {
    fn build() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "path", "status"],
        )?;
        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            ),
            &["method", "path", "status"],
        )?;
        let backend_requests_total = IntCounterVec::new(
            Opts::new(
                "backend_requests_total",
                "Calls made to the back-office REST API",
            ),
            &["method", "endpoint", "status"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(backend_requests_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            backend_requests_total,
        })
    }
}

/// Register the console's collectors. Safe to call more than once.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    if METRICS.get().is_none() {
        let built = ConsoleMetrics::build()?;
        // Racing callers each build a registry; the first one stored is kept
        // and the others are dropped unregistered.
        METRICS.get_or_init(|| built);
    }
    Ok(())
}

pub fn record_http_request(method: &str, path: &str, status: u16, seconds: f64) {
    if let Some(metrics) = METRICS.get() {
        let status = status.to_string();
        let labels = [method, path, status.as_str()];
        metrics.http_requests_total.with_label_values(&labels).inc();
        metrics
            .http_request_duration_seconds
            .with_label_values(&labels)
            .observe(seconds);
    }
}

/// `status` is the HTTP status code, or `"error"` when no response arrived.
pub fn record_backend_call(method: &str, endpoint: &str, status: &str) {
    if let Some(metrics) = METRICS.get() {
        metrics
            .backend_requests_total
            .with_label_values(&[method, endpoint, status])
            .inc();
    }
}

/// Render every registered collector in the Prometheus text format.
pub fn gather() -> String {
    let Some(metrics) = METRICS.get() else {
        return String::new();
    };

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&metrics.registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_backend_calls_show_up_in_output() {
        init_metrics().unwrap();
        init_metrics().unwrap();

        record_backend_call("GET", "/auth/users", "200");
        record_http_request("GET", "/users", 200, 0.01);

        let output = gather();
        assert!(output.contains("backend_requests_total"));
        assert!(output.contains("endpoint=\"/auth/users\""));
        assert!(output.contains("http_request_duration_seconds"));
    }

    #[test]
    fn concurrent_initialisation_keeps_one_registry() {
        let registries: Vec<usize> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    init_metrics().unwrap();
                    METRICS.get().map(|m| m as *const ConsoleMetrics as usize)
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect();

        assert!(registries.windows(2).all(|pair| pair[0] == pair[1]));

        record_backend_call("DELETE", "/auth/roles/9", "204");
        let output = gather();
        let line = output
            .lines()
            .find(|l| l.contains("endpoint=\"/auth/roles/9\""))
            .unwrap();
        assert!(line.ends_with(" 1"));
    }
}
