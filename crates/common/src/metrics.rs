//! Prometheus counters for the HTTP surface.
//!
//! Uses a dedicated registry instead of the global default one so that tests
//! can build several routers in one process without duplicate registrations.

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct HttpMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
}

impl HttpMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let requests_total = IntCounterVec::new(
            Opts::new("cms_http_requests_total", "Total HTTP requests handled"),
            &["method", "route", "status"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new("cms_http_request_duration_seconds", "HTTP request duration in seconds")
                .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["method", "route"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        Ok(Self { registry, requests_total, request_duration })
    }

    pub fn observe(&self, method: &str, route: &str, status: u16, elapsed_secs: f64) {
        self.requests_total
            .with_label_values(&[method, route, &status.to_string()])
            .inc();
        self.request_duration
            .with_label_values(&[method, route])
            .observe(elapsed_secs);
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::HttpMetrics;

    #[test]
    fn observed_requests_show_up_in_encoding() {
        let m = HttpMetrics::new().unwrap();
        m.observe("GET", "/api/experts", 200, 0.01);
        m.observe("GET", "/api/experts", 200, 0.02);
        let text = m.encode().unwrap();
        assert!(text.contains("cms_http_requests_total"));
        assert!(text.contains(r#"route="/api/experts""#));
        assert!(text.contains(r#"status="200""#));
    }

    #[test]
    fn registries_are_independent() {
        let a = HttpMetrics::new().unwrap();
        let b = HttpMetrics::new().unwrap();
        a.observe("POST", "/api/partners", 201, 0.1);
        assert!(!b.encode().unwrap().contains("/api/partners"));
    }
}
