// Prometheus metrics definitions for the creopedia backend.

use axum::{extract::Request, middleware::Next, response::Response};
use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ── Counters ─────────────────────────────────────────────────────

    /// Total API requests, by method/endpoint/status.
    pub static ref API_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("creopedia_api_requests_total", "Total API requests"),
        &["method", "endpoint", "status"],
    )
    .unwrap();

    /// Total accounts created.
    pub static ref USER_SIGNUPS_TOTAL: IntCounter = IntCounter::new(
        "creopedia_user_signups_total",
        "Accounts created",
    )
    .unwrap();

    /// Total successful logins.
    pub static ref USER_LOGINS_TOTAL: IntCounter = IntCounter::new(
        "creopedia_user_logins_total",
        "Successful logins",
    )
    .unwrap();

    /// Total collection toggles, by resulting state (collected/uncollected).
    pub static ref CREATURE_TOGGLES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("creopedia_creature_toggles_total", "Collection toggles"),
        &["state"],
    )
    .unwrap();

    // ── Histograms ───────────────────────────────────────────────────

    /// API request duration in seconds, by endpoint.
    pub static ref API_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "creopedia_api_request_duration_seconds",
            "API request duration in seconds",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]),
        &["endpoint"],
    )
    .unwrap();
}

/// Register all metrics with the custom registry. Call once at startup.
pub fn register_metrics() {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(API_REQUESTS_TOTAL.clone()),
        Box::new(USER_SIGNUPS_TOTAL.clone()),
        Box::new(USER_LOGINS_TOTAL.clone()),
        Box::new(CREATURE_TOGGLES_TOTAL.clone()),
        Box::new(API_REQUEST_DURATION_SECONDS.clone()),
    ];

    for c in collectors {
        REGISTRY.register(c).expect("failed to register metric");
    }
}

/// Serialize all registered metrics to the Prometheus text exposition format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Normalize a URL path for metric labels: replace numeric path segments with `:id`
/// to prevent cardinality explosion.
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if segment.parse::<i64>().is_ok() {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Middleware recording a counter and duration histogram for every request.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let endpoint = normalize_path(req.uri().path());
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    API_REQUESTS_TOTAL
        .with_label_values(&[&method, &endpoint, &status])
        .inc();
    API_REQUEST_DURATION_SECONDS
        .with_label_values(&[&endpoint])
        .observe(start.elapsed().as_secs_f64());

    response
}

/// Handler for `GET /metrics`.
pub async fn metrics_handler() -> String {
    gather_metrics()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/islands"), "/api/islands");
        assert_eq!(normalize_path("/health"), "/health");
    }

    #[test]
    fn test_normalize_path_with_ids() {
        assert_eq!(normalize_path("/api/islands/42"), "/api/islands/:id");
        assert_eq!(
            normalize_path("/api/islands/42/creatures/7/toggle"),
            "/api/islands/:id/creatures/:id/toggle"
        );
    }

    #[test]
    fn test_normalize_path_preserves_non_numeric() {
        assert_eq!(normalize_path("/api/auth/login"), "/api/auth/login");
        assert_eq!(normalize_path("/api/creopedia/stats"), "/api/creopedia/stats");
    }

    #[test]
    fn test_gather_metrics_returns_string() {
        // Register and gather -- should not panic
        register_metrics();
        let output = gather_metrics();
        assert!(output.is_empty() || output.contains("creopedia_"));
    }

    #[test]
    fn test_metric_increments() {
        USER_SIGNUPS_TOTAL.inc();
        USER_LOGINS_TOTAL.inc();
        assert!(USER_SIGNUPS_TOTAL.get() >= 1);

        CREATURE_TOGGLES_TOTAL.with_label_values(&["collected"]).inc();
        CREATURE_TOGGLES_TOTAL
            .with_label_values(&["uncollected"])
            .inc();

        API_REQUESTS_TOTAL
            .with_label_values(&["GET", "/api/islands", "200"])
            .inc();
        API_REQUEST_DURATION_SECONDS
            .with_label_values(&["/api/islands"])
            .observe(0.05);
    }
}
