pub fn init() {
    // Initialize tracing subscriber once, honoring RUST_LOG if set.
    // Logs go to stderr so stdout stays free for the stdio JSON-RPC channel.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Record a per-operation metric through the `metrics` facade and echo it to the log.
/// Names ending in `_total` are counters, everything else is a histogram.
pub fn log_metric(operation: &'static str, metric: &'static str, value: f64) {
    if metric.ends_with("_total") {
        metrics::counter!(metric, "operation" => operation).increment(value as u64);
    } else {
        metrics::histogram!(metric, "operation" => operation).record(value);
    }
    tracing::debug!(operation = operation, metric = metric, value = value, "metric");
}
