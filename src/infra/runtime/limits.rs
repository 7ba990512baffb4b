use std::time::Duration;

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a reqwest client with sane defaults. `timeout` is a transport-level
/// backstop; callers still bound each exchange with their own timer.
pub fn make_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default reqwest client");
            reqwest::Client::new()
        })
}

/// Run `fut` under `limit`; `None` means the deadline elapsed and the future
/// was dropped.
pub async fn with_deadline<F: std::future::Future>(limit: Duration, fut: F) -> Option<F::Output> {
    tokio::time::timeout(limit, fut).await.ok()
}
