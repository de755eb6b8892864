//! Shared networking constants and helpers for the quote endpoint.

/// Base URL of the snapshot endpoint; codes are appended after `list=`.
pub const QUOTE_ENDPOINT: &str = "https://hq.sinajs.cn";
/// Referer the endpoint expects from browser clients.
pub const REFERER: &str = "https://finance.sina.com.cn";
/// Request timeout in milliseconds.
pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Build the snapshot URL for a batch of codes, e.g. `https://hq.sinajs.cn/list=RB2405,AG2412`.
pub fn snapshot_url(endpoint: &str, codes: &[String]) -> String {
    format!("{}/list={}", endpoint.trim_end_matches('/'), codes.join(","))
}
