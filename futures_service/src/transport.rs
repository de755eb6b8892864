//! Transport boundary for snapshot requests.
//!
//! `QuoteSource` hands back the raw, already-decoded response text for a batch of
//! codes; the protocol decoding and failure handling live in the service. The HTTP
//! implementation talks to the snapshot endpoint with a blocking `reqwest` client and
//! decodes the GB18030 body into Unicode text.
use std::time::Duration;

use encoding_rs::GB18030;
use futures_common::FeedError;
use futures_common::Result;
use futures_common::net::{REFERER, REQUEST_TIMEOUT_MS, snapshot_url};
use log::{debug, warn};
use rand::Rng;
use reqwest::blocking::Client;
use reqwest::header;

/// Browser user agents; one is picked at random per request.
const USER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.2 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// Upstream snapshot source contract.
///
/// Implementations must be `Send + Sync` so a service can be moved to the thread
/// that drives the polling cycle.
pub trait QuoteSource: Send + Sync {
    /// URL (or other human-readable locator) used for a batch, for diagnostics.
    fn locator(&self, codes: &[String]) -> String;

    /// Fetch the response text for `codes`.
    fn fetch_raw(&self, codes: &[String]) -> Result<String>;
}

/// Snapshot source backed by the HTTP endpoint.
pub struct HttpQuoteSource {
    client: Client,
    endpoint: String,
}

impl HttpQuoteSource {
    /// Create a source for `endpoint` (e.g. `https://hq.sinajs.cn`).
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        Ok(HttpQuoteSource {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

fn random_user_agent() -> &'static str {
    let mut rng = rand::rng();
    USER_AGENTS[rng.random_range(0..USER_AGENTS.len())]
}

/// Decode a GB18030 response body, replacing invalid sequences.
pub fn decode_body(bytes: &[u8]) -> String {
    let (text, _, had_errors) = GB18030.decode(bytes);
    if had_errors {
        warn!("Response body contained invalid GB18030 sequences");
    }
    text.into_owned()
}

impl QuoteSource for HttpQuoteSource {
    fn locator(&self, codes: &[String]) -> String {
        snapshot_url(&self.endpoint, codes)
    }

    fn fetch_raw(&self, codes: &[String]) -> Result<String> {
        let url = self.locator(codes);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, random_user_agent())
            .header(header::REFERER, REFERER)
            .send()
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
                url,
            });
        }
        let bytes = response
            .bytes()
            .map_err(|e| FeedError::Transport(e.to_string()))?;
        Ok(decode_body(&bytes))
    }
}
