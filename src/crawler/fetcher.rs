//! HTTP fetcher
//!
//! Builds the HTTP client the crawl runs on and performs single fetch
//! attempts. Redirects are never followed automatically — the scheduler
//! pushes `Location` targets back through the URL pipeline instead — and
//! certificate verification is disabled by default because the tool's
//! target is developer and staging sites with self-signed certificates.

use std::time::Duration;

use reqwest::{redirect::Policy, Client};

/// A completed fetch attempt, reduced to what the scheduler needs.
#[derive(Debug)]
pub struct FetchedResponse {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value (empty when absent)
    pub content_type: String,

    /// Location header value, for redirect responses
    pub location: Option<String>,

    /// Response body; empty for redirect responses
    pub body: Vec<u8>,
}

impl FetchedResponse {
    /// Returns true for any 3xx status.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Retry policy for non-2xx, non-3xx responses.
///
/// The delay ramp is deliberate: the first retry is immediate, the second
/// waits one second, the third waits two.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: 3 }
    }
}

impl RetryPolicy {
    /// Returns whether another attempt is allowed after `retry_count`
    /// failures.
    pub fn allows_retry(&self, retry_count: u32) -> bool {
        retry_count < self.max_retries
    }

    /// The delay before retry attempt number `retry_count` (0-indexed).
    pub fn delay_for_attempt(&self, retry_count: u32) -> Duration {
        Duration::from_millis(1000 * u64::from(retry_count))
    }
}

/// Builds the HTTP client used for the whole crawl.
///
/// # Arguments
///
/// * `accept_invalid_certs` - Disable TLS certificate verification
pub fn build_http_client(accept_invalid_certs: bool) -> Result<Client, reqwest::Error> {
    let user_agent = format!("sitefold/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none()) // Handle redirects manually
        .danger_accept_invalid_certs(accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Performs a single GET without retries or redirect following.
///
/// Redirect responses return immediately without reading a body.
pub async fn fetch_once(client: &Client, url: &str) -> Result<FetchedResponse, reqwest::Error> {
    let response = client.get(url).send().await?;
    let status = response.status().as_u16();

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    let location = response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let body = if (300..400).contains(&status) {
        Vec::new()
    } else {
        response.bytes().await?.to_vec()
    };

    Ok(FetchedResponse {
        status,
        content_type,
        location,
        body,
    })
}
