use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::redirect::Policy;
use thiserror::Error;
use url::Url;

/// Upper bound on any single document body (JSON, stylesheet, icon).
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

const MAX_REDIRECTS: usize = 3;

// ============================================================================
// Errors
// ============================================================================

/// Failures of a single request through the [`Fetch`] seam.
///
/// An HTTP error status is *not* a `FetchError`: the response is returned
/// with its status and the caller decides what a 404 means.
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connect, TLS or mid-body transport failure
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// The fetcher was started in offline mode
    #[error("Network unreachable (offline mode)")]
    Offline,
    #[error("Response too large (limit {limit} bytes)")]
    ResponseTooLarge { limit: usize },
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// Network failed and no cached copy exists
    #[error("{url} is unavailable offline ({cause})")]
    NotCached { url: String, cause: String },
    /// The cache worker task has stopped
    #[error("Cache worker is not running")]
    WorkerGone,
    #[error("Cache storage error: {0}")]
    Cache(String),
}

impl FetchError {
    /// True for failures that mean "the network could not be reached".
    ///
    /// Only these trigger the cache fallback; a server that answered, even
    /// with an error, is authoritative.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_)
                | FetchError::Timeout(_)
                | FetchError::Offline
                | FetchError::IncompleteResponse { .. }
        )
    }
}

// ============================================================================
// Response
// ============================================================================

/// A fully-read response. Bodies are small static documents, so they are
/// buffered whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub url: Url,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// Served from the offline cache rather than the network
    pub from_cache: bool,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// Fetch seam
// ============================================================================

/// Anything that can turn a URL into a [`Response`].
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<Response, FetchError>;
}

/// Build the shared HTTP client.
///
/// There is no whole-request timeout on the client itself because the
/// notification stream stays open indefinitely; [`HttpFetcher`] applies its
/// own per-request deadline instead.
pub fn build_client(connect_timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(redirect_policy())
        .connect_timeout(connect_timeout)
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .tcp_keepalive(Duration::from_secs(60))
        .user_agent(concat!("retroflix/", env!("CARGO_PKG_VERSION")))
        .build()
}

fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("Too many redirects (max 3)");
        }
        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev.as_str() == url.as_str()) {
            return attempt.error("Redirect loop detected");
        }
        tracing::debug!(
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );
        attempt.follow()
    })
}

/// Direct network fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    offline: bool,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            offline: false,
        }
    }

    /// Treat the network as unreachable: every fetch fails with
    /// [`FetchError::Offline`] without touching a socket.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Response, FetchError> {
        if self.offline {
            return Err(FetchError::Offline);
        }

        let attempt = async {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status().as_u16();
            let final_url = response.url().clone();
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = read_limited_bytes(response, MAX_DOCUMENT_SIZE).await?;
            Ok::<_, FetchError>(Response {
                url: final_url,
                status,
                content_type,
                body,
                from_cache: false,
            })
        };

        let response = tokio::time::timeout(self.timeout, attempt)
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        tracing::debug!(
            url = %url,
            status = response.status,
            bytes = response.body.len(),
            "Fetched from network"
        );
        Ok(response)
    }
}

/// Read a body, refusing anything over `limit` and anything shorter than
/// its declared `Content-Length`.
async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    let expected = response.content_length();
    if let Some(len) = expected {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge { limit });
        }
    }

    let mut bytes = Vec::with_capacity(expected.map_or(0, |l| l as usize));
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge { limit });
        }
        bytes.extend_from_slice(&chunk);
    }

    if let Some(expected) = expected {
        if (bytes.len() as u64) < expected {
            return Err(FetchError::IncompleteResponse {
                expected,
                received: bytes.len(),
            });
        }
    }

    Ok(bytes)
}
