//! Per-source HTTP client
//!
//! Features:
//! - HTTP/2 multiplexing (negotiated through ALPN, HTTP/1.1 fallback)
//! - TLS 1.3 via rustls
//! - Brotli, Gzip, Deflate compression (auto-negotiated)
//! - Connection pooling with keep-alive
//! - Fresh browser fingerprint on every request
//! - Bounded retry on transport failures

use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::SourceConfig;
use crate::error::{Result, ScrapeError};
use crate::fingerprint::{random_profile, FingerprintOptions};

/// Base delay of the exponential retry backoff.
const RETRY_BASE_DELAY_MS: u64 = 250;

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct Page {
    pub body: String,
    /// URL the response finally came from, after redirects.
    pub final_url: Url,
    /// Whether `final_url` differs from the requested URL.
    pub redirected: bool,
}

impl Page {
    /// True when the site bounced the request back to its front page.
    ///
    /// Otakudesu does this for searches it rejects.
    #[must_use]
    pub fn redirected_home(&self) -> bool {
        self.redirected && self.final_url.path() == "/" && self.final_url.query().is_none()
    }
}

/// HTTP client bound to one source origin.
///
/// Built once per adapter and shared by every operation of that adapter.
pub struct SourceClient {
    client: Client,
    base_url: Url,
    retry_limit: u32,
    fingerprint: FingerprintOptions,
}

impl SourceClient {
    /// Create a client for the origin in `config`.
    pub fn new(config: &SourceConfig, fingerprint: FingerprintOptions) -> Result<Self> {
        // Trailing slash so relative paths join below the origin
        let base_url = Url::parse(&format!("{}/", config.origin()))?;

        let client = Client::builder()
            // Don't assume HTTP/2 - let the server negotiate via ALPN
            .http2_adaptive_window(true)
            // Keep connections alive for reuse
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            retry_limit: config.retry_limit,
            fingerprint,
        })
    }

    /// Origin this client is bound to, with trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a site-relative path, or accept an absolute URL on this origin.
    ///
    /// Absolute URLs naming any other origin are rejected before a request
    /// is built.
    pub fn resolve(&self, path_or_url: &str) -> Result<Url> {
        match Url::parse(path_or_url) {
            Ok(url) if url.origin() == self.base_url.origin() => Ok(url),
            Ok(url) => Err(ScrapeError::InvalidUrl(format!(
                "{url} is outside {}",
                self.base_url.origin().ascii_serialization()
            ))),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(self.base_url.join(path_or_url.trim_start_matches('/'))?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// GET a page, with optional query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Page> {
        let mut url = self.resolve(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let response = self
            .send(&url, || {
                self.client
                    .get(url.clone())
                    .headers(random_profile(&self.fingerprint).to_headers())
            })
            .await?;

        let final_url = response.url().clone();
        let redirected = final_url != url;
        let body = response.text().await?;

        Ok(Page {
            body,
            final_url,
            redirected,
        })
    }

    /// POST an urlencoded form the way the site's own XHR code does.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<String> {
        let url = self.resolve(path)?;
        let referer = self.base_url.as_str().to_string();

        let response = self
            .send(&url, || {
                self.client
                    .post(url.clone())
                    .headers(random_profile(&self.fingerprint).for_xhr().to_headers())
                    .header(
                        CONTENT_TYPE,
                        HeaderValue::from_static("application/x-www-form-urlencoded"),
                    )
                    .header("X-Requested-With", "XMLHttpRequest")
                    .header("Referer", referer.as_str())
                    .form(form)
            })
            .await?;

        Ok(response.text().await?)
    }

    /// Send with bounded retry on transport errors.
    ///
    /// HTTP error statuses are returned immediately as [`ScrapeError::Status`].
    #[instrument(skip(self, build), fields(url = %url))]
    async fn send<F>(&self, url: &Url, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            debug!(attempt = attempt + 1, "Sending request");
            match build().send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!(status = %status, version = ?response.version(), "Response received");
                    if !status.is_success() {
                        return Err(ScrapeError::Status {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }
                    return Ok(response);
                }
                Err(e) if attempt < self.retry_limit && is_transient(&e) => {
                    let delay = Duration::from_millis(RETRY_BASE_DELAY_MS * 2u64.pow(attempt));
                    warn!(
                        error = %e,
                        delay_ms = delay.as_millis(),
                        "Transport error, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}
