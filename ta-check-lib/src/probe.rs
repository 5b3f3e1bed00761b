//! Remote submission status probe.
//!
//! Each identifier has a page on the library portal. There is no API, so
//! "submitted" is decided by looking for a literal marker in the rendered
//! HTML. See [`is_submitted`].

use crate::error::TaCheckError;
use crate::types::{CheckConfig, ID_PLACEHOLDER};
use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::debug;

/// Decides whether a final-project submission exists for an identifier.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    /// `Ok(true)` when a submission is on record, `Ok(false)` when not.
    ///
    /// Transport failures and non-success HTTP statuses are errors, never a status.
    async fn check_submitted(&self, id: &str) -> Result<bool, TaCheckError>;
}

/// Classify a portal page.
///
/// The portal prints a result counter on every search page and the marker
/// matches the one-result case. This is coupled to the portal's markup: if
/// the wording changes, every student silently reads as "not submitted".
/// Keep all knowledge of the page format in this function.
pub fn is_submitted(body: &str, marker: &str) -> bool {
    body.contains(marker)
}

/// Expand the status URL template for one identifier.
pub fn status_url_for(template: &str, id: &str) -> String {
    template.replace(ID_PLACEHOLDER, id)
}

/// Browser-like headers so the portal does not reject us as a bot.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
        ),
    );
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}

/// Probe against the digilib portal.
///
/// One `reqwest::Client` is shared by all probes so connections are pooled;
/// its configuration is fixed at construction.
#[derive(Clone)]
pub struct DigilibProbe {
    http_client: reqwest::Client,
    url_template: String,
    marker: String,
    timeout: Duration,
}

impl DigilibProbe {
    /// Create a probe from the run configuration.
    pub fn with_config(config: &CheckConfig) -> Result<Self, TaCheckError> {
        let http_client = reqwest::Client::builder()
            .default_headers(browser_headers())
            .timeout(config.probe_timeout)
            .build()
            .map_err(|e| TaCheckError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            url_template: config.status_url.clone(),
            marker: config.submitted_marker.clone(),
            timeout: config.probe_timeout,
        })
    }

    pub fn new() -> Result<Self, TaCheckError> {
        Self::with_config(&CheckConfig::default())
    }

    fn request_error(&self, id: &str, err: reqwest::Error) -> TaCheckError {
        if err.is_timeout() {
            TaCheckError::probe(id, format!("timed out after {:?}", self.timeout))
        } else if err.is_connect() {
            TaCheckError::probe(id, format!("connection failed: {}", err))
        } else {
            TaCheckError::probe(id, format!("request failed: {}", err))
        }
    }
}

#[async_trait]
impl StatusProbe for DigilibProbe {
    async fn check_submitted(&self, id: &str) -> Result<bool, TaCheckError> {
        let url = status_url_for(&self.url_template, id);
        debug!(%url, "probing submission status");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(id, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaCheckError::probe_with_status(
                id,
                format!("portal returned {}", status),
                status.as_u16(),
            ));
        }

        let body = response.text().await.map_err(|e| self.request_error(id, e))?;
        let submitted = is_submitted(&body, &self.marker);
        debug!(id, submitted, "probe finished");

        Ok(submitted)
    }
}
