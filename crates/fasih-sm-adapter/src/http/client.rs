/*
[INPUT]:  HTTP configuration (base URL, timeouts)
[OUTPUT]: Configured reqwest client ready for backend calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
[UPDATE]: 2026-10-12 Unwrap `success` envelopes in one place
*/

use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::http::{FasihError, Result};
use crate::types::Envelope;

/// Default base URL of the automation backend
pub const DEFAULT_BASE_URL: &str = "http://localhost:5005/api";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Main HTTP client for the FASIH-SM automation backend
#[derive(Debug, Clone)]
pub struct FasihClient {
    http_client: Client,
    base_url: Url,
}

impl FasihClient {
    /// Create a new client against the default base URL
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a new client with custom configuration and base URL
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: normalize_base(base_url)?,
        })
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL from path segments and query pairs.
    ///
    /// Segments are percent-encoded, so filenames with spaces stay intact.
    pub(crate) fn endpoint_url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| FasihError::Config(format!("base URL cannot be a base: {}", self.base_url)))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Build request builder for an endpoint
    pub(crate) fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder> {
        let url = self.endpoint_url(segments, query)?;
        debug!(%method, %url, "backend request");
        Ok(self.http_client.request(method, url))
    }

    /// Send request and decode JSON body, mapping non-2xx to backend failures
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send request expecting a `success` envelope and return it when successful
    pub(crate) async fn send_envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Envelope<T>> {
        let envelope: Envelope<T> = self.send_json(builder).await?;
        if !envelope.success {
            return Err(FasihError::Api {
                code: 200,
                message: envelope
                    .message
                    .unwrap_or_else(|| "backend reported failure".to_string()),
            });
        }
        Ok(envelope)
    }

    /// Send request and return the raw response after status checks
    pub(crate) async fn send_raw(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        check_status(response).await
    }
}

fn normalize_base(base_url: &str) -> Result<Url> {
    let trimmed = base_url.trim_end_matches('/');
    let url = Url::parse(trimmed)?;
    if url.cannot_be_a_base() {
        return Err(FasihError::Config(format!("base URL cannot be a base: {base_url}")));
    }
    Ok(url)
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
        .ok()
        .and_then(|envelope| envelope.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body
            }
        });
    Err(FasihError::api_error(status, message))
}
