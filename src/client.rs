/// Client for an Azure AI Foundry project.
///
/// Wraps the project's REST surface: bearer authentication, the `api-version`
/// query parameter, service error envelopes and retries for throttling and
/// transient server errors. Resource operations live in `connections`,
/// `agents`, `threads`, `runs` and `telemetry`.
use crate::config::Settings;
use crate::credential::{AI_FOUNDRY_SCOPE, DefaultAzureCredential, TokenCredential};
use crate::error::{Error, Result};
use crate::models::ErrorEnvelope;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Longest `Retry-After` the client will honor before retrying.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Transport settings for the project client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_version: String,
    pub timeout_secs: u64,
    pub retry_attempts: usize,
    pub retry_backoff: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_version: crate::config::DEFAULT_API_VERSION.to_string(),
            timeout_secs: 30,
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Authenticated client for one AI Foundry project endpoint.
#[derive(Clone)]
pub struct ProjectClient {
    endpoint: String,
    options: ClientOptions,
    credential: Arc<dyn TokenCredential>,
    http: reqwest::Client,
}

impl ProjectClient {
    /// Create a client for `endpoint`
    pub fn new(
        endpoint: impl Into<String>,
        credential: Arc<dyn TokenCredential>,
        options: ClientOptions,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(concat!("foundry-browser-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::ConnectionError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            options,
            credential,
            http,
        })
    }

    /// Client for the configured project using `DefaultAzureCredential`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            settings.project_endpoint.clone(),
            Arc::new(DefaultAzureCredential::new()),
            ClientOptions {
                api_version: settings.api_version.clone(),
                ..ClientOptions::default()
            },
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_version(&self) -> &str {
        &self.options.api_version
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        self.send::<(), T>(Method::GET, self.url(path), query, None).await
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        self.send(Method::POST, self.url(path), &[], Some(body)).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send::<(), T>(Method::DELETE, self.url(path), &[], None).await
    }

    /// GET an absolute continuation link returned by the service.
    ///
    /// The link must share the endpoint's origin; the bearer token is never
    /// sent anywhere else. Its own `api-version` is replaced by ours.
    pub(crate) async fn get_link<T: DeserializeOwned>(&self, link: &str) -> Result<T> {
        let (url, query) = self.resolve_link(link)?;
        let query: Vec<(&str, String)> = query.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
        self.send::<(), T>(Method::GET, url, &query, None).await
    }

    fn resolve_link(&self, link: &str) -> Result<(String, Vec<(String, String)>)> {
        let base = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| Error::InvalidConfig(format!("invalid project endpoint {}: {e}", self.endpoint)))?;
        let mut url = reqwest::Url::parse(link).or_else(|_| base.join(link)).map_err(|e| {
            Error::InvalidResponse(format!("unparseable continuation link {link}: {e}"))
        })?;
        if url.origin() != base.origin() {
            return Err(Error::InvalidResponse(format!(
                "continuation link points outside the project endpoint: {link}"
            )));
        }

        let query: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != "api-version")
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.set_query(None);
        url.set_fragment(None);
        Ok((url.to_string(), query))
    }

    /// Send a request, retrying throttled and transient failures.
    async fn send<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_once(method.clone(), &url, query, body).await {
                Ok(value) => return Ok(value),
                Err((err, wait)) if err.is_retryable() && attempt <= self.options.retry_attempts => {
                    let delay = wait.unwrap_or(self.options.retry_backoff * attempt as u32);
                    tracing::warn!(
                        %method,
                        %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err((err, _)) => return Err(err),
            }
        }
    }

    async fn send_once<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> std::result::Result<T, (Error, Option<Duration>)> {
        let token = self
            .credential
            .get_token(AI_FOUNDRY_SCOPE)
            .await
            .map_err(|e| (e, None))?;

        let request_id = uuid::Uuid::new_v4().to_string();
        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&token.token)
            .header("x-ms-client-request-id", &request_id)
            .query(&[("api-version", self.options.api_version.as_str())])
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, url, request_id = %request_id, "sending request");
        let response = request.send().await.map_err(|e| (Error::from(e), None))?;
        let status = response.status();
        let retry_after = retry_after(response.headers());
        let text = response
            .text()
            .await
            .map_err(|e| (Error::ConnectionError(format!("failed to read response: {e}")), None))?;

        if !status.is_success() {
            return Err((api_error(status, &text), retry_after));
        }

        serde_json::from_str(&text).map_err(|e| {
            tracing::debug!(url, body = %text, "unexpected response body");
            (Error::SerializationError(e), None)
        })
    }
}

fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|secs| Duration::from_secs(secs).min(MAX_RETRY_AFTER))
}

fn api_error(status: StatusCode, body: &str) -> Error {
    let (code, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (
            envelope.error.code,
            envelope.error.message.unwrap_or_else(|| body.to_string()),
        ),
        Err(_) if body.trim().is_empty() => (
            None,
            status.canonical_reason().unwrap_or("request failed").to_string(),
        ),
        Err(_) => (None, body.to_string()),
    };
    Error::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

/// Percent-encode a single path segment.
pub(crate) fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}
