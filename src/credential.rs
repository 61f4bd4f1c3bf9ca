/// Azure credentials for the AI Foundry project API.
///
/// `DefaultAzureCredential` tries, in order:
/// 1. A service principal from `AZURE_TENANT_ID` / `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET`
/// 2. The signed-in Azure CLI (`az login`)
///
/// The first source that yields a token wins and the token is cached until
/// shortly before it expires.
use crate::error::{Error, Result};
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Token scope for the AI Foundry data plane.
pub const AI_FOUNDRY_SCOPE: &str = "https://ai.azure.com/.default";

pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Tokens this close to expiry are refreshed.
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Upper bound on a single token acquisition.
const TOKEN_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// A bearer token and the moment it stops being valid.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// Whether the token is expired or about to be.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.expires_on - Duration::seconds(EXPIRY_MARGIN_SECS) <= now
    }
}

/// Source of bearer tokens
#[async_trait::async_trait]
pub trait TokenCredential: Send + Sync {
    /// Acquire a token for `scope`
    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

/// A fixed token, useful for tokens minted out of band and for tests.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait::async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self, _scope: &str) -> Result<AccessToken> {
        Ok(AccessToken::new(self.token.clone(), Utc::now() + Duration::hours(1)))
    }
}

/// OAuth2 token endpoint response
#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    expires_in: i64,
}

/// OAuth2 error response
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Service principal authenticated with a client secret.
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority_host: String,
    timeout: std::time::Duration,
    client: reqwest::Client,
}

impl ClientSecretCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            timeout: TOKEN_REQUEST_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a different authority, e.g. a sovereign cloud.
    pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = host.into().trim_end_matches('/').to_string();
        self
    }

    /// Build from `AZURE_TENANT_ID`, `AZURE_CLIENT_ID`, `AZURE_CLIENT_SECRET`
    /// and optionally `AZURE_AUTHORITY_HOST`. Returns `None` when incomplete.
    pub fn from_env() -> Option<Self> {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        let credential = Self::new(
            var("AZURE_TENANT_ID")?,
            var("AZURE_CLIENT_ID")?,
            var("AZURE_CLIENT_SECRET")?,
        );
        Some(match var("AZURE_AUTHORITY_HOST") {
            Some(host) => credential.with_authority_host(host),
            None => credential,
        })
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host,
            urlencoding::encode(&self.tenant_id)
        )
    }
}

#[async_trait::async_trait]
impl TokenCredential for ClientSecretCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope),
        ];

        let response = self
            .client
            .post(self.token_url())
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Error::Authentication(format!("token request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Authentication(format!("failed to read token response: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<OAuthErrorResponse>(&body)
                .map(|e| match e.error_description {
                    Some(desc) => format!("{}: {}", e.error, desc),
                    None => e.error,
                })
                .unwrap_or(body);
            return Err(Error::Authentication(format!(
                "client secret credential rejected ({status}): {detail}"
            )));
        }

        let token: OAuthTokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Authentication(format!("invalid token response: {e}")))?;
        Ok(AccessToken::new(
            token.access_token,
            Utc::now() + Duration::seconds(token.expires_in),
        ))
    }
}

/// `az account get-access-token --output json`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_on: Option<String>,
    /// Newer CLI versions also emit a POSIX timestamp
    #[serde(default, rename = "expires_on")]
    expires_on_epoch: Option<i64>,
}

/// Token from the locally signed-in Azure CLI.
#[derive(Default)]
pub struct AzureCliCredential;

impl AzureCliCredential {
    pub fn new() -> Self {
        Self
    }

    fn parse_output(stdout: &str) -> Result<AccessToken> {
        let parsed: CliTokenResponse = serde_json::from_str(stdout)
            .map_err(|e| Error::Authentication(format!("unexpected Azure CLI output: {e}")))?;

        let expires_on = match (parsed.expires_on_epoch, parsed.expires_on.as_deref()) {
            (Some(epoch), _) => Utc
                .timestamp_opt(epoch, 0)
                .single()
                .ok_or_else(|| Error::Authentication(format!("invalid expiry timestamp {epoch}")))?,
            // Older CLI versions print local time without an offset
            (None, Some(local)) => NaiveDateTime::parse_from_str(local, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .and_then(|naive| chrono::Local.from_local_datetime(&naive).single())
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| Error::Authentication(format!("invalid expiry time {local}")))?,
            (None, None) => Utc::now() + Duration::minutes(30),
        };

        Ok(AccessToken::new(parsed.access_token, expires_on))
    }
}

#[async_trait::async_trait]
impl TokenCredential for AzureCliCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let program = if cfg!(windows) { "az.cmd" } else { "az" };
        let command = tokio::process::Command::new(program)
            .args(["account", "get-access-token", "--scope", scope, "--output", "json"])
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(TOKEN_REQUEST_TIMEOUT, command)
            .await
            .map_err(|_| Error::Authentication("Azure CLI did not answer in time".to_string()))?
            .map_err(|e| Error::Authentication(format!("Azure CLI not available: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Authentication(format!(
                "Azure CLI could not provide a token (run `az login`): {}",
                stderr.trim()
            )));
        }

        Self::parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Credential chain with token caching.
pub struct DefaultAzureCredential {
    sources: Vec<(&'static str, Arc<dyn TokenCredential>)>,
    cache: Mutex<Option<(String, AccessToken)>>,
}

impl DefaultAzureCredential {
    /// Environment service principal (when configured), then Azure CLI.
    pub fn new() -> Self {
        let mut sources: Vec<(&'static str, Arc<dyn TokenCredential>)> = Vec::new();
        if let Some(env) = ClientSecretCredential::from_env() {
            sources.push(("EnvironmentCredential", Arc::new(env)));
        }
        sources.push(("AzureCliCredential", Arc::new(AzureCliCredential::new())));
        Self::with_sources(sources)
    }

    /// Explicit chain, tried in order.
    pub fn with_sources(sources: Vec<(&'static str, Arc<dyn TokenCredential>)>) -> Self {
        Self {
            sources,
            cache: Mutex::new(None),
        }
    }
}

impl Default for DefaultAzureCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TokenCredential for DefaultAzureCredential {
    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let mut cache = self.cache.lock().await;
        if let Some((cached_scope, token)) = cache.as_ref() {
            if cached_scope == scope && !token.is_stale(Utc::now()) {
                return Ok(token.clone());
            }
        }

        let mut failures = Vec::new();
        for (name, source) in &self.sources {
            match source.get_token(scope).await {
                Ok(token) => {
                    tracing::debug!(source = name, expires_on = %token.expires_on, "acquired access token");
                    *cache = Some((scope.to_string(), token.clone()));
                    return Ok(token);
                }
                Err(e) => {
                    tracing::debug!(source = name, error = %e, "credential source failed");
                    failures.push(format!("{name}: {e}"));
                }
            }
        }

        Err(Error::Authentication(format!(
            "no credential source produced a token. Tried: {}",
            failures.join("; ")
        )))
    }
}
