/// Configuration for a browser automation run, read from the environment.
use crate::error::{Error, Result};
use std::time::Duration;

pub const PROJECT_ENDPOINT: &str = "PROJECT_ENDPOINT";
pub const PLAYWRIGHT_CONNECTION_NAME: &str = "AZURE_PLAYWRIGHT_CONNECTION_NAME";
pub const MODEL_DEPLOYMENT_NAME: &str = "MODEL_DEPLOYMENT_NAME";
pub const CONTENT_RECORDING_ENABLED: &str = "AZURE_TRACING_GEN_AI_CONTENT_RECORDING_ENABLED";
pub const API_VERSION: &str = "AZURE_AI_AGENTS_API_VERSION";
pub const POLL_INTERVAL_SECS: &str = "AGENT_RUN_POLL_INTERVAL_SECS";
pub const RUN_TIMEOUT_SECS: &str = "AGENT_RUN_TIMEOUT_SECS";

/// Variables that must be present (and non-empty) before anything runs.
pub const REQUIRED_VARS: [&str; 3] = [PROJECT_ENDPOINT, PLAYWRIGHT_CONNECTION_NAME, MODEL_DEPLOYMENT_NAME];

pub const DEFAULT_API_VERSION: &str = "v1";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 600;

/// Settings for one invocation
#[derive(Debug, Clone)]
pub struct Settings {
    /// AI Foundry project endpoint, without a trailing slash
    pub project_endpoint: String,

    /// Name of the connection pointing at the Playwright Workspace
    pub connection_name: String,

    /// Model deployment the agent runs on, e.g. "gpt-4.1"
    pub model_deployment: String,

    /// Whether message content may be attached to trace events
    pub record_content: bool,

    /// True when `record_content` was not set explicitly and defaulted to on
    pub record_content_defaulted: bool,

    pub api_version: String,
    pub poll_interval: Duration,
    pub run_timeout: Duration,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup function.
    ///
    /// Every missing required variable is collected before returning, so the
    /// operator sees the full list at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|key| get(**key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingEnvironment(missing));
        }

        let project_endpoint = normalize_endpoint(&get(PROJECT_ENDPOINT).unwrap_or_default())?;
        let connection_name = get(PLAYWRIGHT_CONNECTION_NAME).unwrap_or_default();
        let model_deployment = get(MODEL_DEPLOYMENT_NAME).unwrap_or_default();

        let (record_content, record_content_defaulted) = match get(CONTENT_RECORDING_ENABLED) {
            Some(value) => (parse_bool(CONTENT_RECORDING_ENABLED, &value)?, false),
            None => (true, true),
        };

        let api_version = get(API_VERSION).unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let poll_interval = Duration::from_secs(parse_secs(
            POLL_INTERVAL_SECS,
            get(POLL_INTERVAL_SECS),
            DEFAULT_POLL_INTERVAL_SECS,
        )?);
        let run_timeout = Duration::from_secs(parse_secs(
            RUN_TIMEOUT_SECS,
            get(RUN_TIMEOUT_SECS),
            DEFAULT_RUN_TIMEOUT_SECS,
        )?);

        Ok(Self {
            project_endpoint,
            connection_name,
            model_deployment,
            record_content,
            record_content_defaulted,
            api_version,
            poll_interval,
            run_timeout,
        })
    }
}

fn normalize_endpoint(raw: &str) -> Result<String> {
    let endpoint = raw.trim_end_matches('/');
    if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
        return Err(Error::InvalidConfig(format!(
            "{PROJECT_ENDPOINT} must be an https:// URL, got: {raw}"
        )));
    }
    Ok(endpoint.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidConfig(format!("{key} must be true or false, got: {value}"))),
    }
}

fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<u64> {
    match value {
        None => Ok(default),
        Some(v) => match v.parse::<u64>() {
            Ok(0) | Err(_) => Err(Error::InvalidConfig(format!(
                "{key} must be a positive number of seconds, got: {v}"
            ))),
            Ok(secs) => Ok(secs),
        },
    }
}
