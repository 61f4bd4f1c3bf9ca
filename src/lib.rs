//! Foundry Browser Agent - drive Azure AI Foundry Agent Service browser automation
//!
//! The browsers and the agent orchestration live in Azure. This crate is the
//! client side: it reads the project configuration, authenticates, creates an
//! agent bound to a Playwright Workspace connection, runs a task and reports
//! what the remote browser did.
//!
//! ## Features
//! - Environment-based configuration with `.env` support
//! - Azure credential chain (service principal, Azure CLI)
//! - Project REST client with retries for throttling and transient errors
//! - Connections, agents, threads, messages, runs and run steps
//! - Application Insights discovery and `tracing` spans
//! - Human-readable run transcript

/// Load environment variables from .env file
/// Call this in your main() function before reading settings
pub fn load_env() {
    dotenv::dotenv().ok();
}

pub mod config;
pub mod credential;
pub mod client;
pub mod models;
pub mod connections;
pub mod agents;
pub mod threads;
pub mod runs;
pub mod telemetry;
pub mod demo;
pub mod logging;
pub mod error;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::client::{ClientOptions, ProjectClient};
    pub use crate::config::Settings;
    pub use crate::credential::{DefaultAzureCredential, StaticTokenCredential, TokenCredential};
    pub use crate::demo::{BrowserAutomationDemo, DemoOutcome};
    pub use crate::models::*;
    pub use crate::runs::RunPolicy;
    pub use crate::error::{Error, Result};
}
