//! Browser automation with Azure AI Foundry Agent Service
//!
//! Run with:
//! ```bash
//! cargo run --bin browser-automation
//! ```
//!
//! Prerequisites:
//! - A Playwright Workspace and its access token
//! - An AI Foundry connection whose target is the workspace `wss://` endpoint
//! - PROJECT_ENDPOINT, AZURE_PLAYWRIGHT_CONNECTION_NAME and MODEL_DEPLOYMENT_NAME
//!   set in the environment or a .env file
//! - `az login`, or AZURE_TENANT_ID / AZURE_CLIENT_ID / AZURE_CLIENT_SECRET

use anyhow::Context;
use clap::Parser;
use foundry_browser_agent::Error;
use foundry_browser_agent::client::ProjectClient;
use foundry_browser_agent::config::Settings;
use foundry_browser_agent::demo::{BrowserAutomationDemo, write_missing_environment, write_troubleshooting};
use foundry_browser_agent::logging::{LogLevel, init_logging};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "browser-automation", version, about = "Run a browser automation task through Azure AI Foundry Agent Service")]
struct Cli {
    /// Task for the agent (defaults to the MSFT year-to-date lookup)
    #[arg(long, conflicts_with = "task_file")]
    task: Option<String>,

    /// Read the task from a file
    #[arg(long)]
    task_file: Option<PathBuf>,

    /// Delete the agent when finished instead of keeping it
    #[arg(long)]
    cleanup: bool,

    /// Diagnostic log level on stderr (debug, info, warn, error)
    #[arg(long, env = "BROWSER_AUTOMATION_LOG", default_value = "warn")]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() -> ExitCode {
    foundry_browser_agent::load_env();
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let mut stdout = std::io::stdout();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(Error::MissingEnvironment(missing)) => {
            let _ = write_missing_environment(&mut stdout, &missing);
            return ExitCode::from(2);
        }
        Err(e) => {
            eprintln!("❌ {e}");
            return ExitCode::from(e.exit_code() as u8);
        }
    };

    let task = match read_task(&cli) {
        Ok(task) => task,
        Err(e) => {
            eprintln!("❌ {e:#}");
            return ExitCode::from(2);
        }
    };

    let mut demo = BrowserAutomationDemo::new(settings.clone()).with_cleanup(cli.cleanup);
    if let Some(task) = task {
        demo = demo.with_task(task);
    }

    let result = match ProjectClient::from_settings(&settings) {
        Ok(client) => demo.run(&client, &mut stdout).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            tracing::info!(agent_id = %outcome.agent_id, thread_id = %outcome.thread_id, run_id = %outcome.run_id, "done");
            ExitCode::SUCCESS
        }
        // already reported in the transcript
        Err(e @ Error::RunFailed { .. }) => ExitCode::from(e.exit_code() as u8),
        Err(e) => {
            let _ = write_troubleshooting(&mut stdout, &e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn read_task(cli: &Cli) -> anyhow::Result<Option<String>> {
    if let Some(path) = &cli.task_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read task file {}", path.display()))?;
        let text = text.trim();
        anyhow::ensure!(!text.is_empty(), "task file {} is empty", path.display());
        return Ok(Some(text.to_string()));
    }
    match cli.task.as_deref().map(str::trim) {
        Some("") => anyhow::bail!("--task must not be empty"),
        Some(task) => Ok(Some(task.to_string())),
        None => Ok(None),
    }
}
