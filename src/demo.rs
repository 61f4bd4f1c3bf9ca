/// The browser automation walkthrough: one agent, one thread, one run, and a
/// human-readable transcript of what the remote browser did.
use crate::client::ProjectClient;
use crate::config::{CONTENT_RECORDING_ENABLED, MODEL_DEPLOYMENT_NAME, PLAYWRIGHT_CONNECTION_NAME, PROJECT_ENDPOINT, Settings};
use crate::error::{Error, Result};
use crate::models::{CreateAgentRequest, MessageRole, RunStatus, RunStep, StepDetails, ToolCall};
use crate::runs::RunPolicy;
use crate::telemetry::preview;
use std::io::Write;
use tracing::Instrument;

pub const AGENT_NAME: &str = "browser-automation-agent";

pub const AGENT_INSTRUCTIONS: &str = "You are a helpful assistant with browser automation capabilities. \
You can navigate websites, extract information, and interact with web pages. \
Use the browser automation tool to complete tasks as requested.";

pub const DEFAULT_TASK: &str = "Your goal is to report the Microsoft year-to-date stock price change.

To do that:
1. Go to the website finance.yahoo.com
2. At the top of the page, find the search bar
3. Enter 'MSFT' to get Microsoft stock information
4. On the resulting page, find the default chart showing Microsoft stock price
5. Click on 'YTD' at the top of that chart
6. Report the percent value that shows below the chart

Please complete this task and provide me with the YTD percentage change.";

const RULE_WIDTH: usize = 80;
const CONNECTION_STRING_PREVIEW: usize = 50;
const PORTAL_URL: &str = "https://ai.azure.com/";

/// Ids of the service objects a successful walkthrough leaves behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoOutcome {
    pub agent_id: String,
    pub thread_id: String,
    pub run_id: String,
    pub agent_deleted: bool,
}

/// One browser automation walkthrough against a project
pub struct BrowserAutomationDemo {
    settings: Settings,
    task: String,
    cleanup: bool,
}

impl BrowserAutomationDemo {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            task: DEFAULT_TASK.to_string(),
            cleanup: false,
        }
    }

    /// Replace the default stock-price task
    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    /// Delete the agent at the end instead of keeping it for reuse
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Label for the `task.type` span field
    pub fn task_type(&self) -> &'static str {
        if self.task == DEFAULT_TASK {
            "stock_price_extraction"
        } else {
            "custom"
        }
    }

    /// Run the walkthrough, writing the transcript to `out`.
    ///
    /// A failed run is reported in the transcript and returned as
    /// `Error::RunFailed`. With cleanup on, the agent is deleted whenever it
    /// was created, whether or not the rest succeeded.
    pub async fn run<W: Write>(&self, client: &ProjectClient, out: &mut W) -> Result<DemoOutcome> {
        if self.settings.record_content_defaulted {
            writeln!(out, "✅ Enabled trace content recording")?;
        }
        writeln!(out, "🔧 Initializing Azure AI Foundry Project Client...")?;
        tracing::debug!(endpoint = client.endpoint(), api_version = client.api_version(), "project client ready");

        let app_insights = self.discover_tracing(client, out).await?;

        let span = tracing::info_span!("browser_automation_demo", endpoint = client.endpoint());
        self.walkthrough(client, out, app_insights)
            .instrument(span)
            .await
    }

    /// Look for the project's Application Insights connection. Returns true
    /// when one is connected.
    async fn discover_tracing<W: Write>(&self, client: &ProjectClient, out: &mut W) -> Result<bool> {
        writeln!(out, "📊 Setting up tracing...")?;
        match client.application_insights_connection_string().await {
            Ok(Some(connection_string)) => {
                writeln!(out, "   Found Application Insights connection")?;
                writeln!(
                    out,
                    "   Connection string: {}...",
                    preview(&connection_string, CONNECTION_STRING_PREVIEW)
                )?;
                writeln!(out, "ℹ️  Client spans are written to the local log (--log-level info).")?;
                writeln!(out, "   They are not exported to Application Insights by this tool.")?;
                Ok(true)
            }
            Ok(None) => {
                writeln!(out, "⚠️  No Application Insights connected.")?;
                writeln!(out)?;
                writeln!(out, "   📋 To connect one:")?;
                writeln!(out, "   1. Go to {PORTAL_URL}")?;
                writeln!(out, "   2. Select your project")?;
                writeln!(out, "   3. Go to 'Tracing' in the left sidebar")?;
                writeln!(out, "   4. Click 'Connect' or 'Create new' Application Insights resource")?;
                writeln!(out, "   5. Wait for connection to complete")?;
                writeln!(out, "   6. Re-run this command")?;
                Ok(false)
            }
            Err(e) => {
                tracing::debug!(error = ?e, "tracing discovery failed");
                writeln!(out, "⚠️  Could not look up Application Insights: {e}")?;
                writeln!(out, "   Continuing without it...")?;
                Ok(false)
            }
        }
    }

    async fn walkthrough<W: Write>(
        &self,
        client: &ProjectClient,
        out: &mut W,
        app_insights: bool,
    ) -> Result<DemoOutcome> {
        let settings = &self.settings;

        writeln!(out)?;
        writeln!(out, "🔗 Retrieving Playwright connection: {}", settings.connection_name)?;
        let connection = client.get_connection(&settings.connection_name).await?;
        writeln!(out, "✅ Connected! Connection ID: {}", connection.id)?;

        writeln!(out)?;
        writeln!(out, "🤖 Creating AI Agent with Browser Automation tool...")?;
        let request = CreateAgentRequest::browser_automation(
            settings.model_deployment.clone(),
            AGENT_NAME,
            AGENT_INSTRUCTIONS,
            connection.id.clone(),
        );
        let agent = client
            .create_agent(&request)
            .instrument(tracing::info_span!("create_agent", model = %settings.model_deployment))
            .await?;
        writeln!(out, "✅ Agent created! Agent ID: {}", agent.id)?;

        let result = self.converse(client, out, &agent.id).await;

        let agent_deleted = if self.cleanup {
            self.delete_agent(client, out, &agent.id).await?
        } else {
            false
        };
        let (thread_id, run_id) = result?;

        if !self.cleanup {
            writeln!(out)?;
            writeln!(out, "💾 Agent preserved for future use!")?;
            writeln!(out, "   Agent ID: {}", agent.id)?;
            writeln!(out, "   Thread ID: {thread_id}")?;
            writeln!(out)?;
            writeln!(out, "   You can reuse this agent in future runs.")?;
        }

        writeln!(out)?;
        writeln!(out, "✨ Demo completed successfully!")?;
        write_tracing_footer(out, app_insights)?;

        Ok(DemoOutcome {
            agent_id: agent.id,
            thread_id,
            run_id,
            agent_deleted,
        })
    }

    /// Thread, task message, run, steps and the final answer. Returns the
    /// thread and run ids.
    async fn converse<W: Write>(
        &self,
        client: &ProjectClient,
        out: &mut W,
        agent_id: &str,
    ) -> Result<(String, String)> {
        let settings = &self.settings;

        writeln!(out)?;
        writeln!(out, "💬 Creating conversation thread...")?;
        let thread = client
            .create_thread()
            .instrument(tracing::info_span!("create_thread"))
            .await?;
        writeln!(out, "✅ Thread created! Thread ID: {}", thread.id)?;

        writeln!(out)?;
        writeln!(out, "📝 Sending task to agent...")?;
        let message_span = tracing::info_span!("create_message", thread.id = %thread.id);
        if settings.record_content {
            message_span.in_scope(|| tracing::debug!(content = %self.task, "task message"));
        }
        let message = client
            .create_message(&thread.id, MessageRole::User, self.task.clone())
            .instrument(message_span)
            .await?;
        writeln!(out, "✅ Message created! Message ID: {}", message.id)?;

        writeln!(out)?;
        writeln!(out, "⏳ Agent is working... This may take a minute as it navigates the website...")?;
        writeln!(out, "   (The agent will launch a remote browser and carry out the task)")?;

        let run_span = tracing::info_span!(
            "agent_run",
            agent.id = %agent_id,
            thread.id = %thread.id,
            "task.type" = self.task_type(),
            run.id = tracing::field::Empty,
            run.status = tracing::field::Empty,
        );
        let policy = RunPolicy {
            poll_interval: settings.poll_interval,
            timeout: settings.run_timeout,
        };
        let run = client
            .create_and_process(&thread.id, agent_id, policy)
            .instrument(run_span.clone())
            .await?;
        run_span.record("run.id", run.id.as_str());
        run_span.record("run.status", run.status.as_str());

        writeln!(out)?;
        writeln!(out, "✅ Agent run completed! Status: {}", run.status)?;

        if run.status == RunStatus::Failed {
            let message = run
                .last_error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string());
            writeln!(out, "❌ Run failed: {message}")?;
            return Err(Error::RunFailed {
                run_id: run.id,
                message,
            });
        }

        writeln!(out)?;
        writeln!(out, "📊 Browser Automation Steps:")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        let steps = client.list_run_steps(&thread.id, &run.id).await?;
        write_steps(out, &steps)?;

        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "🎯 Agent's Final Response:")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        match client.get_last_message_by_role(&thread.id, MessageRole::Agent).await? {
            Some(response) => {
                for text in response.text_messages() {
                    writeln!(out)?;
                    writeln!(out, "{}", text.value)?;
                }
                let citations = response.url_citation_annotations();
                if !citations.is_empty() {
                    writeln!(out)?;
                    writeln!(out, "📎 Citations:")?;
                    for citation in citations {
                        let title = citation.title.as_deref().unwrap_or(&citation.url);
                        writeln!(out, "   - {}: {}", title, citation.url)?;
                    }
                }
            }
            None => {
                writeln!(out)?;
                writeln!(out, "(the agent did not reply)")?;
            }
        }

        Ok((thread.id, run.id))
    }

    /// Delete the agent. A failed delete is reported, never returned, so it
    /// cannot hide the outcome of the run.
    async fn delete_agent<W: Write>(&self, client: &ProjectClient, out: &mut W, agent_id: &str) -> Result<bool> {
        writeln!(out)?;
        match client.delete_agent(agent_id).await {
            Ok(status) => {
                writeln!(out, "🧹 Agent deleted: {} ({})", agent_id, status.deleted)?;
                Ok(status.deleted)
            }
            Err(e) => {
                tracing::warn!(agent_id, error = %e, "failed to delete agent");
                writeln!(out, "⚠️  Could not delete agent {agent_id}: {e}")?;
                Ok(false)
            }
        }
    }
}

/// One block per run step; browser automation calls show their input,
/// output and the numbered browser steps.
pub fn write_steps<W: Write>(out: &mut W, steps: &[RunStep]) -> std::io::Result<()> {
    for (number, step) in steps.iter().enumerate() {
        writeln!(out)?;
        writeln!(out, "Step {} - Status: {}", number + 1, step.status)?;

        let StepDetails::ToolCalls { tool_calls } = &step.step_details else {
            continue;
        };
        for call in tool_calls {
            let ToolCall::BrowserAutomation { browser_automation, .. } = call else {
                continue;
            };
            writeln!(out)?;
            writeln!(out, "  🌐 Browser Automation Tool Call:")?;
            writeln!(out, "     Input: {}", browser_automation.input)?;
            writeln!(out, "     Output: {}", browser_automation.output)?;

            if !browser_automation.steps.is_empty() {
                writeln!(out)?;
                writeln!(out, "     Browser Steps:")?;
                for (i, browser_step) in browser_automation.steps.iter().enumerate() {
                    writeln!(out, "       {}. Last result: {}", i + 1, browser_step.last_step_result)?;
                    writeln!(out, "          Current state: {}", browser_step.current_state)?;
                    writeln!(out, "          Next step: {}", browser_step.next_step)?;
                }
            }
        }
    }
    Ok(())
}

fn write_tracing_footer<W: Write>(out: &mut W, app_insights: bool) -> std::io::Result<()> {
    writeln!(out)?;
    if app_insights {
        writeln!(out, "📊 Application Insights is connected to this project.")?;
        writeln!(out, "   This run's client spans went to the local log only.")?;
        writeln!(out, "   Attach an OpenTelemetry exporter to see them under Your Project > Tracing.")?;
    } else {
        writeln!(out, "⚠️  No Application Insights is connected to this project.")?;
        writeln!(out, "   Connect one in the portal ({PORTAL_URL}) to collect traces.")?;
    }
    Ok(())
}

/// Tell the operator which variables to set.
pub fn write_missing_environment<W: Write>(out: &mut W, missing: &[String]) -> std::io::Result<()> {
    writeln!(out, "❌ Missing required environment variables:")?;
    for var in missing {
        writeln!(out, "   - {var}")?;
    }
    writeln!(out)?;
    writeln!(out, "Please set these environment variables before running.")?;
    writeln!(out)?;
    writeln!(out, "Example:")?;
    writeln!(
        out,
        "$env:{PROJECT_ENDPOINT} = \"https://your-project.services.ai.azure.com/api/projects/your-project-id\""
    )?;
    writeln!(out, "$env:{PLAYWRIGHT_CONNECTION_NAME} = \"playwright-connection\"")?;
    writeln!(out, "$env:{MODEL_DEPLOYMENT_NAME} = \"gpt-4.1\"")?;
    writeln!(out)?;
    writeln!(out, "Optional (for tracing):")?;
    writeln!(out, "$env:{CONTENT_RECORDING_ENABLED} = \"true\"")?;
    Ok(())
}

/// Error line plus the usual suspects.
pub fn write_troubleshooting<W: Write>(out: &mut W, error: &Error) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "❌ Error: {error}")?;
    writeln!(out)?;
    writeln!(out, "Troubleshooting:")?;
    writeln!(out, "1. Ensure you have created a Playwright Workspace in Azure Portal")?;
    writeln!(out, "2. Verify the connection is created in AI Foundry portal under Connected Resources")?;
    writeln!(out, "3. Check that your {PROJECT_ENDPOINT} is correct")?;
    writeln!(out, "4. Ensure your identity has 'Contributor' role on the Playwright Workspace")?;
    if matches!(error, Error::Authentication(_)) {
        writeln!(out, "5. Sign in with `az login` or set AZURE_TENANT_ID, AZURE_CLIENT_ID and AZURE_CLIENT_SECRET")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_support::client_for;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

    fn settings(server: &MockServer) -> Settings {
        settings_for(&server.uri())
    }

    fn settings_for(endpoint: &str) -> Settings {
        Settings {
            project_endpoint: endpoint.to_string(),
            connection_name: "playwright-connection".to_string(),
            model_deployment: "gpt-4.1".to_string(),
            record_content: true,
            record_content_defaulted: true,
            api_version: "v1".to_string(),
            poll_interval: Duration::from_millis(5),
            run_timeout: Duration::from_secs(5),
        }
    }

    async fn mount_happy_path(server: &MockServer, run_status: &str) {
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/connections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
            .mount(server)
            .await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/connections/playwright-connection"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "playwright-connection",
                "id": "conn-playwright",
                "type": "Serverless",
                "target": "wss://eastus.api.playwright.microsoft.com/playwrightworkspaces/w/browsers"
            })))
            .mount(server)
            .await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/assistants"))
            .and(matchers::body_partial_json(json!({
                "name": AGENT_NAME,
                "tools": [{ "type": "browser_automation", "browser_automation": { "connection": { "id": "conn-playwright" } } }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "asst_1", "model": "gpt-4.1", "name": AGENT_NAME
            })))
            .mount(server)
            .await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/threads"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "thread_1" })))
            .mount(server)
            .await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/threads/thread_1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_1", "role": "user",
                "content": [{ "type": "text", "text": { "value": DEFAULT_TASK, "annotations": [] } }]
            })))
            .mount(server)
            .await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/threads/thread_1/runs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "run_1", "status": "queued" })))
            .mount(server)
            .await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/threads/thread_1/runs/run_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "run_1",
                "status": run_status,
                "last_error": { "code": "server_error", "message": "browser session lost" }
            })))
            .mount(server)
            .await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/threads/thread_1/runs/run_1/steps"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": "step_1",
                    "status": "completed",
                    "step_details": {
                        "type": "tool_calls",
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "browser_automation",
                            "browser_automation": {
                                "input": "Find MSFT YTD change",
                                "output": "MSFT YTD: +12.34%",
                                "steps": [{
                                    "last_step_result": "Searched for MSFT",
                                    "current_state": "Quote page",
                                    "next_step": "Click YTD"
                                }]
                            }
                        }]
                    }
                }, {
                    "id": "step_2",
                    "status": "completed",
                    "step_details": { "type": "message_creation", "message_creation": { "message_id": "msg_2" } }
                }],
                "has_more": false
            })))
            .mount(server)
            .await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/threads/thread_1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "id": "msg_2",
                    "role": "assistant",
                    "content": [{
                        "type": "text",
                        "text": {
                            "value": "Microsoft is up 12.34% year to date.",
                            "annotations": [{
                                "type": "url_citation",
                                "url_citation": { "url": "https://finance.yahoo.com/quote/MSFT", "title": "MSFT quote" }
                            }]
                        }
                    }]
                }],
                "has_more": false
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_happy_path_transcript() {
        let server = MockServer::start().await;
        mount_happy_path(&server, "completed").await;

        let client = client_for(&server);
        let demo = BrowserAutomationDemo::new(settings(&server));
        let mut out = Vec::new();
        let outcome = demo.run(&client, &mut out).await.unwrap();
        let transcript = String::from_utf8(out).unwrap();

        assert_eq!(
            outcome,
            DemoOutcome {
                agent_id: "asst_1".to_string(),
                thread_id: "thread_1".to_string(),
                run_id: "run_1".to_string(),
                agent_deleted: false,
            }
        );

        let expected_in_order = [
            "✅ Enabled trace content recording",
            "⚠️  No Application Insights connected.",
            "✅ Connected! Connection ID: conn-playwright",
            "✅ Agent created! Agent ID: asst_1",
            "✅ Thread created! Thread ID: thread_1",
            "✅ Message created! Message ID: msg_1",
            "✅ Agent run completed! Status: completed",
            "Step 1 - Status: completed",
            "     Input: Find MSFT YTD change",
            "     Output: MSFT YTD: +12.34%",
            "       1. Last result: Searched for MSFT",
            "          Next step: Click YTD",
            "Step 2 - Status: completed",
            "🎯 Agent's Final Response:",
            "Microsoft is up 12.34% year to date.",
            "   - MSFT quote: https://finance.yahoo.com/quote/MSFT",
            "💾 Agent preserved for future use!",
            "✨ Demo completed successfully!",
            "⚠️  No Application Insights is connected to this project.",
        ];
        let mut cursor = 0;
        for line in expected_in_order {
            let found = transcript[cursor..]
                .find(line)
                .unwrap_or_else(|| panic!("missing or out of order: {line}\n---\n{transcript}"));
            cursor += found + line.len();
        }
    }

    #[tokio::test]
    async fn test_failed_run_stops_transcript() {
        let server = MockServer::start().await;
        mount_happy_path(&server, "failed").await;

        let client = client_for(&server);
        let demo = BrowserAutomationDemo::new(settings(&server));
        let mut out = Vec::new();
        let err = demo.run(&client, &mut out).await.unwrap_err();
        let transcript = String::from_utf8(out).unwrap();

        assert!(matches!(err, Error::RunFailed { ref run_id, .. } if run_id == "run_1"));
        assert!(transcript.contains("✅ Agent run completed! Status: failed"));
        assert!(transcript.contains("❌ Run failed: server_error: browser session lost"));
        assert!(!transcript.contains("Browser Automation Steps"));
    }

    #[tokio::test]
    async fn test_cleanup_deletes_agent_and_custom_task() {
        let server = MockServer::start().await;
        mount_happy_path(&server, "completed").await;
        Mock::given(matchers::method("DELETE"))
            .and(matchers::path("/assistants/asst_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "asst_1", "deleted": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let demo = BrowserAutomationDemo::new(settings(&server))
            .with_task("Open example.com and report the page title")
            .with_cleanup(true);
        let mut out = Vec::new();
        let outcome = demo.run(&client, &mut out).await.unwrap();
        let transcript = String::from_utf8(out).unwrap();

        assert!(outcome.agent_deleted);
        assert!(transcript.contains("🧹 Agent deleted: asst_1"));
        assert!(!transcript.contains("Agent preserved"));
    }

    #[tokio::test]
    async fn test_cleanup_runs_after_failed_run() {
        let server = MockServer::start().await;
        mount_happy_path(&server, "failed").await;
        Mock::given(matchers::method("DELETE"))
            .and(matchers::path("/assistants/asst_1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "asst_1", "deleted": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let demo = BrowserAutomationDemo::new(settings(&server)).with_cleanup(true);
        let mut out = Vec::new();
        let err = demo.run(&client, &mut out).await.unwrap_err();
        let transcript = String::from_utf8(out).unwrap();

        assert!(matches!(err, Error::RunFailed { .. }));
        assert!(transcript.contains("🧹 Agent deleted: asst_1 (true)"));
        assert!(!transcript.contains("Demo completed successfully"));
    }

    #[tokio::test]
    async fn test_failed_cleanup_keeps_run_error() {
        let server = MockServer::start().await;
        mount_happy_path(&server, "failed").await;
        Mock::given(matchers::method("DELETE"))
            .and(matchers::path("/assistants/asst_1"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": "Forbidden", "message": "no delete permission" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let demo = BrowserAutomationDemo::new(settings(&server)).with_cleanup(true);
        let mut out = Vec::new();
        let err = demo.run(&client, &mut out).await.unwrap_err();
        let transcript = String::from_utf8(out).unwrap();

        assert!(matches!(err, Error::RunFailed { ref run_id, .. } if run_id == "run_1"));
        assert!(transcript.contains("⚠️  Could not delete agent asst_1: Service returned 403 (Forbidden): no delete permission"));
    }

    #[test]
    fn test_task_type() {
        let demo = BrowserAutomationDemo::new(settings_for("https://demo.services.ai.azure.com/api/projects/demo"));
        assert_eq!(demo.task_type(), "stock_price_extraction");
        assert_eq!(demo.with_task("Open example.com").task_type(), "custom");
    }

    #[tokio::test]
    async fn test_tracing_discovered() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/connections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [{ "name": "appi", "id": "id-appi", "type": "AppInsights" }]
            })))
            .mount(&server)
            .await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/connections/appi/getConnectionWithCredentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "appi",
                "id": "id-appi",
                "credentials": { "type": "ApiKey", "key": "InstrumentationKey=11111111-2222-3333-4444-555555555555;IngestionEndpoint=https://eastus.in.applicationinsights.azure.com/" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let demo = BrowserAutomationDemo::new(settings(&server));
        let mut out = Vec::new();
        let enabled = demo.discover_tracing(&client, &mut out).await.unwrap();
        let transcript = String::from_utf8(out).unwrap();

        assert!(enabled);
        assert!(transcript.contains(
            "   Connection string: InstrumentationKey=11111111-2222-3333-4444-5555555..."
        ));
        assert!(transcript.contains("not exported to Application Insights"));
        assert!(!transcript.contains("Tracing enabled"));
    }

    #[tokio::test]
    async fn test_tracing_discovery_failure_is_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/connections"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": "Forbidden", "message": "no access" }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let demo = BrowserAutomationDemo::new(settings(&server));
        let mut out = Vec::new();
        let enabled = demo.discover_tracing(&client, &mut out).await.unwrap();
        let transcript = String::from_utf8(out).unwrap();

        assert!(!enabled);
        assert!(transcript.contains("⚠️  Could not look up Application Insights: Service returned 403 (Forbidden): no access"));
        assert!(transcript.contains("Continuing without it..."));
    }

    #[test]
    fn test_missing_environment_message() {
        let mut out = Vec::new();
        write_missing_environment(&mut out, &["PROJECT_ENDPOINT".to_string()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("❌ Missing required environment variables:\n   - PROJECT_ENDPOINT\n"));
        assert!(text.contains("$env:MODEL_DEPLOYMENT_NAME = \"gpt-4.1\""));
    }

    #[test]
    fn test_troubleshooting_mentions_login_for_auth_errors() {
        let mut out = Vec::new();
        write_troubleshooting(&mut out, &Error::Authentication("no token".to_string())).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("❌ Error: Authentication failed: no token"));
        assert!(text.contains("az login"));
    }
}
