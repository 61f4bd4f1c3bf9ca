/// Wire types for the AI Foundry project and Agent Service REST API.
///
/// Only the fields this client reads are modeled; unknown fields are ignored.
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =====================================================================
// Connections
// =====================================================================

/// A project connection binding an external endpoint and credential to a name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub connection_type: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub credentials: Option<ConnectionCredentials>,
}

/// Credentials attached to a connection. `key` is only populated by the
/// with-credentials endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionCredentials {
    #[serde(rename = "type", default)]
    pub credential_type: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

/// Azure-style page: `{ "value": [...], "nextLink": "..." }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedConnections {
    #[serde(default)]
    pub value: Vec<Connection>,
    #[serde(default)]
    pub next_link: Option<String>,
}

// =====================================================================
// Agents
// =====================================================================

/// Reference to a project connection by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRef {
    pub id: String,
}

/// Browser automation tool parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserAutomationToolParameters {
    pub connection: ConnectionRef,
}

/// Tool enabled on an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDefinition {
    BrowserAutomation {
        browser_automation: BrowserAutomationToolParameters,
    },
    CodeInterpreter,
    #[serde(other)]
    Other,
}

impl ToolDefinition {
    /// Browser automation bound to the given connection
    pub fn browser_automation(connection_id: impl Into<String>) -> Self {
        ToolDefinition::BrowserAutomation {
            browser_automation: BrowserAutomationToolParameters {
                connection: ConnectionRef {
                    id: connection_id.into(),
                },
            },
        }
    }
}

/// Body of `POST /assistants`
#[derive(Debug, Clone, Serialize)]
pub struct CreateAgentRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

impl CreateAgentRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            name: None,
            instructions: None,
            tools: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.push(tool);
        self
    }

    /// Agent that can drive the browsers behind `connection_id`
    pub fn browser_automation(
        model: impl Into<String>,
        name: impl Into<String>,
        instructions: impl Into<String>,
        connection_id: impl Into<String>,
    ) -> Self {
        Self::new(model)
            .with_name(name)
            .with_instructions(instructions)
            .with_tool(ToolDefinition::browser_automation(connection_id))
    }
}

/// An agent definition stored by the service (`asst_...`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub model: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
}

/// Result of a delete call
#[derive(Debug, Clone, Deserialize)]
pub struct DeletionStatus {
    pub id: String,
    pub deleted: bool,
}

// =====================================================================
// Threads and messages
// =====================================================================

/// A conversation (`thread_...`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub created_at: Option<i64>,
}

/// Author of a thread message. The agent speaks as `assistant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    #[serde(rename = "assistant")]
    Agent,
}

/// Body of `POST /threads/{id}/messages`
#[derive(Debug, Clone, Serialize)]
pub struct CreateMessageRequest {
    pub role: MessageRole,
    pub content: String,
}

/// A turn within a thread (`msg_...`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default)]
    pub run_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl ThreadMessage {
    /// Text parts of the message, in order
    pub fn text_messages(&self) -> Vec<&MessageText> {
        self.content
            .iter()
            .filter_map(|c| match c {
                MessageContent::Text { text } => Some(text),
                MessageContent::Other => None,
            })
            .collect()
    }

    /// URL citations across all text parts
    pub fn url_citation_annotations(&self) -> Vec<&UrlCitation> {
        self.text_messages()
            .into_iter()
            .flat_map(|t| t.annotations.iter())
            .filter_map(|a| match a {
                Annotation::UrlCitation { url_citation, .. } => Some(url_citation),
                Annotation::Other => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: MessageText },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageText {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    UrlCitation {
        #[serde(default)]
        text: Option<String>,
        url_citation: UrlCitation,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlCitation {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Sort order for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    Asc,
    Desc,
}

impl ListOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListOrder::Asc => "asc",
            ListOrder::Desc => "desc",
        }
    }
}

/// OpenAI-style page: `{ "data": [...], "has_more": bool, "last_id": "..." }`
#[derive(Debug, Clone, Deserialize)]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

// =====================================================================
// Runs
// =====================================================================

/// Body of `POST /threads/{id}/runs`
#[derive(Debug, Clone, Serialize)]
pub struct CreateRunRequest {
    pub assistant_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
}

impl RunStatus {
    /// Whether the service is still working on the run
    pub fn is_pending(&self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.message) {
            (Some(code), Some(message)) => write!(f, "{code}: {message}"),
            (None, Some(message)) => f.write_str(message),
            (Some(code), None) => f.write_str(code),
            (None, None) => f.write_str("unknown error"),
        }
    }
}

/// One execution of an agent against a thread (`run_...`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    pub status: RunStatus,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

/// A unit of work inside a run (`step_...`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStep {
    pub id: String,
    pub status: String,
    pub step_details: StepDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepDetails {
    MessageCreation {
        #[serde(default)]
        message_creation: Value,
    },
    ToolCalls {
        #[serde(default)]
        tool_calls: Vec<ToolCall>,
    },
    #[serde(other)]
    Other,
}

/// A tool invocation recorded in a run step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolCall {
    BrowserAutomation {
        #[serde(default)]
        id: Option<String>,
        browser_automation: BrowserAutomationCall,
    },
    #[serde(other)]
    Other,
}

/// What the remote browser agent was asked and what it did
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserAutomationCall {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub steps: Vec<BrowserStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserStep {
    #[serde(default)]
    pub last_step_result: String,
    #[serde(default)]
    pub current_state: String,
    #[serde(default)]
    pub next_step: String,
}

/// Service error envelope: `{ "error": { "code": "...", "message": "..." } }`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
