/// Agent definitions (`/assistants`).
use crate::client::{ProjectClient, segment};
use crate::error::Result;
use crate::models::{Agent, CreateAgentRequest, DeletionStatus};

impl ProjectClient {
    pub async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent> {
        let agent: Agent = self.post("assistants", request).await?;
        tracing::info!(agent_id = %agent.id, model = %agent.model, "created agent");
        Ok(agent)
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<Agent> {
        self.get(&format!("assistants/{}", segment(agent_id)), &[]).await
    }

    pub async fn delete_agent(&self, agent_id: &str) -> Result<DeletionStatus> {
        self.delete(&format!("assistants/{}", segment(agent_id))).await
    }
}
