/// Project connections: named references to external endpoints such as a
/// Playwright Workspace or an Application Insights resource.
use crate::client::{ProjectClient, segment};
use crate::error::Result;
use crate::models::{Connection, PagedConnections};
use serde_json::json;

impl ProjectClient {
    /// Look up a connection by name. Credentials are not included.
    pub async fn get_connection(&self, name: &str) -> Result<Connection> {
        self.get(&format!("connections/{}", segment(name)), &[]).await
    }

    /// Look up a connection by name, including its secret.
    pub async fn get_connection_with_credentials(&self, name: &str) -> Result<Connection> {
        self.post(
            &format!("connections/{}/getConnectionWithCredentials", segment(name)),
            &json!({}),
        )
        .await
    }

    /// List connections, optionally filtered by type and default flag.
    pub async fn list_connections(
        &self,
        connection_type: Option<&str>,
        default_only: bool,
    ) -> Result<Vec<Connection>> {
        let mut query = Vec::new();
        if let Some(kind) = connection_type {
            query.push(("connectionType", kind.to_string()));
        }
        if default_only {
            query.push(("defaultConnection", "true".to_string()));
        }

        let mut connections = Vec::new();
        let mut page: PagedConnections = self.get("connections", &query).await?;
        loop {
            connections.append(&mut page.value);
            match page.next_link.take() {
                Some(next) => page = self.get_link(&next).await?,
                None => break,
            }
        }
        Ok(connections)
    }
}
