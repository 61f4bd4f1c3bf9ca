/// Discovery of the project's Application Insights resource.
use crate::client::ProjectClient;
use crate::error::Result;

const APP_INSIGHTS_CONNECTION_TYPE: &str = "AppInsights";

impl ProjectClient {
    /// Connection string of the project's default Application Insights
    /// connection, or `None` when the project has none.
    pub async fn application_insights_connection_string(&self) -> Result<Option<String>> {
        let connections = self
            .list_connections(Some(APP_INSIGHTS_CONNECTION_TYPE), true)
            .await?;
        let Some(connection) = connections.into_iter().next() else {
            return Ok(None);
        };

        let detailed = self.get_connection_with_credentials(&connection.name).await?;
        Ok(detailed
            .credentials
            .and_then(|c| c.key)
            .filter(|key| !key.is_empty()))
    }
}

/// First `max_chars` characters of `value`, for showing secrets in logs.
pub fn preview(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
