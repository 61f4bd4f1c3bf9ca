/// Threads and the messages inside them.
use crate::client::{ProjectClient, segment};
use crate::error::Result;
use crate::models::{CreateMessageRequest, ListOrder, ListPage, MessageRole, Thread, ThreadMessage};
use serde_json::json;

impl ProjectClient {
    pub async fn create_thread(&self) -> Result<Thread> {
        let thread: Thread = self.post("threads", &json!({})).await?;
        tracing::info!(thread_id = %thread.id, "created thread");
        Ok(thread)
    }

    pub async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Result<ThreadMessage> {
        let request = CreateMessageRequest {
            role,
            content: content.into(),
        };
        self.post(&format!("threads/{}/messages", segment(thread_id)), &request)
            .await
    }

    /// All messages in the thread, following `has_more` pages.
    pub async fn list_messages(&self, thread_id: &str, order: ListOrder) -> Result<Vec<ThreadMessage>> {
        let path = format!("threads/{}/messages", segment(thread_id));
        let mut messages = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut query = vec![("order", order.as_str().to_string())];
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }
            let page: ListPage<ThreadMessage> = self.get(&path, &query).await?;
            messages.extend(page.data);
            match (page.has_more, page.last_id) {
                (true, Some(last)) => after = Some(last),
                _ => break,
            }
        }
        Ok(messages)
    }

    /// Most recent message written by `role`, if any.
    pub async fn get_last_message_by_role(
        &self,
        thread_id: &str,
        role: MessageRole,
    ) -> Result<Option<ThreadMessage>> {
        let path = format!("threads/{}/messages", segment(thread_id));
        let mut after: Option<String> = None;
        loop {
            let mut query = vec![("order", ListOrder::Desc.as_str().to_string())];
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }
            let page: ListPage<ThreadMessage> = self.get(&path, &query).await?;
            if let Some(found) = page.data.into_iter().find(|m| m.role == role) {
                return Ok(Some(found));
            }
            match (page.has_more, page.last_id) {
                (true, Some(last)) => after = Some(last),
                _ => return Ok(None),
            }
        }
    }
}
