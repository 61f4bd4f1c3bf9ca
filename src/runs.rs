/// Runs of an agent against a thread, and the steps they record.
use crate::client::{ProjectClient, segment};
use crate::error::{Error, Result};
use crate::models::{CreateRunRequest, ListOrder, ListPage, Run, RunStatus, RunStep};
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;

/// How `create_and_process` waits for a run to finish
#[derive(Debug, Clone, Copy)]
pub struct RunPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(600),
        }
    }
}

impl ProjectClient {
    pub async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<Run> {
        let request = CreateRunRequest {
            assistant_id: agent_id.to_string(),
        };
        self.post(&format!("threads/{}/runs", segment(thread_id)), &request)
            .await
    }

    pub async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.get(
            &format!("threads/{}/runs/{}", segment(thread_id), segment(run_id)),
            &[],
        )
        .await
    }

    pub async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.post(
            &format!("threads/{}/runs/{}/cancel", segment(thread_id), segment(run_id)),
            &json!({}),
        )
        .await
    }

    /// Start a run and poll it until it leaves the pending states.
    ///
    /// This client registers no function tools, so a run that asks for
    /// client-side action is cancelled and returned as such. Exceeding
    /// `policy.timeout` cancels the run and yields `Error::Timeout`.
    pub async fn create_and_process(
        &self,
        thread_id: &str,
        agent_id: &str,
        policy: RunPolicy,
    ) -> Result<Run> {
        let deadline = Instant::now() + policy.timeout;
        let mut run = self.create_run(thread_id, agent_id).await?;
        tracing::info!(run_id = %run.id, status = %run.status, "run created");

        let mut cancel_requested = false;
        loop {
            match &run.status {
                RunStatus::RequiresAction if !cancel_requested => {
                    tracing::warn!(run_id = %run.id, "run requires client-side action; cancelling");
                    self.cancel_run(thread_id, &run.id).await?;
                    cancel_requested = true;
                }
                // cancel already sent, wait for the service to act on it
                RunStatus::RequiresAction => {}
                _ if !run.status.is_pending() => {
                    tracing::info!(run_id = %run.id, status = %run.status, "run finished");
                    return Ok(run);
                }
                _ => {}
            }

            if Instant::now() >= deadline {
                tracing::warn!(run_id = %run.id, status = %run.status, "run timed out");
                if !cancel_requested {
                    if let Err(e) = self.cancel_run(thread_id, &run.id).await {
                        tracing::warn!(run_id = %run.id, error = %e, "failed to cancel timed out run");
                    }
                }
                return Err(Error::Timeout(format!(
                    "run {} still {} after {}s",
                    run.id,
                    run.status,
                    policy.timeout.as_secs()
                )));
            }

            tokio::time::sleep(policy.poll_interval).await;
            run = self.get_run(thread_id, &run.id).await?;
            tracing::debug!(run_id = %run.id, status = %run.status, "polled run");
        }
    }

    /// Steps of a run in the order they happened.
    pub async fn list_run_steps(&self, thread_id: &str, run_id: &str) -> Result<Vec<RunStep>> {
        let path = format!("threads/{}/runs/{}/steps", segment(thread_id), segment(run_id));
        let mut steps = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut query = vec![("order", ListOrder::Asc.as_str().to_string())];
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }
            let page: ListPage<RunStep> = self.get(&path, &query).await?;
            steps.extend(page.data);
            match (page.has_more, page.last_id) {
                (true, Some(last)) => after = Some(last),
                _ => break,
            }
        }
        Ok(steps)
    }
}
