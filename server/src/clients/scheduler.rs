use crate::error::{AppError, Result};
use crate::jobs::TaskKind;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

/// Deferred-task collaborator. The payload carries ids only; handlers
/// re-read current state at run time because the world may have moved on
/// between enqueue and execution.
#[async_trait]
pub trait TaskScheduler: Send + Sync {
    async fn schedule(
        &self,
        kind: TaskKind,
        payload: serde_json::Value,
        run_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// Scheduler backed by the workflow engine's enqueue endpoint.
///
/// An empty URL puts the scheduler in no-op mode (logs only), matching the
/// email sender's behavior for development environments.
pub struct HttpTaskScheduler {
    http: reqwest::Client,
    url: String,
}

impl HttpTaskScheduler {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl TaskScheduler for HttpTaskScheduler {
    async fn schedule(
        &self,
        kind: TaskKind,
        payload: serde_json::Value,
        run_at: DateTime<Utc>,
    ) -> Result<()> {
        if self.url.trim().is_empty() {
            warn!(kind = kind.as_str(), "deferred task suppressed (no-op mode)");
            return Ok(());
        }

        let response = self
            .http
            .post(&self.url)
            .json(&serde_json::json!({
                "kind": kind.as_str(),
                "payload": payload,
                "run_at": run_at,
            }))
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("workflow engine unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "workflow engine rejected task with status {}",
                response.status()
            )));
        }

        Ok(())
    }
}
