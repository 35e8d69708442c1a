use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::model::leave_request::DecisionAction;

/// Initial payload handed to the engine when a workflow is started. The
/// engine echoes these fields back on every event it delivers, which is how
/// the notification handler recomputes the request identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInput {
    pub applicant_id: String,
    pub applicant_name: String,
    /// Epoch milliseconds, UTC.
    pub from_instant: i64,
    pub to_instant: i64,
    pub reason: String,
}

/// Structured outcome reported back on a resumed continuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOutcome {
    #[serde(rename = "type")]
    pub kind: DecisionAction,
    pub applicant_id: String,
    pub applicant_name: String,
    pub from_instant: i64,
    pub to_instant: i64,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("durable execution engine unreachable")]
    Transport(#[from] anyhow::Error),
    #[error("durable execution engine rejected the call: {0}")]
    Rejected(String),
}

/// Durable-execution collaborator. `start` fires the REQUEST event
/// asynchronously; the continuation token it mints reaches us only through
/// that event. `report_success`/`report_failure` resume or fail the suspended
/// continuation identified by the token — the token is opaque here, stored
/// and passed through, never interpreted.
#[async_trait]
pub trait DurableEngine: Send + Sync {
    async fn start(&self, timeout_seconds: i64, input: &WorkflowInput) -> Result<(), EngineError>;

    async fn report_success(
        &self,
        token: &str,
        outcome: &DecisionOutcome,
    ) -> Result<(), EngineError>;

    async fn report_failure(
        &self,
        token: &str,
        error_kind: &str,
        cause: &str,
    ) -> Result<(), EngineError>;
}

/// HTTP client for the engine's task-token API.
pub struct HttpEngineClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartExecution<'a> {
    name: String,
    timeout_seconds: i64,
    input: &'a WorkflowInput,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskSuccess<'a> {
    task_token: &'a str,
    output: &'a DecisionOutcome,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskFailure<'a> {
    task_token: &'a str,
    error: &'a str,
    cause: &'a str,
}

impl HttpEngineClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<(), EngineError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(anyhow::Error::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, %url, "engine call rejected: {}", body);
            return Err(EngineError::Rejected(format!("{status}: {body}")));
        }
        Ok(())
    }
}

#[async_trait]
impl DurableEngine for HttpEngineClient {
    async fn start(&self, timeout_seconds: i64, input: &WorkflowInput) -> Result<(), EngineError> {
        let body = StartExecution {
            name: format!("leave-{}", Uuid::new_v4()),
            timeout_seconds,
            input,
        };
        info!(
            applicant_id = %input.applicant_id,
            timeout_seconds,
            "starting approval workflow"
        );
        self.post("/executions", &body).await
    }

    async fn report_success(
        &self,
        token: &str,
        outcome: &DecisionOutcome,
    ) -> Result<(), EngineError> {
        self.post(
            "/task/success",
            &TaskSuccess {
                task_token: token,
                output: outcome,
            },
        )
        .await
    }

    async fn report_failure(
        &self,
        token: &str,
        error_kind: &str,
        cause: &str,
    ) -> Result<(), EngineError> {
        self.post(
            "/task/failure",
            &TaskFailure {
                task_token: token,
                error: error_kind,
                cause,
            },
        )
        .await
    }
}
