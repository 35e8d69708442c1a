use std::sync::Arc;

use tracing::info;

use crate::clients::engine::{DecisionOutcome, DurableEngine, EngineError, WorkflowInput};
use crate::model::leave_request::{DecisionAction, LeaveRequest, LeaveStatus};

/// Where a request sits in the approval saga. The state is not stored as
/// such; it is a view over the persisted record: status plus token presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaState {
    /// Created, workflow started, request event not yet delivered.
    Started,
    /// Continuation token recorded; suspended until a decision arrives.
    /// The suspension costs nothing here — no thread or connection waits.
    AwaitingDecision,
    /// Terminal. No further event is accepted for this identity.
    Resolved(LeaveStatus),
}

pub fn saga_state(record: &LeaveRequest) -> SagaState {
    match (record.status, record.continuation_token.as_deref()) {
        (LeaveStatus::Pending, None) => SagaState::Started,
        (LeaveStatus::Pending, Some(_)) => SagaState::AwaitingDecision,
        (terminal, _) => SagaState::Resolved(terminal),
    }
}

/// Drives the durable continuation for one request: starts it with the
/// interval-length timeout and later resumes or fails it by token. All state
/// transitions happen elsewhere (notification handler); the orchestrator only
/// talks to the engine.
pub struct Orchestrator {
    engine: Arc<dyn DurableEngine>,
}

impl Orchestrator {
    pub fn new(engine: Arc<dyn DurableEngine>) -> Self {
        Self { engine }
    }

    pub async fn start(&self, record: &LeaveRequest) -> Result<(), EngineError> {
        let input = WorkflowInput {
            applicant_id: record.applicant_id.clone(),
            applicant_name: record.applicant_name.clone(),
            from_instant: record.from_instant.timestamp_millis(),
            to_instant: record.to_instant.timestamp_millis(),
            reason: record.reason.clone(),
        };
        self.engine.start(record.duration_seconds(), &input).await
    }

    pub async fn resume(
        &self,
        token: &str,
        action: DecisionAction,
        record: &LeaveRequest,
    ) -> Result<(), EngineError> {
        let outcome = DecisionOutcome {
            kind: action,
            applicant_id: record.applicant_id.clone(),
            applicant_name: record.applicant_name.clone(),
            from_instant: record.from_instant.timestamp_millis(),
            to_instant: record.to_instant.timestamp_millis(),
        };
        info!(identity = %record.identity, action = %action, "resuming approval workflow");
        self.engine.report_success(token, &outcome).await
    }

    pub async fn abort(
        &self,
        token: &str,
        error_kind: &str,
        cause: &str,
    ) -> Result<(), EngineError> {
        self.engine.report_failure(token, error_kind, cause).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saga::testkit::sample_request;

    #[test]
    fn state_view_follows_status_and_token() {
        let mut record = sample_request("jdoe", "John Doe");
        assert_eq!(saga_state(&record), SagaState::Started);

        record.continuation_token = Some("token-1".into());
        assert_eq!(saga_state(&record), SagaState::AwaitingDecision);

        record.status = LeaveStatus::Accepted;
        record.continuation_token = None;
        assert_eq!(saga_state(&record), SagaState::Resolved(LeaveStatus::Accepted));
    }
}
