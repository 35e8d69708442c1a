use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::clients::engine::EngineError;
use crate::model::leave_request::{DecisionAction, LeaveStatus};
use crate::saga::orchestrator::Orchestrator;
use crate::saga::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("no leave request found for this identity")]
    NotFound,
    #[error("request already processed as {0}")]
    AlreadyProcessed(LeaveStatus),
    #[error("invalid decision action {0:?}")]
    InvalidAction(String),
    #[error("pending request has no continuation token attached")]
    MissingToken,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Validates an external accept/reject action and resumes the suspended
/// workflow. The resolver never writes the record itself; the terminal
/// transition happens when the engine delivers the matching event back to
/// the notification handler.
pub struct DecisionResolver {
    store: Arc<dyn RecordStore>,
    orchestrator: Arc<Orchestrator>,
}

impl DecisionResolver {
    pub fn new(store: Arc<dyn RecordStore>, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    pub async fn resolve(&self, identity: &str, action: &str) -> Result<LeaveStatus, DecisionError> {
        let record = self
            .store
            .get(identity)
            .await?
            .ok_or(DecisionError::NotFound)?;

        // Late or duplicate decisions stop here, before any engine call.
        if record.status != LeaveStatus::Pending {
            return Err(DecisionError::AlreadyProcessed(record.status));
        }

        let token = record
            .continuation_token
            .as_deref()
            .ok_or(DecisionError::MissingToken)?;

        let parsed = match DecisionAction::from_str(action) {
            Ok(a) => a,
            Err(_) => {
                warn!(%identity, action, "rejecting invalid decision action");
                self.orchestrator
                    .abort(
                        token,
                        "InvalidAction",
                        &format!("unsupported decision action {action:?}"),
                    )
                    .await?;
                return Err(DecisionError::InvalidAction(action.to_string()));
            }
        };

        self.orchestrator.resume(token, parsed, &record).await?;
        info!(%identity, action = %parsed, "decision forwarded to workflow");
        Ok(parsed.resulting_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::saga::store::LeaveUpdate;
    use crate::saga::testkit::{MemoryStore, RecordingEngine, sample_request};

    fn resolver(
        store: Arc<MemoryStore>,
        engine: Arc<RecordingEngine>,
    ) -> DecisionResolver {
        DecisionResolver::new(store, Arc::new(Orchestrator::new(engine)))
    }

    async fn pending_with_token(store: &MemoryStore) -> String {
        let record = sample_request("jdoe", "John Doe");
        let identity = record.identity.clone();
        store.insert_raw(record);
        store
            .update(&identity, LeaveUpdate::AttachToken { token: "token-1".into() })
            .await
            .unwrap();
        identity
    }

    #[actix_web::test]
    async fn unknown_identity_is_not_found() {
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        let err = resolver(store, engine.clone())
            .resolve("missing", "ACCEPT")
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::NotFound));
        assert!(engine.successes.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn accept_reports_success_with_the_outcome_payload() {
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        let identity = pending_with_token(&store).await;

        let status = resolver(store.clone(), engine.clone())
            .resolve(&identity, "accept")
            .await
            .unwrap();
        assert_eq!(status, LeaveStatus::Accepted);

        let successes = engine.successes.lock().unwrap();
        assert_eq!(successes.len(), 1);
        let (token, outcome) = &successes[0];
        assert_eq!(token, "token-1");
        assert_eq!(outcome.kind, DecisionAction::Accept);
        assert_eq!(outcome.applicant_id, "jdoe");
        assert_eq!(outcome.applicant_name, "John Doe");

        // the resolver does not touch the record; the terminal transition
        // arrives later through the notification handler
        let record = store.get(&identity).await.unwrap().unwrap();
        assert_eq!(record.status, LeaveStatus::Pending);
    }

    #[actix_web::test]
    async fn non_pending_record_short_circuits_without_engine_call() {
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        let mut record = sample_request("jdoe", "John Doe");
        record.status = LeaveStatus::Accepted;
        let identity = record.identity.clone();
        store.insert_raw(record);

        let err = resolver(store, engine.clone())
            .resolve(&identity, "REJECT")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DecisionError::AlreadyProcessed(LeaveStatus::Accepted)
        ));
        assert!(engine.successes.lock().unwrap().is_empty());
        assert!(engine.failures.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn invalid_action_is_reported_to_the_engine_as_a_failure() {
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        let identity = pending_with_token(&store).await;

        let err = resolver(store, engine.clone())
            .resolve(&identity, "escalate")
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::InvalidAction(_)));

        let failures = engine.failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "token-1");
        assert_eq!(failures[0].1, "InvalidAction");
        assert!(engine.successes.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn pending_record_without_token_is_an_integration_defect() {
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        let record = sample_request("jdoe", "John Doe");
        let identity = record.identity.clone();
        store.insert_raw(record);

        let err = resolver(store, engine)
            .resolve(&identity, "ACCEPT")
            .await
            .unwrap_err();
        assert!(matches!(err, DecisionError::MissingToken));
    }
}
