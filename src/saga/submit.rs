use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::saga::identity::fingerprint;
use crate::saga::orchestrator::Orchestrator;
use crate::saga::store::{RecordStore, StoreError};
use crate::saga::validate::LeaveInterval;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("a pending request for the same range already exists")]
    Conflict,
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Engine(#[from] crate::clients::engine::EngineError),
}

impl From<StoreError> for SubmitError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict => SubmitError::Conflict,
            other => SubmitError::Store(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Applicant {
    pub id: String,
    pub name: String,
}

/// Accepts a validated interval, dedups against the derived identity and
/// creates the record before starting the approval workflow.
pub struct SubmissionGuard {
    store: Arc<dyn RecordStore>,
    orchestrator: Arc<Orchestrator>,
}

impl SubmissionGuard {
    pub fn new(store: Arc<dyn RecordStore>, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }

    pub async fn submit(
        &self,
        applicant: &Applicant,
        interval: LeaveInterval,
        reason: Option<String>,
    ) -> Result<LeaveRequest, SubmitError> {
        let identity = fingerprint(&applicant.id, interval.from, interval.to);

        // Fast path only. The INSERT below is what actually guards
        // uniqueness; this read just gives duplicates a cheaper answer.
        if let Some(existing) = self.store.get(&identity).await? {
            if existing.status == LeaveStatus::Pending {
                warn!(%identity, applicant_id = %applicant.id, "duplicate pending request");
                return Err(SubmitError::Conflict);
            }
        }

        let record = LeaveRequest {
            identity: identity.clone(),
            applicant_id: applicant.id.clone(),
            applicant_name: applicant.name.clone(),
            from_instant: interval.from,
            to_instant: interval.to,
            reason: reason.unwrap_or_default(),
            status: LeaveStatus::Pending,
            applied_on: Utc::now(),
            reviewed_on: None,
            reviewer_id: None,
            reviewer_name: None,
            continuation_token: None,
        };

        self.store.create_if_absent(&record).await?;

        self.orchestrator.start(&record).await?;
        info!(%identity, applicant_id = %applicant.id, "leave request submitted");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::engine::EngineError;
    use crate::saga::testkit::{MemoryStore, RecordingEngine, interval, sample_request};

    fn guard(
        store: Arc<MemoryStore>,
        engine: Arc<RecordingEngine>,
    ) -> SubmissionGuard {
        SubmissionGuard::new(store, Arc::new(Orchestrator::new(engine)))
    }

    fn applicant() -> Applicant {
        Applicant {
            id: "jdoe".into(),
            name: "John Doe".into(),
        }
    }

    #[actix_web::test]
    async fn submit_creates_a_pending_record_and_starts_the_workflow() {
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        let guard = guard(store.clone(), engine.clone());

        let record = guard
            .submit(&applicant(), interval("2026-01-10", "2026-01-12"), Some("trip".into()))
            .await
            .unwrap();

        assert_eq!(record.status, LeaveStatus::Pending);
        assert!(record.continuation_token.is_none());
        assert_eq!(record.reason, "trip");
        assert!(store.get(&record.identity).await.unwrap().is_some());

        let started = engine.started.lock().unwrap();
        assert_eq!(started.len(), 1);
        // 2 full days plus the end-of-day tail, in whole seconds
        assert_eq!(started[0].0, record.duration_seconds());
        assert_eq!(started[0].1.applicant_id, "jdoe");
    }

    #[actix_web::test]
    async fn second_identical_submission_conflicts_while_pending() {
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        let guard = guard(store.clone(), engine.clone());

        guard
            .submit(&applicant(), interval("2026-01-10", "2026-01-12"), None)
            .await
            .unwrap();
        let err = guard
            .submit(&applicant(), interval("2026-01-10", "2026-01-12"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Conflict));
        // no second workflow start
        assert_eq!(engine.started.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn different_range_from_same_applicant_is_a_new_request() {
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        let guard = guard(store.clone(), engine.clone());

        let a = guard
            .submit(&applicant(), interval("2026-01-10", "2026-01-12"), None)
            .await
            .unwrap();
        let b = guard
            .submit(&applicant(), interval("2026-02-01", "2026-02-03"), None)
            .await
            .unwrap();

        assert_ne!(a.identity, b.identity);
        assert_eq!(engine.started.lock().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn create_race_lost_still_surfaces_conflict() {
        // The fast-path GET misses, but the conditional create catches the
        // race and the guard reports the same conflict.
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        let guard = guard(store.clone(), engine.clone());

        let record = sample_request("jdoe", "John Doe");
        store.insert_raw(record.clone());
        store.hide_from_get(&record.identity);

        let err = guard
            .submit(&applicant(), LeaveInterval { from: record.from_instant, to: record.to_instant }, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Conflict));
        assert!(engine.started.lock().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn identical_range_after_terminal_state_stays_blocked() {
        // The store never permits re-creation under the same identity, so a
        // repeat of a decided range is rejected as a conflict.
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        let guard = guard(store.clone(), engine.clone());

        let mut record = sample_request("jdoe", "John Doe");
        record.status = LeaveStatus::Accepted;
        store.insert_raw(record.clone());

        let err = guard
            .submit(
                &applicant(),
                LeaveInterval {
                    from: record.from_instant,
                    to: record.to_instant,
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Conflict));
    }

    #[actix_web::test]
    async fn point_request_starts_with_zero_timeout() {
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        let guard = guard(store.clone(), engine.clone());

        let at = chrono::Utc::now() + chrono::Duration::days(30);
        let record = guard
            .submit(&applicant(), LeaveInterval { from: at, to: at }, None)
            .await
            .unwrap();

        assert_eq!(record.duration_seconds(), 0);
        assert_eq!(engine.started.lock().unwrap()[0].0, 0);
    }

    #[actix_web::test]
    async fn engine_failure_is_surfaced_after_create() {
        let store = Arc::new(MemoryStore::default());
        let engine = Arc::new(RecordingEngine::default());
        engine.fail_next_start();
        let guard = guard(store.clone(), engine.clone());

        let err = guard
            .submit(&applicant(), interval("2026-01-10", "2026-01-12"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Engine(EngineError::Rejected(_))));
        // no compensation: the created record stays, per the error design
        assert_eq!(store.len(), 1);
    }
}
