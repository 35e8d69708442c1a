// In-memory collaborator doubles for the saga tests. The store reproduces
// the conditional-write semantics of the production MySQL impl; the engine,
// mailer and directory record calls for assertion.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

use crate::clients::directory::{Directory, DirectoryAccount, DirectoryError};
use crate::clients::engine::{DecisionOutcome, DurableEngine, EngineError, WorkflowInput};
use crate::clients::mailer::{MailError, Mailer, OutboundMessage};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::saga::store::{LeaveQuery, LeaveUpdate, RecordStore, StoreError};
use crate::saga::validate::LeaveInterval;

pub fn interval(from_date: &str, to_date: &str) -> LeaveInterval {
    let from = NaiveDate::parse_from_str(from_date, "%Y-%m-%d").unwrap();
    let to = NaiveDate::parse_from_str(to_date, "%Y-%m-%d").unwrap();
    LeaveInterval {
        from: Utc.from_utc_datetime(&from.and_time(NaiveTime::MIN)),
        to: Utc.from_utc_datetime(
            &to.and_time(NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap()),
        ),
    }
}

pub fn sample_request(applicant_id: &str, applicant_name: &str) -> LeaveRequest {
    let span = interval("2026-09-01", "2026-09-05");
    LeaveRequest {
        identity: crate::saga::identity::fingerprint(applicant_id, span.from, span.to),
        applicant_id: applicant_id.to_string(),
        applicant_name: applicant_name.to_string(),
        from_instant: span.from,
        to_instant: span.to,
        reason: String::new(),
        status: LeaveStatus::Pending,
        applied_on: Utc::now(),
        reviewed_on: None,
        reviewer_id: None,
        reviewer_name: None,
        continuation_token: None,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, LeaveRequest>>,
    hidden_from_get: Mutex<HashSet<String>>,
}

impl MemoryStore {
    /// Seeds a record, bypassing the create path.
    pub fn insert_raw(&self, record: LeaveRequest) {
        self.records
            .lock()
            .unwrap()
            .insert(record.identity.clone(), record);
    }

    /// Makes `get` miss this identity while the conditional create still
    /// sees it, to exercise the GET/create race.
    pub fn hide_from_get(&self, identity: &str) {
        self.hidden_from_get
            .lock()
            .unwrap()
            .insert(identity.to_string());
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, identity: &str) -> Result<Option<LeaveRequest>, StoreError> {
        if self.hidden_from_get.lock().unwrap().contains(identity) {
            return Ok(None);
        }
        Ok(self.records.lock().unwrap().get(identity).cloned())
    }

    async fn create_if_absent(&self, record: &LeaveRequest) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&record.identity) {
            return Err(StoreError::Conflict);
        }
        records.insert(record.identity.clone(), record.clone());
        Ok(())
    }

    async fn update(&self, identity: &str, update: LeaveUpdate) -> Result<(), StoreError> {
        let mut records = self.records.lock().unwrap();
        let Some(record) = records.get_mut(identity) else {
            return Err(StoreError::ConditionFailed);
        };
        match update {
            LeaveUpdate::AttachToken { token } => {
                if record.status != LeaveStatus::Pending || record.continuation_token.is_some() {
                    return Err(StoreError::ConditionFailed);
                }
                record.continuation_token = Some(token);
            }
            LeaveUpdate::Finalize { status } => {
                if record.status != LeaveStatus::Pending {
                    return Err(StoreError::ConditionFailed);
                }
                record.status = status;
                record.continuation_token = None;
            }
        }
        Ok(())
    }

    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, i64), StoreError> {
        let records = self.records.lock().unwrap();
        let mut matching: Vec<LeaveRequest> = records
            .values()
            .filter(|r| {
                query
                    .applicant_id
                    .as_deref()
                    .is_none_or(|id| r.applicant_id == id)
            })
            .filter(|r| {
                query
                    .status
                    .as_deref()
                    .is_none_or(|s| r.status.to_string() == s)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.applied_on.cmp(&a.applied_on));

        let total = matching.len() as i64;
        let per_page = query.per_page.clamp(1, 100) as usize;
        let page = query.page.max(1) as usize;
        let rows = matching
            .into_iter()
            .skip((page - 1) * per_page)
            .take(per_page)
            .collect();
        Ok((rows, total))
    }
}

#[derive(Default)]
pub struct RecordingEngine {
    pub started: Mutex<Vec<(i64, WorkflowInput)>>,
    pub successes: Mutex<Vec<(String, DecisionOutcome)>>,
    pub failures: Mutex<Vec<(String, String, String)>>,
    fail_start: AtomicBool,
}

impl RecordingEngine {
    pub fn fail_next_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DurableEngine for RecordingEngine {
    async fn start(&self, timeout_seconds: i64, input: &WorkflowInput) -> Result<(), EngineError> {
        if self.fail_start.swap(false, Ordering::SeqCst) {
            return Err(EngineError::Rejected("execution limit reached".into()));
        }
        self.started
            .lock()
            .unwrap()
            .push((timeout_seconds, input.clone()));
        Ok(())
    }

    async fn report_success(
        &self,
        token: &str,
        outcome: &DecisionOutcome,
    ) -> Result<(), EngineError> {
        self.successes
            .lock()
            .unwrap()
            .push((token.to_string(), outcome.clone()));
        Ok(())
    }

    async fn report_failure(
        &self,
        token: &str,
        error_kind: &str,
        cause: &str,
    ) -> Result<(), EngineError> {
        self.failures.lock().unwrap().push((
            token.to_string(),
            error_kind.to_string(),
            cause.to_string(),
        ));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutboundMessage>>,
    fail: AtomicBool,
}

impl RecordingMailer {
    pub fn fail_next(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        if self.fail.swap(false, Ordering::SeqCst) {
            return Err(MailError::Rejected("550 mailbox unavailable".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct StaticDirectory {
    accounts: Vec<DirectoryAccount>,
}

impl StaticDirectory {
    pub fn empty() -> Self {
        Self { accounts: vec![] }
    }

    /// Two admins plus a regular employee account for the applicant.
    pub fn with_admins() -> Self {
        let account = |id: &str, name: &str, email: &str, role: &str| DirectoryAccount {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            role: role.into(),
        };
        Self {
            accounts: vec![
                account("boss", "The Boss", "boss@example.com", "admin"),
                account("hradmin", "HR Admin", "hradmin@example.com", "admin"),
                account("jdoe", "John Doe", "jdoe@example.com", "employee"),
            ],
        }
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn query_by_role(&self, role: &str) -> Result<Vec<DirectoryAccount>, DirectoryError> {
        Ok(self
            .accounts
            .iter()
            .filter(|a| a.role == role)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<DirectoryAccount>, DirectoryError> {
        Ok(self.accounts.iter().find(|a| a.id == id).cloned())
    }
}
