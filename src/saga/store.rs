use async_trait::async_trait;
use thiserror::Error;

use crate::model::leave_request::{LeaveRequest, LeaveStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same identity already exists, whatever its status.
    #[error("a request with this identity already exists")]
    Conflict,
    /// The conditional part of an update no longer held when the write ran.
    #[error("the request is no longer in the expected state")]
    ConditionFailed,
    #[error("record store unavailable")]
    Unavailable(#[from] anyhow::Error),
}

/// The only two mutations the lifecycle permits after creation. Both are
/// conditional on the record still being pending, which is what makes the
/// read-then-transition race in the decision path safe: the losing writer
/// gets `ConditionFailed`, never a blind overwrite.
#[derive(Debug, Clone)]
pub enum LeaveUpdate {
    AttachToken { token: String },
    Finalize { status: LeaveStatus },
}

#[derive(Debug, Clone, Default)]
pub struct LeaveQuery {
    pub applicant_id: Option<String>,
    pub status: Option<String>,
    pub page: u64,
    pub per_page: u64,
}

/// Record-store collaborator. `create_if_absent` is the authoritative
/// uniqueness guard for an identity; any pre-read is a fast path only.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, identity: &str) -> Result<Option<LeaveRequest>, StoreError>;

    /// Persists a new record, rejecting with [`StoreError::Conflict`] when a
    /// record with the same identity exists, independent of its status.
    async fn create_if_absent(&self, record: &LeaveRequest) -> Result<(), StoreError>;

    /// Applies a conditional update keyed on the record still being pending.
    async fn update(&self, identity: &str, update: LeaveUpdate) -> Result<(), StoreError>;

    /// Paginated listing with optional filters. Returns the page plus the
    /// total matching count.
    async fn list(&self, query: &LeaveQuery) -> Result<(Vec<LeaveRequest>, i64), StoreError>;
}
