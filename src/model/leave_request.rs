use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Lifecycle of a leave request. Transitions are monotonic:
/// `Pending` -> `Accepted` or `Rejected`, and terminal states never change.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, Display, EnumString, ToSchema,
)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LeaveStatus {
    Pending,
    Accepted,
    Rejected,
}

impl LeaveStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LeaveStatus::Accepted | LeaveStatus::Rejected)
    }
}

/// The two actions a reviewer can take on a pending request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum DecisionAction {
    Accept,
    Reject,
}

impl DecisionAction {
    /// Status the request reaches once this action is carried through.
    pub fn resulting_status(&self) -> LeaveStatus {
        match self {
            DecisionAction::Accept => LeaveStatus::Accepted,
            DecisionAction::Reject => LeaveStatus::Rejected,
        }
    }

    /// URL path segment used in the action links mailed to reviewers.
    pub fn as_path_segment(&self) -> &'static str {
        match self {
            DecisionAction::Accept => "accept",
            DecisionAction::Reject => "reject",
        }
    }
}

/// The sole persistent entity. Keyed by `identity`, a derived fingerprint of
/// `(applicant_id, from_instant, to_instant)` — never client-supplied.
///
/// `continuation_token` is present exactly while a decision is outstanding;
/// it is attached when the workflow engine delivers the request event and
/// cleared in the same write that makes the status terminal.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = "aFg3cUo2c2Rm")]
    pub identity: String,
    #[schema(example = "jdoe")]
    pub applicant_id: String,
    #[schema(example = "John Doe")]
    pub applicant_name: String,
    #[schema(example = "2026-09-01T00:00:00Z", format = "date-time", value_type = String)]
    pub from_instant: DateTime<Utc>,
    #[schema(example = "2026-09-05T23:59:59.999Z", format = "date-time", value_type = String)]
    pub to_instant: DateTime<Utc>,
    #[schema(example = "family visit")]
    pub reason: String,
    pub status: LeaveStatus,
    #[schema(format = "date-time", value_type = String)]
    pub applied_on: DateTime<Utc>,
    // Reserved for a future reviewer-audit flow; never populated today.
    #[schema(value_type = Option<String>)]
    pub reviewed_on: Option<DateTime<Utc>>,
    pub reviewer_id: Option<String>,
    pub reviewer_name: Option<String>,
    #[serde(skip_serializing)]
    pub continuation_token: Option<String>,
}

impl LeaveRequest {
    /// Interval length in whole seconds, clamped at zero. A point request
    /// (from == to) is valid and yields zero.
    pub fn duration_seconds(&self) -> i64 {
        (self.to_instant - self.from_instant).num_seconds().max(0)
    }
}
