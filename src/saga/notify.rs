use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use strum_macros::{Display, EnumString};
use thiserror::Error;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::clients::directory::{Directory, DirectoryError};
use crate::clients::mailer::{MailError, Mailer, OutboundMessage};
use crate::model::leave_request::{DecisionAction, LeaveStatus};
use crate::saga::identity::fingerprint;
use crate::saga::store::{LeaveUpdate, RecordStore, StoreError};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SagaEventType {
    Request,
    Accept,
    Reject,
}

/// Event payload delivered by the workflow engine. Everything is optional at
/// the wire level; the handler decides what a usable event looks like and
/// fails loudly on anything else.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SagaEvent {
    #[schema(example = "REQUEST")]
    pub event_type: Option<String>,
    #[schema(example = "jdoe")]
    pub applicant_id: Option<String>,
    #[schema(example = "John Doe")]
    pub applicant_name: Option<String>,
    /// Epoch milliseconds, UTC.
    pub from_instant: Option<i64>,
    pub to_instant: Option<i64>,
    /// Present on REQUEST events only.
    pub task_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid saga event: {0}")]
    InvalidEvent(String),
    #[error("request event carried no continuation token")]
    MissingToken,
    #[error("no administrator accounts available to notify")]
    NoRecipients,
    #[error("the request is no longer in a state this event applies to")]
    StaleTransition,
    #[error("notification dispatch failed")]
    Notification(#[source] MailError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for NotifyError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::ConditionFailed => NotifyError::StaleTransition,
            other => NotifyError::Store(other),
        }
    }
}

/// Addressing and linking knobs the handler needs to compose mails.
#[derive(Debug, Clone)]
pub struct NotifierSettings {
    pub sender: String,
    pub admin_role: String,
    /// Externally reachable origin for the action links, e.g. `https://hr.example.com`.
    pub public_base_url: String,
    pub api_prefix: String,
}

struct CheckedEvent {
    event_type: SagaEventType,
    applicant_id: String,
    applicant_name: String,
    from_instant: DateTime<Utc>,
    to_instant: DateTime<Utc>,
    task_token: Option<String>,
}

/// Receives every saga event from the engine, dispatches the notification
/// for it and performs the single authoritative state transition. Dispatch
/// happens before the write; a failure in either fails the whole handler and
/// leaves retries to the engine.
pub struct NotificationHandler {
    store: Arc<dyn RecordStore>,
    directory: Arc<dyn Directory>,
    mailer: Arc<dyn Mailer>,
    settings: NotifierSettings,
}

impl NotificationHandler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        directory: Arc<dyn Directory>,
        mailer: Arc<dyn Mailer>,
        settings: NotifierSettings,
    ) -> Self {
        Self {
            store,
            directory,
            mailer,
            settings,
        }
    }

    pub async fn handle(&self, event: SagaEvent) -> Result<LeaveStatus, NotifyError> {
        let event = check_event(event)?;
        let identity = fingerprint(
            &event.applicant_id,
            event.from_instant,
            event.to_instant,
        );

        match event.event_type {
            SagaEventType::Request => self.on_request(&identity, &event).await,
            SagaEventType::Accept => {
                self.on_decision(&identity, &event, DecisionAction::Accept)
                    .await
            }
            SagaEventType::Reject => {
                self.on_decision(&identity, &event, DecisionAction::Reject)
                    .await
            }
        }
    }

    async fn on_request(
        &self,
        identity: &str,
        event: &CheckedEvent,
    ) -> Result<LeaveStatus, NotifyError> {
        let token = event
            .task_token
            .clone()
            .ok_or(NotifyError::MissingToken)?;

        let admins = self
            .directory
            .query_by_role(&self.settings.admin_role)
            .await?;
        let audience: Vec<String> = admins
            .into_iter()
            .filter(|a| a.id != event.applicant_id)
            .map(|a| a.email)
            .collect();
        if audience.is_empty() {
            error!(%identity, role = %self.settings.admin_role, "no reviewers to notify");
            return Err(NotifyError::NoRecipients);
        }

        let message = self.review_request_message(identity, event, audience);
        self.mailer
            .send(&message)
            .await
            .map_err(NotifyError::Notification)?;

        self.store
            .update(identity, LeaveUpdate::AttachToken { token })
            .await?;
        info!(%identity, "review requested, continuation token attached");
        Ok(LeaveStatus::Pending)
    }

    async fn on_decision(
        &self,
        identity: &str,
        event: &CheckedEvent,
        action: DecisionAction,
    ) -> Result<LeaveStatus, NotifyError> {
        let applicant = self
            .directory
            .find_by_id(&event.applicant_id)
            .await?
            .ok_or(NotifyError::NoRecipients)?;

        let message = self.decision_message(event, action, applicant.email);
        self.mailer
            .send(&message)
            .await
            .map_err(NotifyError::Notification)?;

        let status = action.resulting_status();
        self.store
            .update(identity, LeaveUpdate::Finalize { status })
            .await?;
        info!(%identity, %status, "leave request resolved");
        Ok(status)
    }

    fn action_link(&self, identity: &str, action: DecisionAction) -> String {
        format!(
            "{}{}/leave/{}/{}",
            self.settings.public_base_url,
            self.settings.api_prefix,
            identity,
            action.as_path_segment()
        )
    }

    fn review_request_message(
        &self,
        identity: &str,
        event: &CheckedEvent,
        recipients: Vec<String>,
    ) -> OutboundMessage {
        let range = format_range(event.from_instant, event.to_instant);
        let accept = self.action_link(identity, DecisionAction::Accept);
        let reject = self.action_link(identity, DecisionAction::Reject);
        OutboundMessage {
            sender: self.settings.sender.clone(),
            recipients,
            subject: format!("Leave request from {}", event.applicant_name),
            text_body: format!(
                "{} ({}) requests leave for {}.\n\nApprove: {}\nReject: {}\n",
                event.applicant_name, event.applicant_id, range, accept, reject
            ),
            html_body: Some(format!(
                "<p>{} ({}) requests leave for {}.</p>\
                 <p><a href=\"{}\">Approve</a> &middot; <a href=\"{}\">Reject</a></p>",
                event.applicant_name, event.applicant_id, range, accept, reject
            )),
        }
    }

    fn decision_message(
        &self,
        event: &CheckedEvent,
        action: DecisionAction,
        recipient: String,
    ) -> OutboundMessage {
        let verdict = match action {
            DecisionAction::Accept => "approved",
            DecisionAction::Reject => "rejected",
        };
        let range = format_range(event.from_instant, event.to_instant);
        OutboundMessage {
            sender: self.settings.sender.clone(),
            recipients: vec![recipient],
            subject: format!("Your leave request was {verdict}"),
            text_body: format!(
                "Hi {},\n\nyour leave request for {} was {}.\n",
                event.applicant_name, range, verdict
            ),
            html_body: None,
        }
    }
}

fn check_event(event: SagaEvent) -> Result<CheckedEvent, NotifyError> {
    let raw_type = event
        .event_type
        .as_deref()
        .ok_or_else(|| NotifyError::InvalidEvent("missing event type".into()))?;
    let event_type = SagaEventType::from_str(raw_type)
        .map_err(|_| NotifyError::InvalidEvent(format!("unsupported event type {raw_type:?}")))?;

    let applicant_id = event
        .applicant_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| NotifyError::InvalidEvent("missing applicant id".into()))?;
    let applicant_name = event
        .applicant_name
        .filter(|s| !s.is_empty())
        .ok_or_else(|| NotifyError::InvalidEvent("missing applicant name".into()))?;

    let from_instant = checked_instant(event.from_instant, "from instant")?;
    let to_instant = checked_instant(event.to_instant, "to instant")?;

    Ok(CheckedEvent {
        event_type,
        applicant_id,
        applicant_name,
        from_instant,
        to_instant,
        task_token: event.task_token,
    })
}

fn checked_instant(millis: Option<i64>, field: &str) -> Result<DateTime<Utc>, NotifyError> {
    let millis =
        millis.ok_or_else(|| NotifyError::InvalidEvent(format!("missing {field}")))?;
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| NotifyError::InvalidEvent(format!("{field} out of range")))
}

fn format_range(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    format!(
        "{} - {}",
        from.format("%Y-%m-%d %H:%M UTC"),
        to.format("%Y-%m-%d %H:%M UTC")
    )
}
