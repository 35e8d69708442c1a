//! HTTP mappings for the component error kinds (taxonomy: invalid input is
//! the caller's problem, conflicts are reported and never retried, infra
//! failures surface as-is and leave retrying to the caller).

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use tracing::error;

use crate::saga::decision::DecisionError;
use crate::saga::notify::NotifyError;
use crate::saga::store::StoreError;
use crate::saga::submit::SubmitError;
use crate::saga::validate::ValidationError;

fn body(status: StatusCode, message: String) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "message": message }))
}

impl ResponseError for ValidationError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        body(self.status_code(), self.to_string())
    }
}

impl ResponseError for SubmitError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubmitError::Conflict => StatusCode::CONFLICT,
            SubmitError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SubmitError::Engine(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!(error = %self, "submission failed");
        }
        body(self.status_code(), self.to_string())
    }
}

impl ResponseError for DecisionError {
    fn status_code(&self) -> StatusCode {
        match self {
            DecisionError::NotFound => StatusCode::NOT_FOUND,
            DecisionError::AlreadyProcessed(_) => StatusCode::CONFLICT,
            DecisionError::InvalidAction(_) => StatusCode::BAD_REQUEST,
            DecisionError::MissingToken | DecisionError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            DecisionError::Engine(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!(error = %self, "decision failed");
        }
        body(self.status_code(), self.to_string())
    }
}

impl ResponseError for NotifyError {
    fn status_code(&self) -> StatusCode {
        match self {
            NotifyError::InvalidEvent(_) | NotifyError::MissingToken => StatusCode::BAD_REQUEST,
            NotifyError::StaleTransition => StatusCode::CONFLICT,
            NotifyError::Notification(_) | NotifyError::Directory(_) => StatusCode::BAD_GATEWAY,
            NotifyError::NoRecipients | NotifyError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Malformed events signal a broken integration contract, so even the
        // 4xx variants get logged loudly here.
        error!(error = %self, "saga event handling failed");
        body(self.status_code(), self.to_string())
    }
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Conflict | StoreError::ConditionFailed => StatusCode::CONFLICT,
            StoreError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!(error = %self, "record store failure");
        }
        body(self.status_code(), self.to_string())
    }
}
