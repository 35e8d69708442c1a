use crate::auth::auth::AuthUser;
use crate::model::leave_request::LeaveRequest;
use crate::model::role::Role;
use crate::saga::SagaContext;
use crate::saga::notify::SagaEvent;
use crate::saga::store::LeaveQuery;
use crate::saga::submit::Applicant;
use crate::saga::validate::validate_range;
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-09-01", format = "date", value_type = String)]
    pub from_date: String,
    #[schema(example = "2026-09-05", format = "date", value_type = String)]
    pub to_date: String,
    /// Optional start-of-leave time, 24-hour HH:MM. Defaults to midnight.
    #[schema(example = "09:00")]
    pub from_time: Option<String>,
    /// Optional end-of-leave time, 24-hour HH:MM. Defaults to end of day.
    #[schema(example = "17:30")]
    pub to_time: Option<String>,
    #[schema(example = "family visit")]
    pub reason: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = "jdoe")]
    /// Filter by applicant ID
    pub applicant_id: Option<String>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>, // items per page
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/* =========================
Submit leave request
========================= */
/// Swagger doc for submit_leave endpoint
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted, approval workflow started", body = LeaveRequest),
        (status = 400, description = "Malformed dates or times"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "A pending request for the same range already exists", body = Object, example = json!({
            "message": "a pending request for the same range already exists"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn submit_leave(
    auth: AuthUser,
    ctx: web::Data<SagaContext>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let interval = validate_range(
        &payload.from_date,
        &payload.to_date,
        payload.from_time.as_deref(),
        payload.to_time.as_deref(),
        Utc::now(),
    )?;

    let applicant = Applicant {
        id: auth.applicant_id,
        name: auth.applicant_name,
    };
    let record = ctx
        .guard
        .submit(&applicant, interval, payload.reason.clone())
        .await?;

    Ok(HttpResponse::Created().json(record))
}

/* =========================
Decide (approve/reject) a pending request
========================= */
/// Swagger doc for decide_leave endpoint. Reviewers reach this either from
/// the action links in the notification mail (GET) or from a client (PUT).
#[utoipa::path(
    put,
    path = "/api/v1/leave/{identity}/{action}",
    params(
        ("identity" = String, Path, description = "Identity of the leave request"),
        ("action" = String, Path, description = "accept or reject")
    ),
    responses(
        (status = 200, description = "Decision forwarded, request resolving", body = Object, example = json!({
            "message": "Leave request accepted",
            "status": "accepted"
        })),
        (status = 400, description = "Unknown decision action"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Request already processed", body = Object, example = json!({
            "message": "request already processed as accepted"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn decide_leave(
    auth: AuthUser,
    ctx: web::Data<SagaContext>,
    path: web::Path<(String, String)>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let (identity, action) = path.into_inner();
    let status = ctx.resolver.resolve(&identity, &action).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Leave request {status}"),
        "status": status
    })))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{identity}",
    params(
        ("identity" = String, Path, description = "Identity of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    ctx: web::Data<SagaContext>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let identity = path.into_inner();
    let record = ctx.store.get(&identity).await?;

    match record {
        Some(record) => {
            // applicants may inspect their own requests, reviewers any
            if record.applicant_id != auth.applicant_id && auth.role == Role::Employee {
                return Err(actix_web::error::ErrorForbidden("Not your request"));
            }
            Ok(HttpResponse::Ok().json(record))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    ctx: web::Data<SagaContext>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);

    let (data, total) = ctx
        .store
        .list(&LeaveQuery {
            applicant_id: query.applicant_id.clone(),
            status: query.status.clone(),
            page,
            per_page,
        })
        .await?;

    let response = LeaveListResponse {
        data,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}

/* =========================
Workflow engine callback
========================= */
/// Swagger doc for the saga event callback. The durable-execution engine
/// delivers REQUEST when a workflow starts waiting and ACCEPT/REJECT when a
/// reported decision resumes it.
#[utoipa::path(
    post,
    path = "/callbacks/leave-event",
    request_body(
        content = SagaEvent,
        description = "Saga event payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Event processed", body = Object, example = json!({
            "message": "event processed",
            "status": "pending"
        })),
        (status = 400, description = "Malformed event"),
        (status = 409, description = "Event no longer applies to the request state"),
        (status = 500, description = "No recipients or store failure"),
        (status = 502, description = "Notification dispatch failed")
    ),
    tag = "Callbacks"
)]
pub async fn saga_event(
    ctx: web::Data<SagaContext>,
    payload: web::Json<SagaEvent>,
) -> actix_web::Result<impl Responder> {
    let status = ctx.notifier.handle(payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "event processed",
        "status": status
    })))
}
