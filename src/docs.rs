use crate::api::leave::{CreateLeave, LeaveFilter, LeaveListResponse};
use crate::model::leave_request::{DecisionAction, LeaveRequest, LeaveStatus};
use crate::saga::notify::SagaEvent;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leaveflow API",
        version = "1.0.0",
        description = r#"
## Leave-Request Approval Service

Manages time-off requests that need a single asynchronous human decision.

### 🔹 Flow
- **Submit** — an applicant posts a date range; duplicates of a pending
  request are rejected by a derived request identity
- **Review** — administrators get a mail with accept/reject action links
  while the approval workflow waits, suspended, on the execution engine
- **Decide** — an HR/Admin decision resumes the workflow; the applicant is
  notified and the request reaches its terminal state

### 🔐 Security
Applicant and reviewer endpoints are protected with **JWT Bearer
authentication**; decisions require the **Admin** or **HR** role. The
`/callbacks` surface is reserved for the workflow engine.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::submit_leave,
        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::decide_leave,
        crate::api::leave::saga_event,
    ),
    components(
        schemas(
            CreateLeave,
            LeaveFilter,
            LeaveListResponse,
            LeaveRequest,
            LeaveStatus,
            DecisionAction,
            SagaEvent
        )
    ),
    tags(
        (name = "Leave", description = "Leave request and decision APIs"),
        (name = "Callbacks", description = "Workflow engine event delivery"),
    )
)]
pub struct ApiDoc;
