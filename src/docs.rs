use crate::api::leave_request::{CreateLeave, DecideLeave, LeaveFilter, LeaveListResponse};
use crate::model::leave_request::{
    AbsenceType, ApprovalFlow, ApprovalRecord, ApprovalStatus, LeaveRequest, LeaveStatus,
};
use crate::workflow::machine::DecisionAction;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Approval Workflow API",
        version = "1.0.0",
        description = r#"
## Leave Approval Workflow

This API runs the **two-stage leave approval workflow** for the ERP:
an employee submits a signed leave request, the designated supervisor
decides first, and an administrator confirms or overturns second.

### 🔹 Key Features
- **Submission** with signature capture and inclusive day counting
- **Sequential approval**: supervisor decision, then admin decision
- **Rejection finality**: a rejection at either stage terminates the flow
- **Audit trail**: each stage records signature, timestamp and comments,
  protected against concurrent overwrites by versioned writes

### 🔐 Security
All endpoints require **JWT Bearer authentication** issued by the
organization's identity service. The supervisor of record and
administrator roles gate the two decision stages.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for the listing endpoint

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::delete_leave,
        crate::api::leave_request::notify_leave,
    ),
    components(
        schemas(
            CreateLeave,
            DecideLeave,
            LeaveFilter,
            LeaveListResponse,
            LeaveRequest,
            ApprovalFlow,
            ApprovalRecord,
            ApprovalStatus,
            LeaveStatus,
            AbsenceType,
            DecisionAction
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Leave", description = "Leave approval workflow APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
