use crate::auth::auth::AuthUser;
use crate::model::leave_request::{AbsenceType, LeaveRequest, LeaveStatus};
use crate::store::LeaveQuery;
use crate::workflow::error::WorkflowError;
use crate::workflow::machine::{Decision, DecisionAction};
use crate::workflow::orchestrator::{LeaveService, NewLeave};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "emp-2001")]
    pub supervisor_id: String,
    #[schema(example = "Vacation/Personal")]
    pub absence_type: AbsenceType,
    #[schema(example = "2024-06-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family trip")]
    pub reason: String,
    #[schema(example = "data:image/png;base64,...")]
    pub signature: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DecideLeave {
    #[schema(example = "data:image/png;base64,...")]
    pub signature: String,
    /// Required for reject; required for approve only when the
    /// APPROVE_COMMENTS_REQUIRED policy is on
    #[schema(example = "Handover is covered")]
    pub comments: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID (admins and supervisors only; other callers
    /// are always scoped to their own requests)
    #[schema(example = "emp-1001")]
    pub employee_id: Option<String>,
    /// Filter by workflow status
    #[schema(example = "pending", value_type = Option<String>)]
    pub status: Option<LeaveStatus>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 10)]
    pub per_page: Option<u64>,
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
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload; the caller is the requesting employee",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Validation failed (dates, reason, signature, self-supervision)"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Store unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, WorkflowError> {
    let payload = payload.into_inner();
    let record = service
        .submit(
            &auth.actor(),
            NewLeave {
                supervisor_id: payload.supervisor_id,
                absence_type: payload.absence_type,
                start_date: payload.start_date,
                end_date: payload.end_date,
                reason: payload.reason,
                signature: payload.signature,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(record))
}

async fn decide(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    leave_id: Uuid,
    action: DecisionAction,
    payload: DecideLeave,
) -> Result<HttpResponse, WorkflowError> {
    let record = service
        .decide(
            leave_id,
            &auth.actor(),
            Decision {
                action,
                signature: payload.signature,
                comments: payload.comments,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

/* =========================
Approve leave (supervisor, then admin)
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(("leave_id" = Uuid, Path, description = "ID of the leave request to approve")),
    request_body = DecideLeave,
    responses(
        (status = 200, description = "Decision recorded", body = LeaveRequest),
        (status = 400, description = "Missing signature or comments"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Actor is neither the designated supervisor nor an admin"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Illegal transition, already finalized, or lost race")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    payload: web::Json<DecideLeave>,
) -> Result<HttpResponse, WorkflowError> {
    decide(
        auth,
        service,
        path.into_inner(),
        DecisionAction::Approve,
        payload.into_inner(),
    )
    .await
}

/* =========================
Reject leave (supervisor, then admin)
========================= */
/// Swagger doc for reject_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(("leave_id" = Uuid, Path, description = "ID of the leave request to reject")),
    request_body = DecideLeave,
    responses(
        (status = 200, description = "Decision recorded", body = LeaveRequest),
        (status = 400, description = "Missing signature or rejection comments"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Actor is neither the designated supervisor nor an admin"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Illegal transition, already finalized, or lost race")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
    payload: web::Json<DecideLeave>,
) -> Result<HttpResponse, WorkflowError> {
    decide(
        auth,
        service,
        path.into_inner(),
        DecisionAction::Reject,
        payload.into_inner(),
    )
    .await
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(("leave_id" = Uuid, Path, description = "ID of the leave request to fetch")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not visible to this actor"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WorkflowError> {
    let record = service.get(path.into_inner(), &auth.actor()).await?;
    Ok(HttpResponse::Ok().json(record))
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, WorkflowError> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);

    let (data, total) = service
        .list(
            &auth.actor(),
            LeaveQuery {
                employee_id: query.employee_id.clone(),
                status: query.status,
                page,
                per_page,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/* =========================
Delete leave (admin, or owner while pending)
========================= */
/// Swagger doc for delete_leave endpoint
#[utoipa::path(
    delete,
    path = "/api/leave/{leave_id}",
    params(("leave_id" = Uuid, Path, description = "ID of the leave request to delete")),
    responses(
        (status = 204, description = "Leave request deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only admins or the owning employee may delete"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Owner may only delete while the request is pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WorkflowError> {
    service.delete(path.into_inner(), &auth.actor()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Re-send the supervisor notification for a submitted request
#[utoipa::path(
    post,
    path = "/api/leave/{leave_id}/notify",
    params(("leave_id" = Uuid, Path, description = "ID of the leave request")),
    responses(
        (status = 202, description = "Notification queued (best-effort)"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only the owner or an admin may re-notify"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn notify_leave(
    auth: AuthUser,
    service: web::Data<LeaveService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WorkflowError> {
    service
        .notify_supervisor(path.into_inner(), &auth.actor())
        .await?;
    Ok(HttpResponse::Accepted().json(serde_json::json!({
        "message": "Supervisor notification queued"
    })))
}
