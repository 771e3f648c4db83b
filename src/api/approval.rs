use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::core::{error::LeaveError, workflow};
use crate::model::status::RequestStatus;

#[derive(Deserialize, ToSchema)]
pub struct ApprovalAction {
    #[schema(example = "Enjoy your leave", nullable = true)]
    pub comments: Option<String>,
}

/// A pending approval task joined with its request, as shown on an
/// approver's worklist.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct PendingApproval {
    #[schema(example = 1)]
    pub step_id: i64,
    #[schema(example = 1)]
    pub leave_request_id: i64,
    #[schema(example = 1)]
    pub level: i64,
    #[schema(example = 4)]
    pub requester_id: i64,
    #[schema(example = "Jane Doe")]
    pub requester_name: String,
    #[schema(example = "Annual Leave")]
    pub leave_type_name: String,
    #[schema(example = "2026-09-07", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-11", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = 5.0)]
    pub total_days: f64,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
}

async fn respond_decision(
    pool: &SqlitePool,
    request_id: i64,
    approver_id: i64,
    approve: bool,
    comments: Option<&str>,
) -> Result<HttpResponse, LeaveError> {
    let status = workflow::process_decision(pool, request_id, approver_id, approve, comments).await?;

    let message = match status {
        RequestStatus::Approved => "Leave request approved",
        RequestStatus::Rejected => "Leave request rejected",
        _ => "Decision recorded, awaiting next approval level",
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": message,
        "request_status": status,
    })))
}

/// Approve the caller's pending step on a leave request.
#[utoipa::path(
    put,
    path = "/api/approvals/{id}/approve",
    params(("id" = i64, Path, description = "Leave request id")),
    request_body = ApprovalAction,
    responses(
        (status = 200, description = "Decision recorded"),
        (status = 400, description = "Out-of-order approval"),
        (status = 404, description = "No pending approval for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "Approvals"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<ApprovalAction>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_hr()?;

    let resp = respond_decision(
        pool.get_ref(),
        path.into_inner(),
        auth.user_id,
        true,
        payload.comments.as_deref(),
    )
    .await?;

    Ok(resp)
}

/// Reject the caller's pending step on a leave request.
#[utoipa::path(
    put,
    path = "/api/approvals/{id}/reject",
    params(("id" = i64, Path, description = "Leave request id")),
    request_body = ApprovalAction,
    responses(
        (status = 200, description = "Decision recorded"),
        (status = 400, description = "Out-of-order approval"),
        (status = 404, description = "No pending approval for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "Approvals"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<ApprovalAction>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_hr()?;

    let resp = respond_decision(
        pool.get_ref(),
        path.into_inner(),
        auth.user_id,
        false,
        payload.comments.as_deref(),
    )
    .await?;

    Ok(resp)
}

/// The caller's pending approval tasks on still-pending requests.
#[utoipa::path(
    get,
    path = "/api/approvals/pending",
    responses(
        (status = 200, description = "Pending approvals", body = [PendingApproval]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Approvals"
)]
pub async fn my_pending_approvals(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_hr()?;

    let pending: Vec<PendingApproval> = sqlx::query_as(
        r#"
        SELECT s.id AS step_id,
               s.leave_request_id,
               s.level,
               r.user_id AS requester_id,
               u.full_name AS requester_name,
               t.name AS leave_type_name,
               r.start_date,
               r.end_date,
               r.total_days,
               r.created_at
        FROM approval_steps s
        JOIN leave_requests r ON r.id = s.leave_request_id
        JOIN users u ON u.id = r.user_id
        JOIN leave_types t ON t.id = r.leave_type_id
        WHERE s.approver_id = ?
          AND s.status = 'pending'
          AND r.status = 'pending'
        ORDER BY r.created_at
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(pending))
}
