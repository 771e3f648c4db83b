use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::core::{error::LeaveError, lifecycle, workflow};
use crate::model::leave_request::LeaveRequest;
use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1)]
    pub leave_type_id: i64,
    #[schema(example = "2026-09-07", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-11", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family trip", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeave {
    #[schema(example = "2026-09-08", format = "date", value_type = String, nullable = true)]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-09-11", format = "date", value_type = String, nullable = true)]
    pub end_date: Option<NaiveDate>,
    #[schema(nullable = true)]
    pub reason: Option<String>,
}

/// Submit a new leave request.
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body = CreateLeave,
    responses(
        (status = 200, description = "Leave request created", body = LeaveRequest),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Overlapping leave request")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let request = lifecycle::create(
        pool.get_ref(),
        auth.user_id,
        payload.leave_type_id,
        payload.start_date,
        payload.end_date,
        payload.reason.clone(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(request))
}

/// List leave requests visible to the caller: employees see their own,
/// managers their team's plus their own, HR admins everything.
#[utoipa::path(
    get,
    path = "/api/leave",
    responses(
        (status = 200, description = "Leave requests", body = [LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    const COLUMNS: &str = "id, user_id, leave_type_id, start_date, end_date, total_days, reason, status, created_at, updated_at";

    let requests: Vec<LeaveRequest> = match auth.role {
        Role::HrAdmin => {
            sqlx::query_as(&format!(
                "SELECT {COLUMNS} FROM leave_requests ORDER BY created_at DESC"
            ))
            .fetch_all(pool.get_ref())
            .await
            .map_err(LeaveError::from)?
        }
        Role::Manager => {
            sqlx::query_as(&format!(
                r#"
                SELECT {COLUMNS} FROM leave_requests
                WHERE user_id = ?
                   OR user_id IN (SELECT id FROM users WHERE manager_id = ?)
                ORDER BY created_at DESC
                "#
            ))
            .bind(auth.user_id)
            .bind(auth.user_id)
            .fetch_all(pool.get_ref())
            .await
            .map_err(LeaveError::from)?
        }
        Role::Employee => {
            sqlx::query_as(&format!(
                "SELECT {COLUMNS} FROM leave_requests WHERE user_id = ? ORDER BY created_at DESC"
            ))
            .bind(auth.user_id)
            .fetch_all(pool.get_ref())
            .await
            .map_err(LeaveError::from)?
        }
    };

    Ok(HttpResponse::Ok().json(requests))
}

/// Leave request details plus its approval chain.
#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    params(("id" = i64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave request found"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let request_id = path.into_inner();

    let mut conn = pool.acquire().await.map_err(LeaveError::from)?;
    let request = lifecycle::fetch_request(&mut *conn, request_id).await?;

    if auth.role == Role::Employee && request.user_id != auth.user_id {
        return Err(LeaveError::Forbidden.into());
    }

    let steps = workflow::steps_for_request(&mut *conn, request_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "request": request,
        "approval_chain": steps,
    })))
}

/// Update a still-pending leave request (owner only).
#[utoipa::path(
    put,
    path = "/api/leave/{id}",
    params(("id" = i64, Path, description = "Leave request id")),
    request_body = UpdateLeave,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRequest),
        (status = 400, description = "Not pending or validation failure"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<UpdateLeave>,
) -> actix_web::Result<impl Responder> {
    let request = lifecycle::update(
        pool.get_ref(),
        path.into_inner(),
        auth.user_id,
        payload.start_date,
        payload.end_date,
        payload.reason.clone(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(request))
}

/// Cancel a pending or approved future-dated leave request (owner only).
#[utoipa::path(
    delete,
    path = "/api/leave/{id}",
    params(("id" = i64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Leave request cancelled", body = LeaveRequest),
        (status = 400, description = "Not cancellable"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let request = lifecycle::cancel(pool.get_ref(), path.into_inner(), auth.user_id).await?;

    Ok(HttpResponse::Ok().json(request))
}
