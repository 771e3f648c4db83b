use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::core::{directory, error::LeaveError};
use crate::model::delegation::Delegation;
use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct CreateDelegation {
    #[schema(example = 3)]
    pub delegate_id: i64,
    #[schema(example = "2026-09-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-14", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

const COLUMNS: &str = "id, delegator_id, delegate_id, start_date, end_date, is_active";

/// Hand the caller's approvals to a delegate for a date range (manager/HR).
#[utoipa::path(
    post,
    path = "/api/delegations",
    request_body = CreateDelegation,
    responses(
        (status = 201, description = "Delegation created", body = Delegation),
        (status = 400, description = "Invalid date range"),
        (status = 404, description = "Delegate user not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Delegations"
)]
pub async fn create_delegation(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateDelegation>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_hr()?;

    if payload.start_date > payload.end_date {
        return Err(LeaveError::InvalidDateRange.into());
    }

    let mut conn = pool.acquire().await.map_err(LeaveError::from)?;
    if directory::get_user(&mut *conn, payload.delegate_id).await?.is_none() {
        return Err(LeaveError::UserNotFound.into());
    }
    drop(conn);

    let result = sqlx::query(
        r#"
        INSERT INTO delegations (delegator_id, delegate_id, start_date, end_date, is_active)
        VALUES (?, ?, ?, ?, 1)
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.delegate_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .execute(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    let created: Delegation =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM delegations WHERE id = ?"))
            .bind(result.last_insert_rowid())
            .fetch_one(pool.get_ref())
            .await
            .map_err(LeaveError::from)?;

    Ok(HttpResponse::Created().json(created))
}

/// Delegations effective today where the caller is delegator or delegate.
#[utoipa::path(
    get,
    path = "/api/delegations/active",
    responses(
        (status = 200, description = "Active delegations", body = [Delegation]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Delegations"
)]
pub async fn active_delegations(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_hr()?;

    let today = Utc::now().date_naive();

    let delegations: Vec<Delegation> = sqlx::query_as(&format!(
        r#"
        SELECT {COLUMNS} FROM delegations
        WHERE is_active = 1
          AND start_date <= ?
          AND end_date >= ?
          AND (delegator_id = ? OR delegate_id = ?)
        "#
    ))
    .bind(today)
    .bind(today)
    .bind(auth.user_id)
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(delegations))
}

/// Soft-deactivate a delegation (its delegator, or any HR admin).
#[utoipa::path(
    delete,
    path = "/api/delegations/{id}",
    params(("id" = i64, Path, description = "Delegation id")),
    responses(
        (status = 200, description = "Delegation deactivated"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Delegation not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Delegations"
)]
pub async fn cancel_delegation(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let delegation: Option<Delegation> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM delegations WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(LeaveError::from)?;

    let Some(delegation) = delegation else {
        return Ok(HttpResponse::NotFound().json(json!({"error": "Delegation not found"})));
    };

    if delegation.delegator_id != auth.user_id && auth.role != Role::HrAdmin {
        return Err(LeaveError::Forbidden.into());
    }

    sqlx::query("UPDATE delegations SET is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(json!({"message": "Delegation cancelled"})))
}
