use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::core::error::LeaveError;
use crate::model::role::Role;
use crate::model::user::User;

#[derive(Deserialize, ToSchema)]
pub struct UpdateUser {
    #[schema(nullable = true)]
    pub full_name: Option<String>,
    #[schema(nullable = true)]
    pub department: Option<String>,
    /// Only HR admins may re-link a user to another manager.
    #[schema(nullable = true)]
    pub manager_id: Option<i64>,
}

const COLUMNS: &str =
    "id, email, full_name, password_hash, role, manager_id, department, hire_date, is_active";

/// List users: managers see their team, HR admins every active user.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_hr()?;

    let users: Vec<User> = match auth.role {
        Role::Manager => sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM users WHERE manager_id = ? AND is_active = 1 ORDER BY id"
        ))
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(LeaveError::from)?,
        _ => sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM users WHERE is_active = 1 ORDER BY id"
        ))
        .fetch_all(pool.get_ref())
        .await
        .map_err(LeaveError::from)?,
    };

    Ok(HttpResponse::Ok().json(users))
}

/// User details. Employees may only look at themselves.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();

    if auth.role == Role::Employee && auth.user_id != user_id {
        return Err(LeaveError::Forbidden.into());
    }

    let user: Option<User> = sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(user_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    match user {
        Some(u) => Ok(HttpResponse::Ok().json(u)),
        None => Ok(HttpResponse::NotFound().json(json!({"error": "User not found"}))),
    }
}

/// Update a profile. Users may edit themselves; HR admins anyone, including
/// the manager link.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<UpdateUser>,
) -> actix_web::Result<impl Responder> {
    let user_id = path.into_inner();

    if auth.role != Role::HrAdmin && auth.user_id != user_id {
        return Err(LeaveError::Forbidden.into());
    }

    let existing: Option<User> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
            .bind(user_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(LeaveError::from)?;

    let Some(existing) = existing else {
        return Ok(HttpResponse::NotFound().json(json!({"error": "User not found"})));
    };

    let manager_id = if auth.role == Role::HrAdmin {
        payload.manager_id.or(existing.manager_id)
    } else {
        existing.manager_id
    };

    sqlx::query("UPDATE users SET full_name = ?, department = ?, manager_id = ? WHERE id = ?")
        .bind(payload.full_name.as_deref().unwrap_or(&existing.full_name))
        .bind(payload.department.as_deref().or(existing.department.as_deref()))
        .bind(manager_id)
        .bind(user_id)
        .execute(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    let updated: User = sqlx::query_as(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(user_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Active direct reports of a manager. Managers may only look at their own team.
#[utoipa::path(
    get,
    path = "/api/users/{id}/team",
    params(("id" = i64, Path, description = "Manager user id")),
    responses(
        (status = 200, description = "Team members", body = [User]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_team(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_hr()?;

    let manager_id = path.into_inner();
    if auth.role == Role::Manager && auth.user_id != manager_id {
        return Err(LeaveError::Forbidden.into());
    }

    let team: Vec<User> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM users WHERE manager_id = ? AND is_active = 1 ORDER BY id"
    ))
    .bind(manager_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(team))
}
