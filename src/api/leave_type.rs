use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::core::error::LeaveError;
use crate::model::leave_type::LeaveType;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeaveType {
    #[schema(example = "Study Leave")]
    pub name: String,
    #[schema(example = 10.0)]
    pub annual_quota: f64,
    #[serde(default)]
    pub requires_documentation: bool,
    #[serde(default = "default_true")]
    pub is_paid: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveType {
    #[schema(nullable = true)]
    pub name: Option<String>,
    #[schema(nullable = true)]
    pub annual_quota: Option<f64>,
    #[schema(nullable = true)]
    pub requires_documentation: Option<bool>,
    #[schema(nullable = true)]
    pub is_paid: Option<bool>,
}

const COLUMNS: &str = "id, name, annual_quota, requires_documentation, is_paid, is_active";

/// List active leave types.
#[utoipa::path(
    get,
    path = "/api/leave-types",
    responses((status = 200, description = "Leave types", body = [LeaveType])),
    security(("bearer_auth" = [])),
    tag = "Leave Types"
)]
pub async fn list_leave_types(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let types: Vec<LeaveType> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM leave_types WHERE is_active = 1 ORDER BY id"
    ))
    .fetch_all(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(types))
}

/// Create a leave type (HR admin only).
#[utoipa::path(
    post,
    path = "/api/leave-types",
    request_body = CreateLeaveType,
    responses(
        (status = 201, description = "Leave type created", body = LeaveType),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Name already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Types"
)]
pub async fn create_leave_type(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateLeaveType>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    if payload.annual_quota <= 0.0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "annual_quota must be positive"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO leave_types (name, annual_quota, requires_documentation, is_paid, is_active)
        VALUES (?, ?, ?, ?, 1)
        "#,
    )
    .bind(&payload.name)
    .bind(payload.annual_quota)
    .bind(payload.requires_documentation)
    .bind(payload.is_paid)
    .execute(pool.get_ref())
    .await;

    let id = match result {
        Ok(r) => r.last_insert_rowid(),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "error": "Leave type already exists"
                    })));
                }
            }
            return Err(LeaveError::from(e).into());
        }
    };

    let created: LeaveType =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM leave_types WHERE id = ?"))
            .bind(id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(LeaveError::from)?;

    Ok(HttpResponse::Created().json(created))
}

/// Administrative edit of a leave type (HR admin only).
#[utoipa::path(
    put,
    path = "/api/leave-types/{id}",
    params(("id" = i64, Path, description = "Leave type id")),
    request_body = UpdateLeaveType,
    responses(
        (status = 200, description = "Leave type updated", body = LeaveType),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Types"
)]
pub async fn update_leave_type(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<UpdateLeaveType>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let id = path.into_inner();

    let existing: Option<LeaveType> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM leave_types WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(LeaveError::from)?;

    let Some(existing) = existing else {
        return Ok(HttpResponse::NotFound().json(json!({"error": "Leave type not found"})));
    };

    if let Some(quota) = payload.annual_quota {
        if quota <= 0.0 {
            return Ok(HttpResponse::BadRequest().json(json!({
                "error": "annual_quota must be positive"
            })));
        }
    }

    sqlx::query(
        r#"
        UPDATE leave_types
        SET name = ?, annual_quota = ?, requires_documentation = ?, is_paid = ?
        WHERE id = ?
        "#,
    )
    .bind(payload.name.as_deref().unwrap_or(&existing.name))
    .bind(payload.annual_quota.unwrap_or(existing.annual_quota))
    .bind(
        payload
            .requires_documentation
            .unwrap_or(existing.requires_documentation),
    )
    .bind(payload.is_paid.unwrap_or(existing.is_paid))
    .bind(id)
    .execute(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    let updated: LeaveType =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM leave_types WHERE id = ?"))
            .bind(id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Soft-deactivate a leave type (HR admin only). Never deletes: historical
/// balances keep their reference.
#[utoipa::path(
    delete,
    path = "/api/leave-types/{id}",
    params(("id" = i64, Path, description = "Leave type id")),
    responses(
        (status = 200, description = "Leave type deactivated"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave type not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave Types"
)]
pub async fn deactivate_leave_type(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let result = sqlx::query("UPDATE leave_types SET is_active = 0 WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({"error": "Leave type not found"})));
    }

    Ok(HttpResponse::Ok().json(json!({"message": "Leave type deactivated"})))
}
