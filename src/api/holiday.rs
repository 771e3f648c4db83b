use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::core::error::LeaveError;
use crate::model::holiday::Holiday;

#[derive(Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "New Year's Day")]
    pub name: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[serde(default = "default_true")]
    pub is_mandatory: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateHoliday {
    #[schema(nullable = true)]
    pub name: Option<String>,
    #[schema(format = "date", value_type = Option<String>, nullable = true)]
    pub date: Option<NaiveDate>,
    #[schema(nullable = true)]
    pub is_mandatory: Option<bool>,
}

const COLUMNS: &str = "id, name, date, is_mandatory, created_by";

/// All declared holidays, soonest first.
#[utoipa::path(
    get,
    path = "/api/holidays",
    responses((status = 200, description = "Holidays", body = [Holiday])),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn list_holidays(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let holidays: Vec<Holiday> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM holidays ORDER BY date"))
            .fetch_all(pool.get_ref())
            .await
            .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(holidays))
}

/// Holidays of one calendar year.
#[utoipa::path(
    get,
    path = "/api/holidays/{year}",
    params(("year" = i32, Path, description = "Calendar year")),
    responses((status = 200, description = "Holidays", body = [Holiday])),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn holidays_by_year(
    _auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i32>,
) -> actix_web::Result<impl Responder> {
    let year = path.into_inner();
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year, 12, 31);

    let (Some(start), Some(end)) = (start, end) else {
        return Ok(HttpResponse::BadRequest().json(json!({"error": "Invalid year"})));
    };

    let holidays: Vec<Holiday> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM holidays WHERE date >= ? AND date <= ? ORDER BY date"
    ))
    .bind(start)
    .bind(end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(holidays))
}

/// Declare a holiday (HR admin only).
#[utoipa::path(
    post,
    path = "/api/holidays",
    request_body = CreateHoliday,
    responses(
        (status = 201, description = "Holiday created", body = Holiday),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateHoliday>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let result = sqlx::query(
        "INSERT INTO holidays (name, date, is_mandatory, created_by) VALUES (?, ?, ?, ?)",
    )
    .bind(&payload.name)
    .bind(payload.date)
    .bind(payload.is_mandatory)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    let created: Holiday = sqlx::query_as(&format!("SELECT {COLUMNS} FROM holidays WHERE id = ?"))
        .bind(result.last_insert_rowid())
        .fetch_one(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    Ok(HttpResponse::Created().json(created))
}

/// Edit a holiday (HR admin only).
#[utoipa::path(
    put,
    path = "/api/holidays/{id}",
    params(("id" = i64, Path, description = "Holiday id")),
    request_body = UpdateHoliday,
    responses(
        (status = 200, description = "Holiday updated", body = Holiday),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Holiday not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn update_holiday(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<UpdateHoliday>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let id = path.into_inner();

    let existing: Option<Holiday> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM holidays WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(LeaveError::from)?;

    let Some(existing) = existing else {
        return Ok(HttpResponse::NotFound().json(json!({"error": "Holiday not found"})));
    };

    sqlx::query("UPDATE holidays SET name = ?, date = ?, is_mandatory = ? WHERE id = ?")
        .bind(payload.name.as_deref().unwrap_or(&existing.name))
        .bind(payload.date.unwrap_or(existing.date))
        .bind(payload.is_mandatory.unwrap_or(existing.is_mandatory))
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    let updated: Holiday = sqlx::query_as(&format!("SELECT {COLUMNS} FROM holidays WHERE id = ?"))
        .bind(id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Remove a holiday (HR admin only).
#[utoipa::path(
    delete,
    path = "/api/holidays/{id}",
    params(("id" = i64, Path, description = "Holiday id")),
    responses(
        (status = 200, description = "Holiday deleted"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Holiday not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Holidays"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(LeaveError::from)?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({"error": "Holiday not found"})));
    }

    Ok(HttpResponse::Ok().json(json!({"message": "Holiday deleted"})))
}
