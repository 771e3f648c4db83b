use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::core::{error::LeaveError, lifecycle};

/// A balance row joined with its leave type name, with the derived
/// availability spelled out.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub user_id: i64,
    #[schema(example = 1)]
    pub leave_type_id: i64,
    #[schema(example = "Annual Leave")]
    pub leave_type_name: String,
    #[schema(example = 2026)]
    pub year: i64,
    #[schema(example = 20.0)]
    pub total_days: f64,
    #[schema(example = 3.0)]
    pub used_days: f64,
    #[schema(example = 2.0)]
    pub reserved_days: f64,
    #[schema(example = 15.0)]
    pub available_days: f64,
}

async fn balances_for(pool: &SqlitePool, user_id: i64) -> Result<Vec<BalanceResponse>, LeaveError> {
    let year = Utc::now().date_naive().year();

    let balances = sqlx::query_as::<_, BalanceResponse>(
        r#"
        SELECT b.id, b.user_id, b.leave_type_id, t.name AS leave_type_name, b.year,
               b.total_days, b.used_days, b.reserved_days,
               b.total_days - b.used_days - b.reserved_days AS available_days
        FROM leave_balances b
        JOIN leave_types t ON t.id = b.leave_type_id
        WHERE b.user_id = ? AND b.year = ?
        "#,
    )
    .bind(user_id)
    .bind(year)
    .fetch_all(pool)
    .await?;

    Ok(balances)
}

/// Current user's balances for the current year.
#[utoipa::path(
    get,
    path = "/api/balances/me",
    responses(
        (status = 200, description = "Balances", body = [BalanceResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Balances"
)]
pub async fn my_balances(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    let balances = balances_for(pool.get_ref(), auth.user_id).await?;
    Ok(HttpResponse::Ok().json(balances))
}

/// Another user's balances (manager/HR only).
#[utoipa::path(
    get,
    path = "/api/balances/{user_id}",
    params(("user_id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "Balances", body = [BalanceResponse]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Balances"
)]
pub async fn user_balances(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_hr()?;

    let balances = balances_for(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(balances))
}

/// Create the missing balance rows for every active user and leave type in
/// the given year (HR admin only). Idempotent.
#[utoipa::path(
    post,
    path = "/api/balances/initialize/{year}",
    params(("year" = i32, Path, description = "Calendar year")),
    responses(
        (status = 200, description = "Balances initialized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Balances"
)]
pub async fn initialize_balances(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i32>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let year = path.into_inner();
    let created = lifecycle::initialize_balances(pool.get_ref(), year).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Initialized {created} leave balances for year {year}")
    })))
}
