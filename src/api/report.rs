use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::core::error::LeaveError;
use crate::model::role::Role;

#[derive(Deserialize, IntoParams)]
pub struct CalendarQuery {
    /// Window start (inclusive)
    #[param(value_type = String, format = "date")]
    pub start: NaiveDate,
    /// Window end (inclusive)
    #[param(value_type = String, format = "date")]
    pub end: NaiveDate,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct CalendarEntry {
    #[schema(example = 4)]
    pub user_id: i64,
    #[schema(example = "Jane Doe")]
    pub user_name: String,
    #[schema(example = "Annual Leave")]
    pub leave_type: String,
    #[schema(example = "2026-09-07", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-09-11", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = 5.0)]
    pub total_days: f64,
}

#[derive(Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Calendar year to aggregate
    pub year: i32,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct DepartmentSummary {
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = 12)]
    pub total_employees: i64,
    #[schema(example = 34.0)]
    pub total_used_days: f64,
    #[schema(example = 5.0)]
    pub total_reserved_days: f64,
}

/// Approved leave intersecting a date window: a manager's own team plus
/// themselves, or everyone for an HR admin.
#[utoipa::path(
    get,
    path = "/api/reports/team-calendar",
    params(CalendarQuery),
    responses(
        (status = 200, description = "Calendar entries", body = [CalendarEntry]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn team_calendar(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<CalendarQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_hr()?;

    let base = r#"
        SELECT r.user_id, u.full_name AS user_name, t.name AS leave_type,
               r.start_date, r.end_date, r.total_days
        FROM leave_requests r
        JOIN users u ON u.id = r.user_id
        JOIN leave_types t ON t.id = r.leave_type_id
        WHERE r.status = 'approved'
          AND r.start_date <= ?
          AND r.end_date >= ?
    "#;

    let entries: Vec<CalendarEntry> = match auth.role {
        Role::Manager => {
            let sql = format!(
                "{base} AND (r.user_id = ? OR r.user_id IN (SELECT id FROM users WHERE manager_id = ?)) ORDER BY r.start_date"
            );
            sqlx::query_as(&sql)
                .bind(query.end)
                .bind(query.start)
                .bind(auth.user_id)
                .bind(auth.user_id)
                .fetch_all(pool.get_ref())
                .await
                .map_err(LeaveError::from)?
        }
        _ => {
            let sql = format!("{base} ORDER BY r.start_date");
            sqlx::query_as(&sql)
                .bind(query.end)
                .bind(query.start)
                .fetch_all(pool.get_ref())
                .await
                .map_err(LeaveError::from)?
        }
    };

    Ok(HttpResponse::Ok().json(serde_json::json!({ "calendar": entries })))
}

/// Per-department used/reserved totals for a year (HR admin only).
#[utoipa::path(
    get,
    path = "/api/reports/leave-summary",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Department summary", body = [DepartmentSummary]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn leave_summary(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let summary: Vec<DepartmentSummary> = sqlx::query_as(
        r#"
        SELECT COALESCE(u.department, 'Unassigned') AS department,
               COUNT(DISTINCT u.id) AS total_employees,
               COALESCE(SUM(b.used_days), 0) AS total_used_days,
               COALESCE(SUM(b.reserved_days), 0) AS total_reserved_days
        FROM users u
        LEFT JOIN leave_balances b ON b.user_id = u.id AND b.year = ?
        WHERE u.is_active = 1
        GROUP BY COALESCE(u.department, 'Unassigned')
        ORDER BY department
        "#,
    )
    .bind(query.year)
    .fetch_all(pool.get_ref())
    .await
    .map_err(LeaveError::from)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "year": query.year,
        "summary": summary,
    })))
}
