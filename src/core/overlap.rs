use chrono::NaiveDate;
use sqlx::SqliteConnection;

use crate::core::error::LeaveError;

/// True iff the user already has a pending or approved request whose inclusive
/// date range intersects [start, end]. `exclude` skips one request id, for
/// update-in-place checks. Pure query, no side effects.
pub async fn has_overlap(
    conn: &mut SqliteConnection,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    exclude: Option<i64>,
) -> Result<bool, LeaveError> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*)
        FROM leave_requests
        WHERE user_id = ?
          AND status IN ('pending', 'approved')
          AND start_date <= ?
          AND end_date >= ?
          AND (? IS NULL OR id != ?)
        "#,
    )
    .bind(user_id)
    .bind(end)
    .bind(start)
    .bind(exclude)
    .bind(exclude)
    .fetch_one(conn)
    .await?;

    Ok(count > 0)
}
