//! Balance ledger: the only code allowed to mutate leave balances. All four
//! operations require the (user, type, year) record to pre-exist and must run
//! inside the same transaction as the request/step mutation they accompany.

use sqlx::SqliteConnection;

use crate::core::error::LeaveError;
use crate::model::balance::LeaveBalance;

pub async fn fetch(
    conn: &mut SqliteConnection,
    user_id: i64,
    leave_type_id: i64,
    year: i32,
) -> Result<LeaveBalance, LeaveError> {
    sqlx::query_as::<_, LeaveBalance>(
        r#"
        SELECT id, user_id, leave_type_id, year, total_days, used_days, reserved_days
        FROM leave_balances
        WHERE user_id = ? AND leave_type_id = ? AND year = ?
        "#,
    )
    .bind(user_id)
    .bind(leave_type_id)
    .bind(year)
    .fetch_optional(conn)
    .await?
    .ok_or(LeaveError::BalanceNotFound)
}

/// Hold `amount` days against a pending request. Fails if fewer than `amount`
/// days are available; `available = total - used - reserved` stays >= 0.
pub async fn reserve(
    conn: &mut SqliteConnection,
    user_id: i64,
    leave_type_id: i64,
    year: i32,
    amount: f64,
) -> Result<(), LeaveError> {
    let balance = fetch(conn, user_id, leave_type_id, year).await?;
    if balance.available_days() < amount {
        return Err(LeaveError::InsufficientBalance {
            available: balance.available_days(),
            requested: amount,
        });
    }

    sqlx::query("UPDATE leave_balances SET reserved_days = reserved_days + ? WHERE id = ?")
        .bind(amount)
        .bind(balance.id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Final approval: move `amount` from reserved to used.
pub async fn commit(
    conn: &mut SqliteConnection,
    user_id: i64,
    leave_type_id: i64,
    year: i32,
    amount: f64,
) -> Result<(), LeaveError> {
    let balance = fetch(conn, user_id, leave_type_id, year).await?;

    sqlx::query(
        "UPDATE leave_balances SET reserved_days = reserved_days - ?, used_days = used_days + ? WHERE id = ?",
    )
    .bind(amount)
    .bind(amount)
    .bind(balance.id)
    .execute(conn)
    .await?;

    Ok(())
}

/// Rejection or cancellation of a still-pending request: give the reserved
/// days back. The caller guarantees `amount` was previously reserved.
pub async fn release(
    conn: &mut SqliteConnection,
    user_id: i64,
    leave_type_id: i64,
    year: i32,
    amount: f64,
) -> Result<(), LeaveError> {
    let balance = fetch(conn, user_id, leave_type_id, year).await?;

    sqlx::query("UPDATE leave_balances SET reserved_days = reserved_days - ? WHERE id = ?")
        .bind(amount)
        .bind(balance.id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Cancellation of an already-approved request: give the used days back.
pub async fn revert_usage(
    conn: &mut SqliteConnection,
    user_id: i64,
    leave_type_id: i64,
    year: i32,
    amount: f64,
) -> Result<(), LeaveError> {
    let balance = fetch(conn, user_id, leave_type_id, year).await?;

    sqlx::query("UPDATE leave_balances SET used_days = used_days - ? WHERE id = ?")
        .bind(amount)
        .bind(balance.id)
        .execute(conn)
        .await?;

    Ok(())
}
