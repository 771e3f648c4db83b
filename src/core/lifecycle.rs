//! Request lifecycle controller: owns the leave-request state machine and
//! coordinates calendar, overlap checker, ledger and workflow engine. Every
//! mutating operation here runs as one transaction, so a failure at any step
//! leaves no partial reservation or orphaned request behind.

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::core::error::LeaveError;
use crate::core::{calendar, ledger, overlap, workflow};
use crate::model::leave_request::LeaveRequest;
use crate::model::status::RequestStatus;

pub async fn fetch_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<LeaveRequest, LeaveError> {
    sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, user_id, leave_type_id, start_date, end_date, total_days,
               reason, status, created_at, updated_at
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(request_id)
    .fetch_optional(conn)
    .await?
    .ok_or(LeaveError::RequestNotFound)
}

/// Validate, reserve, persist and hand off to the workflow engine.
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    leave_type_id: i64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: Option<String>,
) -> Result<LeaveRequest, LeaveError> {
    let today = Utc::now().date_naive();

    if start_date > end_date {
        return Err(LeaveError::InvalidDateRange);
    }
    if start_date < today {
        return Err(LeaveError::PastDateNotAllowed);
    }

    let mut tx = pool.begin().await?;

    let total_days = calendar::working_days(&mut *tx, start_date, end_date).await?;
    if total_days == 0.0 {
        return Err(LeaveError::ZeroWorkingDays);
    }

    if overlap::has_overlap(&mut *tx, user_id, start_date, end_date, None).await? {
        return Err(LeaveError::OverlappingRequest);
    }

    let year = start_date.year();
    ledger::reserve(&mut *tx, user_id, leave_type_id, year, total_days).await?;

    let now = Utc::now().naive_utc();
    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (user_id, leave_type_id, start_date, end_date, total_days, reason, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, 'pending', ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(leave_type_id)
    .bind(start_date)
    .bind(end_date)
    .bind(total_days)
    .bind(&reason)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let request_id = result.last_insert_rowid();

    workflow::build_chain(&mut *tx, request_id, user_id, total_days).await?;

    let request = fetch_request(&mut *tx, request_id).await?;
    tx.commit().await?;

    info!(request_id, user_id, total_days, "leave request created");
    Ok(request)
}

/// Edit a still-pending request. Changed dates release the old reservation
/// and re-reserve the new amount inside the same transaction, so an
/// insufficient balance rolls back with the old reservation untouched.
pub async fn update(
    pool: &SqlitePool,
    request_id: i64,
    caller_id: i64,
    new_start: Option<NaiveDate>,
    new_end: Option<NaiveDate>,
    new_reason: Option<String>,
) -> Result<LeaveRequest, LeaveError> {
    let mut tx = pool.begin().await?;

    let request = fetch_request(&mut *tx, request_id).await?;

    if request.user_id != caller_id {
        return Err(LeaveError::Forbidden);
    }
    if request.status != RequestStatus::Pending {
        return Err(LeaveError::NotPending);
    }

    if new_start.is_some() || new_end.is_some() {
        let start_date = new_start.unwrap_or(request.start_date);
        let end_date = new_end.unwrap_or(request.end_date);

        if start_date > end_date {
            return Err(LeaveError::InvalidDateRange);
        }

        let total_days = calendar::working_days(&mut *tx, start_date, end_date).await?;
        if total_days == 0.0 {
            return Err(LeaveError::ZeroWorkingDays);
        }

        if overlap::has_overlap(&mut *tx, caller_id, start_date, end_date, Some(request_id)).await?
        {
            return Err(LeaveError::OverlappingRequest);
        }

        // Release from the year originally charged, reserve into the new
        // start year; the reserve re-checks availability.
        ledger::release(
            &mut *tx,
            request.user_id,
            request.leave_type_id,
            request.start_date.year(),
            request.total_days,
        )
        .await?;
        ledger::reserve(
            &mut *tx,
            request.user_id,
            request.leave_type_id,
            start_date.year(),
            total_days,
        )
        .await?;

        sqlx::query(
            "UPDATE leave_requests SET start_date = ?, end_date = ?, total_days = ? WHERE id = ?",
        )
        .bind(start_date)
        .bind(end_date)
        .bind(total_days)
        .bind(request_id)
        .execute(&mut *tx)
        .await?;
    }

    if let Some(reason) = new_reason {
        sqlx::query("UPDATE leave_requests SET reason = ? WHERE id = ?")
            .bind(reason)
            .bind(request_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("UPDATE leave_requests SET updated_at = ? WHERE id = ?")
        .bind(Utc::now().naive_utc())
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

    let updated = fetch_request(&mut *tx, request_id).await?;
    tx.commit().await?;

    info!(request_id, caller_id, "leave request updated");
    Ok(updated)
}

/// Cancel a pending or approved request whose leave has not yet started.
pub async fn cancel(
    pool: &SqlitePool,
    request_id: i64,
    caller_id: i64,
) -> Result<LeaveRequest, LeaveError> {
    let today = Utc::now().date_naive();
    let mut tx = pool.begin().await?;

    let request = fetch_request(&mut *tx, request_id).await?;

    if request.user_id != caller_id {
        return Err(LeaveError::Forbidden);
    }
    if !matches!(
        request.status,
        RequestStatus::Pending | RequestStatus::Approved
    ) {
        return Err(LeaveError::NotCancellable);
    }
    if request.start_date < today {
        return Err(LeaveError::PastLeaveCancellation);
    }

    let year = request.start_date.year();
    match request.status {
        RequestStatus::Pending => {
            ledger::release(
                &mut *tx,
                request.user_id,
                request.leave_type_id,
                year,
                request.total_days,
            )
            .await?;
        }
        RequestStatus::Approved => {
            ledger::revert_usage(
                &mut *tx,
                request.user_id,
                request.leave_type_id,
                year,
                request.total_days,
            )
            .await?;
        }
        _ => unreachable!(),
    }

    sqlx::query("UPDATE leave_requests SET status = 'cancelled', updated_at = ? WHERE id = ?")
        .bind(Utc::now().naive_utc())
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

    let cancelled = fetch_request(&mut *tx, request_id).await?;
    tx.commit().await?;

    info!(request_id, caller_id, "leave request cancelled");
    Ok(cancelled)
}

/// Create the missing (user, type, year) balance rows from each active leave
/// type's annual quota. Idempotent; returns how many rows were created.
pub async fn initialize_balances(pool: &SqlitePool, year: i32) -> Result<u64, LeaveError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO leave_balances (user_id, leave_type_id, year, total_days, used_days, reserved_days)
        SELECT u.id, t.id, ?, t.annual_quota, 0, 0
        FROM users u
        CROSS JOIN leave_types t
        WHERE u.is_active = 1
          AND t.is_active = 1
          AND NOT EXISTS (
              SELECT 1 FROM leave_balances b
              WHERE b.user_id = u.id AND b.leave_type_id = t.id AND b.year = ?
          )
        "#,
    )
    .bind(year)
    .bind(year)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let created = result.rows_affected();
    info!(year, created, "leave balances initialized");
    Ok(created)
}
