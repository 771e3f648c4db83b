//! Approval workflow engine: builds the ordered approver chain for a request
//! and advances it level-by-level as decisions arrive. All role semantics
//! live here, nowhere else.

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::core::error::LeaveError;
use crate::core::{directory, ledger};
use crate::model::role::Role;
use crate::model::status::{ApprovalStatus, RequestStatus};
use crate::model::workflow::ApprovalStep;

async fn insert_step(
    conn: &mut SqliteConnection,
    request_id: i64,
    approver_id: i64,
    level: i64,
) -> Result<(), LeaveError> {
    sqlx::query(
        r#"
        INSERT INTO approval_steps (leave_request_id, approver_id, level, status)
        VALUES (?, ?, ?, 'pending')
        "#,
    )
    .bind(request_id)
    .bind(approver_id)
    .bind(level)
    .execute(conn)
    .await?;

    Ok(())
}

/// Build the full approval chain for a freshly created request.
///
/// Manager requesters go straight to an HR admin at level 1. Employees get
/// their manager, then the manager's manager, then an HR admin when the
/// request exceeds five chargeable days. Every level is independently
/// optional; a chain with zero steps is legal and leaves the request pending
/// indefinitely, which is the documented stalled state.
pub async fn build_chain(
    conn: &mut SqliteConnection,
    request_id: i64,
    requester_id: i64,
    total_days: f64,
) -> Result<(), LeaveError> {
    let requester = directory::get_user(conn, requester_id)
        .await?
        .ok_or(LeaveError::UserNotFound)?;

    let mut level = 1i64;

    if requester.role == Role::Manager {
        if let Some(hr) = directory::find_active_hr_admin(conn).await? {
            insert_step(conn, request_id, hr.id, level).await?;
        }
        return Ok(());
    }

    if let Some(manager_id) = requester.manager_id {
        insert_step(conn, request_id, manager_id, level).await?;
        level += 1;

        if let Some(manager) = directory::get_user(conn, manager_id).await? {
            if let Some(grand_manager_id) = manager.manager_id {
                insert_step(conn, request_id, grand_manager_id, level).await?;
                level += 1;
            }
        }
    }

    if total_days > 5.0 {
        if let Some(hr) = directory::find_active_hr_admin(conn).await? {
            insert_step(conn, request_id, hr.id, level).await?;
        }
    }

    Ok(())
}

/// All steps of a request, lowest level first.
pub async fn steps_for_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<Vec<ApprovalStep>, LeaveError> {
    let steps = sqlx::query_as::<_, ApprovalStep>(
        r#"
        SELECT id, leave_request_id, approver_id, level, status, comments, decided_at
        FROM approval_steps
        WHERE leave_request_id = ?
        ORDER BY level
        "#,
    )
    .bind(request_id)
    .fetch_all(conn)
    .await?;

    Ok(steps)
}

/// Record an approval or rejection and advance the request.
///
/// The approver's active delegation is resolved for today but only for
/// authorization: the step acted on remains the one keyed by the original
/// approver id, so a delegate decides on the delegator's behalf without the
/// step being re-keyed.
pub async fn decide(
    conn: &mut SqliteConnection,
    request_id: i64,
    approver_id: i64,
    approve: bool,
    comments: Option<&str>,
    today: NaiveDate,
) -> Result<RequestStatus, LeaveError> {
    let request = sqlx::query_as::<_, crate::model::leave_request::LeaveRequest>(
        r#"
        SELECT id, user_id, leave_type_id, start_date, end_date, total_days,
               reason, status, created_at, updated_at
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(request_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(LeaveError::RequestNotFound)?;

    if request.status != RequestStatus::Pending {
        return Err(LeaveError::InvalidStateTransition);
    }

    if let Some(delegate_id) = directory::active_delegate(conn, approver_id, today).await? {
        debug!(approver_id, delegate_id, "active delegation resolved for approver");
    }

    let steps = steps_for_request(conn, request_id).await?;

    let step = steps
        .iter()
        .find(|s| s.approver_id == approver_id && s.status == ApprovalStatus::Pending)
        .ok_or(LeaveError::NoPendingApproval)?;

    // Levels clear strictly in ascending order; a non-approved lower level
    // blocks this one.
    let blocked = steps
        .iter()
        .any(|s| s.level < step.level && s.status != ApprovalStatus::Approved);
    if blocked {
        return Err(LeaveError::OutOfOrderApproval);
    }

    let new_status = if approve {
        ApprovalStatus::Approved
    } else {
        ApprovalStatus::Rejected
    };

    sqlx::query("UPDATE approval_steps SET status = ?, comments = ?, decided_at = ? WHERE id = ?")
        .bind(new_status)
        .bind(comments)
        .bind(Utc::now().naive_utc())
        .bind(step.id)
        .execute(&mut *conn)
        .await?;

    let year = request.start_date.year();

    if !approve {
        // Rejection terminates the request immediately; later levels stay
        // pending but are inert.
        set_request_status(conn, request_id, RequestStatus::Rejected).await?;
        ledger::release(conn, request.user_id, request.leave_type_id, year, request.total_days)
            .await?;
        info!(request_id, approver_id, level = step.level, "leave request rejected");
        return Ok(RequestStatus::Rejected);
    }

    let has_higher_level = steps.iter().any(|s| s.level > step.level);
    if has_higher_level {
        debug!(request_id, level = step.level, "level approved, awaiting next level");
        return Ok(RequestStatus::Pending);
    }

    // Final level: the chain was built upfront, so approval here is terminal.
    set_request_status(conn, request_id, RequestStatus::Approved).await?;
    ledger::commit(conn, request.user_id, request.leave_type_id, year, request.total_days).await?;
    info!(request_id, approver_id, level = step.level, "leave request approved");

    Ok(RequestStatus::Approved)
}

async fn set_request_status(
    conn: &mut SqliteConnection,
    request_id: i64,
    status: RequestStatus,
) -> Result<(), LeaveError> {
    sqlx::query("UPDATE leave_requests SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(Utc::now().naive_utc())
        .bind(request_id)
        .execute(conn)
        .await?;

    Ok(())
}

/// Transaction wrapper for a single decision. Concurrent decisions on the
/// same request serialize on the write transaction, so the ascending-level
/// gate cannot double-advance.
pub async fn process_decision(
    pool: &SqlitePool,
    request_id: i64,
    approver_id: i64,
    approve: bool,
    comments: Option<&str>,
) -> Result<RequestStatus, LeaveError> {
    let mut tx = pool.begin().await?;
    let today = Utc::now().date_naive();
    let status = decide(&mut *tx, request_id, approver_id, approve, comments, today).await?;
    tx.commit().await?;
    Ok(status)
}
