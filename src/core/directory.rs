//! Read-only lookups against the user directory and delegation table. The
//! workflow engine treats an absent approver as "no approver at this level",
//! never as an error.

use chrono::NaiveDate;
use sqlx::SqliteConnection;

use crate::core::error::LeaveError;
use crate::model::user::User;

const USER_COLUMNS: &str =
    "id, email, full_name, password_hash, role, manager_id, department, hire_date, is_active";

pub async fn get_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<User>, LeaveError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

/// Any active HR admin; arbitrarily the lowest id if several exist.
pub async fn find_active_hr_admin(
    conn: &mut SqliteConnection,
) -> Result<Option<User>, LeaveError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = 'hr_admin' AND is_active = 1 ORDER BY id LIMIT 1"
    ))
    .fetch_optional(conn)
    .await?;

    Ok(user)
}

pub async fn find_by_manager(
    conn: &mut SqliteConnection,
    manager_id: i64,
) -> Result<Vec<User>, LeaveError> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE manager_id = ? AND is_active = 1"
    ))
    .bind(manager_id)
    .fetch_all(conn)
    .await?;

    Ok(users)
}

/// The delegate currently standing in for `delegator_id` on `on_date`, if any.
pub async fn active_delegate(
    conn: &mut SqliteConnection,
    delegator_id: i64,
    on_date: NaiveDate,
) -> Result<Option<i64>, LeaveError> {
    let delegate = sqlx::query_scalar(
        r#"
        SELECT delegate_id
        FROM delegations
        WHERE delegator_id = ?
          AND is_active = 1
          AND start_date <= ?
          AND end_date >= ?
        LIMIT 1
        "#,
    )
    .bind(delegator_id)
    .bind(on_date)
    .bind(on_date)
    .fetch_optional(conn)
    .await?;

    Ok(delegate)
}
