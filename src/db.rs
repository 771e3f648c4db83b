use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub async fn init_db(database_url: &str) -> SqlitePool {
    let options = SqliteConnectOptions::from_str(database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Failed to connect to database")
}

/// Create any missing tables. Each statement is idempotent, so this runs on
/// every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    const STATEMENTS: &[&str] = &[
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            full_name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'employee',
            manager_id INTEGER REFERENCES users(id),
            department TEXT,
            hire_date TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS leave_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            annual_quota REAL NOT NULL,
            requires_documentation INTEGER NOT NULL DEFAULT 0,
            is_paid INTEGER NOT NULL DEFAULT 1,
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS leave_balances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            leave_type_id INTEGER NOT NULL REFERENCES leave_types(id),
            year INTEGER NOT NULL,
            total_days REAL NOT NULL,
            used_days REAL NOT NULL DEFAULT 0,
            reserved_days REAL NOT NULL DEFAULT 0,
            UNIQUE (user_id, leave_type_id, year)
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS leave_requests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id),
            leave_type_id INTEGER NOT NULL REFERENCES leave_types(id),
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            total_days REAL NOT NULL,
            reason TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS approval_steps (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            leave_request_id INTEGER NOT NULL REFERENCES leave_requests(id),
            approver_id INTEGER NOT NULL REFERENCES users(id),
            level INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            comments TEXT,
            decided_at TEXT
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS delegations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            delegator_id INTEGER NOT NULL REFERENCES users(id),
            delegate_id INTEGER NOT NULL REFERENCES users(id),
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS holidays (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            date TEXT NOT NULL,
            is_mandatory INTEGER NOT NULL DEFAULT 1,
            created_by INTEGER NOT NULL REFERENCES users(id)
        )
        "#,
    ];

    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
