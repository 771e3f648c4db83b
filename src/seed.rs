//! First-run seed data: one HR admin, one manager, one employee reporting to
//! the manager, the default leave types, current-year balances and a handful
//! of holidays. Runs only while the users table is empty.

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::password::hash_password;
use crate::core::lifecycle;
use crate::model::role::Role;

async fn insert_user(
    pool: &SqlitePool,
    email: &str,
    full_name: &str,
    password: &str,
    role: Role,
    manager_id: Option<i64>,
    department: &str,
    hire_date: NaiveDate,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (email, full_name, password_hash, role, manager_id, department, hire_date, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, 1)
        "#,
    )
    .bind(email)
    .bind(full_name)
    .bind(hash_password(password))
    .bind(role)
    .bind(manager_id)
    .bind(department)
    .bind(hire_date)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn seed_data(pool: &SqlitePool) -> Result<()> {
    let user_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if user_count > 0 {
        return Ok(());
    }

    info!("empty database, seeding initial data");

    let admin_id = insert_user(
        pool,
        "admin@company.com",
        "HR Administrator",
        "admin123",
        Role::HrAdmin,
        None,
        "Human Resources",
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
    )
    .await?;

    let manager_id = insert_user(
        pool,
        "manager@company.com",
        "John Manager",
        "manager123",
        Role::Manager,
        None,
        "Engineering",
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
    )
    .await?;

    insert_user(
        pool,
        "employee@company.com",
        "Jane Employee",
        "employee123",
        Role::Employee,
        Some(manager_id),
        "Engineering",
        NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
    )
    .await?;

    let leave_types: &[(&str, f64, bool, bool)] = &[
        ("Annual Leave", 20.0, false, true),
        ("Sick Leave", 10.0, true, true),
        ("Personal Leave", 5.0, false, true),
        ("Bereavement Leave", 3.0, true, true),
        ("Unpaid Leave", 30.0, false, false),
    ];

    for (name, quota, requires_documentation, is_paid) in leave_types {
        sqlx::query(
            r#"
            INSERT INTO leave_types (name, annual_quota, requires_documentation, is_paid, is_active)
            VALUES (?, ?, ?, ?, 1)
            "#,
        )
        .bind(name)
        .bind(quota)
        .bind(requires_documentation)
        .bind(is_paid)
        .execute(pool)
        .await?;
    }

    let current_year = Utc::now().date_naive().year();
    lifecycle::initialize_balances(pool, current_year).await?;

    let holidays: &[(&str, u32, u32)] = &[
        ("New Year's Day", 1, 1),
        ("Independence Day", 7, 4),
        ("Thanksgiving", 11, 26),
        ("Christmas", 12, 25),
    ];

    for (name, month, day) in holidays {
        if let Some(date) = NaiveDate::from_ymd_opt(current_year, *month, *day) {
            sqlx::query(
                "INSERT INTO holidays (name, date, is_mandatory, created_by) VALUES (?, ?, 1, ?)",
            )
            .bind(name)
            .bind(date)
            .bind(admin_id)
            .execute(pool)
            .await?;
        }
    }

    info!("database seeded");
    Ok(())
}
