//! End-to-end exercises of the leave request lifecycle against an in-memory
//! database: chain construction, ordered approvals, ledger movements and
//! cancellation rules.

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use leavehub::core::error::LeaveError;
use leavehub::core::{directory, ledger, lifecycle, workflow};
use leavehub::db::ensure_schema;
use leavehub::model::role::Role;
use leavehub::model::status::{ApprovalStatus, RequestStatus};

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    ensure_schema(&pool).await.unwrap();
    pool
}

async fn insert_user(pool: &SqlitePool, email: &str, role: Role, manager_id: Option<i64>) -> i64 {
    sqlx::query(
        r#"
        INSERT INTO users (email, full_name, password_hash, role, manager_id, department, hire_date, is_active)
        VALUES (?, ?, 'x', ?, ?, 'Engineering', ?, 1)
        "#,
    )
    .bind(email)
    .bind(email)
    .bind(role)
    .bind(manager_id)
    .bind(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

async fn insert_leave_type(pool: &SqlitePool, name: &str, quota: f64) -> i64 {
    sqlx::query("INSERT INTO leave_types (name, annual_quota) VALUES (?, ?)")
        .bind(name)
        .bind(quota)
        .execute(pool)
        .await
        .unwrap()
        .last_insert_rowid()
}

async fn insert_balance(pool: &SqlitePool, user_id: i64, leave_type_id: i64, year: i32, total: f64) {
    sqlx::query(
        r#"
        INSERT INTO leave_balances (user_id, leave_type_id, year, total_days, used_days, reserved_days)
        VALUES (?, ?, ?, ?, 0, 0)
        "#,
    )
    .bind(user_id)
    .bind(leave_type_id)
    .bind(year)
    .bind(total)
    .execute(pool)
    .await
    .unwrap();
}

async fn balance_row(pool: &SqlitePool, user_id: i64, leave_type_id: i64, year: i32) -> (f64, f64, f64) {
    let mut conn = pool.acquire().await.unwrap();
    let b = ledger::fetch(&mut conn, user_id, leave_type_id, year)
        .await
        .unwrap();
    (b.total_days, b.used_days, b.reserved_days)
}

/// First Monday at least a week out, so request dates are always in the future.
fn next_monday() -> NaiveDate {
    let mut d = Utc::now().date_naive() + Duration::days(7);
    while d.weekday() != Weekday::Mon {
        d += Duration::days(1);
    }
    d
}

/// Standard fixture: employee -> manager -> director chain, one HR admin,
/// annual leave with a 20-day quota for everyone.
struct Org {
    pool: SqlitePool,
    hr: i64,
    director: i64,
    manager: i64,
    employee: i64,
    annual: i64,
    year: i32,
    monday: NaiveDate,
}

async fn org_fixture() -> Org {
    let pool = test_pool().await;
    let monday = next_monday();
    let year = monday.year();

    let hr = insert_user(&pool, "hr@test", Role::HrAdmin, None).await;
    let director = insert_user(&pool, "director@test", Role::Manager, None).await;
    let manager = insert_user(&pool, "manager@test", Role::Manager, Some(director)).await;
    let employee = insert_user(&pool, "employee@test", Role::Employee, Some(manager)).await;
    let annual = insert_leave_type(&pool, "Annual Leave", 20.0).await;

    for user in [hr, director, manager, employee] {
        insert_balance(&pool, user, annual, year, 20.0).await;
    }

    Org {
        pool,
        hr,
        director,
        manager,
        employee,
        annual,
        year,
        monday,
    }
}

#[actix_web::test]
async fn long_employee_request_builds_three_levels_with_hr() {
    let org = org_fixture().await;

    // Monday through next Monday inclusive is 6 working days, over the
    // 5-day threshold that pulls HR into the chain.
    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(7),
        None,
    )
    .await
    .unwrap();

    assert_eq!(request.total_days, 6.0);
    assert_eq!(request.status, RequestStatus::Pending);

    let mut conn = org.pool.acquire().await.unwrap();
    let steps = workflow::steps_for_request(&mut conn, request.id).await.unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(
        steps.iter().map(|s| (s.level, s.approver_id)).collect::<Vec<_>>(),
        vec![(1, org.manager), (2, org.director), (3, org.hr)]
    );
    assert!(steps.iter().all(|s| s.status == ApprovalStatus::Pending));
}

#[actix_web::test]
async fn short_employee_request_skips_hr_level() {
    let org = org_fixture().await;

    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(2),
        None,
    )
    .await
    .unwrap();

    assert_eq!(request.total_days, 3.0);

    let mut conn = org.pool.acquire().await.unwrap();
    let steps = workflow::steps_for_request(&mut conn, request.id).await.unwrap();
    assert_eq!(
        steps.iter().map(|s| s.approver_id).collect::<Vec<_>>(),
        vec![org.manager, org.director]
    );
}

#[actix_web::test]
async fn manager_request_goes_straight_to_hr() {
    let org = org_fixture().await;

    let request = lifecycle::create(
        &org.pool,
        org.manager,
        org.annual,
        org.monday,
        org.monday + Duration::days(4),
        None,
    )
    .await
    .unwrap();

    let mut conn = org.pool.acquire().await.unwrap();
    let steps = workflow::steps_for_request(&mut conn, request.id).await.unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].approver_id, org.hr);
    assert_eq!(steps[0].level, 1);
}

#[actix_web::test]
async fn chain_without_any_approver_stays_pending() {
    // No HR admin and no manager: the chain has zero steps and the request
    // sits pending indefinitely.
    let pool = test_pool().await;
    let monday = next_monday();
    let loner = insert_user(&pool, "loner@test", Role::Employee, None).await;
    let annual = insert_leave_type(&pool, "Annual Leave", 20.0).await;
    insert_balance(&pool, loner, annual, monday.year(), 20.0).await;

    let request = lifecycle::create(&pool, loner, annual, monday, monday + Duration::days(1), None)
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Pending);
    let mut conn = pool.acquire().await.unwrap();
    let steps = workflow::steps_for_request(&mut conn, request.id).await.unwrap();
    assert!(steps.is_empty());
}

#[actix_web::test]
async fn approvals_must_clear_levels_in_order() {
    let org = org_fixture().await;

    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(7),
        None,
    )
    .await
    .unwrap();

    let err = workflow::process_decision(&org.pool, request.id, org.director, true, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::OutOfOrderApproval));

    // Level 1 clears, then level 2 is allowed.
    let status = workflow::process_decision(&org.pool, request.id, org.manager, true, None)
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Pending);

    let status = workflow::process_decision(&org.pool, request.id, org.director, true, None)
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Pending);
}

#[actix_web::test]
async fn final_approval_moves_reservation_to_usage() {
    let org = org_fixture().await;

    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(7),
        None,
    )
    .await
    .unwrap();

    let (_, used, reserved) = balance_row(&org.pool, org.employee, org.annual, org.year).await;
    assert_eq!((used, reserved), (0.0, 6.0));

    workflow::process_decision(&org.pool, request.id, org.manager, true, None).await.unwrap();
    workflow::process_decision(&org.pool, request.id, org.director, true, None).await.unwrap();
    let status = workflow::process_decision(&org.pool, request.id, org.hr, true, Some("ok"))
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Approved);

    let (total, used, reserved) = balance_row(&org.pool, org.employee, org.annual, org.year).await;
    assert_eq!((used, reserved), (6.0, 0.0));
    assert_eq!(total - used - reserved, 14.0);

    let mut conn = org.pool.acquire().await.unwrap();
    let updated = lifecycle::fetch_request(&mut conn, request.id).await.unwrap();
    assert_eq!(updated.status, RequestStatus::Approved);
}

#[actix_web::test]
async fn rejection_terminates_and_releases_reservation() {
    let org = org_fixture().await;

    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(7),
        None,
    )
    .await
    .unwrap();

    let status = workflow::process_decision(&org.pool, request.id, org.manager, false, Some("no"))
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Rejected);

    let (_, used, reserved) = balance_row(&org.pool, org.employee, org.annual, org.year).await;
    assert_eq!((used, reserved), (0.0, 0.0));

    // The request is terminal; nobody can decide on it any more.
    let err = workflow::process_decision(&org.pool, request.id, org.director, true, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::InvalidStateTransition));
}

#[actix_web::test]
async fn approver_cannot_decide_twice() {
    let org = org_fixture().await;

    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(7),
        None,
    )
    .await
    .unwrap();

    workflow::process_decision(&org.pool, request.id, org.manager, true, None).await.unwrap();
    let err = workflow::process_decision(&org.pool, request.id, org.manager, true, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::NoPendingApproval));
}

#[actix_web::test]
async fn outsider_has_no_pending_approval() {
    let org = org_fixture().await;
    let outsider = insert_user(&org.pool, "outsider@test", Role::Manager, None).await;

    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(2),
        None,
    )
    .await
    .unwrap();

    let err = workflow::process_decision(&org.pool, request.id, outsider, true, None)
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::NoPendingApproval));
}

#[actix_web::test]
async fn overlapping_request_is_rejected() {
    let org = org_fixture().await;

    lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(4),
        None,
    )
    .await
    .unwrap();

    // Starts inside the pending window.
    let err = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday + Duration::days(2),
        org.monday + Duration::days(9),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LeaveError::OverlappingRequest));

    // A different user is free to book the same window.
    lifecycle::create(
        &org.pool,
        org.manager,
        org.annual,
        org.monday,
        org.monday + Duration::days(4),
        None,
    )
    .await
    .unwrap();
}

#[actix_web::test]
async fn weekend_only_request_has_zero_working_days() {
    let org = org_fixture().await;
    let saturday = org.monday + Duration::days(5);

    let err = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        saturday,
        saturday + Duration::days(1),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LeaveError::ZeroWorkingDays));
}

#[actix_web::test]
async fn holiday_inside_range_reduces_total_days() {
    let org = org_fixture().await;

    sqlx::query("INSERT INTO holidays (name, date, created_by) VALUES ('Founders Day', ?, ?)")
        .bind(org.monday + Duration::days(2))
        .bind(org.hr)
        .execute(&org.pool)
        .await
        .unwrap();

    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(4),
        None,
    )
    .await
    .unwrap();
    assert_eq!(request.total_days, 4.0);
}

#[actix_web::test]
async fn insufficient_balance_blocks_creation() {
    let org = org_fixture().await;

    sqlx::query("UPDATE leave_balances SET used_days = 18 WHERE user_id = ?")
        .bind(org.employee)
        .execute(&org.pool)
        .await
        .unwrap();

    let err = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(4),
        None,
    )
    .await
    .unwrap_err();
    match err {
        LeaveError::InsufficientBalance { available, requested } => {
            assert_eq!(available, 2.0);
            assert_eq!(requested, 5.0);
        }
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }

    // The failed attempt must not leave a request or reservation behind.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leave_requests")
        .fetch_one(&org.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
    let (_, _, reserved) = balance_row(&org.pool, org.employee, org.annual, org.year).await;
    assert_eq!(reserved, 0.0);
}

#[actix_web::test]
async fn missing_balance_row_blocks_creation() {
    let pool = test_pool().await;
    let monday = next_monday();
    let hr = insert_user(&pool, "hr@test", Role::HrAdmin, None).await;
    let employee = insert_user(&pool, "employee@test", Role::Employee, Some(hr)).await;
    let annual = insert_leave_type(&pool, "Annual Leave", 20.0).await;

    let err = lifecycle::create(&pool, employee, annual, monday, monday + Duration::days(1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::BalanceNotFound));
}

#[actix_web::test]
async fn past_start_date_is_rejected() {
    let org = org_fixture().await;
    let yesterday = Utc::now().date_naive() - Duration::days(1);

    let err = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        yesterday,
        yesterday + Duration::days(10),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LeaveError::PastDateNotAllowed));
}

#[actix_web::test]
async fn update_rereserves_and_failed_update_keeps_old_reservation() {
    let org = org_fixture().await;

    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(2),
        None,
    )
    .await
    .unwrap();
    assert_eq!(request.total_days, 3.0);

    // Stretch to a full week: reservation follows.
    let updated = lifecycle::update(
        &org.pool,
        request.id,
        org.employee,
        None,
        Some(org.monday + Duration::days(4)),
        Some("longer trip".into()),
    )
    .await
    .unwrap();
    assert_eq!(updated.total_days, 5.0);
    assert_eq!(updated.reason.as_deref(), Some("longer trip"));

    let (_, _, reserved) = balance_row(&org.pool, org.employee, org.annual, org.year).await;
    assert_eq!(reserved, 5.0);

    // Shrink availability so a three-week stretch cannot be reserved, then
    // verify the failed update rolled back to the 5-day hold.
    sqlx::query("UPDATE leave_balances SET used_days = 12 WHERE user_id = ?")
        .bind(org.employee)
        .execute(&org.pool)
        .await
        .unwrap();

    let err = lifecycle::update(
        &org.pool,
        request.id,
        org.employee,
        None,
        Some(org.monday + Duration::days(18)),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, LeaveError::InsufficientBalance { .. }));

    let (_, _, reserved) = balance_row(&org.pool, org.employee, org.annual, org.year).await;
    assert_eq!(reserved, 5.0);
    let mut conn = org.pool.acquire().await.unwrap();
    let unchanged = lifecycle::fetch_request(&mut conn, request.id).await.unwrap();
    assert_eq!(unchanged.total_days, 5.0);
}

#[actix_web::test]
async fn only_owner_updates_and_only_pending_is_editable() {
    let org = org_fixture().await;

    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(2),
        None,
    )
    .await
    .unwrap();

    let err = lifecycle::update(&org.pool, request.id, org.manager, None, None, Some("mine".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::Forbidden));

    workflow::process_decision(&org.pool, request.id, org.manager, false, None).await.unwrap();

    let err = lifecycle::update(&org.pool, request.id, org.employee, None, None, Some("retry".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::NotPending));
}

#[actix_web::test]
async fn cancelling_pending_request_releases_days() {
    let org = org_fixture().await;

    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(4),
        None,
    )
    .await
    .unwrap();

    let cancelled = lifecycle::cancel(&org.pool, request.id, org.employee).await.unwrap();
    assert_eq!(cancelled.status, RequestStatus::Cancelled);

    let (_, used, reserved) = balance_row(&org.pool, org.employee, org.annual, org.year).await;
    assert_eq!((used, reserved), (0.0, 0.0));
}

#[actix_web::test]
async fn cancelling_approved_request_reverts_usage() {
    let org = org_fixture().await;

    let request = lifecycle::create(
        &org.pool,
        org.manager,
        org.annual,
        org.monday,
        org.monday + Duration::days(4),
        None,
    )
    .await
    .unwrap();
    workflow::process_decision(&org.pool, request.id, org.hr, true, None).await.unwrap();

    let (_, used, _) = balance_row(&org.pool, org.manager, org.annual, org.year).await;
    assert_eq!(used, 5.0);

    let cancelled = lifecycle::cancel(&org.pool, request.id, org.manager).await.unwrap();
    assert_eq!(cancelled.status, RequestStatus::Cancelled);

    let (_, used, reserved) = balance_row(&org.pool, org.manager, org.annual, org.year).await;
    assert_eq!((used, reserved), (0.0, 0.0));
}

#[actix_web::test]
async fn started_leave_cannot_be_cancelled() {
    let org = org_fixture().await;
    let last_week = Utc::now().date_naive() - Duration::days(7);
    let now = Utc::now().naive_utc();

    // Seeded directly: the lifecycle refuses to create past-dated requests.
    let id = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (user_id, leave_type_id, start_date, end_date, total_days, reason, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, 5.0, NULL, 'approved', ?, ?)
        "#,
    )
    .bind(org.employee)
    .bind(org.annual)
    .bind(last_week)
    .bind(last_week + Duration::days(4))
    .bind(now)
    .bind(now)
    .execute(&org.pool)
    .await
    .unwrap()
    .last_insert_rowid();

    let err = lifecycle::cancel(&org.pool, id, org.employee).await.unwrap_err();
    assert!(matches!(err, LeaveError::PastLeaveCancellation));
}

#[actix_web::test]
async fn rejected_request_is_not_cancellable() {
    let org = org_fixture().await;

    let request = lifecycle::create(
        &org.pool,
        org.employee,
        org.annual,
        org.monday,
        org.monday + Duration::days(2),
        None,
    )
    .await
    .unwrap();
    workflow::process_decision(&org.pool, request.id, org.manager, false, None).await.unwrap();

    let err = lifecycle::cancel(&org.pool, request.id, org.employee).await.unwrap_err();
    assert!(matches!(err, LeaveError::NotCancellable));
}

#[actix_web::test]
async fn active_delegate_respects_date_window() {
    let org = org_fixture().await;
    let start = org.monday;
    let end = org.monday + Duration::days(4);

    sqlx::query(
        "INSERT INTO delegations (delegator_id, delegate_id, start_date, end_date, is_active) VALUES (?, ?, ?, ?, 1)",
    )
    .bind(org.manager)
    .bind(org.director)
    .bind(start)
    .bind(end)
    .execute(&org.pool)
    .await
    .unwrap();

    let mut conn = org.pool.acquire().await.unwrap();

    let inside = directory::active_delegate(&mut conn, org.manager, start + Duration::days(2))
        .await
        .unwrap();
    assert_eq!(inside, Some(org.director));

    let before = directory::active_delegate(&mut conn, org.manager, start - Duration::days(1))
        .await
        .unwrap();
    assert_eq!(before, None);

    let after = directory::active_delegate(&mut conn, org.manager, end + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(after, None);
}

#[actix_web::test]
async fn initialize_balances_is_idempotent() {
    let pool = test_pool().await;
    insert_user(&pool, "a@test", Role::Employee, None).await;
    insert_user(&pool, "b@test", Role::Employee, None).await;
    insert_leave_type(&pool, "Annual Leave", 20.0).await;
    insert_leave_type(&pool, "Sick Leave", 10.0).await;

    let created = lifecycle::initialize_balances(&pool, 2026).await.unwrap();
    assert_eq!(created, 4);

    let created_again = lifecycle::initialize_balances(&pool, 2026).await.unwrap();
    assert_eq!(created_again, 0);

    // A late joiner gets only the missing rows on the next run.
    insert_user(&pool, "c@test", Role::Employee, None).await;
    let created_for_joiner = lifecycle::initialize_balances(&pool, 2026).await.unwrap();
    assert_eq!(created_for_joiner, 2);
}
