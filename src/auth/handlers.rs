use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{
        auth::AuthUser,
        jwt::generate_access_token,
        password::{hash_password, verify_password},
    },
    config::Config,
    models::{LoginReq, RegisterReq},
    model::user::User,
};

/// Register a new user (HR admin only).
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "User registered"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn register(
    auth: AuthUser,
    payload: web::Json<RegisterReq>,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_admin()?;

    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Email and password must not be empty"
        })));
    }

    let hashed = hash_password(&payload.password);

    let result = sqlx::query(
        r#"
        INSERT INTO users (email, full_name, password_hash, role, manager_id, department, hire_date, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, 1)
        "#,
    )
    .bind(&email)
    .bind(&payload.full_name)
    .bind(&hashed)
    .bind(payload.role)
    .bind(payload.manager_id)
    .bind(&payload.department)
    .bind(Utc::now().date_naive())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(r) => {
            info!(user_id = r.last_insert_rowid(), "user registered");
            Ok(HttpResponse::Created().json(json!({
                "message": "User registered successfully",
                "id": r.last_insert_rowid()
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "error": "Email already registered"
                    })));
                }
            }
            error!(error = %e, "failed to register user");
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            })))
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    token_type: String,
}

/// Login with email/password and receive a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Login successful"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_login", skip(pool, config, payload), fields(email = %payload.email))]
pub async fn login(
    payload: web::Json<LoginReq>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if payload.email.trim().is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty email or password");
        return HttpResponse::BadRequest().body("Email or password required");
    }

    debug!("Fetching user from database");

    let db_user = match sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, full_name, password_hash, role, manager_id, department, hire_date, is_active
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(payload.email.trim().to_lowercase())
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if !db_user.is_active {
        info!("Login rejected: inactive account");
        return HttpResponse::Unauthorized().body("Account is inactive");
    }

    if let Err(e) = verify_password(&payload.password, &db_user.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    let access_token = generate_access_token(
        db_user.id,
        db_user.email.clone(),
        db_user.role,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
    })
}

/// Current user's profile.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(auth: AuthUser, pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, full_name, password_hash, role, manager_id, department, hire_date, is_active
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch current user");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match user {
        Some(u) => Ok(HttpResponse::Ok().json(u)),
        None => Ok(HttpResponse::Unauthorized().json(json!({"error": "User not found"}))),
    }
}
