use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    activity,
    dto::auth::{
        LoginRequest, LoginResponse, MIN_PASSWORD_LEN, RegisterRequest, local_part,
        normalize_email,
    },
    dto::{admin::UserList, contact::is_valid_email},
    error::{AppError, AppResult, conflict_on_unique},
    middleware::auth::{AuthUser, ROLE_ADMIN, ROLE_USER, ensure_admin, issue_token},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

const EMAIL_TAKEN: &str = "Email is already taken";

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    let email = normalize_email(&payload.email);
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest("Invalid email".into()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::Conflict(EMAIL_TAKEN.to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let role = if email == state.config.admin_email {
        ROLE_ADMIN
    } else {
        ROLE_USER
    };
    let name = payload
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    // Concurrent sign-ups for one email are settled by the unique index.
    let mut tx = state.pool.begin().await?;

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, name, role)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, email, name, role, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email.as_str())
    .bind(password_hash)
    .bind(name.as_deref())
    .bind(role)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| conflict_on_unique(e, EMAIL_TAKEN))?;

    let display_name = name.unwrap_or_else(|| local_part(&email).to_string());
    sqlx::query(
        r#"
        INSERT INTO customers (email, name, joined_at)
        VALUES ($1, $2, now())
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(email.as_str())
    .bind(display_name)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    activity::record(
        &state.pool,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id, "email": user.email }),
    )
    .await;

    Ok(ApiResponse::success("User created", user, None))
}

#[derive(sqlx::FromRow)]
struct Credentials {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let email = normalize_email(&payload.email);
    let user: Option<Credentials> =
        sqlx::query_as("SELECT id, email, password_hash, role FROM users WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(&state.pool)
            .await?;

    let invalid = || AppError::Unauthorized("Invalid email or password".into());
    let user = user.ok_or_else(invalid)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    if Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(invalid());
    }

    let token = issue_token(
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
        user.id,
        &user.email,
        &user.role,
    )?;

    activity::record(
        &state.pool,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            token: format!("Bearer {token}"),
            role: user.role,
            email: user.email,
        },
        Some(Meta::empty()),
    ))
}

pub async fn current_user(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let found: Option<User> =
        sqlx::query_as("SELECT id, email, name, role, created_at FROM users WHERE id = $1")
            .bind(user.user_id)
            .fetch_optional(&state.pool)
            .await?;
    let found = found.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("OK", found, None))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();
    let items: Vec<User> = sqlx::query_as(
        r#"
        SELECT id, email, name, role, created_at
        FROM users
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;
    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::page(
        "Users",
        UserList { items },
        page,
        limit,
        total.0,
    ))
}
