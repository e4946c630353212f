//! # 인증 라우트 핸들러
//!
//! 회원가입, 로그인(이메일 + 비밀번호), 토큰 갱신, 로그아웃, 내 정보.
//! 비밀번호는 Argon2id로 해시하고, 리프레시 토큰은 SHA-256 해시만 저장합니다.

use crate::{
    db::users as db_users,
    error::AppError,
    middleware::auth::{
        create_access_token, create_refresh_token, hash_token, refresh_token_ttl,
        verify_refresh_token, AuthUser,
    },
    models::user::*,
    routes::recipes::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};

const MAX_USERNAME_LEN: usize = 150;
const MAX_NAME_LEN: usize = 150;
const MIN_PASSWORD_LEN: usize = 8;

/// `/users/me`와 겹치므로 사용할 수 없는 사용자명
const RESERVED_USERNAMES: &[&str] = &["me"];

/// 회원가입 요청을 검증합니다.
///
/// 사용자명은 글자, 숫자, `.@+-_`만 허용합니다.
fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::MissingField("username".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(AppError::OutOfRange {
            field: "username".to_string(),
            min: 1,
            max: MAX_USERNAME_LEN as i64,
        });
    }
    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        return Err(AppError::BadRequest(format!("Username '{}' is reserved", username)));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || ".@+-_".contains(c))
    {
        return Err(AppError::BadRequest(
            "Username may contain only letters, digits and .@+-_".to_string(),
        ));
    }

    for (value, field) in [(&req.first_name, "first_name"), (&req.last_name, "last_name")] {
        if value.trim().is_empty() {
            return Err(AppError::MissingField(field.to_string()));
        }
        if value.chars().count() > MAX_NAME_LEN {
            return Err(AppError::OutOfRange {
                field: field.to_string(),
                min: 1,
                max: MAX_NAME_LEN as i64,
            });
        }
    }

    check_password_len(&req.password)?;
    if !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    Ok(())
}

fn check_password_len(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Argon2id
fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string())
}

fn password_matches(user: &User, password: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// 현재 비밀번호를 확인한 뒤 새 해시를 저장하고, 기존 리프레시 토큰을 모두 폐기합니다.
///
/// 이미 발급된 액세스 토큰은 만료될 때까지 유효합니다.
async fn change_password(
    pool: &sqlx::SqlitePool,
    user: &User,
    req: &SetPasswordRequest,
) -> Result<(), AppError> {
    if !password_matches(user, &req.current_password)? {
        return Err(AppError::BadRequest("Current password is incorrect".to_string()));
    }
    check_password_len(&req.new_password)?;

    let password_hash = hash_password(&req.new_password)?;
    db_users::update_password(pool, &user.id, &password_hash).await?;
    db_users::delete_user_refresh_tokens(pool, &user.id).await?;

    tracing::info!(user_id = %user.id, "password changed");
    Ok(())
}

/// 액세스/리프레시 토큰을 발급하고 리프레시 토큰 해시를 저장합니다.
async fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let access_token = create_access_token(&user.id, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
    let refresh_token = create_refresh_token(&user.id, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    let token_id = uuid::Uuid::now_v7().to_string();
    let token_hash = hash_token(&refresh_token);
    let expires_at = (Utc::now() + refresh_token_ttl())
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();

    db_users::store_refresh_token(&state.pool, &token_id, &user.id, &token_hash, &expires_at).await?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
        refresh_token,
    })
}

/// `POST /auth/register` → `201 Created`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validate_registration(&req)?;
    let username = req.username.trim();
    let email = req.email.trim().to_lowercase();

    if db_users::find_by_username(&state.pool, username).await?.is_some() {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }
    if db_users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(&req.password)?;

    let user_id = uuid::Uuid::now_v7().to_string();
    let user = db_users::create_user(
        &state.pool,
        &user_id,
        &email,
        username,
        req.first_name.trim(),
        req.last_name.trim(),
        &password_hash,
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    let body = issue_tokens(&state, user).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// `POST /auth/login` (이메일 + 비밀번호)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = db_users::find_by_email(&state.pool, &req.email.trim().to_lowercase())
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !password_matches(&user, &req.password)? {
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }

    Ok(Json(issue_tokens(&state, user).await?))
}

/// `POST /auth/refresh` — 리프레시 토큰을 한 번 쓰고 새 토큰 쌍으로 교체합니다.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    verify_refresh_token(&req.refresh_token, &state.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let token_hash = hash_token(&req.refresh_token);
    let (_token_id, user_id, expires_at) = db_users::find_refresh_token(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    let expires = chrono::NaiveDateTime::parse_from_str(&expires_at, "%Y-%m-%dT%H:%M:%S%.3fZ")
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires.and_utc() < Utc::now() {
        db_users::delete_refresh_token(&state.pool, &token_hash).await?;
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = db_users::find_by_id(&state.pool, &user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    db_users::delete_refresh_token(&state.pool, &token_hash).await?;

    Ok(Json(issue_tokens(&state, user).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    db_users::delete_user_refresh_tokens(&state.pool, &auth_user.user_id).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// `POST /users/set_password` → `204 No Content`
pub async fn set_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<SetPasswordRequest>,
) -> Result<StatusCode, AppError> {
    let user = auth_user.load(&state.pool).await?;
    change_password(&state.pool, &user, &req).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = auth_user.load(&state.pool).await?;
    Ok(Json(user.into()))
}
