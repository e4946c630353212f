//! # JWT 인증 추출자
//!
//! - `AuthUser`: 유효한 Bearer 토큰이 필수인 핸들러용
//! - `MaybeUser`: 익명 접근도 허용하는 핸들러용 (목록/상세 조회)
//!
//! 토큰이 아예 없으면 `MaybeUser(None)`이지만, 토큰이 있는데 잘못되었으면
//! 두 추출자 모두 401로 거부합니다.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::db::users as db_users;
use crate::error::AppError;
use crate::models::User;
use crate::routes::recipes::AppState;

/// 토큰 용도. 리프레시 토큰으로 API를 호출하거나 그 반대로 쓰는 것을 막습니다.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,
    pub iat: i64,
    pub typ: TokenKind,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl AuthUser {
    /// 토큰의 사용자 행을 불러옵니다. 토큰 발급 후 삭제된 사용자는 401입니다.
    pub async fn load(&self, pool: &sqlx::SqlitePool) -> Result<User, AppError> {
        db_users::find_by_id(pool, &self.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
    }
}

/// 익명일 수도 있는 요청자
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    pub async fn load(&self, pool: &sqlx::SqlitePool) -> Result<Option<User>, AppError> {
        match &self.0 {
            Some(auth_user) => Ok(Some(auth_user.load(pool).await?)),
            None => Ok(None),
        }
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(MaybeUser(None));
        }
        let auth_user = AuthUser::from_request_parts(parts, state).await?;
        Ok(MaybeUser(Some(auth_user)))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = verify_access_token(token, &state.jwt_secret)?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization token is required",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid authorization token",
            ),
            AuthError::ExpiredToken => (
                StatusCode::UNAUTHORIZED,
                "expired_token",
                "Authorization token has expired",
            ),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// 액세스 토큰 수명
pub fn access_token_ttl() -> Duration {
    Duration::minutes(15)
}

/// 리프레시 토큰 수명. DB에 저장하는 `expires_at`도 이 값을 씁니다.
pub fn refresh_token_ttl() -> Duration {
    Duration::days(7)
}

fn create_token(
    user_id: &str,
    secret: &str,
    typ: TokenKind,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        typ,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn create_access_token(user_id: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(user_id, secret, TokenKind::Access, access_token_ttl())
}

pub fn create_refresh_token(user_id: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    create_token(user_id, secret, TokenKind::Refresh, refresh_token_ttl())
}

pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    verify_token(token, secret, TokenKind::Access)
}

pub fn verify_refresh_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    verify_token(token, secret, TokenKind::Refresh)
}

/// 서명과 만료를 검사한 뒤 `typ`이 기대한 용도인지 확인합니다.
/// `typ`이 없는 토큰은 디코딩 단계에서 거부됩니다.
fn verify_token(token: &str, secret: &str, expected: TokenKind) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.typ != expected {
        return Err(AuthError::InvalidToken);
    }
    Ok(token_data.claims)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn access_token_round_trip() {
        let token = create_access_token("user-1", SECRET).unwrap();
        let claims = verify_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, access_token_ttl().num_seconds());
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = create_access_token("user-1", SECRET).unwrap();
        assert!(matches!(
            verify_access_token(&token, "other"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let refresh = create_refresh_token("user-1", SECRET).unwrap();
        assert!(matches!(
            verify_access_token(&refresh, SECRET),
            Err(AuthError::InvalidToken)
        ));

        let claims = verify_refresh_token(&refresh, SECRET).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.typ, TokenKind::Refresh);
    }

    #[test]
    fn access_token_is_not_a_refresh_token() {
        let access = create_access_token("user-1", SECRET).unwrap();
        assert!(matches!(
            verify_refresh_token(&access, SECRET),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn untyped_token_is_rejected() {
        #[derive(Serialize)]
        struct Untyped {
            sub: String,
            exp: i64,
            iat: i64,
        }
        let now = Utc::now();
        let token = encode(
            &Header::default(),
            &Untyped {
                sub: "user-1".to_string(),
                iat: now.timestamp(),
                exp: (now + access_token_ttl()).timestamp(),
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify_access_token(&token, SECRET),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn token_hash_is_stable_hex() {
        let hash = hash_token("abc");
        assert_eq!(hash, hash_token("abc"));
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, hash_token("abd"));
    }
}
