//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 레시피 검증, 목록(즐겨찾기/장바구니) 상태 전이,
//!   쇼핑 리스트 집계에서 발생하는 에러를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! 모든 에러는 요청 단위로 발생하며 프로세스를 중단시키지 않습니다.
//! 자동 재시도는 없고, 재시도 여부는 호출자가 결정합니다.

use axum::{
    http::StatusCode,                   // HTTP 상태 코드 (200, 404, 500 등)
    response::{IntoResponse, Response}, // Axum의 응답 변환 트레이트
    Json,                               // JSON 응답 래퍼
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 각 에러 variant는 적절한 HTTP 상태 코드와 메시지로 변환됩니다.
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 필수 필드가 없거나 비어 있음 (HTTP 400)
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// 재료 목록에 같은 재료가 두 번 이상 등장 (HTTP 400)
    #[error("Ingredient {0} is listed more than once")]
    DuplicateIngredient(String),

    /// 태그 목록에 같은 태그가 두 번 이상 등장 (HTTP 400)
    #[error("Tag {0} is listed more than once")]
    DuplicateTag(String),

    /// 카탈로그에 없는 재료를 참조 (HTTP 400)
    #[error("Unknown ingredient: {0}")]
    UnknownIngredient(String),

    /// 존재하지 않는 태그를 참조 (HTTP 400)
    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    /// 수치 필드가 허용 범위를 벗어남 (HTTP 400)
    #[error("Field {field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: i64,
        max: i64,
    },

    /// 이미 목록에 있거나 이미 구독 중 (HTTP 409)
    #[error("{0}")]
    AlreadyExists(String),

    /// 요청한 리소스나 목록 항목을 찾을 수 없음 (HTTP 404)
    #[error("{0}")]
    NotFound(String),

    /// 장바구니가 비어 있어 쇼핑 리스트를 만들 수 없음 (HTTP 400)
    #[error("Shopping cart is empty")]
    EmptyCart,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx::Error → AppError::Database 자동 변환
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 파일 입출력 오류 (HTTP 500)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 권한 없음: 작성자나 관리자가 아님 (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 리소스 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// 리소스 이름으로 NotFound 에러를 만듭니다. 예: `AppError::not_found("Recipe")`
    pub fn not_found(resource: &str) -> Self {
        AppError::NotFound(format!("{} not found", resource))
    }

    /// 검증 에러(클라이언트 입력 문제)인지 여부
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::MissingField(_)
                | AppError::DuplicateIngredient(_)
                | AppError::DuplicateTag(_)
                | AppError::UnknownIngredient(_)
                | AppError::UnknownTag(_)
                | AppError::OutOfRange { .. }
        )
    }
}

/// sqlx 에러가 UNIQUE 제약 위반인지 확인합니다.
///
/// 동시에 같은 항목을 추가하려는 요청 중 두 번째 요청은 저장소의
/// UNIQUE 제약에서 걸리며, 호출 측에서 `AlreadyExists`로 변환합니다.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, IO, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::MissingField(_) => {
                (StatusCode::BAD_REQUEST, "missing_field", self.to_string())
            }
            AppError::DuplicateIngredient(_) => {
                (StatusCode::BAD_REQUEST, "duplicate_ingredient", self.to_string())
            }
            AppError::DuplicateTag(_) => {
                (StatusCode::BAD_REQUEST, "duplicate_tag", self.to_string())
            }
            AppError::UnknownIngredient(_) => {
                (StatusCode::BAD_REQUEST, "unknown_ingredient", self.to_string())
            }
            AppError::UnknownTag(_) => (StatusCode::BAD_REQUEST, "unknown_tag", self.to_string()),
            AppError::OutOfRange { .. } => {
                (StatusCode::BAD_REQUEST, "out_of_range", self.to_string())
            }
            AppError::AlreadyExists(ref msg) => {
                (StatusCode::CONFLICT, "already_exists", msg.clone())
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::EmptyCart => (StatusCode::BAD_REQUEST, "empty_cart", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Io(ref e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    "An IO error occurred".to_string(),
                )
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
        };

        // 결과: { "error": { "code": "not_found", "message": "Recipe not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let resp = AppError::DuplicateIngredient("abc".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = AppError::OutOfRange {
            field: "amount".to_string(),
            min: 1,
            max: 10,
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn membership_errors_map_to_conflict_and_not_found() {
        let resp = AppError::AlreadyExists("Recipe is already in the list".to_string())
            .into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = AppError::not_found("Recipe").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn out_of_range_message_names_bounds() {
        let err = AppError::OutOfRange {
            field: "cooking_time".to_string(),
            min: 1,
            max: 32000,
        };
        assert_eq!(err.to_string(), "Field cooking_time must be between 1 and 32000");
        assert!(err.is_validation());
        assert!(!AppError::EmptyCart.is_validation());
    }
}
