//! # 태그 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/tags | `list_tags` | 전체 태그 목록 |
//! | POST | /api/tags | `create_tag` | 새 태그 생성 (관리자) |
//! | GET | /api/tags/{id} | `get_tag` | 단일 태그 |
//!
//! ## Axum 핸들러 패턴
//! 각 함수는 Axum의 **추출자(Extractor)** 패턴을 따릅니다:
//! - `State(state)`: 애플리케이션 공유 상태 (DB 풀 등)
//! - `Path(id)`: URL 경로의 변수 (`{id}` 부분)
//! - `Json(req)`: 요청 본문을 구조체로 파싱

// ── 의존성 가져오기 ──
use crate::{
    db,                         // 데이터베이스 쿼리 모듈
    error::AppError,            // 에러 타입 (자동으로 HTTP 에러 응답으로 변환됨)
    middleware::auth::AuthUser, // 로그인 사용자 추출자
    models::*,                  // 요청/응답 구조체들 (Tag, CreateTagRequest 등)
    routes::recipes::AppState,  // 애플리케이션 공유 상태
};
use axum::{
    extract::{Path, State}, // Axum 추출자: URL 파라미터, 앱 상태 추출
    http::StatusCode,       // HTTP 상태 코드 (201 Created 등)
    Json,                   // JSON 요청/응답 처리
};
use serde_json::{json, Value};

/// 전체 태그 목록을 조회합니다.
///
/// `GET /api/tags` → `{ "tags": [...] }`
pub async fn list_tags(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let tags = db::list_tags(&state.pool).await?;
    Ok(Json(json!({ "tags": tags })))
}

/// `GET /api/tags/{id}`
pub async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Tag>, AppError> {
    let tag = db::get_tag(&state.pool, &id)
        .await?
        // None(태그 없음)이면 NotFound 에러 → HTTP 404 응답
        .ok_or_else(|| AppError::not_found("Tag"))?;
    Ok(Json(tag))
}

/// 새 태그를 생성합니다.
///
/// `POST /api/tags` + `{ "name": "...", "color": "#RRGGBB", "slug": "..." }`
///
/// `slug`를 생략하면 이름에서 만들어집니다. 관리자만 호출할 수 있습니다.
pub async fn create_tag(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<Tag>), AppError> {
    let user = auth_user.load(&state.pool).await?;
    if !user.is_staff {
        return Err(AppError::Forbidden("Only staff can create tags".to_string()));
    }

    let tag = db::create_tag(&state.pool, &req).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}
