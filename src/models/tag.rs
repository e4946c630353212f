//! # 태그 모델 정의
//!
//! 태그는 레시피를 분류하기 위한 라벨입니다 (예: "아침", "점심", "저녁").
//! 이름, 색상 코드, slug 각각이 전역에서 유일합니다.
//!
//! ## 구조체 역할
//! - `Tag`: 데이터베이스에 저장된 태그를 표현 (응답용)
//! - `CreateTagRequest`: 새 태그 생성 시 클라이언트가 보내는 JSON 본문

use serde::{Deserialize, Serialize};

/// 태그 엔티티 — DB의 `tags` 테이블 한 행(row)에 대응합니다.
///
/// # derive 매크로 설명
/// - `Serialize`: 이 구조체를 JSON으로 변환할 수 있게 합니다 (API 응답 시 사용)
/// - `sqlx::FromRow`: SQL 쿼리 결과(행)를 이 구조체로 자동 매핑합니다
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    /// 태그 고유 식별자 (UUIDv7 형식 문자열)
    pub id: String,
    /// 태그 이름 (예: "Breakfast")
    pub name: String,
    /// 16진수 색상 코드 (예: "#E26C2D")
    pub color: String,
    /// URL 친화적인 식별자 (예: "breakfast"), 레시피 목록 필터에 사용됩니다
    pub slug: String,
}

/// 태그 생성 요청 — `POST /api/tags`의 요청 본문(body)에 해당합니다.
///
/// `slug`를 생략하면 이름에서 `slug::slugify()`로 만들어집니다.
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    pub color: String,
    pub slug: Option<String>,
}
