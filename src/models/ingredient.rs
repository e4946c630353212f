//! # 재료 카탈로그 모델
//!
//! 재료는 `(name, measurement_unit)` 조합으로 전역에서 유일합니다.
//! 같은 이름이라도 단위가 다르면 다른 재료입니다 (예: "설탕/g", "설탕/tbsp").

use serde::{Deserialize, Serialize};

/// 재료 엔티티 — DB의 `ingredients` 테이블 한 행(row)에 대응합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ingredient {
    /// 재료 고유 식별자 (UUIDv7 형식 문자열)
    pub id: String,
    /// 재료 이름 (예: "carrot")
    pub name: String,
    /// 측정 단위 (예: "g", "ml", "pcs")
    pub measurement_unit: String,
}

/// 재료 생성 요청 — `POST /api/ingredients`의 요청 본문
#[derive(Debug, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: String,
    pub measurement_unit: String,
}

/// 재료 목록 검색 쿼리 — `GET /api/ingredients?name=car`
///
/// `name`은 대소문자를 구분하지 않는 접두사 검색입니다.
#[derive(Debug, Default, Deserialize)]
pub struct IngredientQuery {
    pub name: Option<String>,
}
