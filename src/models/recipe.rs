//! # 레시피 모델
//!
//! - `Recipe`: `recipes` 테이블 한 행
//! - `RecipePayload`: 생성(POST)/수정(PATCH) 요청 본문
//! - `RecipeDetail`: 태그, 재료, 작성자, 이미지 URL까지 채운 응답
//! - `RecipeShort`: 목록/구독 응답에 쓰는 요약
//! - `RecipeFilter`: 목록 필터 (작성자, 태그 slug, 즐겨찾기, 장바구니)

use serde::{Deserialize, Serialize};

use super::{Tag, UserResponse};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: String,
    pub author_id: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    /// `MEDIA_PATH` 기준 상대 경로 (예: "recipes/images/0190....png")
    pub image: String,
    pub created_at: String,
}

/// 요청 본문의 재료 한 줄: `{ "id": "...", "amount": 100 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLineInput {
    pub id: String,
    pub amount: i64,
}

/// 레시피 생성/수정 요청 본문
///
/// 누락된 필드는 역직렬화가 아니라 검증 단계에서 `MissingField`가 됩니다.
/// 수정 시 `name`, `text`, `cooking_time`, `image`를 생략하면 기존 값이 유지되고,
/// `tags`와 `ingredients`는 항상 필요하며 통째로 교체됩니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePayload {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    /// `data:image/png;base64,...` 형식의 이미지
    pub image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ingredients: Option<Vec<IngredientLineInput>>,
}

/// 카탈로그를 통해 이름과 단위를 채운 재료 줄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct RecipeIngredient {
    /// 재료 ID
    pub id: String,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// 단일 레시피 응답
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    pub id: String,
    pub author: UserResponse,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    /// 이미지 URL (`MEDIA_URL` + 저장 경로)
    pub image: String,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub created_at: String,
}

/// 레시피 요약 (즐겨찾기/장바구니 추가 응답, 구독 목록)
#[derive(Debug, Clone, Serialize)]
pub struct RecipeShort {
    pub id: String,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

/// 레시피 목록 필터
///
/// - `author`: 작성자 ID
/// - `tags`: 태그 slug 중 하나라도 가진 레시피 (OR)
/// - `is_favorited`, `is_in_shopping_cart`: 로그인한 사용자 기준,
///   익명 사용자에게는 무시됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub author: Option<String>,
    pub tags: Vec<String>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl RecipeFilter {
    /// 쿼리스트링 쌍에서 필터를 만듭니다.
    ///
    /// `?tags=lunch&tags=dinner`처럼 같은 키가 반복될 수 있어
    /// 구조체 대신 `(key, value)` 목록을 받습니다.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut filter = RecipeFilter::default();
        for (key, value) in pairs {
            match key.as_str() {
                "author" if !value.is_empty() => filter.author = Some(value.clone()),
                "tags" if !value.is_empty() => {
                    if !filter.tags.contains(value) {
                        filter.tags.push(value.clone());
                    }
                }
                "is_favorited" => filter.is_favorited = parse_flag(value),
                "is_in_shopping_cart" => filter.is_in_shopping_cart = parse_flag(value),
                _ => {}
            }
        }
        filter
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
