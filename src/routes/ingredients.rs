//! # 재료 카탈로그 라우트 핸들러
//!
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/ingredients?name= | `list_ingredients` | 이름 접두어 검색 |
//! | POST | /api/ingredients | `create_ingredient` | 새 재료 (관리자) |
//! | GET | /api/ingredients/{id} | `get_ingredient` | 단일 재료 |

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::recipes::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

/// `GET /ingredients?name=car` → `{ "ingredients": [...] }`
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> Result<Json<Value>, AppError> {
    let ingredients = db::list_ingredients(&state.pool, query.name.as_deref()).await?;
    Ok(Json(json!({ "ingredients": ingredients })))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ingredient>, AppError> {
    let ingredient = db::get_ingredient(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Ingredient"))?;
    Ok(Json(ingredient))
}

/// `POST /ingredients` → `201 Created`
///
/// 카탈로그는 관리자만 늘릴 수 있습니다.
pub async fn create_ingredient(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateIngredientRequest>,
) -> Result<(StatusCode, Json<Ingredient>), AppError> {
    let user = auth_user.load(&state.pool).await?;
    if !user.is_staff {
        return Err(AppError::Forbidden(
            "Only staff can edit the ingredient catalog".to_string(),
        ));
    }

    let ingredient = db::create_ingredient(&state.pool, &req).await?;
    tracing::info!(ingredient_id = %ingredient.id, name = %ingredient.name, "ingredient created");
    Ok((StatusCode::CREATED, Json(ingredient)))
}
