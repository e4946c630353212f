//! # 레시피(Recipe) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/recipes`                          → 목록 (필터: author, tags, is_favorited, is_in_shopping_cart)
//! - `POST   /api/recipes`                          → 생성
//! - `GET    /api/recipes/{id}`                     → 상세
//! - `PATCH  /api/recipes/{id}`                     → 수정 (태그/재료 통째로 교체)
//! - `DELETE /api/recipes/{id}`                     → 삭제
//! - `POST   /api/recipes/{id}/favorite`            → 즐겨찾기 추가
//! - `DELETE /api/recipes/{id}/favorite`            → 즐겨찾기 제거
//! - `POST   /api/recipes/{id}/shopping_cart`       → 장바구니 추가
//! - `DELETE /api/recipes/{id}/shopping_cart`       → 장바구니 제거
//! - `GET    /api/recipes/download_shopping_cart`   → 쇼핑 리스트 텍스트 파일
//!
//! 검증과 저장은 `services::composer`, 집계는 `services::shopping_list`가 담당하고
//! 여기서는 요청을 풀고 응답을 만드는 일만 합니다.

use crate::{
    config::Limits,
    db,
    error::AppError,
    middleware::auth::{AuthUser, MaybeUser},
    models::*,
    services::{self, Composer, MediaStore},
};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    /// JWT 토큰 서명용 비밀키
    pub jwt_secret: String,
    /// 레시피 검증 범위
    pub limits: Limits,
    /// 업로드 이미지 저장소
    pub media: MediaStore,
}

impl AppState {
    pub fn composer(&self) -> Composer<'_> {
        Composer::new(&self.pool, &self.limits, &self.media)
    }
}

/// `GET /recipes` — 레시피 목록
///
/// `tags`는 여러 번 올 수 있으므로(`?tags=lunch&tags=dinner`) 쿼리를
/// 키-값 쌍 목록으로 받아 `RecipeFilter::from_pairs`로 해석합니다.
pub async fn list_recipes(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer.load(&state.pool).await?;
    let filter = RecipeFilter::from_pairs(&params);

    let recipes = db::list_recipes(&state.pool, &filter, viewer.as_ref().map(|u| u.id.as_str())).await?;

    let composer = state.composer();
    let mut details = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        details.push(composer.materialize(recipe, viewer.as_ref()).await?);
    }

    Ok(Json(json!({ "recipes": details })))
}

/// `GET /recipes/{id}`
pub async fn get_recipe(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<RecipeDetail>, AppError> {
    let viewer = viewer.load(&state.pool).await?;
    let recipe = db::get_recipe(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe"))?;

    let detail = state.composer().materialize(recipe, viewer.as_ref()).await?;
    Ok(Json(detail))
}

/// `POST /recipes` → `201 Created`
pub async fn create_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<RecipePayload>,
) -> Result<(StatusCode, Json<RecipeDetail>), AppError> {
    let author = auth_user.load(&state.pool).await?;
    let detail = state
        .composer()
        .save_new(&author, &req)
        .await
        .inspect_err(|e| log_rejection("create", e))?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// `PATCH /recipes/{id}`
pub async fn update_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<RecipePayload>,
) -> Result<Json<RecipeDetail>, AppError> {
    let editor = auth_user.load(&state.pool).await?;
    let detail = state
        .composer()
        .save_update(&editor, &id, &req)
        .await
        .inspect_err(|e| log_rejection("update", e))?;
    Ok(Json(detail))
}

/// `DELETE /recipes/{id}` → `204 No Content`
pub async fn delete_recipe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let editor = auth_user.load(&state.pool).await?;
    state.composer().delete(&editor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn log_rejection(action: &str, err: &AppError) {
    if err.is_validation() {
        tracing::debug!(action, error = %err, "recipe rejected");
    }
}

pub async fn add_favorite(
    state: State<AppState>,
    auth_user: AuthUser,
    path: Path<String>,
) -> Result<(StatusCode, Json<RecipeShort>), AppError> {
    add_membership(state, auth_user, path, ListKind::Favorites).await
}

pub async fn remove_favorite(
    state: State<AppState>,
    auth_user: AuthUser,
    path: Path<String>,
) -> Result<StatusCode, AppError> {
    remove_membership(state, auth_user, path, ListKind::Favorites).await
}

pub async fn add_to_cart(
    state: State<AppState>,
    auth_user: AuthUser,
    path: Path<String>,
) -> Result<(StatusCode, Json<RecipeShort>), AppError> {
    add_membership(state, auth_user, path, ListKind::Cart).await
}

pub async fn remove_from_cart(
    state: State<AppState>,
    auth_user: AuthUser,
    path: Path<String>,
) -> Result<StatusCode, AppError> {
    remove_membership(state, auth_user, path, ListKind::Cart).await
}

/// 레시피가 있는지 먼저 확인하고 목록에 추가합니다. 이미 있으면 409.
async fn add_membership(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    kind: ListKind,
) -> Result<(StatusCode, Json<RecipeShort>), AppError> {
    let user = auth_user.load(&state.pool).await?;
    let recipe = db::get_recipe(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe"))?;

    db::add_to_list(&state.pool, kind, &user.id, &recipe.id).await?;
    Ok((StatusCode::CREATED, Json(state.composer().short(recipe))))
}

/// 목록에서 제거합니다. 목록에 없으면 404.
async fn remove_membership(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    kind: ListKind,
) -> Result<StatusCode, AppError> {
    let user = auth_user.load(&state.pool).await?;
    let _ = db::get_recipe(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Recipe"))?;

    db::remove_from_list(&state.pool, kind, &user.id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /recipes/download_shopping_cart` — 장바구니 재료를 합산한 텍스트 파일
///
/// 장바구니가 비어 있으면 `EmptyCart`(400)입니다.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Response, AppError> {
    let user = auth_user.load(&state.pool).await?;
    let list = services::aggregate(&state.pool, &user.id).await?;
    let file = services::render(&list, &user, chrono::Local::now().date_naive());

    tracing::info!(user = %user.username, items = list.len(), "shopping list downloaded");

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.body,
    )
        .into_response())
}
