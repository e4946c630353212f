//! # 사용자 프로필/구독 라우트 핸들러
//!
//! - `GET    /api/users`                          → 전체 사용자 (`is_subscribed` 포함)
//! - `POST   /api/users/set_password`             → 비밀번호 변경 (`routes::auth`)
//! - `GET    /api/users/{id}`                     → 프로필 (`is_subscribed` 포함)
//! - `GET    /api/users/subscriptions?recipes_limit=` → 구독한 작성자 목록
//! - `POST   /api/users/{id}/subscribe`           → 구독
//! - `DELETE /api/users/{id}/subscribe`           → 구독 해제

use crate::{
    db::{self, users as db_users},
    error::AppError,
    middleware::auth::{AuthUser, MaybeUser},
    models::*,
    routes::recipes::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::collections::HashSet;

/// `GET /users` → `{ "users": [...] }`
pub async fn list_users(
    State(state): State<AppState>,
    viewer: MaybeUser,
) -> Result<Json<Value>, AppError> {
    let viewer = viewer.load(&state.pool).await?;
    let users = users_for_viewer(&state.pool, viewer.as_ref()).await?;
    Ok(Json(json!({ "users": users })))
}

/// 구독 목록을 한 번만 읽어 각 사용자의 `is_subscribed`를 채웁니다.
async fn users_for_viewer(
    pool: &SqlitePool,
    viewer: Option<&User>,
) -> Result<Vec<UserResponse>, AppError> {
    let following: HashSet<String> = match viewer {
        Some(viewer) => db::list_following(pool, &viewer.id)
            .await?
            .into_iter()
            .map(|author| author.id)
            .collect(),
        None => HashSet::new(),
    };

    Ok(db_users::list_users(pool)
        .await?
        .into_iter()
        .map(|user| {
            let is_subscribed = following.contains(&user.id);
            UserResponse::with_subscription(user, is_subscribed)
        })
        .collect())
}

pub async fn get_user(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    let is_subscribed = match &viewer.0 {
        Some(auth_user) => db::is_following(&state.pool, &auth_user.user_id, &user.id).await?,
        None => false,
    };

    Ok(Json(UserResponse::with_subscription(user, is_subscribed)))
}

/// `GET /users/subscriptions` → `{ "subscriptions": [...] }`
pub async fn list_subscriptions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<SubscriptionsQuery>,
) -> Result<Json<Value>, AppError> {
    let authors = db::list_following(&state.pool, &auth_user.user_id).await?;

    let mut subscriptions = Vec::with_capacity(authors.len());
    for author in authors {
        subscriptions.push(subscription(&state, author, query.recipes_limit).await?);
    }

    Ok(Json(json!({ "subscriptions": subscriptions })))
}

/// `POST /users/{id}/subscribe` → `201 Created`
///
/// 자기 자신은 400, 이미 구독 중이면 409입니다.
pub async fn subscribe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<SubscriptionsQuery>,
) -> Result<(StatusCode, Json<Subscription>), AppError> {
    let author = db_users::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    db::follow(&state.pool, &auth_user.user_id, &author.id).await?;
    tracing::debug!(user_id = %auth_user.user_id, following_id = %author.id, "subscribed");

    let body = subscription(&state, author, query.recipes_limit).await?;
    Ok((StatusCode::CREATED, Json(body)))
}

/// `DELETE /users/{id}/subscribe` → `204 No Content`
pub async fn unsubscribe(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let _ = db_users::find_by_id(&state.pool, &id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))?;

    db::unfollow(&state.pool, &auth_user.user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 구독 응답: 작성자 정보 + 최신 레시피 요약 + 전체 레시피 수
async fn subscription(
    state: &AppState,
    author: User,
    recipes_limit: Option<i64>,
) -> Result<Subscription, AppError> {
    let composer = state.composer();
    let recipes = db::list_author_recipes(&state.pool, &author.id, recipes_limit)
        .await?
        .into_iter()
        .map(|recipe| composer.short(recipe))
        .collect();
    let recipes_count = db::count_author_recipes(&state.pool, &author.id).await?;

    Ok(Subscription {
        user: UserResponse::with_subscription(author, true),
        recipes,
        recipes_count,
    })
}
