//! # 구독(Follow) 쿼리 모듈
//!
//! `follows` 테이블: `(user_id, following_id)` 기본키,
//! `CHECK (user_id <> following_id)`로 자기 자신 구독을 막습니다.

use crate::error::{is_unique_violation, AppError};
use crate::models::*;
use sqlx::SqlitePool;

pub async fn is_following(
    pool: &SqlitePool,
    user_id: &str,
    following_id: &str,
) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = ? AND following_id = ?)",
    )
    .bind(user_id)
    .bind(following_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// `user_id`가 `following_id`를 구독합니다.
///
/// - 자기 자신 → `BadRequest`
/// - 이미 구독 중 → `AlreadyExists` (동시 요청은 기본키 제약이 최종 판단)
pub async fn follow(pool: &SqlitePool, user_id: &str, following_id: &str) -> Result<(), AppError> {
    if user_id == following_id {
        return Err(AppError::BadRequest(
            "You cannot subscribe to yourself".to_string(),
        ));
    }
    if is_following(pool, user_id, following_id).await? {
        return Err(AppError::AlreadyExists(
            "You are already subscribed to this user".to_string(),
        ));
    }

    sqlx::query("INSERT INTO follows (user_id, following_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(following_id)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::AlreadyExists("You are already subscribed to this user".to_string())
            } else {
                e.into()
            }
        })?;

    Ok(())
}

pub async fn unfollow(
    pool: &SqlitePool,
    user_id: &str,
    following_id: &str,
) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM follows WHERE user_id = ? AND following_id = ?")
        .bind(user_id)
        .bind(following_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "You are not subscribed to this user".to_string(),
        ));
    }

    Ok(())
}

/// `user_id`가 구독 중인 사용자들을 username 순으로 조회합니다.
pub async fn list_following(pool: &SqlitePool, user_id: &str) -> Result<Vec<User>, AppError> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT u.id, u.email, u.username, u.first_name, u.last_name,
               u.password_hash, u.is_staff, u.created_at, u.updated_at
        FROM users u
        JOIN follows f ON f.following_id = u.id
        WHERE f.user_id = ?
        ORDER BY u.username
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(users)
}
