//! # 즐겨찾기/장바구니 목록 쿼리 모듈
//!
//! 두 목록은 같은 모양의 테이블(`favorites`, `shopping_cart`)이며
//! `ListKind`로 대상 테이블을 고릅니다.
//!
//! ## 상태 전이 (`(user, recipe)` 쌍마다)
//! - `add`:    absent → present, 이미 present면 `AlreadyExists`
//! - `remove`: present → absent, 이미 absent면 `NotFound`
//!
//! `add`는 먼저 존재 여부를 확인하지만, 최종 판단은 테이블의 기본키
//! `(user_id, recipe_id)`가 합니다. 동시에 들어온 두 번째 INSERT는
//! UNIQUE 제약에 걸려 같은 `AlreadyExists`로 보고됩니다.

use crate::error::{is_unique_violation, AppError};
use crate::models::*;
use sqlx::SqlitePool;

pub async fn is_in_list(
    pool: &SqlitePool,
    kind: ListKind,
    user_id: &str,
    recipe_id: &str,
) -> Result<bool, AppError> {
    let exists: bool = sqlx::query_scalar(&format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = ? AND recipe_id = ?)",
        kind.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// 레시피를 목록에 추가합니다 (absent → present).
pub async fn add_to_list(
    pool: &SqlitePool,
    kind: ListKind,
    user_id: &str,
    recipe_id: &str,
) -> Result<(), AppError> {
    if is_in_list(pool, kind, user_id, recipe_id).await? {
        return Err(AppError::AlreadyExists(kind.already_present_message()));
    }

    let result = sqlx::query(&format!(
        "INSERT INTO {} (user_id, recipe_id) VALUES (?, ?)",
        kind.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            tracing::debug!(user_id, recipe_id, list = kind.label(), "recipe added to list");
            Ok(())
        }
        // 확인과 INSERT 사이에 다른 요청이 먼저 추가한 경우
        Err(e) if is_unique_violation(&e) => {
            Err(AppError::AlreadyExists(kind.already_present_message()))
        }
        Err(e) => Err(e.into()),
    }
}

/// 레시피를 목록에서 제거합니다 (present → absent).
pub async fn remove_from_list(
    pool: &SqlitePool,
    kind: ListKind,
    user_id: &str,
    recipe_id: &str,
) -> Result<(), AppError> {
    let result = sqlx::query(&format!(
        "DELETE FROM {} WHERE user_id = ? AND recipe_id = ?",
        kind.table()
    ))
    .bind(user_id)
    .bind(recipe_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(kind.absent_message()));
    }

    tracing::debug!(user_id, recipe_id, list = kind.label(), "recipe removed from list");
    Ok(())
}

pub async fn count_in_list(
    pool: &SqlitePool,
    kind: ListKind,
    user_id: &str,
) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE user_id = ?",
        kind.table()
    ))
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// 장바구니에 담긴 모든 레시피의 재료 줄을 카탈로그 이름/단위와 함께 조회합니다.
///
/// 집계(그룹화, 합산, 정렬)는 `services::shopping_list`가 담당합니다.
pub async fn cart_lines(pool: &SqlitePool, user_id: &str) -> Result<Vec<CartLine>, AppError> {
    let lines = sqlx::query_as::<_, CartLine>(
        r#"
        SELECT i.name, i.measurement_unit, ri.amount
        FROM shopping_cart c
        JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE c.user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(lines)
}
