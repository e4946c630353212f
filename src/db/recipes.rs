//! # 레시피 저장소 쿼리 모듈
//!
//! ## 테이블 구조
//! - `recipes`: 레시피 행
//! - `recipe_tags`: 레시피 ↔ 태그 다대다(N:M) 관계 테이블
//! - `recipe_ingredients`: 레시피 ↔ 재료 + 양(amount), `(recipe_id, ingredient_id)`가 기본키
//!
//! 쓰기 함수(`insert_recipe`, `update_recipe_fields`, `replace_children`)는
//! 트랜잭션 연결을 받습니다. 레시피 행과 자식 행이 한 트랜잭션 안에서
//! 함께 바뀌어야 다른 요청이 절반만 교체된 재료 목록을 보지 못합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::{SqliteConnection, SqlitePool};

const RECIPE_COLUMNS: &str = "r.id, r.author_id, r.name, r.text, r.cooking_time, r.image, r.created_at";

/// 레시피 행에 저장되는 스칼라 필드
#[derive(Debug, Clone, Copy)]
pub struct RecipeFields<'a> {
    pub id: &'a str,
    pub author_id: &'a str,
    pub name: &'a str,
    pub text: &'a str,
    pub cooking_time: i64,
    pub image: &'a str,
}

/// 레시피 행을 삽입합니다. 자식 행은 `replace_children`으로 따로 저장합니다.
pub async fn insert_recipe(
    conn: &mut SqliteConnection,
    fields: &RecipeFields<'_>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO recipes (id, author_id, name, text, cooking_time, image)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(fields.id)
    .bind(fields.author_id)
    .bind(fields.name)
    .bind(fields.text)
    .bind(fields.cooking_time)
    .bind(fields.image)
    .execute(conn)
    .await?;

    Ok(())
}

/// 레시피 행의 스칼라 필드를 덮어씁니다. `author_id`는 바뀌지 않습니다.
pub async fn update_recipe_fields(
    conn: &mut SqliteConnection,
    fields: &RecipeFields<'_>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE recipes
        SET name = ?, text = ?, cooking_time = ?, image = ?
        WHERE id = ?
        "#,
    )
    .bind(fields.name)
    .bind(fields.text)
    .bind(fields.cooking_time)
    .bind(fields.image)
    .bind(fields.id)
    .execute(conn)
    .await?;

    Ok(())
}

/// 레시피의 태그 연결과 재료 줄을 통째로 교체합니다.
///
/// 기존 행을 모두 지우고 새 행을 삽입합니다. 차이(diff)를 계산하지 않으므로
/// 이전 버전의 재료 줄이 남아 있을 수 없습니다.
pub async fn replace_children(
    conn: &mut SqliteConnection,
    recipe_id: &str,
    tag_ids: &[String],
    lines: &[IngredientLineInput],
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    for tag_id in tag_ids {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES (?, ?)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }

    for line in lines {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
        )
        .bind(recipe_id)
        .bind(&line.id)
        .bind(line.amount)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn get_recipe(pool: &SqlitePool, id: &str) -> Result<Option<Recipe>, AppError> {
    let recipe = sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {} FROM recipes r WHERE r.id = ?",
        RECIPE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(recipe)
}

/// 레시피에 연결된 태그를 이름순으로 조회합니다.
///
/// ```sql
/// tags ←── recipe_tags ──→ recipes
/// ```
pub async fn get_recipe_tags(pool: &SqlitePool, recipe_id: &str) -> Result<Vec<Tag>, AppError> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.color, t.slug
        FROM tags t
        JOIN recipe_tags rt ON rt.tag_id = t.id
        WHERE rt.recipe_id = ?
        ORDER BY t.name
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// 레시피의 재료 줄을 카탈로그와 JOIN하여 이름/단위와 함께 조회합니다.
pub async fn get_recipe_ingredients(
    pool: &SqlitePool,
    recipe_id: &str,
) -> Result<Vec<RecipeIngredient>, AppError> {
    let lines = sqlx::query_as::<_, RecipeIngredient>(
        r#"
        SELECT i.id, i.name, i.measurement_unit, ri.amount
        FROM recipe_ingredients ri
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = ?
        ORDER BY i.name, i.measurement_unit
        "#,
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(lines)
}

/// 필터 조건에 맞는 레시피를 최신순으로 조회합니다.
///
/// 즐겨찾기/장바구니 필터는 `viewer_id`가 있을 때만 적용됩니다.
pub async fn list_recipes(
    pool: &SqlitePool,
    filter: &RecipeFilter,
    viewer_id: Option<&str>,
) -> Result<Vec<Recipe>, AppError> {
    let mut query = format!("SELECT {} FROM recipes r WHERE 1 = 1", RECIPE_COLUMNS);
    let mut bindings: Vec<&str> = Vec::new();

    if let Some(author) = &filter.author {
        query.push_str(" AND r.author_id = ?");
        bindings.push(author.as_str());
    }

    if !filter.tags.is_empty() {
        query.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM recipe_tags rt JOIN tags t ON t.id = rt.tag_id \
             WHERE rt.recipe_id = r.id AND t.slug IN ({}))",
            super::placeholders(filter.tags.len())
        ));
        bindings.extend(filter.tags.iter().map(String::as_str));
    }

    if let Some(viewer) = viewer_id {
        for (enabled, kind) in [
            (filter.is_favorited, ListKind::Favorites),
            (filter.is_in_shopping_cart, ListKind::Cart),
        ] {
            if enabled {
                query.push_str(&format!(
                    " AND EXISTS (SELECT 1 FROM {} m WHERE m.recipe_id = r.id AND m.user_id = ?)",
                    kind.table()
                ));
                bindings.push(viewer);
            }
        }
    }

    query.push_str(" ORDER BY r.created_at DESC, r.id DESC");

    let mut query_builder = sqlx::query_as::<_, Recipe>(&query);
    for binding in bindings {
        query_builder = query_builder.bind(binding);
    }

    Ok(query_builder.fetch_all(pool).await?)
}

/// 작성자의 레시피를 최신순으로 조회합니다. `limit`이 있으면 그 개수까지만.
pub async fn list_author_recipes(
    pool: &SqlitePool,
    author_id: &str,
    limit: Option<i64>,
) -> Result<Vec<Recipe>, AppError> {
    // SQLite에서 LIMIT -1은 "제한 없음"입니다.
    let limit = limit.filter(|l| *l >= 0).unwrap_or(-1);
    let recipes = sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {} FROM recipes r WHERE r.author_id = ? ORDER BY r.created_at DESC, r.id DESC LIMIT ?",
        RECIPE_COLUMNS
    ))
    .bind(author_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(recipes)
}

pub async fn count_author_recipes(pool: &SqlitePool, author_id: &str) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// 레시피를 삭제합니다.
///
/// 태그 연결, 재료 줄, 즐겨찾기/장바구니 항목은 `ON DELETE CASCADE`로 함께 삭제됩니다.
pub async fn delete_recipe(pool: &SqlitePool, id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, testing};

    #[tokio::test]
    async fn replace_children_leaves_no_stale_lines() {
        let pool = testing::pool().await;
        let author = testing::user(&pool, "chef").await;
        let tag = testing::tag(&pool, "Lunch", "#8775D2").await;
        let carrot = testing::ingredient(&pool, "carrot", "g").await;
        let onion = testing::ingredient(&pool, "onion", "pcs").await;

        let id = testing::recipe(&pool, &author.id, "Soup", &[tag.id.clone()], &[(&carrot, 100)]).await;

        let mut tx = pool.begin().await.unwrap();
        replace_children(
            &mut tx,
            &id,
            &[tag.id.clone()],
            &[IngredientLineInput {
                id: onion.id.clone(),
                amount: 2,
            }],
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let lines = get_recipe_ingredients(&pool, &id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "onion");
        assert_eq!(lines[0].amount, 2);
    }

    #[tokio::test]
    async fn rolled_back_replacement_keeps_previous_children() {
        let pool = testing::pool().await;
        let author = testing::user(&pool, "chef").await;
        let tag = testing::tag(&pool, "Lunch", "#8775D2").await;
        let carrot = testing::ingredient(&pool, "carrot", "g").await;

        let id = testing::recipe(&pool, &author.id, "Soup", &[tag.id.clone()], &[(&carrot, 100)]).await;

        // 존재하지 않는 재료 → 외래키 위반으로 실패, 트랜잭션은 커밋되지 않음
        let mut tx = pool.begin().await.unwrap();
        let result = replace_children(
            &mut tx,
            &id,
            &[tag.id.clone()],
            &[IngredientLineInput {
                id: "missing".to_string(),
                amount: 5,
            }],
        )
        .await;
        assert!(result.is_err());
        tx.rollback().await.unwrap();

        let lines = get_recipe_ingredients(&pool, &id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, "carrot");
        assert_eq!(get_recipe_tags(&pool, &id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_filters_by_author_tags_and_lists() {
        let pool = testing::pool().await;
        let alice = testing::user(&pool, "alice").await;
        let bob = testing::user(&pool, "bob").await;
        let lunch = testing::tag(&pool, "Lunch", "#8775D2").await;
        let dinner = testing::tag(&pool, "Dinner", "#49B64E").await;
        let salt = testing::ingredient(&pool, "salt", "g").await;

        let soup = testing::recipe(&pool, &alice.id, "Soup", &[lunch.id.clone()], &[(&salt, 1)]).await;
        let stew = testing::recipe(&pool, &bob.id, "Stew", &[dinner.id.clone()], &[(&salt, 2)]).await;

        let by_author = list_recipes(
            &pool,
            &RecipeFilter {
                author: Some(alice.id.clone()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].id, soup);

        let by_tags = list_recipes(
            &pool,
            &RecipeFilter {
                tags: vec!["lunch".to_string(), "dinner".to_string()],
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
        assert_eq!(by_tags.len(), 2);

        db::add_to_list(&pool, ListKind::Favorites, &alice.id, &stew)
            .await
            .unwrap();
        let favorites_filter = RecipeFilter {
            is_favorited: true,
            ..Default::default()
        };

        let favorites = list_recipes(&pool, &favorites_filter, Some(&alice.id))
            .await
            .unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, stew);

        // 익명 사용자에게는 즐겨찾기 필터가 무시됨
        let anonymous = list_recipes(&pool, &favorites_filter, None).await.unwrap();
        assert_eq!(anonymous.len(), 2);
    }

    #[tokio::test]
    async fn delete_cascades_to_memberships() {
        let pool = testing::pool().await;
        let alice = testing::user(&pool, "alice").await;
        let tag = testing::tag(&pool, "Lunch", "#8775D2").await;
        let salt = testing::ingredient(&pool, "salt", "g").await;
        let soup = testing::recipe(&pool, &alice.id, "Soup", &[tag.id.clone()], &[(&salt, 1)]).await;

        db::add_to_list(&pool, ListKind::Cart, &alice.id, &soup)
            .await
            .unwrap();
        assert!(delete_recipe(&pool, &soup).await.unwrap());
        assert!(!delete_recipe(&pool, &soup).await.unwrap());

        assert!(!db::is_in_list(&pool, ListKind::Cart, &alice.id, &soup)
            .await
            .unwrap());
        assert!(get_recipe_ingredients(&pool, &soup).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn author_recipes_respect_limit() {
        let pool = testing::pool().await;
        let alice = testing::user(&pool, "alice").await;
        let tag = testing::tag(&pool, "Lunch", "#8775D2").await;
        let salt = testing::ingredient(&pool, "salt", "g").await;
        for name in ["A", "B", "C"] {
            testing::recipe(&pool, &alice.id, name, &[tag.id.clone()], &[(&salt, 1)]).await;
        }

        assert_eq!(count_author_recipes(&pool, &alice.id).await.unwrap(), 3);
        assert_eq!(list_author_recipes(&pool, &alice.id, Some(2)).await.unwrap().len(), 2);
        assert_eq!(list_author_recipes(&pool, &alice.id, None).await.unwrap().len(), 3);
    }
}
