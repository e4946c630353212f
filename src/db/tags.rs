//! # 태그 데이터베이스 쿼리 모듈
//!
//! 태그 카탈로그 조회/생성 SQL 쿼리 함수들입니다.
//! 레시피-태그 연결(`recipe_tags`)은 레시피 저장소(`db::recipes`)가 관리합니다.
//!
//! ## 테이블 구조
//! - `tags`: 태그 엔티티 (id, name, color, slug), 세 속성 각각 UNIQUE

use crate::db::placeholders;
use crate::error::{is_unique_violation, AppError};
use crate::models::*;
use sqlx::SqlitePool;

/// 모든 태그를 이름순으로 조회합니다.
pub async fn list_tags(pool: &SqlitePool) -> Result<Vec<Tag>, AppError> {
    let tags = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(tags)
}

/// ID로 태그 하나를 조회합니다.
///
/// `fetch_optional`은 결과가 0행이면 None, 1행이면 Some(Tag)을 반환합니다.
pub async fn get_tag(pool: &SqlitePool, id: &str) -> Result<Option<Tag>, AppError> {
    let tag = sqlx::query_as::<_, Tag>("SELECT id, name, color, slug FROM tags WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(tag)
}

/// 여러 ID의 태그를 한 번에 조회합니다. 존재하는 태그만 반환됩니다.
pub async fn get_tags_by_ids(pool: &SqlitePool, ids: &[String]) -> Result<Vec<Tag>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT id, name, color, slug FROM tags WHERE id IN ({}) ORDER BY name",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as::<_, Tag>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    Ok(query.fetch_all(pool).await?)
}

/// 새 태그를 생성하고 생성된 태그를 반환합니다.
///
/// ## 처리 흐름
/// 1. slug가 없으면 이름에서 `slug::slugify()`로 생성
/// 2. UUIDv7으로 고유 ID 생성 후 INSERT
/// 3. 이름/색상/slug 중 하나라도 겹치면 UNIQUE 제약 위반 → `Conflict`
pub async fn create_tag(pool: &SqlitePool, req: &CreateTagRequest) -> Result<Tag, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::MissingField("name".to_string()));
    }
    if !is_hex_color(&req.color) {
        return Err(AppError::BadRequest(format!(
            "Invalid color code: {}",
            req.color
        )));
    }

    let slug = req
        .slug
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(slug::slugify)
        .unwrap_or_else(|| slug::slugify(name));

    let id = uuid::Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO tags (id, name, color, slug) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(req.color.to_uppercase())
        .bind(&slug)
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Tag name, color or slug is already in use".to_string())
            } else {
                e.into()
            }
        })?;

    get_tag(pool, &id)
        .await?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created tag".to_string()))
}

/// `#RRGGBB` 또는 `#RGB` 형식인지 확인합니다.
fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 6 || hex.len() == 3) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    #[test]
    fn hex_color_validation() {
        assert!(is_hex_color("#E26C2D"));
        assert!(is_hex_color("#abc"));
        assert!(!is_hex_color("E26C2D"));
        assert!(!is_hex_color("#GGGGGG"));
    }

    #[tokio::test]
    async fn create_derives_slug_and_lists_by_name() {
        let pool = testing::pool().await;
        let dinner = testing::tag(&pool, "Dinner Time", "#49B64E").await;
        testing::tag(&pool, "Breakfast", "#E26C2D").await;

        assert_eq!(dinner.slug, "dinner-time");

        let names: Vec<String> = list_tags(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["Breakfast", "Dinner Time"]);
    }

    #[tokio::test]
    async fn duplicate_color_conflicts() {
        let pool = testing::pool().await;
        testing::tag(&pool, "Lunch", "#8775D2").await;

        let err = create_tag(
            &pool,
            &CreateTagRequest {
                name: "Supper".to_string(),
                color: "#8775d2".to_string(),
                slug: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
