//! # 재료 카탈로그 쿼리 모듈
//!
//! ## 테이블 구조
//! - `ingredients`: 재료 엔티티 (id, name, measurement_unit, name_lower)
//!   `(name, measurement_unit)`에 UNIQUE 제약이 있습니다.
//!   `name_lower`는 `str::to_lowercase`로 채운 검색용 열입니다.

use crate::db::placeholders;
use crate::error::{is_unique_violation, AppError};
use crate::models::*;
use sqlx::SqlitePool;
use std::path::Path;

/// 재료 목록을 조회합니다.
///
/// `name_prefix`가 있으면 이름이 그 문자열로 시작하는 재료만 반환합니다.
/// 대소문자 구분 없는 접두사 검색입니다. 접두사와 `name_lower` 모두
/// 유니코드 소문자로 맞춘 뒤 비교하므로 "Абр"도 "абрикос"를 찾습니다.
/// 정렬은 이름 → 단위 순입니다.
pub async fn list_ingredients(
    pool: &SqlitePool,
    name_prefix: Option<&str>,
) -> Result<Vec<Ingredient>, AppError> {
    let ingredients = match name_prefix.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prefix) => {
            sqlx::query_as::<_, Ingredient>(
                r#"
                SELECT id, name, measurement_unit
                FROM ingredients
                WHERE name_lower LIKE ? ESCAPE '\'
                ORDER BY name, measurement_unit
                "#,
            )
            .bind(format!("{}%", escape_like(&prefix.to_lowercase())))
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Ingredient>(
                "SELECT id, name, measurement_unit FROM ingredients ORDER BY name, measurement_unit",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(ingredients)
}

/// ID로 재료 하나를 조회합니다.
pub async fn get_ingredient(pool: &SqlitePool, id: &str) -> Result<Option<Ingredient>, AppError> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        "SELECT id, name, measurement_unit FROM ingredients WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(ingredient)
}

/// 여러 ID를 한 번에 조회합니다. 존재하는 재료만 반환됩니다.
pub async fn get_ingredients_by_ids(
    pool: &SqlitePool,
    ids: &[String],
) -> Result<Vec<Ingredient>, AppError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT id, name, measurement_unit FROM ingredients WHERE id IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as::<_, Ingredient>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    Ok(query.fetch_all(pool).await?)
}

/// 새 재료를 카탈로그에 추가합니다.
///
/// 같은 `(name, measurement_unit)` 조합이 이미 있으면 `Conflict`를 반환합니다.
pub async fn create_ingredient(
    pool: &SqlitePool,
    req: &CreateIngredientRequest,
) -> Result<Ingredient, AppError> {
    let name = req.name.trim();
    let unit = req.measurement_unit.trim();
    if name.is_empty() {
        return Err(AppError::MissingField("name".to_string()));
    }
    if unit.is_empty() {
        return Err(AppError::MissingField("measurement_unit".to_string()));
    }

    let id = uuid::Uuid::now_v7().to_string();
    sqlx::query(
        "INSERT INTO ingredients (id, name, measurement_unit, name_lower) VALUES (?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(name)
    .bind(unit)
    .bind(name.to_lowercase())
    .execute(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("Ingredient {} ({}) already exists", name, unit))
        } else {
            e.into()
        }
    })?;

    get_ingredient(pool, &id)
        .await?
        .ok_or_else(|| AppError::Internal("Failed to retrieve created ingredient".to_string()))
}

/// `name_lower`가 비어 있는 행(열 추가 전에 들어온 행)을 채웁니다.
///
/// ## 반환값
/// 갱신한 행 수
pub async fn backfill_ingredient_name_lower(pool: &SqlitePool) -> Result<u64, AppError> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT id, name FROM ingredients WHERE name_lower = ''")
            .fetch_all(pool)
            .await?;
    if rows.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    for (id, name) in &rows {
        sqlx::query("UPDATE ingredients SET name_lower = ? WHERE id = ?")
            .bind(name.to_lowercase())
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(rows.len() as u64)
}

/// CSV 파일에서 재료 카탈로그를 채웁니다.
///
/// 각 줄은 `name,unit` 형식이며, 이미 있는 조합은 건너뜁니다 (get-or-create).
/// 이름에 쉼표가 들어갈 수 있으므로 마지막 쉼표를 기준으로 나눕니다.
///
/// ## 반환값
/// `(추가된 개수, 건너뛴 개수)`
pub async fn import_ingredients_csv(
    pool: &SqlitePool,
    path: &Path,
) -> Result<(u64, u64), AppError> {
    let content = tokio::fs::read_to_string(path).await?;
    let rows = parse_ingredients_csv(&content);

    let mut tx = pool.begin().await?;
    let mut inserted = 0;
    for (name, unit) in &rows {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO ingredients (id, name, measurement_unit, name_lower) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(uuid::Uuid::now_v7().to_string())
        .bind(name)
        .bind(unit)
        .bind(name.to_lowercase())
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }
    tx.commit().await?;

    Ok((inserted, rows.len() as u64 - inserted))
}

/// `name,unit` 줄들을 파싱합니다. 빈 줄과 필드가 빠진 줄은 무시합니다.
pub fn parse_ingredients_csv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let (name, unit) = line.rsplit_once(',')?;
            let name = name.trim().trim_matches('"').trim();
            let unit = unit.trim().trim_matches('"').trim();
            if name.is_empty() || unit.is_empty() {
                return None;
            }
            Some((name.to_string(), unit.to_string()))
        })
        .collect()
}

fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
