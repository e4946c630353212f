//! # 레시피 작성(Composer) 서비스
//!
//! 레시피를 태그 집합, 재료 줄 목록과 함께 검증하고 하나의 트랜잭션으로 저장합니다.
//!
//! ## 검증 순서
//! 1. 재료 목록이 있고 비어 있지 않음 → 아니면 `MissingField("ingredients")`
//! 2. 재료 ID 중복 없음 → 아니면 `DuplicateIngredient`
//! 3. 태그 목록과 나머지 필수 필드 → 아니면 `MissingField`
//! 4. 태그 ID 중복 없음 → 아니면 `DuplicateTag`
//! 5. 모든 재료/태그가 카탈로그에 존재 → 아니면 `UnknownIngredient` / `UnknownTag`
//! 6. `amount`, `cooking_time`, 이름 길이가 범위 안 → 아니면 `OutOfRange`
//!
//! 재료 중복 검사가 다른 필드 검사보다 앞에 있으므로, 재료가 중복된 요청은
//! 다른 필드 상태와 관계없이 항상 `DuplicateIngredient`로 실패합니다.
//! 모든 검증은 DB 쓰기 전에 끝납니다.
//!
//! ## 저장
//! 수정 시에도 태그 연결과 재료 줄은 차이를 계산하지 않고 통째로 교체합니다.
//! 트랜잭션이 커밋되기 전에 실패하면 아무것도 바뀌지 않습니다.

use std::collections::HashSet;

use crate::config::Limits;
use crate::db::{self, users as db_users, RecipeFields};
use crate::error::AppError;
use crate::models::*;
use crate::services::images::{decode_data_url, MediaStore};
use sqlx::SqlitePool;

/// 생성인지 수정인지에 따라 필수 필드가 달라집니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// 모든 필드 필수
    Create,
    /// `name`, `text`, `cooking_time`, `image`는 생략 가능 (기존 값 유지)
    Update,
}

/// 레시피 작성기. 요청마다 `AppState`에서 빌려 만듭니다.
pub struct Composer<'a> {
    pub pool: &'a SqlitePool,
    pub limits: &'a Limits,
    pub media: &'a MediaStore,
}

impl<'a> Composer<'a> {
    pub fn new(pool: &'a SqlitePool, limits: &'a Limits, media: &'a MediaStore) -> Self {
        Self { pool, limits, media }
    }

    /// 요청 본문 전체를 검증합니다 (규칙 1–6).
    pub async fn validate(&self, payload: &RecipePayload, mode: SaveMode) -> Result<(), AppError> {
        check_structure(payload, mode)?;
        check_catalog(self.pool, payload).await?;
        check_ranges(payload, self.limits)?;
        Ok(())
    }

    /// 새 레시피를 저장하고 완성된 응답을 반환합니다.
    pub async fn save_new(
        &self,
        author: &User,
        payload: &RecipePayload,
    ) -> Result<RecipeDetail, AppError> {
        self.validate(payload, SaveMode::Create).await?;

        let image = decode_data_url(required_text(&payload.image, "image")?)?;
        let tags = payload.tags.as_deref().unwrap_or_default();
        let lines = payload.ingredients.as_deref().unwrap_or_default();
        let cooking_time = payload
            .cooking_time
            .ok_or_else(|| AppError::MissingField("cooking_time".to_string()))?;

        let image_path = self.media.store(&image).await?;
        let id = uuid::Uuid::now_v7().to_string();
        let fields = RecipeFields {
            id: &id,
            author_id: &author.id,
            name: required_text(&payload.name, "name")?,
            text: required_text(&payload.text, "text")?,
            cooking_time,
            image: &image_path,
        };

        if let Err(e) = self.persist(&fields, tags, lines, SaveMode::Create).await {
            // 커밋되지 않은 레시피의 이미지는 아무도 참조하지 않음
            self.media.remove(&image_path).await;
            return Err(e);
        }

        tracing::info!(
            recipe_id = %id,
            author = %author.username,
            ingredients = lines.len(),
            tags = tags.len(),
            "recipe created"
        );

        let recipe = db::get_recipe(self.pool, &id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to retrieve created recipe".to_string()))?;
        self.materialize(recipe, Some(author)).await
    }

    /// 기존 레시피를 수정합니다.
    ///
    /// 작성자 본인 또는 관리자만 수정할 수 있습니다.
    /// 생략된 스칼라 필드는 기존 값을 유지하고, 태그와 재료는 통째로 교체됩니다.
    pub async fn save_update(
        &self,
        editor: &User,
        recipe_id: &str,
        payload: &RecipePayload,
    ) -> Result<RecipeDetail, AppError> {
        let existing = db::get_recipe(self.pool, recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;
        ensure_can_edit(editor, &existing)?;

        self.validate(payload, SaveMode::Update).await?;

        let tags = payload.tags.as_deref().unwrap_or_default();
        let lines = payload.ingredients.as_deref().unwrap_or_default();

        let new_image = match payload.image.as_deref().map(str::trim) {
            Some(data) if !data.is_empty() => {
                let image = decode_data_url(data)?;
                Some(self.media.store(&image).await?)
            }
            _ => None,
        };

        let fields = RecipeFields {
            id: &existing.id,
            author_id: &existing.author_id,
            name: optional_text(&payload.name).unwrap_or(&existing.name),
            text: optional_text(&payload.text).unwrap_or(&existing.text),
            cooking_time: payload.cooking_time.unwrap_or(existing.cooking_time),
            image: new_image.as_deref().unwrap_or(&existing.image),
        };

        match self.persist(&fields, tags, lines, SaveMode::Update).await {
            Ok(()) => {
                if new_image.is_some() {
                    self.media.remove(&existing.image).await;
                }
            }
            Err(e) => {
                if let Some(path) = &new_image {
                    self.media.remove(path).await;
                }
                return Err(e);
            }
        }

        tracing::info!(
            recipe_id = %existing.id,
            editor = %editor.username,
            ingredients = lines.len(),
            tags = tags.len(),
            "recipe updated"
        );

        let recipe = db::get_recipe(self.pool, recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;
        self.materialize(recipe, Some(editor)).await
    }

    /// 레시피를 삭제합니다. 작성자 본인 또는 관리자만 가능합니다.
    pub async fn delete(&self, editor: &User, recipe_id: &str) -> Result<(), AppError> {
        let existing = db::get_recipe(self.pool, recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;
        ensure_can_edit(editor, &existing)?;

        if !db::delete_recipe(self.pool, recipe_id).await? {
            return Err(AppError::not_found("Recipe"));
        }
        self.media.remove(&existing.image).await;

        tracing::info!(recipe_id, editor = %editor.username, "recipe deleted");
        Ok(())
    }

    /// 레시피 행, 태그 연결, 재료 줄을 하나의 트랜잭션으로 씁니다.
    ///
    /// `?`로 중간에 빠져나가면 `tx`가 drop되면서 롤백됩니다.
    async fn persist(
        &self,
        fields: &RecipeFields<'_>,
        tags: &[String],
        lines: &[IngredientLineInput],
        mode: SaveMode,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        match mode {
            SaveMode::Create => db::insert_recipe(&mut tx, fields).await?,
            SaveMode::Update => db::update_recipe_fields(&mut tx, fields).await?,
        }
        db::replace_children(&mut tx, fields.id, tags, lines).await?;

        tx.commit().await?;
        Ok(())
    }

    /// 저장된 레시피를 응답 형태로 채웁니다.
    ///
    /// 재료 이름/단위는 카탈로그를 통해, 이미지는 URL로 변환됩니다.
    /// `viewer`가 없으면(익명) 즐겨찾기/장바구니/구독 여부는 모두 false입니다.
    pub async fn materialize(
        &self,
        recipe: Recipe,
        viewer: Option<&User>,
    ) -> Result<RecipeDetail, AppError> {
        let author = db_users::find_by_id(self.pool, &recipe.author_id)
            .await?
            .ok_or_else(|| AppError::Internal("Recipe author is missing".to_string()))?;

        let (is_subscribed, is_favorited, is_in_shopping_cart) = match viewer {
            Some(viewer) => (
                db::is_following(self.pool, &viewer.id, &author.id).await?,
                db::is_in_list(self.pool, ListKind::Favorites, &viewer.id, &recipe.id).await?,
                db::is_in_list(self.pool, ListKind::Cart, &viewer.id, &recipe.id).await?,
            ),
            None => (false, false, false),
        };

        let tags = db::get_recipe_tags(self.pool, &recipe.id).await?;
        let ingredients = db::get_recipe_ingredients(self.pool, &recipe.id).await?;

        Ok(RecipeDetail {
            author: UserResponse::with_subscription(author, is_subscribed),
            image: self.media.url_for(&recipe.image),
            id: recipe.id,
            name: recipe.name,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
            tags,
            ingredients,
            is_favorited,
            is_in_shopping_cart,
            created_at: recipe.created_at,
        })
    }

    pub fn short(&self, recipe: Recipe) -> RecipeShort {
        RecipeShort {
            image: self.media.url_for(&recipe.image),
            id: recipe.id,
            name: recipe.name,
            cooking_time: recipe.cooking_time,
        }
    }
}

fn ensure_can_edit(editor: &User, recipe: &Recipe) -> Result<(), AppError> {
    if editor.id == recipe.author_id || editor.is_staff {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the author can change this recipe".to_string(),
        ))
    }
}

/// 규칙 1–4: 필수 필드와 중복 검사 (DB 접근 없음)
pub fn check_structure(payload: &RecipePayload, mode: SaveMode) -> Result<(), AppError> {
    let ingredients = match payload.ingredients.as_deref() {
        Some(lines) if !lines.is_empty() => lines,
        _ => return Err(AppError::MissingField("ingredients".to_string())),
    };

    let mut seen = HashSet::new();
    for line in ingredients {
        if !seen.insert(line.id.as_str()) {
            return Err(AppError::DuplicateIngredient(line.id.clone()));
        }
    }

    let tags = match payload.tags.as_deref() {
        Some(tags) if !tags.is_empty() => tags,
        _ => return Err(AppError::MissingField("tags".to_string())),
    };

    match mode {
        SaveMode::Create => {
            required_text(&payload.name, "name")?;
            required_text(&payload.text, "text")?;
            if payload.cooking_time.is_none() {
                return Err(AppError::MissingField("cooking_time".to_string()));
            }
            required_text(&payload.image, "image")?;
        }
        SaveMode::Update => {
            // 보냈다면 비어 있으면 안 됨
            for (value, field) in [(&payload.name, "name"), (&payload.text, "text")] {
                if value.is_some() {
                    required_text(value, field)?;
                }
            }
        }
    }

    let mut seen = HashSet::new();
    for tag in tags {
        if !seen.insert(tag.as_str()) {
            return Err(AppError::DuplicateTag(tag.clone()));
        }
    }

    Ok(())
}

/// 규칙 5: 참조한 재료와 태그가 모두 존재하는지 확인합니다.
///
/// 외래키 제약에 의존하지 않고 쓰기 전에 먼저 확인하므로,
/// 어떤 ID가 없는지 에러에 담을 수 있습니다.
pub async fn check_catalog(pool: &SqlitePool, payload: &RecipePayload) -> Result<(), AppError> {
    let lines = payload.ingredients.as_deref().unwrap_or_default();
    let ids: Vec<String> = lines.iter().map(|line| line.id.clone()).collect();
    let known: HashSet<String> = db::get_ingredients_by_ids(pool, &ids)
        .await?
        .into_iter()
        .map(|ingredient| ingredient.id)
        .collect();
    if let Some(missing) = ids.iter().find(|id| !known.contains(*id)) {
        return Err(AppError::UnknownIngredient(missing.clone()));
    }

    let tag_ids = payload.tags.as_deref().unwrap_or_default();
    let known: HashSet<String> = db::get_tags_by_ids(pool, tag_ids)
        .await?
        .into_iter()
        .map(|tag| tag.id)
        .collect();
    if let Some(missing) = tag_ids.iter().find(|id| !known.contains(*id)) {
        return Err(AppError::UnknownTag(missing.clone()));
    }

    Ok(())
}

/// 규칙 6: 수치 범위 검사
pub fn check_ranges(payload: &RecipePayload, limits: &Limits) -> Result<(), AppError> {
    for line in payload.ingredients.as_deref().unwrap_or_default() {
        if !(limits.min_amount..=limits.max_amount).contains(&line.amount) {
            return Err(AppError::OutOfRange {
                field: "amount".to_string(),
                min: limits.min_amount,
                max: limits.max_amount,
            });
        }
    }

    if let Some(cooking_time) = payload.cooking_time {
        if !(limits.min_cooking_time..=limits.max_cooking_time).contains(&cooking_time) {
            return Err(AppError::OutOfRange {
                field: "cooking_time".to_string(),
                min: limits.min_cooking_time,
                max: limits.max_cooking_time,
            });
        }
    }

    if let Some(name) = optional_text(&payload.name) {
        if name.chars().count() > limits.max_recipe_name_len {
            return Err(AppError::OutOfRange {
                field: "name".to_string(),
                min: 1,
                max: limits.max_recipe_name_len as i64,
            });
        }
    }

    Ok(())
}

/// 공백을 제거한 값이 비어 있지 않으면 반환합니다.
fn optional_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required_text<'v>(value: &'v Option<String>, field: &str) -> Result<&'v str, AppError> {
    optional_text(value).ok_or_else(|| AppError::MissingField(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing;

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn line(id: &str, amount: i64) -> IngredientLineInput {
        IngredientLineInput {
            id: id.to_string(),
            amount,
        }
    }

    fn payload(tags: &[&str], lines: Vec<IngredientLineInput>) -> RecipePayload {
        RecipePayload {
            name: Some("Carrot soup".to_string()),
            text: Some("Boil the carrots.".to_string()),
            cooking_time: Some(30),
            image: Some(PIXEL.to_string()),
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            ingredients: Some(lines),
        }
    }

    struct Env {
        pool: SqlitePool,
        limits: Limits,
        media: MediaStore,
        _dir: tempfile::TempDir,
    }

    impl Env {
        async fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            Self {
                pool: testing::pool().await,
                limits: Limits::default(),
                media: MediaStore::new(dir.path(), "/media"),
                _dir: dir,
            }
        }

        fn composer(&self) -> Composer<'_> {
            Composer::new(&self.pool, &self.limits, &self.media)
        }
    }

    #[test]
    fn missing_lists_fail_with_missing_field() {
        let mut p = payload(&["t1"], vec![]);
        assert!(matches!(
            check_structure(&p, SaveMode::Create),
            Err(AppError::MissingField(f)) if f == "ingredients"
        ));

        p.ingredients = Some(vec![line("i1", 1)]);
        p.tags = None;
        assert!(matches!(
            check_structure(&p, SaveMode::Create),
            Err(AppError::MissingField(f)) if f == "tags"
        ));
    }

    #[test]
    fn duplicate_ingredient_wins_over_other_invalid_fields() {
        let p = RecipePayload {
            ingredients: Some(vec![line("i1", 1), line("i2", 0), line("i1", 5)]),
            ..Default::default()
        };
        assert!(matches!(
            check_structure(&p, SaveMode::Create),
            Err(AppError::DuplicateIngredient(id)) if id == "i1"
        ));
        assert!(matches!(
            check_structure(&p, SaveMode::Update),
            Err(AppError::DuplicateIngredient(_))
        ));
    }

    #[test]
    fn duplicate_tag_is_rejected() {
        let p = payload(&["t1", "t2", "t1"], vec![line("i1", 1)]);
        assert!(matches!(
            check_structure(&p, SaveMode::Create),
            Err(AppError::DuplicateTag(id)) if id == "t1"
        ));
    }

    #[test]
    fn update_allows_omitted_scalars_but_not_blank_ones() {
        let mut p = RecipePayload {
            tags: Some(vec!["t1".to_string()]),
            ingredients: Some(vec![line("i1", 1)]),
            ..Default::default()
        };
        assert!(check_structure(&p, SaveMode::Update).is_ok());
        assert!(matches!(
            check_structure(&p, SaveMode::Create),
            Err(AppError::MissingField(f)) if f == "name"
        ));

        p.name = Some("   ".to_string());
        assert!(matches!(
            check_structure(&p, SaveMode::Update),
            Err(AppError::MissingField(f)) if f == "name"
        ));
    }

    #[test]
    fn ranges_are_inclusive() {
        let limits = Limits {
            min_amount: 1,
            max_amount: 10,
            min_cooking_time: 1,
            max_cooking_time: 60,
            max_recipe_name_len: 20,
        };

        let mut p = payload(&["t1"], vec![line("i1", 1), line("i2", 10)]);
        p.cooking_time = Some(60);
        assert!(check_ranges(&p, &limits).is_ok());

        p.ingredients = Some(vec![line("i1", 0)]);
        assert!(matches!(
            check_ranges(&p, &limits),
            Err(AppError::OutOfRange { field, .. }) if field == "amount"
        ));

        p.ingredients = Some(vec![line("i1", 5)]);
        p.cooking_time = Some(61);
        assert!(matches!(
            check_ranges(&p, &limits),
            Err(AppError::OutOfRange { field, .. }) if field == "cooking_time"
        ));

        p.cooking_time = Some(5);
        p.name = Some("x".repeat(21));
        assert!(matches!(
            check_ranges(&p, &limits),
            Err(AppError::OutOfRange { field, .. }) if field == "name"
        ));
    }

    #[tokio::test]
    async fn unknown_references_fail_before_any_write() {
        let env = Env::new().await;
        let author = testing::user(&env.pool, "chef").await;
        let tag = testing::tag(&env.pool, "Lunch", "#8775D2").await;
        let carrot = testing::ingredient(&env.pool, "carrot", "g").await;

        let p = payload(&[&tag.id], vec![line(&carrot.id, 1), line("ghost", 1)]);
        let err = env.composer().save_new(&author, &p).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownIngredient(id) if id == "ghost"));

        let p = payload(&["ghost-tag"], vec![line(&carrot.id, 1)]);
        let err = env.composer().save_new(&author, &p).await.unwrap_err();
        assert!(matches!(err, AppError::UnknownTag(_)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recipes")
            .fetch_one(&env.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn save_then_get_returns_same_children() {
        let env = Env::new().await;
        let author = testing::user(&env.pool, "chef").await;
        let lunch = testing::tag(&env.pool, "Lunch", "#8775D2").await;
        let dinner = testing::tag(&env.pool, "Dinner", "#49B64E").await;
        let carrot = testing::ingredient(&env.pool, "carrot", "g").await;
        let salt = testing::ingredient(&env.pool, "salt", "g").await;

        let p = payload(
            &[&lunch.id, &dinner.id],
            vec![line(&salt.id, 5), line(&carrot.id, 100)],
        );
        let created = env.composer().save_new(&author, &p).await.unwrap();

        let stored = db::get_recipe(&env.pool, &created.id).await.unwrap().unwrap();
        let detail = env.composer().materialize(stored, None).await.unwrap();

        let mut tag_ids: Vec<&str> = detail.tags.iter().map(|t| t.id.as_str()).collect();
        tag_ids.sort();
        let mut expected_tags = vec![lunch.id.as_str(), dinner.id.as_str()];
        expected_tags.sort();
        assert_eq!(tag_ids, expected_tags);

        let amounts: Vec<(&str, i64)> = detail
            .ingredients
            .iter()
            .map(|i| (i.id.as_str(), i.amount))
            .collect();
        assert_eq!(amounts, vec![(carrot.id.as_str(), 100), (salt.id.as_str(), 5)]);

        assert_eq!(detail.author.id, author.id);
        assert!(detail.image.starts_with("/media/recipes/images/"));
        assert!(!detail.is_favorited);
        assert!(!detail.is_in_shopping_cart);
    }

    #[tokio::test]
    async fn update_replaces_ingredients_and_keeps_omitted_fields() {
        let env = Env::new().await;
        let author = testing::user(&env.pool, "chef").await;
        let tag = testing::tag(&env.pool, "Lunch", "#8775D2").await;
        let carrot = testing::ingredient(&env.pool, "carrot", "g").await;
        let onion = testing::ingredient(&env.pool, "onion", "pcs").await;

        let created = env
            .composer()
            .save_new(&author, &payload(&[&tag.id], vec![line(&carrot.id, 100)]))
            .await
            .unwrap();

        let update = RecipePayload {
            cooking_time: Some(45),
            tags: Some(vec![tag.id.clone()]),
            ingredients: Some(vec![line(&onion.id, 2)]),
            ..Default::default()
        };
        let updated = env
            .composer()
            .save_update(&author, &created.id, &update)
            .await
            .unwrap();

        assert_eq!(updated.name, "Carrot soup");
        assert_eq!(updated.cooking_time, 45);
        assert_eq!(updated.image, created.image);
        assert_eq!(updated.ingredients.len(), 1);
        assert_eq!(updated.ingredients[0].id, onion.id);
        assert!(updated.ingredients.iter().all(|i| i.id != carrot.id));
    }

    #[tokio::test]
    async fn failed_update_changes_nothing() {
        let env = Env::new().await;
        let author = testing::user(&env.pool, "chef").await;
        let tag = testing::tag(&env.pool, "Lunch", "#8775D2").await;
        let carrot = testing::ingredient(&env.pool, "carrot", "g").await;

        let created = env
            .composer()
            .save_new(&author, &payload(&[&tag.id], vec![line(&carrot.id, 100)]))
            .await
            .unwrap();

        let bad = RecipePayload {
            tags: Some(vec![tag.id.clone()]),
            ingredients: Some(vec![line(&carrot.id, 0)]),
            ..Default::default()
        };
        let err = env
            .composer()
            .save_update(&author, &created.id, &bad)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OutOfRange { .. }));

        let lines = db::get_recipe_ingredients(&env.pool, &created.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].amount, 100);
    }

    #[tokio::test]
    async fn write_failure_midway_rolls_back_children() {
        let env = Env::new().await;
        let author = testing::user(&env.pool, "chef").await;
        let tag = testing::tag(&env.pool, "Lunch", "#8775D2").await;
        let carrot = testing::ingredient(&env.pool, "carrot", "g").await;
        let onion = testing::ingredient(&env.pool, "onion", "pcs").await;
        let id = testing::recipe(&env.pool, &author.id, "Soup", &[tag.id.clone()], &[(&carrot, 100)]).await;

        let fields = RecipeFields {
            id: &id,
            author_id: &author.id,
            name: "Changed",
            text: "Changed",
            cooking_time: 99,
            image: "recipes/images/test.png",
        };
        // 두 번째 줄이 외래키 제약에 걸려 트랜잭션 중간에 실패함
        let lines = vec![line(&onion.id, 1), line("ghost", 1)];
        let result = env
            .composer()
            .persist(&fields, &[tag.id.clone()], &lines, SaveMode::Update)
            .await;
        assert!(result.is_err());

        let stored = db::get_recipe(&env.pool, &id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Soup");
        let lines = db::get_recipe_ingredients(&env.pool, &id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, carrot.id);
        assert_eq!(db::get_recipe_tags(&env.pool, &id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn only_author_or_staff_may_edit() {
        let env = Env::new().await;
        let author = testing::user(&env.pool, "chef").await;
        let mut other = testing::user(&env.pool, "guest").await;
        let tag = testing::tag(&env.pool, "Lunch", "#8775D2").await;
        let carrot = testing::ingredient(&env.pool, "carrot", "g").await;

        let p = payload(&[&tag.id], vec![line(&carrot.id, 100)]);
        let created = env.composer().save_new(&author, &p).await.unwrap();

        let err = env
            .composer()
            .save_update(&other, &created.id, &p)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(matches!(
            env.composer().delete(&other, &created.id).await.unwrap_err(),
            AppError::Forbidden(_)
        ));

        other.is_staff = true;
        env.composer().delete(&other, &created.id).await.unwrap();
        assert!(db::get_recipe(&env.pool, &created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_of_missing_recipe_is_not_found() {
        let env = Env::new().await;
        let author = testing::user(&env.pool, "chef").await;
        let p = payload(&["t1"], vec![line("i1", 1)]);

        let err = env
            .composer()
            .save_update(&author, "missing", &p)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
