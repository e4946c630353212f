//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)와 서비스(services/)에서 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `follows`: 사용자 구독(Follow) 관계
//! - `ingredients`: 재료 카탈로그 조회/생성/CSV 가져오기
//! - `memberships`: 즐겨찾기/장바구니 목록과 장바구니 재료 줄
//! - `recipes`: 레시피 저장소 (행, 태그 연결, 재료 줄)
//! - `tags`: 태그 카탈로그
//! - `users`: 사용자 인증 관련 쿼리
//!
//! 트랜잭션 안에서 실행되어야 하는 함수는 `&mut SqliteConnection`을 받고,
//! 나머지는 `&SqlitePool`을 받습니다.

pub mod follows;
pub mod ingredients;
pub mod memberships;
pub mod recipes;
pub mod tags;
pub mod users;

pub use follows::*;
pub use ingredients::*;
pub use memberships::*;
pub use recipes::*;
pub use tags::*;

/// `?, ?, ?` 형태의 IN 절 자리표시자를 만듭니다.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// 테스트용 인메모리 DB와 픽스처
#[cfg(test)]
pub mod testing {
    use crate::models::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    /// 운영과 같은 마이그레이션을 적용한 인메모리 SQLite 풀
    ///
    /// `sqlite::memory:`는 연결마다 별도의 DB가 되므로 연결을 하나로 고정합니다.
    pub async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    pub async fn user(pool: &SqlitePool, username: &str) -> User {
        let id = uuid::Uuid::now_v7().to_string();
        super::users::create_user(
            pool,
            &id,
            &format!("{}@example.com", username),
            username,
            "Test",
            "User",
            "not-a-real-hash",
        )
        .await
        .unwrap()
    }

    pub async fn tag(pool: &SqlitePool, name: &str, color: &str) -> Tag {
        super::create_tag(
            pool,
            &CreateTagRequest {
                name: name.to_string(),
                color: color.to_string(),
                slug: None,
            },
        )
        .await
        .unwrap()
    }

    pub async fn ingredient(pool: &SqlitePool, name: &str, unit: &str) -> Ingredient {
        super::create_ingredient(
            pool,
            &CreateIngredientRequest {
                name: name.to_string(),
                measurement_unit: unit.to_string(),
            },
        )
        .await
        .unwrap()
    }

    /// 검증을 거치지 않고 레시피와 자식 행을 바로 저장합니다.
    pub async fn recipe(
        pool: &SqlitePool,
        author_id: &str,
        name: &str,
        tag_ids: &[String],
        lines: &[(&Ingredient, i64)],
    ) -> String {
        let id = uuid::Uuid::now_v7().to_string();
        let lines: Vec<IngredientLineInput> = lines
            .iter()
            .map(|(ingredient, amount)| IngredientLineInput {
                id: ingredient.id.clone(),
                amount: *amount,
            })
            .collect();

        let mut tx = pool.begin().await.unwrap();
        super::insert_recipe(
            &mut tx,
            &super::RecipeFields {
                id: &id,
                author_id,
                name,
                text: "Mix everything.",
                cooking_time: 10,
                image: "recipes/images/test.png",
            },
        )
        .await
        .unwrap();
        super::replace_children(&mut tx, &id, tag_ids, &lines)
            .await
            .unwrap();
        tx.commit().await.unwrap();
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_match_count() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
