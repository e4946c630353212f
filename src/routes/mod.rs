//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 인증 관련 (회원가입, 로그인, 토큰 갱신, 로그아웃)
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `ingredients`: 재료 카탈로그
//! - `recipes`: 레시피 CRUD, 즐겨찾기/장바구니, 쇼핑 리스트 다운로드
//! - `tags`: 태그 카탈로그
//! - `users`: 프로필과 구독

pub mod auth;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

// main.rs에서 `routes::list_recipes`처럼 바로 접근 가능하게 합니다.
pub use health::*;
pub use ingredients::*;
pub use recipes::*;
pub use tags::*;
pub use users::*;

/// 핸들러 테스트용 `AppState`
#[cfg(test)]
pub mod testing {
    use super::recipes::AppState;
    use crate::config::Limits;
    use crate::db;
    use crate::services::MediaStore;

    /// 인메모리 DB와 임시 미디어 디렉토리를 쓰는 상태. 디렉토리는 반환값이 살아 있는 동안 유지됩니다.
    pub async fn state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState {
            pool: db::testing::pool().await,
            jwt_secret: "test-secret".to_string(),
            limits: Limits::default(),
            media: MediaStore::new(dir.path(), "/media"),
        };
        (state, dir)
    }
}
