//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `ingredient`: 재료 카탈로그
//! - `membership`: 즐겨찾기/장바구니 목록 종류
//! - `recipe`: 레시피와 요청/응답 구조체
//! - `shopping`: 쇼핑 리스트 집계 입력/출력
//! - `tag`: 태그
//! - `user`: 사용자, 인증, 구독
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Recipe`처럼 짧게 접근합니다.

pub mod ingredient;
pub mod membership;
pub mod recipe;
pub mod shopping;
pub mod tag;
pub mod user;

pub use ingredient::*;
pub use membership::*;
pub use recipe::*;
pub use shopping::*;
pub use tag::*;
pub use user::*;
