//! # 서비스 계층
//!
//! 라우트 핸들러와 DB 계층 사이의 비즈니스 로직입니다.
//! - `composer`: 레시피 검증과 원자적 저장 (태그, 재료 줄 포함)
//! - `images`: 레시피 이미지 디코딩/저장과 URL 계산
//! - `shopping_list`: 장바구니 재료 집계와 텍스트 렌더링

pub mod composer;
pub mod images;
pub mod shopping_list;

pub use composer::*;
pub use images::*;
pub use shopping_list::*;
