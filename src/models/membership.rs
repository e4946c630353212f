//! # 사용자-레시피 목록 모델
//!
//! 즐겨찾기와 장바구니는 같은 모양의 `(user_id, recipe_id)` 쌍 테이블입니다.
//! 상속 대신 `ListKind`로 테이블을 선택하는 하나의 구현을 공유합니다.
//!
//! 각 `(user, recipe)` 쌍의 상태는 `absent` / `present` 두 가지뿐입니다.

use serde::Serialize;

/// 사용자별 레시피 목록의 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Favorites,
    Cart,
}

impl ListKind {
    /// 이 목록이 저장되는 테이블 이름
    ///
    /// SQL 문자열에 직접 삽입되므로 반드시 고정된 값만 반환해야 합니다.
    pub fn table(self) -> &'static str {
        match self {
            ListKind::Favorites => "favorites",
            ListKind::Cart => "shopping_cart",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ListKind::Favorites => "favorites",
            ListKind::Cart => "shopping cart",
        }
    }

    pub fn already_present_message(self) -> String {
        format!("Recipe is already in {}", self.label())
    }

    pub fn absent_message(self) -> String {
        format!("Recipe is not in {}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_kind_has_its_own_table() {
        assert_eq!(ListKind::Favorites.table(), "favorites");
        assert_eq!(ListKind::Cart.table(), "shopping_cart");
        assert_ne!(ListKind::Favorites.table(), ListKind::Cart.table());
    }

    #[test]
    fn messages_name_the_list() {
        assert_eq!(
            ListKind::Cart.already_present_message(),
            "Recipe is already in shopping cart"
        );
        assert_eq!(ListKind::Favorites.absent_message(), "Recipe is not in favorites");
    }
}
