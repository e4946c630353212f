//! # 쇼핑 리스트 집계 서비스
//!
//! 사용자의 장바구니에 담긴 모든 레시피의 재료 줄을 `(이름, 단위)`로 묶어
//! 합산하고, 다운로드용 텍스트 파일로 렌더링합니다.
//!
//! - 같은 이름이라도 단위가 다르면 다른 항목입니다 (`salt/g`, `salt/pinch`).
//! - 결과는 이름 → 단위 순으로 정렬되며, 같은 입력이면 항상 같은 출력입니다.
//! - 장바구니가 비어 있으면 `EmptyCart`로 실패합니다.

use std::collections::BTreeMap;

use crate::db;
use crate::error::AppError;
use crate::models::*;
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// 다운로드 파일 이름
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";
pub const SHOPPING_LIST_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// 집계된 쇼핑 리스트. 여러 번 순회할 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShoppingList {
    items: Vec<ShoppingItem>,
}

impl ShoppingList {
    pub fn iter(&self) -> std::slice::Iter<'_, ShoppingItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a ShoppingList {
    type Item = &'a ShoppingItem;
    type IntoIter = std::slice::Iter<'a, ShoppingItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// 렌더링된 파일
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListFile {
    pub filename: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

/// 재료 줄들을 `(이름, 단위)`로 묶어 합산합니다.
///
/// `BTreeMap` 키 순서가 곧 출력 순서입니다 (이름, 다음 단위의 바이트 순).
pub fn aggregate_lines<I>(lines: I) -> ShoppingList
where
    I: IntoIterator<Item = CartLine>,
{
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for line in lines {
        *totals
            .entry((line.name, line.measurement_unit))
            .or_insert(0) += line.amount;
    }

    let items = totals
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| ShoppingItem {
            name,
            measurement_unit,
            total_amount,
        })
        .collect();

    ShoppingList { items }
}

/// 사용자의 장바구니로부터 쇼핑 리스트를 만듭니다.
pub async fn aggregate(pool: &SqlitePool, user_id: &str) -> Result<ShoppingList, AppError> {
    if db::count_in_list(pool, ListKind::Cart, user_id).await? == 0 {
        return Err(AppError::EmptyCart);
    }

    let lines = db::cart_lines(pool, user_id).await?;
    let line_count = lines.len();
    let list = aggregate_lines(lines);
    if list.is_empty() {
        return Err(AppError::EmptyCart);
    }

    tracing::debug!(
        user_id,
        lines = line_count,
        items = list.len(),
        "shopping list aggregated"
    );
    Ok(list)
}

/// 쇼핑 리스트를 텍스트 파일로 렌더링합니다.
///
/// ```text
/// Shopping list for alice
/// Date: 2026-01-31
///
/// 1. carrot (g): 150
/// 2. salt (g): 5
///
/// Foodgram: cook with pleasure!
/// ```
pub fn render(list: &ShoppingList, user: &User, date: NaiveDate) -> ShoppingListFile {
    let mut body = format!(
        "Shopping list for {}\nDate: {}\n\n",
        user.username,
        date.format("%Y-%m-%d")
    );
    for (index, item) in list.iter().enumerate() {
        body.push_str(&format!(
            "{}. {} ({}): {}\n",
            index + 1,
            item.name,
            item.measurement_unit,
            item.total_amount
        ));
    }
    body.push_str("\nFoodgram: cook with pleasure!\n");

    ShoppingListFile {
        filename: SHOPPING_LIST_FILENAME,
        content_type: SHOPPING_LIST_CONTENT_TYPE,
        body,
    }
}
