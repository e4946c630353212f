//! # 쇼핑 리스트 모델

use serde::Serialize;

/// 장바구니 레시피의 재료 줄 하나 (집계 전)
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// `(이름, 단위)`별로 합산된 쇼핑 리스트 항목
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingItem {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}
