//! 獲利投影
//!
//! 在聚合器輸出之上的純函數：售價來自 POS 對應資料（外部協作者），
//! 沒有售價就是沒有資料——輸出為 None，不是零，也不是錯誤。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 獲利投影結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Profitability {
    /// 利潤（售價 − 每產出單位成本）
    pub profit: Option<Decimal>,

    /// 毛利率（利潤 ÷ 售價 × 100）；售價為零時無定義
    pub margin_pct: Option<Decimal>,
}

impl Profitability {
    /// 無定價資料的結果
    pub fn unpriced() -> Self {
        Self {
            profit: None,
            margin_pct: None,
        }
    }
}

/// 獲利投影器（純函數）
pub struct ProfitabilityProjector;

impl ProfitabilityProjector {
    /// 計算利潤與毛利率
    ///
    /// 售價為零時利潤照算、毛利率回報無定義（顯式守衛除零，
    /// 不產生無限大或 NaN）。
    pub fn project(cost_per_yield_unit: Decimal, sale_price: Option<Decimal>) -> Profitability {
        let Some(sale_price) = sale_price else {
            return Profitability::unpriced();
        };

        let profit = sale_price - cost_per_yield_unit;
        let margin_pct = if sale_price > Decimal::ZERO {
            Some(profit / sale_price * Decimal::ONE_HUNDRED)
        } else {
            None
        };

        Profitability {
            profit: Some(profit),
            margin_pct,
        }
    }
}
