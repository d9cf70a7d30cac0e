//! # Costing Report
//!
//! 菜單毛利報表（成本儀表板的批次讀取）

pub mod margin;

// Re-export 主要類型
pub use margin::MarginReporter;

use costing_calc::{BatchFailure, Profitability, RecipeCostResult};
use rust_decimal::Decimal;
use serde::Serialize;

/// 菜單毛利報表
#[derive(Debug)]
pub struct MenuReport {
    /// 各菜色的報表列
    pub rows: Vec<MenuReportRow>,

    /// 計算失敗的配方
    pub failures: Vec<BatchFailure>,
}

impl MenuReport {
    /// 創建空報表
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// 依毛利率由低到高排序（無定價的菜色排在最後）
    ///
    /// 儀表板的預設視圖：最需要檢討定價的菜色排最前面。
    pub fn sorted_by_margin(mut self) -> Self {
        self.rows.sort_by(|a, b| {
            match (a.profitability.margin_pct, b.profitability.margin_pct) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.recipe_id.cmp(&b.recipe_id),
            }
        });
        self
    }

    /// 成本不完整（缺少成本或循環）的列數
    pub fn incomplete_count(&self) -> usize {
        self.rows.iter().filter(|row| !row.cost.is_complete()).count()
    }
}

/// 報表列：一道菜的成本、售價與獲利
#[derive(Debug, Clone, Serialize)]
pub struct MenuReportRow {
    /// 配方ID
    pub recipe_id: String,

    /// 配方名稱
    pub name: String,

    /// 售價（POS 對應；可能不存在）
    pub sale_price: Option<Decimal>,

    /// 成本計算結果
    pub cost: RecipeCostResult,

    /// 獲利投影
    pub profitability: Profitability,
}
