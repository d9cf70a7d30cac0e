//! # Costing Calculation Engine
//!
//! 配方成本解析引擎

pub mod aggregator;
pub mod cost_source;
pub mod ingredient;
pub mod profitability;
pub mod traversal;

// Re-export 主要類型
pub use aggregator::RecipeCostCalculator;
pub use cost_source::{CostSource, CostSourceResolver, ResolvedUnitCost};
pub use ingredient::{IngredientCostCalculator, LineCost};
pub use profitability::{Profitability, ProfitabilityProjector};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 配方成本計算結果
///
/// 「缺少成本」與「循環引用」是旗標而非錯誤：計算照常完成，
/// 呼叫端據此顯示「成本不完整」的警示，而不是把數字當成精確值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCostResult {
    /// 配方ID
    pub recipe_id: String,

    /// 一批次總成本
    pub total_cost: Decimal,

    /// 每產出單位成本（總成本 ÷ 產出數量）
    pub cost_per_yield_unit: Decimal,

    /// 缺少成本的成分行數（遞迴累計子配方）
    pub missing_cost_count: usize,

    /// 是否在解析過程中偵測到循環引用
    pub cyclic: bool,

    /// 各成分行的成本明細
    pub lines: Vec<LineCost>,

    /// 警告信息
    pub warnings: Vec<CostingWarning>,
}

impl RecipeCostResult {
    /// 創建空結果（零成本、無旗標）
    pub fn empty(recipe_id: impl Into<String>) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            total_cost: Decimal::ZERO,
            cost_per_yield_unit: Decimal::ZERO,
            missing_cost_count: 0,
            cyclic: false,
            lines: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// 創建循環引用的占位結果（不再往下遞迴）
    pub fn cyclic_stub(recipe_id: impl Into<String>) -> Self {
        let mut result = Self::empty(recipe_id);
        result.cyclic = true;
        result
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: CostingWarning) {
        self.warnings.push(warning);
    }

    /// 檢查結果是否完整（無缺少成本、無循環）
    pub fn is_complete(&self) -> bool {
        self.missing_cost_count == 0 && !self.cyclic
    }
}

/// 批次成本計算結果（菜單級請求）
#[derive(Debug)]
pub struct BatchCostResult {
    /// 各配方的計算結果
    pub results: Vec<RecipeCostResult>,

    /// 計算失敗的配方（例如超出遍歷上限）
    pub failures: Vec<BatchFailure>,
}

impl BatchCostResult {
    /// 創建空的批次結果
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// 依配方ID查找結果
    pub fn result_for(&self, recipe_id: &str) -> Option<&RecipeCostResult> {
        self.results.iter().find(|r| r.recipe_id == recipe_id)
    }
}

/// 批次中單一配方的失敗紀錄
#[derive(Debug)]
pub struct BatchFailure {
    pub recipe_id: String,
    pub error: costing_core::CostingError,
}

/// 成本計算警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostingWarning {
    pub recipe_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl CostingWarning {
    pub fn new(recipe_id: impl Into<String>, message: impl Into<String>, severity: WarningSeverity) -> Self {
        Self {
            recipe_id: recipe_id.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn info(recipe_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(recipe_id, message, WarningSeverity::Info)
    }

    pub fn warning(recipe_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(recipe_id, message, WarningSeverity::Warning)
    }

    pub fn error(recipe_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(recipe_id, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
