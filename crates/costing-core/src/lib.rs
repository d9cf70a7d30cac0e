//! # Costing Core
//!
//! 核心資料模型與類型定義

pub mod config;
pub mod item;
pub mod recipe;
pub mod store;

// Re-export 主要類型
pub use config::TraversalLimits;
pub use item::{Item, StockMovement};
pub use recipe::{IngredientLine, IngredientRef, Recipe};
pub use store::{InMemoryStore, RecipeDataSource, StockDataSource};

/// 成本計算錯誤類型
///
/// 注意：「缺少成本」與「循環引用」不是錯誤，而是結果上的旗標，
/// 由呼叫端呈現給使用者（詳見 `costing-calc` 的結果類型）。
#[derive(Debug, thiserror::Error)]
pub enum CostingError {
    #[error("找不到配方: {0}")]
    RecipeNotFound(String),

    #[error("配方 {recipe_id} 遍歷超出上限（深度 {depth}，已訪問 {visited} 個配方）")]
    TraversalLimitExceeded {
        recipe_id: String,
        depth: usize,
        visited: usize,
    },

    #[error("資料讀取錯誤: {0}")]
    StoreError(String),

    #[error("計算錯誤: {0}")]
    CalculationError(String),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CostingError>;
