//! # Costing
//!
//! 餐飲後台的配方成本解析引擎
//!
//! 對每個配方遞迴解析成分成本（含子配方引用、損耗率與成本來源
//! 優先序），輸出批次總成本、每產出單位成本與獲利投影。
//! 引用圖由使用者編輯、不保證無環；引擎在解析時偵測循環並以
//! 旗標回報，絕不假設無環。
//!
//! - [`costing_core`]：資料模型、錯誤類型、資料來源介面
//! - [`costing_calc`]：成本來源解析、成分行計算、遞迴聚合、獲利投影
//! - [`costing_cache`]：顯示層快照與失效追蹤
//! - [`costing_report`]：菜單毛利報表

pub use costing_calc::{
    BatchCostResult, BatchFailure, CostSource, CostSourceResolver, CostingWarning,
    IngredientCostCalculator, LineCost, Profitability, ProfitabilityProjector,
    RecipeCostCalculator, RecipeCostResult, ResolvedUnitCost, WarningSeverity,
};
pub use costing_cache::{CostSnapshotCache, DirtyTracker, ReverseIndex};
pub use costing_core::{
    CostingError, InMemoryStore, IngredientLine, IngredientRef, Item, Recipe, RecipeDataSource,
    Result, StockDataSource, StockMovement, TraversalLimits,
};
pub use costing_report::{MarginReporter, MenuReport, MenuReportRow};
