//! 遍歷上限配置

use serde::{Deserialize, Serialize};

/// 配方遍歷上限
///
/// 循環由 visiting 集合保證終止；此上限另外約束「很深但無環」
/// 的鏈條與病態的扇出，超出時整個配方的計算以錯誤中止
/// （`CostingError::TraversalLimitExceeded`），而非悄悄截斷。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TraversalLimits {
    /// 最大遞迴深度
    pub max_depth: usize,

    /// 單次請求內最多訪問的不同配方數
    pub max_recipes: usize,
}

impl TraversalLimits {
    /// 創建配置（使用預設上限）
    pub fn new() -> Self {
        Self {
            max_depth: 64,
            max_recipes: 4096,
        }
    }

    /// 建構器模式：設置最大遞迴深度
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// 建構器模式：設置最大訪問配方數
    pub fn with_max_recipes(mut self, max_recipes: usize) -> Self {
        self.max_recipes = max_recipes;
        self
    }
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self::new()
    }
}
