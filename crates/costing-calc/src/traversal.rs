//! 遍歷防護：訪問路徑、請求範圍記憶化、上限檢查
//!
//! 兩者皆為「單次請求」的狀態：請求結束即丟棄，
//! 並行的成本請求之間沒有任何共享可變狀態。

use std::collections::HashMap;

use costing_core::{CostingError, Result, TraversalLimits};

use crate::RecipeCostResult;

/// 訪問路徑（顯式的 visiting 堆疊）
///
/// 路徑上已有的配方再次出現即為循環；同層兄弟節點彼此不影響，
/// 因為每個分支解析完就會 pop。
#[derive(Debug, Default)]
pub struct VisitPath {
    stack: Vec<String>,
}

impl VisitPath {
    /// 創建空路徑
    pub fn new() -> Self {
        Self::default()
    }

    /// 檢查配方是否已在路徑上（循環偵測）
    pub fn contains(&self, recipe_id: &str) -> bool {
        self.stack.iter().any(|id| id == recipe_id)
    }

    /// 進入配方
    pub fn push(&mut self, recipe_id: impl Into<String>) {
        self.stack.push(recipe_id.into());
    }

    /// 離開配方
    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// 當前深度
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// 請求範圍的計算上下文
///
/// 記憶化只在單次頂層請求內有效：請求之間的進貨資料可能改變，
/// 因此不跨請求共享。偵測到循環的結果不做記憶化——被截斷的
/// 祖先因進入點而異，其部分總額不可重用。
#[derive(Debug)]
pub struct RequestContext {
    memo: HashMap<String, RecipeCostResult>,
    visited: usize,
    total_visited: usize,
    limits: TraversalLimits,
}

impl RequestContext {
    /// 創建新的請求上下文
    pub fn new(limits: TraversalLimits) -> Self {
        Self {
            memo: HashMap::new(),
            visited: 0,
            total_visited: 0,
            limits,
        }
    }

    /// 查找記憶化結果
    pub fn memoized(&self, recipe_id: &str) -> Option<&RecipeCostResult> {
        self.memo.get(recipe_id)
    }

    /// 寫入記憶化結果（循環結果不寫入）
    pub fn memoize(&mut self, result: &RecipeCostResult) {
        if !result.cyclic {
            self.memo.insert(result.recipe_id.clone(), result.clone());
        }
    }

    /// 重設訪問配方數預算
    ///
    /// 批次請求在每個頂層配方開始前呼叫：記憶化快取整批共享，
    /// 但節點數上限以單一配方為單位，前一個配方爆量不株連後面的。
    pub fn reset_visit_budget(&mut self) {
        self.visited = 0;
    }

    /// 登記一次配方訪問並檢查上限
    pub fn register_visit(&mut self, recipe_id: &str, depth: usize) -> Result<()> {
        self.visited += 1;
        self.total_visited += 1;
        if depth >= self.limits.max_depth || self.visited > self.limits.max_recipes {
            return Err(CostingError::TraversalLimitExceeded {
                recipe_id: recipe_id.to_string(),
                depth,
                visited: self.visited,
            });
        }
        Ok(())
    }

    /// 整個請求累計訪問的配方次數（不受預算重設影響）
    pub fn visited_count(&self) -> usize {
        self.total_visited
    }
}
