//! 髒標記追蹤

use std::collections::HashSet;

/// 配方髒標記追蹤器
///
/// 記錄快照已過期的配方；重算時以 `drain` 取走整批髒配方。
#[derive(Debug, Default)]
pub struct DirtyTracker {
    dirty_recipes: HashSet<String>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記配方為髒
    pub fn mark_dirty(&mut self, recipe_id: impl Into<String>) {
        self.dirty_recipes.insert(recipe_id.into());
    }

    /// 批次標記
    pub fn mark_many<I>(&mut self, recipe_ids: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        for id in recipe_ids {
            self.dirty_recipes.insert(id.into());
        }
    }

    /// 檢查配方是否為髒
    pub fn is_dirty(&self, recipe_id: &str) -> bool {
        self.dirty_recipes.contains(recipe_id)
    }

    /// 是否沒有任何髒標記
    pub fn is_empty(&self) -> bool {
        self.dirty_recipes.is_empty()
    }

    /// 取走所有髒配方並清空
    pub fn drain(&mut self) -> Vec<String> {
        let mut ids: Vec<String> = self.dirty_recipes.drain().collect();
        ids.sort();
        ids
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_recipes.clear();
    }
}
