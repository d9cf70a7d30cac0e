//! 成本快照快取與反向索引

use std::collections::{HashMap, HashSet, VecDeque};

use costing_calc::{RecipeCostCalculator, RecipeCostResult};
use costing_core::{IngredientRef, RecipeDataSource, Result, StockDataSource};

/// 引用圖的反向索引
///
/// 正向邊是「配方 → 成分」；失效需要反向查詢：
/// 一筆新進貨影響哪些配方、一個子配方被哪些配方（遞移地）使用。
#[derive(Debug, Default)]
pub struct ReverseIndex {
    /// 品項ID → 直接使用它的配方
    item_users: HashMap<String, Vec<String>>,

    /// 子配方ID → 直接引用它的父配方
    parents: HashMap<String, Vec<String>>,
}

impl ReverseIndex {
    /// 從配方資料來源建立索引
    pub fn build<R: RecipeDataSource>(recipes: &R) -> Result<Self> {
        let mut index = ReverseIndex::default();

        for recipe_id in recipes.recipe_ids()? {
            for line in recipes.ingredient_lines(&recipe_id)? {
                match &line.reference {
                    IngredientRef::Item(item_id) => {
                        index
                            .item_users
                            .entry(item_id.clone())
                            .or_default()
                            .push(recipe_id.clone());
                    }
                    IngredientRef::SubRecipe(sub_id) => {
                        index
                            .parents
                            .entry(sub_id.clone())
                            .or_default()
                            .push(recipe_id.clone());
                    }
                }
            }
        }

        Ok(index)
    }

    /// 配方本身加上所有（遞移的）父配方
    ///
    /// 以 visited 集合走訪，引用圖即使有環也會終止。
    pub fn dependents_of_recipe(&self, recipe_id: &str) -> Vec<String> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<String> = VecDeque::new();

        visited.insert(recipe_id.to_string());
        queue.push_back(recipe_id.to_string());

        while let Some(current) = queue.pop_front() {
            if let Some(parents) = self.parents.get(&current) {
                for parent in parents {
                    if visited.insert(parent.clone()) {
                        queue.push_back(parent.clone());
                    }
                }
            }
        }

        let mut result: Vec<String> = visited.into_iter().collect();
        result.sort();
        result
    }

    /// 受品項影響的所有配方（直接使用者及其遞移父配方）
    pub fn recipes_affected_by_item(&self, item_id: &str) -> Vec<String> {
        let mut affected: HashSet<String> = HashSet::new();

        if let Some(users) = self.item_users.get(item_id) {
            for user in users {
                affected.extend(self.dependents_of_recipe(user));
            }
        }

        let mut result: Vec<String> = affected.into_iter().collect();
        result.sort();
        result
    }
}

/// 顯示層成本快照快取
///
/// 讀取回傳可能過期的快照——這是刻意的取捨；
/// 需要精確數字的請求走引擎即時重算。
#[derive(Debug, Default)]
pub struct CostSnapshotCache {
    snapshots: HashMap<String, RecipeCostResult>,
    tracker: super::DirtyTracker,
    index: ReverseIndex,
}

impl CostSnapshotCache {
    /// 以既有反向索引創建快取
    pub fn new(index: ReverseIndex) -> Self {
        Self {
            snapshots: HashMap::new(),
            tracker: super::DirtyTracker::new(),
            index,
        }
    }

    /// 配方結構變更後重建反向索引
    pub fn set_index(&mut self, index: ReverseIndex) {
        self.index = index;
    }

    /// 讀取快照（可能過期）
    pub fn get(&self, recipe_id: &str) -> Option<&RecipeCostResult> {
        self.snapshots.get(recipe_id)
    }

    /// 檢查快照是否已過期
    pub fn is_stale(&self, recipe_id: &str) -> bool {
        self.tracker.is_dirty(recipe_id)
    }

    /// 新進貨紀錄到達：失效所有受該品項影響的快照
    pub fn invalidate_item(&mut self, item_id: &str) {
        self.tracker
            .mark_many(self.index.recipes_affected_by_item(item_id));
    }

    /// 配方（或其成分行）被編輯：失效其本身與遞移父配方
    pub fn invalidate_recipe(&mut self, recipe_id: &str) {
        self.tracker
            .mark_many(self.index.dependents_of_recipe(recipe_id));
    }

    /// 重算所有髒快照（一次批次請求，共享記憶化）
    ///
    /// 計算失敗的配方移除快照，留待下次讀取時即時重算。
    pub fn refresh<S, R>(&mut self, calc: &RecipeCostCalculator<'_, S, R>) -> usize
    where
        S: StockDataSource,
        R: RecipeDataSource,
    {
        let dirty = self.tracker.drain();
        if dirty.is_empty() {
            return 0;
        }

        let batch = calc.menu_costs(&dirty);
        let refreshed = batch.results.len();

        for failure in &batch.failures {
            self.snapshots.remove(&failure.recipe_id);
        }
        for result in batch.results {
            self.snapshots.insert(result.recipe_id.clone(), result);
        }

        refreshed
    }
}
