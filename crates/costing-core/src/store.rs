//! 資料來源介面與記憶體內實作
//!
//! 成本引擎只需要唯讀投影：品項、最新進貨紀錄、配方、成分行、
//! POS 售價對應。寫入一律由 CRUD 協作者負責。

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::item::{Item, StockMovement};
use crate::recipe::{IngredientLine, Recipe};
use crate::Result;

/// 庫存資料來源（唯讀）
pub trait StockDataSource {
    /// 依ID獲取品項
    fn item(&self, item_id: &str) -> Result<Option<Item>>;

    /// 獲取品項的最新進貨紀錄
    ///
    /// 「最新」以時間戳排序，時間戳相同時取寫入序號較大者
    /// （最近建立者優先），確保結果確定性。
    fn latest_movement(&self, item_id: &str) -> Result<Option<StockMovement>>;
}

/// 配方資料來源（唯讀）
pub trait RecipeDataSource {
    /// 依ID獲取配方
    fn recipe(&self, recipe_id: &str) -> Result<Option<Recipe>>;

    /// 獲取配方的成分行（依建立順序）
    fn ingredient_lines(&self, recipe_id: &str) -> Result<Vec<IngredientLine>>;

    /// 列舉所有配方ID（菜單報表與快取失效使用）
    fn recipe_ids(&self) -> Result<Vec<String>>;

    /// 獲取配方的售價（來自 POS 對應資料，可能不存在）
    fn sale_price(&self, recipe_id: &str) -> Result<Option<Decimal>>;
}

/// 記憶體內資料來源（測試與示例使用）
#[derive(Debug, Default)]
pub struct InMemoryStore {
    items: HashMap<String, Item>,
    movements: HashMap<String, Vec<StockMovement>>,
    recipes: BTreeMap<String, Recipe>,
    lines: HashMap<String, Vec<IngredientLine>>,
    sale_prices: HashMap<String, Decimal>,

    /// 進貨紀錄寫入序號（遞增）
    next_sequence: u64,

    /// 最新進貨查詢次數（記憶化測試的觀測點）
    movement_queries: Cell<usize>,
}

impl InMemoryStore {
    /// 創建空的資料來源
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入品項
    pub fn add_item(&mut self, item: Item) {
        self.items.insert(item.id.clone(), item);
    }

    /// 加入進貨紀錄（寫入序號由 store 指派）
    pub fn add_movement(&mut self, movement: StockMovement) {
        self.next_sequence += 1;
        let movement = movement.with_sequence(self.next_sequence);
        self.movements
            .entry(movement.item_id.clone())
            .or_default()
            .push(movement);
    }

    /// 加入配方
    pub fn add_recipe(&mut self, recipe: Recipe) {
        self.recipes.insert(recipe.id.clone(), recipe);
    }

    /// 加入成分行
    pub fn add_line(&mut self, line: IngredientLine) {
        self.lines.entry(line.recipe_id.clone()).or_default().push(line);
    }

    /// 設置售價（POS 對應）
    pub fn set_sale_price(&mut self, recipe_id: impl Into<String>, price: Decimal) {
        self.sale_prices.insert(recipe_id.into(), price);
    }

    /// 獲取最新進貨查詢次數
    pub fn movement_query_count(&self) -> usize {
        self.movement_queries.get()
    }

    /// 重置查詢計數
    pub fn reset_movement_query_count(&self) {
        self.movement_queries.set(0);
    }
}

impl StockDataSource for InMemoryStore {
    fn item(&self, item_id: &str) -> Result<Option<Item>> {
        Ok(self.items.get(item_id).cloned())
    }

    fn latest_movement(&self, item_id: &str) -> Result<Option<StockMovement>> {
        self.movement_queries.set(self.movement_queries.get() + 1);
        Ok(self
            .movements
            .get(item_id)
            .and_then(|list| list.iter().max_by_key(|m| m.ordering_key()))
            .cloned())
    }
}

impl RecipeDataSource for InMemoryStore {
    fn recipe(&self, recipe_id: &str) -> Result<Option<Recipe>> {
        Ok(self.recipes.get(recipe_id).cloned())
    }

    fn ingredient_lines(&self, recipe_id: &str) -> Result<Vec<IngredientLine>> {
        Ok(self.lines.get(recipe_id).cloned().unwrap_or_default())
    }

    fn recipe_ids(&self) -> Result<Vec<String>> {
        Ok(self.recipes.keys().cloned().collect())
    }

    fn sale_price(&self, recipe_id: &str) -> Result<Option<Decimal>> {
        Ok(self.sale_prices.get(recipe_id).copied())
    }
}
