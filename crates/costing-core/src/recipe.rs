//! 配方與成分行模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 配方（可販售品項或子配方）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// 配方ID
    pub id: String,

    /// 配方名稱
    pub name: String,

    /// 產出數量（一批次的產量）
    pub yield_quantity: Decimal,

    /// 產出單位（portion、pieces、L...）
    pub yield_unit: String,

    /// 是否為子配方（可作為其他配方的成分）
    pub is_sub_recipe: bool,

    /// 是否啟用
    pub is_active: bool,
}

impl Recipe {
    /// 創建新的配方
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        yield_quantity: Decimal,
        yield_unit: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            yield_quantity,
            yield_unit: yield_unit.into(),
            is_sub_recipe: false,
            is_active: true,
        }
    }

    /// 建構器模式：標記為子配方
    pub fn as_sub_recipe(mut self) -> Self {
        self.is_sub_recipe = true;
        self
    }

    /// 建構器模式：標記為停用
    pub fn as_inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// 檢查產出數量是否有效（> 0）
    pub fn has_valid_yield(&self) -> bool {
        self.yield_quantity > Decimal::ZERO
    }
}

/// 成分引用：品項或子配方，結構上保證「恰為其一」
///
/// 此即配方相依圖的邊；資料層不保證無環，
/// 引擎在解析時以 visiting 集合偵測並回報循環。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IngredientRef {
    /// 直接引用庫存品項
    Item(String),
    /// 引用另一個配方（子配方）
    SubRecipe(String),
}

impl IngredientRef {
    /// 檢查是否為子配方引用
    pub fn is_sub_recipe(&self) -> bool {
        matches!(self, IngredientRef::SubRecipe(_))
    }

    /// 獲取被引用的ID
    pub fn target_id(&self) -> &str {
        match self {
            IngredientRef::Item(id) => id,
            IngredientRef::SubRecipe(id) => id,
        }
    }
}

/// 成分行（屬於恰好一個配方）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientLine {
    /// 成分行ID
    pub id: Uuid,

    /// 所屬配方ID
    pub recipe_id: String,

    /// 成分引用（品項或子配方）
    pub reference: IngredientRef,

    /// 用量
    pub quantity: Decimal,

    /// 用量單位
    pub unit: String,

    /// 損耗率（0.05 = 5% 損耗）；負值為邊界驗證錯誤，引擎跳過該行並回報
    pub waste_factor: Decimal,

    /// 備註
    pub notes: Option<String>,
}

impl IngredientLine {
    /// 創建新的成分行
    pub fn new(
        recipe_id: impl Into<String>,
        reference: IngredientRef,
        quantity: Decimal,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipe_id: recipe_id.into(),
            reference,
            quantity,
            unit: unit.into(),
            waste_factor: Decimal::ZERO,
            notes: None,
        }
    }

    /// 建構器模式：設置損耗率
    pub fn with_waste_factor(mut self, waste_factor: Decimal) -> Self {
        self.waste_factor = waste_factor;
        self
    }

    /// 建構器模式：設置備註
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// 有效用量 = 用量 × (1 + 損耗率)
    pub fn effective_quantity(&self) -> Decimal {
        self.quantity * (Decimal::ONE + self.waste_factor)
    }

    /// 檢查損耗率是否有效（>= 0）
    pub fn has_valid_waste_factor(&self) -> bool {
        self.waste_factor >= Decimal::ZERO
    }
}
