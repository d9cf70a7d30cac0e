//! 庫存品項與進貨紀錄模型

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 庫存品項
///
/// 「最近一次進貨成本」的快取欄位屬於 CRUD 層的顯示最佳化
/// （見 `costing-cache`），成本引擎一律以即時的進貨紀錄為準。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// 品項ID
    pub id: String,

    /// 品項名稱
    pub name: String,

    /// 計量單位（kg、L、pieces...）
    pub unit: String,

    /// 靜態參考成本（無進貨紀錄時的備援成本）
    pub static_cost: Option<Decimal>,
}

impl Item {
    /// 創建新的品項
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit: unit.into(),
            static_cost: None,
        }
    }

    /// 建構器模式：設置靜態參考成本
    pub fn with_static_cost(mut self, cost: Decimal) -> Self {
        self.static_cost = Some(cost);
        self
    }

    /// 檢查是否有靜態參考成本
    pub fn has_static_cost(&self) -> bool {
        self.static_cost.is_some()
    }
}

/// 進貨紀錄（不可變）
///
/// 由發票確認或手動入庫建立；成本引擎只讀取，永不修改或刪除。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    /// 紀錄ID
    pub id: Uuid,

    /// 品項ID
    pub item_id: String,

    /// 進貨數量
    pub quantity: Decimal,

    /// 當次進貨單位成本
    pub unit_cost: Decimal,

    /// 進貨時間
    pub recorded_at: DateTime<Utc>,

    /// 寫入序號（同一時間戳時，較大者視為較新）
    pub sequence: u64,
}

impl StockMovement {
    /// 創建新的進貨紀錄
    pub fn new(
        item_id: impl Into<String>,
        quantity: Decimal,
        unit_cost: Decimal,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id: item_id.into(),
            quantity,
            unit_cost,
            recorded_at,
            sequence: 0,
        }
    }

    /// 建構器模式：設置寫入序號
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// 排序鍵：先比時間戳，再比寫入序號
    pub fn ordering_key(&self) -> (DateTime<Utc>, u64) {
        (self.recorded_at, self.sequence)
    }
}
