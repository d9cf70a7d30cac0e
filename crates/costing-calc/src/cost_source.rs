//! 成本來源解析
//!
//! 品項的「現時單位成本」優先序：最新進貨紀錄 > 靜態參考成本 > 缺少（零）。

use costing_core::{Item, Result, StockDataSource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 成本來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostSource {
    /// 最新進貨紀錄的成本
    Movement,
    /// 品項的靜態參考成本
    StaticCost,
    /// 無任何成本資料（單位成本為零，需回報）
    Missing,
}

/// 單位成本解析結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedUnitCost {
    /// 單位成本
    pub unit_cost: Decimal,

    /// 成本來源
    pub source: CostSource,
}

impl ResolvedUnitCost {
    /// 檢查是否缺少成本資料
    pub fn is_missing(&self) -> bool {
        self.source == CostSource::Missing
    }
}

/// 成本來源解析器（純讀取，無副作用）
pub struct CostSourceResolver;

impl CostSourceResolver {
    /// 解析品項的現時單位成本
    ///
    /// 有進貨紀錄時一律以進貨成本為準，不論靜態成本高低；
    /// 缺少成本不是錯誤，而是結果上的旗標。
    pub fn resolve<S: StockDataSource>(stock: &S, item: &Item) -> Result<ResolvedUnitCost> {
        if let Some(movement) = stock.latest_movement(&item.id)? {
            return Ok(ResolvedUnitCost {
                unit_cost: movement.unit_cost,
                source: CostSource::Movement,
            });
        }

        if let Some(static_cost) = item.static_cost {
            return Ok(ResolvedUnitCost {
                unit_cost: static_cost,
                source: CostSource::StaticCost,
            });
        }

        Ok(ResolvedUnitCost {
            unit_cost: Decimal::ZERO,
            source: CostSource::Missing,
        })
    }
}
