//! 菜單毛利報表產生器

use costing_calc::{ProfitabilityProjector, RecipeCostCalculator};
use costing_core::{RecipeDataSource, Result, StockDataSource};

use crate::{MenuReport, MenuReportRow};

/// 毛利報表產生器
pub struct MarginReporter;

impl MarginReporter {
    /// 產生菜單毛利報表
    ///
    /// 範圍是所有啟用的非子配方（可販售的菜色），整批共用一次
    /// 批次成本請求；售價缺席的菜色照列，獲利欄為 None。
    pub fn build<S, R>(calc: &RecipeCostCalculator<'_, S, R>, recipes: &R) -> Result<MenuReport>
    where
        S: StockDataSource,
        R: RecipeDataSource,
    {
        // 報表範圍：啟用的可販售菜色
        let mut menu: Vec<(String, String)> = Vec::new();
        for recipe_id in recipes.recipe_ids()? {
            if let Some(recipe) = recipes.recipe(&recipe_id)? {
                if recipe.is_active && !recipe.is_sub_recipe {
                    menu.push((recipe.id, recipe.name));
                }
            }
        }

        tracing::info!("產生菜單毛利報表：{} 道菜色", menu.len());

        let ids: Vec<String> = menu.iter().map(|(id, _)| id.clone()).collect();
        let batch = calc.menu_costs(&ids);

        let mut report = MenuReport::empty();
        report.failures = batch.failures;

        for (recipe_id, name) in menu {
            let Some(cost) = batch
                .results
                .iter()
                .find(|result| result.recipe_id == recipe_id)
            else {
                // 計算失敗的配方已記錄於 failures
                continue;
            };

            let sale_price = recipes.sale_price(&recipe_id)?;
            let profitability =
                ProfitabilityProjector::project(cost.cost_per_yield_unit, sale_price);

            report.rows.push(MenuReportRow {
                recipe_id,
                name,
                sale_price,
                cost: cost.clone(),
                profitability,
            });
        }

        Ok(report)
    }
}
