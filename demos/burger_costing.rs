//! 單一配方成本解析示例

use chrono::{TimeZone, Utc};
use costing::{
    IngredientLine, IngredientRef, InMemoryStore, Item, ProfitabilityProjector, Recipe,
    RecipeCostCalculator, StockMovement,
};
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    println!("=== 配方成本解析示例 ===\n");

    let mut store = InMemoryStore::new();

    // 品項：牛絞肉有進貨紀錄（8/kg），麵粉只有靜態成本
    store.add_item(Item::new("BEEF", "牛絞肉", "kg").with_static_cost(Decimal::from(9)));
    store.add_movement(StockMovement::new(
        "BEEF",
        Decimal::from(10),
        Decimal::from(8),
        Utc.with_ymd_and_hms(2026, 8, 25, 7, 30, 0).unwrap(),
    ));
    store.add_item(Item::new("FLOUR", "麵粉", "kg").with_static_cost(Decimal::ONE));

    // 子配方：一批 4 件漢堡麵包
    store.add_recipe(Recipe::new("BUN", "漢堡麵包", Decimal::from(4), "pieces").as_sub_recipe());
    store.add_line(IngredientLine::new(
        "BUN",
        IngredientRef::Item("FLOUR".to_string()),
        Decimal::new(4, 1),
        "kg",
    ));

    // 菜色：招牌漢堡（0.2 kg 牛肉、5% 損耗，外加 1 件麵包）
    store.add_recipe(Recipe::new("BURGER", "招牌漢堡", Decimal::ONE, "portion"));
    store.add_line(
        IngredientLine::new(
            "BURGER",
            IngredientRef::Item("BEEF".to_string()),
            Decimal::new(2, 1),
            "kg",
        )
        .with_waste_factor(Decimal::new(5, 2)),
    );
    store.add_line(IngredientLine::new(
        "BURGER",
        IngredientRef::SubRecipe("BUN".to_string()),
        Decimal::ONE,
        "pieces",
    ));
    store.set_sale_price("BURGER", Decimal::from(6));

    let calc = RecipeCostCalculator::new(&store, &store);
    let result = calc.recipe_cost("BURGER")?;

    println!("配方: {}", result.recipe_id);
    println!("成分明細:");
    for line in &result.lines {
        println!(
            "  - {:?}: 有效用量 {} × 單位成本 {} = {}",
            line.reference, line.effective_quantity, line.unit_cost, line.cost
        );
    }
    println!("批次總成本: {}", result.total_cost);
    println!("每份成本:   {}", result.cost_per_yield_unit);

    let profitability =
        ProfitabilityProjector::project(result.cost_per_yield_unit, Some(Decimal::from(6)));
    if let (Some(profit), Some(margin)) = (profitability.profit, profitability.margin_pct) {
        println!("售價 6.00 => 利潤 {}，毛利率 {}%", profit, margin.round_dp(1));
    }

    for warning in &result.warnings {
        println!("警告: {}", warning.message);
    }

    Ok(())
}
