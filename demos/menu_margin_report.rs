//! 菜單毛利報表示例（批次成本 + 獲利投影）

use costing::{
    IngredientLine, IngredientRef, InMemoryStore, Item, MarginReporter, Recipe,
    RecipeCostCalculator,
};
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    println!("=== 菜單毛利報表示例 ===\n");

    let mut store = InMemoryStore::new();
    store.add_item(Item::new("BEEF", "牛絞肉", "kg").with_static_cost(Decimal::from(8)));
    store.add_item(Item::new("POTATO", "馬鈴薯", "kg").with_static_cost(Decimal::ONE));
    store.add_item(Item::new("TOMATO", "番茄", "kg").with_static_cost(Decimal::from(2)));

    // 共用的子配方：番茄醬底
    store.add_recipe(Recipe::new("SAUCE", "番茄醬底", Decimal::from(2), "L").as_sub_recipe());
    store.add_line(IngredientLine::new(
        "SAUCE",
        IngredientRef::Item("TOMATO".to_string()),
        Decimal::from(3),
        "kg",
    ));

    // 三道菜色，兩道有定價
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
        IngredientRef::SubRecipe("SAUCE".to_string()),
        Decimal::new(5, 2),
        "L",
    ));
    store.set_sale_price("BURGER", Decimal::from(6));

    store.add_recipe(Recipe::new("FRIES", "薯條", Decimal::ONE, "portion"));
    store.add_line(IngredientLine::new(
        "FRIES",
        IngredientRef::Item("POTATO".to_string()),
        Decimal::new(3, 1),
        "kg",
    ));
    store.set_sale_price("FRIES", Decimal::from(3));

    store.add_recipe(Recipe::new("SOUP", "例湯", Decimal::ONE, "portion"));
    store.add_line(IngredientLine::new(
        "SOUP",
        IngredientRef::SubRecipe("SAUCE".to_string()),
        Decimal::new(2, 1),
        "L",
    ));

    let calc = RecipeCostCalculator::new(&store, &store);
    let report = MarginReporter::build(&calc, &store)?.sorted_by_margin();

    println!("{:<10} {:<12} {:>8} {:>8} {:>8}", "配方", "名稱", "成本", "售價", "毛利率");
    for row in &report.rows {
        let sale = row
            .sale_price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let margin = row
            .profitability
            .margin_pct
            .map(|m| format!("{}%", m.round_dp(1)))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<12} {:>8} {:>8} {:>8}",
            row.recipe_id, row.name, row.cost.cost_per_yield_unit, sale, margin
        );
    }

    if report.incomplete_count() > 0 {
        println!("\n注意：{} 道菜色的成本不完整（缺少成本或循環引用）", report.incomplete_count());
    }

    Ok(())
}
