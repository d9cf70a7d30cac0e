//! 配方成本聚合器
//!
//! 遞迴核心：把成分行成本加總為批次總成本，推導每產出單位成本，
//! 並在不保證無環的引用圖上保證終止。

use costing_core::{
    CostingError, IngredientRef, Recipe, RecipeDataSource, Result, StockDataSource,
    TraversalLimits,
};
use rust_decimal::Decimal;

use crate::cost_source::CostSourceResolver;
use crate::ingredient::IngredientCostCalculator;
use crate::traversal::{RequestContext, VisitPath};
use crate::{BatchCostResult, BatchFailure, CostingWarning, RecipeCostResult};

/// 配方成本計算器
///
/// 持有唯讀資料來源與遍歷上限；本身無狀態，
/// 每次請求各自配置 visiting 路徑與記憶化快取。
pub struct RecipeCostCalculator<'a, S, R> {
    /// 庫存資料來源
    stock: &'a S,

    /// 配方資料來源
    recipes: &'a R,

    /// 遍歷上限
    limits: TraversalLimits,
}

impl<'a, S, R> RecipeCostCalculator<'a, S, R>
where
    S: StockDataSource,
    R: RecipeDataSource,
{
    /// 創建新的計算器（使用預設遍歷上限）
    pub fn new(stock: &'a S, recipes: &'a R) -> Self {
        Self {
            stock,
            recipes,
            limits: TraversalLimits::default(),
        }
    }

    /// 建構器模式：設置遍歷上限
    pub fn with_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// 單一配方成本請求
    ///
    /// 每次呼叫配置獨立的請求上下文；兩個頂層請求互不干擾。
    pub fn recipe_cost(&self, recipe_id: &str) -> Result<RecipeCostResult> {
        let recipe = self
            .recipes
            .recipe(recipe_id)?
            .ok_or_else(|| CostingError::RecipeNotFound(recipe_id.to_string()))?;

        let mut ctx = RequestContext::new(self.limits);
        let mut path = VisitPath::new();
        self.resolve_recipe(&recipe, &mut ctx, &mut path)
    }

    /// 批次成本請求（菜單級）
    ///
    /// 整批共享同一個記憶化快取：共用的子配方每批只計算一次。
    /// 遍歷上限以單一頂層配方為單位計算，超出者只記入 failures，
    /// 不中止整批也不影響之後的配方。
    pub fn menu_costs(&self, recipe_ids: &[String]) -> BatchCostResult {
        tracing::info!("開始批次成本計算：{} 個配方", recipe_ids.len());

        let mut ctx = RequestContext::new(self.limits);
        let mut batch = BatchCostResult::empty();

        for recipe_id in recipe_ids {
            let recipe = match self.recipes.recipe(recipe_id) {
                Ok(Some(recipe)) => recipe,
                Ok(None) => {
                    batch.failures.push(BatchFailure {
                        recipe_id: recipe_id.clone(),
                        error: CostingError::RecipeNotFound(recipe_id.clone()),
                    });
                    continue;
                }
                Err(error) => {
                    batch.failures.push(BatchFailure {
                        recipe_id: recipe_id.clone(),
                        error,
                    });
                    continue;
                }
            };

            ctx.reset_visit_budget();
            let mut path = VisitPath::new();
            match self.resolve_recipe(&recipe, &mut ctx, &mut path) {
                Ok(result) => batch.results.push(result),
                Err(error) => {
                    tracing::warn!("配方 {} 成本計算失敗: {}", recipe_id, error);
                    batch.failures.push(BatchFailure {
                        recipe_id: recipe_id.clone(),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            "批次成本計算完成：成功 {} 筆，失敗 {} 筆，共訪問 {} 個配方",
            batch.results.len(),
            batch.failures.len(),
            ctx.visited_count()
        );

        batch
    }

    /// 遞迴解析單一配方
    fn resolve_recipe(
        &self,
        recipe: &Recipe,
        ctx: &mut RequestContext,
        path: &mut VisitPath,
    ) -> Result<RecipeCostResult> {
        // Step 1: 循環偵測——路徑上已有此配方即不再往下
        if path.contains(&recipe.id) {
            tracing::debug!("偵測到循環引用: {}（路徑深度 {}）", recipe.id, path.depth());
            let mut stub = RecipeCostResult::cyclic_stub(&recipe.id);
            stub.add_warning(CostingWarning::warning(
                &recipe.id,
                format!("配方 {} 的子配方引用構成循環", recipe.id),
            ));
            return Ok(stub);
        }

        // Step 2: 請求範圍記憶化
        if let Some(memoized) = ctx.memoized(&recipe.id) {
            return Ok(memoized.clone());
        }

        // Step 3: 上限檢查（深度與訪問配方數）
        ctx.register_visit(&recipe.id, path.depth())?;
        path.push(&recipe.id);

        tracing::debug!("計算配方成本: {}（深度 {}）", recipe.id, path.depth());

        // Step 4: 逐成分行計算
        let lines = match self.recipes.ingredient_lines(&recipe.id) {
            Ok(lines) => lines,
            Err(error) => {
                path.pop();
                return Err(error);
            }
        };

        let mut result = RecipeCostResult::empty(&recipe.id);

        for line in &lines {
            // 負損耗率屬邊界驗證錯誤：跳過該行並回報，不影響其他行
            if !line.has_valid_waste_factor() {
                result.add_warning(CostingWarning::error(
                    &recipe.id,
                    format!("成分行 {} 的損耗率為負值（{}），已跳過", line.id, line.waste_factor),
                ));
                continue;
            }

            match &line.reference {
                IngredientRef::Item(item_id) => {
                    let line_cost = match self.stock.item(item_id) {
                        Ok(Some(item)) => {
                            let resolved = match CostSourceResolver::resolve(self.stock, &item) {
                                Ok(resolved) => resolved,
                                Err(error) => {
                                    path.pop();
                                    return Err(error);
                                }
                            };
                            IngredientCostCalculator::item_line(line, resolved)
                        }
                        Ok(None) => {
                            // 品項已被刪除：視同缺少成本，不讓整個配方失敗
                            result.add_warning(CostingWarning::warning(
                                &recipe.id,
                                format!("成分行 {} 引用不存在的品項 {}", line.id, item_id),
                            ));
                            let missing = crate::cost_source::ResolvedUnitCost {
                                unit_cost: Decimal::ZERO,
                                source: crate::cost_source::CostSource::Missing,
                            };
                            IngredientCostCalculator::item_line(line, missing)
                        }
                        Err(error) => {
                            path.pop();
                            return Err(error);
                        }
                    };

                    if line_cost.missing_cost {
                        result.missing_cost_count += 1;
                    }
                    result.total_cost += line_cost.cost;
                    result.lines.push(line_cost);
                }

                IngredientRef::SubRecipe(sub_id) => {
                    let sub_recipe = match self.recipes.recipe(sub_id) {
                        Ok(sub_recipe) => sub_recipe,
                        Err(error) => {
                            path.pop();
                            return Err(error);
                        }
                    };

                    let Some(sub_recipe) = sub_recipe else {
                        // 子配方已被刪除：視同缺少成本
                        result.add_warning(CostingWarning::warning(
                            &recipe.id,
                            format!("成分行 {} 引用不存在的子配方 {}", line.id, sub_id),
                        ));
                        result.missing_cost_count += 1;
                        let mut stub = RecipeCostResult::empty(sub_id.clone());
                        stub.missing_cost_count = 1;
                        result
                            .lines
                            .push(IngredientCostCalculator::sub_recipe_line(line, &stub));
                        continue;
                    };

                    // 單位不一致屬資料品質問題：回報警告，不嘗試換算
                    if line.unit != sub_recipe.yield_unit {
                        result.add_warning(CostingWarning::warning(
                            &recipe.id,
                            format!(
                                "成分行 {} 的單位（{}）與子配方 {} 的產出單位（{}）不一致",
                                line.id, line.unit, sub_recipe.id, sub_recipe.yield_unit
                            ),
                        ));
                    }
                    if !sub_recipe.is_active {
                        result.add_warning(CostingWarning::info(
                            &recipe.id,
                            format!("子配方 {} 已停用", sub_recipe.id),
                        ));
                    }

                    let sub_result = match self.resolve_recipe(&sub_recipe, ctx, path) {
                        Ok(sub_result) => sub_result,
                        Err(error) => {
                            path.pop();
                            return Err(error);
                        }
                    };

                    let line_cost = IngredientCostCalculator::sub_recipe_line(line, &sub_result);

                    // 子配方的旗標與警告向上傳遞；循環分支仍加總其他行
                    result.missing_cost_count += sub_result.missing_cost_count;
                    result.cyclic |= sub_result.cyclic;
                    result.warnings.extend(sub_result.warnings);
                    result.total_cost += line_cost.cost;
                    result.lines.push(line_cost);
                }
            }
        }

        // Step 5: 每產出單位成本；產出數量無效視同缺少成本，而非除零錯誤
        if recipe.has_valid_yield() {
            result.cost_per_yield_unit = result.total_cost / recipe.yield_quantity;
        } else {
            result.add_warning(CostingWarning::warning(
                &recipe.id,
                format!("配方 {} 的產出數量無效（{}）", recipe.id, recipe.yield_quantity),
            ));
            result.missing_cost_count += 1;
            result.cost_per_yield_unit = Decimal::ZERO;
        }

        path.pop();

        // Step 6: 完成的結果寫入記憶化（循環結果除外）
        ctx.memoize(&result);

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costing_core::{InMemoryStore, IngredientLine, Item, StockMovement};
    use chrono::{TimeZone, Utc};

    fn item_line(recipe_id: &str, item_id: &str, quantity: Decimal) -> IngredientLine {
        IngredientLine::new(
            recipe_id,
            IngredientRef::Item(item_id.to_string()),
            quantity,
            "kg",
        )
    }

    fn sub_line(recipe_id: &str, sub_id: &str, quantity: Decimal, unit: &str) -> IngredientLine {
        IngredientLine::new(
            recipe_id,
            IngredientRef::SubRecipe(sub_id.to_string()),
            quantity,
            unit,
        )
    }

    #[test]
    fn test_empty_recipe_costs_zero() {
        let mut store = InMemoryStore::new();
        store.add_recipe(Recipe::new("EMPTY", "空配方", Decimal::from(2), "portion"));

        let calc = RecipeCostCalculator::new(&store, &store);
        let result = calc.recipe_cost("EMPTY").unwrap();

        assert_eq!(result.total_cost, Decimal::ZERO);
        assert_eq!(result.cost_per_yield_unit, Decimal::ZERO);
        assert_eq!(result.missing_cost_count, 0);
        assert!(!result.cyclic);
        assert!(result.is_complete());
    }

    #[test]
    fn test_unknown_recipe_is_an_error() {
        let store = InMemoryStore::new();
        let calc = RecipeCostCalculator::new(&store, &store);

        let err = calc.recipe_cost("NOPE").unwrap_err();
        assert!(matches!(err, CostingError::RecipeNotFound(_)));
    }

    #[test]
    fn test_static_cost_line() {
        // q × (1 + w) × C = 2 × 1.1 × 5 = 11
        let mut store = InMemoryStore::new();
        store.add_item(Item::new("FLOUR", "麵粉", "kg").with_static_cost(Decimal::from(5)));
        store.add_recipe(Recipe::new("DOUGH", "麵團", Decimal::ONE, "batch"));
        store.add_line(
            item_line("DOUGH", "FLOUR", Decimal::from(2)).with_waste_factor(Decimal::new(1, 1)),
        );

        let calc = RecipeCostCalculator::new(&store, &store);
        let result = calc.recipe_cost("DOUGH").unwrap();

        assert_eq!(result.total_cost, Decimal::from(11));
        assert!(result.is_complete());
    }

    #[test]
    fn test_movement_overrides_static_cost() {
        // 進貨成本 12 覆蓋靜態成本 5，即使較大
        let mut store = InMemoryStore::new();
        store.add_item(Item::new("FLOUR", "麵粉", "kg").with_static_cost(Decimal::from(5)));
        store.add_movement(StockMovement::new(
            "FLOUR",
            Decimal::from(25),
            Decimal::from(12),
            Utc.with_ymd_and_hms(2026, 8, 20, 8, 0, 0).unwrap(),
        ));
        store.add_recipe(Recipe::new("DOUGH", "麵團", Decimal::ONE, "batch"));
        store.add_line(item_line("DOUGH", "FLOUR", Decimal::ONE));

        let calc = RecipeCostCalculator::new(&store, &store);
        let result = calc.recipe_cost("DOUGH").unwrap();

        assert_eq!(result.total_cost, Decimal::from(12));
    }

    #[test]
    fn test_missing_cost_is_flagged_not_fatal() {
        let mut store = InMemoryStore::new();
        store.add_item(Item::new("SAFFRON", "番紅花", "g"));
        store.add_recipe(Recipe::new("RICE", "香料飯", Decimal::from(4), "portion"));
        store.add_line(item_line("RICE", "SAFFRON", Decimal::ONE));

        let calc = RecipeCostCalculator::new(&store, &store);
        let result = calc.recipe_cost("RICE").unwrap();

        assert_eq!(result.total_cost, Decimal::ZERO);
        assert_eq!(result.missing_cost_count, 1);
        assert!(result.lines[0].missing_cost);
        assert!(!result.is_complete());
    }

    #[test]
    fn test_dangling_item_reference() {
        let mut store = InMemoryStore::new();
        store.add_recipe(Recipe::new("SOUP", "例湯", Decimal::ONE, "L"));
        store.add_line(item_line("SOUP", "GHOST", Decimal::ONE));

        let calc = RecipeCostCalculator::new(&store, &store);
        let result = calc.recipe_cost("SOUP").unwrap();

        assert_eq!(result.missing_cost_count, 1);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_negative_waste_factor_skips_line() {
        let mut store = InMemoryStore::new();
        store.add_item(Item::new("BEEF", "牛肉", "kg").with_static_cost(Decimal::from(8)));
        store.add_recipe(Recipe::new("STEW", "燉肉", Decimal::ONE, "batch"));
        store.add_line(
            item_line("STEW", "BEEF", Decimal::ONE).with_waste_factor(Decimal::new(-5, 2)),
        );
        store.add_line(item_line("STEW", "BEEF", Decimal::from(2)));

        let calc = RecipeCostCalculator::new(&store, &store);
        let result = calc.recipe_cost("STEW").unwrap();

        // 被跳過的行不計成本，另一行照常
        assert_eq!(result.total_cost, Decimal::from(16));
        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].severity, crate::WarningSeverity::Error);
    }

    #[test]
    fn test_sub_recipe_per_unit_cost() {
        // Bun：一批 4 件共 0.40 => 每件 0.10；Burger 取 1 件
        let mut store = InMemoryStore::new();
        store.add_item(Item::new("FLOUR", "麵粉", "kg").with_static_cost(Decimal::from(1)));
        store.add_recipe(Recipe::new("BUN", "漢堡麵包", Decimal::from(4), "pieces").as_sub_recipe());
        store.add_line(item_line("BUN", "FLOUR", Decimal::new(4, 1)));
        store.add_recipe(Recipe::new("BURGER", "招牌漢堡", Decimal::ONE, "portion"));
        store.add_line(sub_line("BURGER", "BUN", Decimal::ONE, "pieces"));

        let calc = RecipeCostCalculator::new(&store, &store);
        let result = calc.recipe_cost("BURGER").unwrap();

        assert_eq!(result.total_cost, Decimal::new(10, 2));
        assert_eq!(result.cost_per_yield_unit, Decimal::new(10, 2));
    }

    #[test]
    fn test_self_reference_is_cyclic() {
        let mut store = InMemoryStore::new();
        store.add_recipe(Recipe::new("A", "自引用", Decimal::ONE, "batch"));
        store.add_line(sub_line("A", "A", Decimal::ONE, "batch"));

        let calc = RecipeCostCalculator::new(&store, &store);
        let result = calc.recipe_cost("A").unwrap();

        assert!(result.cyclic);
        assert_eq!(result.total_cost, Decimal::ZERO);
    }

    #[test]
    fn test_three_cycle_detected_from_every_entry_point() {
        let mut store = InMemoryStore::new();
        for id in ["A", "B", "C"] {
            store.add_recipe(Recipe::new(id, id, Decimal::ONE, "batch"));
        }
        store.add_line(sub_line("A", "B", Decimal::ONE, "batch"));
        store.add_line(sub_line("B", "C", Decimal::ONE, "batch"));
        store.add_line(sub_line("C", "A", Decimal::ONE, "batch"));

        let calc = RecipeCostCalculator::new(&store, &store);
        for id in ["A", "B", "C"] {
            let result = calc.recipe_cost(id).unwrap();
            assert!(result.cyclic, "配方 {} 應偵測到循環", id);
        }
    }

    #[test]
    fn test_cycle_branch_still_sums_other_lines() {
        // A → A（循環）與 A → BEEF（正常）：仍回傳盡力而為的總額
        let mut store = InMemoryStore::new();
        store.add_item(Item::new("BEEF", "牛肉", "kg").with_static_cost(Decimal::from(8)));
        store.add_recipe(Recipe::new("A", "循環配方", Decimal::ONE, "batch"));
        store.add_line(sub_line("A", "A", Decimal::ONE, "batch"));
        store.add_line(item_line("A", "BEEF", Decimal::ONE));

        let calc = RecipeCostCalculator::new(&store, &store);
        let result = calc.recipe_cost("A").unwrap();

        assert!(result.cyclic);
        assert_eq!(result.total_cost, Decimal::from(8));
    }

    #[test]
    fn test_deep_chain_hits_traversal_limit() {
        // 深度 10 的無環鏈，上限 4：應以錯誤中止而非悄悄截斷
        let mut store = InMemoryStore::new();
        for i in 0..10 {
            store.add_recipe(Recipe::new(format!("R{}", i), "鏈", Decimal::ONE, "batch"));
            if i > 0 {
                store.add_line(sub_line(
                    &format!("R{}", i - 1),
                    &format!("R{}", i),
                    Decimal::ONE,
                    "batch",
                ));
            }
        }

        let calc = RecipeCostCalculator::new(&store, &store)
            .with_limits(TraversalLimits::new().with_max_depth(4));
        let err = calc.recipe_cost("R0").unwrap_err();
        assert!(matches!(err, CostingError::TraversalLimitExceeded { .. }));
    }

    #[test]
    fn test_zero_yield_is_missing_cost_not_divide_fault() {
        let mut store = InMemoryStore::new();
        store.add_item(Item::new("BEEF", "牛肉", "kg").with_static_cost(Decimal::from(8)));
        store.add_recipe(Recipe::new("BAD", "零產出", Decimal::ZERO, "portion"));
        store.add_line(item_line("BAD", "BEEF", Decimal::ONE));

        let calc = RecipeCostCalculator::new(&store, &store);
        let result = calc.recipe_cost("BAD").unwrap();

        assert_eq!(result.total_cost, Decimal::from(8));
        assert_eq!(result.cost_per_yield_unit, Decimal::ZERO);
        assert!(result.missing_cost_count >= 1);
    }

    #[test]
    fn test_unit_mismatch_warns_without_conversion() {
        let mut store = InMemoryStore::new();
        store.add_item(Item::new("FLOUR", "麵粉", "kg").with_static_cost(Decimal::from(1)));
        store.add_recipe(Recipe::new("BUN", "漢堡麵包", Decimal::from(4), "pieces").as_sub_recipe());
        store.add_line(item_line("BUN", "FLOUR", Decimal::ONE));
        store.add_recipe(Recipe::new("BURGER", "招牌漢堡", Decimal::ONE, "portion"));
        store.add_line(sub_line("BURGER", "BUN", Decimal::ONE, "kg")); // 單位不一致

        let calc = RecipeCostCalculator::new(&store, &store);
        let result = calc.recipe_cost("BURGER").unwrap();

        assert!(result
            .warnings
            .iter()
            .any(|w| w.message.contains("不一致")));
        // 不做換算：仍以宣告的用量 × 每件成本計價
        assert_eq!(result.total_cost, Decimal::new(25, 2));
    }

    #[test]
    fn test_menu_costs_shares_memo() {
        // 50 個配方共用同一個子配方：其品項成本只解析一次
        let mut store = InMemoryStore::new();
        store.add_item(Item::new("TOMATO", "番茄", "kg").with_static_cost(Decimal::from(2)));
        store.add_recipe(Recipe::new("SAUCE", "番茄醬底", Decimal::from(2), "L").as_sub_recipe());
        store.add_line(item_line("SAUCE", "TOMATO", Decimal::from(3)));

        let mut menu = Vec::new();
        for i in 0..50 {
            let id = format!("DISH-{:02}", i);
            store.add_recipe(Recipe::new(&id, "菜色", Decimal::ONE, "portion"));
            store.add_line(sub_line(&id, "SAUCE", Decimal::new(2, 1), "L"));
            menu.push(id);
        }

        let calc = RecipeCostCalculator::new(&store, &store);
        store.reset_movement_query_count();
        let batch = calc.menu_costs(&menu);

        assert_eq!(batch.results.len(), 50);
        assert!(batch.failures.is_empty());
        assert_eq!(store.movement_query_count(), 1);

        // 每道菜 0.2 L × (6 ÷ 2) = 0.6
        for result in &batch.results {
            assert_eq!(result.total_cost, Decimal::new(6, 1));
        }
    }

    #[test]
    fn test_menu_costs_isolates_failures() {
        let mut store = InMemoryStore::new();
        store.add_recipe(Recipe::new("OK", "正常", Decimal::ONE, "portion"));
        for i in 0..6 {
            store.add_recipe(Recipe::new(format!("D{}", i), "深鏈", Decimal::ONE, "batch"));
            if i > 0 {
                store.add_line(sub_line(
                    &format!("D{}", i - 1),
                    &format!("D{}", i),
                    Decimal::ONE,
                    "batch",
                ));
            }
        }

        let calc = RecipeCostCalculator::new(&store, &store)
            .with_limits(TraversalLimits::new().with_max_depth(3));
        let batch = calc.menu_costs(&["D0".to_string(), "OK".to_string()]);

        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].recipe_id, "D0");
        assert!(batch.result_for("OK").is_some());
    }

    #[test]
    fn test_menu_costs_node_budget_is_per_recipe() {
        // 深鏈在節點數上限 3 下爆量，但後面只有一行品項的配方
        // 應照常計算：預算以頂層配方為單位，不整批累計
        let mut store = InMemoryStore::new();
        store.add_item(Item::new("BEEF", "牛肉", "kg").with_static_cost(Decimal::from(8)));
        store.add_recipe(Recipe::new("OK", "正常", Decimal::ONE, "portion"));
        store.add_line(item_line("OK", "BEEF", Decimal::ONE));
        for i in 0..6 {
            store.add_recipe(Recipe::new(format!("E{}", i), "深鏈", Decimal::ONE, "batch"));
            if i > 0 {
                store.add_line(sub_line(
                    &format!("E{}", i - 1),
                    &format!("E{}", i),
                    Decimal::ONE,
                    "batch",
                ));
            }
        }

        let calc = RecipeCostCalculator::new(&store, &store)
            .with_limits(TraversalLimits::new().with_max_recipes(3));
        let batch = calc.menu_costs(&["E0".to_string(), "OK".to_string()]);

        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].recipe_id, "E0");
        let ok = batch.result_for("OK").expect("OK 不應被前一個配方株連");
        assert_eq!(ok.total_cost, Decimal::from(8));
    }

    #[test]
    fn test_idempotent_results() {
        let mut store = InMemoryStore::new();
        store.add_item(Item::new("FLOUR", "麵粉", "kg").with_static_cost(Decimal::from(5)));
        store.add_recipe(Recipe::new("DOUGH", "麵團", Decimal::from(2), "batch"));
        store.add_line(item_line("DOUGH", "FLOUR", Decimal::from(3)));

        let calc = RecipeCostCalculator::new(&store, &store);
        let first = calc.recipe_cost("DOUGH").unwrap();
        let second = calc.recipe_cost("DOUGH").unwrap();

        assert_eq!(first, second);
    }
}
