//! 成分行成本計算

use costing_core::{IngredientLine, IngredientRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cost_source::ResolvedUnitCost;
use crate::RecipeCostResult;

/// 成分行成本明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineCost {
    /// 成分行ID
    pub line_id: Uuid,

    /// 成分引用
    pub reference: IngredientRef,

    /// 有效用量（含損耗）
    pub effective_quantity: Decimal,

    /// 採用的單位成本（品項成本或子配方每產出單位成本）
    pub unit_cost: Decimal,

    /// 該行成本 = 有效用量 × 單位成本
    pub cost: Decimal,

    /// 是否缺少成本資料
    pub missing_cost: bool,

    /// 該分支是否偵測到循環引用
    pub cyclic: bool,
}

/// 成分行成本計算器（純函數）
pub struct IngredientCostCalculator;

impl IngredientCostCalculator {
    /// 品項成分行：成本 = 有效用量 × 解析出的單位成本
    pub fn item_line(line: &IngredientLine, resolved: ResolvedUnitCost) -> LineCost {
        let effective_quantity = line.effective_quantity();
        LineCost {
            line_id: line.id,
            reference: line.reference.clone(),
            effective_quantity,
            unit_cost: resolved.unit_cost,
            cost: effective_quantity * resolved.unit_cost,
            missing_cost: resolved.is_missing(),
            cyclic: false,
        }
    }

    /// 子配方成分行：成本 = 有效用量 × 子配方每產出單位成本
    ///
    /// 子配方的缺少成本與循環旗標向上傳遞；循環分支的成本為零
    /// （占位結果），呼叫端仍會把其他行加總為盡力而為的數字。
    pub fn sub_recipe_line(line: &IngredientLine, sub_result: &RecipeCostResult) -> LineCost {
        let effective_quantity = line.effective_quantity();
        LineCost {
            line_id: line.id,
            reference: line.reference.clone(),
            effective_quantity,
            unit_cost: sub_result.cost_per_yield_unit,
            cost: effective_quantity * sub_result.cost_per_yield_unit,
            missing_cost: sub_result.missing_cost_count > 0,
            cyclic: sub_result.cyclic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost_source::CostSource;
    use proptest::prelude::*;
    use rstest::rstest;

    fn beef_line(quantity: Decimal, waste: Decimal) -> IngredientLine {
        IngredientLine::new(
            "BURGER",
            IngredientRef::Item("BEEF-001".to_string()),
            quantity,
            "kg",
        )
        .with_waste_factor(waste)
    }

    #[test]
    fn test_item_line_with_waste() {
        // 0.2 kg × (1 + 5%) × 8 = 1.68
        let line = beef_line(Decimal::new(2, 1), Decimal::new(5, 2));
        let resolved = ResolvedUnitCost {
            unit_cost: Decimal::from(8),
            source: CostSource::Movement,
        };

        let cost = IngredientCostCalculator::item_line(&line, resolved);
        assert_eq!(cost.effective_quantity, Decimal::new(21, 2));
        assert_eq!(cost.cost, Decimal::new(168, 2));
        assert!(!cost.missing_cost);
        assert!(!cost.cyclic);
    }

    #[test]
    fn test_item_line_missing_cost() {
        let line = beef_line(Decimal::ONE, Decimal::ZERO);
        let resolved = ResolvedUnitCost {
            unit_cost: Decimal::ZERO,
            source: CostSource::Missing,
        };

        let cost = IngredientCostCalculator::item_line(&line, resolved);
        assert_eq!(cost.cost, Decimal::ZERO);
        assert!(cost.missing_cost);
    }

    #[rstest]
    #[case(Decimal::ZERO, Decimal::new(8, 1))] // 無損耗
    #[case(Decimal::new(5, 2), Decimal::new(84, 2))] // 5% 損耗
    #[case(Decimal::new(25, 2), Decimal::ONE)] // 25% 損耗
    fn test_item_line_waste_factors(#[case] waste: Decimal, #[case] expected: Decimal) {
        // 0.1 kg，單位成本 8
        let line = beef_line(Decimal::new(1, 1), waste);
        let resolved = ResolvedUnitCost {
            unit_cost: Decimal::from(8),
            source: CostSource::StaticCost,
        };

        let cost = IngredientCostCalculator::item_line(&line, resolved);
        assert_eq!(cost.cost, expected);
    }

    #[test]
    fn test_sub_recipe_line() {
        // 子配方每件 0.10，取 1 件
        let line = IngredientLine::new(
            "BURGER",
            IngredientRef::SubRecipe("BUN".to_string()),
            Decimal::ONE,
            "pieces",
        );
        let mut sub = RecipeCostResult::empty("BUN");
        sub.total_cost = Decimal::new(40, 2);
        sub.cost_per_yield_unit = Decimal::new(10, 2);

        let cost = IngredientCostCalculator::sub_recipe_line(&line, &sub);
        assert_eq!(cost.cost, Decimal::new(10, 2));
        assert!(!cost.missing_cost);
        assert!(!cost.cyclic);
    }

    #[test]
    fn test_sub_recipe_line_propagates_flags() {
        let line = IngredientLine::new(
            "BURGER",
            IngredientRef::SubRecipe("SAUCE".to_string()),
            Decimal::from(2),
            "L",
        );
        let mut sub = RecipeCostResult::cyclic_stub("SAUCE");
        sub.missing_cost_count = 1;

        let cost = IngredientCostCalculator::sub_recipe_line(&line, &sub);
        assert_eq!(cost.cost, Decimal::ZERO);
        assert!(cost.missing_cost);
        assert!(cost.cyclic);
    }

    proptest! {
        /// 行成本恆等於 q × (1 + w) × C
        #[test]
        fn prop_line_cost_arithmetic(q in 0u32..10_000, w in 0u32..100, c in 0u32..100_000) {
            let quantity = Decimal::from(q) / Decimal::from(100);
            let waste = Decimal::from(w) / Decimal::from(100);
            let unit_cost = Decimal::from(c) / Decimal::from(100);

            let line = beef_line(quantity, waste);
            let resolved = ResolvedUnitCost {
                unit_cost,
                source: CostSource::StaticCost,
            };

            let cost = IngredientCostCalculator::item_line(&line, resolved);
            let expected = quantity * (Decimal::ONE + waste) * unit_cost;
            prop_assert_eq!(cost.cost, expected);
        }
    }
}
