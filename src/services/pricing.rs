// src/services/pricing.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

/// Entradas do markup. Os percentuais já chegam validados em [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingInput {
    pub material_cost: Decimal,
    pub labor_hours: Decimal,
    pub hourly_rate: Decimal,
    // Outros custos diretos somados à base (frete, terceiros). Zero na maioria das fichas.
    pub other_costs: Decimal,
    pub variable_pct: Decimal,
    pub fixed_pct: Decimal,
    pub profit_pct: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub labor_cost: Decimal,
    pub cost_base: Decimal,
    pub other_pct: Decimal,
    pub cost_pct: Decimal,
    pub markup_factor: Decimal,
    pub sale_price: Decimal,
    pub variable_amount: Decimal,
    pub fixed_amount: Decimal,
    pub profit_amount: Decimal,
    /// Percentuais somando >= 100: o preço cai para a base de custo.
    pub degenerate: bool,
}

/// preço de venda = base de custo / ((100 - despesas variáveis - fixas - lucro) / 100)
pub fn compute_price(input: &PricingInput) -> PricingResult {
    let labor_cost = input.labor_hours.saturating_mul(input.hourly_rate);
    let cost_base = input
        .material_cost
        .saturating_add(labor_cost)
        .saturating_add(input.other_costs);

    let other_pct = input.variable_pct + input.fixed_pct + input.profit_pct;
    let cost_pct = Decimal::ONE_HUNDRED - other_pct;
    let markup_factor = cost_pct / Decimal::ONE_HUNDRED;

    // Fator <= 0 não divide; um fator minúsculo pode estourar o Decimal e cai na mesma guarda.
    let (sale_price, degenerate) = if markup_factor > Decimal::ZERO {
        match cost_base.checked_div(markup_factor) {
            Some(price) => (price, false),
            None => (cost_base, true),
        }
    } else {
        (cost_base, true)
    };

    let share = |pct: Decimal| sale_price.saturating_mul(pct) / Decimal::ONE_HUNDRED;

    PricingResult {
        labor_cost,
        cost_base,
        other_pct,
        cost_pct,
        markup_factor,
        sale_price,
        variable_amount: share(input.variable_pct),
        fixed_amount: share(input.fixed_pct),
        profit_amount: share(input.profit_pct),
        degenerate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn input(variable: &str, fixed: &str, profit: &str) -> PricingInput {
        PricingInput {
            material_cost: dec("30.00"),
            labor_hours: dec("5"),
            hourly_rate: dec("50"),
            other_costs: Decimal::ZERO,
            variable_pct: dec(variable),
            fixed_pct: dec(fixed),
            profit_pct: dec(profit),
        }
    }

    #[test]
    fn reference_budget() {
        let result = compute_price(&input("25", "10", "30"));

        assert_eq!(result.labor_cost, dec("250"));
        assert_eq!(result.cost_base, dec("280"));
        assert_eq!(result.other_pct, dec("65"));
        assert_eq!(result.cost_pct, dec("35"));
        assert_eq!(result.sale_price, dec("800"));
        assert_eq!(result.variable_amount, dec("200"));
        assert_eq!(result.fixed_amount, dec("80"));
        assert_eq!(result.profit_amount, dec("240"));
        assert!(!result.degenerate);
        assert_eq!(
            result.cost_base + result.variable_amount + result.fixed_amount + result.profit_amount,
            result.sale_price
        );
    }

    #[test]
    fn higher_margin_then_degenerate() {
        let result = compute_price(&input("25", "10", "45"));
        assert_eq!(result.cost_pct, dec("20"));
        assert_eq!(result.sale_price, dec("1400"));
        assert!(!result.degenerate);

        let result = compute_price(&input("60", "10", "45"));
        assert_eq!(result.other_pct, dec("115"));
        assert!(result.degenerate);
        assert_eq!(result.sale_price, dec("280"));
        assert_eq!(result.sale_price, result.cost_base);
    }

    #[test]
    fn exactly_one_hundred_is_degenerate() {
        let result = compute_price(&input("50", "25", "25"));
        assert!(result.degenerate);
        assert_eq!(result.markup_factor, Decimal::ZERO);
        assert_eq!(result.sale_price, dec("280"));
    }

    #[test]
    fn other_costs_join_the_cost_base() {
        let mut inp = input("0", "0", "0");
        inp.other_costs = dec("20");
        let result = compute_price(&inp);
        assert_eq!(result.cost_base, dec("300"));
        assert_eq!(result.sale_price, dec("300"));
        assert!(!result.degenerate);
    }

    proptest! {
        #[test]
        fn breakdown_adds_up_to_sale_price(
            material_cents in 0i64..10_000_000,
            hours_tenths in 0i64..5_000,
            rate_cents in 0i64..50_000,
            variable in 0u32..34,
            fixed in 0u32..33,
            profit in 0u32..33,
        ) {
            let inp = PricingInput {
                material_cost: Decimal::new(material_cents, 2),
                labor_hours: Decimal::new(hours_tenths, 1),
                hourly_rate: Decimal::new(rate_cents, 2),
                other_costs: Decimal::ZERO,
                variable_pct: Decimal::from(variable),
                fixed_pct: Decimal::from(fixed),
                profit_pct: Decimal::from(profit),
            };
            let result = compute_price(&inp);
            prop_assert!(!result.degenerate);

            let sum = result.cost_base + result.variable_amount + result.fixed_amount + result.profit_amount;
            let diff = (sum - result.sale_price).abs();
            prop_assert!(diff < Decimal::new(1, 6), "diff = {}", diff);
        }

        #[test]
        fn degenerate_knobs_never_divide(
            material_cents in 0i64..10_000_000,
            variable in 34u32..=100,
            fixed in 33u32..=100,
            profit in 33u32..=100,
        ) {
            let inp = PricingInput {
                material_cost: Decimal::new(material_cents, 2),
                labor_hours: Decimal::ZERO,
                hourly_rate: Decimal::ZERO,
                other_costs: Decimal::ZERO,
                variable_pct: Decimal::from(variable),
                fixed_pct: Decimal::from(fixed),
                profit_pct: Decimal::from(profit),
            };
            let result = compute_price(&inp);
            prop_assert!(result.degenerate);
            prop_assert_eq!(result.sale_price, result.cost_base);
        }

        #[test]
        fn same_input_same_output(
            material_cents in 0i64..10_000_000,
            variable in 0u32..=100,
            fixed in 0u32..=100,
            profit in 0u32..=100,
        ) {
            let inp = PricingInput {
                material_cost: Decimal::new(material_cents, 2),
                labor_hours: Decimal::new(35, 1),
                hourly_rate: Decimal::new(7250, 2),
                other_costs: Decimal::ZERO,
                variable_pct: Decimal::from(variable),
                fixed_pct: Decimal::from(fixed),
                profit_pct: Decimal::from(profit),
            };
            prop_assert_eq!(compute_price(&inp), compute_price(&inp));
        }
    }
}
