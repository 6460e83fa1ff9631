// src/services/totals.rs

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    common::numeric::{decimal_or_zero, value_to_decimal_or_zero},
    models::quote::{MaterialLine, MaterialLinePayload},
    services::catalog::work_center_keys,
};

/// Totais derivados da ficha. Sem arredondamento: formatação é problema da tela.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    #[schema(example = "5")]
    pub hours_per_unit: Decimal,
    #[schema(example = "10")]
    pub hours_total: Decimal,
    #[schema(example = "30.00")]
    pub material_cost_per_unit: Decimal,
    #[schema(example = "60.00")]
    pub material_cost_total: Decimal,
}

/// Uma linha de material com quantidade e preço ainda em texto cru.
pub trait PricedLine {
    fn raw_quantity(&self) -> &str;
    fn raw_unit_price(&self) -> &str;

    /// quantidade × preço unitário, com a regra do "número ou zero".
    fn line_total(&self) -> Decimal {
        decimal_or_zero(self.raw_quantity()).saturating_mul(decimal_or_zero(self.raw_unit_price()))
    }
}

impl PricedLine for MaterialLine {
    fn raw_quantity(&self) -> &str {
        &self.quantity
    }
    fn raw_unit_price(&self) -> &str {
        &self.unit_price
    }
}

impl PricedLine for MaterialLinePayload {
    fn raw_quantity(&self) -> &str {
        &self.quantity
    }
    fn raw_unit_price(&self) -> &str {
        &self.unit_price
    }
}

/// Soma das horas de todos os centros de trabalho do catálogo.
/// Campo vazio, ausente ou não numérico ("sim", "abc") vale zero.
pub fn hours_per_unit(labor_hours: &Value) -> Decimal {
    work_center_keys()
        .map(|key| labor_hours.get(key).map(value_to_decimal_or_zero).unwrap_or_default())
        .fold(Decimal::ZERO, |acc, h| acc.saturating_add(h))
}

pub fn compute_totals<L: PricedLine>(materials: &[L], labor_hours: &Value, quantity: i32) -> Totals {
    let quantity = Decimal::from(quantity);

    let hours_per_unit = hours_per_unit(labor_hours);
    let material_cost_per_unit = materials
        .iter()
        .map(PricedLine::line_total)
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t));

    Totals {
        hours_per_unit,
        hours_total: hours_per_unit.saturating_mul(quantity),
        material_cost_per_unit,
        material_cost_total: material_cost_per_unit.saturating_mul(quantity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::str::FromStr;

    fn line(quantity: &str, unit_price: &str) -> MaterialLinePayload {
        MaterialLinePayload {
            description: "Barra".to_string(),
            quantity: quantity.to_string(),
            unit: Some("kg".to_string()),
            unit_price: unit_price.to_string(),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn end_to_end_example() {
        let materials = vec![line("3", "10.00")];
        let totals = compute_totals(&materials, &json!({ "torno_grande": 5 }), 2);

        assert_eq!(totals.hours_per_unit, dec("5"));
        assert_eq!(totals.hours_total, dec("10"));
        assert_eq!(totals.material_cost_per_unit, dec("30.00"));
        assert_eq!(totals.material_cost_total, dec("60.00"));
    }

    #[test]
    fn non_numeric_unit_price_contributes_zero() {
        let materials = vec![line("3", "abc"), line("2", "5")];
        let totals = compute_totals(&materials, &json!({}), 1);
        assert_eq!(totals.material_cost_per_unit, dec("10"));
    }

    #[test]
    fn hours_accept_strings_and_ignore_tri_state_values() {
        let hours = json!({
            "torno_grande": "2.5",
            "fresadora": 1,
            "solda": "sim",
            "montagem": null,
            "campo_desconhecido": 99
        });
        assert_eq!(hours_per_unit(&hours), dec("3.5"));
    }

    #[test]
    fn empty_inputs_give_zero_totals() {
        let materials: Vec<MaterialLinePayload> = vec![];
        let totals = compute_totals(&materials, &Value::Null, 1);
        assert_eq!(totals.hours_per_unit, Decimal::ZERO);
        assert_eq!(totals.material_cost_total, Decimal::ZERO);
    }

    // Texto cru como chega do formulário: número, número com vírgula ou lixo.
    fn raw_number() -> impl Strategy<Value = String> {
        prop_oneof![
            (0i64..1_000_000, 0u32..4).prop_map(|(n, scale)| Decimal::new(n, scale).to_string()),
            (0i64..1_000_000).prop_map(|n| format!("{},{:02}", n / 100, n % 100)),
            ".{0,8}",
        ]
    }

    fn hour_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            (0i64..10_000).prop_map(|n| json!(n)),
            (0i64..10_000).prop_map(|n| json!(Decimal::new(n, 2).to_string())),
            prop::sample::select(vec!["sim", "não", "n/a", ""]).prop_map(|s| json!(s)),
            Just(Value::Null),
        ]
    }

    fn labor_hours() -> impl Strategy<Value = Value> {
        let keys: Vec<&'static str> = work_center_keys().collect();
        prop::collection::vec((prop::sample::select(keys), hour_value()), 0..8).prop_map(|pairs| {
            Value::Object(pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
        })
    }

    proptest! {
        #[test]
        fn repeated_calls_are_identical(
            raw_lines in prop::collection::vec((raw_number(), raw_number()), 0..12),
            hours in labor_hours(),
            quantity in 0i32..10_000,
        ) {
            let materials: Vec<_> = raw_lines.iter().map(|(q, p)| line(q, p)).collect();
            let a = compute_totals(&materials, &hours, quantity);
            let b = compute_totals(&materials, &hours, quantity);
            prop_assert_eq!(a, b);
            prop_assert_eq!(a.material_cost_total.serialize(), b.material_cost_total.serialize());
            prop_assert_eq!(a.hours_total.serialize(), b.hours_total.serialize());
        }
    }
}
