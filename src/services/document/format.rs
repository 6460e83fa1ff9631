// src/services/document/format.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::common::numeric::{number_prefix_is_zero, value_to_raw_string};

pub const EMPTY: &str = "—";
const YES: &str = "✓ SIM";
const NO: &str = "✗ NÃO";

/// Campos SIM/NÃO. Qualquer outro valor aparece como foi gravado, em maiúsculas.
pub fn tri_state(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => EMPTY.to_string(),
        Some(Value::Bool(true)) => YES.to_string(),
        Some(Value::Bool(false)) => NO.to_string(),
        Some(other) => {
            let raw = value_to_raw_string(other);
            let trimmed = raw.trim();
            match trimmed.to_lowercase().as_str() {
                "" => EMPTY.to_string(),
                "sim" | "true" => YES.to_string(),
                "não" | "nao" | "false" => NO.to_string(),
                _ => trimmed.to_uppercase(),
            }
        }
    }
}

/// Campos de horas. Também aceitam SIM/NÃO de registros antigos.
pub fn hours(value: Option<&Value>) -> String {
    let raw = value.map(value_to_raw_string).unwrap_or_default();
    if raw.trim().is_empty() {
        return "0h".to_string();
    }
    if let Some(Value::Bool(_)) = value {
        return tri_state(value);
    }
    // Número aparece como foi gravado ("2.50" continua "2.50h").
    match number_prefix_is_zero(&raw) {
        Some(true) => "0h".to_string(),
        Some(false) => format!("{}h", raw.trim()),
        None => tri_state(value),
    }
}

/// Texto livre opcional; vazio vira travessão.
pub fn text_or_dash(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => EMPTY,
    }
}

pub fn value_text_or_dash(value: Option<&Value>) -> String {
    let raw = value.map(value_to_raw_string).unwrap_or_default();
    text_or_dash(Some(raw.as_str())).to_string()
}

/// "R$ 1.234,56"
pub fn format_brl(value: Decimal) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    format!("{}R$ {}", sign, format_number_br(value.abs(), 2))
}

/// "25,00%"
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", format_number_br(value, 2))
}

/// Número no padrão brasileiro com `places` casas: milhar com ponto, decimal com vírgula.
pub fn format_number_br(value: Decimal, places: u32) -> String {
    let rounded = value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.*}", places as usize, rounded.abs());

    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push(',');
        out.push_str(frac);
    }
    out
}

/// Horas calculadas (totais), sem zeros à direita.
pub fn format_hours(value: Decimal) -> String {
    format!("{}h", value.normalize())
}

pub fn format_date_br(at: &DateTime<Utc>) -> String {
    at.format("%d/%m/%Y").to_string()
}

/// Índices (anterior, próximo) no visualizador de fotos; dá a volta nas pontas.
pub fn gallery_neighbors(index: usize, len: usize) -> (usize, usize) {
    if len == 0 {
        return (0, 0);
    }
    let prev = (index + len - 1) % len;
    let next = (index + 1) % len;
    (prev, next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn tri_state_rendering() {
        assert_eq!(tri_state(Some(&json!("sim"))), "✓ SIM");
        assert_eq!(tri_state(Some(&json!("SIM"))), "✓ SIM");
        assert_eq!(tri_state(Some(&json!(true))), "✓ SIM");
        assert_eq!(tri_state(Some(&json!("Não"))), "✗ NÃO");
        assert_eq!(tri_state(Some(&json!("nao"))), "✗ NÃO");
        assert_eq!(tri_state(Some(&json!(false))), "✗ NÃO");
        assert_eq!(tri_state(Some(&json!(""))), "—");
        assert_eq!(tri_state(None), "—");
        assert_eq!(tri_state(Some(&Value::Null)), "—");
        assert_eq!(tri_state(Some(&json!("a combinar"))), "A COMBINAR");
    }

    #[test]
    fn hours_rendering_accepts_both_shapes() {
        assert_eq!(hours(Some(&json!(5))), "5h");
        assert_eq!(hours(Some(&json!("2.50"))), "2.50h");
        assert_eq!(hours(Some(&json!("0.00"))), "0h");
        assert_eq!(hours(Some(&json!("1e400"))), "1e400h");
        assert_eq!(
            hours(Some(&json!("12345678901234567890123456789012"))),
            "12345678901234567890123456789012h"
        );
        assert_eq!(hours(Some(&json!("0"))), "0h");
        assert_eq!(hours(Some(&json!(0))), "0h");
        assert_eq!(hours(Some(&json!(""))), "0h");
        assert_eq!(hours(None), "0h");
        assert_eq!(hours(Some(&json!("sim"))), "✓ SIM");
        assert_eq!(hours(Some(&json!("NÃO"))), "✗ NÃO");
        assert_eq!(hours(Some(&json!(true))), "✓ SIM");
        assert_eq!(hours(Some(&json!("talvez"))), "TALVEZ");
    }

    #[test]
    fn missing_text_becomes_dash() {
        assert_eq!(text_or_dash(None), "—");
        assert_eq!(text_or_dash(Some("   ")), "—");
        assert_eq!(text_or_dash(Some(" Eixo ")), "Eixo");
        assert_eq!(value_text_or_dash(Some(&Value::Null)), "—");
        assert_eq!(value_text_or_dash(Some(&json!(12))), "12");
    }

    #[test]
    fn currency_uses_brazilian_format() {
        let dec = |s: &str| Decimal::from_str(s).unwrap();
        assert_eq!(format_brl(dec("800")), "R$ 800,00");
        assert_eq!(format_brl(dec("1234.5")), "R$ 1.234,50");
        assert_eq!(format_brl(dec("1234567.891")), "R$ 1.234.567,89");
        assert_eq!(format_brl(dec("0.005")), "R$ 0,01");
        assert_eq!(format_brl(dec("-12.3")), "-R$ 12,30");
        assert_eq!(format_brl(Decimal::ZERO), "R$ 0,00");
        assert_eq!(format_percent(dec("25")), "25,00%");
    }

    #[test]
    fn date_and_hours() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 15, 0, 0).unwrap();
        assert_eq!(format_date_br(&at), "07/03/2026");
        assert_eq!(format_hours(Decimal::new(1000, 2)), "10h");
    }

    #[test]
    fn gallery_wraps_around() {
        assert_eq!(gallery_neighbors(0, 3), (2, 1));
        assert_eq!(gallery_neighbors(2, 3), (1, 0));
        assert_eq!(gallery_neighbors(0, 1), (0, 0));
    }
}
