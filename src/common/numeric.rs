// src/common/numeric.rs

//! Leitura tolerante de números digitados nos formulários.
//!
//! Os campos numéricos da ficha chegam como texto livre (ou número, ou nada).
//! A regra histórica é: lê o prefixo numérico do texto e, se não houver,
//! vale zero. Registros antigos dependem disso para continuar com os mesmos
//! totais, então todo cálculo passa por aqui.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Pedaços do número no começo de um texto, ainda sem converter.
struct NumberPrefix<'a> {
    negative: bool,
    int_part: &'a str,
    frac_part: &'a str,
    exponent: &'a str,
}

impl NumberPrefix<'_> {
    fn mantissa_is_zero(&self) -> bool {
        self.int_part.bytes().chain(self.frac_part.bytes()).all(|b| b == b'0')
    }
}

fn lex_number_prefix(raw: &str) -> Option<NumberPrefix<'_>> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            i += 1;
            true
        }
        Some(b'+') => {
            i += 1;
            false
        }
        _ => false,
    };

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_part = &s[int_start..i];

    let mut frac_part = "";
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        frac_part = &s[frac_start..j];
        if !int_part.is_empty() || !frac_part.is_empty() {
            i = j;
        }
    }

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    // Expoente só conta se vier seguido de dígitos ("2e" é apenas 2).
    let mut exponent = "";
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let exp_start = i + 1;
        let mut j = exp_start;
        if j < bytes.len() && (bytes[j] == b'-' || bytes[j] == b'+') {
            j += 1;
        }
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start {
            exponent = &s[exp_start..j];
        }
    }

    Some(NumberPrefix {
        negative,
        int_part,
        frac_part,
        exponent,
    })
}

/// Lê o prefixo numérico de `raw` (`"12,5kg"` -> 12, `" 3.5h"` -> 3.5).
/// Retorna `None` quando o texto não começa com um número ou quando o número
/// não cabe em `Decimal`.
pub fn parse_number_prefix(raw: &str) -> Option<Decimal> {
    let prefix = lex_number_prefix(raw)?;

    let mut normalized = String::with_capacity(prefix.int_part.len() + prefix.frac_part.len() + 4);
    if prefix.negative {
        normalized.push('-');
    }
    normalized.push_str(if prefix.int_part.is_empty() { "0" } else { prefix.int_part });
    if !prefix.frac_part.is_empty() {
        normalized.push('.');
        normalized.push_str(prefix.frac_part);
    }

    if prefix.exponent.is_empty() {
        Decimal::from_str(&normalized).ok()
    } else {
        normalized.push('e');
        normalized.push_str(prefix.exponent);
        Decimal::from_scientific(&normalized).ok()
    }
}

/// `Some(true)` se o texto começa com um número igual a zero, `Some(false)`
/// se começa com outro número (mesmo um grande demais para `Decimal`), `None`
/// se não começa com número.
pub fn number_prefix_is_zero(raw: &str) -> Option<bool> {
    lex_number_prefix(raw).map(|prefix| prefix.mantissa_is_zero())
}

/// O utilitário central: número ou zero. Nunca falha.
pub fn decimal_or_zero(raw: &str) -> Decimal {
    parse_number_prefix(raw).unwrap_or(Decimal::ZERO)
}

/// Mesma regra para valores JSON (mapas de horas, flags, etc).
pub fn value_to_decimal_or_zero(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => decimal_or_zero(&n.to_string()),
        Value::String(s) => decimal_or_zero(s),
        _ => Decimal::ZERO,
    }
}

/// Texto cru de um valor JSON, do jeito que foi digitado.
pub fn value_to_raw_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Aceita string, número, booleano ou null e guarda como texto cru.
/// Usado nos campos de material, que são persistidos exatamente como digitados.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_raw_string(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn parses_plain_numbers() {
        assert_eq!(decimal_or_zero("10"), dec("10"));
        assert_eq!(decimal_or_zero("10.50"), dec("10.50"));
        assert_eq!(decimal_or_zero("  -3.25"), dec("-3.25"));
        assert_eq!(decimal_or_zero(".5"), dec("0.5"));
        assert_eq!(decimal_or_zero("5."), dec("5"));
    }

    #[test]
    fn reads_only_the_numeric_prefix() {
        assert_eq!(decimal_or_zero("12abc"), dec("12"));
        assert_eq!(decimal_or_zero("12,5"), dec("12"));
        assert_eq!(decimal_or_zero("2e"), dec("2"));
        assert_eq!(decimal_or_zero("1.5e2"), dec("150"));
    }

    #[test]
    fn non_numeric_becomes_zero() {
        assert_eq!(decimal_or_zero("abc"), Decimal::ZERO);
        assert_eq!(decimal_or_zero(""), Decimal::ZERO);
        assert_eq!(decimal_or_zero("."), Decimal::ZERO);
        assert_eq!(decimal_or_zero("-"), Decimal::ZERO);
        assert_eq!(decimal_or_zero("sim"), Decimal::ZERO);
        assert!(parse_number_prefix("não").is_none());
    }

    #[test]
    fn zero_check_does_not_depend_on_decimal_range() {
        assert_eq!(number_prefix_is_zero("0.00"), Some(true));
        assert_eq!(number_prefix_is_zero("0e5"), Some(true));
        assert_eq!(number_prefix_is_zero("2.50"), Some(false));
        assert_eq!(number_prefix_is_zero("1e400"), Some(false));
        assert!(parse_number_prefix("1e400").is_none());
        assert_eq!(number_prefix_is_zero("sim"), None);
    }

    #[test]
    fn json_values_follow_the_same_rule() {
        assert_eq!(value_to_decimal_or_zero(&json!(5)), dec("5"));
        assert_eq!(value_to_decimal_or_zero(&json!(2.5)), dec("2.5"));
        assert_eq!(value_to_decimal_or_zero(&json!("7h")), dec("7"));
        assert_eq!(value_to_decimal_or_zero(&json!(true)), Decimal::ZERO);
        assert_eq!(value_to_decimal_or_zero(&Value::Null), Decimal::ZERO);
    }

    #[test]
    fn lenient_string_keeps_raw_text() {
        #[derive(Deserialize)]
        struct Line {
            #[serde(deserialize_with = "lenient_string")]
            price: String,
        }

        let a: Line = serde_json::from_value(json!({ "price": 10.5 })).unwrap();
        let b: Line = serde_json::from_value(json!({ "price": "abc" })).unwrap();
        let c: Line = serde_json::from_value(json!({ "price": null })).unwrap();
        assert_eq!(a.price, "10.5");
        assert_eq!(b.price, "abc");
        assert_eq!(c.price, "");
    }
}
