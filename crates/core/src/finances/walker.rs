//! Structural walker over untyped event entries.
//!
//! Used for categories without a typed shape and for the `extra` fields of
//! typed ones.

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use super::event_shapes::MoneyAmount;

const AMOUNT_KEY: &str = "CurrencyAmount";
const CODE_KEY: &str = "CurrencyCode";

/// Parses a `CurrencyAmount` value. Upstream sends numbers, occasionally
/// numeric strings.
pub(crate) fn amount_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Collects every `CurrencyAmount`/`CurrencyCode` pair in `value`, depth first.
/// A money object is a leaf: its children are not searched.
pub(crate) fn collect_money(value: &Value, out: &mut Vec<MoneyAmount>) {
    match value {
        Value::Object(map) => {
            if let Some(raw) = map.get(AMOUNT_KEY) {
                if let Some(amount) = amount_value(raw) {
                    let currency = map
                        .get(CODE_KEY)
                        .and_then(Value::as_str)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string);
                    out.push(MoneyAmount { amount, currency });
                }
                return;
            }
            for child in map.values() {
                collect_money(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_money(child, out);
            }
        }
        _ => {}
    }
}

/// First non-empty string stored under `key` (ASCII case-insensitive),
/// searching the object itself before its children.
pub(crate) fn find_string(value: &Value, key: &str) -> Option<String> {
    match value {
        Value::Object(map) => {
            let direct = map.iter().find_map(|(k, v)| {
                if k.eq_ignore_ascii_case(key) {
                    v.as_str().filter(|s| !s.is_empty()).map(str::to_string)
                } else {
                    None
                }
            });
            direct.or_else(|| map.values().find_map(|v| find_string(v, key)))
        }
        Value::Array(items) => items.iter().find_map(|v| find_string(v, key)),
        _ => None,
    }
}
