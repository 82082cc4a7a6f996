use serde_json::Value;

use super::format_scalar;

/// Headline figure of each command, checked in order. Dotted paths reach
/// into nested sections such as the CDS valuation or loss distribution.
const PRIORITY_PATHS: [&str; 12] = [
    "clean_price",
    "modified_duration",
    "valuation.fair_spread",
    "z_spread",
    "bilateral_cva",
    "distribution.unexpected_loss",
    "implied_rating",
    "merton.default_probability",
    "kmv.default_probability",
    "migration.cumulative_default_probability",
    "curve.cumulative",
    "curve.points",
];

/// Print just the key answer value from the output.
///
/// Looks for the headline field of each result type, then falls back to
/// the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    for path in PRIORITY_PATHS {
        if let Some(val) = lookup(result_obj, path) {
            if !val.is_null() {
                println!("{}", format_minimal(val));
                return;
            }
        }
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |node, key| node.as_object()?.get(key))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Array(arr) if arr.iter().any(|v| v.is_object()) => serde_json::to_string(value).unwrap_or_default(),
        other => format_scalar(other),
    }
}
