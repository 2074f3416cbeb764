use serde_json::Value;

use super::format_value;

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, then falls back
/// to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "balanced",
        "Total Assets",
        "Net Income",
        "Net Change in Cash",
        "reconciliation",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", minimal_text(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, minimal_text(val));
            return;
        }
    }

    println!("{}", minimal_text(result_obj));
}

fn minimal_text(value: &Value) -> String {
    match value {
        // Tagged enums such as {"status": "balanced"} print their tag
        Value::Object(map) => match map.get("status") {
            Some(Value::String(s)) => s.clone(),
            _ => format_value(value),
        },
        Value::Null => "null".to_string(),
        _ => format_value(value),
    }
}
