use serde_json::Value;
use std::io;

use super::format_value;

/// Write output as CSV to stdout.
///
/// Statement results become `section,line_item,value` rows when the result
/// holds nested objects, otherwise two-column `field,value` rows.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) if map.values().any(Value::is_object) => {
            let _ = wtr.write_record(["section", "field", "value"]);
            write_nested(&mut wtr, "", map);
        }
        Value::Object(map) => {
            let _ = wtr.write_record(["field", "value"]);
            for (key, val) in map {
                let _ = wtr.write_record([key.as_str(), &format_value(val)]);
            }
        }
        _ => {
            let _ = wtr.write_record([&format_value(result)]);
        }
    }

    let _ = wtr.flush();
}

fn write_nested(
    wtr: &mut csv::Writer<io::StdoutLock<'_>>,
    prefix: &str,
    map: &serde_json::Map<String, Value>,
) {
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                write_nested(wtr, &path, inner);
            }
            _ => {
                let _ = wtr.write_record([prefix, key.as_str(), &format_value(val)]);
            }
        }
    }
}
