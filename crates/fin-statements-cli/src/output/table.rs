use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::format_value;

/// Format output as tables using the tabled crate. Nested objects in the
/// result (statement sections) get a table of their own.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_object("", map);
            }
        }
        _ => {
            println!("{}", format_value(value));
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    if let Some(Value::String(title)) = envelope.get("title") {
        println!("{}", title.to_uppercase());
    }

    match result {
        Value::Object(res_map) => print_object("", res_map),
        other => println!("{}", format_value(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Scalars first as one Field/Value table, then one table per nested object.
fn print_object(heading: &str, map: &Map<String, Value>) {
    let scalars: Vec<(&String, &Value)> = map.iter().filter(|(_, v)| !v.is_object()).collect();
    if !scalars.is_empty() {
        if !heading.is_empty() {
            println!("\n{}", heading);
        }
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in scalars {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }

    for (key, val) in map {
        if let Value::Object(inner) = val {
            let nested = if heading.is_empty() {
                key.clone()
            } else {
                format!("{heading} / {key}")
            };
            print_object(&nested, inner);
        }
    }
}
