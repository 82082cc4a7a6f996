use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, format_scalar, is_record_array};

/// Format output as tables using the tabled crate.
///
/// Scalar fields of the result (nested sections flattened to dotted names)
/// go into one Field/Value table; every array of records, such as cash
/// flows or key rate durations, gets a titled table of its own.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_envelope(result, map),
            _ => print_fields(map),
        },
        Value::Array(arr) if is_record_array(arr) => print_records(arr),
        _ => println!("{}", format_scalar(value)),
    }
}

fn print_envelope(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_fields(result);

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut sections: Vec<(String, Vec<Value>)> = Vec::new();

    for (key, val) in flatten(map) {
        match val {
            Value::Array(arr) if is_record_array(&arr) => sections.push((key, arr)),
            other => builder.push_record([key, format_scalar(&other)]),
        }
    }
    println!("{}", Table::from(builder));

    for (title, records) in sections {
        println!("\n{}:", title);
        print_records(&records);
    }
}

fn print_records(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        return;
    };
    let headers: Vec<String> = flatten(first).into_iter().map(|(k, _)| k).collect();

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in arr.iter().filter_map(Value::as_object) {
        let row = flatten(item);
        builder.push_record(headers.iter().map(|h| {
            row.iter()
                .find(|(k, _)| k == h)
                .map(|(_, v)| format_scalar(v))
                .unwrap_or_default()
        }));
    }
    println!("{}", Table::from(builder));
}
