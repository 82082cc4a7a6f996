use serde_json::{Map, Value};
use std::io;

use super::{flatten, format_scalar, is_record_array};

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// A result whose only array of records is, say, its cash flows or its
/// capital allocations is written one row per record. Everything else is
/// written as `field,value` pairs with nested sections flattened.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => write_result(&mut wtr, result),
            _ => write_fields(&mut wtr, map),
        },
        Value::Array(arr) if is_record_array(arr) => write_records(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([format_scalar(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_result(wtr: &mut StdoutWriter<'_>, result: &Map<String, Value>) {
    let record_arrays: Vec<&Vec<Value>> = result
        .values()
        .filter_map(Value::as_array)
        .filter(|arr| is_record_array(arr))
        .collect();

    // A single table of records is the natural CSV shape; otherwise fall back to pairs.
    match record_arrays.as_slice() {
        [records] => write_records(wtr, records),
        _ => write_fields(wtr, result),
    }
}

fn write_fields(wtr: &mut StdoutWriter<'_>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in flatten(map) {
        let rendered = match &val {
            Value::Array(arr) if is_record_array(arr) => serde_json::to_string(&val).unwrap_or_default(),
            other => format_scalar(other),
        };
        let _ = wtr.write_record([key, rendered]);
    }
}

fn write_records(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        return;
    };
    let headers: Vec<String> = flatten(first).into_iter().map(|(k, _)| k).collect();
    let _ = wtr.write_record(&headers);

    for item in arr.iter().filter_map(Value::as_object) {
        let row = flatten(item);
        let cells: Vec<String> = headers
            .iter()
            .map(|h| {
                row.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| format_scalar(v))
                    .unwrap_or_default()
            })
            .collect();
        let _ = wtr.write_record(&cells);
    }
}
