use crate::data::cell::CellValue;
use crate::data::rows::RowStore;
use anyhow::{Context, Result};
use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Load a JSON file holding an array of flat objects into a RowStore.
/// Column labels come from the first object's keys, in file order.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<RowStore> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let json_data: Vec<JsonValue> =
        serde_json::from_reader(reader).with_context(|| "Failed to parse JSON file")?;

    let mut store = RowStore::new();
    let Some(first) = json_data.first() else {
        return Ok(store);
    };
    let first_obj = first
        .as_object()
        .context("JSON data must be an array of objects")?;
    let column_names: Vec<String> = first_obj.keys().cloned().collect();
    store.install_header(column_names.clone());

    for json_obj in &json_data {
        if let Some(obj) = json_obj.as_object() {
            let row: Vec<CellValue> = column_names
                .iter()
                .map(|name| match obj.get(name) {
                    Some(JsonValue::Null) | None => CellValue::Null,
                    Some(JsonValue::Bool(b)) => CellValue::Str(b.to_string()),
                    Some(JsonValue::Number(n)) => {
                        if let Some(i) = n.as_i64() {
                            CellValue::Integer(i)
                        } else {
                            CellValue::Float(n.as_f64().unwrap_or(0.0))
                        }
                    }
                    Some(JsonValue::String(s)) => CellValue::from_str_infer(s),
                    Some(other) => CellValue::Str(other.to_string()),
                })
                .collect();
            store.push_row(row);
        }
    }

    info!(
        rows = store.data_row_count(),
        columns = store.column_count(),
        "Loaded JSON {}",
        path.display()
    );
    Ok(store)
}
