use crate::data::cell::CellValue;
use crate::data::rows::RowStore;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Load a CSV file into a RowStore. The CSV header becomes row 0; fields are
/// typed with `CellValue::from_str_infer`.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RowStore> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    let mut store = RowStore::new();
    store.install_header(headers.iter().map(|h| h.to_string()).collect());

    for result in reader.records() {
        let record = result?;
        let row: Vec<CellValue> = record.iter().map(CellValue::from_str_infer).collect();
        store.push_row(row);
    }

    info!(
        rows = store.data_row_count(),
        columns = store.column_count(),
        "Loaded CSV {}",
        path.display()
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv_types_cells() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,name,score,joined").unwrap();
        writeln!(file, "1,Alice,95.5,2023-04-01").unwrap();
        writeln!(file, "2,Bob,,2022-11-15").unwrap();
        file.flush().unwrap();

        let store = load_csv(file.path()).unwrap();

        assert_eq!(store.row_count(), 3);
        assert_eq!(store.column_count(), 4);
        assert_eq!(store.get_value(0, 1), Some(&CellValue::from("name")));
        assert_eq!(store.get_value(1, 0), Some(&CellValue::Integer(1)));
        assert_eq!(store.get_value(1, 2), Some(&CellValue::Float(95.5)));
        assert_eq!(store.get_value(2, 2), Some(&CellValue::Null));
        assert!(matches!(store.get_value(1, 3), Some(CellValue::Date(_))));
    }

    #[test]
    fn test_load_csv_missing_file_errors() {
        assert!(load_csv("/nonexistent/path.csv").is_err());
    }
}
