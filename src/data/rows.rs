use crate::data::cell::CellValue;

/// Ordered row storage. By convention row 0 holds the column header labels;
/// data rows follow. Sorting and header-matching skip row 0, formatting does
/// not.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Vec<CellValue>>,
    installed: bool,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install column header labels as row 0. Replaces an existing header.
    pub fn install_header(&mut self, labels: Vec<String>) {
        let header: Vec<CellValue> = labels.into_iter().map(CellValue::Str).collect();
        if self.rows.is_empty() {
            self.rows.push(header);
        } else {
            self.rows[0] = header;
        }
        self.installed = true;
    }

    /// Replace all content with a header row plus data rows in one shot.
    pub fn replace_all(&mut self, labels: Vec<String>, data: Vec<Vec<CellValue>>) {
        self.rows.clear();
        self.install_header(labels);
        self.rows.extend(data);
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
        self.installed = true;
    }

    /// Remove the row at `index`; out of bounds is a no-op.
    pub fn remove_row(&mut self, index: usize) -> Option<Vec<CellValue>> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    /// True once a header or any row has been associated with the store.
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut Vec<Vec<CellValue>> {
        &mut self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Vec<CellValue>> {
        self.rows.get(index)
    }

    pub fn header(&self) -> Option<&Vec<CellValue>> {
        self.rows.first()
    }

    pub fn get_value(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(col)
    }

    /// Total row count, header included.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of data rows below the header.
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
