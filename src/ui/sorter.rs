use crate::data::cell::CellValue;
use crate::data::cell_compare::compare_optional_cells;
use crate::data::rows::RowStore;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Active sort keys are capped at this; the key list doubles as its own
/// history, oldest evicted first.
pub const MAX_SORT_KEYS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub source_index: usize,
    pub direction: SortDirection,
}

/// Multi-key row sorter. Sorts the store in place, keeping the header row
/// pinned at index 0. Toggling the same column twice flips its direction;
/// toggling a new column prepends it as the primary ascending key.
#[derive(Debug, Clone, Default)]
pub struct RowSorter {
    keys: Vec<SortKey>,
    sortable_overrides: HashMap<usize, bool>,
}

impl RowSorter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn set_keys(&mut self, keys: Vec<SortKey>) {
        self.keys = keys;
        self.keys.truncate(MAX_SORT_KEYS);
    }

    /// Mark a column sortable or not. The sorter itself never consults this
    /// inside `sort`; callers check it before toggling.
    pub fn set_sortable(&mut self, source_index: usize, sortable: bool) {
        self.sortable_overrides.insert(source_index, sortable);
    }

    pub fn sortable(&self, source_index: usize) -> bool {
        *self.sortable_overrides.get(&source_index).unwrap_or(&true)
    }

    /// If the primary key already targets `source_index`, flip its
    /// direction. Otherwise drop any older entry for that column and
    /// prepend a fresh ascending key, evicting beyond the capacity.
    pub fn toggle_primary(&mut self, source_index: usize) {
        if let Some(first) = self.keys.first_mut() {
            if first.source_index == source_index {
                first.direction = first.direction.reversed();
                return;
            }
        }
        self.keys.retain(|k| k.source_index != source_index);
        self.keys.insert(
            0,
            SortKey {
                source_index,
                direction: SortDirection::Ascending,
            },
        );
        self.keys.truncate(MAX_SORT_KEYS);
    }

    /// Sort the store's data rows in place. The header row is detached
    /// before sorting and reinserted at index 0 on every exit path. No-op
    /// when there are no keys or no data rows; calling before any content
    /// has been associated with the store is a configuration error.
    pub fn sort(&self, store: &mut RowStore) -> Result<()> {
        if !store.is_installed() {
            bail!("no data associated with sorter");
        }
        if self.keys.is_empty() || store.row_count() <= 1 {
            return Ok(());
        }
        debug!(keys = ?self.keys, "sorting rows");

        let rows = store.rows_mut();
        let header = rows.remove(0);
        let mut guard = HeaderGuard {
            rows,
            header: Some(header),
        };
        let keys = &self.keys;
        guard.rows.sort_by(|a, b| compare_rows(a, b, keys));
        Ok(())
    }
}

/// Reinserts the detached header at index 0 when dropped, so the header
/// survives any exit from the sorting block.
struct HeaderGuard<'a> {
    rows: &'a mut Vec<Vec<CellValue>>,
    header: Option<Vec<CellValue>>,
}

impl Drop for HeaderGuard<'_> {
    fn drop(&mut self) {
        if let Some(header) = self.header.take() {
            self.rows.insert(0, header);
        }
    }
}

/// Keys in priority order, first non-equal result wins. Descending keys
/// compare with operands swapped, which places nulls last for them.
fn compare_rows(a: &[CellValue], b: &[CellValue], keys: &[SortKey]) -> Ordering {
    for key in keys {
        let i = key.source_index;
        let ord = match key.direction {
            SortDirection::Ascending => compare_optional_cells(a.get(i), b.get(i)),
            SortDirection::Descending => compare_optional_cells(b.get(i), a.get(i)),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}
