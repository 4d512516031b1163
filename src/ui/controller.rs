use crate::data::cell::CellValue;
use crate::data::rows::RowStore;
use crate::ui::circular::Circular;
use crate::ui::columns::{Alignment, ColumnLayout, MIN_COLUMN_WIDTH};
use crate::ui::renderer::Renderer;
use crate::ui::selection::RowSelection;
use crate::ui::sorter::RowSorter;
use crate::ui::surface::TextSurface;
use anyhow::{bail, Result};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::debug;

/// Rows scanned when auto-sizing a column to its widest content.
pub const MAX_WIDTH_SCAN_ROWS: usize = 99;

/// Orchestrates the table core over a scrollable surface: owns the rows,
/// the column layout, the sorter and the selection, and translates
/// navigation, sort, search and filter requests into layout and surface
/// calls.
pub struct TableController<S: TextSurface> {
    surface: S,
    store: RowStore,
    layout: ColumnLayout,
    sorter: RowSorter,
    selection: RowSelection,
    renderer: Renderer,
    column_cursor: Option<Circular>,
    filter_rows: Option<Vec<usize>>,
}

impl<S: TextSurface> TableController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            store: RowStore::new(),
            layout: ColumnLayout::new(),
            sorter: RowSorter::new(),
            selection: RowSelection::new(),
            renderer: Renderer::new(),
            column_cursor: None,
            filter_rows: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn store(&self) -> &RowStore {
        &self.store
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut ColumnLayout {
        &mut self.layout
    }

    pub fn sorter(&self) -> &RowSorter {
        &self.sorter
    }

    pub fn sorter_mut(&mut self) -> &mut RowSorter {
        &mut self.sorter
    }

    pub fn selection(&self) -> &RowSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut RowSelection {
        &mut self.selection
    }

    // --- content installation ---------------------------------------------

    /// Install header labels as row 0, lazily creating a column spec per
    /// label (existing widths are kept), and size the column cursor to the
    /// new column count.
    pub fn install_columns(&mut self, labels: Vec<String>) {
        self.init_columns(&labels);
        self.store.install_header(labels);
        self.layout.invalidate_offsets();
        self.surface.dimensions_changed();
    }

    /// Replace header and data in one shot, erasing existing content.
    pub fn replace_all(&mut self, labels: Vec<String>, data: Vec<Vec<CellValue>>) {
        self.init_columns(&labels);
        self.store.replace_all(labels, data);
        self.filter_rows = None;
        self.layout.invalidate_offsets();
        self.surface.dimensions_changed();
    }

    /// Adopt an already-built store (e.g. from the CSV or JSON loaders).
    /// Its row 0 provides the column labels.
    pub fn install_store(&mut self, store: RowStore) {
        let labels: Vec<String> = store
            .header()
            .map(|h| h.iter().map(|c| c.to_string()).collect())
            .unwrap_or_default();
        self.init_columns(&labels);
        self.store = store;
        self.filter_rows = None;
        self.layout.invalidate_offsets();
        self.surface.dimensions_changed();
    }

    fn init_columns(&mut self, labels: &[String]) {
        for (i, name) in labels.iter().enumerate() {
            self.layout.get(i).display_name = name.clone();
        }
        self.column_cursor = if labels.is_empty() {
            None
        } else {
            Some(Circular::new(labels.len() - 1))
        };
    }

    /// Append a row. If no content was installed yet the row is taken as
    /// the header.
    pub fn add_row(&mut self, row: Vec<CellValue>) {
        if !self.store.is_installed() {
            let labels: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            self.install_columns(labels);
            return;
        }
        self.store.push_row(row);
        self.layout.invalidate_offsets();
        self.surface.dimensions_changed();
    }

    /// Delete the row at `index`; out of bounds is a no-op.
    pub fn delete_row(&mut self, index: usize) -> bool {
        if self.store.remove_row(index).is_none() {
            return false;
        }
        self.layout.invalidate_offsets();
        self.surface.dimensions_changed();
        true
    }

    // --- column structure --------------------------------------------------

    /// Adding columns after installation is not supported.
    pub fn add_column(&mut self) -> Result<()> {
        bail!("column add is not implemented")
    }

    /// Removing columns is not supported; hide them instead.
    pub fn remove_column(&mut self) -> Result<()> {
        bail!("column remove is not implemented")
    }

    pub fn column_width(&mut self, position: usize, width: usize) {
        self.layout.set_width(position, width);
        self.surface.dimensions_changed();
    }

    pub fn column_align(&mut self, position: usize, alignment: Alignment) {
        self.layout.set_alignment(position, alignment);
    }

    pub fn column_hidden(&mut self, position: usize, hidden: bool) {
        self.layout.set_hidden(position, hidden);
        self.surface.dimensions_changed();
    }

    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        let moved = self.layout.move_column(from, to);
        if moved {
            self.surface.dimensions_changed();
        }
        moved
    }

    // --- navigation ---------------------------------------------------------

    /// Jump the cursor to the next column, wrapping past the last one; a
    /// wrap also scrolls down one row.
    pub fn next_column(&mut self) {
        let Some(cursor) = self.column_cursor.as_mut() else {
            return;
        };
        let c = cursor.next();
        let wrapped = c < cursor.last_index();
        if let Some(offset) = self.layout.offset_of(c) {
            self.surface.set_cursor_col(offset);
        }
        if wrapped {
            self.surface.scroll_rows(1);
        }
    }

    /// Jump the cursor to the previous column, wrapping before the first
    /// one; a wrap also scrolls up one row.
    pub fn prev_column(&mut self) {
        let Some(cursor) = self.column_cursor.as_mut() else {
            return;
        };
        let c = cursor.previous();
        let wrapped = c > cursor.last_index();
        if let Some(offset) = self.layout.offset_of(c) {
            self.surface.set_cursor_col(offset);
        }
        if wrapped {
            self.surface.scroll_rows(-1);
        }
    }

    /// Display position of the column under the surface cursor.
    pub fn current_column(&mut self) -> Option<usize> {
        self.layout.column_for_cursor(self.surface.cursor_col())
    }

    // --- column sizing ------------------------------------------------------

    pub fn expand_column(&mut self) -> bool {
        let Some(pos) = self.current_column() else {
            return false;
        };
        let width = self.layout.get(pos).width;
        self.layout.set_width(pos, width + 1);
        self.surface.dimensions_changed();
        true
    }

    /// Shrink the current column by one; no-op at the minimum width.
    pub fn contract_column(&mut self) -> bool {
        let Some(pos) = self.current_column() else {
            return false;
        };
        let width = self.layout.get(pos).width;
        if width <= MIN_COLUMN_WIDTH {
            return false;
        }
        self.layout.set_width(pos, width - 1);
        self.surface.dimensions_changed();
        true
    }

    /// Resize the current column to `width`, or to fit the cell under the
    /// cursor when no width is given.
    pub fn expand_column_to_width(&mut self, width: Option<usize>) -> bool {
        let Some(pos) = self.current_column() else {
            return false;
        };
        let width = match width {
            Some(w) => w,
            None => {
                let source = self.layout.get(pos).source_index;
                let row = self.surface.cursor_row();
                let text = self
                    .store
                    .get_value(row, source)
                    .map(|c| c.to_string())
                    .unwrap_or_default();
                ColumnLayout::width_to_fit(&text)
            }
        };
        self.layout.set_width(pos, width);
        self.surface.dimensions_changed();
        true
    }

    /// Resize the current column to its widest cell over a bounded row
    /// scan.
    pub fn expand_column_to_max_width(&mut self) -> bool {
        let Some(pos) = self.current_column() else {
            return false;
        };
        let source = self.layout.get(pos).source_index;
        let width = self
            .layout
            .widest_over(source, self.store.rows(), MAX_WIDTH_SCAN_ROWS);
        self.layout.set_width(pos, width);
        self.surface.dimensions_changed();
        true
    }

    // --- sorting ------------------------------------------------------------

    pub fn is_header_row(&self) -> bool {
        self.surface.cursor_row() == 0
    }

    /// Toggle the sort on the column under the cursor and re-sort. Only
    /// valid with the cursor on the header row; unsortable columns are
    /// skipped. Returns whether a sort ran.
    pub fn sort_on_header_click(&mut self) -> Result<bool> {
        if !self.is_header_row() {
            return Ok(false);
        }
        let Some(pos) = self.current_column() else {
            return Ok(false);
        };
        let source = self.layout.get(pos).source_index;
        if !self.sorter.sortable(source) {
            debug!(column = source, "column marked unsortable");
            return Ok(false);
        }
        self.sorter.toggle_primary(source);
        self.sorter.sort(&mut self.store)?;
        self.layout.invalidate_offsets();
        self.surface.dimensions_changed();
        Ok(true)
    }

    // --- search and filter --------------------------------------------------

    /// Find the next row whose textual cell content contains `text`,
    /// scanning visible columns in display order. Prefers the first match
    /// strictly below the current row, wrapping to the first match overall.
    /// Returns the row index and absolute character column of the match.
    pub fn find_next(&mut self, text: &str) -> Option<(usize, usize)> {
        if text.is_empty() {
            return None;
        }
        self.layout.ensure_offsets();
        let current_row = self.surface.cursor_row();
        let mut first = None;

        for (ix, row) in self.store.rows().iter().enumerate() {
            for (_, spec) in self.layout.visible() {
                let Some(cell) = row.get(spec.source_index) else {
                    continue;
                };
                let rendered = cell.to_string();
                if let Some(byte) = rendered.find(text) {
                    // byte index into the cell text, converted to a char
                    // count so it lines up with the char-based offsets
                    let col = rendered[..byte].chars().count() + spec.offset();
                    if first.is_none() {
                        first = Some((ix, col));
                    }
                    if ix > current_row {
                        return Some((ix, col));
                    }
                }
            }
        }
        first
    }

    /// Restrict rendering to the rows matching `predicate`, keeping their
    /// original order. An empty result leaves any previous filter in force
    /// and reports 0; otherwise returns the match count.
    pub fn filter<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(usize, &[CellValue]) -> bool,
    {
        let matches: Vec<usize> = self
            .store
            .rows()
            .iter()
            .enumerate()
            .filter(|(ix, row)| predicate(*ix, row))
            .map(|(ix, _)| ix)
            .collect();
        debug!(count = matches.len(), "filter matches");
        if matches.is_empty() {
            return 0;
        }
        let count = matches.len();
        self.filter_rows = Some(matches);
        self.surface.dimensions_changed();
        count
    }

    pub fn clear_filter(&mut self) {
        if self.filter_rows.take().is_some() {
            self.surface.dimensions_changed();
        }
    }

    pub fn is_filtered(&self) -> bool {
        self.filter_rows.is_some()
    }

    pub fn matching_indices(&self) -> Option<&[usize]> {
        self.filter_rows.as_deref()
    }

    // --- selection ----------------------------------------------------------

    pub fn toggle_row_selection(&mut self, row: usize) {
        self.selection.toggle(row);
    }

    // --- rendering ----------------------------------------------------------

    /// Draw every row, or only the recorded filter matches in their
    /// recorded order when a filter is active.
    pub fn render_all(&mut self) {
        self.layout.ensure_offsets();
        self.renderer.refresh_style_check(&self.layout);

        if let Some(indices) = &self.filter_rows {
            for (line, &ix) in indices.iter().enumerate() {
                if let Some(row) = self.store.row(ix) {
                    self.renderer.render(&mut self.surface, line, row, &self.layout);
                }
            }
        } else {
            for (ix, row) in self.store.rows().iter().enumerate() {
                self.renderer.render(&mut self.surface, ix, row, &self.layout);
            }
        }
    }

    /// Total character width of the visible columns; sizes the surface.
    pub fn total_width(&mut self) -> usize {
        self.layout.total_width()
    }

    // --- key handling -------------------------------------------------------

    /// Route the table key bindings: `w`/`b` column navigation, `+`/`-`
    /// resize, `=` fit-to-cell, Enter sorts when on the header row.
    /// Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('w') => {
                self.next_column();
                Ok(true)
            }
            KeyCode::Char('b') => {
                self.prev_column();
                Ok(true)
            }
            KeyCode::Char('+') => {
                self.expand_column();
                Ok(true)
            }
            KeyCode::Char('-') => {
                self.contract_column();
                Ok(true)
            }
            KeyCode::Char('=') => {
                self.expand_column_to_width(None);
                Ok(true)
            }
            KeyCode::Enter => {
                if self.is_header_row() {
                    self.sort_on_header_click()?;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            _ => Ok(false),
        }
    }

    // --- status -------------------------------------------------------------

    /// One-line summary for the host's status bar.
    pub fn status_info(&self) -> String {
        let total = self.store.data_row_count();
        let mut status = match &self.filter_rows {
            Some(rows) => format!("Rows {}/{} (filtered)", rows.len(), total),
            None => format!("Rows {}", total),
        };

        if !self.sorter.keys().is_empty() {
            let keys: Vec<String> = self
                .sorter
                .keys()
                .iter()
                .map(|k| {
                    let name = self
                        .store
                        .header()
                        .and_then(|h| h.get(k.source_index))
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| k.source_index.to_string());
                    let arrow = match k.direction {
                        crate::ui::sorter::SortDirection::Ascending => "↑",
                        crate::ui::sorter::SortDirection::Descending => "↓",
                    };
                    format!("{}{}", name, arrow)
                })
                .collect();
            status.push_str(&format!(" | Sort: {}", keys.join(", ")));
        }

        if !self.selection.is_empty() {
            status.push_str(&format!(
                " | {} selected",
                self.selection.selected_rows().len()
            ));
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::surface::PadSurface;
    use crossterm::event::KeyModifiers;

    fn controller() -> TableController<PadSurface> {
        let mut c = TableController::new(PadSurface::new(10));
        c.replace_all(
            vec!["name".to_string(), "qty".to_string()],
            vec![
                vec![CellValue::from("apple"), CellValue::Integer(3)],
                vec![CellValue::from("pear"), CellValue::Integer(1)],
                vec![CellValue::from("plum"), CellValue::Integer(2)],
            ],
        );
        c
    }

    #[test]
    fn test_install_columns_sets_defaults_and_cursor() {
        let mut c = TableController::new(PadSurface::new(10));
        c.install_columns(vec!["a".to_string(), "b".to_string()]);

        assert_eq!(c.store().row_count(), 1);
        assert_eq!(c.layout().len(), 2);
        assert_eq!(c.layout().spec(0).unwrap().width, 10);
        assert_eq!(c.layout().spec(1).unwrap().display_name, "b");
        assert_eq!(c.surface().dimension_changes(), 1);
    }

    #[test]
    fn test_first_added_row_becomes_header() {
        let mut c = TableController::new(PadSurface::new(10));
        c.add_row(vec![CellValue::from("id"), CellValue::from("name")]);
        assert_eq!(c.store().row_count(), 1);
        c.add_row(vec![CellValue::Integer(1), CellValue::from("x")]);
        assert_eq!(c.store().data_row_count(), 1);
    }

    #[test]
    fn test_next_column_moves_cursor_and_wraps_with_scroll() {
        let mut c = controller();
        // widths default to 10: offsets 0 and 11
        c.next_column();
        assert_eq!(c.surface().cursor_col(), 11);
        assert_eq!(c.surface().cursor_row(), 0);

        c.next_column(); // wraps to column 0, scrolls down one row
        assert_eq!(c.surface().cursor_col(), 0);
        assert_eq!(c.surface().cursor_row(), 1);
    }

    #[test]
    fn test_prev_column_wraps_with_scroll_up() {
        let mut c = controller();
        c.surface_mut().set_cursor_row(3);
        c.prev_column(); // wraps from 0 to last column, scrolls up
        assert_eq!(c.surface().cursor_col(), 11);
        assert_eq!(c.surface().cursor_row(), 2);
    }

    #[test]
    fn test_contract_column_stops_at_floor() {
        let mut c = controller();
        for _ in 0..20 {
            c.contract_column();
        }
        assert_eq!(c.layout().spec(0).unwrap().width, MIN_COLUMN_WIDTH);
        assert!(!c.contract_column());
    }

    #[test]
    fn test_expand_column_grows_by_one() {
        let mut c = controller();
        assert!(c.expand_column());
        assert_eq!(c.layout().spec(0).unwrap().width, 11);
    }

    #[test]
    fn test_expand_column_to_max_width() {
        let mut c = controller();
        c.expand_column_to_max_width();
        // widest cell in column 0 is "apple" (5), header "name" is 4
        assert_eq!(c.layout().spec(0).unwrap().width, 5);
    }

    #[test]
    fn test_sort_on_header_click_re_sorts() {
        let mut c = controller();
        assert!(c.sort_on_header_click().unwrap());

        let names: Vec<String> = c
            .store()
            .rows()
            .iter()
            .map(|r| r[0].to_string())
            .collect();
        assert_eq!(names, vec!["name", "apple", "pear", "plum"]);

        // second click flips to descending
        assert!(c.sort_on_header_click().unwrap());
        let names: Vec<String> = c
            .store()
            .rows()
            .iter()
            .map(|r| r[0].to_string())
            .collect();
        assert_eq!(names, vec!["name", "plum", "pear", "apple"]);
    }

    #[test]
    fn test_sort_off_header_row_is_noop() {
        let mut c = controller();
        c.surface_mut().set_cursor_row(2);
        assert!(!c.sort_on_header_click().unwrap());
        assert!(c.sorter().keys().is_empty());
    }

    #[test]
    fn test_sort_skips_unsortable_column() {
        let mut c = controller();
        c.sorter_mut().set_sortable(0, false);
        assert!(!c.sort_on_header_click().unwrap());
    }

    #[test]
    fn test_find_next_prefers_rows_below_cursor_then_wraps() {
        let mut c = TableController::new(PadSurface::new(10));
        c.replace_all(
            vec!["v".to_string()],
            vec![
                vec![CellValue::from("x-ray")],   // row 1
                vec![CellValue::from("none")],    // row 2
                vec![CellValue::from("none")],    // row 3
                vec![CellValue::from("axes")],    // row 4
            ],
        );

        assert_eq!(c.find_next("x"), Some((1, 0)));

        // from row 4 the only matches are at rows 1 and 4; wrap to first overall
        c.surface_mut().set_cursor_row(4);
        assert_eq!(c.find_next("x"), Some((1, 0)));

        c.surface_mut().set_cursor_row(1);
        assert_eq!(c.find_next("x"), Some((4, 1)));
    }

    #[test]
    fn test_find_next_reports_offset_of_second_column() {
        let mut c = controller();
        // "pear" row qty=1; search digit in second column (offset 11)
        assert_eq!(c.find_next("1"), Some((2, 11)));
    }

    #[test]
    fn test_find_next_counts_chars_in_multibyte_cells() {
        let mut c = TableController::new(PadSurface::new(10));
        c.replace_all(
            vec!["v".to_string()],
            vec![vec![CellValue::from("héx")]],
        );

        // 'é' is two bytes but one column; the match sits at char 2
        assert_eq!(c.find_next("x"), Some((1, 2)));
    }

    #[test]
    fn test_empty_filter_leaves_state_unchanged() {
        let mut c = controller();
        assert_eq!(c.filter(|_, row| row[0].to_string().contains('p')), 3);
        assert!(c.is_filtered());
        let before = c.matching_indices().unwrap().to_vec();

        assert_eq!(c.filter(|_, _| false), 0);
        assert!(c.is_filtered());
        assert_eq!(c.matching_indices().unwrap(), &before[..]);
    }

    #[test]
    fn test_render_all_respects_filter() {
        let mut c = controller();
        c.filter(|ix, row| ix == 0 || row[0].to_string() == "pear");
        c.render_all();

        assert_eq!(
            c.surface().line_text(0),
            format!("{:<10} {:<10} ", "name", "qty")
        );
        assert!(c.surface().line_text(1).starts_with("pear"));
        assert_eq!(c.surface().line_text(2), "");
    }

    #[test]
    fn test_handle_key_routes_bindings() {
        let mut c = controller();
        let key = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert!(c.handle_key(key(KeyCode::Char('w'))).unwrap());
        assert_eq!(c.surface().cursor_col(), 11);
        assert!(c.handle_key(key(KeyCode::Char('b'))).unwrap());
        assert_eq!(c.surface().cursor_col(), 0);
        assert!(c.handle_key(key(KeyCode::Char('+'))).unwrap());
        assert_eq!(c.layout().spec(0).unwrap().width, 11);
        assert!(c.handle_key(key(KeyCode::Char('-'))).unwrap());
        assert_eq!(c.layout().spec(0).unwrap().width, 10);
        assert!(!c.handle_key(key(KeyCode::Char('q'))).unwrap());
    }

    #[test]
    fn test_add_remove_column_are_configuration_errors() {
        let mut c = controller();
        assert!(c.add_column().is_err());
        assert!(c.remove_column().is_err());
    }

    #[test]
    fn test_status_info_mentions_sort_and_filter() {
        let mut c = controller();
        c.sort_on_header_click().unwrap();
        c.filter(|ix, _| ix != 2);
        let status = c.status_info();
        assert!(status.contains("filtered"), "{}", status);
        assert!(status.contains("name↑"), "{}", status);
    }
}
