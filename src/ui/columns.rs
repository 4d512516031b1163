use crate::data::cell::CellValue;
use ratatui::style::{Color, Modifier};
use serde::{Deserialize, Serialize};

/// Width given to a column when it is first referenced.
pub const DEFAULT_COLUMN_WIDTH: usize = 10;
/// Columns never shrink below this.
pub const MIN_COLUMN_WIDTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

/// Per-column descriptor. `source_index` is the column's permanent identity
/// into each row's value tuple and never changes; the position of the spec
/// inside the layout is the display order and may change via moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub source_index: usize,
    pub display_name: String,
    pub width: usize,
    pub alignment: Alignment,
    pub hidden: bool,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attr: Option<Modifier>,
    /// Starting character column within the rendered line. Only meaningful
    /// for non-hidden columns and only while the layout's offset cache is
    /// fresh.
    #[serde(skip)]
    offset: usize,
}

impl ColumnSpec {
    pub fn new(source_index: usize) -> Self {
        Self {
            source_index,
            display_name: String::new(),
            width: DEFAULT_COLUMN_WIDTH,
            alignment: Alignment::Left,
            hidden: false,
            fg: None,
            bg: None,
            attr: None,
            offset: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn has_style_override(&self) -> bool {
        self.fg.is_some() || self.bg.is_some() || self.attr.is_some()
    }
}

/// Ordered sequence of column specs in display order, with a cached offset
/// layout. Every mutation of width, visibility or order marks the cache
/// dirty; every offset-dependent query repairs it first.
#[derive(Debug, Clone, Default)]
pub struct ColumnLayout {
    specs: Vec<ColumnSpec>,
    offsets_dirty: bool,
    total_width: usize,
}

impl ColumnLayout {
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            offsets_dirty: true,
            total_width: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Get-or-create the spec at a display position. Creation fills any gap
    /// up to `position` with default specs whose `source_index` equals their
    /// position at creation time, and is idempotent per position.
    pub fn get(&mut self, position: usize) -> &mut ColumnSpec {
        while self.specs.len() <= position {
            self.specs.push(ColumnSpec::new(self.specs.len()));
            self.offsets_dirty = true;
        }
        &mut self.specs[position]
    }

    /// Read-only access without lazy creation.
    pub fn spec(&self, position: usize) -> Option<&ColumnSpec> {
        self.specs.get(position)
    }

    /// Non-hidden specs with their display positions, in display order.
    /// This is the canonical print and navigation order.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &ColumnSpec)> + '_ {
        self.specs
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.hidden)
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    /// Walk the visible columns assigning each its starting character
    /// column; one character per column is reserved as a separator.
    pub fn recompute_offsets(&mut self) {
        let mut total = 0;
        for spec in self.specs.iter_mut().filter(|c| !c.hidden) {
            spec.offset = total;
            total += spec.width + 1;
        }
        self.total_width = total;
        self.offsets_dirty = false;
    }

    pub fn ensure_offsets(&mut self) {
        if self.offsets_dirty {
            self.recompute_offsets();
        }
    }

    pub fn invalidate_offsets(&mut self) {
        self.offsets_dirty = true;
    }

    /// Total character width of all visible columns plus separators. Sizes
    /// the underlying drawable surface.
    pub fn total_width(&mut self) -> usize {
        self.ensure_offsets();
        self.total_width
    }

    /// Set a column's width, clamped to the minimum.
    pub fn set_width(&mut self, position: usize, width: usize) {
        self.get(position).width = width.max(MIN_COLUMN_WIDTH);
        self.offsets_dirty = true;
    }

    pub fn set_hidden(&mut self, position: usize, hidden: bool) {
        self.get(position).hidden = hidden;
        self.offsets_dirty = true;
    }

    /// Alignment does not affect offsets, so no invalidation.
    pub fn set_alignment(&mut self, position: usize, alignment: Alignment) {
        self.get(position).alignment = alignment;
    }

    /// Relocate a spec within the display order.
    pub fn move_column(&mut self, from: usize, to: usize) -> bool {
        if from >= self.specs.len() || to >= self.specs.len() {
            return false;
        }
        let spec = self.specs.remove(from);
        self.specs.insert(to, spec);
        self.offsets_dirty = true;
        true
    }

    /// Cached offset of the column at a display position, or None if the
    /// column is hidden or absent.
    pub fn offset_of(&mut self, position: usize) -> Option<usize> {
        self.ensure_offsets();
        match self.specs.get(position) {
            Some(spec) if !spec.hidden => Some(spec.offset),
            _ => None,
        }
    }

    /// Map a raw character column to the display position of the column
    /// under it: the greatest visible position whose offset is <= the
    /// cursor column.
    pub fn column_for_cursor(&mut self, cursor_col: usize) -> Option<usize> {
        self.ensure_offsets();
        self.visible()
            .take_while(|(_, spec)| spec.offset <= cursor_col)
            .last()
            .map(|(position, _)| position)
    }

    /// Width needed to show `text` plus the separator column.
    pub fn width_to_fit(text: &str) -> usize {
        text.chars().count() + 1
    }

    /// Longest cell text at `source_index` over at most `row_scan_limit`
    /// rows, floor 3. Bounds expand-to-max-width on very large tables.
    pub fn widest_over(
        &self,
        source_index: usize,
        rows: &[Vec<CellValue>],
        row_scan_limit: usize,
    ) -> usize {
        let mut widest = MIN_COLUMN_WIDTH;
        for row in rows.iter().take(row_scan_limit) {
            if let Some(cell) = row.get(source_index) {
                widest = widest.max(cell.display_len());
            }
        }
        widest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_of(widths: &[usize]) -> ColumnLayout {
        let mut layout = ColumnLayout::new();
        for (i, &w) in widths.iter().enumerate() {
            layout.set_width(i, w);
        }
        layout
    }

    #[test]
    fn test_lazy_get_fills_gaps_and_is_idempotent() {
        let mut layout = ColumnLayout::new();
        layout.get(2).display_name = "c".to_string();

        assert_eq!(layout.len(), 3);
        assert_eq!(layout.spec(0).unwrap().source_index, 0);
        assert_eq!(layout.spec(1).unwrap().source_index, 1);
        assert_eq!(layout.spec(2).unwrap().source_index, 2);
        assert_eq!(layout.spec(1).unwrap().width, DEFAULT_COLUMN_WIDTH);

        // referencing again must not reset anything
        layout.get(2);
        assert_eq!(layout.spec(2).unwrap().display_name, "c");
    }

    #[test]
    fn test_offset_invariant() {
        let mut layout = layout_of(&[10, 5, 8]);
        layout.recompute_offsets();

        assert_eq!(layout.spec(0).unwrap().offset(), 0);
        assert_eq!(layout.spec(1).unwrap().offset(), 11);
        assert_eq!(layout.spec(2).unwrap().offset(), 17);
        assert_eq!(layout.total_width(), 26);
    }

    #[test]
    fn test_hidden_columns_skip_offsets() {
        let mut layout = layout_of(&[10, 5, 8]);
        layout.set_hidden(1, true);
        layout.recompute_offsets();

        assert_eq!(layout.spec(0).unwrap().offset(), 0);
        assert_eq!(layout.spec(2).unwrap().offset(), 11);
        assert_eq!(layout.total_width(), 20);
        assert_eq!(layout.visible_count(), 2);
    }

    #[test]
    fn test_column_for_cursor() {
        let mut layout = layout_of(&[10, 5, 8]);
        // offsets: 0, 11, 17
        assert_eq!(layout.column_for_cursor(0), Some(0));
        assert_eq!(layout.column_for_cursor(10), Some(0));
        assert_eq!(layout.column_for_cursor(11), Some(1));
        assert_eq!(layout.column_for_cursor(16), Some(1));
        assert_eq!(layout.column_for_cursor(17), Some(2));
        assert_eq!(layout.column_for_cursor(500), Some(2));
    }

    #[test]
    fn test_column_for_cursor_empty_layout() {
        let mut layout = ColumnLayout::new();
        assert_eq!(layout.column_for_cursor(0), None);
    }

    #[test]
    fn test_move_column_reorders_and_recomputes() {
        let mut layout = layout_of(&[10, 5, 8]);
        layout.recompute_offsets();

        assert!(layout.move_column(2, 0));
        assert_eq!(layout.spec(0).unwrap().source_index, 2);

        // cache was invalidated, next query repairs it
        assert_eq!(layout.offset_of(0), Some(0));
        assert_eq!(layout.offset_of(1), Some(9));
        assert_eq!(layout.offset_of(2), Some(20));
    }

    #[test]
    fn test_set_width_clamps_to_floor() {
        let mut layout = ColumnLayout::new();
        layout.set_width(0, 1);
        assert_eq!(layout.spec(0).unwrap().width, MIN_COLUMN_WIDTH);
    }

    #[test]
    fn test_widest_over_floor_and_limit() {
        let layout = ColumnLayout::new();
        let rows = vec![
            vec![CellValue::from("ab")],
            vec![CellValue::from("abcdef")],
            vec![CellValue::from("abcdefghij")],
        ];

        assert_eq!(layout.widest_over(0, &rows, 99), 10);
        // scan limit stops before the widest row
        assert_eq!(layout.widest_over(0, &rows, 2), 6);
        // no rows at all still yields the floor
        assert_eq!(layout.widest_over(0, &[], 99), MIN_COLUMN_WIDTH);
    }

    #[test]
    fn test_width_to_fit() {
        assert_eq!(ColumnLayout::width_to_fit("hello"), 6);
    }
}
