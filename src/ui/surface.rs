use ratatui::style::Style;

/// Capability set the widget core needs from its scrollable-surface host:
/// styled text drawing, a cursor position, viewport control and a resize
/// notification. The core holds a handle to this trait instead of
/// inheriting host behavior.
pub trait TextSurface {
    fn draw_styled(&mut self, row: usize, col: usize, text: &str, style: Style);

    fn cursor_row(&self) -> usize;
    fn cursor_col(&self) -> usize;
    fn set_cursor_row(&mut self, row: usize);
    fn set_cursor_col(&mut self, col: usize);

    fn first_visible_row(&self) -> usize;
    fn ensure_row_visible(&mut self, row: usize);
    /// Move the cursor row by `delta`, scrolling the viewport along with it.
    fn scroll_rows(&mut self, delta: i64);

    /// The content's dimensions changed; the host should resize its
    /// drawable area.
    fn dimensions_changed(&mut self);
}

/// One styled draw call recorded by `PadSurface`.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    pub row: usize,
    pub col: usize,
    pub text: String,
    pub style: Style,
}

/// In-memory pad: a grid of text lines plus the styled runs drawn onto
/// them. Hosts can blit the lines into their own terminal surface; tests
/// inspect the recorded runs directly.
#[derive(Debug, Default)]
pub struct PadSurface {
    lines: Vec<String>,
    runs: Vec<StyledRun>,
    cursor_row: usize,
    cursor_col: usize,
    first_visible_row: usize,
    page_size: usize,
    dimension_changes: usize,
}

impl PadSurface {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    pub fn line_text(&self, row: usize) -> &str {
        self.lines.get(row).map(|l| l.as_str()).unwrap_or("")
    }

    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    pub fn runs_for_row(&self, row: usize) -> Vec<&StyledRun> {
        self.runs.iter().filter(|r| r.row == row).collect()
    }

    /// Number of dimension-changed notifications received.
    pub fn dimension_changes(&self) -> usize {
        self.dimension_changes
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.runs.clear();
    }
}

impl TextSurface for PadSurface {
    fn draw_styled(&mut self, row: usize, col: usize, text: &str, style: Style) {
        while self.lines.len() <= row {
            self.lines.push(String::new());
        }
        let line = &mut self.lines[row];
        if line.chars().count() < col {
            let pad = col - line.chars().count();
            line.extend(std::iter::repeat(' ').take(pad));
        }
        let prefix: String = line.chars().take(col).collect();
        let suffix: String = line.chars().skip(col + text.chars().count()).collect();
        *line = format!("{}{}{}", prefix, text, suffix);

        self.runs.push(StyledRun {
            row,
            col,
            text: text.to_string(),
            style,
        });
    }

    fn cursor_row(&self) -> usize {
        self.cursor_row
    }

    fn cursor_col(&self) -> usize {
        self.cursor_col
    }

    fn set_cursor_row(&mut self, row: usize) {
        self.cursor_row = row;
        self.ensure_row_visible(row);
    }

    fn set_cursor_col(&mut self, col: usize) {
        self.cursor_col = col;
    }

    fn first_visible_row(&self) -> usize {
        self.first_visible_row
    }

    fn ensure_row_visible(&mut self, row: usize) {
        if row < self.first_visible_row {
            self.first_visible_row = row;
        } else if row >= self.first_visible_row + self.page_size {
            self.first_visible_row = row + 1 - self.page_size;
        }
    }

    fn scroll_rows(&mut self, delta: i64) {
        let row = if delta.is_negative() {
            self.cursor_row.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            self.cursor_row + delta as usize
        };
        self.set_cursor_row(row);
    }

    fn dimensions_changed(&mut self) {
        self.dimension_changes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_splices_text_at_offset() {
        let mut pad = PadSurface::new(10);
        pad.draw_styled(0, 0, "abcdef", Style::default());
        pad.draw_styled(0, 2, "XY", Style::default());
        assert_eq!(pad.line_text(0), "abXYef");
        assert_eq!(pad.runs().len(), 2);
    }

    #[test]
    fn test_draw_pads_short_line() {
        let mut pad = PadSurface::new(10);
        pad.draw_styled(2, 4, "hi", Style::default());
        assert_eq!(pad.line_text(2), "    hi");
        assert_eq!(pad.line_text(0), "");
    }

    #[test]
    fn test_scroll_rows_moves_cursor_and_viewport() {
        let mut pad = PadSurface::new(3);
        for _ in 0..4 {
            pad.scroll_rows(1);
        }
        assert_eq!(pad.cursor_row(), 4);
        assert_eq!(pad.first_visible_row(), 2);

        pad.scroll_rows(-1);
        assert_eq!(pad.cursor_row(), 3);

        // clamped at the top
        pad.scroll_rows(-10);
        assert_eq!(pad.cursor_row(), 0);
        assert_eq!(pad.first_visible_row(), 0);
    }
}
