use crate::data::cell::CellValue;
use crate::ui::columns::{Alignment, ColumnLayout, ColumnSpec};
use crate::ui::surface::TextSurface;
use ratatui::style::{Color, Style};

/// Formats rows into fixed-width fields and issues styled draw calls to the
/// surface. Never mutates row data or the column layout.
///
/// A whole row is normally drawn as a single styled run. When any visible
/// column carries a style override the renderer switches to the slower
/// field-by-field path; that check is cached and refreshed by the
/// controller whenever the layout changes.
#[derive(Debug, Clone)]
pub struct Renderer {
    header_style: Style,
    content_style: Style,
    per_column_styles: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            header_style: Style::default().fg(Color::Red).bg(Color::White),
            content_style: Style::default(),
            per_column_styles: false,
        }
    }

    pub fn with_header_style(mut self, style: Style) -> Self {
        self.header_style = style;
        self
    }

    pub fn with_content_style(mut self, style: Style) -> Self {
        self.content_style = style;
        self
    }

    /// Re-check whether any visible column needs per-field drawing.
    pub fn refresh_style_check(&mut self, layout: &ColumnLayout) {
        self.per_column_styles = layout.visible().any(|(_, c)| c.has_style_override());
    }

    pub fn uses_per_column_styles(&self) -> bool {
        self.per_column_styles
    }

    /// Format a row into one field per visible column, display order. A
    /// value longer than the column is truncated to the width; a shorter
    /// one is padded per the column's alignment. One separator space
    /// follows each field.
    pub fn format_row(&self, row: &[CellValue], layout: &ColumnLayout) -> Vec<String> {
        layout
            .visible()
            .map(|(_, spec)| {
                let text = row
                    .get(spec.source_index)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                let w = spec.width;
                if text.chars().count() > w {
                    let truncated: String = text.chars().take(w).collect();
                    format!("{} ", truncated)
                } else {
                    match spec.alignment {
                        Alignment::Right => format!("{:>w$} ", text),
                        Alignment::Left => format!("{:<w$} ", text),
                    }
                }
            })
            .collect()
    }

    /// Draw one row at the given pad line. Row 0 is the header and gets the
    /// header style as a single run.
    pub fn render(
        &self,
        surface: &mut dyn TextSurface,
        row_index: usize,
        row: &[CellValue],
        layout: &ColumnLayout,
    ) {
        let fields = self.format_row(row, layout);
        if row_index == 0 {
            surface.draw_styled(row_index, 0, &fields.concat(), self.header_style);
            return;
        }

        if self.per_column_styles {
            let mut offset = 0;
            for ((_, spec), field) in layout.visible().zip(fields.iter()) {
                surface.draw_styled(row_index, offset, field, self.column_style(spec));
                offset += field.chars().count();
            }
        } else {
            surface.draw_styled(row_index, 0, &fields.concat(), self.content_style);
        }
    }

    fn column_style(&self, spec: &ColumnSpec) -> Style {
        let mut style = self.content_style;
        if let Some(fg) = spec.fg {
            style = style.fg(fg);
        }
        if let Some(bg) = spec.bg {
            style = style.bg(bg);
        }
        if let Some(attr) = spec.attr {
            style = style.add_modifier(attr);
        }
        style
    }
}
