pub mod data;
pub mod logging;
pub mod ui;

pub use data::cell::CellValue;
pub use data::rows::RowStore;
pub use ui::circular::Circular;
pub use ui::columns::{Alignment, ColumnLayout, ColumnSpec};
pub use ui::controller::TableController;
pub use ui::renderer::Renderer;
pub use ui::selection::{RowSelection, SelectionEvent};
pub use ui::sorter::{RowSorter, SortDirection, SortKey};
pub use ui::surface::{PadSurface, TextSurface};
