use tracing::trace;

/// Fired when the selection changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Insert(usize),
    Delete(usize),
    Clear,
}

pub type SelectionListener = Box<dyn FnMut(SelectionEvent)>;

/// Insertion-ordered set of selected row indices, no duplicates. Selection
/// tracks position, not identity: after a sort reorders rows, an index
/// refers to whatever content now occupies that position.
#[derive(Default)]
pub struct RowSelection {
    indices: Vec<usize>,
    listener: Option<SelectionListener>,
}

impl RowSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listener(&mut self, listener: SelectionListener) {
        self.listener = Some(listener);
    }

    fn fire(&mut self, event: SelectionEvent) {
        trace!(?event, "selection change");
        if let Some(listener) = self.listener.as_mut() {
            listener(event);
        }
    }

    pub fn select(&mut self, row: usize) {
        if !self.indices.contains(&row) {
            self.indices.push(row);
            self.fire(SelectionEvent::Insert(row));
        }
    }

    pub fn unselect(&mut self, row: usize) {
        if let Some(pos) = self.indices.iter().position(|&r| r == row) {
            self.indices.remove(pos);
            self.fire(SelectionEvent::Delete(row));
        }
    }

    pub fn toggle(&mut self, row: usize) {
        if self.is_selected(row) {
            self.unselect(row);
        } else {
            self.select(row);
        }
    }

    pub fn clear(&mut self) {
        self.indices.clear();
        self.fire(SelectionEvent::Clear);
    }

    pub fn is_selected(&self, row: usize) -> bool {
        self.indices.contains(&row)
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Drop an index without notifying listeners, for syncing after a row
    /// deletion.
    pub fn remove_index(&mut self, row: usize) {
        self.indices.retain(|&r| r != row);
    }

    /// Selected indices in the order they were added.
    pub fn selected_rows(&self) -> &[usize] {
        &self.indices
    }
}
