/// A wraparound index cursor over a fixed range. Maintains the position
/// before the most recent transition so callers can detect a wrap, e.g.
/// advancing past the last column of a table.
#[derive(Debug, Clone)]
pub struct Circular {
    max_index: usize,
    current_index: usize,
    last_index: usize,
}

impl Circular {
    pub fn new(max_index: usize) -> Self {
        Self {
            max_index,
            current_index: 0,
            last_index: 0,
        }
    }

    /// Advance by one, wrapping to 0 past `max_index`. Returns the new index.
    pub fn next(&mut self) -> usize {
        self.last_index = self.current_index;
        if self.current_index + 1 > self.max_index {
            self.current_index = 0;
        } else {
            self.current_index += 1;
        }
        self.current_index
    }

    /// Retreat by one, wrapping to `max_index` below 0. Returns the new index.
    pub fn previous(&mut self) -> usize {
        self.last_index = self.current_index;
        if self.current_index == 0 {
            self.current_index = self.max_index;
        } else {
            self.current_index -= 1;
        }
        self.current_index
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Position before the most recent `next`/`previous` call.
    pub fn last_index(&self) -> usize {
        self.last_index
    }

    pub fn max_index(&self) -> usize {
        self.max_index
    }

    pub fn is_at_max(&self) -> bool {
        self.current_index == self.max_index
    }
}
