//! User-triggered score snapshots awaiting export.

/// Rows of per-filter scores. A store request is only a flag; the next
/// filter-bank pass fills in the row.
#[derive(Debug, Clone)]
pub struct ResultLog {
    rows: Vec<Vec<f64>>,
    width: usize,
    pending: bool,
}

impl ResultLog {
    /// `width` is the number of values per row (the filter count).
    pub fn new(width: usize) -> Self {
        Self {
            rows: Vec::new(),
            width,
            pending: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn request_store(&mut self) {
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the pending flag.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Append a row, padding or truncating it to the log width.
    pub fn push(&mut self, mut row: Vec<f64>) {
        row.resize(self.width, 0.0);
        self.rows.push(row);
    }

    pub fn delete_last(&mut self) -> Option<Vec<f64>> {
        self.rows.pop()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number the next stored row will carry, starting at 1.
    pub fn next_store_number(&self) -> usize {
        self.rows.len() + 1
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Drop every row and any pending request.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.pending = false;
    }
}
