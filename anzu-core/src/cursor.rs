//! Cursor state management
//!
//! The cursor tracks position, the pending-wrap state, and the saved
//! state for DECSC/DECRC.

use serde::{Deserialize, Serialize};

use crate::attrs::GraphicsAttributes;

/// Cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Row position (0-indexed from the top of the visible area)
    pub row: usize,
    /// Column position (0-indexed)
    pub col: usize,
    /// Whether the cursor is visible (DECTCEM)
    pub visible: bool,
    /// Set after writing into the last column with autowrap on; the next
    /// printable character wraps to a new line first.
    pub pending_wrap: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor {
            row: 0,
            col: 0,
            visible: true,
            pending_wrap: false,
        }
    }
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to an absolute position, clamping to bounds.
    pub fn goto(&mut self, row: usize, col: usize, rows: usize, cols: usize) {
        self.row = row.min(rows.saturating_sub(1));
        self.col = col.min(cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    pub fn move_up(&mut self, n: usize, min_row: usize) {
        self.row = self.row.saturating_sub(n).max(min_row);
        self.pending_wrap = false;
    }

    pub fn move_down(&mut self, n: usize, max_row: usize) {
        self.row = (self.row + n).min(max_row);
        self.pending_wrap = false;
    }

    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
        self.pending_wrap = false;
    }

    pub fn move_right(&mut self, n: usize, max_col: usize) {
        self.col = (self.col + n).min(max_col);
        self.pending_wrap = false;
    }
}

/// Saved cursor state for DECSC/DECRC
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SavedCursor {
    pub row: usize,
    pub col: usize,
    pub attrs: GraphicsAttributes,
    pub origin_mode: bool,
    pub pending_wrap: bool,
}
