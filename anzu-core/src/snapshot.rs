//! Terminal snapshot for testing and debugging
//!
//! Snapshots capture screen content in a serializable form for
//! deterministic testing and headless capture. Capture goes through the
//! read-only line interface, so taking a snapshot never converts line
//! storage.

use serde::{Deserialize, Serialize};

use crate::screen::Screen;

/// A text-level snapshot of the visible screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub rows: usize,
    pub cols: usize,
    /// Visible rows, trailing blanks trimmed
    pub lines: Vec<String>,
    /// Which lines are soft continuations of the line above
    pub wrapped: Vec<bool>,
    pub cursor_row: usize,
    pub cursor_col: usize,
    pub cursor_visible: bool,
    pub title: String,
}

impl Snapshot {
    pub fn capture(screen: &Screen) -> Self {
        let rows = screen.rows();
        Snapshot {
            rows,
            cols: screen.cols(),
            lines: (0..rows).map(|r| screen.row_text(r)).collect(),
            wrapped: (0..rows)
                .map(|r| screen.line(r).map_or(false, |l| l.wrapped()))
                .collect(),
            cursor_row: screen.cursor().row,
            cursor_col: screen.cursor().col,
            cursor_visible: screen.cursor().visible,
            title: screen.title().to_string(),
        }
    }

    /// Full screen text, one row per line.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn row_text(&self, row: usize) -> &str {
        self.lines.get(row).map(String::as_str).unwrap_or("")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
