//! Scrollback buffer.
//!
//! Lines scrolled off the top of the screen land here, in a ring buffer
//! with a configurable maximum size.

use serde::{Deserialize, Serialize};

use crate::line::Line;

/// Default maximum scrollback lines
pub const DEFAULT_SCROLLBACK_LINES: usize = 10000;

/// Ring buffer of historical lines, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scrollback {
    lines: Vec<Line>,
    /// Index of the oldest line
    start: usize,
    len: usize,
    max_lines: usize,
}

impl Scrollback {
    pub fn new(max_lines: usize) -> Self {
        Scrollback {
            lines: Vec::new(),
            start: 0,
            len: 0,
            max_lines,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    pub fn push(&mut self, line: Line) {
        if self.max_lines == 0 {
            return;
        }
        if self.lines.len() < self.max_lines {
            self.lines.push(line);
            self.len += 1;
        } else {
            let index = (self.start + self.len) % self.max_lines;
            self.lines[index] = line;
            if self.len == self.max_lines {
                self.start = (self.start + 1) % self.max_lines;
            } else {
                self.len += 1;
            }
        }
    }

    pub fn push_lines(&mut self, lines: Vec<Line>) {
        for line in lines {
            self.push(line);
        }
    }

    /// Line by index, 0 = oldest.
    pub fn get(&self, index: usize) -> Option<&Line> {
        if index >= self.len {
            return None;
        }
        let actual = (self.start + index) % self.lines.len();
        Some(&self.lines[actual])
    }

    /// Line by index from the bottom, 0 = most recent.
    pub fn get_from_bottom(&self, index: usize) -> Option<&Line> {
        if index >= self.len {
            return None;
        }
        self.get(self.len - 1 - index)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.start = 0;
        self.len = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        (0..self.len).filter_map(move |i| self.get(i))
    }
}

impl Default for Scrollback {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLLBACK_LINES)
    }
}
