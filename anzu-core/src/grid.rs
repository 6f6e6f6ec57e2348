//! Terminal grid: the matrix of lines backing the visible area.
//!
//! The grid only knows about lines; cursor, modes, and scrollback policy
//! live in the screen. Scrolling hands evicted lines back to the caller
//! so the screen can decide whether they enter scrollback.

use serde::{Deserialize, Serialize};

use crate::attrs::GraphicsAttributes;
use crate::line::Line;

/// A 2D grid of terminal cells, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    lines: Vec<Line>,
    cols: usize,
    rows: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        let lines = (0..rows).map(|_| Line::new(cols)).collect();
        Grid { lines, cols, rows }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    pub fn line_mut(&mut self, row: usize) -> Option<&mut Line> {
        self.lines.get_mut(row)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Line> {
        self.lines.iter_mut()
    }

    /// Blank every line.
    pub fn clear(&mut self, attrs: GraphicsAttributes) {
        for line in &mut self.lines {
            line.reset(Default::default(), attrs);
        }
    }

    /// Scroll `[top, bottom]` up by `n`. Evicted lines are returned for
    /// the caller's scrollback; fresh blank lines appear at the bottom of
    /// the region.
    pub fn scroll_up(
        &mut self,
        top: usize,
        bottom: usize,
        n: usize,
        attrs: GraphicsAttributes,
    ) -> Vec<Line> {
        if top > bottom || top >= self.rows || n == 0 {
            return Vec::new();
        }
        let bottom = bottom.min(self.rows - 1);
        let n = n.min(bottom - top + 1);

        let mut evicted = Vec::with_capacity(n);
        for i in 0..n {
            evicted.push(std::mem::replace(
                &mut self.lines[top + i],
                Line::blank(self.cols, attrs),
            ));
        }

        for i in top..(bottom + 1 - n) {
            self.lines.swap(i, i + n);
        }

        for i in (bottom + 1 - n)..=bottom {
            self.lines[i].reset(Default::default(), attrs);
        }

        evicted
    }

    /// Scroll `[top, bottom]` down by `n`. Lines pushed past the bottom
    /// are lost; fresh blank lines appear at the top of the region.
    pub fn scroll_down(&mut self, top: usize, bottom: usize, n: usize, attrs: GraphicsAttributes) {
        if top > bottom || top >= self.rows || n == 0 {
            return;
        }
        let bottom = bottom.min(self.rows - 1);
        let n = n.min(bottom - top + 1);

        for i in ((top + n)..=bottom).rev() {
            self.lines.swap(i, i - n);
        }

        for i in top..(top + n) {
            self.lines[i].reset(Default::default(), attrs);
        }
    }

    /// Insert `n` blank lines at `row`, shifting lines down within
    /// `[row, bottom]` (IL).
    pub fn insert_lines(&mut self, row: usize, bottom: usize, n: usize, attrs: GraphicsAttributes) {
        if row > bottom || row >= self.rows {
            return;
        }
        self.scroll_down(row, bottom, n, attrs);
    }

    /// Delete `n` lines at `row`, shifting lines up within `[row, bottom]`
    /// (DL). Blank lines appear at the bottom of the region.
    pub fn delete_lines(&mut self, row: usize, bottom: usize, n: usize, attrs: GraphicsAttributes) {
        if row > bottom || row >= self.rows {
            return;
        }
        let _ = self.scroll_up(row, bottom, n, attrs);
    }

    /// Resize the grid. New cells are blank; excess is truncated.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        for line in &mut self.lines {
            line.resize(cols);
        }
        if rows > self.rows {
            for _ in self.rows..rows {
                self.lines.push(Line::new(cols));
            }
        } else {
            self.lines.truncate(rows);
        }
        self.rows = rows;
        self.cols = cols;
    }

    /// Remove the top line (used when shrinking pushes history out).
    pub fn pop_top(&mut self) -> Option<Line> {
        if self.lines.is_empty() {
            return None;
        }
        self.rows -= 1;
        Some(self.lines.remove(0))
    }

    /// Append a blank line at the bottom.
    pub fn push_blank(&mut self) {
        self.lines.push(Line::new(self.cols));
        self.rows += 1;
    }
}
