//! Terminal cell representation
//!
//! A cell is a single grid position. It owns:
//! - Zero or more codepoints (primary character plus combining marks)
//! - A display width (0, 1, or 2 columns)
//! - Graphics attributes (colors, SGR flags)
//! - A hyperlink id (opaque key into the screen's registry)
//!
//! A width-2 cell occupies two grid columns; the second column holds a
//! continuation cell (empty, width 0) that is never written directly.

use serde::{Deserialize, Serialize};

use crate::attrs::GraphicsAttributes;
use crate::hyperlink::HyperlinkId;

/// A single cell in the terminal grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character content: primary codepoint followed by combining
    /// marks. Empty means blank.
    pub text: String,
    /// Display width in columns (0 for continuation cells)
    pub width: u8,
    /// Rendition
    pub attrs: GraphicsAttributes,
    /// Hyperlink key (NONE = no hyperlink)
    pub hyperlink: HyperlinkId,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            text: String::new(),
            width: 1,
            attrs: GraphicsAttributes::default(),
            hyperlink: HyperlinkId::NONE,
        }
    }
}

impl Cell {
    /// A blank cell carrying the given fill attributes.
    pub fn blank(attrs: GraphicsAttributes, hyperlink: HyperlinkId) -> Self {
        Cell {
            text: String::new(),
            width: 1,
            attrs,
            hyperlink,
        }
    }

    /// The placeholder occupying the second column of a wide glyph.
    pub fn continuation(attrs: GraphicsAttributes, hyperlink: HyperlinkId) -> Self {
        Cell {
            text: String::new(),
            width: 0,
            attrs,
            hyperlink,
        }
    }

    /// Overwrite this cell with a single character.
    pub fn write(&mut self, attrs: GraphicsAttributes, ch: char, width: u8) {
        self.text.clear();
        self.text.push(ch);
        self.width = width;
        self.attrs = attrs;
    }

    /// Append a combining mark to the existing content.
    pub fn push_combining(&mut self, ch: char) {
        if self.text.is_empty() {
            // Combining mark on a blank cell: attach to a space base.
            self.text.push(' ');
        }
        self.text.push(ch);
    }

    /// Reset to blank, keeping the given fill attributes.
    pub fn reset(&mut self, attrs: GraphicsAttributes) {
        self.text.clear();
        self.width = 1;
        self.attrs = attrs;
        self.hyperlink = HyperlinkId::NONE;
    }

    /// Primary codepoint, if the cell has content.
    pub fn primary(&self) -> Option<char> {
        self.text.chars().next()
    }

    /// True when the cell shows no glyph (blank or a bare space).
    pub fn is_blank(&self) -> bool {
        self.text.is_empty() || self.text == " "
    }

    /// True for the placeholder behind a wide glyph.
    pub fn is_continuation(&self) -> bool {
        self.width == 0 && self.text.is_empty()
    }

    pub fn is_wide(&self) -> bool {
        self.width == 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_default_is_blank() {
        let cell = Cell::default();
        assert!(cell.is_blank());
        assert!(!cell.is_continuation());
        assert_eq!(cell.width, 1);
        assert_eq!(cell.hyperlink, HyperlinkId::NONE);
    }

    #[test]
    fn test_cell_write() {
        let mut cell = Cell::default();
        cell.write(GraphicsAttributes::default(), 'A', 1);
        assert_eq!(cell.primary(), Some('A'));
        assert!(!cell.is_blank());
    }

    #[test]
    fn test_cell_wide_and_continuation() {
        let mut cell = Cell::default();
        cell.write(GraphicsAttributes::default(), '世', 2);
        assert!(cell.is_wide());

        let cont = Cell::continuation(GraphicsAttributes::default(), HyperlinkId::NONE);
        assert!(cont.is_continuation());
        assert_eq!(cont.width, 0);
    }

    #[test]
    fn test_cell_combining() {
        let mut cell = Cell::default();
        cell.write(GraphicsAttributes::default(), 'e', 1);
        cell.push_combining('\u{0301}');
        assert_eq!(cell.text, "e\u{0301}");
        assert_eq!(cell.primary(), Some('e'));
        assert_eq!(cell.width, 1);
    }

    #[test]
    fn test_cell_reset() {
        let mut cell = Cell::default();
        cell.write(GraphicsAttributes::default(), 'X', 1);
        cell.hyperlink = HyperlinkId(3);

        cell.reset(GraphicsAttributes::default());
        assert!(cell.is_blank());
        assert_eq!(cell.hyperlink, HyperlinkId::NONE);
    }

    #[test]
    fn test_space_is_blank() {
        let mut cell = Cell::default();
        cell.write(GraphicsAttributes::default(), ' ', 1);
        assert!(cell.is_blank());
    }
}
