//! Line storage with dual representation.
//!
//! Most terminal rows are plain ASCII under one style followed by blank
//! fill. [`TrivialLineBuffer`] stores that common case as a compact byte
//! run plus two attribute values, avoiding per-cell allocation. Any
//! mutation the compressed form cannot express promotes the line to an
//! [`InflatedLineBuffer`] (one [`Cell`] per column). Promotion is one-way;
//! a line returns to trivial storage only through `reset`.
//!
//! Read-only queries (`size`, `empty`, `cell_empty_at`, `cell_width_at`,
//! `to_utf8`, search) never convert storage.

use serde::{Deserialize, Serialize};

use crate::attrs::GraphicsAttributes;
use crate::cell::Cell;
use crate::hyperlink::HyperlinkId;

/// Per-line flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineFlags {
    bits: u8,
}

impl LineFlags {
    pub const NONE: u8 = 0;
    /// Reflow may rewrap this line on resize
    pub const WRAPPABLE: u8 = 1 << 0;
    /// This line continues the line above it (soft break)
    pub const WRAPPED: u8 = 1 << 1;
    /// User mark (prompt jump targets etc.)
    pub const MARKED: u8 = 1 << 2;

    pub const fn empty() -> Self {
        LineFlags { bits: Self::NONE }
    }

    pub const fn new(bits: u8) -> Self {
        LineFlags { bits }
    }

    pub fn contains(&self, flag: u8) -> bool {
        self.bits & flag != 0
    }

    pub fn set(&mut self, flag: u8, value: bool) {
        if value {
            self.bits |= flag;
        } else {
            self.bits &= !flag;
        }
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }
}

/// Compressed row storage: a uniformly styled ASCII prefix plus uniformly
/// styled blank fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrivialLineBuffer {
    /// Total columns of the row
    display_width: usize,
    /// Style of the written prefix
    text_attrs: GraphicsAttributes,
    /// Style of the trailing blank fill
    fill_attrs: GraphicsAttributes,
    /// Applies uniformly to the whole row
    hyperlink: HyperlinkId,
    /// US-ASCII content; its length is the used column count
    text: Vec<u8>,
}

impl TrivialLineBuffer {
    pub fn new(display_width: usize, attrs: GraphicsAttributes) -> Self {
        TrivialLineBuffer {
            display_width,
            text_attrs: attrs,
            fill_attrs: attrs,
            hyperlink: HyperlinkId::NONE,
            text: Vec::new(),
        }
    }

    pub fn reset(&mut self, attrs: GraphicsAttributes) {
        self.text_attrs = attrs;
        self.fill_attrs = attrs;
        self.hyperlink = HyperlinkId::NONE;
        self.text.clear();
    }

    pub fn display_width(&self) -> usize {
        self.display_width
    }

    /// Columns holding written content; everything beyond is blank fill.
    pub fn used_columns(&self) -> usize {
        self.text.len()
    }

    pub fn text_attrs(&self) -> GraphicsAttributes {
        self.text_attrs
    }

    pub fn fill_attrs(&self) -> GraphicsAttributes {
        self.fill_attrs
    }

    pub fn hyperlink(&self) -> HyperlinkId {
        self.hyperlink
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    fn char_at(&self, col: usize) -> char {
        if col < self.text.len() {
            self.text[col] as char
        } else {
            ' '
        }
    }

    /// Unpack into one cell per column, preserving the exact rendered
    /// appearance: glyphs with `text_attrs`, fill with `fill_attrs`, the
    /// row hyperlink on every cell.
    pub fn inflate(&self) -> Vec<Cell> {
        let mut cells = Vec::with_capacity(self.display_width);
        for &byte in &self.text {
            let mut cell = Cell::blank(self.text_attrs, self.hyperlink);
            cell.write(self.text_attrs, byte as char, 1);
            cell.hyperlink = self.hyperlink;
            cells.push(cell);
        }
        while cells.len() < self.display_width {
            cells.push(Cell::blank(self.fill_attrs, self.hyperlink));
        }
        cells
    }
}

/// Uncompressed row storage: one cell per column.
pub type InflatedLineBuffer = Vec<Cell>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum LineStorage {
    Trivial(TrivialLineBuffer),
    Inflated(InflatedLineBuffer),
}

/// Result of a single-line text search.
///
/// `column` is the starting column of a complete match. A partial match at
/// the line boundary is reported as `column: None` with `remaining` set to
/// the number of characters still to match on the adjacent line (the next
/// line for forward search, the previous line for reverse search), so
/// multi-line search can chain across wrapped lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub column: Option<usize>,
    pub remaining: usize,
}

impl SearchResult {
    pub fn found(column: usize) -> Self {
        SearchResult {
            column: Some(column),
            remaining: 0,
        }
    }

    pub fn partial(remaining: usize) -> Self {
        SearchResult {
            column: None,
            remaining,
        }
    }

    pub fn none() -> Self {
        SearchResult {
            column: None,
            remaining: 0,
        }
    }

    pub fn is_found(&self) -> bool {
        self.column.is_some()
    }

    pub fn is_partial(&self) -> bool {
        self.column.is_none() && self.remaining > 0
    }
}

/// One terminal row: storage variant plus flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    storage: LineStorage,
    flags: LineFlags,
}

impl Line {
    /// A blank line with default attributes.
    pub fn new(display_width: usize) -> Self {
        Line::blank(display_width, GraphicsAttributes::default())
    }

    /// A blank line whose fill carries the given attributes.
    pub fn blank(display_width: usize, attrs: GraphicsAttributes) -> Self {
        Line {
            storage: LineStorage::Trivial(TrivialLineBuffer::new(display_width, attrs)),
            flags: LineFlags::empty(),
        }
    }

    pub fn flags(&self) -> LineFlags {
        self.flags
    }

    pub fn flags_mut(&mut self) -> &mut LineFlags {
        &mut self.flags
    }

    pub fn wrapped(&self) -> bool {
        self.flags.contains(LineFlags::WRAPPED)
    }

    pub fn set_wrapped(&mut self, enable: bool) {
        self.flags.set(LineFlags::WRAPPED, enable);
    }

    pub fn wrappable(&self) -> bool {
        self.flags.contains(LineFlags::WRAPPABLE)
    }

    pub fn set_wrappable(&mut self, enable: bool) {
        self.flags.set(LineFlags::WRAPPABLE, enable);
    }

    pub fn marked(&self) -> bool {
        self.flags.contains(LineFlags::MARKED)
    }

    pub fn set_marked(&mut self, enable: bool) {
        self.flags.set(LineFlags::MARKED, enable);
    }

    /// Number of columns.
    pub fn size(&self) -> usize {
        match &self.storage {
            LineStorage::Trivial(buffer) => buffer.display_width(),
            LineStorage::Inflated(cells) => cells.len(),
        }
    }

    pub fn is_trivial(&self) -> bool {
        matches!(self.storage, LineStorage::Trivial(_))
    }

    pub fn trivial_buffer(&self) -> Option<&TrivialLineBuffer> {
        match &self.storage {
            LineStorage::Trivial(buffer) => Some(buffer),
            LineStorage::Inflated(_) => None,
        }
    }

    /// Blank the line, keeping its width. Always returns to trivial
    /// storage.
    pub fn reset(&mut self, flags: LineFlags, attrs: GraphicsAttributes) {
        self.flags = flags;
        if let LineStorage::Trivial(buffer) = &mut self.storage {
            buffer.reset(attrs);
            return;
        }
        let width = self.size();
        self.storage = LineStorage::Trivial(TrivialLineBuffer::new(width, attrs));
    }

    /// Blank the line at a new width.
    pub fn reset_resized(&mut self, flags: LineFlags, attrs: GraphicsAttributes, count: usize) {
        self.flags = flags;
        self.storage = LineStorage::Trivial(TrivialLineBuffer::new(count, attrs));
    }

    /// Write the same glyph into every cell (DECALN). A NUL codepoint
    /// blanks the line instead. The uniform result would be representable
    /// for ASCII glyphs, but the line inflates regardless; `fill` is rare
    /// and cell-level writes usually follow it.
    pub fn fill(&mut self, flags: LineFlags, attrs: GraphicsAttributes, ch: char, width: u8) {
        if ch == '\0' {
            self.reset(flags, attrs);
            return;
        }
        self.flags = flags;
        for cell in self.inflated_buffer() {
            cell.reset(attrs);
            cell.write(attrs, ch, width);
        }
    }

    /// Write ASCII text starting at `start`, blanking the rest of the
    /// line. The caller must ensure the text fits; violating the bound is
    /// a programming error, checked in all builds.
    pub fn fill_ascii(&mut self, start: usize, attrs: GraphicsAttributes, text: &str) {
        assert!(
            start + text.len() <= self.size(),
            "fill_ascii out of bounds: {} + {} > {}",
            start,
            text.len(),
            self.size()
        );
        debug_assert!(text.is_ascii());

        let cells = self.inflated_buffer();
        let mut col = start;
        for ch in text.chars() {
            cells[col].write(attrs, ch, 1);
            cells[col].hyperlink = HyperlinkId::NONE;
            col += 1;
        }
        for cell in &mut cells[col..] {
            cell.reset(GraphicsAttributes::default());
        }
    }

    /// Grow with blank columns or truncate.
    pub fn resize(&mut self, count: usize) {
        match &mut self.storage {
            LineStorage::Trivial(buffer) => {
                buffer.display_width = count;
                buffer.text.truncate(count);
            }
            LineStorage::Inflated(cells) => {
                cells.resize(count, Cell::default());
            }
        }
    }

    /// True iff no column holds a glyph. O(1) for trivial storage.
    pub fn empty(&self) -> bool {
        match &self.storage {
            LineStorage::Trivial(buffer) => buffer.text.is_empty(),
            LineStorage::Inflated(cells) => cells.iter().all(Cell::is_blank),
        }
    }

    /// Whether the given column shows no glyph. Never converts storage.
    pub fn cell_empty_at(&self, col: usize) -> bool {
        match &self.storage {
            LineStorage::Trivial(buffer) => {
                col >= buffer.used_columns() || buffer.text[col] == b' '
            }
            LineStorage::Inflated(cells) => cells.get(col).map_or(true, Cell::is_blank),
        }
    }

    /// Display width of the given column's cell. Never converts storage.
    pub fn cell_width_at(&self, col: usize) -> usize {
        match &self.storage {
            LineStorage::Trivial(_) => 1,
            LineStorage::Inflated(cells) => cells.get(col).map_or(1, |c| c.width as usize),
        }
    }

    /// Cell-level buffer, promoting trivial storage on first use. The
    /// conversion preserves the exact rendered appearance and is
    /// idempotent; there is no automatic demotion.
    pub fn inflated_buffer(&mut self) -> &mut InflatedLineBuffer {
        if let LineStorage::Trivial(buffer) = &self.storage {
            self.storage = LineStorage::Inflated(buffer.inflate());
        }
        match &mut self.storage {
            LineStorage::Inflated(cells) => cells,
            LineStorage::Trivial(_) => unreachable!(),
        }
    }

    /// Read-only cell span (promotes trivial storage, like
    /// [`Line::inflated_buffer`]).
    pub fn cells(&mut self) -> &[Cell] {
        self.inflated_buffer()
    }

    /// Append one printable ASCII byte at `col` while staying in the
    /// compressed representation. Fails (without converting) when the
    /// write does not extend the uniform prefix.
    pub fn try_append_ascii(
        &mut self,
        col: usize,
        byte: u8,
        attrs: GraphicsAttributes,
        hyperlink: HyperlinkId,
    ) -> bool {
        let LineStorage::Trivial(buffer) = &mut self.storage else {
            return false;
        };
        if !(0x20..=0x7E).contains(&byte) {
            return false;
        }
        if col != buffer.used_columns() || col >= buffer.display_width {
            return false;
        }
        if buffer.text.is_empty() {
            buffer.text_attrs = attrs;
            buffer.hyperlink = hyperlink;
        } else if buffer.text_attrs != attrs || buffer.hyperlink != hyperlink {
            return false;
        }
        buffer.text.push(byte);
        true
    }

    /// Write one character at cell level. Promotes storage, plants the
    /// continuation placeholder for wide glyphs, and heals a wide pair
    /// this write cuts in half.
    pub fn write_cell(
        &mut self,
        col: usize,
        ch: char,
        width: u8,
        attrs: GraphicsAttributes,
        hyperlink: HyperlinkId,
    ) {
        let len = self.size();
        if col >= len {
            return;
        }
        let cells = self.inflated_buffer();

        // Overwriting half of a wide glyph blanks the other half.
        if cells[col].is_continuation() && col > 0 && cells[col - 1].is_wide() {
            let attrs_prev = cells[col - 1].attrs;
            cells[col - 1].reset(attrs_prev);
        }
        if cells[col].is_wide() && col + 1 < len && cells[col + 1].is_continuation() {
            let attrs_next = cells[col + 1].attrs;
            cells[col + 1].reset(attrs_next);
        }

        cells[col].write(attrs, ch, width);
        cells[col].hyperlink = hyperlink;
        if width == 2 && col + 1 < len {
            cells[col + 1] = Cell::continuation(attrs, hyperlink);
        }
    }

    /// Append a combining mark to the cell at `col`.
    pub fn append_combining(&mut self, col: usize, ch: char) {
        let len = self.size();
        if col >= len {
            return;
        }
        self.inflated_buffer()[col].push_combining(ch);
    }

    /// Erase from `col` to the end of the line. Stays trivial when the
    /// compressed form can express the result.
    pub fn clear_from(&mut self, col: usize, attrs: GraphicsAttributes) {
        if let LineStorage::Trivial(buffer) = &mut self.storage {
            if col <= buffer.used_columns() {
                buffer.text.truncate(col);
                buffer.fill_attrs = attrs;
                return;
            }
            if buffer.fill_attrs == attrs {
                // The region past `col` is already blank in this style.
                return;
            }
            // Old fill between used and col would differ in style from
            // the newly erased region; fall through to cell level.
        }
        let cells = self.inflated_buffer();
        let start = col.min(cells.len());
        for cell in &mut cells[start..] {
            cell.reset(attrs);
        }
    }

    /// Erase from the start of the line through `col` inclusive.
    pub fn clear_to(&mut self, col: usize, attrs: GraphicsAttributes) {
        let len = self.size();
        if len == 0 {
            return;
        }
        let col = col.min(len - 1);
        if let LineStorage::Trivial(buffer) = &mut self.storage {
            if col + 1 >= buffer.used_columns() && buffer.fill_attrs == attrs {
                // Entire content erased and the style matches the
                // existing fill: the whole line is one blank run.
                buffer.text.clear();
                return;
            }
        }
        let cells = self.inflated_buffer();
        for cell in &mut cells[..=col] {
            cell.reset(attrs);
        }
    }

    /// Erase `start..end`.
    pub fn clear_range(&mut self, start: usize, end: usize, attrs: GraphicsAttributes) {
        let len = self.size();
        let end = end.min(len);
        if start >= end {
            return;
        }
        if end == len {
            self.clear_from(start, attrs);
        } else if start == 0 {
            self.clear_to(end - 1, attrs);
        } else {
            let cells = self.inflated_buffer();
            for cell in &mut cells[start..end] {
                cell.reset(attrs);
            }
        }
    }

    /// Insert `count` blank cells at `col`, pushing the tail off the end
    /// (ICH).
    pub fn insert_blanks(&mut self, col: usize, count: usize, attrs: GraphicsAttributes) {
        let len = self.size();
        if col >= len {
            return;
        }
        let count = count.min(len - col);
        let cells = self.inflated_buffer();
        for _ in 0..count {
            cells.pop();
            cells.insert(col, Cell::blank(attrs, HyperlinkId::NONE));
        }
    }

    /// Delete `count` cells at `col`, pulling the tail left and filling
    /// with blanks (DCH).
    pub fn delete_cells(&mut self, col: usize, count: usize, attrs: GraphicsAttributes) {
        let len = self.size();
        if col >= len {
            return;
        }
        let count = count.min(len - col);
        let cells = self.inflated_buffer();
        cells.drain(col..col + count);
        cells.resize(len, Cell::blank(attrs, HyperlinkId::NONE));
    }

    /// Row content as text, one character per glyph plus spaces for
    /// blanks. Never converts storage.
    pub fn to_utf8(&self) -> String {
        match &self.storage {
            LineStorage::Trivial(buffer) => {
                let mut out = String::with_capacity(buffer.display_width());
                for &byte in &buffer.text {
                    out.push(byte as char);
                }
                for _ in buffer.used_columns()..buffer.display_width() {
                    out.push(' ');
                }
                out
            }
            LineStorage::Inflated(cells) => {
                let mut out = String::new();
                for cell in cells {
                    if cell.is_continuation() {
                        continue;
                    }
                    if cell.is_blank() {
                        out.push(' ');
                    } else {
                        out.push_str(&cell.text);
                    }
                }
                out
            }
        }
    }

    /// Like [`Line::to_utf8`] with trailing blanks removed.
    pub fn to_utf8_trimmed(&self) -> String {
        let full = self.to_utf8();
        full.trim_end().to_string()
    }

    pub(crate) fn primary_char_at(&self, col: usize) -> Option<char> {
        match &self.storage {
            LineStorage::Trivial(buffer) => {
                if col < buffer.display_width() {
                    Some(buffer.char_at(col))
                } else {
                    None
                }
            }
            LineStorage::Inflated(cells) => {
                let cell = cells.get(col)?;
                if cell.is_continuation() {
                    None
                } else if cell.is_blank() {
                    Some(' ')
                } else {
                    cell.primary()
                }
            }
        }
    }

    /// Tests whether `text` matches starting exactly at `start_col`.
    /// Matching steps by cell width, so a wide glyph consumes two columns
    /// and continuation cells are never compared.
    pub fn match_text_at(&self, text: &str, start_col: usize) -> bool {
        let len = self.size();
        let mut col = start_col;
        for ch in text.chars() {
            if col >= len {
                return false;
            }
            match self.primary_char_at(col) {
                Some(c) if c == ch => col += self.cell_width_at(col).max(1),
                _ => return false,
            }
        }
        true
    }

    /// Scan forward from `start_col` for `text`. A prefix that matches up
    /// to the right edge reports a partial result carrying the count of
    /// characters left to match on the next line.
    pub fn search(&self, text: &str, start_col: usize) -> SearchResult {
        if text.is_empty() {
            return SearchResult::none();
        }
        let len = self.size();
        let total = text.chars().count();

        for base in start_col..len {
            if self.primary_char_at(base).is_none() {
                continue;
            }
            let mut col = base;
            let mut matched = 0;
            let mut mismatched = false;
            for ch in text.chars() {
                if col >= len {
                    break;
                }
                match self.primary_char_at(col) {
                    Some(c) if c == ch => {
                        matched += 1;
                        col += self.cell_width_at(col).max(1);
                    }
                    _ => {
                        mismatched = true;
                        break;
                    }
                }
            }
            if matched == total {
                return SearchResult::found(base);
            }
            if !mismatched && matched > 0 && col >= len {
                return SearchResult::partial(total - matched);
            }
        }
        SearchResult::none()
    }

    /// Scan backward from `start_col` for `text`. A suffix that matches
    /// at the left edge reports a partial result carrying the count of
    /// characters left to match at the end of the previous line.
    pub fn search_reverse(&self, text: &str, start_col: usize) -> SearchResult {
        if text.is_empty() {
            return SearchResult::none();
        }
        let len = self.size();
        if len == 0 {
            return SearchResult::none();
        }

        let start = start_col.min(len - 1);
        for base in (0..=start).rev() {
            if self.match_text_at(text, base) {
                return SearchResult::found(base);
            }
        }

        // Longest suffix of `text` anchored at column 0.
        let chars: Vec<char> = text.chars().collect();
        for split in 1..chars.len() {
            let suffix: String = chars[split..].iter().collect();
            if self.match_text_at(&suffix, 0) {
                return SearchResult::partial(split);
            }
        }
        SearchResult::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::CellFlags;
    use crate::color::Color;

    fn bold() -> GraphicsAttributes {
        let mut attrs = GraphicsAttributes::default();
        attrs.flags.insert(CellFlags::BOLD);
        attrs
    }

    fn line_with(text: &str, width: usize) -> Line {
        let mut line = Line::new(width);
        for (i, b) in text.bytes().enumerate() {
            assert!(line.try_append_ascii(i, b, GraphicsAttributes::default(), HyperlinkId::NONE));
        }
        line
    }

    #[test]
    fn test_new_line_is_trivial_blank() {
        let line = Line::new(80);
        assert!(line.is_trivial());
        assert!(line.empty());
        assert_eq!(line.size(), 80);
        assert!(line.cell_empty_at(0));
        assert_eq!(line.cell_width_at(0), 1);
    }

    #[test]
    fn test_try_append_ascii_stays_trivial() {
        let line = line_with("hello", 80);
        assert!(line.is_trivial());
        assert_eq!(line.trivial_buffer().unwrap().used_columns(), 5);
        assert!(!line.cell_empty_at(0));
        assert!(line.cell_empty_at(5));
        assert_eq!(line.to_utf8_trimmed(), "hello");
    }

    #[test]
    fn test_append_rejects_style_change() {
        let mut line = line_with("ab", 80);
        assert!(!line.try_append_ascii(2, b'c', bold(), HyperlinkId::NONE));
        assert!(line.is_trivial());
    }

    #[test]
    fn test_append_rejects_gap() {
        let mut line = line_with("ab", 80);
        assert!(!line.try_append_ascii(5, b'c', GraphicsAttributes::default(), HyperlinkId::NONE));
    }

    #[test]
    fn test_inflate_round_trip() {
        let mut line = Line::blank(10, GraphicsAttributes::default());
        for (i, b) in b"hi".iter().enumerate() {
            assert!(line.try_append_ascii(i, *b, bold(), HyperlinkId(7)));
        }

        // Record the trivial view, then inflate and compare.
        let before: Vec<(bool, usize, String)> = (0..10)
            .map(|c| (line.cell_empty_at(c), line.cell_width_at(c), line.to_utf8()))
            .collect();
        let utf8_before = line.to_utf8();

        let cells = line.inflated_buffer().clone();
        assert!(!line.is_trivial());
        assert_eq!(cells.len(), 10);
        assert_eq!(cells[0].primary(), Some('h'));
        assert_eq!(cells[0].attrs, bold());
        assert_eq!(cells[0].hyperlink, HyperlinkId(7));
        assert_eq!(cells[1].primary(), Some('i'));
        assert!(cells[2].is_blank());
        assert_eq!(cells[2].hyperlink, HyperlinkId(7));

        let after: Vec<(bool, usize, String)> = (0..10)
            .map(|c| (line.cell_empty_at(c), line.cell_width_at(c), line.to_utf8()))
            .collect();
        assert_eq!(before, after);
        assert_eq!(utf8_before, line.to_utf8());
    }

    #[test]
    fn test_inflate_idempotent() {
        let mut line = line_with("abc", 10);
        let first = line.inflated_buffer().clone();
        let second = line.inflated_buffer().clone();
        assert_eq!(first, second);
        assert_eq!(line.size(), 10);
    }

    #[test]
    fn test_fill_attrs_preserved_on_inflate() {
        let mut line = Line::blank(6, GraphicsAttributes::default());
        assert!(line.try_append_ascii(0, b'x', GraphicsAttributes::default(), HyperlinkId::NONE));
        line.clear_from(1, bold());
        assert!(line.is_trivial());

        let cells = line.inflated_buffer();
        assert_eq!(cells[0].attrs, GraphicsAttributes::default());
        assert_eq!(cells[3].attrs, bold());
    }

    #[test]
    fn test_non_ascii_write_inflates_and_reset_restores() {
        let mut line = Line::new(20);
        assert!(!line.try_append_ascii(0, 0xC3, GraphicsAttributes::default(), HyperlinkId::NONE));
        line.write_cell(0, 'é', 1, GraphicsAttributes::default(), HyperlinkId::NONE);
        assert!(!line.is_trivial());
        assert_eq!(line.to_utf8_trimmed(), "é");

        line.reset(LineFlags::empty(), GraphicsAttributes::default());
        assert!(line.is_trivial());
        assert!(line.empty());
        assert_eq!(line.size(), 20);
    }

    #[test]
    fn test_wide_glyph_continuation() {
        let mut line = Line::new(10);
        line.write_cell(0, '世', 2, GraphicsAttributes::default(), HyperlinkId::NONE);
        assert_eq!(line.cell_width_at(0), 2);
        assert_eq!(line.cell_width_at(1), 0);
        assert!(line.cell_empty_at(1));
        assert_eq!(line.to_utf8_trimmed(), "世");
    }

    #[test]
    fn test_overwrite_wide_half_heals_pair() {
        let mut line = Line::new(10);
        line.write_cell(0, '世', 2, GraphicsAttributes::default(), HyperlinkId::NONE);
        line.write_cell(1, 'x', 1, GraphicsAttributes::default(), HyperlinkId::NONE);

        assert!(line.cell_empty_at(0));
        assert_eq!(line.cell_width_at(0), 1);
        assert_eq!(line.to_utf8_trimmed(), " x");
    }

    #[test]
    fn test_fill_decaln() {
        let mut line = Line::new(5);
        line.fill(LineFlags::empty(), GraphicsAttributes::default(), 'E', 1);
        assert!(!line.is_trivial());
        assert_eq!(line.to_utf8(), "EEEEE");
        assert!(!line.empty());
    }

    #[test]
    fn test_fill_nul_resets() {
        let mut line = line_with("abc", 5);
        line.fill(LineFlags::empty(), GraphicsAttributes::default(), '\0', 1);
        assert!(line.is_trivial());
        assert!(line.empty());
    }

    #[test]
    fn test_fill_ascii() {
        let mut line = line_with("XXXXXXXX", 8);
        line.fill_ascii(2, bold(), "ab");
        let cells = line.inflated_buffer();
        assert_eq!(cells[2].primary(), Some('a'));
        assert_eq!(cells[2].attrs, bold());
        assert_eq!(cells[3].primary(), Some('b'));
        // Remainder is blanked.
        assert!(cells[4].is_blank());
        assert!(cells[7].is_blank());
        // Prefix untouched.
        assert_eq!(cells[0].primary(), Some('X'));
    }

    #[test]
    #[should_panic(expected = "fill_ascii out of bounds")]
    fn test_fill_ascii_bounds_checked() {
        let mut line = Line::new(4);
        line.fill_ascii(2, GraphicsAttributes::default(), "abc");
    }

    #[test]
    fn test_resize_trivial() {
        let mut line = line_with("hello", 10);
        line.resize(20);
        assert!(line.is_trivial());
        assert_eq!(line.size(), 20);
        assert_eq!(line.to_utf8_trimmed(), "hello");

        line.resize(3);
        assert_eq!(line.size(), 3);
        assert_eq!(line.to_utf8(), "hel");
    }

    #[test]
    fn test_resize_inflated() {
        let mut line = Line::new(5);
        line.write_cell(0, 'é', 1, GraphicsAttributes::default(), HyperlinkId::NONE);
        line.resize(8);
        assert_eq!(line.size(), 8);
        line.resize(2);
        assert_eq!(line.size(), 2);
        assert_eq!(line.to_utf8_trimmed(), "é");
    }

    #[test]
    fn test_clear_from_keeps_trivial() {
        let mut line = line_with("hello world", 20);
        line.clear_from(5, GraphicsAttributes::default());
        assert!(line.is_trivial());
        assert_eq!(line.to_utf8_trimmed(), "hello");
    }

    #[test]
    fn test_clear_from_beyond_used_with_new_fill_inflates() {
        let mut line = line_with("hi", 10);
        line.clear_from(5, bold());
        assert!(!line.is_trivial());
        assert_eq!(line.to_utf8_trimmed(), "hi");
    }

    #[test]
    fn test_clear_to_inflates_partial_prefix() {
        let mut line = line_with("hello", 10);
        line.clear_to(2, GraphicsAttributes::default());
        assert!(!line.is_trivial());
        assert_eq!(line.to_utf8_trimmed(), "   lo");
    }

    #[test]
    fn test_clear_to_whole_content_stays_trivial() {
        let mut line = line_with("hi", 10);
        line.clear_to(5, GraphicsAttributes::default());
        assert!(line.is_trivial());
        assert!(line.empty());
    }

    #[test]
    fn test_insert_and_delete_cells() {
        let mut line = line_with("abcdef", 6);
        line.insert_blanks(2, 2, GraphicsAttributes::default());
        assert_eq!(line.to_utf8(), "ab  cd");

        line.delete_cells(2, 2, GraphicsAttributes::default());
        assert_eq!(line.to_utf8_trimmed(), "abcd");
        assert_eq!(line.size(), 6);
    }

    #[test]
    fn test_search_found() {
        let line = line_with("the quick brown fox", 30);
        assert_eq!(line.search("quick", 0), SearchResult::found(4));
        assert_eq!(line.search("quick", 5), SearchResult::none());
        assert_eq!(line.search("fox", 0), SearchResult::found(16));
    }

    #[test]
    fn test_search_partial_at_right_edge() {
        // "wor" sits at the very end; "world" extends past it.
        let line = line_with("hello wor", 9);
        let result = line.search("world", 0);
        assert!(result.is_partial());
        assert_eq!(result.remaining, 2);
    }

    #[test]
    fn test_search_no_false_partial_on_mismatch() {
        let line = line_with("hello wax", 9);
        assert_eq!(line.search("world", 0), SearchResult::none());
    }

    #[test]
    fn test_search_reverse_found() {
        let line = line_with("abc abc", 10);
        assert_eq!(line.search_reverse("abc", 9), SearchResult::found(4));
        assert_eq!(line.search_reverse("abc", 3), SearchResult::found(0));
    }

    #[test]
    fn test_search_reverse_partial_at_left_edge() {
        // Line begins with "ld": the tail of "world"; 3 characters
        // remain to match on the previous line.
        let line = line_with("ld end", 10);
        let result = line.search_reverse("world", 0);
        assert!(result.is_partial());
        assert_eq!(result.remaining, 3);
    }

    #[test]
    fn test_search_wide_glyph_steps_by_width() {
        let mut line = Line::new(10);
        line.write_cell(0, '世', 2, GraphicsAttributes::default(), HyperlinkId::NONE);
        line.write_cell(2, '界', 2, GraphicsAttributes::default(), HyperlinkId::NONE);
        line.write_cell(4, '!', 1, GraphicsAttributes::default(), HyperlinkId::NONE);

        assert_eq!(line.search("世界!", 0), SearchResult::found(0));
        assert_eq!(line.search("界!", 0), SearchResult::found(2));
        // A match can never start on a continuation column.
        assert!(!line.match_text_at("界", 1));
    }

    #[test]
    fn test_search_in_trivial_without_inflating() {
        let line = line_with("needle in haystack", 40);
        assert_eq!(line.search("needle", 0), SearchResult::found(0));
        assert_eq!(line.search_reverse("hay", 39), SearchResult::found(10));
        assert!(line.is_trivial());
    }

    #[test]
    fn test_flags() {
        let mut line = Line::new(4);
        assert!(!line.wrapped());
        line.set_wrapped(true);
        line.set_marked(true);
        assert!(line.wrapped());
        assert!(line.marked());
        assert!(!line.wrappable());

        line.reset(LineFlags::empty(), GraphicsAttributes::default());
        assert!(!line.wrapped());
        assert!(!line.marked());
    }
}
