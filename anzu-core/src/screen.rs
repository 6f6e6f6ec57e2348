//! Screen model: the consumer of parser events.
//!
//! The screen owns the visible grid (primary and alternate), the
//! scrollback buffer, cursor state, current rendition, the hyperlink
//! registry, and the mode subset that affects grid content. It implements
//! [`Perform`], applying each decoded control function to its lines.
//!
//! Unknown or unsupported sequences are logged at debug level and
//! dropped; nothing at this layer is an error.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

use anzu_parser::control::c0;
use anzu_parser::{Perform, Sequence};

use crate::attrs::{CellFlags, GraphicsAttributes};
use crate::color::{Color, NamedColor, Rgb};
use crate::cursor::{Cursor, SavedCursor};
use crate::grid::Grid;
use crate::hyperlink::{HyperlinkId, HyperlinkRegistry};
use crate::line::{Line, LineFlags};
use crate::scrollback::Scrollback;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollRegion {
    pub top: usize,
    pub bottom: usize,
}

impl ScrollRegion {
    pub fn new(top: usize, bottom: usize) -> Self {
        ScrollRegion { top, bottom }
    }

    pub fn full(rows: usize) -> Self {
        ScrollRegion {
            top: 0,
            bottom: rows.saturating_sub(1),
        }
    }

    pub fn contains(&self, row: usize) -> bool {
        row >= self.top && row <= self.bottom
    }
}

/// The mode subset that affects grid content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenModes {
    pub origin_mode: bool,
    pub autowrap: bool,
    pub insert_mode: bool,
    pub bracketed_paste: bool,
}

impl Default for ScreenModes {
    fn default() -> Self {
        ScreenModes {
            origin_mode: false,
            autowrap: true,
            insert_mode: false,
            bracketed_paste: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabStops {
    stops: Vec<bool>,
}

impl TabStops {
    pub fn new(cols: usize) -> Self {
        let mut stops = vec![false; cols];
        for i in (0..cols).step_by(8) {
            stops[i] = true;
        }
        TabStops { stops }
    }

    pub fn set(&mut self, col: usize) {
        if col < self.stops.len() {
            self.stops[col] = true;
        }
    }

    pub fn clear(&mut self, col: usize) {
        if col < self.stops.len() {
            self.stops[col] = false;
        }
    }

    pub fn clear_all(&mut self) {
        for stop in &mut self.stops {
            *stop = false;
        }
    }

    pub fn next_stop(&self, col: usize) -> usize {
        for i in (col + 1)..self.stops.len() {
            if self.stops[i] {
                return i;
            }
        }
        self.stops.len().saturating_sub(1)
    }

    pub fn resize(&mut self, new_cols: usize) {
        let old_len = self.stops.len();
        self.stops.resize(new_cols, false);
        for i in old_len..new_cols {
            self.stops[i] = i % 8 == 0;
        }
    }
}

/// Terminal screen state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    cols: usize,
    rows: usize,

    grid: Grid,
    alt_grid: Grid,
    using_alternate: bool,

    scrollback: Scrollback,

    cursor: Cursor,
    saved_cursor_primary: Option<SavedCursor>,
    saved_cursor_alternate: Option<SavedCursor>,

    scroll_region: ScrollRegion,
    modes: ScreenModes,
    tab_stops: TabStops,

    /// Current rendition, applied to everything printed.
    sgr: GraphicsAttributes,
    /// Hyperlink applied to printed cells (OSC 8).
    active_hyperlink: HyperlinkId,
    hyperlinks: HyperlinkRegistry,

    title: String,
    icon_name: String,
}

impl Screen {
    pub fn new(rows: usize, cols: usize) -> Self {
        Screen {
            cols,
            rows,
            grid: Grid::new(rows, cols),
            alt_grid: Grid::new(rows, cols),
            using_alternate: false,
            scrollback: Scrollback::default(),
            cursor: Cursor::new(),
            saved_cursor_primary: None,
            saved_cursor_alternate: None,
            scroll_region: ScrollRegion::full(rows),
            modes: ScreenModes::default(),
            tab_stops: TabStops::new(cols),
            sgr: GraphicsAttributes::default(),
            active_hyperlink: HyperlinkId::NONE,
            hyperlinks: HyperlinkRegistry::new(),
            title: String::new(),
            icon_name: String::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn modes(&self) -> &ScreenModes {
        &self.modes
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn icon_name(&self) -> &str {
        &self.icon_name
    }

    pub fn scroll_region(&self) -> &ScrollRegion {
        &self.scroll_region
    }

    pub fn is_using_alternate(&self) -> bool {
        self.using_alternate
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn hyperlinks(&self) -> &HyperlinkRegistry {
        &self.hyperlinks
    }

    pub fn current_attrs(&self) -> GraphicsAttributes {
        self.sgr
    }

    fn active_grid(&self) -> &Grid {
        if self.using_alternate {
            &self.alt_grid
        } else {
            &self.grid
        }
    }

    fn active_grid_mut(&mut self) -> &mut Grid {
        if self.using_alternate {
            &mut self.alt_grid
        } else {
            &mut self.grid
        }
    }

    pub fn line(&self, row: usize) -> Option<&Line> {
        self.active_grid().line(row)
    }

    pub fn line_mut(&mut self, row: usize) -> Option<&mut Line> {
        self.active_grid_mut().line_mut(row)
    }

    pub fn cell_empty_at(&self, row: usize, col: usize) -> bool {
        self.line(row).map_or(true, |l| l.cell_empty_at(col))
    }

    pub fn cell_width_at(&self, row: usize, col: usize) -> usize {
        self.line(row).map_or(1, |l| l.cell_width_at(col))
    }

    pub fn row_text(&self, row: usize) -> String {
        self.line(row).map(Line::to_utf8_trimmed).unwrap_or_default()
    }

    /// All visible rows as text, trailing blanks trimmed.
    pub fn screen_text(&self) -> String {
        (0..self.rows)
            .map(|r| self.row_text(r))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Attributes used for erased cells: current background, no glyph
    /// styling (background color erase).
    fn erase_attrs(&self) -> GraphicsAttributes {
        GraphicsAttributes {
            fg: Color::Default,
            bg: self.sgr.bg,
            flags: CellFlags::empty(),
        }
    }

    // --- cursor and scrolling ---------------------------------------------

    fn linefeed(&mut self) {
        self.cursor.pending_wrap = false;
        if self.cursor.row == self.scroll_region.bottom {
            self.scroll_region_up(1);
        } else if self.cursor.row < self.rows - 1 {
            self.cursor.row += 1;
        }
    }

    fn reverse_index(&mut self) {
        self.cursor.pending_wrap = false;
        if self.cursor.row == self.scroll_region.top {
            self.scroll_region_down(1);
        } else if self.cursor.row > 0 {
            self.cursor.row -= 1;
        }
    }

    fn scroll_region_up(&mut self, n: usize) {
        let top = self.scroll_region.top;
        let bottom = self.scroll_region.bottom;
        let attrs = self.erase_attrs();
        let keep_history = !self.using_alternate && top == 0;
        let evicted = self.active_grid_mut().scroll_up(top, bottom, n, attrs);
        if keep_history {
            self.scrollback.push_lines(evicted);
        }
    }

    fn scroll_region_down(&mut self, n: usize) {
        let top = self.scroll_region.top;
        let bottom = self.scroll_region.bottom;
        let attrs = self.erase_attrs();
        self.active_grid_mut().scroll_down(top, bottom, n, attrs);
    }

    fn goto(&mut self, row: usize, col: usize) {
        let (min_row, max_row) = if self.modes.origin_mode {
            (self.scroll_region.top, self.scroll_region.bottom)
        } else {
            (0, self.rows - 1)
        };
        let row = if self.modes.origin_mode {
            self.scroll_region.top + row
        } else {
            row
        };
        self.cursor.row = row.clamp(min_row, max_row);
        self.cursor.col = col.min(self.cols - 1);
        self.cursor.pending_wrap = false;
    }

    fn save_cursor(&mut self) {
        let saved = SavedCursor {
            row: self.cursor.row,
            col: self.cursor.col,
            attrs: self.sgr,
            origin_mode: self.modes.origin_mode,
            pending_wrap: self.cursor.pending_wrap,
        };
        if self.using_alternate {
            self.saved_cursor_alternate = Some(saved);
        } else {
            self.saved_cursor_primary = Some(saved);
        }
    }

    fn restore_cursor(&mut self) {
        let saved = if self.using_alternate {
            self.saved_cursor_alternate.clone()
        } else {
            self.saved_cursor_primary.clone()
        };
        if let Some(saved) = saved {
            self.cursor.row = saved.row.min(self.rows - 1);
            self.cursor.col = saved.col.min(self.cols - 1);
            self.sgr = saved.attrs;
            self.modes.origin_mode = saved.origin_mode;
        }
        self.cursor.pending_wrap = false;
    }

    fn enter_alternate(&mut self) {
        if !self.using_alternate {
            self.using_alternate = true;
            let attrs = GraphicsAttributes::default();
            self.alt_grid.clear(attrs);
            self.cursor = Cursor::new();
        }
    }

    fn leave_alternate(&mut self) {
        self.using_alternate = false;
    }

    // --- resize and reset -------------------------------------------------

    pub fn resize(&mut self, rows: usize, cols: usize) {
        if rows == 0 || cols == 0 || (rows == self.rows && cols == self.cols) {
            return;
        }

        // Shrinking pushes top lines of the primary screen into history.
        while self.grid.rows() > rows {
            if let Some(line) = self.grid.pop_top() {
                self.scrollback.push(line);
            }
            if self.cursor.row > 0 {
                self.cursor.row -= 1;
            }
        }
        while self.grid.rows() < rows {
            self.grid.push_blank();
        }
        self.grid.resize(rows, cols);
        self.alt_grid.resize(rows, cols);

        self.rows = rows;
        self.cols = cols;
        self.cursor.row = self.cursor.row.min(rows - 1);
        self.cursor.col = self.cursor.col.min(cols - 1);
        self.cursor.pending_wrap = false;
        self.scroll_region = ScrollRegion::full(rows);
        self.tab_stops.resize(cols);
    }

    /// Full reset (RIS).
    pub fn reset(&mut self) {
        let attrs = GraphicsAttributes::default();
        self.grid.clear(attrs);
        self.alt_grid.clear(attrs);
        self.using_alternate = false;
        self.scrollback.clear();
        self.cursor = Cursor::new();
        self.saved_cursor_primary = None;
        self.saved_cursor_alternate = None;
        self.scroll_region = ScrollRegion::full(self.rows);
        self.modes = ScreenModes::default();
        self.tab_stops = TabStops::new(self.cols);
        self.sgr = GraphicsAttributes::default();
        self.active_hyperlink = HyperlinkId::NONE;
        self.hyperlinks.clear();
        self.title.clear();
        self.icon_name.clear();
    }

    // --- printing ---------------------------------------------------------

    fn put_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        let width = ch.width().unwrap_or(0);
        if width == 0 {
            self.put_combining(ch);
            return;
        }

        if self.cursor.pending_wrap && self.modes.autowrap {
            self.wrap_line();
        }

        // A wide glyph that no longer fits wraps early.
        if width == 2 && self.cursor.col + 2 > self.cols {
            if self.modes.autowrap {
                self.wrap_line();
            } else {
                self.cursor.col = self.cols.saturating_sub(2);
            }
        }

        let row = self.cursor.row;
        let col = self.cursor.col;
        let attrs = self.sgr;
        let hyperlink = self.active_hyperlink;
        let insert = self.modes.insert_mode;
        let erase = self.erase_attrs();

        if let Some(line) = self.active_grid_mut().line_mut(row) {
            if insert {
                line.insert_blanks(col, width, erase);
            }
            let fast_path = !insert
                && width == 1
                && ch.is_ascii()
                && line.try_append_ascii(col, ch as u8, attrs, hyperlink);
            if !fast_path {
                line.write_cell(col, ch, width as u8, attrs, hyperlink);
            }
        }

        let new_col = col + width;
        if new_col >= self.cols {
            self.cursor.col = self.cols - 1;
            self.cursor.pending_wrap = true;
        } else {
            self.cursor.col = new_col;
        }
    }

    fn wrap_line(&mut self) {
        self.cursor.col = 0;
        self.linefeed();
        let row = self.cursor.row;
        if let Some(line) = self.active_grid_mut().line_mut(row) {
            line.set_wrapped(true);
        }
    }

    fn put_combining(&mut self, ch: char) {
        let row = self.cursor.row;
        let mut col = if self.cursor.pending_wrap {
            self.cursor.col
        } else if self.cursor.col > 0 {
            self.cursor.col - 1
        } else {
            return;
        };
        if let Some(line) = self.active_grid_mut().line_mut(row) {
            if line.cell_width_at(col) == 0 && col > 0 {
                col -= 1;
            }
            line.append_combining(col, ch);
        }
    }

    // --- erase ------------------------------------------------------------

    fn erase_in_display(&mut self, mode: u16) {
        let row = self.cursor.row;
        let col = self.cursor.col;
        let attrs = self.erase_attrs();
        match mode {
            0 => {
                if let Some(line) = self.active_grid_mut().line_mut(row) {
                    line.clear_from(col, attrs);
                }
                for r in (row + 1)..self.rows {
                    if let Some(line) = self.active_grid_mut().line_mut(r) {
                        line.reset(LineFlags::empty(), attrs);
                    }
                }
            }
            1 => {
                for r in 0..row {
                    if let Some(line) = self.active_grid_mut().line_mut(r) {
                        line.reset(LineFlags::empty(), attrs);
                    }
                }
                if let Some(line) = self.active_grid_mut().line_mut(row) {
                    line.clear_to(col, attrs);
                }
            }
            2 => {
                for r in 0..self.rows {
                    if let Some(line) = self.active_grid_mut().line_mut(r) {
                        line.reset(LineFlags::empty(), attrs);
                    }
                }
            }
            3 => {
                self.scrollback.clear();
                for r in 0..self.rows {
                    if let Some(line) = self.active_grid_mut().line_mut(r) {
                        line.reset(LineFlags::empty(), attrs);
                    }
                }
            }
            _ => log::debug!("unknown ED mode {}", mode),
        }
    }

    fn erase_in_line(&mut self, mode: u16) {
        let row = self.cursor.row;
        let col = self.cursor.col;
        let attrs = self.erase_attrs();
        if let Some(line) = self.active_grid_mut().line_mut(row) {
            match mode {
                0 => line.clear_from(col, attrs),
                1 => line.clear_to(col, attrs),
                2 => line.reset(LineFlags::empty(), attrs),
                _ => log::debug!("unknown EL mode {}", mode),
            }
        }
    }

    // --- SGR --------------------------------------------------------------

    fn apply_sgr(&mut self, seq: &Sequence) {
        let params = seq.params();
        if params.is_empty() {
            self.sgr.reset();
            return;
        }

        let mut i = 0;
        while i < params.len() {
            let code = params.get_or(i, 0);
            match code {
                0 => self.sgr.reset(),
                1 => self.sgr.flags.insert(CellFlags::BOLD),
                2 => self.sgr.flags.insert(CellFlags::FAINT),
                3 => self.sgr.flags.insert(CellFlags::ITALIC),
                4 => {
                    // 4:0 disables; any other subparameter style is
                    // rendered as plain underline here.
                    if params.subparams(i).first() == Some(&0) {
                        self.sgr.flags.remove(CellFlags::UNDERLINE);
                        self.sgr.flags.remove(CellFlags::DOUBLE_UNDERLINE);
                    } else {
                        self.sgr.flags.insert(CellFlags::UNDERLINE);
                    }
                }
                5 | 6 => self.sgr.flags.insert(CellFlags::BLINK),
                7 => self.sgr.flags.insert(CellFlags::INVERSE),
                8 => self.sgr.flags.insert(CellFlags::HIDDEN),
                9 => self.sgr.flags.insert(CellFlags::STRIKETHROUGH),
                21 => self.sgr.flags.insert(CellFlags::DOUBLE_UNDERLINE),
                22 => {
                    self.sgr.flags.remove(CellFlags::BOLD);
                    self.sgr.flags.remove(CellFlags::FAINT);
                }
                23 => self.sgr.flags.remove(CellFlags::ITALIC),
                24 => {
                    self.sgr.flags.remove(CellFlags::UNDERLINE);
                    self.sgr.flags.remove(CellFlags::DOUBLE_UNDERLINE);
                }
                25 => self.sgr.flags.remove(CellFlags::BLINK),
                27 => self.sgr.flags.remove(CellFlags::INVERSE),
                28 => self.sgr.flags.remove(CellFlags::HIDDEN),
                29 => self.sgr.flags.remove(CellFlags::STRIKETHROUGH),
                30..=37 => {
                    self.sgr.fg = NamedColor::from_sgr_normal(code - 30)
                        .map(Color::Named)
                        .unwrap_or(Color::Default)
                }
                38 => {
                    let (color, consumed) = Self::extended_color(seq, i);
                    if let Some(color) = color {
                        self.sgr.fg = color;
                    }
                    i += consumed;
                }
                39 => self.sgr.fg = Color::Default,
                40..=47 => {
                    self.sgr.bg = NamedColor::from_sgr_normal(code - 40)
                        .map(Color::Named)
                        .unwrap_or(Color::Default)
                }
                48 => {
                    let (color, consumed) = Self::extended_color(seq, i);
                    if let Some(color) = color {
                        self.sgr.bg = color;
                    }
                    i += consumed;
                }
                49 => self.sgr.bg = Color::Default,
                90..=97 => {
                    self.sgr.fg = NamedColor::from_sgr_bright(code - 90)
                        .map(Color::Named)
                        .unwrap_or(Color::Default)
                }
                100..=107 => {
                    self.sgr.bg = NamedColor::from_sgr_bright(code - 100)
                        .map(Color::Named)
                        .unwrap_or(Color::Default)
                }
                other => log::debug!("unhandled SGR {}", other),
            }
            i += 1;
        }
    }

    /// Parse the extended color forms of SGR 38/48. Returns the color and
    /// how many extra semicolon parameters were consumed (zero for the
    /// colon subparameter form).
    fn extended_color(seq: &Sequence, i: usize) -> (Option<Color>, usize) {
        let params = seq.params();
        let subs = params.subparams(i);
        if !subs.is_empty() {
            // 38:5:n / 38:2:r:g:b
            let color = match subs.first().copied() {
                Some(5) => subs.get(1).map(|&n| Color::Indexed(n.min(255) as u8)),
                Some(2) => {
                    // Accept both 2:r:g:b and the odd 2:colorspace:r:g:b.
                    let rgb = if subs.len() >= 5 { &subs[2..5] } else { subs.get(1..4).unwrap_or(&[]) };
                    if rgb.len() == 3 {
                        Some(Color::Rgb(Rgb::new(
                            rgb[0].min(255) as u8,
                            rgb[1].min(255) as u8,
                            rgb[2].min(255) as u8,
                        )))
                    } else {
                        None
                    }
                }
                _ => None,
            };
            return (color, 0);
        }
        // 38;5;n / 38;2;r;g;b
        match params.get_or(i + 1, 0) {
            5 => (
                Some(Color::Indexed(params.get_or(i + 2, 0).min(255) as u8)),
                2,
            ),
            2 => (
                Some(Color::Rgb(Rgb::new(
                    params.get_or(i + 2, 0).min(255) as u8,
                    params.get_or(i + 3, 0).min(255) as u8,
                    params.get_or(i + 4, 0).min(255) as u8,
                ))),
                4,
            ),
            _ => (None, 0),
        }
    }

    // --- modes ------------------------------------------------------------

    fn set_mode(&mut self, seq: &Sequence, enable: bool) {
        let params = seq.params();
        for i in 0..params.len() {
            let mode = params.get_or(i, 0);
            match seq.leader() {
                Some(b'?') => self.set_dec_mode(mode, enable),
                None => match mode {
                    4 => self.modes.insert_mode = enable,
                    _ => log::debug!("unknown ANSI mode {}", mode),
                },
                _ => log::debug!("mode with unexpected leader"),
            }
        }
    }

    fn set_dec_mode(&mut self, mode: u16, enable: bool) {
        match mode {
            6 => {
                self.modes.origin_mode = enable;
                self.goto(0, 0);
            }
            7 => self.modes.autowrap = enable,
            25 => self.cursor.visible = enable,
            47 | 1047 => {
                if enable {
                    self.enter_alternate();
                } else {
                    self.leave_alternate();
                }
            }
            1049 => {
                if enable {
                    self.save_cursor();
                    self.enter_alternate();
                } else {
                    self.leave_alternate();
                    self.restore_cursor();
                }
            }
            2004 => self.modes.bracketed_paste = enable,
            _ => log::debug!("unknown DEC private mode {}", mode),
        }
    }

    // --- dispatch helpers -------------------------------------------------

    fn csi(&mut self, seq: &Sequence) {
        if let Some(leader) = seq.leader() {
            match (leader, seq.final_byte()) {
                (b'?', b'h') => self.set_mode(seq, true),
                (b'?', b'l') => self.set_mode(seq, false),
                _ => log::debug!(
                    "ignored CSI {} ... {}",
                    leader as char,
                    seq.final_byte() as char
                ),
            }
            return;
        }
        if !seq.intermediates().is_empty() {
            log::debug!("ignored CSI with intermediates {:?}", seq.intermediates());
            return;
        }

        let params = seq.params();
        match seq.final_byte() {
            b'A' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                let min = if self.modes.origin_mode {
                    self.scroll_region.top
                } else {
                    0
                };
                self.cursor.move_up(n, min);
            }
            b'B' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                let max = if self.modes.origin_mode {
                    self.scroll_region.bottom
                } else {
                    self.rows - 1
                };
                self.cursor.move_down(n, max);
            }
            b'C' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                self.cursor.move_right(n, self.cols - 1);
            }
            b'D' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                self.cursor.move_left(n);
            }
            b'E' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                self.cursor.move_down(n, self.rows - 1);
                self.cursor.col = 0;
            }
            b'F' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                self.cursor.move_up(n, 0);
                self.cursor.col = 0;
            }
            b'G' => {
                let col = params.get_nonzero_or(0, 1) as usize - 1;
                self.cursor.col = col.min(self.cols - 1);
                self.cursor.pending_wrap = false;
            }
            b'H' | b'f' => {
                let row = params.get_nonzero_or(0, 1) as usize - 1;
                let col = params.get_nonzero_or(1, 1) as usize - 1;
                self.goto(row, col);
            }
            b'J' => self.erase_in_display(params.get_or(0, 0)),
            b'K' => self.erase_in_line(params.get_or(0, 0)),
            b'L' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                if self.scroll_region.contains(self.cursor.row) {
                    let row = self.cursor.row;
                    let bottom = self.scroll_region.bottom;
                    let attrs = self.erase_attrs();
                    self.active_grid_mut().insert_lines(row, bottom, n, attrs);
                }
                self.cursor.pending_wrap = false;
            }
            b'M' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                if self.scroll_region.contains(self.cursor.row) {
                    let row = self.cursor.row;
                    let bottom = self.scroll_region.bottom;
                    let attrs = self.erase_attrs();
                    self.active_grid_mut().delete_lines(row, bottom, n, attrs);
                }
                self.cursor.pending_wrap = false;
            }
            b'P' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                let row = self.cursor.row;
                let col = self.cursor.col;
                let attrs = self.erase_attrs();
                if let Some(line) = self.active_grid_mut().line_mut(row) {
                    line.delete_cells(col, n, attrs);
                }
                self.cursor.pending_wrap = false;
            }
            b'S' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                self.scroll_region_up(n);
            }
            b'T' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                self.scroll_region_down(n);
            }
            b'X' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                let row = self.cursor.row;
                let col = self.cursor.col;
                let attrs = self.erase_attrs();
                if let Some(line) = self.active_grid_mut().line_mut(row) {
                    line.clear_range(col, col + n, attrs);
                }
            }
            b'@' => {
                let n = params.get_nonzero_or(0, 1) as usize;
                let row = self.cursor.row;
                let col = self.cursor.col;
                let attrs = self.erase_attrs();
                if let Some(line) = self.active_grid_mut().line_mut(row) {
                    line.insert_blanks(col, n, attrs);
                }
                self.cursor.pending_wrap = false;
            }
            b'd' => {
                let row = params.get_nonzero_or(0, 1) as usize - 1;
                let col = self.cursor.col;
                self.goto(row, col);
            }
            b'g' => match params.get_or(0, 0) {
                0 => self.tab_stops.clear(self.cursor.col),
                3 => self.tab_stops.clear_all(),
                _ => {}
            },
            b'h' => self.set_mode(seq, true),
            b'l' => self.set_mode(seq, false),
            b'm' => self.apply_sgr(seq),
            b'r' => {
                let top = params.get_nonzero_or(0, 1) as usize - 1;
                let bottom = params.get_nonzero_or(1, self.rows as u16) as usize - 1;
                let bottom = bottom.min(self.rows - 1);
                if top < bottom {
                    self.scroll_region = ScrollRegion::new(top, bottom);
                    self.goto(0, 0);
                }
            }
            b's' => self.save_cursor(),
            b'u' => self.restore_cursor(),
            b'n' | b'c' | b't' => {
                // Reports travel the PTY write path, which the core does
                // not own.
                log::debug!("ignored report request CSI {}", seq.final_byte() as char);
            }
            other => log::debug!("unhandled CSI final {:?}", other as char),
        }
    }

    fn esc(&mut self, seq: &Sequence) {
        match (seq.intermediates(), seq.final_byte()) {
            ([], b'7') => self.save_cursor(),
            ([], b'8') => self.restore_cursor(),
            ([], b'D') => self.linefeed(),
            ([], b'E') => {
                self.linefeed();
                self.cursor.col = 0;
            }
            ([], b'H') => self.tab_stops.set(self.cursor.col),
            ([], b'M') => self.reverse_index(),
            ([], b'c') => self.reset(),
            ([b'#'], b'8') => {
                // DECALN: fill the screen with 'E' for alignment checks.
                let attrs = GraphicsAttributes::default();
                for line in self.active_grid_mut().iter_mut() {
                    line.fill(LineFlags::empty(), attrs, 'E', 1);
                }
                self.cursor = Cursor::new();
            }
            ([], b'=') | ([], b'>') => {
                // Keypad modes concern the input layer.
            }
            (intermediates, final_byte) => {
                log::debug!(
                    "unhandled ESC {:?} {:?}",
                    intermediates,
                    final_byte as char
                );
            }
        }
    }

    fn osc(&mut self, seq: &Sequence) {
        let code = seq.params().get_or(0, 0);
        match code {
            0 => {
                let payload = seq.osc_payload_lossy().into_owned();
                self.title = payload.clone();
                self.icon_name = payload;
            }
            1 => self.icon_name = seq.osc_payload_lossy().into_owned(),
            2 => self.title = seq.osc_payload_lossy().into_owned(),
            8 => self.osc_hyperlink(seq),
            _ => log::debug!("ignored OSC {}", code),
        }
    }

    /// OSC 8: `params;uri` where params is a colon-separated list that
    /// may carry `id=...`. An empty URI ends the hyperlinked range.
    fn osc_hyperlink(&mut self, seq: &Sequence) {
        let payload = seq.osc_payload_lossy().into_owned();
        let (params, uri) = match payload.split_once(';') {
            Some((p, u)) => (p, u),
            None => (payload.as_str(), ""),
        };
        if uri.is_empty() {
            self.active_hyperlink = HyperlinkId::NONE;
            return;
        }
        let id_param = params
            .split(':')
            .find_map(|kv| kv.strip_prefix("id="))
            .filter(|id| !id.is_empty());
        self.active_hyperlink = self.hyperlinks.define(id_param, uri);
    }

    // --- multi-line search ------------------------------------------------

    /// Number of addressable lines: scrollback history plus the primary
    /// viewport.
    pub fn total_lines(&self) -> usize {
        self.scrollback.len() + self.rows
    }

    /// Line by absolute index over history + primary viewport
    /// (0 = oldest scrollback line).
    pub fn line_at(&self, index: usize) -> Option<&Line> {
        let history = self.scrollback.len();
        if index < history {
            self.scrollback.get(index)
        } else {
            self.grid.line(index - history)
        }
    }

    /// Whether `text` matches starting exactly at the given absolute
    /// position, continuing across wrapped-line boundaries.
    fn match_text_from(&self, text: &str, mut index: usize, mut col: usize) -> bool {
        let Some(mut line) = self.line_at(index) else {
            return false;
        };
        for ch in text.chars() {
            while col >= line.size() {
                let Some(next) = self.line_at(index + 1) else {
                    return false;
                };
                if !next.wrapped() {
                    return false;
                }
                index += 1;
                line = next;
                col = 0;
            }
            match line.primary_char_at(col) {
                Some(c) if c == ch => col += line.cell_width_at(col).max(1),
                _ => return false,
            }
        }
        true
    }

    /// Search forward from the given absolute position. Returns the
    /// absolute (line, column) where the match begins; matches may span
    /// wrapped lines.
    pub fn search_down(&self, text: &str, start_line: usize, start_col: usize) -> Option<(usize, usize)> {
        if text.is_empty() {
            return None;
        }
        let total = self.total_lines();
        for index in start_line..total {
            let from = if index == start_line { start_col } else { 0 };
            let line = self.line_at(index)?;
            let result = line.search(text, from);
            if let Some(col) = result.column {
                return Some((index, col));
            }
            if result.is_partial() {
                // The tail of this line matched a prefix of the text;
                // confirm the remainder across the wrapped continuation.
                for base in from..line.size() {
                    if self.match_text_from(text, index, base) {
                        return Some((index, base));
                    }
                }
            }
        }
        None
    }

    /// Search backward from the given absolute position. Returns the
    /// absolute (line, column) where the match begins.
    pub fn search_up(&self, text: &str, start_line: usize, start_col: usize) -> Option<(usize, usize)> {
        if text.is_empty() {
            return None;
        }
        let start_line = start_line.min(self.total_lines().saturating_sub(1));
        for index in (0..=start_line).rev() {
            let line = self.line_at(index)?;
            let from = if index == start_line {
                start_col
            } else {
                line.size().saturating_sub(1)
            };
            let result = line.search_reverse(text, from);
            if let Some(col) = result.column {
                return Some((index, col));
            }
            if result.is_partial() && index > 0 && line.wrapped() {
                // The head of this line matched a suffix of the text; the
                // match would begin on an earlier line. Scan candidate
                // start columns on the previous lines.
                for back in (0..index).rev() {
                    let candidate = self.line_at(back)?;
                    for base in (0..candidate.size()).rev() {
                        if self.match_text_from(text, back, base) {
                            return Some((back, base));
                        }
                    }
                    if !candidate.wrapped() {
                        break;
                    }
                }
            }
        }
        None
    }
}

impl Perform for Screen {
    fn print(&mut self, c: char) {
        self.put_char(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            c0::BS => {
                self.cursor.pending_wrap = false;
                if self.cursor.col > 0 {
                    self.cursor.col -= 1;
                }
            }
            c0::HT => {
                self.cursor.pending_wrap = false;
                let next = self.tab_stops.next_stop(self.cursor.col);
                self.cursor.col = next.min(self.cols - 1);
            }
            c0::LF | c0::VT | c0::FF => self.linefeed(),
            c0::CR => {
                self.cursor.col = 0;
                self.cursor.pending_wrap = false;
            }
            c0::BEL => log::debug!("bell"),
            c0::SO | c0::SI => {
                // Charset shifting belongs to the input/GUI collaborators.
            }
            _ => {}
        }
    }

    fn esc_dispatch(&mut self, seq: &Sequence) {
        self.esc(seq);
    }

    fn csi_dispatch(&mut self, seq: &Sequence) {
        self.csi(seq);
    }

    fn osc_dispatch(&mut self, seq: &Sequence) {
        self.osc(seq);
    }

    fn hook(&mut self, seq: &Sequence) {
        log::trace!("DCS consumed, final {:?}", seq.final_byte() as char);
    }

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}
}
