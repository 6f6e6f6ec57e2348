//! Anzu Terminal Core
//!
//! This crate provides the platform-independent terminal emulator core:
//! - Line storage with a compressed representation for uniformly styled rows
//! - Cell representation with character, width, and attributes
//! - Screen model consuming parser events, with scrollback and search
//! - Cursor state management
//! - Snapshot capture for deterministic testing
//! - A mutex-guarded session wrapper for the parse/render thread hand-off
//!
//! This crate has NO GUI or PTY dependencies and can be used headlessly.

pub mod attrs;
pub mod cell;
pub mod color;
pub mod cursor;
pub mod grid;
pub mod hyperlink;
pub mod line;
pub mod screen;
pub mod scrollback;
pub mod session;
pub mod snapshot;

pub use attrs::{CellFlags, GraphicsAttributes};
pub use cell::Cell;
pub use color::Color;
pub use cursor::Cursor;
pub use grid::Grid;
pub use hyperlink::{Hyperlink, HyperlinkId, HyperlinkRegistry};
pub use line::{Line, LineFlags, SearchResult, TrivialLineBuffer};
pub use screen::Screen;
pub use scrollback::Scrollback;
pub use session::{Session, SessionError, StopHandle};
pub use snapshot::Snapshot;

pub const DEFAULT_COLS: usize = 80;
pub const DEFAULT_ROWS: usize = 24;
