//! Anzu Terminal Parser
//!
//! This crate implements a VT/xterm escape sequence parser using the
//! VT500-series state machine, extended for UTF-8 text.
//! It converts a stream of bytes into events on a [`Perform`] callback object.
//!
//! The parser is:
//! - Streaming: can handle arbitrary chunk boundaries, including boundaries
//!   that split a UTF-8 character or an escape sequence
//! - Stateful: maintains parser state between chunks
//! - Robust: malformed input is silently consumed, never an error
//!
//! Supported sequences:
//! - C0 control characters (BEL, BS, HT, LF, VT, FF, CR, ESC)
//! - ESC sequences (DECSC, DECRC, IND, RI, NEL, HTS, DECALN)
//! - CSI sequences (cursor movement, erase, SGR, modes, scroll region)
//! - OSC sequences (window title, hyperlinks), terminated by BEL or ST
//! - DCS sequences (hooked, streamed, and terminated; payload left to the
//!   consumer)

pub mod control;
pub mod params;
pub mod parser;
pub mod perform;
pub mod sequence;

pub use params::Params;
pub use parser::Parser;
pub use perform::Perform;
pub use sequence::{Sequence, SequenceKind};
