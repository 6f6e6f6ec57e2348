//! The event contract between the parser and its consumer.
//!
//! The parser decodes; the consumer (typically a screen model) applies.
//! Implementors get every method as a default no-op so partial consumers
//! (tests, recorders, headless filters) only implement what they need.

use crate::sequence::Sequence;

/// Callbacks invoked by [`crate::Parser`] as control functions complete.
///
/// Dispatch methods receive the fully staged [`Sequence`]; the reference
/// is only valid for the duration of the call.
pub trait Perform {
    /// One decoded Unicode scalar ready for grid placement.
    fn print(&mut self, _c: char) {}

    /// A C0 control byte (BS, LF, CR, TAB, ...).
    fn execute(&mut self, _byte: u8) {}

    /// A completed ESC sequence.
    fn esc_dispatch(&mut self, _seq: &Sequence) {}

    /// A completed CSI sequence.
    fn csi_dispatch(&mut self, _seq: &Sequence) {}

    /// A completed OSC string (BEL or ST terminated).
    fn osc_dispatch(&mut self, _seq: &Sequence) {}

    /// Start of a DCS passthrough stream.
    fn hook(&mut self, _seq: &Sequence) {}

    /// One byte of DCS passthrough data.
    fn put(&mut self, _byte: u8) {}

    /// End of a DCS passthrough stream (also called on abort).
    fn unhook(&mut self) {}
}
