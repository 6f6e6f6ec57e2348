//! Staged control-function state.
//!
//! A [`Sequence`] holds the decoded identity of one control function
//! between the moment the parser leaves ground state and the dispatch
//! callback: category, optional leader byte, intermediate bytes, final
//! character, and parameters. The parser owns a single `Sequence` and
//! reuses it for every control function to avoid reallocation; consumers
//! receive it by reference and must not retain it across dispatches.

use std::borrow::Cow;

use crate::params::Params;

/// Intermediates beyond this count are dropped; the sequence still
/// dispatches (real control functions use at most two).
pub const MAX_INTERMEDIATES: usize = 4;

/// OSC payloads beyond this length are truncated silently.
pub const MAX_OSC_LENGTH: usize = 65536;

/// Control function category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Esc,
    Csi,
    Osc,
    Dcs,
}

#[derive(Debug, Clone)]
pub struct Sequence {
    kind: SequenceKind,
    leader: Option<u8>,
    /// Intermediate bytes for ESC/CSI/DCS; for OSC this buffer holds the
    /// raw payload instead.
    intermediates: Vec<u8>,
    final_byte: u8,
    params: Params,
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequence {
    pub fn new() -> Self {
        Sequence {
            kind: SequenceKind::Esc,
            leader: None,
            intermediates: Vec::with_capacity(MAX_INTERMEDIATES),
            final_byte: 0,
            params: Params::new(),
        }
    }

    /// Reset all staged state for a new control function.
    pub fn clear(&mut self) {
        self.leader = None;
        self.intermediates.clear();
        self.final_byte = 0;
        self.params.clear();
    }

    /// Reset everything except the parameter collection. Used when an ESC
    /// interrupts an accumulating string and staged parameters must
    /// survive across the dispatch boundary.
    pub fn clear_except_parameters(&mut self) {
        self.leader = None;
        self.intermediates.clear();
        self.final_byte = 0;
    }

    pub fn set_kind(&mut self, kind: SequenceKind) {
        self.kind = kind;
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    /// Append an intermediate byte (0x20..=0x2F).
    pub fn collect(&mut self, byte: u8) {
        if self.intermediates.len() < MAX_INTERMEDIATES {
            self.intermediates.push(byte);
        }
    }

    /// Record the leader byte (`<`, `=`, `>`, `?`). The slot holds one
    /// byte; a second leader overwrites it (last-write-wins).
    pub fn collect_leader(&mut self, byte: u8) {
        self.leader = Some(byte);
    }

    /// Append one byte of OSC payload, bounded by [`MAX_OSC_LENGTH`].
    pub fn put_osc(&mut self, byte: u8) {
        if self.intermediates.len() < MAX_OSC_LENGTH {
            self.intermediates.push(byte);
        }
    }

    pub fn set_final(&mut self, byte: u8) {
        self.final_byte = byte;
    }

    /// Finalize parameters before dispatch. For OSC sequences the leading
    /// numeric code of the payload is moved into parameter slot 0 and the
    /// remainder (after the separating `;`) stays as the payload.
    pub fn fixate(&mut self) {
        self.params.fixate();
        if self.kind == SequenceKind::Osc {
            let mut code: u16 = 0;
            let mut idx = 0;
            while idx < self.intermediates.len() && self.intermediates[idx].is_ascii_digit() {
                let d = (self.intermediates[idx] - b'0') as u16;
                code = code.saturating_mul(10).saturating_add(d);
                idx += 1;
            }
            if idx < self.intermediates.len() && self.intermediates[idx] == b';' {
                idx += 1;
            }
            self.intermediates.drain(..idx);
            self.params.push(code);
        }
    }

    pub fn leader(&self) -> Option<u8> {
        self.leader
    }

    pub fn intermediates(&self) -> &[u8] {
        &self.intermediates
    }

    pub fn final_byte(&self) -> u8 {
        self.final_byte
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Raw OSC payload bytes (valid after [`Sequence::fixate`] on an OSC).
    pub fn osc_payload(&self) -> &[u8] {
        &self.intermediates
    }

    /// OSC payload as text, with invalid UTF-8 replaced.
    pub fn osc_payload_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.intermediates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc_code_extraction() {
        let mut seq = Sequence::new();
        seq.clear();
        seq.set_kind(SequenceKind::Osc);
        for b in b"0;hello" {
            seq.put_osc(*b);
        }
        seq.fixate();

        assert_eq!(seq.params().get(0), Some(0));
        assert_eq!(seq.osc_payload(), b"hello");
        assert_eq!(seq.osc_payload_lossy(), "hello");
    }

    #[test]
    fn test_osc_multi_digit_code() {
        let mut seq = Sequence::new();
        seq.clear();
        seq.set_kind(SequenceKind::Osc);
        for b in b"104;1;2" {
            seq.put_osc(*b);
        }
        seq.fixate();

        assert_eq!(seq.params().get(0), Some(104));
        assert_eq!(seq.osc_payload(), b"1;2");
    }

    #[test]
    fn test_osc_without_code() {
        let mut seq = Sequence::new();
        seq.clear();
        seq.set_kind(SequenceKind::Osc);
        for b in b"hello" {
            seq.put_osc(*b);
        }
        seq.fixate();

        assert_eq!(seq.params().get(0), Some(0));
        assert_eq!(seq.osc_payload(), b"hello");
    }

    #[test]
    fn test_osc_payload_cap() {
        let mut seq = Sequence::new();
        seq.clear();
        seq.set_kind(SequenceKind::Osc);
        for _ in 0..(MAX_OSC_LENGTH + 100) {
            seq.put_osc(b'x');
        }
        assert_eq!(seq.intermediates().len(), MAX_OSC_LENGTH);
    }

    #[test]
    fn test_intermediates_cap() {
        let mut seq = Sequence::new();
        seq.clear();
        for _ in 0..10 {
            seq.collect(b'!');
        }
        assert_eq!(seq.intermediates().len(), MAX_INTERMEDIATES);
    }

    #[test]
    fn test_leader_last_write_wins() {
        let mut seq = Sequence::new();
        seq.clear();
        seq.collect_leader(b'?');
        seq.collect_leader(b'>');
        assert_eq!(seq.leader(), Some(b'>'));
    }

    #[test]
    fn test_clear_except_parameters() {
        let mut seq = Sequence::new();
        seq.clear();
        seq.params_mut().digit(b'5');
        seq.params_mut().fixate();
        seq.collect(b'$');
        seq.set_final(b'q');

        seq.clear_except_parameters();
        assert!(seq.intermediates().is_empty());
        assert_eq!(seq.final_byte(), 0);
        assert_eq!(seq.params().get(0), Some(5));
    }
}
