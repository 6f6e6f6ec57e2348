//! VT/xterm escape sequence parser.
//!
//! This parser implements a state machine based on the VT500-series parser
//! described in the DEC documentation and Paul Williams' state machine
//! diagram, extended for UTF-8 text.
//!
//! The parser is streaming and can handle arbitrary chunk boundaries. It
//! drives a [`Perform`] callback object with semantic terminal events.
//!
//! The byte stream is treated as UTF-8: bytes 0x80..=0x9F are never
//! interpreted as 8-bit C1 introducers, since in UTF-8 they only occur
//! inside multi-byte characters. Strings terminate on BEL (OSC only) or
//! the 7-bit ST (`ESC \`).
//!
//! Malformed input is never an error: invalid sequences are consumed to
//! their terminator and dropped, oversized parameters clamp, and any
//! garbage stream leaves the parser able to return to ground state.

use crate::control::c0;
use crate::perform::Perform;
use crate::sequence::{Sequence, SequenceKind};

const REPLACEMENT: char = '\u{FFFD}';

/// Parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Normal character processing
    Ground,
    /// After ESC
    Escape,
    /// ESC with intermediate bytes
    EscapeIntermediate,
    /// After ESC [
    CsiEntry,
    /// CSI parameter bytes
    CsiParam,
    /// CSI intermediate bytes
    CsiIntermediate,
    /// Malformed CSI, consumed without dispatch
    CsiIgnore,
    /// After ESC ]
    OscString,
    /// After ESC P
    DcsEntry,
    /// DCS parameter bytes
    DcsParam,
    /// DCS intermediate bytes
    DcsIntermediate,
    /// DCS data, streamed to the consumer
    DcsPassthrough,
    /// Malformed DCS, consumed without dispatch
    DcsIgnore,
    /// SOS/PM/APC string, consumed without dispatch
    SosPmApcString,
}

/// The VT/xterm parser.
#[derive(Debug)]
pub struct Parser {
    state: State,
    /// Staged control-function state, reused across dispatches.
    sequence: Sequence,
    /// Expected UTF-8 continuation bytes
    utf8_remaining: u8,
    /// Codepoint being assembled
    utf8_codepoint: u32,
    /// Smallest codepoint the current encoding length may produce;
    /// anything below is an overlong form.
    utf8_min: u32,
    /// ESC seen inside a string state (possible ST)
    st_pending: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            state: State::Ground,
            sequence: Sequence::new(),
            utf8_remaining: 0,
            utf8_codepoint: 0,
            utf8_min: 0,
            st_pending: false,
        }
    }

    /// Reset to ground state, abandoning any partial sequence.
    pub fn reset(&mut self) {
        self.state = State::Ground;
        self.sequence.clear();
        self.utf8_remaining = 0;
        self.utf8_codepoint = 0;
        self.utf8_min = 0;
        self.st_pending = false;
    }

    /// True when no sequence or multi-byte character is in flight.
    pub fn in_ground_state(&self) -> bool {
        self.state == State::Ground && self.utf8_remaining == 0
    }

    /// Feed a chunk of bytes through the state machine.
    pub fn feed(&mut self, bytes: &[u8], performer: &mut dyn Perform) {
        for &byte in bytes {
            self.advance(byte, performer);
        }
    }

    /// Advance the state machine by a single byte.
    pub fn advance(&mut self, byte: u8, performer: &mut dyn Perform) {
        // UTF-8 continuation takes priority in ground state.
        if self.state == State::Ground && self.utf8_remaining > 0 {
            if byte & 0xC0 == 0x80 {
                self.utf8_codepoint = (self.utf8_codepoint << 6) | (byte & 0x3F) as u32;
                self.utf8_remaining -= 1;
                if self.utf8_remaining == 0 {
                    if self.utf8_codepoint >= self.utf8_min {
                        match char::from_u32(self.utf8_codepoint) {
                            Some(ch) => performer.print(ch),
                            None => performer.print(REPLACEMENT),
                        }
                    } else {
                        // Overlong encoding
                        performer.print(REPLACEMENT);
                    }
                }
                return;
            }
            // Truncated character; the interrupting byte is processed normally.
            performer.print(REPLACEMENT);
            self.utf8_remaining = 0;
        }

        match self.state {
            State::Ground => self.ground(byte, performer),
            State::Escape => self.escape(byte, performer),
            State::EscapeIntermediate => self.escape_intermediate(byte, performer),
            State::CsiEntry => self.csi_entry(byte, performer),
            State::CsiParam => self.csi_param(byte, performer),
            State::CsiIntermediate => self.csi_intermediate(byte, performer),
            State::CsiIgnore => self.csi_ignore(byte, performer),
            State::OscString => self.osc_string(byte, performer),
            State::DcsEntry => self.dcs_entry(byte, performer),
            State::DcsParam => self.dcs_param(byte, performer),
            State::DcsIntermediate => self.dcs_intermediate(byte, performer),
            State::DcsPassthrough => self.dcs_passthrough(byte, performer),
            State::DcsIgnore => self.dcs_ignore(byte, performer),
            State::SosPmApcString => self.sos_pm_apc_string(byte, performer),
        }
    }

    fn ground(&mut self, byte: u8, performer: &mut dyn Perform) {
        match byte {
            c0::ESC => {
                self.sequence.clear();
                self.state = State::Escape;
            }
            0x00..=0x1A | 0x1C..=0x1F => performer.execute(byte),
            c0::DEL => {}
            0x20..=0x7E => performer.print(byte as char),
            // UTF-8 lead bytes
            0xC2..=0xDF => self.utf8_start(byte & 0x1F, 1, 0x80),
            0xE0..=0xEF => self.utf8_start(byte & 0x0F, 2, 0x800),
            0xF0..=0xF4 => self.utf8_start(byte & 0x07, 3, 0x10000),
            // Stray continuation bytes, overlong leads (C0/C1), out of range
            _ => performer.print(REPLACEMENT),
        }
    }

    fn utf8_start(&mut self, bits: u8, remaining: u8, min: u32) {
        self.utf8_codepoint = bits as u32;
        self.utf8_remaining = remaining;
        self.utf8_min = min;
    }

    fn escape(&mut self, byte: u8, performer: &mut dyn Perform) {
        match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => performer.execute(byte),
            c0::CAN | c0::SUB => self.state = State::Ground,
            c0::ESC => self.sequence.clear(),
            c0::DEL => {}
            b'[' => {
                self.sequence.clear();
                self.sequence.set_kind(SequenceKind::Csi);
                self.state = State::CsiEntry;
            }
            b']' => {
                self.sequence.clear();
                self.sequence.set_kind(SequenceKind::Osc);
                self.state = State::OscString;
            }
            b'P' => {
                self.sequence.clear();
                self.sequence.set_kind(SequenceKind::Dcs);
                self.state = State::DcsEntry;
            }
            b'X' | b'^' | b'_' => self.state = State::SosPmApcString,
            // Bare string terminator: nothing to terminate, no event.
            b'\\' => self.state = State::Ground,
            0x20..=0x2F => {
                self.sequence.collect(byte);
                self.state = State::EscapeIntermediate;
            }
            0x30..=0x7E => {
                self.dispatch_esc(byte, performer);
                self.state = State::Ground;
            }
            _ => self.state = State::Ground,
        }
    }

    fn escape_intermediate(&mut self, byte: u8, performer: &mut dyn Perform) {
        match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => performer.execute(byte),
            c0::CAN | c0::SUB => self.state = State::Ground,
            c0::ESC => {
                self.sequence.clear();
                self.state = State::Escape;
            }
            c0::DEL => {}
            0x20..=0x2F => self.sequence.collect(byte),
            0x30..=0x7E => {
                self.dispatch_esc(byte, performer);
                self.state = State::Ground;
            }
            _ => self.state = State::Ground,
        }
    }

    fn csi_entry(&mut self, byte: u8, performer: &mut dyn Perform) {
        match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => performer.execute(byte),
            c0::CAN | c0::SUB => self.state = State::Ground,
            c0::ESC => {
                self.sequence.clear();
                self.state = State::Escape;
            }
            c0::DEL => {}
            // Leader byte, valid only before any parameter
            0x3C..=0x3F => {
                self.sequence.collect_leader(byte);
                self.state = State::CsiParam;
            }
            0x30..=0x39 => {
                self.sequence.params_mut().digit(byte);
                self.state = State::CsiParam;
            }
            b';' => {
                self.sequence.params_mut().separator();
                self.state = State::CsiParam;
            }
            b':' => {
                self.sequence.params_mut().sub_separator();
                self.state = State::CsiParam;
            }
            0x20..=0x2F => {
                self.sequence.collect(byte);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7E => {
                self.dispatch_csi(byte, performer);
                self.state = State::Ground;
            }
            _ => self.state = State::CsiIgnore,
        }
    }

    fn csi_param(&mut self, byte: u8, performer: &mut dyn Perform) {
        match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => performer.execute(byte),
            c0::CAN | c0::SUB => self.state = State::Ground,
            c0::ESC => {
                self.sequence.clear();
                self.state = State::Escape;
            }
            c0::DEL => {}
            0x30..=0x39 => self.sequence.params_mut().digit(byte),
            b';' => self.sequence.params_mut().separator(),
            b':' => self.sequence.params_mut().sub_separator(),
            // Leader bytes are invalid once parameters started
            0x3C..=0x3F => {
                log::trace!("misplaced CSI leader byte {:#04x}", byte);
                self.state = State::CsiIgnore;
            }
            0x20..=0x2F => {
                self.sequence.collect(byte);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7E => {
                self.dispatch_csi(byte, performer);
                self.state = State::Ground;
            }
            _ => {
                log::trace!("malformed CSI byte {:#04x}", byte);
                self.state = State::CsiIgnore;
            }
        }
    }

    fn csi_intermediate(&mut self, byte: u8, performer: &mut dyn Perform) {
        match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => performer.execute(byte),
            c0::CAN | c0::SUB => self.state = State::Ground,
            c0::ESC => {
                self.sequence.clear();
                self.state = State::Escape;
            }
            c0::DEL => {}
            0x20..=0x2F => self.sequence.collect(byte),
            0x30..=0x3F => self.state = State::CsiIgnore,
            0x40..=0x7E => {
                self.dispatch_csi(byte, performer);
                self.state = State::Ground;
            }
            _ => self.state = State::CsiIgnore,
        }
    }

    fn csi_ignore(&mut self, byte: u8, performer: &mut dyn Perform) {
        match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => performer.execute(byte),
            c0::CAN | c0::SUB => self.state = State::Ground,
            c0::ESC => {
                self.sequence.clear();
                self.state = State::Escape;
            }
            0x40..=0x7E => self.state = State::Ground,
            _ => {}
        }
    }

    fn osc_string(&mut self, byte: u8, performer: &mut dyn Perform) {
        if self.st_pending {
            self.st_pending = false;
            if byte == b'\\' {
                self.dispatch_osc(performer);
                self.state = State::Ground;
            } else {
                // A new ESC sequence interrupts the string: terminate it,
                // keep staged parameters valid across the dispatch, and
                // reprocess the byte on the escape path.
                self.dispatch_osc(performer);
                self.sequence.clear_except_parameters();
                self.state = State::Escape;
                self.escape(byte, performer);
            }
            return;
        }
        match byte {
            c0::BEL => {
                self.dispatch_osc(performer);
                self.state = State::Ground;
            }
            c0::ESC => self.st_pending = true,
            c0::CAN | c0::SUB => self.state = State::Ground,
            // Other C0 controls and DEL are dropped inside OSC strings
            0x00..=0x06 | 0x08..=0x17 | 0x19 | 0x1C..=0x1F | c0::DEL => {}
            _ => self.sequence.put_osc(byte),
        }
    }

    fn dcs_entry(&mut self, byte: u8, performer: &mut dyn Perform) {
        match byte {
            c0::CAN | c0::SUB => self.state = State::Ground,
            c0::ESC => {
                self.sequence.clear();
                self.state = State::Escape;
            }
            c0::DEL => {}
            0x3C..=0x3F => {
                self.sequence.collect_leader(byte);
                self.state = State::DcsParam;
            }
            0x30..=0x39 => {
                self.sequence.params_mut().digit(byte);
                self.state = State::DcsParam;
            }
            b';' => {
                self.sequence.params_mut().separator();
                self.state = State::DcsParam;
            }
            b':' => {
                self.sequence.params_mut().sub_separator();
                self.state = State::DcsParam;
            }
            0x20..=0x2F => {
                self.sequence.collect(byte);
                self.state = State::DcsIntermediate;
            }
            0x40..=0x7E => {
                self.hook(byte, performer);
                self.state = State::DcsPassthrough;
            }
            _ => {}
        }
    }

    fn dcs_param(&mut self, byte: u8, performer: &mut dyn Perform) {
        match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => {}
            c0::CAN | c0::SUB => self.state = State::Ground,
            c0::ESC => {
                self.sequence.clear();
                self.state = State::Escape;
            }
            c0::DEL => {}
            0x30..=0x39 => self.sequence.params_mut().digit(byte),
            b';' => self.sequence.params_mut().separator(),
            b':' => self.sequence.params_mut().sub_separator(),
            0x3C..=0x3F => self.state = State::DcsIgnore,
            0x20..=0x2F => {
                self.sequence.collect(byte);
                self.state = State::DcsIntermediate;
            }
            0x40..=0x7E => {
                self.hook(byte, performer);
                self.state = State::DcsPassthrough;
            }
            _ => self.state = State::DcsIgnore,
        }
    }

    fn dcs_intermediate(&mut self, byte: u8, performer: &mut dyn Perform) {
        match byte {
            0x00..=0x17 | 0x19 | 0x1C..=0x1F => {}
            c0::CAN | c0::SUB => self.state = State::Ground,
            c0::ESC => {
                self.sequence.clear();
                self.state = State::Escape;
            }
            c0::DEL => {}
            0x20..=0x2F => self.sequence.collect(byte),
            0x30..=0x3F => self.state = State::DcsIgnore,
            0x40..=0x7E => {
                self.hook(byte, performer);
                self.state = State::DcsPassthrough;
            }
            _ => self.state = State::DcsIgnore,
        }
    }

    fn dcs_passthrough(&mut self, byte: u8, performer: &mut dyn Perform) {
        if self.st_pending {
            self.st_pending = false;
            if byte == b'\\' {
                performer.unhook();
                self.state = State::Ground;
            } else {
                performer.unhook();
                self.sequence.clear();
                self.state = State::Escape;
                self.escape(byte, performer);
            }
            return;
        }
        match byte {
            c0::ESC => self.st_pending = true,
            c0::CAN | c0::SUB => {
                performer.unhook();
                self.state = State::Ground;
            }
            c0::DEL => {}
            _ => performer.put(byte),
        }
    }

    fn dcs_ignore(&mut self, byte: u8, _performer: &mut dyn Perform) {
        if self.st_pending {
            self.st_pending = false;
            if byte == b'\\' {
                self.state = State::Ground;
            } else {
                self.sequence.clear();
                self.state = State::Escape;
                self.escape(byte, _performer);
            }
            return;
        }
        match byte {
            c0::ESC => self.st_pending = true,
            c0::CAN | c0::SUB => self.state = State::Ground,
            _ => {}
        }
    }

    fn sos_pm_apc_string(&mut self, byte: u8, performer: &mut dyn Perform) {
        if self.st_pending {
            self.st_pending = false;
            if byte == b'\\' {
                self.state = State::Ground;
            } else {
                self.sequence.clear();
                self.state = State::Escape;
                self.escape(byte, performer);
            }
            return;
        }
        match byte {
            c0::ESC => self.st_pending = true,
            c0::CAN | c0::SUB => self.state = State::Ground,
            _ => {}
        }
    }

    fn dispatch_esc(&mut self, final_byte: u8, performer: &mut dyn Perform) {
        self.sequence.set_kind(SequenceKind::Esc);
        self.sequence.set_final(final_byte);
        self.sequence.fixate();
        performer.esc_dispatch(&self.sequence);
    }

    fn dispatch_csi(&mut self, final_byte: u8, performer: &mut dyn Perform) {
        self.sequence.set_final(final_byte);
        self.sequence.fixate();
        performer.csi_dispatch(&self.sequence);
    }

    fn dispatch_osc(&mut self, performer: &mut dyn Perform) {
        self.sequence.fixate();
        performer.osc_dispatch(&self.sequence);
    }

    fn hook(&mut self, final_byte: u8, performer: &mut dyn Perform) {
        self.sequence.set_final(final_byte);
        self.sequence.fixate();
        performer.hook(&self.sequence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Print(char),
        Execute(u8),
        Esc {
            intermediates: Vec<u8>,
            final_byte: u8,
        },
        Csi {
            leader: Option<u8>,
            params: Vec<u16>,
            intermediates: Vec<u8>,
            final_byte: u8,
        },
        Osc {
            code: u16,
            payload: Vec<u8>,
        },
        Hook {
            params: Vec<u16>,
            intermediates: Vec<u8>,
            final_byte: u8,
        },
        Put(u8),
        Unhook,
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl Perform for Recorder {
        fn print(&mut self, c: char) {
            self.events.push(Event::Print(c));
        }

        fn execute(&mut self, byte: u8) {
            self.events.push(Event::Execute(byte));
        }

        fn esc_dispatch(&mut self, seq: &Sequence) {
            self.events.push(Event::Esc {
                intermediates: seq.intermediates().to_vec(),
                final_byte: seq.final_byte(),
            });
        }

        fn csi_dispatch(&mut self, seq: &Sequence) {
            self.events.push(Event::Csi {
                leader: seq.leader(),
                params: seq.params().iter().collect(),
                intermediates: seq.intermediates().to_vec(),
                final_byte: seq.final_byte(),
            });
        }

        fn osc_dispatch(&mut self, seq: &Sequence) {
            self.events.push(Event::Osc {
                code: seq.params().get_or(0, 0),
                payload: seq.osc_payload().to_vec(),
            });
        }

        fn hook(&mut self, seq: &Sequence) {
            self.events.push(Event::Hook {
                params: seq.params().iter().collect(),
                intermediates: seq.intermediates().to_vec(),
                final_byte: seq.final_byte(),
            });
        }

        fn put(&mut self, byte: u8) {
            self.events.push(Event::Put(byte));
        }

        fn unhook(&mut self) {
            self.events.push(Event::Unhook);
        }
    }

    fn run(bytes: &[u8]) -> Vec<Event> {
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        parser.feed(bytes, &mut recorder);
        recorder.events
    }

    #[test]
    fn test_print_ascii() {
        let events = run(b"Hello");
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], Event::Print('H'));
        assert_eq!(events[4], Event::Print('o'));
    }

    #[test]
    fn test_print_utf8() {
        let events = run("Hi 世界".as_bytes());
        assert!(events.contains(&Event::Print('世')));
        assert!(events.contains(&Event::Print('界')));
    }

    #[test]
    fn test_c0_controls() {
        let events = run(b"\x07\x08\x09\x0A\x0D");
        assert_eq!(events[0], Event::Execute(c0::BEL));
        assert_eq!(events[1], Event::Execute(c0::BS));
        assert_eq!(events[2], Event::Execute(c0::HT));
        assert_eq!(events[3], Event::Execute(c0::LF));
        assert_eq!(events[4], Event::Execute(c0::CR));
    }

    #[test]
    fn test_csi_cursor_up() {
        let events = run(b"\x1b[5A");
        assert_eq!(
            events,
            vec![Event::Csi {
                leader: None,
                params: vec![5],
                intermediates: vec![],
                final_byte: b'A',
            }]
        );
    }

    #[test]
    fn test_csi_sgr_round_trip() {
        // ESC [ 3 1 ; 4 2 m must dispatch exactly one CSI event.
        let events = run(b"\x1b[31;42m");
        assert_eq!(
            events,
            vec![Event::Csi {
                leader: None,
                params: vec![31, 42],
                intermediates: vec![],
                final_byte: b'm',
            }]
        );
    }

    #[test]
    fn test_csi_leader() {
        let events = run(b"\x1b[?25h");
        assert_eq!(
            events,
            vec![Event::Csi {
                leader: Some(b'?'),
                params: vec![25],
                intermediates: vec![],
                final_byte: b'h',
            }]
        );
    }

    #[test]
    fn test_csi_subparams() {
        let mut parser = Parser::new();
        struct Subs(Vec<u16>, Vec<u16>);
        impl Perform for Subs {
            fn csi_dispatch(&mut self, seq: &Sequence) {
                self.0 = seq.params().iter().collect();
                self.1 = seq.params().subparams(1).to_vec();
            }
        }
        let mut subs = Subs(vec![], vec![]);
        parser.feed(b"\x1b[1;23:4m", &mut subs);
        assert_eq!(subs.0, vec![1, 23]);
        assert_eq!(subs.1, vec![4]);
    }

    #[test]
    fn test_csi_no_params() {
        let events = run(b"\x1b[H");
        assert_eq!(
            events,
            vec![Event::Csi {
                leader: None,
                params: vec![],
                intermediates: vec![],
                final_byte: b'H',
            }]
        );
    }

    #[test]
    fn test_csi_param_clamped() {
        let events = run(b"\x1b[4294967295A");
        assert_eq!(
            events,
            vec![Event::Csi {
                leader: None,
                params: vec![u16::MAX],
                intermediates: vec![],
                final_byte: b'A',
            }]
        );
    }

    #[test]
    fn test_csi_intermediate() {
        let events = run(b"\x1b[2 q");
        assert_eq!(
            events,
            vec![Event::Csi {
                leader: None,
                params: vec![2],
                intermediates: vec![b' '],
                final_byte: b'q',
            }]
        );
    }

    #[test]
    fn test_csi_ignore_malformed() {
        // Leader after parameters is invalid; the sequence is consumed
        // to its final byte and dropped.
        let events = run(b"\x1b[1?mA");
        assert_eq!(events, vec![Event::Print('A')]);
    }

    #[test]
    fn test_esc_save_cursor() {
        let events = run(b"\x1b7");
        assert_eq!(
            events,
            vec![Event::Esc {
                intermediates: vec![],
                final_byte: b'7',
            }]
        );
    }

    #[test]
    fn test_esc_with_intermediate() {
        let events = run(b"\x1b#8");
        assert_eq!(
            events,
            vec![Event::Esc {
                intermediates: vec![b'#'],
                final_byte: b'8',
            }]
        );
    }

    #[test]
    fn test_osc_title_bel() {
        let events = run(b"\x1b]0;hello\x07");
        assert_eq!(
            events,
            vec![Event::Osc {
                code: 0,
                payload: b"hello".to_vec(),
            }]
        );
    }

    #[test]
    fn test_osc_title_st() {
        let events = run(b"\x1b]2;Title\x1b\\");
        assert_eq!(
            events,
            vec![Event::Osc {
                code: 2,
                payload: b"Title".to_vec(),
            }]
        );
    }

    #[test]
    fn test_osc_unterminated_keeps_state() {
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        parser.feed(b"\x1b]0;hel", &mut recorder);
        assert!(recorder.events.is_empty());
        assert!(!parser.in_ground_state());

        // The partial payload is retained across the chunk boundary.
        parser.feed(b"lo\x07", &mut recorder);
        assert_eq!(
            recorder.events,
            vec![Event::Osc {
                code: 0,
                payload: b"hello".to_vec(),
            }]
        );
        assert!(parser.in_ground_state());
    }

    #[test]
    fn test_osc_interrupted_by_new_sequence() {
        // ESC [ interrupts the OSC: the string dispatches, then the CSI
        // parses cleanly with no parameter leakage.
        let events = run(b"\x1b]0;a\x1b[3m");
        assert_eq!(
            events,
            vec![
                Event::Osc {
                    code: 0,
                    payload: b"a".to_vec(),
                },
                Event::Csi {
                    leader: None,
                    params: vec![3],
                    intermediates: vec![],
                    final_byte: b'm',
                },
            ]
        );
    }

    #[test]
    fn test_dcs_hook_put_unhook() {
        let events = run(b"\x1bP1$qm\x1b\\");
        assert_eq!(
            events,
            vec![
                Event::Hook {
                    params: vec![1],
                    intermediates: vec![b'$'],
                    final_byte: b'q',
                },
                Event::Put(b'm'),
                Event::Unhook,
            ]
        );
    }

    #[test]
    fn test_dcs_cancelled() {
        let events = run(b"\x1bPq data\x18A");
        assert_eq!(events.last(), Some(&Event::Print('A')));
        assert!(events.contains(&Event::Unhook));
    }

    #[test]
    fn test_sos_pm_apc_consumed() {
        let events = run(b"\x1b_payload bytes\x1b\\A");
        assert_eq!(events, vec![Event::Print('A')]);
    }

    #[test]
    fn test_bare_st_no_event() {
        let events = run(b"\x1b\\A");
        assert_eq!(events, vec![Event::Print('A')]);
    }

    #[test]
    fn test_chunk_boundary_csi() {
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        parser.feed(b"\x1b[", &mut recorder);
        assert!(recorder.events.is_empty());
        parser.feed(b"5A", &mut recorder);
        assert_eq!(
            recorder.events,
            vec![Event::Csi {
                leader: None,
                params: vec![5],
                intermediates: vec![],
                final_byte: b'A',
            }]
        );
    }

    #[test]
    fn test_utf8_chunk_boundary() {
        // '世' is E4 B8 96; split across two feeds, exactly one print.
        let mut parser = Parser::new();
        let mut recorder = Recorder::default();
        parser.feed(&[0xE4], &mut recorder);
        assert!(recorder.events.is_empty());
        parser.feed(&[0xB8, 0x96], &mut recorder);
        assert_eq!(recorder.events, vec![Event::Print('世')]);
    }

    #[test]
    fn test_invalid_utf8_replacement() {
        let events = run(&[0xFF, 0xFE]);
        assert_eq!(
            events,
            vec![Event::Print('\u{FFFD}'), Event::Print('\u{FFFD}')]
        );
    }

    #[test]
    fn test_overlong_utf8_rejected() {
        // 0xC0 0xAF is an overlong encoding of '/'.
        let events = run(&[0xC0, 0xAF]);
        assert!(!events.contains(&Event::Print('/')));
        assert!(events.contains(&Event::Print('\u{FFFD}')));
    }

    #[test]
    fn test_truncated_utf8_then_escape() {
        let events = run(&[0xE4, 0x1B, b'7']);
        assert_eq!(
            events,
            vec![
                Event::Print('\u{FFFD}'),
                Event::Esc {
                    intermediates: vec![],
                    final_byte: b'7',
                },
            ]
        );
    }

    #[test]
    fn test_can_aborts_sequence() {
        let events = run(b"\x1b[5\x18A");
        assert_eq!(events, vec![Event::Print('A')]);
    }

    #[test]
    fn test_sub_aborts_osc() {
        let events = run(b"\x1b]0;title\x1aA");
        assert_eq!(events, vec![Event::Print('A')]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn never_panics_and_recovers(data: Vec<u8>) {
                let mut parser = Parser::new();
                let mut recorder = Recorder::default();
                parser.feed(&data, &mut recorder);

                // CAN aborts whatever is in flight from any state.
                parser.feed(&[c0::CAN], &mut recorder);
                prop_assert!(parser.in_ground_state());

                // And the parser keeps working afterwards.
                recorder.events.clear();
                parser.feed(b"ok", &mut recorder);
                prop_assert_eq!(
                    recorder.events.last(),
                    Some(&Event::Print('k'))
                );
            }

            #[test]
            fn chunking_is_transparent(data: Vec<u8>, split in 0usize..64) {
                let whole = {
                    let mut parser = Parser::new();
                    let mut recorder = Recorder::default();
                    parser.feed(&data, &mut recorder);
                    recorder.events
                };
                let split = split.min(data.len());
                let chunked = {
                    let mut parser = Parser::new();
                    let mut recorder = Recorder::default();
                    parser.feed(&data[..split], &mut recorder);
                    parser.feed(&data[split..], &mut recorder);
                    recorder.events
                };
                prop_assert_eq!(whole, chunked);
            }
        }
    }
}
