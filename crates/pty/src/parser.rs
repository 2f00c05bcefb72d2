//! Control-sequence parser
//!
//! A byte-driven state machine over the DEC/ANSI transition diagram
//! (<https://www.vt100.net/emu/dec_ansi_parser>): segments the raw PTY
//! byte stream into printable runes, control executions and structured
//! ESC/CSI/OSC sequences. Parser state persists between `parse` calls,
//! so a sequence split across reads is handled identically to a single
//! contiguous buffer.

use tracing::debug;

/// A structured operation decoded from the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Printable rune to place at the cursor
    Print(char),
    /// C0 (or C1-equivalent) control byte to execute
    Execute(u8),
    /// ESC sequence: final byte plus collected intermediates
    Esc {
        /// Final byte of the sequence
        final_byte: char,
        /// Intermediate bytes (`0x20..=0x2F`) collected on the way
        intermediates: String,
    },
    /// CSI sequence: final byte, intermediates (including any private
    /// marker) and the decoded parameter list
    Csi {
        /// Final byte of the sequence
        final_byte: char,
        /// Intermediate and private-marker bytes
        intermediates: String,
        /// Decoded numeric parameters, in order
        params: Vec<u16>,
    },
    /// OSC payload: the printable bytes between the introducer and
    /// ST/BEL
    Osc {
        /// Payload string
        payload: String,
    },
}

/// Returns the parameter at `i` when it is present and non-zero,
/// `default` otherwise. Zero counts as omitted, mirroring the VT
/// convention for CSI default values.
pub fn param(params: &[u16], i: usize, default: u16) -> u16 {
    match params.get(i) {
        Some(0) | None => default,
        Some(&value) => value,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Ground,
    Escape,
    EscapeIntermediate,
    CsiEntry,
    CsiParam,
    CsiIntermediate,
    CsiIgnore,
    OscString,
}

/// The restartable parser state machine.
#[derive(Debug, Default)]
pub struct Parser {
    state: State,
    intermediates: Vec<u8>,
    params_raw: Vec<u8>,
    osc: Vec<u8>,
}

impl Parser {
    /// Create a parser in the ground state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk of bytes, producing the operations recognized so
    /// far. Incomplete trailing sequences stay buffered for the next
    /// call. Malformed input never errors: every byte is emitted,
    /// collected or dropped.
    pub fn parse(&mut self, bytes: &[u8]) -> Vec<Operation> {
        let mut out = Vec::new();
        for &b in bytes {
            self.advance(b, &mut out);
        }
        out
    }

    fn advance(&mut self, b: u8, out: &mut Vec<Operation>) {
        // Transitions that apply from any state.
        match b {
            0x1b => {
                self.clear();
                self.state = State::Escape;
                return;
            }
            0x18 | 0x1a | 0x80..=0x8f | 0x91..=0x97 | 0x99 | 0x9a => {
                self.state = State::Ground;
                out.push(Operation::Execute(b));
                return;
            }
            0x9d => {
                self.osc.clear();
                self.state = State::OscString;
                return;
            }
            _ => {}
        }

        match self.state {
            State::Ground => self.ground(b, out),
            State::Escape => self.escape(b, out),
            State::EscapeIntermediate => self.escape_intermediate(b, out),
            State::CsiEntry => self.csi_entry(b, out),
            State::CsiParam => self.csi_param(b, out),
            State::CsiIntermediate => self.csi_intermediate(b, out),
            State::CsiIgnore => self.csi_ignore(b, out),
            State::OscString => self.osc_string(b, out),
        }
    }

    fn ground(&mut self, b: u8, out: &mut Vec<Operation>) {
        match b {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => out.push(Operation::Execute(b)),
            0x20..=0x7f => out.push(Operation::Print(b as char)),
            _ => {}
        }
    }

    fn escape(&mut self, b: u8, out: &mut Vec<Operation>) {
        match b {
            // C0 controls execute without aborting the sequence.
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => out.push(Operation::Execute(b)),
            0x20..=0x2f => {
                self.intermediates.push(b);
                self.state = State::EscapeIntermediate;
            }
            0x5b => {
                self.clear();
                self.state = State::CsiEntry;
            }
            0x5d => {
                self.osc.clear();
                self.state = State::OscString;
            }
            0x30..=0x4f | 0x51..=0x57 | 0x59 | 0x5a | 0x5c | 0x60..=0x7e => {
                let op = self.esc_dispatch(b);
                out.push(op);
                self.state = State::Ground;
            }
            // DCS/SOS/PM/APC introducers and DEL are not supported.
            _ => {}
        }
    }

    fn escape_intermediate(&mut self, b: u8, out: &mut Vec<Operation>) {
        match b {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => out.push(Operation::Execute(b)),
            0x20..=0x2f => self.intermediates.push(b),
            0x30..=0x7e => {
                let op = self.esc_dispatch(b);
                out.push(op);
                self.state = State::Ground;
            }
            _ => {}
        }
    }

    fn csi_entry(&mut self, b: u8, out: &mut Vec<Operation>) {
        match b {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => out.push(Operation::Execute(b)),
            0x30..=0x39 | 0x3b => {
                self.params_raw.push(b);
                self.state = State::CsiParam;
            }
            0x3a => self.state = State::CsiIgnore,
            // A private marker joins the intermediates.
            0x3c..=0x3f => {
                self.intermediates.push(b);
                self.state = State::CsiParam;
            }
            0x40..=0x7e => {
                let op = self.csi_dispatch(b);
                out.push(op);
                self.state = State::Ground;
            }
            _ => {}
        }
    }

    fn csi_param(&mut self, b: u8, out: &mut Vec<Operation>) {
        match b {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => out.push(Operation::Execute(b)),
            0x30..=0x39 | 0x3b => self.params_raw.push(b),
            0x3a | 0x3c..=0x3f => self.state = State::CsiIgnore,
            0x20..=0x2f => {
                self.intermediates.push(b);
                self.state = State::CsiIntermediate;
            }
            0x40..=0x7e => {
                let op = self.csi_dispatch(b);
                out.push(op);
                self.state = State::Ground;
            }
            _ => {}
        }
    }

    fn csi_intermediate(&mut self, b: u8, out: &mut Vec<Operation>) {
        match b {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => out.push(Operation::Execute(b)),
            0x20..=0x2f => self.intermediates.push(b),
            0x30..=0x3f => self.state = State::CsiIgnore,
            0x40..=0x7e => {
                let op = self.csi_dispatch(b);
                out.push(op);
                self.state = State::Ground;
            }
            _ => {}
        }
    }

    fn csi_ignore(&mut self, b: u8, out: &mut Vec<Operation>) {
        match b {
            0x00..=0x17 | 0x19 | 0x1c..=0x1f => out.push(Operation::Execute(b)),
            0x40..=0x7e => self.state = State::Ground,
            _ => {}
        }
    }

    fn osc_string(&mut self, b: u8, out: &mut Vec<Operation>) {
        match b {
            // BEL is the xterm variant of the string terminator.
            0x07 | 0x9c => {
                let op = self.osc_dispatch();
                out.push(op);
                self.state = State::Ground;
            }
            0x20..=0x7f => self.osc.push(b),
            _ => {}
        }
    }

    fn clear(&mut self) {
        self.intermediates.clear();
        self.params_raw.clear();
    }

    fn esc_dispatch(&mut self, b: u8) -> Operation {
        Operation::Esc {
            final_byte: b as char,
            intermediates: String::from_utf8_lossy(&self.intermediates).into_owned(),
        }
    }

    fn csi_dispatch(&mut self, b: u8) -> Operation {
        Operation::Csi {
            final_byte: b as char,
            intermediates: String::from_utf8_lossy(&self.intermediates).into_owned(),
            params: self.parse_params(),
        }
    }

    fn osc_dispatch(&mut self) -> Operation {
        Operation::Osc {
            payload: String::from_utf8_lossy(&self.osc).into_owned(),
        }
    }

    /// Split the raw parameter field on `;`. Empty tokens decode as 0;
    /// tokens that fail to parse are dropped, preserving the rest.
    fn parse_params(&self) -> Vec<u16> {
        if self.params_raw.is_empty() {
            return Vec::new();
        }
        let raw = String::from_utf8_lossy(&self.params_raw);
        let mut params = Vec::new();
        for token in raw.split(';') {
            if token.is_empty() {
                params.push(0);
                continue;
            }
            match token.parse::<u16>() {
                Ok(value) => params.push(value),
                Err(_) => {
                    debug!(
                        subsystem = "parser",
                        token, "dropping unparsable CSI parameter"
                    );
                }
            }
        }
        params
    }
}
