//! Keyboard encoding
//!
//! Translates key events from the embedding GUI into the byte
//! sequences a VT100 expects on the PTY input side. A thin lookup
//! table; anything not recognized passes through as plain characters.

use bitflags::bitflags;

bitflags! {
    /// Modifier state accompanying a key event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        /// Shift
        const SHIFT = 1 << 0;
        /// Control
        const CTRL = 1 << 1;
        /// Alt
        const ALT = 1 << 2;
    }
}

/// A key event delivered by the embedding GUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A character key, identified by its unshifted character
    Char(char),
    /// Enter / Return
    Enter,
    /// Backspace
    Backspace,
    /// Tab
    Tab,
    /// Escape
    Escape,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Right arrow
    Right,
    /// Left arrow
    Left,
}

/// Encode a key press into the bytes to write to the PTY.
pub fn encode(key: &Key, mods: Modifiers) -> Vec<u8> {
    if mods.contains(Modifiers::CTRL) {
        if let Key::Char(c) = key {
            let upper = c.to_ascii_uppercase();
            if ('@'..='_').contains(&upper) {
                return vec![upper as u8 - 0x40];
            }
        }
    }
    match key {
        Key::Enter => b"\r".to_vec(),
        Key::Backspace => vec![0x7f],
        Key::Tab => vec![0x09],
        Key::Escape => vec![0x1b],
        Key::Up => b"\x1b[A".to_vec(),
        Key::Down => b"\x1b[B".to_vec(),
        Key::Right => b"\x1b[C".to_vec(),
        Key::Left => b"\x1b[D".to_vec(),
        Key::Char(c) => {
            let c = if mods.contains(Modifiers::SHIFT) {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            c.to_string().into_bytes()
        }
    }
}
