// SPDX-License-Identifier: MIT
//
// Terminal key parser.
//
// Turns raw stdin bytes into key events. Covers what a plain xterm-style
// terminal sends without any extended protocol enabled:
//
// - Legacy CSI sequences (arrows, editing keys, function keys, modifiers)
// - SS3 sequences (arrows and F1–F4 in application cursor mode)
// - Alt+key (ESC followed by a key)
// - Control characters (Ctrl+letter)
// - UTF-8 multi-byte characters
//
// Escape sequences can span `read()` calls, so the parser keeps the
// unconsumed tail in a small buffer. When no more bytes arrive within the
// driver's escape timeout, [`Parser::flush`] turns whatever is pending
// (typically a lone ESC) into real key presses.

use bitflags::bitflags;

// ─── Key Types ──────────────────────────────────────────────────────────────

/// One key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[inline]
    #[must_use]
    pub const fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key with no modifiers.
    #[inline]
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// `Ctrl` + a lowercase letter.
    #[inline]
    #[must_use]
    pub const fn ctrl(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::CTRL)
    }

    /// `Alt` + a key.
    #[inline]
    #[must_use]
    pub const fn alt(code: KeyCode) -> Self {
        Self::new(code, Modifiers::ALT)
    }
}

impl From<char> for KeyEvent {
    fn from(ch: char) -> Self {
        Self::plain(KeyCode::Char(ch))
    }
}

impl From<KeyCode> for KeyEvent {
    fn from(code: KeyCode) -> Self {
        Self::plain(code)
    }
}

/// Which key was pressed.
///
/// Control characters arrive as `Char` of the matching lowercase letter with
/// [`Modifiers::CTRL`] set: Ctrl-A is `Char('a')` + CTRL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    BackTab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental byte-to-key parser.
///
/// ```
/// use ted_term::input::{KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// let keys = parser.advance(b"a\x1b[A");
/// assert_eq!(keys, vec![KeyEvent::from('a'), KeyEvent::from(KeyCode::Up)]);
/// ```
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(32),
        }
    }

    /// Feed bytes, returning every complete key they finish.
    pub fn advance(&mut self, data: &[u8]) -> Vec<KeyEvent> {
        self.buf.extend_from_slice(data);
        let mut keys = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Key(key, consumed) => {
                    keys.push(key);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        self.buf.drain(..pos);
        keys
    }

    /// Whether bytes are waiting for the rest of a sequence.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes as individual keys.
    ///
    /// Called after the escape timeout: a lone ESC becomes the Escape key,
    /// ESC plus one printable byte is that byte with Alt (so Alt-O is not
    /// lost to the SS3 prefix), and anything else becomes ordinary presses.
    pub fn flush(&mut self) -> Vec<KeyEvent> {
        let mut keys = Vec::new();
        let mut bytes = self.buf.iter().copied().peekable();
        while let Some(byte) = bytes.next() {
            if byte == 0x1B {
                if let Some(next) = bytes.next_if(|b| (0x20..=0x7E).contains(b)) {
                    keys.push(KeyEvent::alt(KeyCode::Char(char::from(next))));
                    continue;
                }
            }
            keys.extend(flushed_byte(byte));
        }
        self.buf.clear();
        keys
    }
}

fn flushed_byte(byte: u8) -> Option<KeyEvent> {
    match byte {
        0x1B => Some(KeyEvent::plain(KeyCode::Escape)),
        0x7F => Some(KeyEvent::plain(KeyCode::Backspace)),
        b @ 0x01..=0x1A => Some(KeyEvent::ctrl(char::from(b + b'a' - 1))),
        b @ 0x20..=0x7E => Some(KeyEvent::from(char::from(b))),
        _ => None,
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Stateless Parsing ──────────────────────────────────────────────────────

enum Parsed {
    /// A key, consuming `usize` bytes.
    Key(KeyEvent, usize),
    /// Need more bytes.
    Incomplete,
    /// Unrecognized, skip `usize` bytes.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };

    match first {
        0x1B => parse_escape(buf),
        b => match control_key(b) {
            Some(key) => Parsed::Key(key, 1),
            None if b >= 0xC0 => parse_utf8(buf),
            None => Parsed::Skip(1),
        },
    }
}

/// Single-byte keys: control characters and printable ASCII.
fn control_key(b: u8) -> Option<KeyEvent> {
    Some(match b {
        0x00 => KeyEvent::ctrl(' '),
        0x08 | 0x7F => KeyEvent::plain(KeyCode::Backspace),
        0x09 => KeyEvent::plain(KeyCode::Tab),
        0x0A | 0x0D => KeyEvent::plain(KeyCode::Enter),
        b @ 0x01..=0x1A => KeyEvent::ctrl(char::from(b + b'a' - 1)),
        b @ 0x20..=0x7E => KeyEvent::from(char::from(b)),
        _ => return None,
    })
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&second) = buf.get(1) else {
        return Parsed::Incomplete;
    };

    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Key(KeyEvent::alt(KeyCode::Escape), 2),
        b => match control_key(b) {
            Some(key) => Parsed::Key(
                KeyEvent::new(key.code, key.modifiers | Modifiers::ALT),
                2,
            ),
            None => Parsed::Key(KeyEvent::plain(KeyCode::Escape), 1),
        },
    }
}

// ── CSI ─────────────────────────────────────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter bytes are 0x30..=0x3F, intermediates 0x20..=0x2F, and the
    // final byte is 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    let final_byte = buf[end];
    let params = parse_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params.get(1).copied().map_or(Modifiers::empty(), decode_modifiers);

    let code = if final_byte == b'~' {
        match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            n @ 11..=15 => KeyCode::F(function_number(n - 10)),
            n @ 17..=21 => KeyCode::F(function_number(n - 11)),
            n @ 23..=24 => KeyCode::F(function_number(n - 12)),
            _ => return Parsed::Skip(consumed),
        }
    } else {
        match final_byte {
            b'A' => KeyCode::Up,
            b'B' => KeyCode::Down,
            b'C' => KeyCode::Right,
            b'D' => KeyCode::Left,
            b'H' => KeyCode::Home,
            b'F' => KeyCode::End,
            b'P' => KeyCode::F(1),
            b'Q' => KeyCode::F(2),
            b'R' => KeyCode::F(3),
            b'S' => KeyCode::F(4),
            b'Z' => KeyCode::BackTab,
            _ => return Parsed::Skip(consumed),
        }
    };

    Parsed::Key(KeyEvent::new(code, modifiers), consumed)
}

// ── SS3 ─────────────────────────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };

    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };

    Parsed::Key(KeyEvent::plain(code), 3)
}

// ── UTF-8 ───────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };
    if buf.len() < expected {
        return Parsed::Incomplete;
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| Parsed::Key(KeyEvent::from(ch), expected))
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Semicolon-separated decimal parameters; empty fields read as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &d| acc.saturating_mul(10).saturating_add(u16::from(d - b'0')))
        })
        .collect()
}

/// xterm modifier parameter: value - 1 is a bitmask of shift/alt/ctrl.
fn decode_modifiers(param: u16) -> Modifiers {
    let bits = param.saturating_sub(1);
    let mut m = Modifiers::empty();
    if bits & 1 != 0 {
        m |= Modifiers::SHIFT;
    }
    if bits & 2 != 0 {
        m |= Modifiers::ALT;
    }
    if bits & 4 != 0 {
        m |= Modifiers::CTRL;
    }
    m
}

fn function_number(n: u16) -> u8 {
    u8::try_from(n).unwrap_or(0)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
