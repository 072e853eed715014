// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. The diff renderer decides that; this
// module only knows the byte-level encoding.
//
// Positions are 0-indexed in our API and converted to the 1-indexed
// coordinates the terminal expects.

use std::io::{self, Write};

use crate::cell::{Attr, Color};

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` with CUP.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

/// Hide the cursor (DECTCEM reset).
#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25l")
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?25h")
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

/// Reset all SGR state (SGR 0). Callers tracking style must invalidate it.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Switch to the alternate screen buffer.
#[inline]
pub fn enter_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049h")
}

/// Return to the main screen buffer.
#[inline]
pub fn exit_alt_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[?1049l")
}

// ─── Colors ──────────────────────────────────────────────────────────────────

/// Set the foreground color: SGR 30–37, 90–97, or 39 for default.
pub fn fg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color.index() {
        None => w.write_all(b"\x1b[39m"),
        Some(idx) if idx < 8 => write!(w, "\x1b[{}m", 30 + u16::from(idx)),
        Some(idx) => write!(w, "\x1b[{}m", 82 + u16::from(idx)),
    }
}

/// Set the background color: SGR 40–47, 100–107, or 49 for default.
pub fn bg(w: &mut impl Write, color: Color) -> io::Result<()> {
    match color.index() {
        None => w.write_all(b"\x1b[49m"),
        Some(idx) if idx < 8 => write!(w, "\x1b[{}m", 40 + u16::from(idx)),
        Some(idx) => write!(w, "\x1b[{}m", 92 + u16::from(idx)),
    }
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

/// Emit SGR codes for `attr` as one CSI sequence. Nothing for an empty set.
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }

    let codes: Vec<&str> = [
        (Attr::BOLD, "1"),
        (Attr::DIM, "2"),
        (Attr::UNDERLINE, "4"),
        (Attr::REVERSE, "7"),
    ]
    .into_iter()
    .filter(|(flag, _)| attr.contains(*flag))
    .map(|(_, code)| code)
    .collect();

    write!(w, "\x1b[{}m", codes.join(";"))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
