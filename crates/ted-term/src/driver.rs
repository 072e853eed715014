// SPDX-License-Identifier: MIT
//
// Driver: the only way anything above this crate touches the screen.
//
// A driver is a cell surface plus an event source. Callers paint cells with
// `set_cell`, place the cursor, and call `sync` once per frame; between syncs
// nothing reaches the terminal. `wait_for_event` is the single blocking call
// the editor makes.
//
// Two implementations:
//
//   TermDriver      the real terminal: raw mode, diff rendering, poll-based
//                   key reading with an escape timeout, SIGWINCH for resize.
//   HeadlessDriver  an in-memory screen with a scripted event queue, for
//                   tests and anything else that wants to drive the editor
//                   without a TTY.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::Duration;

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::cell::{Cell, Style};
use crate::diff::DiffRenderer;
use crate::input::{KeyCode, KeyEvent, Parser};
use crate::terminal::{self, Terminal};

// ─── Event ──────────────────────────────────────────────────────────────────

/// Something the editor must react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// The screen is now `(width, height)` cells.
    Resize(u16, u16),
}

// ─── Driver Trait ───────────────────────────────────────────────────────────

/// A terminal-like cell surface and event source.
pub trait Driver {
    /// Take over the screen.
    ///
    /// # Errors
    ///
    /// Fails when the underlying device cannot be set up.
    fn init(&mut self) -> io::Result<()>;

    /// Give the screen back. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Fails when restoring the device fails.
    fn close(&mut self) -> io::Result<()>;

    /// Current `(width, height)` in cells.
    fn size(&self) -> (u16, u16);

    /// Paint one cell of the pending frame. Out-of-bounds writes are dropped.
    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style);

    /// Show the cursor at `(x, y)` after the next sync.
    fn set_cursor(&mut self, x: u16, y: u16);

    /// Hide the cursor after the next sync.
    fn hide_cursor(&mut self);

    /// Put the pending frame on screen and start a fresh one.
    ///
    /// # Errors
    ///
    /// Fails when writing to the device fails.
    fn sync(&mut self) -> io::Result<()>;

    /// Block until the next event.
    ///
    /// # Errors
    ///
    /// `UnexpectedEof` when input is exhausted; otherwise the device error.
    fn wait_for_event(&mut self) -> io::Result<Event>;
}

// ─── TermDriver ─────────────────────────────────────────────────────────────

/// How long a lone ESC waits for the rest of a sequence.
const ESCAPE_TIMEOUT: Duration = Duration::from_millis(25);

/// Fallback size when the terminal will not report one.
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// The real terminal.
pub struct TermDriver {
    terminal: Terminal,
    frame: FrameBuffer,
    renderer: DiffRenderer,
    parser: Parser,
    pending: VecDeque<KeyEvent>,
    cursor: Option<(u16, u16)>,
}

impl TermDriver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            terminal: Terminal::new(),
            frame: FrameBuffer::new(0, 0),
            renderer: DiffRenderer::new(),
            parser: Parser::new(),
            pending: VecDeque::new(),
            cursor: None,
        }
    }

    fn query_size() -> (u16, u16) {
        terminal::get_size().map_or(FALLBACK_SIZE, |s| (s.cols, s.rows))
    }

    fn apply_resize(&mut self) -> Event {
        let (w, h) = Self::query_size();
        self.frame.resize(w, h);
        self.renderer.force_redraw();
        tracing::debug!(width = w, height = h, "terminal resized");
        Event::Resize(w, h)
    }
}

impl Default for TermDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for TermDriver {
    fn init(&mut self) -> io::Result<()> {
        self.terminal.enter()?;
        let (w, h) = Self::query_size();
        self.frame.resize(w, h);
        self.renderer.force_redraw();
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.terminal.leave()
    }

    fn size(&self) -> (u16, u16) {
        (self.frame.width(), self.frame.height())
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) {
        self.frame.set(x, y, Cell::new(ch, style));
    }

    fn set_cursor(&mut self, x: u16, y: u16) {
        self.cursor = Some((x, y));
    }

    fn hide_cursor(&mut self) {
        self.cursor = None;
    }

    fn sync(&mut self) -> io::Result<()> {
        self.renderer.render(&self.frame)?;
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.renderer.flush_to(&mut lock)?;
        match self.cursor {
            Some((x, y)) => {
                ansi::cursor_to(&mut lock, x, y)?;
                ansi::cursor_show(&mut lock)?;
            }
            None => ansi::cursor_hide(&mut lock)?,
        }
        lock.flush()?;
        self.frame.clear();
        Ok(())
    }

    fn wait_for_event(&mut self) -> io::Result<Event> {
        let mut buf = [0u8; 1024];
        loop {
            if terminal::take_resize() {
                return Ok(self.apply_resize());
            }
            if let Some(key) = self.pending.pop_front() {
                return Ok(Event::Key(key));
            }

            let timeout = self.parser.has_pending().then_some(ESCAPE_TIMEOUT);
            if terminal::poll_stdin(timeout)? {
                let n = terminal::read_stdin(&mut buf)?;
                if n == 0 {
                    return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "terminal input closed"));
                }
                self.pending.extend(self.parser.advance(&buf[..n]));
            } else if timeout.is_some() && !terminal::take_resize() {
                self.pending.extend(self.parser.flush());
            } else if timeout.is_some() {
                // The resize interrupted the escape wait; report it and keep
                // the partial sequence.
                return Ok(self.apply_resize());
            }
        }
    }
}

// ─── HeadlessDriver ─────────────────────────────────────────────────────────

/// An in-memory screen fed from a queue of scripted events.
///
/// `screen()` is what the last `sync` put on "display". When the queue runs
/// dry `wait_for_event` reports `UnexpectedEof`, which ends an editor loop.
///
/// ```
/// use ted_term::driver::{Driver, Event, HeadlessDriver};
/// use ted_term::cell::Style;
///
/// let mut d = HeadlessDriver::new(10, 2);
/// d.set_cell(0, 0, 'h', Style::DEFAULT);
/// d.set_cell(1, 0, 'i', Style::DEFAULT);
/// d.sync().unwrap();
/// assert_eq!(d.row_text(0), "hi        ");
///
/// d.push_keys("q");
/// assert!(matches!(d.wait_for_event(), Ok(Event::Key(_))));
/// assert!(d.wait_for_event().is_err());
/// ```
pub struct HeadlessDriver {
    back: FrameBuffer,
    screen: FrameBuffer,
    events: VecDeque<Event>,
    pending_cursor: Option<(u16, u16)>,
    cursor: Option<(u16, u16)>,
    syncs: usize,
    active: bool,
}

impl HeadlessDriver {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            back: FrameBuffer::new(width, height),
            screen: FrameBuffer::new(width, height),
            events: VecDeque::new(),
            pending_cursor: None,
            cursor: None,
            syncs: 0,
            active: false,
        }
    }

    /// Queue one event.
    pub fn push_event(&mut self, event: Event) {
        self.events.push_back(event);
    }

    /// Queue a key press.
    pub fn push_key(&mut self, key: impl Into<KeyEvent>) {
        self.push_event(Event::Key(key.into()));
    }

    /// Queue each character of `text` as a key; `\n` becomes Enter.
    pub fn push_keys(&mut self, text: &str) {
        for ch in text.chars() {
            let key = if ch == '\n' {
                KeyEvent::plain(KeyCode::Enter)
            } else {
                KeyEvent::from(ch)
            };
            self.push_key(key);
        }
    }

    /// The frame shown by the last sync.
    #[must_use]
    pub const fn screen(&self) -> &FrameBuffer {
        &self.screen
    }

    /// Row `y` of the displayed frame as text.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.screen.row_text(y)
    }

    /// Cursor position after the last sync, `None` when hidden.
    #[must_use]
    pub const fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    /// Number of syncs so far.
    #[must_use]
    pub const fn sync_count(&self) -> usize {
        self.syncs
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl Driver for HeadlessDriver {
    fn init(&mut self) -> io::Result<()> {
        self.active = true;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.active = false;
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.back.width(), self.back.height())
    }

    fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) {
        self.back.set(x, y, Cell::new(ch, style));
    }

    fn set_cursor(&mut self, x: u16, y: u16) {
        self.pending_cursor = Some((x, y));
    }

    fn hide_cursor(&mut self) {
        self.pending_cursor = None;
    }

    fn sync(&mut self) -> io::Result<()> {
        self.screen.copy_from(&self.back);
        self.back.clear();
        self.cursor = self.pending_cursor;
        self.syncs += 1;
        Ok(())
    }

    fn wait_for_event(&mut self) -> io::Result<Event> {
        let event = self
            .events
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more scripted events"))?;
        if let Event::Resize(w, h) = event {
            self.back.resize(w, h);
        }
        Ok(event)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn headless_shows_nothing_until_sync() {
        let mut d = HeadlessDriver::new(3, 1);
        d.set_cell(0, 0, 'x', Style::DEFAULT);
        assert_eq!(d.row_text(0), "   ");
        d.sync().unwrap();
        assert_eq!(d.row_text(0), "x  ");
        assert_eq!(d.sync_count(), 1);
    }

    #[test]
    fn headless_frame_starts_blank_after_sync() {
        let mut d = HeadlessDriver::new(3, 1);
        d.set_cell(0, 0, 'x', Style::DEFAULT);
        d.sync().unwrap();
        d.sync().unwrap();
        assert_eq!(d.row_text(0), "   ");
    }

    #[test]
    fn headless_cursor_follows_sync() {
        let mut d = HeadlessDriver::new(5, 5);
        d.set_cursor(2, 3);
        assert_eq!(d.cursor(), None);
        d.sync().unwrap();
        assert_eq!(d.cursor(), Some((2, 3)));
        d.hide_cursor();
        d.sync().unwrap();
        assert_eq!(d.cursor(), None);
    }

    #[test]
    fn headless_events_drain_then_eof() {
        let mut d = HeadlessDriver::new(5, 5);
        d.push_keys("a\n");
        assert_eq!(d.wait_for_event().unwrap(), Event::Key(KeyEvent::from('a')));
        assert_eq!(
            d.wait_for_event().unwrap(),
            Event::Key(KeyEvent::plain(KeyCode::Enter))
        );
        let err = d.wait_for_event().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn headless_resize_event_changes_size() {
        let mut d = HeadlessDriver::new(5, 5);
        d.push_event(Event::Resize(9, 2));
        assert_eq!(d.wait_for_event().unwrap(), Event::Resize(9, 2));
        assert_eq!(d.size(), (9, 2));
        d.sync().unwrap();
        assert_eq!(d.screen().width(), 9);
    }

    #[test]
    fn term_driver_starts_without_frame() {
        let d = TermDriver::new();
        assert_eq!(d.size(), (0, 0));
    }
}
