// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Compares the frame just painted against the last one put on screen and
// emits escape sequences only for cells that changed. Unchanged rows are
// skipped with one slice comparison. Output accumulates in a byte buffer and
// leaves in a single write per frame.
//
// The `CellWriter` half remembers the terminal's cursor position and current
// style so that consecutive cells in the same style cost one byte each.

use std::io::{self, Write};

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::cell::{Cell, Style};

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// Stateful cell emitter that skips redundant cursor moves and SGR codes.
#[allow(clippy::struct_field_names)]
struct CellWriter {
    last_x: i32,
    last_y: i32,
    last_style: Option<Style>,
}

impl CellWriter {
    const fn new() -> Self {
        Self {
            last_x: -1,
            last_y: -1,
            last_style: None,
        }
    }

    fn render_cell(&mut self, out: &mut Vec<u8>, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        let xi = i32::from(x);
        let yi = i32::from(y);

        // The wide character at x-1 already covered this column.
        if cell.is_continuation() && self.last_y == yi && self.last_x == xi - 1 {
            self.last_x = xi;
            return Ok(());
        }

        if yi != self.last_y || xi != self.last_x + 1 {
            ansi::cursor_to(out, x, y)?;
        }

        if self.last_style != Some(cell.style) {
            // SGR 0 first: attributes can only be cleared by a reset.
            ansi::reset(out)?;
            ansi::attrs(out, cell.style.attrs)?;
            ansi::fg(out, cell.style.fg)?;
            ansi::bg(out, cell.style.bg)?;
            self.last_style = Some(cell.style);
        }

        if cell.is_continuation() {
            out.push(b' ');
        } else {
            let mut utf8 = [0u8; 4];
            out.extend_from_slice(cell.ch.encode_utf8(&mut utf8).as_bytes());
        }

        self.last_x = xi;
        self.last_y = yi;
        Ok(())
    }
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Emits escape sequences for the cells that differ from the previous frame.
///
/// ```
/// use ted_term::buffer::FrameBuffer;
/// use ted_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let frame = FrameBuffer::new(10, 2);
/// assert_eq!(renderer.render(&frame).unwrap(), 20);
/// assert_eq!(renderer.render(&frame).unwrap(), 0);
/// ```
pub struct DiffRenderer {
    output: Vec<u8>,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// A renderer with no previous frame; the first render draws everything.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            output: Vec::new(),
            previous: None,
        }
    }

    /// Diff `current` against the previous frame into the output buffer.
    ///
    /// Returns the number of cells rendered.
    ///
    /// # Errors
    ///
    /// Only if writing into the in-memory buffer fails, which it does not.
    pub fn render(&mut self, current: &FrameBuffer) -> io::Result<usize> {
        self.output.clear();
        let mut writer = CellWriter::new();
        let mut rendered = 0;

        let full_redraw = self
            .previous
            .as_ref()
            .is_none_or(|prev| prev.width() != current.width() || prev.height() != current.height());

        if full_redraw {
            ansi::reset(&mut self.output)?;
            ansi::clear_screen(&mut self.output)?;
        }

        for y in 0..current.height() {
            let prev_row = self.previous.as_ref().and_then(|p| p.row(y));
            if !full_redraw && prev_row == current.row(y) {
                continue;
            }
            for x in 0..current.width() {
                let Some(cell) = current.get(x, y) else {
                    continue;
                };
                let changed =
                    full_redraw || self.previous.as_ref().and_then(|p| p.get(x, y)) != Some(cell);
                if changed {
                    writer.render_cell(&mut self.output, x, y, cell)?;
                    rendered += 1;
                }
            }
        }

        if rendered > 0 {
            ansi::reset(&mut self.output)?;
        }

        match &mut self.previous {
            Some(prev) => prev.copy_from(current),
            None => self.previous = Some(current.clone()),
        }
        Ok(rendered)
    }

    /// The bytes produced by the last render.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.output
    }

    /// Write the accumulated output to `w` and clear it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.output)?;
        self.output.clear();
        Ok(())
    }

    /// Forget the previous frame so the next render repaints everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{Attr, Color};
    use pretty_assertions::assert_eq;

    fn frame_with(text: &str, style: Style) -> FrameBuffer {
        let mut f = FrameBuffer::new(8, 2);
        for (x, ch) in (0u16..).zip(text.chars()) {
            f.set(x, 0, Cell::new(ch, style));
        }
        f
    }

    #[test]
    fn first_render_draws_everything() {
        let mut r = DiffRenderer::new();
        let n = r.render(&FrameBuffer::new(8, 2)).unwrap();
        assert_eq!(n, 16);
        assert!(r.output_bytes().starts_with(b"\x1b[0m\x1b[2J"));
    }

    #[test]
    fn unchanged_frame_renders_nothing() {
        let mut r = DiffRenderer::new();
        let f = frame_with("abc", Style::DEFAULT);
        r.render(&f).unwrap();
        assert_eq!(r.render(&f).unwrap(), 0);
        assert!(r.output_bytes().is_empty());
    }

    #[test]
    fn only_changed_cells_are_emitted() {
        let mut r = DiffRenderer::new();
        r.render(&frame_with("abc", Style::DEFAULT)).unwrap();
        let n = r.render(&frame_with("abX", Style::DEFAULT)).unwrap();
        assert_eq!(n, 1);
        let out = String::from_utf8_lossy(r.output_bytes()).into_owned();
        assert!(out.contains("\x1b[1;3HX") || out.contains("\x1b[1;3H\x1b[0m"));
        assert!(out.ends_with("X\x1b[0m"));
    }

    #[test]
    fn style_changes_emit_sgr() {
        let mut r = DiffRenderer::new();
        r.render(&frame_with("a", Style::DEFAULT)).unwrap();
        let bold = Style::new(Color::Red, Color::Default).with(Attr::BOLD);
        r.render(&frame_with("a", bold)).unwrap();
        let out = String::from_utf8_lossy(r.output_bytes()).into_owned();
        assert!(out.contains("\x1b[1m"));
        assert!(out.contains("\x1b[31m"));
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut r = DiffRenderer::new();
        r.render(&FrameBuffer::new(4, 1)).unwrap();
        assert_eq!(r.render(&FrameBuffer::new(5, 1)).unwrap(), 5);
    }
}
