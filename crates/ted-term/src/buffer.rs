// SPDX-License-Identifier: MIT
//
// FrameBuffer: a 2D grid of cells, the surface every frame is painted on.
//
// Row-major, flat `Vec<Cell>`. The driver owns one "back" buffer that the UI
// paints into between syncs; the diff renderer keeps a copy of the last frame
// it put on screen. Writes outside the grid are dropped rather than clamped,
// so a widget that overflows its box simply loses the overflow.

use std::fmt;

use unicode_width::UnicodeWidthChar;

use crate::cell::Cell;

/// A fixed-size grid of terminal cells.
///
/// ```
/// use ted_term::buffer::FrameBuffer;
/// use ted_term::cell::{Cell, Style};
///
/// let mut buf = FrameBuffer::new(80, 24);
/// assert!(buf.set(5, 3, Cell::new('X', Style::DEFAULT)));
/// assert_eq!(buf.get(5, 3).map(|c| c.ch), Some('X'));
/// assert!(!buf.set(80, 0, Cell::new('Y', Style::DEFAULT)));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// A `width × height` buffer of blank cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let mut buf = Self {
            width: 0,
            height: 0,
            cells: Vec::new(),
        };
        buf.resize(width, height);
        buf
    }

    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Flat index of `(x, y)`, `None` outside the grid.
    fn offset(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.offset(x, y).map(|i| &self.cells[i])
    }

    /// Row `y` as a slice.
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        let w = usize::from(self.width);
        let start = usize::from(y) * w;
        (y < self.height).then(|| &self.cells[start..start + w])
    }

    /// The characters of row `y` as a string, continuation cells skipped.
    ///
    /// Handy for asserting on rendered output.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|cells| {
                cells
                    .iter()
                    .filter(|c| !c.is_continuation())
                    .map(|c| c.ch)
                    .collect()
            })
            .unwrap_or_default()
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Write one cell. Returns `false` (and writes nothing) outside the grid.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    /// Blank every cell.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Change the dimensions. Contents are blanked.
    pub fn resize(&mut self, width: u16, height: u16) {
        (self.width, self.height) = (width, height);
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::EMPTY);
    }

    /// Copy `other` into `self`, reusing the allocation when sizes match.
    pub fn copy_from(&mut self, other: &Self) {
        if self.width == other.width && self.height == other.height {
            self.cells.copy_from_slice(&other.cells);
        } else {
            *self = other.clone();
        }
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}x{} frame", self.width, self.height)?;
        for y in 0..self.height {
            writeln!(f, "|{}|", self.row_text(y))?;
        }
        Ok(())
    }
}

// ─── Width helpers ───────────────────────────────────────────────────────────

/// Columns `ch` occupies: 0 for combining and control characters, 2 for
/// wide CJK and emoji, else 1.
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Columns `s` occupies, summed per character.
///
/// ```
/// use ted_term::buffer::string_width;
///
/// assert_eq!(string_width("hello"), 5);
/// assert_eq!(string_width("a中b"), 4);
/// ```
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
