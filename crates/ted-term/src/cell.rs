// SPDX-License-Identifier: MIT
//
// Cell: one character position on screen.
//
// A cell is a character plus a `Style`: foreground, background, and a small
// attribute set. The palette is the terminal's own: the default colors and the
// sixteen ANSI colors. ted never needs more than that, and sticking to the
// terminal palette means the user's color scheme applies everywhere.
//
// Wide characters (CJK, some emoji) occupy two columns. The first cell holds
// the character; the second is a continuation cell (`'\0'`) that the renderer
// skips when the wide character was just written.

// ─── Color ───────────────────────────────────────────────────────────────────

/// A terminal palette color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Color {
    /// Whatever the terminal uses when nothing is set (SGR 39 / 49).
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Color {
    /// Palette index 0–15, or `None` for [`Color::Default`].
    #[must_use]
    pub const fn index(self) -> Option<u8> {
        Some(match self {
            Self::Default => return None,
            Self::Black => 0,
            Self::Red => 1,
            Self::Green => 2,
            Self::Yellow => 3,
            Self::Blue => 4,
            Self::Magenta => 5,
            Self::Cyan => 6,
            Self::White => 7,
            Self::BrightBlack => 8,
            Self::BrightRed => 9,
            Self::BrightGreen => 10,
            Self::BrightYellow => 11,
            Self::BrightBlue => 12,
            Self::BrightMagenta => 13,
            Self::BrightCyan => 14,
            Self::BrightWhite => 15,
        })
    }
}

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes as a compact bitfield, one bit per SGR parameter.
    ///
    /// ```
    /// use ted_term::cell::Attr;
    ///
    /// let header = Attr::BOLD | Attr::REVERSE;
    /// assert!(header.contains(Attr::REVERSE));
    /// assert!(!header.contains(Attr::UNDERLINE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1: increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 2: decreased intensity.
        const DIM       = 1 << 1;
        /// SGR 4: single underline.
        const UNDERLINE = 1 << 2;
        /// SGR 7: swap foreground and background.
        const REVERSE   = 1 << 3;
    }
}

// ─── Style ───────────────────────────────────────────────────────────────────

/// Foreground, background, and attributes for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Style {
    /// Default colors, no attributes.
    pub const DEFAULT: Self = Self {
        fg: Color::Default,
        bg: Color::Default,
        attrs: Attr::empty(),
    };

    #[inline]
    #[must_use]
    pub const fn new(fg: Color, bg: Color) -> Self {
        Self {
            fg,
            bg,
            attrs: Attr::empty(),
        }
    }

    /// Same colors with `attrs` added.
    #[inline]
    #[must_use]
    pub const fn with(self, attrs: Attr) -> Self {
        Self {
            attrs: self.attrs.union(attrs),
            ..self
        }
    }

    /// Foreground color replaced.
    #[inline]
    #[must_use]
    pub const fn fg(self, fg: Color) -> Self {
        Self { fg, ..self }
    }

    /// Background color replaced.
    #[inline]
    #[must_use]
    pub const fn bg(self, bg: Color) -> Self {
        Self { bg, ..self }
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    /// A blank cell with default colors.
    pub const EMPTY: Self = Self {
        ch: ' ',
        style: Style::DEFAULT,
    };

    #[inline]
    #[must_use]
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    /// The second column of a wide character.
    #[inline]
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self { ch: '\0', style }
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.ch == '\0'
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
