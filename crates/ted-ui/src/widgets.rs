//! Small standard widgets: a status bar and a one-line text view.

use ted_term::cell::{Attr, Style};

use crate::{Component, DrawContext};

// ---------------------------------------------------------------------------
// StatusBar
// ---------------------------------------------------------------------------

/// A reverse-video line with left- and right-aligned text.
#[derive(Debug, Clone, Default)]
pub struct StatusBar {
    pub left: String,
    pub right: String,
}

impl StatusBar {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            left: String::new(),
            right: String::new(),
        }
    }
}

impl Component for StatusBar {
    fn remeasure(&mut self, max_w: u16, max_h: u16) -> (u16, u16) {
        (max_w, max_h.min(1))
    }

    fn redraw(&mut self, ctx: &mut DrawContext<'_>) {
        let style = Style::DEFAULT.with(Attr::REVERSE);
        let width = ctx.width();
        ctx.hrule(0, ' ', style);
        ctx.print_right(width, 0, &self.right, style);
        ctx.print(0, 0, &self.left, style);
    }
}

// ---------------------------------------------------------------------------
// TextView
// ---------------------------------------------------------------------------

/// A single line of text, cut at the right edge.
#[derive(Debug, Clone, Default)]
pub struct TextView {
    pub text: String,
    pub style: Style,
}

impl TextView {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::DEFAULT,
        }
    }

    /// Replace the text and style.
    pub fn set(&mut self, text: impl Into<String>, style: Style) {
        self.text = text.into();
        self.style = style;
    }
}

impl Component for TextView {
    fn remeasure(&mut self, max_w: u16, max_h: u16) -> (u16, u16) {
        (max_w, max_h.min(1))
    }

    fn redraw(&mut self, ctx: &mut DrawContext<'_>) {
        // Only the first line of a multi-line message fits.
        let line = self.text.lines().next().unwrap_or("");
        ctx.print(0, 0, line, self.style);
    }
}
