//! DrawContext: a clipped window onto the driver's screen.
//!
//! A context is a rectangle in device coordinates. Widgets draw in local
//! coordinates starting at `(0, 0)`; the context translates and clips. Any
//! draw call outside `[0, width) × [0, height)` is silently dropped, which is
//! the only bounds protection widgets get and the only one they need.
//!
//! Sub-contexts are clamped into their parent: an offset past the parent's
//! edge produces an empty context, and an extent that would overflow is cut
//! to what fits.

use ted_term::buffer::{char_width, string_width};
use ted_term::cell::Style;
use ted_term::driver::Driver;

/// A clipped drawing surface over a [`Driver`].
pub struct DrawContext<'a> {
    driver: &'a mut dyn Driver,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

impl<'a> DrawContext<'a> {
    /// A context covering the driver's whole screen.
    pub fn new(driver: &'a mut dyn Driver) -> Self {
        let (width, height) = driver.size();
        Self {
            driver,
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// A child context at local `(x, y)` of at most `width × height`.
    pub fn sub(&mut self, x: u16, y: u16, width: u16, height: u16) -> DrawContext<'_> {
        let x = x.min(self.width);
        let y = y.min(self.height);
        DrawContext {
            driver: &mut *self.driver,
            x: self.x + x,
            y: self.y + y,
            width: width.min(self.width - x),
            height: height.min(self.height - y),
        }
    }

    /// Paint one cell; dropped when outside the context.
    pub fn set_cell(&mut self, x: u16, y: u16, ch: char, style: Style) {
        if x < self.width && y < self.height {
            self.driver.set_cell(self.x + x, self.y + y, ch, style);
        }
    }

    /// Print `text` starting at `(x, y)`, cut at the right edge.
    ///
    /// A wide character that would straddle the edge is not drawn. Returns
    /// the column after the last character written.
    pub fn print(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            let w = u16::try_from(char_width(ch)).unwrap_or(0);
            if w == 0 {
                continue;
            }
            if col.saturating_add(w) > self.width {
                break;
            }
            self.set_cell(col, y, ch, style);
            if w == 2 {
                self.set_cell(col + 1, y, '\0', style);
            }
            col += w;
        }
        col
    }

    /// Print `text` so that it ends just before column `right`.
    pub fn print_right(&mut self, right: u16, y: u16, text: &str, style: Style) {
        let w = u16::try_from(string_width(text)).unwrap_or(u16::MAX);
        self.print(right.saturating_sub(w), y, text, style);
    }

    /// Fill a rectangle with `ch`.
    pub fn fill(&mut self, x: u16, y: u16, width: u16, height: u16, ch: char, style: Style) {
        let right = x.saturating_add(width).min(self.width);
        let bottom = y.saturating_add(height).min(self.height);
        for row in y..bottom {
            for col in x..right {
                self.set_cell(col, row, ch, style);
            }
        }
    }

    /// Fill line `y` edge to edge with `ch`.
    pub fn hrule(&mut self, y: u16, ch: char, style: Style) {
        self.fill(0, y, self.width, 1, ch, style);
    }

    /// Place the hardware cursor; ignored when outside the context.
    pub fn set_cursor(&mut self, x: u16, y: u16) {
        if x < self.width && y < self.height {
            self.driver.set_cursor(self.x + x, self.y + y);
        }
    }

    pub fn hide_cursor(&mut self) {
        self.driver.hide_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ted_term::driver::HeadlessDriver;

    fn synced(d: &mut HeadlessDriver) -> Vec<String> {
        d.sync().unwrap();
        (0..d.screen().height()).map(|y| d.row_text(y)).collect()
    }

    #[test]
    fn draws_outside_bounds_are_dropped() {
        let mut d = HeadlessDriver::new(4, 2);
        {
            let mut ctx = DrawContext::new(&mut d);
            ctx.set_cell(4, 0, 'x', Style::DEFAULT);
            ctx.set_cell(0, 2, 'y', Style::DEFAULT);
            ctx.set_cell(3, 1, 'z', Style::DEFAULT);
        }
        assert_eq!(synced(&mut d), vec!["    ", "   z"]);
    }

    #[test]
    fn sub_context_translates_and_clips() {
        let mut d = HeadlessDriver::new(6, 3);
        {
            let mut ctx = DrawContext::new(&mut d);
            let mut sub = ctx.sub(2, 1, 10, 10);
            assert_eq!((sub.width(), sub.height()), (4, 2));
            sub.print(0, 0, "abcdefgh", Style::DEFAULT);
        }
        assert_eq!(synced(&mut d), vec!["      ", "  abcd", "      "]);
    }

    #[test]
    fn sub_context_past_the_edge_is_empty() {
        let mut d = HeadlessDriver::new(4, 2);
        let mut ctx = DrawContext::new(&mut d);
        let sub = ctx.sub(9, 9, 3, 3);
        assert_eq!((sub.width(), sub.height()), (0, 0));
    }

    #[test]
    fn wide_char_not_split_at_edge() {
        let mut d = HeadlessDriver::new(3, 1);
        {
            let mut ctx = DrawContext::new(&mut d);
            let end = ctx.print(0, 0, "a中b", Style::DEFAULT);
            assert_eq!(end, 3);
            ctx.print(2, 0, "中", Style::DEFAULT);
        }
        assert_eq!(synced(&mut d), vec!["a中"]);
    }

    #[test]
    fn print_right_aligns_to_edge() {
        let mut d = HeadlessDriver::new(6, 1);
        {
            let mut ctx = DrawContext::new(&mut d);
            let w = ctx.width();
            ctx.print_right(w, 0, "xy", Style::DEFAULT);
        }
        assert_eq!(synced(&mut d), vec!["    xy"]);
    }

    #[test]
    fn cursor_is_translated() {
        let mut d = HeadlessDriver::new(6, 3);
        {
            let mut ctx = DrawContext::new(&mut d);
            let mut sub = ctx.sub(1, 2, 4, 1);
            sub.set_cursor(3, 0);
        }
        d.sync().unwrap();
        assert_eq!(d.cursor(), Some((4, 2)));
    }
}
