//! Layouts: components that arrange other components.
//!
//! Layouts borrow their children for one frame: the frame builds the tree,
//! measures it, draws it, and drops it. Measurements taken in `remeasure`
//! are stored and reused by `redraw`.

use crate::{Component, DrawContext};

// ---------------------------------------------------------------------------
// VertLinearLayout
// ---------------------------------------------------------------------------

/// Stacks children top to bottom, each at full width.
///
/// Every child is offered the height left over by the children above it.
#[derive(Default)]
pub struct VertLinearLayout<'c> {
    children: Vec<(&'c mut dyn Component, u16, u16)>,
}

impl<'c> VertLinearLayout<'c> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            children: Vec::new(),
        }
    }

    /// Add a child below the existing ones.
    pub fn append(&mut self, child: &'c mut dyn Component) {
        self.children.push((child, 0, 0));
    }

    /// Builder form of [`append`](Self::append).
    #[must_use]
    pub fn with(mut self, child: &'c mut dyn Component) -> Self {
        self.append(child);
        self
    }
}

impl Component for VertLinearLayout<'_> {
    fn remeasure(&mut self, max_w: u16, max_h: u16) -> (u16, u16) {
        let mut y = 0u16;
        for (child, child_y, child_h) in &mut self.children {
            let (_, h) = child.remeasure(max_w, max_h - y);
            *child_y = y;
            *child_h = h.min(max_h - y);
            y += *child_h;
        }
        (max_w, y)
    }

    fn redraw(&mut self, ctx: &mut DrawContext<'_>) {
        let width = ctx.width();
        for (child, y, h) in &mut self.children {
            child.redraw(&mut ctx.sub(0, *y, width, *h));
        }
    }
}

// ---------------------------------------------------------------------------
// DockLayout
// ---------------------------------------------------------------------------

/// A client area bordered by optional north and south components.
///
/// North and south report their own heights; the client gets what remains.
#[derive(Default)]
pub struct DockLayout<'c> {
    pub north: Option<&'c mut dyn Component>,
    pub south: Option<&'c mut dyn Component>,
    pub client: Option<&'c mut dyn Component>,
    north_h: u16,
    south_h: u16,
}

impl<'c> DockLayout<'c> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            north: None,
            south: None,
            client: None,
            north_h: 0,
            south_h: 0,
        }
    }

    #[must_use]
    pub fn north(mut self, c: &'c mut dyn Component) -> Self {
        self.north = Some(c);
        self
    }

    #[must_use]
    pub fn south(mut self, c: &'c mut dyn Component) -> Self {
        self.south = Some(c);
        self
    }

    #[must_use]
    pub fn client(mut self, c: &'c mut dyn Component) -> Self {
        self.client = Some(c);
        self
    }
}

impl Component for DockLayout<'_> {
    fn remeasure(&mut self, max_w: u16, max_h: u16) -> (u16, u16) {
        self.north_h = self
            .north
            .as_mut()
            .map_or(0, |n| n.remeasure(max_w, max_h).1.min(max_h));
        let rest = max_h - self.north_h;
        self.south_h = self
            .south
            .as_mut()
            .map_or(0, |s| s.remeasure(max_w, rest).1.min(rest));
        let client_h = rest - self.south_h;
        if let Some(c) = self.client.as_mut() {
            c.remeasure(max_w, client_h);
        }
        (max_w, max_h)
    }

    fn redraw(&mut self, ctx: &mut DrawContext<'_>) {
        let width = ctx.width();
        let height = ctx.height();
        let south_y = height.saturating_sub(self.south_h);

        if let Some(n) = self.north.as_mut() {
            n.redraw(&mut ctx.sub(0, 0, width, self.north_h));
        }
        if let Some(s) = self.south.as_mut() {
            s.redraw(&mut ctx.sub(0, south_y, width, self.south_h));
        }
        if let Some(c) = self.client.as_mut() {
            let client_h = south_y.saturating_sub(self.north_h);
            c.redraw(&mut ctx.sub(0, self.north_h, width, client_h));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::TextView;
    use pretty_assertions::assert_eq;
    use ted_term::driver::{Driver, HeadlessDriver};

    /// Fills its whole area with one character.
    struct Fill(char, u16);

    impl Component for Fill {
        fn remeasure(&mut self, max_w: u16, max_h: u16) -> (u16, u16) {
            (max_w, self.1.min(max_h))
        }

        fn redraw(&mut self, ctx: &mut DrawContext<'_>) {
            let (w, h) = (ctx.width(), ctx.height());
            ctx.fill(0, 0, w, h, self.0, ted_term::cell::Style::DEFAULT);
        }
    }

    fn render(d: &mut HeadlessDriver, root: &mut dyn Component) -> Vec<String> {
        let (w, h) = d.size();
        root.remeasure(w, h);
        root.redraw(&mut DrawContext::new(d));
        d.sync().unwrap();
        (0..h).map(|y| d.row_text(y)).collect()
    }

    #[test]
    fn vertical_stack_accumulates_height() {
        let mut a = Fill('a', 1);
        let mut b = Fill('b', 2);
        let mut layout = VertLinearLayout::new().with(&mut a).with(&mut b);
        assert_eq!(layout.remeasure(3, 10), (3, 3));
    }

    #[test]
    fn vertical_stack_caps_at_available_height() {
        let mut a = Fill('a', 2);
        let mut b = Fill('b', 5);
        let mut d = HeadlessDriver::new(3, 4);
        let mut layout = VertLinearLayout::new().with(&mut a).with(&mut b);
        let rows = render(&mut d, &mut layout);
        assert_eq!(rows, vec!["aaa", "aaa", "bbb", "bbb"]);
    }

    #[test]
    fn dock_gives_client_the_remainder() {
        let mut north = Fill('n', 1);
        let mut south = Fill('s', 2);
        let mut client = Fill('c', u16::MAX);
        let mut d = HeadlessDriver::new(2, 5);
        let mut dock = DockLayout::new()
            .north(&mut north)
            .south(&mut south)
            .client(&mut client);
        let rows = render(&mut d, &mut dock);
        assert_eq!(rows, vec!["nn", "cc", "cc", "ss", "ss"]);
    }

    #[test]
    fn dock_without_north() {
        let mut status = TextView::new("st");
        let mut client = Fill('c', u16::MAX);
        let mut d = HeadlessDriver::new(2, 3);
        let mut dock = DockLayout::new().south(&mut status).client(&mut client);
        let rows = render(&mut d, &mut dock);
        assert_eq!(rows, vec!["cc", "cc", "st"]);
    }
}
