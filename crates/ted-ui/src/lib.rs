//! ted-ui: the widget layer between the editing engine and the terminal
//! driver.
//!
//! Every widget implements [`Component`]: a measure pass that reports how
//! much space it wants, followed by a draw pass into a [`DrawContext`] that
//! clips to the space it was given. Layouts compose components with the same
//! two-pass protocol, so a whole screen is one tree measured and drawn once
//! per frame.
//!
//! - [`draw`]: bounded sub-rectangles over a [`Driver`](ted_term::driver::Driver)
//! - [`layout`]: vertical stack and north/south/client dock
//! - [`widgets`]: status bar and text view
//! - [`grid`]: virtualized spreadsheet viewport
//! - [`entry`]: single-line prompt with horizontal auto-scroll

pub mod draw;
pub mod entry;
pub mod grid;
pub mod layout;
pub mod widgets;

pub use draw::DrawContext;

/// A widget that takes part in the measure-then-draw protocol.
///
/// `remeasure` is always called before `redraw` in the same frame. The
/// context handed to `redraw` may be smaller than what was asked for.
pub trait Component {
    /// Report the `(width, height)` this widget will use out of
    /// `max_w × max_h`.
    fn remeasure(&mut self, max_w: u16, max_h: u16) -> (u16, u16);

    /// Draw into `ctx`, whose origin is the widget's top-left corner.
    fn redraw(&mut self, ctx: &mut DrawContext<'_>);
}
