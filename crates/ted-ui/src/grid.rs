//! GridViewport: virtualized spreadsheet rendering and cursor movement.
//!
//! The viewport holds only selection and scroll state; the data comes from a
//! [`GridModel`] passed in on every call. Coordinates are `(x, y)` =
//! `(column, row)`, while model dimensions are `(rows, cols)`.
//!
//! # Rendering
//!
//! Rendering is column-major: one screen column band at a time, each filled
//! top to bottom with rows until the viewport height runs out. Screen cell
//! `(0, _)` is the row-header band and `(_, 0)` the column-header band;
//! everything else maps to model cell `(view_x + sx - 1, view_y + sy - 1)`.
//!
//! ```text
//!          │ 0        │ 1        │ 2
//! ─────────┼──────────┼──────────┼────
//!  0       │ letters  │ numbers  │ gr
//!  1       │ alpha    │ 1        │ ~
//! ```
//!
//! A cell that does not fit at the right or bottom edge is clipped. The
//! next frame starts from a whole cell again; there is no persisted sub-cell
//! scroll offset.
//!
//! # Repositioning
//!
//! Each draw records how many cells fit on each axis. After every move the
//! origin is adjusted per axis: a selection before the origin snaps the
//! origin to it, and a selection at or past `origin + extent - 3` shifts the
//! origin so the selection sits exactly on that margin. Until the first draw
//! there is no measurement and repositioning does nothing.

use ted_term::cell::{Attr, Color, Style};

use crate::{Component, DrawContext};

/// Width of the row-header band.
pub const HEADER_WIDTH: usize = 8;
/// Height of the column-header band.
pub const HEADER_HEIGHT: usize = 1;
/// Cells kept between the selection and the far edge when scrolling.
const SCROLL_MARGIN: usize = 3;

// ---------------------------------------------------------------------------
// GridModel
// ---------------------------------------------------------------------------

/// What the viewport needs to know about the data it shows.
pub trait GridModel {
    /// `(rows, cols)`.
    fn dimensions(&self) -> (usize, usize);

    /// Display width of a column in screen cells.
    fn col_width(&self, col: usize) -> usize;

    /// Display height of a row in screen cells.
    fn row_height(&self, row: usize) -> usize;

    /// The text of a cell, `""` when out of range.
    fn cell_value(&self, row: usize, col: usize) -> &str;

    /// Highlight color for a row, if it is marked.
    fn row_marker(&self, _row: usize) -> Option<Color> {
        None
    }
}

// ---------------------------------------------------------------------------
// GridViewport
// ---------------------------------------------------------------------------

/// Selection and scroll state of a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridViewport {
    sel_x: usize,
    sel_y: usize,
    view_x: usize,
    view_y: usize,
    /// Cells that fit `(wide, high)` at the last draw, headers included.
    measured: Option<(usize, usize)>,
}

impl GridViewport {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sel_x: 0,
            sel_y: 0,
            view_x: 0,
            view_y: 0,
            measured: None,
        }
    }

    /// The selected cell as `(col, row)`.
    #[must_use]
    pub const fn cell_position(&self) -> (usize, usize) {
        (self.sel_x, self.sel_y)
    }

    /// The model cell at the top-left of the view, as `(col, row)`.
    #[must_use]
    pub const fn view_origin(&self) -> (usize, usize) {
        (self.view_x, self.view_y)
    }

    /// Cells that fit at the last draw, `None` before the first draw.
    #[must_use]
    pub const fn measured_extent(&self) -> Option<(usize, usize)> {
        self.measured
    }

    /// Move the selection by a delta, clamped to the model.
    pub fn move_by(&mut self, model: &dyn GridModel, dx: isize, dy: isize) {
        let x = to_isize(self.sel_x).saturating_add(dx);
        let y = to_isize(self.sel_y).saturating_add(dy);
        self.move_to(model, x, y);
    }

    /// Move the selection to `(x, y)`, clamped into `[0, dim - 1]` per axis.
    ///
    /// A model with no rows or no columns has no valid cell; the selection
    /// stays where it is.
    pub fn move_to(&mut self, model: &dyn GridModel, x: isize, y: isize) {
        let (rows, cols) = model.dimensions();
        if rows == 0 || cols == 0 {
            return;
        }
        self.sel_x = clamp_index(x, cols);
        self.sel_y = clamp_index(y, rows);
        self.reposition();
    }

    /// Pull the selection back inside the model after it shrank.
    pub fn clamp_to(&mut self, model: &dyn GridModel) {
        self.move_to(model, to_isize(self.sel_x), to_isize(self.sel_y));
    }

    /// The selected cell's text, `""` when the selection is outside the model.
    #[must_use]
    pub fn current_cell_value<'m>(&self, model: &'m dyn GridModel) -> &'m str {
        let (rows, cols) = model.dimensions();
        if self.sel_y < rows && self.sel_x < cols {
            model.cell_value(self.sel_y, self.sel_x)
        } else {
            ""
        }
    }

    fn reposition(&mut self) {
        let Some((wide, high)) = self.measured else {
            return;
        };
        self.view_x = reposition_axis(self.sel_x, self.view_x, wide);
        self.view_y = reposition_axis(self.sel_y, self.view_y, high);
    }

    // -- rendering --------------------------------------------------------

    /// Draw the grid into `ctx` and record the measured extent.
    pub fn redraw(&mut self, model: &dyn GridModel, ctx: &mut DrawContext<'_>) {
        self.reposition();

        let width = usize::from(ctx.width());
        let height = usize::from(ctx.height());
        let mut screen_x = 0;
        let mut cell_x = 0;
        let mut cells_high = 0;

        while screen_x < width {
            let col_w = self.screen_col_width(model, cell_x).min(width - screen_x);
            let mut screen_y = 0;
            let mut cell_y = 0;

            while screen_y < height {
                let row_h = self.screen_row_height(model, cell_y).min(height - screen_y);
                let (text, style) = self.cell_data(model, cell_x, cell_y);
                draw_cell(ctx, screen_x, screen_y, col_w, row_h, &text, style, cell_x == 0);
                screen_y += row_h;
                cell_y += 1;
            }

            cells_high = cell_y;
            screen_x += col_w;
            cell_x += 1;
        }

        self.measured = Some((cell_x, cells_high));
    }

    /// Model column behind screen column `cell_x`, `None` for the header.
    fn model_col(&self, cell_x: usize) -> Option<usize> {
        cell_x.checked_sub(1).map(|c| c + self.view_x)
    }

    fn model_row(&self, cell_y: usize) -> Option<usize> {
        cell_y.checked_sub(1).map(|r| r + self.view_y)
    }

    fn screen_col_width(&self, model: &dyn GridModel, cell_x: usize) -> usize {
        let (_, cols) = model.dimensions();
        match self.model_col(cell_x) {
            Some(c) if c < cols => model.col_width(c).max(1),
            _ => HEADER_WIDTH,
        }
    }

    fn screen_row_height(&self, model: &dyn GridModel, cell_y: usize) -> usize {
        let (rows, _) = model.dimensions();
        match self.model_row(cell_y) {
            Some(r) if r < rows => model.row_height(r).max(1),
            _ => HEADER_HEIGHT,
        }
    }

    fn cell_data(&self, model: &dyn GridModel, cell_x: usize, cell_y: usize) -> (String, Style) {
        let header = Style::DEFAULT.with(Attr::BOLD);
        let (rows, cols) = model.dimensions();

        match (self.model_col(cell_x), self.model_row(cell_y)) {
            (None, None) => (String::new(), header),
            (None, Some(r)) => {
                let style = model
                    .row_marker(r)
                    .filter(|_| r < rows)
                    .map_or(header, |c| header.fg(c));
                let style = if r == self.sel_y { style.with(Attr::REVERSE) } else { style };
                (r.to_string(), style)
            }
            (Some(c), None) => {
                let style = if c == self.sel_x { header.with(Attr::REVERSE) } else { header };
                (c.to_string(), style)
            }
            (Some(c), Some(r)) if r < rows && c < cols => {
                let base = model.row_marker(r).map_or(Style::DEFAULT, |m| Style::DEFAULT.fg(m));
                let style = if (c, r) == (self.sel_x, self.sel_y) {
                    base.with(Attr::REVERSE)
                } else {
                    base
                };
                (model.cell_value(r, c).to_owned(), style)
            }
            _ => ("~".to_owned(), Style::DEFAULT.fg(Color::Blue)),
        }
    }
}

// ---------------------------------------------------------------------------
// GridView
// ---------------------------------------------------------------------------

/// A viewport paired with its model for one frame, usable in layouts.
pub struct GridView<'a> {
    pub viewport: &'a mut GridViewport,
    pub model: &'a dyn GridModel,
}

impl Component for GridView<'_> {
    fn remeasure(&mut self, max_w: u16, max_h: u16) -> (u16, u16) {
        (max_w, max_h)
    }

    fn redraw(&mut self, ctx: &mut DrawContext<'_>) {
        self.viewport.redraw(self.model, ctx);
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn to_isize(v: usize) -> isize {
    isize::try_from(v).unwrap_or(isize::MAX)
}

fn clamp_index(v: isize, len: usize) -> usize {
    usize::try_from(v).map_or(0, |v| v.min(len - 1))
}

fn reposition_axis(sel: usize, origin: usize, extent: usize) -> usize {
    let margin = extent.saturating_sub(SCROLL_MARGIN);
    if sel < origin {
        sel
    } else if sel >= origin + margin {
        sel - margin
    } else {
        origin
    }
}

/// Paint one grid cell: background fill, then the text on its first line.
///
/// Data cells keep their last column blank as a separator; headers use the
/// full width.
#[allow(clippy::too_many_arguments)]
fn draw_cell(
    ctx: &mut DrawContext<'_>,
    x: usize,
    y: usize,
    w: usize,
    h: usize,
    text: &str,
    style: Style,
    is_header: bool,
) {
    let to_u16 = |v: usize| u16::try_from(v).unwrap_or(u16::MAX);
    let mut cell = ctx.sub(to_u16(x), to_u16(y), to_u16(w), to_u16(h));
    let (cw, ch) = (cell.width(), cell.height());
    cell.fill(0, 0, cw, ch, ' ', style);
    let text_w = if is_header || cw <= 1 { cw } else { cw - 1 };
    cell.sub(0, 0, text_w, 1).print(0, 0, text, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ted_term::driver::{Driver, HeadlessDriver};

    struct Table {
        rows: Vec<Vec<String>>,
        width: usize,
    }

    impl Table {
        fn new(rows: usize, cols: usize) -> Self {
            Self {
                rows: (0..rows)
                    .map(|r| (0..cols).map(|c| format!("{r},{c}")).collect())
                    .collect(),
                width: 6,
            }
        }
    }

    impl GridModel for Table {
        fn dimensions(&self) -> (usize, usize) {
            (self.rows.len(), self.rows.first().map_or(0, Vec::len))
        }

        fn col_width(&self, _col: usize) -> usize {
            self.width
        }

        fn row_height(&self, _row: usize) -> usize {
            1
        }

        fn cell_value(&self, row: usize, col: usize) -> &str {
            self.rows
                .get(row)
                .and_then(|r| r.get(col))
                .map_or("", String::as_str)
        }
    }

    fn draw(vp: &mut GridViewport, model: &Table, w: u16, h: u16) -> HeadlessDriver {
        let mut d = HeadlessDriver::new(w, h);
        vp.redraw(model, &mut DrawContext::new(&mut d));
        d.sync().unwrap();
        d
    }

    // -- movement ---------------------------------------------------------

    #[test]
    fn move_to_clamps_into_model() {
        let model = Table::new(5, 5);
        let mut vp = GridViewport::new();
        vp.move_to(&model, -5, -5);
        assert_eq!(vp.cell_position(), (0, 0));
        vp.move_to(&model, 99, 99);
        assert_eq!(vp.cell_position(), (4, 4));
    }

    #[test]
    fn move_by_clamps_each_axis() {
        let model = Table::new(3, 7);
        let mut vp = GridViewport::new();
        vp.move_by(&model, 10, 1);
        assert_eq!(vp.cell_position(), (6, 1));
        vp.move_by(&model, -2, -9);
        assert_eq!(vp.cell_position(), (4, 0));
    }

    #[test]
    fn empty_model_leaves_selection() {
        let model = Table::new(0, 0);
        let mut vp = GridViewport::new();
        vp.move_to(&model, 3, 3);
        assert_eq!(vp.cell_position(), (0, 0));
    }

    #[test]
    fn current_cell_value_follows_selection() {
        let model = Table::new(3, 3);
        let mut vp = GridViewport::new();
        vp.move_to(&model, 2, 1);
        assert_eq!(vp.current_cell_value(&model), "1,2");
    }

    // -- repositioning ----------------------------------------------------

    #[test]
    fn no_reposition_before_first_draw() {
        let model = Table::new(100, 100);
        let mut vp = GridViewport::new();
        vp.move_to(&model, 50, 50);
        assert_eq!(vp.view_origin(), (0, 0));
        assert_eq!(vp.measured_extent(), None);
    }

    #[test]
    fn selection_past_margin_scrolls_to_margin() {
        let model = Table::new(100, 100);
        let mut vp = GridViewport::new();
        // Header 8 + 4 columns of 6 = 32 wide; 10 rows including header.
        draw(&mut vp, &model, 32, 10);
        assert_eq!(vp.measured_extent(), Some((5, 10)));

        vp.move_to(&model, 0, 7);
        assert_eq!(vp.view_origin(), (0, 0));
        vp.move_to(&model, 0, 8);
        assert_eq!(vp.view_origin(), (0, 1));
        vp.move_to(&model, 3, 8);
        assert_eq!(vp.view_origin(), (1, 1));
    }

    #[test]
    fn selection_before_origin_snaps_origin() {
        let model = Table::new(100, 100);
        let mut vp = GridViewport::new();
        draw(&mut vp, &model, 32, 10);
        vp.move_to(&model, 40, 40);
        assert_eq!(vp.view_origin(), (38, 33));
        vp.move_to(&model, 10, 20);
        assert_eq!(vp.view_origin(), (10, 20));
    }

    // -- rendering --------------------------------------------------------

    #[test]
    fn renders_headers_cells_and_tildes() {
        let model = Table::new(2, 2);
        let mut vp = GridViewport::new();
        let d = draw(&mut vp, &model, 28, 4);
        assert_eq!(d.row_text(0), "        0     1     2       ");
        assert_eq!(d.row_text(1), "0       0,0   0,1   ~       ");
        assert_eq!(d.row_text(2), "1       1,0   1,1   ~       ");
        assert_eq!(d.row_text(3), "2       ~     ~     ~       ");
    }

    #[test]
    fn selection_and_aligned_headers_are_reversed() {
        let model = Table::new(2, 2);
        let mut vp = GridViewport::new();
        vp.move_to(&model, 1, 0);
        let d = draw(&mut vp, &model, 28, 4);
        let attrs = |x, y| d.screen().get(x, y).map(|c| c.style.attrs).unwrap_or_default();
        assert!(attrs(14, 1).contains(Attr::REVERSE));
        assert!(!attrs(8, 1).contains(Attr::REVERSE));
        assert!(attrs(0, 1).contains(Attr::REVERSE | Attr::BOLD));
        assert!(!attrs(0, 2).contains(Attr::REVERSE));
        assert!(attrs(14, 0).contains(Attr::REVERSE | Attr::BOLD));
    }

    #[test]
    fn out_of_model_cells_are_colored() {
        let model = Table::new(1, 1);
        let mut vp = GridViewport::new();
        let d = draw(&mut vp, &model, 20, 3);
        assert_eq!(d.screen().get(14, 1).map(|c| (c.ch, c.style.fg)), Some(('~', Color::Blue)));
    }

    #[test]
    fn partial_cells_are_clipped() {
        let model = Table::new(1, 3);
        let mut vp = GridViewport::new();
        let d = draw(&mut vp, &model, 11, 2);
        assert_eq!(d.row_text(1), "0       0, ");
        assert_eq!(vp.measured_extent(), Some((2, 2)));
    }

    #[test]
    fn scrolled_view_shows_origin_indices() {
        let model = Table::new(100, 100);
        let mut vp = GridViewport::new();
        draw(&mut vp, &model, 32, 10);
        vp.move_to(&model, 10, 20);
        let d = draw(&mut vp, &model, 32, 10);
        assert!(d.row_text(0).starts_with("        8     9"));
        assert!(d.row_text(1).starts_with("13"));
    }
}
