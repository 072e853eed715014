//! ViewController: display attributes over a model, and the gate for
//! every structural edit.
//!
//! The controller owns the session's model and two attribute arrays, one
//! entry per row and one per column. After every resize, insert, or delete
//! the arrays are re-synchronized to the model's dimensions: surviving
//! indices keep their attributes, new indices get defaults, and truncated
//! indices fall off the tail.
//!
//! All mutation goes through the model's mutable capability; a read-only
//! model makes every edit fail with [`Error::ReadOnlyModel`] before anything
//! changes.

use std::fmt;
use std::str::FromStr;

use ted_term::cell::Color;
use ted_ui::grid::GridModel;

use crate::error::{Axis, Error, Result};
use crate::model::{try_as_mutable, TabularModel};

/// Default height of a row.
pub const DEFAULT_ROW_SIZE: usize = 1;
/// Default width of a column.
pub const DEFAULT_COL_SIZE: usize = 24;
/// Narrowest a column may be made.
pub const MIN_COL_SIZE: usize = 4;
/// Most cells [`ViewController::resize`] will allocate.
pub const MAX_CELLS: usize = 1 << 24;

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// A visual highlight tag for a row or column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Marker {
    #[default]
    None,
    Red,
    Green,
    Blue,
}

impl Marker {
    /// The next marker in the cycle none → red → green → blue → none.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::None => Self::Red,
            Self::Red => Self::Green,
            Self::Green => Self::Blue,
            Self::Blue => Self::None,
        }
    }

    #[must_use]
    pub const fn color(self) -> Option<Color> {
        match self {
            Self::None => None,
            Self::Red => Some(Color::Red),
            Self::Green => Some(Color::Green),
            Self::Blue => Some(Color::Blue),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        })
    }
}

impl FromStr for Marker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            other => Err(Error::invalid(format!("unknown marker: {other}"))),
        }
    }
}

/// Display attributes of one row or column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceAttr {
    pub size: usize,
    pub marker: Marker,
}

impl SliceAttr {
    #[must_use]
    pub const fn row_default() -> Self {
        Self {
            size: DEFAULT_ROW_SIZE,
            marker: Marker::None,
        }
    }

    #[must_use]
    pub const fn col_default() -> Self {
        Self {
            size: DEFAULT_COL_SIZE,
            marker: Marker::None,
        }
    }
}

// ---------------------------------------------------------------------------
// ViewController
// ---------------------------------------------------------------------------

pub struct ViewController {
    model: Box<dyn TabularModel>,
    row_attrs: Vec<SliceAttr>,
    col_attrs: Vec<SliceAttr>,
}

impl ViewController {
    #[must_use]
    pub fn new(model: Box<dyn TabularModel>) -> Self {
        let mut vc = Self {
            model,
            row_attrs: Vec::new(),
            col_attrs: Vec::new(),
        };
        vc.sync_attrs();
        vc
    }

    #[must_use]
    pub fn model(&self) -> &dyn TabularModel {
        self.model.as_ref()
    }

    /// Replace the model wholesale, keeping attributes of surviving indices.
    pub fn set_model(&mut self, model: Box<dyn TabularModel>) {
        self.model = model;
        self.sync_attrs();
    }

    /// `(rows, cols)` of the model.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        self.model.dimensions()
    }

    #[must_use]
    pub fn cell_value(&self, row: usize, col: usize) -> &str {
        self.model.cell_value(row, col)
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.model.as_mutable().is_none()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.model.as_mutable().is_some_and(|m| m.is_dirty())
    }

    /// Check the model's mutable capability without changing anything.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnlyModel`].
    pub fn ensure_mutable(&mut self) -> Result<()> {
        try_as_mutable(self.model.as_mut()).map(|_| ())
    }

    /// Record that the model's contents were saved.
    pub fn mark_saved(&mut self) {
        if let Some(m) = self.model.as_mutable_mut() {
            m.mark_saved();
        }
    }

    #[must_use]
    pub fn row_attrs(&self) -> &[SliceAttr] {
        &self.row_attrs
    }

    #[must_use]
    pub fn col_attrs(&self) -> &[SliceAttr] {
        &self.col_attrs
    }

    // -- attributes --------------------------------------------------------

    /// Set a column's width, clamped to [`MIN_COL_SIZE`].
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] for a column outside the model.
    pub fn set_col_width(&mut self, col: usize, width: usize) -> Result<()> {
        let len = self.col_attrs.len();
        let attr = self
            .col_attrs
            .get_mut(col)
            .ok_or_else(|| out_of_bounds(Axis::Column, col, len))?;
        attr.size = width.max(MIN_COL_SIZE);
        Ok(())
    }

    /// Set a row's marker.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] for a row outside the model.
    pub fn set_row_marker(&mut self, row: usize, marker: Marker) -> Result<()> {
        let len = self.row_attrs.len();
        self.row_attrs
            .get_mut(row)
            .ok_or_else(|| out_of_bounds(Axis::Row, row, len))?
            .marker = marker;
        Ok(())
    }

    // -- cell edits --------------------------------------------------------

    /// # Errors
    ///
    /// [`Error::ReadOnlyModel`] or [`Error::OutOfBounds`].
    pub fn set_cell_value(&mut self, row: usize, col: usize, value: &str) -> Result<()> {
        try_as_mutable(self.model.as_mut())?.set_cell_value(row, col, value)
    }

    /// Resize the model and re-synchronize attributes.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnlyModel`], or [`Error::InvalidArgument`] when
    /// `rows × cols` (either counted as at least one) passes [`MAX_CELLS`].
    /// Nothing is allocated on error.
    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        let m = try_as_mutable(self.model.as_mut())?;
        let cells = rows.max(1).checked_mul(cols.max(1));
        if cells.is_none_or(|n| n > MAX_CELLS) {
            return Err(Error::invalid(format!(
                "{rows}x{cols} exceeds the {MAX_CELLS}-cell limit"
            )));
        }
        m.resize(rows, cols);
        self.sync_attrs();
        Ok(())
    }

    // -- structural edits --------------------------------------------------

    /// Insert an empty column so that it becomes column `at`.
    ///
    /// `at` may equal the column count (append). Column attributes are not
    /// shifted with the content: the new default attribute lands at the end.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnlyModel`], [`Error::OutOfBounds`] unless
    /// `0 <= at <= cols`, or [`Error::InvalidArgument`] when the model has
    /// no rows. The model is unchanged on error.
    pub fn insert_column(&mut self, at: isize) -> Result<()> {
        let (rows, cols) = self.dimensions();
        let m = try_as_mutable(self.model.as_mut())?;
        let at = check_index(at, cols + 1, Axis::Column, cols)?;
        if rows == 0 {
            return Err(Error::invalid("no rows to hold a column"));
        }

        m.resize(rows, cols + 1);
        for r in 0..rows {
            for c in (at + 1..=cols).rev() {
                let v = m.cell_value(r, c - 1).to_owned();
                m.set_cell_value(r, c, &v)?;
            }
            m.set_cell_value(r, at, "")?;
        }
        self.sync_attrs();
        Ok(())
    }

    /// Insert an empty column right of `col`.
    ///
    /// # Errors
    ///
    /// As [`insert_column`](Self::insert_column), and [`Error::OutOfBounds`]
    /// for a negative `col`.
    pub fn open_right(&mut self, col: isize) -> Result<()> {
        let (_, cols) = self.dimensions();
        if col < 0 {
            return Err(Error::OutOfBounds { axis: Axis::Column, index: col, len: cols });
        }
        self.insert_column(col + 1)
    }

    /// Insert an empty row so that it becomes row `at`.
    ///
    /// Unlike columns, row attributes move with their rows and the new row
    /// gets the default attribute.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnlyModel`], or [`Error::OutOfBounds`] unless
    /// `0 <= at <= rows`.
    pub fn insert_row(&mut self, at: isize) -> Result<()> {
        let (rows, cols) = self.dimensions();
        // A model with no rows reports no columns either; give the new row
        // one column so it exists.
        let cols = if rows == 0 { cols.max(1) } else { cols };
        let m = try_as_mutable(self.model.as_mut())?;
        let at = check_index(at, rows + 1, Axis::Row, rows)?;

        m.resize(rows + 1, cols);
        for r in (at + 1..=rows).rev() {
            for c in 0..cols {
                let v = m.cell_value(r - 1, c).to_owned();
                m.set_cell_value(r, c, &v)?;
            }
        }
        for c in 0..cols {
            m.set_cell_value(at, c, "")?;
        }

        self.sync_attrs();
        self.row_attrs.pop();
        self.row_attrs.insert(at, SliceAttr::row_default());
        Ok(())
    }

    /// Insert an empty row below `row`.
    ///
    /// # Errors
    ///
    /// As [`insert_row`](Self::insert_row).
    pub fn open_down(&mut self, row: isize) -> Result<()> {
        let (rows, _) = self.dimensions();
        if row < 0 {
            return Err(Error::OutOfBounds { axis: Axis::Row, index: row, len: rows });
        }
        self.insert_row(row + 1)
    }

    /// Delete row `at`; the rows below move up with their attributes.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnlyModel`], or [`Error::OutOfBounds`] unless
    /// `0 <= at < rows`.
    pub fn delete_row(&mut self, at: isize) -> Result<()> {
        let (rows, cols) = self.dimensions();
        let m = try_as_mutable(self.model.as_mut())?;
        let at = check_index(at, rows, Axis::Row, rows)?;

        for r in at..rows - 1 {
            for c in 0..cols {
                let v = m.cell_value(r + 1, c).to_owned();
                m.set_cell_value(r, c, &v)?;
            }
            self.row_attrs[r] = self.row_attrs[r + 1];
        }
        m.resize(rows - 1, cols);
        self.sync_attrs();
        Ok(())
    }

    /// Delete column `at`; the columns to its right move left with their
    /// attributes.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnlyModel`], or [`Error::OutOfBounds`] unless
    /// `0 <= at < cols`.
    pub fn delete_col(&mut self, at: isize) -> Result<()> {
        let (rows, cols) = self.dimensions();
        let m = try_as_mutable(self.model.as_mut())?;
        let at = check_index(at, cols, Axis::Column, cols)?;

        for c in at..cols - 1 {
            for r in 0..rows {
                let v = m.cell_value(r, c + 1).to_owned();
                m.set_cell_value(r, c, &v)?;
            }
            self.col_attrs[c] = self.col_attrs[c + 1];
        }
        m.resize(rows, cols - 1);
        self.sync_attrs();
        Ok(())
    }

    fn sync_attrs(&mut self) {
        let (rows, cols) = self.model.dimensions();
        self.row_attrs.resize(rows, SliceAttr::row_default());
        self.col_attrs.resize(cols, SliceAttr::col_default());
    }
}

impl GridModel for ViewController {
    fn dimensions(&self) -> (usize, usize) {
        self.model.dimensions()
    }

    fn col_width(&self, col: usize) -> usize {
        self.col_attrs.get(col).map_or(DEFAULT_COL_SIZE, |a| a.size)
    }

    fn row_height(&self, row: usize) -> usize {
        self.row_attrs.get(row).map_or(DEFAULT_ROW_SIZE, |a| a.size)
    }

    fn cell_value(&self, row: usize, col: usize) -> &str {
        self.model.cell_value(row, col)
    }

    fn row_marker(&self, row: usize) -> Option<Color> {
        self.row_attrs.get(row).and_then(|a| a.marker.color())
    }
}

/// `index` as a usize when `0 <= index < limit`.
fn check_index(index: isize, limit: usize, axis: Axis, len: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < limit)
        .ok_or(Error::OutOfBounds { axis, index, len })
}

fn out_of_bounds(axis: Axis, index: usize, len: usize) -> Error {
    Error::OutOfBounds {
        axis,
        index: isize::try_from(index).unwrap_or(isize::MAX),
        len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReadOnlyModel, StdModel};
    use pretty_assertions::assert_eq;

    fn header() -> ViewController {
        ViewController::new(Box::new(StdModel::from_rows([["letters", "numbers", "greek"]])))
    }

    fn rows_of(vc: &ViewController) -> Vec<Vec<String>> {
        let (rows, cols) = vc.dimensions();
        (0..rows)
            .map(|r| (0..cols).map(|c| vc.cell_value(r, c).to_owned()).collect())
            .collect()
    }

    fn assert_attrs_in_sync(vc: &ViewController) {
        let (rows, cols) = vc.dimensions();
        assert_eq!(vc.row_attrs().len(), rows);
        assert_eq!(vc.col_attrs().len(), cols);
    }

    fn tall() -> ViewController {
        let mut vc = ViewController::new(Box::new(StdModel::from_rows([
            ["a0", "a1"],
            ["b0", "b1"],
            ["c0", "c1"],
        ])));
        vc.set_row_marker(0, Marker::Red).unwrap();
        vc.set_row_marker(1, Marker::Green).unwrap();
        vc.set_row_marker(2, Marker::Blue).unwrap();
        vc
    }

    // -- attributes ------------------------------------------------------------

    #[test]
    fn new_controller_has_default_attrs() {
        let vc = header();
        assert_attrs_in_sync(&vc);
        assert_eq!(vc.row_attrs()[0], SliceAttr::row_default());
        assert_eq!(vc.col_attrs()[2].size, DEFAULT_COL_SIZE);
    }

    #[test]
    fn column_width_is_clamped() {
        let mut vc = header();
        vc.set_col_width(1, 2).unwrap();
        assert_eq!(vc.col_attrs()[1].size, MIN_COL_SIZE);
        vc.set_col_width(1, 30).unwrap();
        assert_eq!(vc.col_width(1), 30);
        assert!(vc.set_col_width(3, 10).is_err());
    }

    #[test]
    fn marker_cycles() {
        assert_eq!(Marker::None.next(), Marker::Red);
        assert_eq!(Marker::Blue.next(), Marker::None);
        assert_eq!("green".parse::<Marker>().unwrap(), Marker::Green);
        assert!("pink".parse::<Marker>().is_err());
    }

    #[test]
    fn resize_keeps_surviving_attrs() {
        let mut vc = header();
        vc.set_col_width(0, 10).unwrap();
        vc.resize(3, 5).unwrap();
        assert_attrs_in_sync(&vc);
        assert_eq!(vc.col_attrs()[0].size, 10);
        assert_eq!(vc.col_attrs()[4], SliceAttr::col_default());
        vc.resize(1, 1).unwrap();
        assert_attrs_in_sync(&vc);
        assert_eq!(vc.col_attrs()[0].size, 10);
    }

    #[test]
    fn resize_twice_is_stable() {
        let mut vc = tall();
        vc.resize(2, 3).unwrap();
        let once = rows_of(&vc);
        vc.resize(2, 3).unwrap();
        assert_eq!(vc.dimensions(), (2, 3));
        assert_eq!(rows_of(&vc), once);
        assert_eq!(once, vec![vec!["a0", "a1", ""], vec!["b0", "b1", ""]]);
    }

    #[test]
    fn resize_past_cell_limit_is_refused() {
        for (rows, cols) in [(usize::MAX, 4), (usize::MAX / 4, 4), (MAX_CELLS + 1, 0), (0, MAX_CELLS + 1)] {
            let mut vc = tall();
            let err = vc.resize(rows, cols).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{rows}x{cols}: {err}");
            assert_eq!(vc.dimensions(), (3, 2));
        }
    }

    // -- insert column ---------------------------------------------------------

    #[test]
    fn insert_column_without_rows_is_refused() {
        let mut vc = ViewController::new(Box::new(StdModel::with_size(0, 0)));
        let err = vc.insert_column(0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(vc.dimensions(), (0, 0));
        assert!(!vc.is_dirty());
    }

    #[test]
    fn insert_column_at_each_position() {
        let cases = [
            (0, vec!["", "letters", "numbers", "greek"]),
            (1, vec!["letters", "", "numbers", "greek"]),
            (2, vec!["letters", "numbers", "", "greek"]),
            (3, vec!["letters", "numbers", "greek", ""]),
        ];
        for (at, expected) in cases {
            let mut vc = header();
            vc.insert_column(at).unwrap();
            assert_eq!(rows_of(&vc), vec![expected], "insert_column({at})");
            assert_attrs_in_sync(&vc);
        }
    }

    #[test]
    fn insert_column_out_of_range_leaves_model() {
        for at in [-1, 4] {
            let mut vc = header();
            let err = vc.insert_column(at).unwrap_err();
            assert!(matches!(err, Error::OutOfBounds { axis: Axis::Column, .. }));
            assert_eq!(rows_of(&vc), vec![vec!["letters", "numbers", "greek"]]);
        }
    }

    #[test]
    fn open_right_inserts_after_column() {
        let cases = [
            (1, vec!["letters", "numbers", "", "greek"]),
            (0, vec!["letters", "", "numbers", "greek"]),
            (2, vec!["letters", "numbers", "greek", ""]),
        ];
        for (col, expected) in cases {
            let mut vc = header();
            vc.open_right(col).unwrap();
            assert_eq!(rows_of(&vc), vec![expected], "open_right({col})");
        }
    }

    #[test]
    fn open_right_rejects_out_of_range() {
        for col in [-1, 3, 12] {
            let mut vc = header();
            assert!(vc.open_right(col).is_err(), "open_right({col})");
            assert_eq!(vc.dimensions(), (1, 3));
        }
    }

    #[test]
    fn insert_column_does_not_shift_attrs() {
        let mut vc = header();
        vc.set_col_width(1, 10).unwrap();
        vc.insert_column(0).unwrap();
        assert_eq!(vc.col_attrs()[1].size, 10);
        assert_eq!(vc.col_attrs()[3], SliceAttr::col_default());
    }

    // -- insert row ------------------------------------------------------------

    #[test]
    fn insert_row_moves_content_and_attrs() {
        let mut vc = tall();
        vc.insert_row(1).unwrap();
        assert_eq!(
            rows_of(&vc),
            vec![vec!["a0", "a1"], vec!["", ""], vec!["b0", "b1"], vec!["c0", "c1"]]
        );
        let markers: Vec<Marker> = vc.row_attrs().iter().map(|a| a.marker).collect();
        assert_eq!(markers, vec![Marker::Red, Marker::None, Marker::Green, Marker::Blue]);
    }

    #[test]
    fn open_down_appends_after_last_row() {
        let mut vc = tall();
        vc.open_down(2).unwrap();
        assert_eq!(vc.dimensions(), (4, 2));
        assert_eq!(vc.cell_value(3, 0), "");
        assert!(vc.open_down(-1).is_err());
        assert!(vc.insert_row(6).is_err());
    }

    #[test]
    fn insert_row_into_empty_model() {
        let mut vc = ViewController::new(Box::new(StdModel::with_size(0, 0)));
        vc.insert_row(0).unwrap();
        assert_eq!(vc.dimensions(), (1, 1));
        assert_attrs_in_sync(&vc);
    }

    // -- delete ----------------------------------------------------------------

    #[test]
    fn delete_row_attrs_follow_content() {
        let mut vc = tall();
        vc.delete_row(0).unwrap();
        assert_eq!(rows_of(&vc), vec![vec!["b0", "b1"], vec!["c0", "c1"]]);
        assert_eq!(vc.row_attrs()[0].marker, Marker::Green);
        assert_eq!(vc.row_attrs()[1].marker, Marker::Blue);
        assert_attrs_in_sync(&vc);
    }

    #[test]
    fn delete_col_attrs_follow_content() {
        let mut vc = header();
        vc.set_col_width(2, 9).unwrap();
        vc.delete_col(1).unwrap();
        assert_eq!(rows_of(&vc), vec![vec!["letters", "greek"]]);
        assert_eq!(vc.col_attrs()[1].size, 9);
        assert_attrs_in_sync(&vc);
    }

    #[test]
    fn delete_out_of_range_is_rejected() {
        let mut vc = tall();
        assert!(matches!(vc.delete_row(3), Err(Error::OutOfBounds { axis: Axis::Row, .. })));
        assert!(matches!(vc.delete_row(-1), Err(Error::OutOfBounds { .. })));
        assert!(matches!(vc.delete_col(2), Err(Error::OutOfBounds { axis: Axis::Column, .. })));
        assert_eq!(vc.dimensions(), (3, 2));
    }

    // -- capability --------------------------------------------------------------

    #[test]
    fn read_only_model_refuses_every_edit() {
        let model = ReadOnlyModel(Box::new(StdModel::from_rows([["x"]])));
        let mut vc = ViewController::new(Box::new(model));
        assert!(vc.is_read_only());
        assert!(matches!(vc.ensure_mutable(), Err(Error::ReadOnlyModel)));
        assert!(matches!(vc.set_cell_value(0, 0, "y"), Err(Error::ReadOnlyModel)));
        assert!(matches!(vc.resize(2, 2), Err(Error::ReadOnlyModel)));
        assert!(matches!(vc.insert_column(0), Err(Error::ReadOnlyModel)));
        assert!(matches!(vc.delete_row(0), Err(Error::ReadOnlyModel)));
        assert_eq!(vc.dimensions(), (1, 1));
        assert!(!vc.is_dirty());
    }

    #[test]
    fn mutable_model_passes_the_gate_untouched() {
        let mut vc = tall();
        vc.ensure_mutable().unwrap();
        assert!(!vc.is_dirty());
    }

    #[test]
    fn set_model_resyncs_attrs() {
        let mut vc = tall();
        vc.set_model(Box::new(StdModel::from_rows([["only"]])));
        assert_attrs_in_sync(&vc);
        assert_eq!(vc.row_attrs()[0].marker, Marker::Red);
    }
}
