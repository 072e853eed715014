//! Tabular models: the 2D cell storage behind the grid.
//!
//! [`TabularModel`] is the read surface every model offers. Mutation is a
//! separate capability, [`MutableModel`], which a model may or may not
//! expose. Callers ask with [`TabularModel::as_mutable_mut`] (or the
//! [`try_as_mutable`] helper that turns "no" into [`Error::ReadOnlyModel`])
//! and never assume.
//!
//! [`StdModel`] is the in-memory row-major model loaded from files.
//! [`ReadOnlyModel`] wraps any model and hides its mutable surface.

use crate::error::{Axis, Error, Result};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read access to a grid of string cells.
pub trait TabularModel {
    /// `(rows, cols)`.
    fn dimensions(&self) -> (usize, usize);

    /// The value at `(row, col)`, `""` when out of range.
    fn cell_value(&self, row: usize, col: usize) -> &str;

    /// The mutable capability, if this model has one.
    fn as_mutable(&self) -> Option<&dyn MutableModel> {
        None
    }

    /// The mutable capability, if this model has one.
    fn as_mutable_mut(&mut self) -> Option<&mut dyn MutableModel> {
        None
    }
}

/// The mutation surface of a model.
pub trait MutableModel: TabularModel {
    /// Resize to `rows × cols`, keeping every value inside both the old and
    /// the new bounds and filling new cells with `""`.
    fn resize(&mut self, rows: usize, cols: usize);

    /// Set one cell.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] when `(row, col)` is outside the model.
    fn set_cell_value(&mut self, row: usize, col: usize, value: &str) -> Result<()>;

    /// Whether the model changed since it was loaded or last saved.
    fn is_dirty(&self) -> bool;

    /// Record that the current contents are saved.
    fn mark_saved(&mut self);
}

/// The mutable capability of `model`, or [`Error::ReadOnlyModel`].
///
/// # Errors
///
/// [`Error::ReadOnlyModel`] when the model has no mutable surface.
pub fn try_as_mutable(model: &mut dyn TabularModel) -> Result<&mut dyn MutableModel> {
    model.as_mutable_mut().ok_or(Error::ReadOnlyModel)
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One cell of a [`StdModel`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub value: String,
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self {
            value: value.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// StdModel
// ---------------------------------------------------------------------------

/// An in-memory, row-major model. Every row has the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdModel {
    cells: Vec<Vec<Cell>>,
    dirty: bool,
}

impl StdModel {
    /// A `rows × cols` model of empty cells.
    #[must_use]
    pub fn with_size(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![vec![Cell::default(); cols]; rows],
            dirty: false,
        }
    }

    /// Build from rows of strings. Short rows are padded with `""` to the
    /// longest row's length.
    #[must_use]
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cells: Vec<Vec<Cell>> = rows
            .into_iter()
            .map(|r| r.into_iter().map(|s| Cell::from(s.as_ref())).collect())
            .collect();
        let cols = cells.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut cells {
            row.resize(cols, Cell::default());
        }
        Self { cells, dirty: false }
    }

    /// Rows as plain strings, for writers and tests.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|r| r.iter().map(|c| c.value.clone()).collect())
            .collect()
    }
}

impl Default for StdModel {
    /// A single empty cell.
    fn default() -> Self {
        Self::with_size(1, 1)
    }
}

impl TabularModel for StdModel {
    fn dimensions(&self) -> (usize, usize) {
        self.cells.first().map_or((0, 0), |r| (self.cells.len(), r.len()))
    }

    fn cell_value(&self, row: usize, col: usize) -> &str {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .map_or("", |c| c.value.as_str())
    }

    fn as_mutable(&self) -> Option<&dyn MutableModel> {
        Some(self)
    }

    fn as_mutable_mut(&mut self) -> Option<&mut dyn MutableModel> {
        Some(self)
    }
}

impl MutableModel for StdModel {
    fn resize(&mut self, rows: usize, cols: usize) {
        self.cells.resize_with(rows, Vec::new);
        for row in &mut self.cells {
            row.resize(cols, Cell::default());
        }
        self.dirty = true;
    }

    fn set_cell_value(&mut self, row: usize, col: usize, value: &str) -> Result<()> {
        let (rows, cols) = self.dimensions();
        let cell = self
            .cells
            .get_mut(row)
            .ok_or_else(|| out_of_bounds(Axis::Row, row, rows))?
            .get_mut(col)
            .ok_or_else(|| out_of_bounds(Axis::Column, col, cols))?;
        value.clone_into(&mut cell.value);
        self.dirty = true;
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn mark_saved(&mut self) {
        self.dirty = false;
    }
}

fn out_of_bounds(axis: Axis, index: usize, len: usize) -> Error {
    Error::OutOfBounds {
        axis,
        index: isize::try_from(index).unwrap_or(isize::MAX),
        len,
    }
}

// ---------------------------------------------------------------------------
// ReadOnlyModel
// ---------------------------------------------------------------------------

/// Wraps a model and withholds its mutable capability.
pub struct ReadOnlyModel(pub Box<dyn TabularModel>);

impl TabularModel for ReadOnlyModel {
    fn dimensions(&self) -> (usize, usize) {
        self.0.dimensions()
    }

    fn cell_value(&self, row: usize, col: usize) -> &str {
        self.0.cell_value(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> StdModel {
        StdModel::from_rows([["a", "b", "c"], ["d", "e", "f"]])
    }

    #[test]
    fn default_is_single_empty_cell() {
        let m = StdModel::default();
        assert_eq!(m.dimensions(), (1, 1));
        assert_eq!(m.cell_value(0, 0), "");
        assert!(!m.is_dirty());
    }

    #[test]
    fn ragged_rows_are_padded() {
        let m = StdModel::from_rows(vec![vec!["x"], vec!["y", "z", "w"]]);
        assert_eq!(m.dimensions(), (2, 3));
        assert_eq!(m.rows(), vec![vec!["x", "", ""], vec!["y", "z", "w"]]);
    }

    #[test]
    fn out_of_range_reads_are_empty() {
        let m = sample();
        assert_eq!(m.cell_value(5, 0), "");
        assert_eq!(m.cell_value(0, 5), "");
    }

    #[test]
    fn resize_keeps_overlap() {
        let mut m = sample();
        m.resize(3, 2);
        assert_eq!(m.rows(), vec![vec!["a", "b"], vec!["d", "e"], vec!["", ""]]);
        m.resize(1, 4);
        assert_eq!(m.rows(), vec![vec!["a", "b", "", ""]]);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut m = sample();
        m.resize(4, 5);
        let once = m.rows();
        m.resize(4, 5);
        m.resize(4, 5);
        assert_eq!(m.dimensions(), (4, 5));
        assert_eq!(m.rows(), once);
        assert_eq!(m.cell_value(1, 2), "f");
    }

    #[test]
    fn resize_to_zero_rows() {
        let mut m = sample();
        m.resize(0, 3);
        assert_eq!(m.dimensions(), (0, 0));
    }

    #[test]
    fn set_cell_marks_dirty_and_checks_bounds() {
        let mut m = sample();
        m.set_cell_value(1, 1, "E").unwrap();
        assert_eq!(m.cell_value(1, 1), "E");
        assert!(m.is_dirty());
        m.mark_saved();
        assert!(!m.is_dirty());

        let err = m.set_cell_value(2, 0, "x").unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { axis: Axis::Row, index: 2, len: 2 }));
        let err = m.set_cell_value(0, 3, "x").unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { axis: Axis::Column, index: 3, len: 3 }));
    }

    #[test]
    fn read_only_wrapper_hides_mutation() {
        let mut ro = ReadOnlyModel(Box::new(sample()));
        assert_eq!(ro.cell_value(0, 2), "c");
        assert!(ro.as_mutable().is_none());
        assert!(matches!(try_as_mutable(&mut ro), Err(Error::ReadOnlyModel)));
    }

    #[test]
    fn std_model_exposes_mutation() {
        let mut m = sample();
        let handle = try_as_mutable(&mut m).unwrap();
        handle.resize(1, 1);
        assert_eq!(m.dimensions(), (1, 1));
    }
}
