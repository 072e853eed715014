//! Cell search and regex replace.
//!
//! Searching visits cells in row-major order starting just after (or
//! before) the current cell. With wrapping on, every cell is visited once,
//! the starting cell last, so a lone match anywhere in the model is always
//! found.

use regex::{Regex, RegexBuilder};

use crate::error::Result;
use crate::model::TabularModel;
use crate::viewctrl::ViewController;

/// Search direction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchDirection {
    Forward,
    Backward,
}

/// Compile a search pattern.
///
/// # Errors
///
/// [`Error::Pattern`](crate::Error::Pattern) when the regex is malformed.
pub fn compile(pattern: &str, ignore_case: bool) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern).case_insensitive(ignore_case).build()?)
}

/// Find the next cell whose value matches `re`, as `(row, col)`.
///
/// Without `wrap` the scan stops at the first or last cell of the model.
#[must_use]
pub fn find(
    model: &dyn TabularModel,
    re: &Regex,
    from: (usize, usize),
    direction: SearchDirection,
    wrap: bool,
) -> Option<(usize, usize)> {
    let (rows, cols) = model.dimensions();
    let total = rows * cols;
    if total == 0 {
        return None;
    }
    let start = (from.0 * cols + from.1).min(total - 1);

    for step in 1..=total {
        let idx = match direction {
            SearchDirection::Forward => {
                let i = start + step;
                if i >= total && !wrap {
                    return None;
                }
                i % total
            }
            SearchDirection::Backward => {
                if step > start && !wrap {
                    return None;
                }
                (start + total - step) % total
            }
        };
        let (row, col) = (idx / cols, idx % cols);
        if re.is_match(model.cell_value(row, col)) {
            return Some((row, col));
        }
    }
    None
}

/// Replace every match of `re` in every cell. Returns the number of
/// matches replaced.
///
/// # Errors
///
/// [`Error::ReadOnlyModel`](crate::Error::ReadOnlyModel) before anything is
/// scanned, or an error from setting a cell.
pub fn replace_all(view: &mut ViewController, re: &Regex, replacement: &str) -> Result<usize> {
    view.ensure_mutable()?;
    let (rows, cols) = view.dimensions();
    let mut count = 0;
    for row in 0..rows {
        for col in 0..cols {
            let value = view.cell_value(row, col);
            let n = re.find_iter(value).count();
            if n == 0 {
                continue;
            }
            let replaced = re.replace_all(value, replacement).into_owned();
            view.set_cell_value(row, col, &replaced)?;
            count += n;
        }
    }
    Ok(count)
}
