//! The editor's error type.
//!
//! Every command returns [`Result`]. Nothing here is fatal: the session
//! catches each error at the dispatch boundary and shows it on the message
//! line.

use std::fmt;
use std::io;

/// Which dimension an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => f.write_str("row"),
            Self::Column => f.write_str("column"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("model is read-only")]
    ReadOnlyModel,

    #[error("no such command: {0}")]
    NoSuchCommand(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{axis} {index} out of bounds (0..{len})")]
    OutOfBounds { axis: Axis, index: isize, len: usize },

    #[error("bad pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("unrecognised codec: {0}")]
    UnrecognizedCodec(String),

    #[error("{0} cannot be written")]
    SourceNotWritable(String),

    #[error("unsaved changes (use force-quit to discard)")]
    UnsavedChanges,

    #[error("script: {0}")]
    Script(String),

    #[error("at ({col}, {row}): {source}")]
    RowFailed {
        col: usize,
        row: usize,
        source: Box<Error>,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidArgument`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        let msg = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => Self::Io(io),
            _ => Self::Io(io::Error::new(io::ErrorKind::InvalidData, msg)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
