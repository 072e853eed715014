//! Model sources: where a model is loaded from and saved to.
//!
//! Every source can describe itself and read a model. Sources that can also
//! be written expose that through [`ModelSource::as_writable`], the same
//! capability split the models use.
//!
//! | Codec  | Read | Write | Format                          |
//! |--------|------|-------|---------------------------------|
//! | `csv`  | yes  | yes   | RFC 4180, comma separated       |
//! | `tsv`  | yes  | yes   | RFC 4180 quoting, tab separated |
//! | `jira` | no   | yes   | Jira wiki table markup          |

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::error::{Error, Result};
use crate::model::{StdModel, TabularModel};

/// Something a model can be read from.
pub trait ModelSource: fmt::Display {
    /// Load the model.
    ///
    /// # Errors
    ///
    /// I/O and parse failures.
    fn read(&self) -> Result<Box<dyn TabularModel>>;

    /// The write capability, if this source has one.
    fn as_writable(&self) -> Option<&dyn WritableModelSource> {
        None
    }
}

/// A source that can also store a model.
pub trait WritableModelSource: ModelSource {
    /// Replace the stored contents with `model`.
    ///
    /// # Errors
    ///
    /// I/O failures.
    fn write(&self, model: &dyn TabularModel) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// A named file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Csv,
    Tsv,
    Jira,
}

impl Codec {
    /// A source for `path` in this format.
    #[must_use]
    pub fn source(self, path: impl Into<PathBuf>) -> Box<dyn ModelSource> {
        let path = path.into();
        match self {
            Self::Csv => Box::new(DelimitedFileSource::new(path, b',')),
            Self::Tsv => Box::new(DelimitedFileSource::new(path, b'\t')),
            Self::Jira => Box::new(JiraTableSource { path, header: true }),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Jira => "jira",
        }
    }
}

impl FromStr for Codec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "jira" => Ok(Self::Jira),
            other => Err(Error::UnrecognizedCodec(other.to_owned())),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The file name without its directory, for the status line.
fn base_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    )
}

// ---------------------------------------------------------------------------
// DelimitedFileSource
// ---------------------------------------------------------------------------

/// A delimited text file (CSV, TSV).
#[derive(Debug, Clone)]
pub struct DelimitedFileSource {
    path: PathBuf,
    delimiter: u8,
}

impl DelimitedFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            delimiter,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for DelimitedFileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base_name(&self.path))
    }
}

impl ModelSource for DelimitedFileSource {
    /// A missing or empty file reads as a single empty cell.
    fn read(&self) -> Result<Box<dyn TabularModel>> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "new file");
            return Ok(Box::new(StdModel::default()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_owned).collect());
        }

        let model = if rows.is_empty() {
            StdModel::default()
        } else {
            StdModel::from_rows(rows)
        };
        let (r, c) = model.dimensions();
        info!(path = %self.path.display(), rows = r, cols = c, "loaded");
        Ok(Box::new(model))
    }

    fn as_writable(&self) -> Option<&dyn WritableModelSource> {
        Some(self)
    }
}

impl WritableModelSource for DelimitedFileSource {
    fn write(&self, model: &dyn TabularModel) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(&self.path)?;

        let (rows, cols) = model.dimensions();
        for r in 0..rows {
            writer.write_record((0..cols).map(|c| model.cell_value(r, c)))?;
        }
        writer.flush()?;
        info!(path = %self.path.display(), rows, cols, "saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JiraTableSource
// ---------------------------------------------------------------------------

/// Jira wiki table markup. Write-only.
#[derive(Debug, Clone)]
pub struct JiraTableSource {
    pub path: PathBuf,
    /// Render the first row with `||` header separators.
    pub header: bool,
}

impl fmt::Display for JiraTableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&base_name(&self.path))
    }
}

impl ModelSource for JiraTableSource {
    fn read(&self) -> Result<Box<dyn TabularModel>> {
        Err(Error::invalid("jira tables cannot be read"))
    }

    fn as_writable(&self) -> Option<&dyn WritableModelSource> {
        Some(self)
    }
}

impl WritableModelSource for JiraTableSource {
    fn write(&self, model: &dyn TabularModel) -> Result<()> {
        let mut out = BufWriter::new(File::create(&self.path)?);
        let (rows, cols) = model.dimensions();
        for r in 0..rows {
            let sep = if r == 0 && self.header { "||" } else { "|" };
            let cells: Vec<&str> = (0..cols).map(|c| model.cell_value(r, c)).collect();
            writeln!(out, "{sep} {} {sep}", cells.join(&format!(" {sep} ")))?;
        }
        out.flush()?;
        info!(path = %self.path.display(), rows, "saved jira table");
        Ok(())
    }
}
