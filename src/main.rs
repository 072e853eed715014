// SPDX-License-Identifier: MIT
//
// ted: a modal terminal editor for tabular data.
//
// This is the main binary that wires the crates together:
//
//   ted-term   → raw mode, key parsing, differential output
//   ted-ui     → grid viewport, prompt, status widgets (via ted-editor)
//   ted-editor → model, codecs, commands, the modal session
//
// Startup order matters: the file is read before the terminal is touched,
// so a bad file reports on a normal screen. Logging goes to a file because
// the editor owns stdout while it runs.
//
//   ┌──────────────────────────────┐
//   │ column header                │
//   │ row header │ cells …         │  ← grid viewport
//   ├──────────────────────────────┤
//   │ status line                  │  ← source, mode, position
//   ├──────────────────────────────┤
//   │ message / prompt line        │
//   └──────────────────────────────┘

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ted_editor::Session;
use ted_editor::source::Codec;
use ted_term::driver::{Driver, TermDriver};
use tracing::info;

// ─── CLI ────────────────────────────────────────────────────────────────────

/// File formats that can be opened for editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
}

impl From<Format> for Codec {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => Self::Csv,
            Format::Tsv => Self::Tsv,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ted", version, about = "A modal terminal editor for tabular data")]
struct Cli {
    /// File to edit; created on first save if it does not exist
    file: PathBuf,

    /// Format of FILE
    #[arg(long, short = 'c', value_enum, default_value_t = Format::Csv)]
    codec: Format,

    /// Refuse every edit
    #[arg(long, short = 'r')]
    read_only: bool,

    /// Write the log here instead of the cache directory (filter with TED_LOG)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "fatal");
            eprintln!("ted: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let codec = Codec::from(cli.codec);
    info!(file = %cli.file.display(), %codec, read_only = cli.read_only, "starting");

    let mut session = Session::open(codec.source(&cli.file), cli.read_only)
        .with_context(|| format!("cannot open {}", cli.file.display()))?;

    let mut driver = TermDriver::new();
    driver.init().context("failed to initialize terminal")?;
    let result = session.run(&mut driver);
    driver.close().context("failed to restore terminal")?;
    result.context("terminal I/O failed")?;

    info!("exit");
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
