//! Log file setup.
//!
//! The terminal belongs to the editor while it runs, so the log goes to a
//! file: `--log-file` when given, else `<cache dir>/ted/ted.log`. The level
//! filter comes from `TED_LOG` (default `info`). Lines are written on the
//! event thread as they are emitted. Any failure here leaves the editor
//! running without a log.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const FILTER_ENV: &str = "TED_LOG";
const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber.
pub fn init(override_path: Option<&Path>) {
    let Some(path) = log_path(override_path) else {
        eprintln!("ted: warning: no cache directory, logging disabled");
        return;
    };

    let writer = match open(&path) {
        Ok(writer) => writer,
        Err(e) => {
            eprintln!("ted: warning: logging disabled: {e:#}");
            return;
        }
    };

    let filter =
        EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let layer = fmt::layer().with_writer(writer).with_ansi(false).with_target(true);

    if let Err(e) = tracing_subscriber::registry().with(filter).with(layer).try_init() {
        eprintln!("ted: warning: logging disabled: {e}");
    }
}

fn log_path(override_path: Option<&Path>) -> Option<PathBuf> {
    override_path
        .map(Path::to_path_buf)
        .or_else(|| dirs::cache_dir().map(|d| d.join("ted").join("ted.log")))
}

fn open(path: &Path) -> anyhow::Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?;

    std::fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("cannot open {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn override_wins() {
        let p = Path::new("/tmp/x/ted.log");
        assert_eq!(log_path(Some(p)), Some(p.to_path_buf()));
    }

    #[test]
    fn default_lives_under_cache() {
        if let Some(cache) = dirs::cache_dir() {
            assert_eq!(log_path(None), Some(cache.join("ted").join("ted.log")));
        }
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("ted.log");
        let _writer = open(&path).unwrap();
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn lines_reach_the_file_immediately() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ted.log");
        let mut writer = open(&path).unwrap();
        writer.write_all(b"opened table\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "opened table\n");
    }

    #[test]
    fn open_rejects_path_without_file_name() {
        assert!(open(Path::new("/")).is_err());
    }
}
