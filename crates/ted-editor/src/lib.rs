//! ted-editor: the editing engine behind ted.
//!
//! A [`Session`] owns one table: the [`model`] holding cell text, the
//! [`viewctrl`] layer that keeps per-row and per-column display attributes
//! in step with structural edits, and the [`source`] it was read from and
//! saves to. Keys are looked up in a [`command::CommandRegistry`] and run
//! as named commands; the same commands are reachable from the `:` line,
//! from `each-row`, and from the [`script`] bridge.
//!
//! - [`model`]: cell storage and the read-only wrapper
//! - [`viewctrl`]: structural edits with attribute bookkeeping
//! - [`source`]: CSV, TSV, and Jira-table codecs
//! - [`command`] / [`commands`]: registry, tokenizer, built-in command set
//! - [`session`] / [`frame`]: the modal state machine and its screen
//! - [`search`], [`options`], [`script`]: supporting services

pub mod command;
pub mod commands;
pub mod error;
pub mod frame;
pub mod mode;
pub mod model;
pub mod options;
pub mod script;
pub mod search;
pub mod session;
pub mod source;
pub mod viewctrl;

pub use error::{Error, Result};
pub use session::Session;
