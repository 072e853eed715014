// SPDX-License-Identifier: MIT
//
// ted-term: terminal driver for ted.
//
// The thin hardware-facing layer underneath the editor: raw mode and the
// alternate screen, a byte-level key parser, a cell frame buffer, and a
// differential renderer that writes only the cells that changed since the
// last sync. Everything above this crate talks to the screen through the
// `Driver` trait, so the editing engine can run against the real terminal
// or against the in-memory `HeadlessDriver` in tests.
//
// No background threads: input is read with `poll(2)` on the caller's
// thread, which is the one blocking call the whole editor waits on.

pub mod ansi;
pub mod buffer;
pub mod cell;
pub mod diff;
pub mod driver;
pub mod input;
pub mod terminal;
