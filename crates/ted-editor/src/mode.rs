//! The session's input mode.
//!
//! | Mode  | Keys go to                    | Bottom line   |
//! |-------|-------------------------------|---------------|
//! | Grid  | key bindings → commands       | message view  |
//! | Entry | the text entry, exclusively   | prompt        |

use std::fmt;

/// Where key presses are routed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Keys are looked up in the key bindings. Unbound keys are ignored.
    #[default]
    Grid,
    /// A prompt is open and owns every key until it is confirmed or
    /// cancelled.
    Entry,
}

impl Mode {
    /// Human-readable name for the status line.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Grid => "GRID",
            Self::Entry => "ENTRY",
        }
    }

    #[must_use]
    pub const fn is_entry(self) -> bool {
        matches!(self, Self::Entry)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
