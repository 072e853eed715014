//! Frame: the screen furniture around the grid.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ grid (client)                        │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ status bar                           │  south: vertical stack
//! │ message view  |  prompt (Entry mode) │
//! └──────────────────────────────────────┘
//! ```
//!
//! The frame owns the widgets and the mode; the session owns the model and
//! decides what goes into them.

use std::fmt;
use std::io;

use ted_term::cell::{Color, Style};
use ted_term::driver::Driver;
use ted_ui::entry::{PromptOptions, TextEntry};
use ted_ui::grid::{GridModel, GridView, GridViewport};
use ted_ui::layout::{DockLayout, VertLinearLayout};
use ted_ui::widgets::{StatusBar, TextView};
use ted_ui::{Component, DrawContext};

use crate::mode::Mode;

/// What to ask the user: prompt text, starting value, and entry behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptRequest {
    pub prompt: String,
    pub initial: String,
    pub options: PromptOptions,
}

impl PromptRequest {
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn initial(mut self, value: impl Into<String>) -> Self {
        self.initial = value.into();
        self
    }

    #[must_use]
    pub const fn cancel_on_empty_backspace(mut self) -> Self {
        self.options.cancel_on_empty_backspace = true;
        self
    }
}

#[derive(Debug, Default)]
pub struct Frame {
    grid: GridViewport,
    status: StatusBar,
    message: TextView,
    entry: TextEntry,
    mode: Mode,
}

impl Frame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn grid(&self) -> &GridViewport {
        &self.grid
    }

    pub const fn grid_mut(&mut self) -> &mut GridViewport {
        &mut self.grid
    }

    #[must_use]
    pub const fn entry(&self) -> &TextEntry {
        &self.entry
    }

    pub const fn entry_mut(&mut self) -> &mut TextEntry {
        &mut self.entry
    }

    /// Text of the message line.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message.text
    }

    // -- mode ---------------------------------------------------------------

    /// Open the prompt and switch to Entry mode.
    pub fn open_prompt(&mut self, request: &PromptRequest) {
        self.entry.reset(&request.prompt, &request.initial, request.options);
        self.mode = Mode::Entry;
    }

    /// Close the prompt and return to Grid mode.
    pub fn exit_entry(&mut self) {
        self.mode = Mode::Grid;
    }

    // -- messages -----------------------------------------------------------

    pub fn show_message(&mut self, msg: impl Into<String>) {
        self.message.set(msg, Style::DEFAULT);
    }

    pub fn show_error(&mut self, err: &dyn fmt::Display) {
        self.message.set(err.to_string(), Style::DEFAULT.fg(Color::Red));
    }

    pub fn set_status(&mut self, left: String, right: String) {
        self.status.left = left;
        self.status.right = right;
    }

    // -- drawing ------------------------------------------------------------

    /// Measure and draw the whole screen, then sync it.
    ///
    /// # Errors
    ///
    /// Fails when the driver cannot write.
    pub fn redraw(&mut self, driver: &mut dyn Driver, model: &dyn GridModel) -> io::Result<()> {
        let (width, height) = driver.size();
        {
            let mut ctx = DrawContext::new(driver);
            ctx.hide_cursor();

            let mut grid = GridView {
                viewport: &mut self.grid,
                model,
            };
            let bottom: &mut dyn Component = match self.mode {
                Mode::Grid => &mut self.message,
                Mode::Entry => &mut self.entry,
            };
            let mut south = VertLinearLayout::new().with(&mut self.status).with(bottom);
            let mut root = DockLayout::new().client(&mut grid).south(&mut south);

            root.remeasure(width, height);
            root.redraw(&mut ctx);
        }
        driver.sync()
    }
}
