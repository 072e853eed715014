//! Session: the modal state machine tying model, frame, and commands
//! together.
//!
//! One session runs per editor process. Every input event goes through
//! [`Session::key_pressed`]:
//!
//! - **Grid mode**: the key is looked up in the key bindings and the bound
//!   command runs. Unbound keys are ignored.
//! - **Entry mode**: the key goes to the prompt and nothing else. Enter
//!   closes the prompt and runs the pending continuation with the typed
//!   text; cancelling closes it and drops the continuation unrun.
//!
//! Errors from commands and continuations never escape: they are logged and
//! shown on the message line. After each event the whole screen is redrawn.

use std::fmt;
use std::io;

use ted_term::driver::{Driver, Event};
use ted_term::input::KeyEvent;
use ted_ui::entry::EntryEvent;
use tracing::{debug, info, warn};

use crate::command::{CommandRegistry, KeyBinding};
use crate::commands;
use crate::error::{Error, Result};
use crate::frame::{Frame, PromptRequest};
use crate::mode::Mode;
use crate::model::{ReadOnlyModel, TabularModel};
use crate::options::Options;
use crate::script::ScriptHost;
use crate::search::{self, SearchDirection};
use crate::source::{Codec, ModelSource};
use crate::viewctrl::ViewController;

/// Runs once with the confirmed prompt text.
pub type Continuation = Box<dyn FnOnce(&mut Session, String) -> Result<()>>;

/// An open prompt and what to do with its answer.
pub struct PendingPrompt {
    pub request: PromptRequest,
    then: Continuation,
}

impl fmt::Debug for PendingPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingPrompt")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

pub struct Session {
    view: ViewController,
    source: Box<dyn ModelSource>,
    read_only: bool,
    frame: Frame,
    registry: CommandRegistry,
    options: Options,
    pending: Option<PendingPrompt>,
    clipboard: Option<String>,
    last_search: Option<String>,
    quit: bool,
}

impl Session {
    /// A session over an already-loaded model, with the built-in commands
    /// and key bindings.
    #[must_use]
    pub fn new(source: Box<dyn ModelSource>, model: Box<dyn TabularModel>) -> Self {
        Self {
            view: ViewController::new(model),
            source,
            read_only: false,
            frame: Frame::new(),
            registry: commands::builtin(),
            options: Options::default(),
            pending: None,
            clipboard: None,
            last_search: None,
            quit: false,
        }
    }

    /// Read `source` and start a session over it. With `read_only` the
    /// model is wrapped so that every edit is refused.
    ///
    /// # Errors
    ///
    /// Whatever reading the source fails with.
    pub fn open(source: Box<dyn ModelSource>, read_only: bool) -> Result<Self> {
        let model = Self::load(source.as_ref(), read_only)?;
        let mut session = Self::new(source, model);
        session.read_only = read_only;
        session.show_cell_value();
        Ok(session)
    }

    fn load(source: &dyn ModelSource, read_only: bool) -> Result<Box<dyn TabularModel>> {
        let model = source.read()?;
        Ok(if read_only {
            Box::new(ReadOnlyModel(model))
        } else {
            model
        })
    }

    // -- accessors ----------------------------------------------------------

    #[must_use]
    pub const fn view(&self) -> &ViewController {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut ViewController {
        &mut self.view
    }

    #[must_use]
    pub const fn frame(&self) -> &Frame {
        &self.frame
    }

    #[must_use]
    pub const fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    pub const fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    #[must_use]
    pub fn source(&self) -> &dyn ModelSource {
        self.source.as_ref()
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.frame.mode()
    }

    /// The open prompt, if any.
    #[must_use]
    pub fn pending_prompt(&self) -> Option<&PromptRequest> {
        self.pending.as_ref().map(|p| &p.request)
    }

    #[must_use]
    pub fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    pub fn set_clipboard(&mut self, value: String) {
        self.clipboard = Some(value);
    }

    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.quit
    }

    /// Text currently on the message line.
    #[must_use]
    pub fn message(&self) -> &str {
        self.frame.message()
    }

    /// The selected cell as `(row, col)`.
    #[must_use]
    pub const fn cursor(&self) -> (usize, usize) {
        let (x, y) = self.frame.grid().cell_position();
        (y, x)
    }

    // -- cursor -------------------------------------------------------------

    pub fn move_by(&mut self, dx: isize, dy: isize) {
        self.frame.grid_mut().move_by(&self.view, dx, dy);
    }

    pub fn move_to(&mut self, x: isize, y: isize) {
        self.frame.grid_mut().move_to(&self.view, x, y);
    }

    /// Pull the cursor back inside the model after it shrank.
    pub fn clamp_cursor(&mut self) {
        self.frame.grid_mut().clamp_to(&self.view);
    }

    /// The selected cell's text.
    #[must_use]
    pub fn current_value(&self) -> &str {
        self.frame.grid().current_cell_value(&self.view)
    }

    /// Set the selected cell.
    ///
    /// # Errors
    ///
    /// [`Error::ReadOnlyModel`], or [`Error::OutOfBounds`] on an empty model.
    pub fn set_current_value(&mut self, value: &str) -> Result<()> {
        let (row, col) = self.cursor();
        self.view.set_cell_value(row, col, value)
    }

    // -- messages -----------------------------------------------------------

    pub fn show_message(&mut self, msg: impl Into<String>) {
        self.frame.show_message(msg);
    }

    pub fn show_cell_value(&mut self) {
        let value = self.current_value().to_owned();
        self.frame.show_message(value);
    }

    fn report(&mut self, err: &Error) {
        warn!(error = %err, "command failed");
        self.frame.show_error(err);
    }

    // -- prompting ----------------------------------------------------------

    /// Open a prompt. `then` runs with the text on Enter; on cancel it is
    /// dropped without running. A prompt opened while another is pending
    /// replaces it.
    pub fn prompt(
        &mut self,
        request: PromptRequest,
        then: impl FnOnce(&mut Self, String) -> Result<()> + 'static,
    ) {
        debug!(prompt = %request.prompt, "prompt");
        self.frame.open_prompt(&request);
        self.pending = Some(PendingPrompt {
            request,
            then: Box::new(then),
        });
    }

    // -- input --------------------------------------------------------------

    /// Route one key press according to the current mode.
    pub fn key_pressed(&mut self, key: KeyEvent) {
        match self.frame.mode() {
            Mode::Grid => self.grid_key(key),
            Mode::Entry => self.entry_key(key),
        }
    }

    fn grid_key(&mut self, key: KeyEvent) {
        let binding = KeyBinding::from(key);
        let Some(cmd) = self.registry.key_mapping(binding) else {
            debug!(key = %binding, "unbound key");
            return;
        };
        debug!(key = %binding, command = cmd.name, "key");
        if let Err(err) = self.invoke(cmd.name, Vec::new()) {
            self.report(&err);
        }
    }

    fn entry_key(&mut self, key: KeyEvent) {
        match self.frame.entry_mut().handle_key(key) {
            EntryEvent::Pending => {}
            EntryEvent::Confirmed(text) => {
                self.frame.exit_entry();
                if let Some(pending) = self.pending.take() {
                    if let Err(err) = (pending.then)(self, text) {
                        self.report(&err);
                    }
                }
            }
            EntryEvent::Cancelled => {
                debug!("prompt cancelled");
                self.frame.exit_entry();
                self.pending = None;
            }
        }
    }

    // -- drawing and the event loop -----------------------------------------

    fn update_status(&mut self) {
        let mut left = format!(" {}", self.source);
        if self.view.is_dirty() {
            left.push_str(" [+]");
        }
        if self.view.is_read_only() {
            left.push_str(" [RO]");
        }
        let (row, col) = self.cursor();
        let (rows, cols) = self.view.dimensions();
        let right = format!("{}  {row}:{col}  {rows}x{cols} ", self.frame.mode());
        self.frame.set_status(left, right);
    }

    /// Draw the whole screen.
    ///
    /// # Errors
    ///
    /// Fails when the driver cannot write.
    pub fn redraw(&mut self, driver: &mut dyn Driver) -> io::Result<()> {
        self.update_status();
        self.frame.redraw(driver, &self.view)
    }

    /// Draw, then handle events until a quit command runs or input ends.
    ///
    /// # Errors
    ///
    /// Driver failures other than end of input.
    pub fn run(&mut self, driver: &mut dyn Driver) -> io::Result<()> {
        self.redraw(driver)?;
        while !self.quit {
            match driver.wait_for_event() {
                Ok(Event::Key(key)) => self.key_pressed(key),
                Ok(Event::Resize(w, h)) => debug!(w, h, "resize"),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    info!("input closed");
                    break;
                }
                Err(e) => return Err(e),
            }
            self.redraw(driver)?;
        }
        Ok(())
    }

    // -- search -------------------------------------------------------------

    /// Remember `pattern` as the search and jump to its next match.
    ///
    /// # Errors
    ///
    /// [`Error::Pattern`] for a bad regex (the old search is kept), or
    /// [`Error::NotFound`].
    pub fn search_for(&mut self, pattern: &str) -> Result<()> {
        search::compile(pattern, self.options.ignore_case)?;
        self.last_search = Some(pattern.to_owned());
        self.search_next(SearchDirection::Forward)
    }

    /// Jump to the next match of the last search. The cursor does not move
    /// when nothing matches.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] with no previous search, or
    /// [`Error::NotFound`].
    pub fn search_next(&mut self, direction: SearchDirection) -> Result<()> {
        let pattern = self
            .last_search
            .clone()
            .ok_or_else(|| Error::invalid("no previous search"))?;
        let re = search::compile(&pattern, self.options.ignore_case)?;
        let (row, col) = search::find(
            self.view.model(),
            &re,
            self.cursor(),
            direction,
            self.options.wrap_scan,
        )
        .ok_or(Error::NotFound(pattern))?;
        self.move_to(to_isize(col), to_isize(row));
        self.show_cell_value();
        Ok(())
    }

    /// Regex-replace across every cell. Returns the number of replacements.
    ///
    /// # Errors
    ///
    /// [`Error::Pattern`] or [`Error::ReadOnlyModel`].
    pub fn replace(&mut self, pattern: &str, replacement: &str) -> Result<usize> {
        let re = search::compile(pattern, self.options.ignore_case)?;
        let n = search::replace_all(&mut self.view, &re, replacement)?;
        info!(pattern, n, "replace");
        Ok(n)
    }

    // -- bulk ---------------------------------------------------------------

    /// Run a command once per row with that row selected and the column
    /// fixed. Stops at the first failure. The cursor is restored afterwards.
    ///
    /// # Errors
    ///
    /// [`Error::RowFailed`] wrapping the first failure.
    pub fn each_row(&mut self, name: &str, args: &[String]) -> Result<()> {
        let (start_row, col) = self.cursor();
        let (x, y) = (to_isize(col), to_isize(start_row));
        let mut row = 0;
        let result = loop {
            if row >= self.view.dimensions().0 {
                break Ok(());
            }
            self.move_to(x, to_isize(row));
            if let Err(e) = self.invoke(name, args.to_vec()) {
                break Err(Error::RowFailed {
                    col,
                    row,
                    source: Box::new(e),
                });
            }
            row += 1;
        };
        self.move_to(x, y);
        result
    }

    // -- persistence and lifecycle ------------------------------------------

    /// Write the model back to the session's source.
    ///
    /// # Errors
    ///
    /// [`Error::SourceNotWritable`] or I/O errors.
    pub fn save(&mut self) -> Result<()> {
        let writer = self
            .source
            .as_writable()
            .ok_or_else(|| Error::SourceNotWritable(self.source.to_string()))?;
        writer.write(self.view.model())?;
        self.view.mark_saved();
        let msg = format!("wrote {}", self.source);
        self.show_message(msg);
        Ok(())
    }

    /// Write the model to `file` in the codec called `codec`. The codec is
    /// checked before anything touches the filesystem.
    ///
    /// # Errors
    ///
    /// [`Error::UnrecognizedCodec`], [`Error::SourceNotWritable`], or I/O
    /// errors.
    pub fn save_as(&mut self, codec: &str, file: &str) -> Result<()> {
        let codec: Codec = codec.parse()?;
        let target = codec.source(file);
        target
            .as_writable()
            .ok_or_else(|| Error::SourceNotWritable(target.to_string()))?
            .write(self.view.model())?;
        self.show_message(format!("wrote {target} ({codec})"));
        Ok(())
    }

    /// Re-read the source, replacing the model.
    ///
    /// # Errors
    ///
    /// Whatever reading fails with; the old model stays on error.
    pub fn reload(&mut self) -> Result<()> {
        let model = Self::load(self.source.as_ref(), self.read_only)?;
        self.view.set_model(model);
        self.clamp_cursor();
        let msg = format!("reloaded {}", self.source);
        self.show_message(msg);
        Ok(())
    }

    /// Quit unless there are unsaved changes.
    ///
    /// # Errors
    ///
    /// [`Error::UnsavedChanges`].
    pub fn quit(&mut self) -> Result<()> {
        if self.view.is_dirty() {
            return Err(Error::UnsavedChanges);
        }
        self.force_quit();
        Ok(())
    }

    pub fn force_quit(&mut self) {
        info!("quit");
        self.quit = true;
    }
}

impl ScriptHost for Session {
    fn cursor(&self) -> (usize, usize) {
        Self::cursor(self)
    }

    fn set_cursor(&mut self, row: isize, col: isize) {
        self.move_to(col, row);
    }

    fn current_value(&self) -> String {
        Self::current_value(self).to_owned()
    }

    fn set_current_value(&mut self, value: &str) -> Result<()> {
        Self::set_current_value(self, value)
    }

    fn dimensions(&self) -> (usize, usize) {
        self.view.dimensions()
    }

    fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        self.view.resize(rows, cols)?;
        self.clamp_cursor();
        Ok(())
    }
}

pub(crate) fn to_isize(v: usize) -> isize {
    isize::try_from(v).unwrap_or(isize::MAX)
}
