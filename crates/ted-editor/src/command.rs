//! The command registry: named commands, key bindings, and evaluation of
//! typed command lines.
//!
//! A [`Command`] is a plain function over a [`CommandContext`]; it holds no
//! state of its own and reaches everything through the session. The
//! registry maps names to commands and keys to commands. Registering a name
//! twice replaces the first entry, which is how aliases work: `w` is simply
//! the `save` command filed under a second name.
//!
//! # Command lines
//!
//! [`tokenize`] splits a line on whitespace the way a shell would:
//!
//! | Input                 | Tokens                   |
//! |-----------------------|--------------------------|
//! | `goto 3 4`            | `goto`, `3`, `4`         |
//! | `set-cell "a b"`      | `set-cell`, `a b`        |
//! | `set-cell 'it''s'`    | `set-cell`, `its`        |
//! | `set-cell a\ b`       | `set-cell`, `a b`        |
//! | `replace \d+ N`       | `replace`, `\d+`, `N`    |
//! | `set-cell ""`         | `set-cell`, (empty)      |
//!
//! Single quotes take everything literally. Outside single quotes a
//! backslash escapes whitespace, quotes, and itself, and is kept as-is
//! before anything else so regex escapes survive.
//!
//! # Key bindings
//!
//! A [`KeyBinding`] packs a key press into one `u32`: characters use their
//! code point, Ctrl+letter uses the ASCII control code, named keys sit just
//! above the Unicode range, and bit 31 marks Alt.

use std::collections::HashMap;
use std::fmt;

use ted_term::input::{KeyCode, KeyEvent, Modifiers};
use tracing::debug;

use crate::error::{Error, Result};
use crate::frame::PromptRequest;
use crate::session::Session;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// What a command does.
pub type Action = fn(&mut CommandContext<'_>) -> Result<()>;

/// A named, documented action.
#[derive(Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    pub doc: &'static str,
    pub action: Action,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Everything a running command can reach.
pub struct CommandContext<'s> {
    pub session: &'s mut Session,
    pub args: Vec<String>,
}

impl CommandContext<'_> {
    /// Argument `i`, if given.
    #[must_use]
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.args.get(i).map(String::as_str)
    }

    /// Argument `i` parsed as `T`, or `None` when absent.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when present but unparsable.
    pub fn parse_arg<T: std::str::FromStr>(&self, i: usize, what: &str) -> Result<Option<T>> {
        self.arg(i)
            .map(|s| {
                s.parse()
                    .map_err(|_| Error::invalid(format!("{what}: expected a number, got {s:?}")))
            })
            .transpose()
    }

    /// Like [`parse_arg`](Self::parse_arg) but the argument must be there.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when missing or unparsable.
    pub fn require_arg<T: std::str::FromStr>(&self, i: usize, what: &str) -> Result<T> {
        self.parse_arg(i, what)?
            .ok_or_else(|| Error::invalid(format!("missing argument: {what}")))
    }

    /// Run another command by name, skipping tokenization.
    ///
    /// # Errors
    ///
    /// Whatever the command returns.
    pub fn invoke(&mut self, name: &str, args: Vec<String>) -> Result<()> {
        self.session.invoke(name, args)
    }

    /// Ask the user for a line of text; `then` runs with it on Enter and
    /// never runs on cancel.
    pub fn prompt(
        &mut self,
        request: PromptRequest,
        then: impl FnOnce(&mut Session, String) -> Result<()> + 'static,
    ) {
        self.session.prompt(request, then);
    }
}

// ---------------------------------------------------------------------------
// KeyBinding
// ---------------------------------------------------------------------------

/// A key press as a lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyBinding(u32);

impl KeyBinding {
    /// Set on every binding pressed with Alt.
    pub const ALT: u32 = 1 << 31;
    /// Named keys start here, past the last Unicode scalar value.
    const NAMED: u32 = 0x11_0000;

    const NAMED_KEYS: [(KeyCode, &'static str); 15] = [
        (KeyCode::Enter, "Enter"),
        (KeyCode::Tab, "Tab"),
        (KeyCode::BackTab, "BackTab"),
        (KeyCode::Backspace, "Backspace"),
        (KeyCode::Escape, "Esc"),
        (KeyCode::Delete, "Del"),
        (KeyCode::Insert, "Ins"),
        (KeyCode::Up, "Up"),
        (KeyCode::Down, "Down"),
        (KeyCode::Left, "Left"),
        (KeyCode::Right, "Right"),
        (KeyCode::Home, "Home"),
        (KeyCode::End, "End"),
        (KeyCode::PageUp, "PageUp"),
        (KeyCode::PageDown, "PageDown"),
    ];
    /// Offset of F1 within the named range.
    const FN_BASE: u32 = 0x40;

    #[must_use]
    pub const fn code(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_alt(self) -> bool {
        self.0 & Self::ALT != 0
    }

    /// The same key with Alt held.
    #[must_use]
    pub const fn with_alt(self) -> Self {
        Self(self.0 | Self::ALT)
    }
}

impl From<KeyEvent> for KeyBinding {
    fn from(key: KeyEvent) -> Self {
        let base = match key.code {
            KeyCode::Char(c) if key.modifiers.contains(Modifiers::CTRL) && c.is_ascii_lowercase() => {
                u32::from(c) - u32::from('a') + 1
            }
            KeyCode::Char(c) => u32::from(c),
            KeyCode::F(n) => Self::NAMED + Self::FN_BASE + u32::from(n),
            code => {
                let idx = Self::NAMED_KEYS.iter().position(|(k, _)| *k == code).unwrap_or(0);
                // Fifteen named keys; the index always fits.
                Self::NAMED + u32::try_from(idx).unwrap_or(0)
            }
        };
        if key.modifiers.contains(Modifiers::ALT) {
            Self(base | Self::ALT)
        } else {
            Self(base)
        }
    }
}

impl From<char> for KeyBinding {
    fn from(c: char) -> Self {
        Self::from(KeyEvent::from(c))
    }
}

impl From<KeyCode> for KeyBinding {
    fn from(code: KeyCode) -> Self {
        Self::from(KeyEvent::plain(code))
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_alt() {
            f.write_str("M-")?;
        }
        let base = self.0 & !Self::ALT;
        if base >= Self::NAMED + Self::FN_BASE {
            write!(f, "<F{}>", base - Self::NAMED - Self::FN_BASE)
        } else if base >= Self::NAMED {
            let idx = usize::try_from(base - Self::NAMED).unwrap_or(usize::MAX);
            let name = Self::NAMED_KEYS.get(idx).map_or("?", |(_, n)| n);
            write!(f, "<{name}>")
        } else if (1..=26).contains(&base) {
            let letter = char::from_u32(base - 1 + u32::from('a')).unwrap_or('?');
            write!(f, "C-{letter}")
        } else if base == u32::from(' ') {
            f.write_str("<Space>")
        } else {
            write!(f, "{}", char::from_u32(base).unwrap_or('?'))
        }
    }
}

// ---------------------------------------------------------------------------
// CommandRegistry
// ---------------------------------------------------------------------------

/// Name and key lookup tables, built once at startup.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
    keys: HashMap<KeyBinding, Command>,
}

impl CommandRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command. An existing command of the same name is replaced.
    pub fn define(&mut self, name: &'static str, doc: &'static str, action: Action) {
        self.commands.insert(name.to_owned(), Command { name, doc, action });
    }

    /// File an existing command under another name as well.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchCommand`] when `target` is not registered.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<()> {
        let cmd = self.lookup(target)?;
        self.commands.insert(alias.to_owned(), cmd);
        Ok(())
    }

    /// Bind a key to a registered command.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchCommand`] when `name` is not registered.
    pub fn map_key(&mut self, key: impl Into<KeyBinding>, name: &str) -> Result<()> {
        let cmd = self.lookup(name)?;
        self.keys.insert(key.into(), cmd);
        Ok(())
    }

    #[must_use]
    pub fn command(&self, name: &str) -> Option<Command> {
        self.commands.get(name).copied()
    }

    #[must_use]
    pub fn key_mapping(&self, key: KeyBinding) -> Option<Command> {
        self.keys.get(&key).copied()
    }

    /// Every registered name, aliases included, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Keys bound to the command called `name`, sorted.
    #[must_use]
    pub fn keys_for(&self, name: &str) -> Vec<KeyBinding> {
        let mut keys: Vec<KeyBinding> = self
            .keys
            .iter()
            .filter(|(_, cmd)| cmd.name == name)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_unstable();
        keys
    }

    fn lookup(&self, name: &str) -> Result<Command> {
        self.command(name)
            .ok_or_else(|| Error::NoSuchCommand(name.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

impl Session {
    /// Run the command called `name`.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchCommand`], or whatever the command returns.
    pub fn invoke(&mut self, name: &str, args: Vec<String>) -> Result<()> {
        let cmd = self
            .registry()
            .command(name)
            .ok_or_else(|| Error::NoSuchCommand(name.to_owned()))?;
        debug!(command = cmd.name, ?args, "invoke");
        let mut ctx = CommandContext {
            session: self,
            args,
        };
        (cmd.action)(&mut ctx)
    }

    /// Tokenize `line` and run it. A blank line does nothing.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an unterminated quote, otherwise as
    /// [`invoke`](Self::invoke).
    pub fn eval(&mut self, line: &str) -> Result<()> {
        let mut tokens = tokenize(line)?.into_iter();
        match tokens.next() {
            Some(name) => self.invoke(&name, tokens.collect()),
            None => Ok(()),
        }
    }
}

/// Split a command line into tokens, shell-style.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for an unterminated quote.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // A quoted empty string still makes a token.
    let mut in_token = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(Error::invalid("unterminated ' quote")),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.peek() {
                            Some(&next @ ('"' | '\\')) => {
                                current.push(next);
                                chars.next();
                            }
                            _ => current.push('\\'),
                        },
                        Some(c) => current.push(c),
                        None => return Err(Error::invalid("unterminated \" quote")),
                    }
                }
            }
            '\\' => {
                in_token = true;
                match chars.peek() {
                    Some(&next) if next.is_whitespace() || matches!(next, '"' | '\'' | '\\') => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push('\\'),
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
