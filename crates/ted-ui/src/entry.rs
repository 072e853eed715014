//! TextEntry: the single-line prompt widget.
//!
//! Holds the prompt text, the value being edited, a byte cursor into the
//! value, and a horizontal display offset in screen columns. Cursor motion
//! and deletion work on grapheme clusters, so a combining sequence or an
//! emoji is one step.
//!
//! The display offset is recomputed on every redraw. When the cursor runs
//! past the right edge, the view jumps right so the cursor lands ten columns
//! short of the edge; when it runs past the left edge, the view follows it
//! exactly.

use unicode_segmentation::UnicodeSegmentation;

use ted_term::buffer::string_width;
use ted_term::cell::Style;
use ted_term::input::{KeyCode, KeyEvent, Modifiers};

use crate::{Component, DrawContext};

/// Columns kept visible past the cursor after scrolling right.
const SCROLL_LOOKAHEAD: usize = 10;

/// Behaviour switches for a prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptOptions {
    /// Backspace on an empty value cancels the prompt.
    pub cancel_on_empty_backspace: bool,
}

/// What a key press did to the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryEvent {
    /// Still editing.
    Pending,
    /// Enter: the final value.
    Confirmed(String),
    /// Escape, Ctrl-C, or an empty-backspace cancel.
    Cancelled,
}

/// An editable single line with a prompt.
#[derive(Debug, Clone, Default)]
pub struct TextEntry {
    prompt: String,
    value: String,
    cursor: usize,
    display_offset: usize,
    options: PromptOptions,
}

impl TextEntry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prompt: String::new(),
            value: String::new(),
            cursor: 0,
            display_offset: 0,
            options: PromptOptions {
                cancel_on_empty_backspace: false,
            },
        }
    }

    /// Start a fresh edit: cursor at the end of `value`, view reset.
    pub fn reset(&mut self, prompt: &str, value: &str, options: PromptOptions) {
        prompt.clone_into(&mut self.prompt);
        value.clone_into(&mut self.value);
        self.cursor = self.value.len();
        self.display_offset = 0;
        self.options = options;
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Byte offset of the cursor in the value.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub const fn display_offset(&self) -> usize {
        self.display_offset
    }

    // -- key handling ------------------------------------------------------

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> EntryEvent {
        let alt = key.modifiers.contains(Modifiers::ALT);
        let ctrl = key.modifiers.contains(Modifiers::CTRL);

        match key.code {
            KeyCode::Enter => return EntryEvent::Confirmed(self.value.clone()),
            KeyCode::Escape => return EntryEvent::Cancelled,
            KeyCode::Char('c') if ctrl => return EntryEvent::Cancelled,
            KeyCode::Char('k') if ctrl => self.kill_line(),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.value.len(),
            KeyCode::Char(ch) if !ctrl && !alt => self.insert(ch),
            KeyCode::Left => self.cursor = self.prev_boundary(),
            KeyCode::Right => self.cursor = self.next_boundary(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.len(),
            KeyCode::Backspace if alt => self.backspace_word(),
            KeyCode::Backspace => {
                if self.value.is_empty() && self.options.cancel_on_empty_backspace {
                    return EntryEvent::Cancelled;
                }
                let start = self.prev_boundary();
                self.value.replace_range(start..self.cursor, "");
                self.cursor = start;
            }
            KeyCode::Delete => {
                let end = self.next_boundary();
                self.value.replace_range(self.cursor..end, "");
            }
            _ => {}
        }
        EntryEvent::Pending
    }

    fn insert(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Clear to the end, or everything when already at the end.
    fn kill_line(&mut self) {
        if self.cursor == self.value.len() {
            self.value.clear();
            self.cursor = 0;
        } else {
            self.value.truncate(self.cursor);
        }
    }

    /// Delete trailing whitespace before the cursor, then the word before it.
    fn backspace_word(&mut self) {
        let before = &self.value[..self.cursor];
        let trimmed = before.trim_end();
        let start = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map_or(0, |(i, c)| i + c.len_utf8());
        self.value.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .graphemes(true)
            .next()
            .map_or(self.cursor, |g| self.cursor + g.len())
    }

    // -- scrolling ---------------------------------------------------------

    /// Recompute the display offset for a text area `avail` columns wide.
    fn autoscroll(&mut self, avail: usize) {
        let cursor_col = string_width(&self.value[..self.cursor]);
        if cursor_col < self.display_offset {
            self.display_offset = cursor_col;
        } else if cursor_col - self.display_offset >= avail {
            self.display_offset = (cursor_col + SCROLL_LOOKAHEAD)
                .saturating_sub(avail)
                .min(cursor_col);
        }
    }

    /// The part of the value visible from the display offset onward.
    fn visible(&self) -> &str {
        let mut col = 0;
        for (i, g) in self.value.grapheme_indices(true) {
            if col >= self.display_offset {
                return &self.value[i..];
            }
            col += string_width(g);
        }
        ""
    }
}

impl Component for TextEntry {
    fn remeasure(&mut self, max_w: u16, max_h: u16) -> (u16, u16) {
        (max_w, max_h.min(1))
    }

    fn redraw(&mut self, ctx: &mut DrawContext<'_>) {
        let prompt_w = ctx.print(0, 0, &self.prompt, Style::DEFAULT);
        let avail = usize::from(ctx.width().saturating_sub(prompt_w));
        if avail == 0 {
            return;
        }
        self.autoscroll(avail);

        let width = ctx.width();
        ctx.sub(prompt_w, 0, width - prompt_w, 1)
            .print(0, 0, self.visible(), Style::DEFAULT);

        let cursor_col = string_width(&self.value[..self.cursor]) - self.display_offset;
        ctx.set_cursor(prompt_w + u16::try_from(cursor_col).unwrap_or(u16::MAX), 0);
    }
}
