//! The built-in commands and default key bindings.
//!
//! | Group      | Commands                                                     |
//! |------------|--------------------------------------------------------------|
//! | Navigation | `move-*`, `page-*`, `row-top`, `row-bottom`, `col-left`, `col-right`, `goto`, `show-cell` |
//! | Editing    | `set-cell`, `edit-cell`, `clear-cell`, `yank`, `paste`, `append` |
//! | Structure  | `open-down`, `open-up`, `open-right`, `open-left`, `delete-row`, `delete-col`, `resize` |
//! | Search     | `search`, `search-next`, `search-prev`, `replace`, `each-row` |
//! | Display    | `mark-row`, `inc-col-width`, `dec-col-width`, `set-col-width` |
//! | Lifecycle  | `save`, `save-and-quit`, `quit`, `force-quit`, `reload`      |
//! | Meta       | `enter-command`, `eval`, `set`, `help`                       |
//!
//! Aliases: `w` → `save`, `q` → `quit`, `wq` → `save-and-quit`,
//! `q!` → `force-quit`.

use ted_term::input::{KeyCode, KeyEvent};
use tracing::warn;

use crate::command::{CommandContext, CommandRegistry, KeyBinding};
use crate::error::{Error, Result};
use crate::frame::PromptRequest;
use crate::options::parse_set;
use crate::script;
use crate::search::SearchDirection;
use crate::session::to_isize;
use crate::viewctrl::{Marker, DEFAULT_COL_SIZE};

/// A registry holding every built-in command, alias, and key binding.
#[must_use]
pub fn builtin() -> CommandRegistry {
    let mut reg = CommandRegistry::new();
    define_navigation(&mut reg);
    define_editing(&mut reg);
    define_structure(&mut reg);
    define_search(&mut reg);
    define_display(&mut reg);
    define_lifecycle(&mut reg);
    define_meta(&mut reg);

    for (alias, target) in ALIASES {
        if let Err(err) = reg.alias(alias, target) {
            warn!(%err, alias, "bad alias");
        }
    }
    for (key, name) in default_keys() {
        if let Err(err) = reg.map_key(key, name) {
            warn!(%err, %key, "bad key binding");
        }
    }
    reg
}

const ALIASES: [(&str, &str); 4] = [
    ("w", "save"),
    ("q", "quit"),
    ("wq", "save-and-quit"),
    ("q!", "force-quit"),
];

fn default_keys() -> Vec<(KeyBinding, &'static str)> {
    let alt = |c: char| KeyBinding::from(KeyEvent::alt(KeyCode::Char(c)));
    let ctrl = |c: char| KeyBinding::from(KeyEvent::ctrl(c));
    let key = |c: char| KeyBinding::from(c);
    vec![
        (key('i'), "move-up"),
        (key('k'), "move-down"),
        (key('j'), "move-left"),
        (key('l'), "move-right"),
        (KeyCode::Up.into(), "move-up"),
        (KeyCode::Down.into(), "move-down"),
        (KeyCode::Left.into(), "move-left"),
        (KeyCode::Right.into(), "move-right"),
        (key('I'), "page-up"),
        (key('K'), "page-down"),
        (key('J'), "page-left"),
        (key('L'), "page-right"),
        (KeyCode::PageUp.into(), "page-up"),
        (KeyCode::PageDown.into(), "page-down"),
        (KeyCode::Home.into(), "row-top"),
        (KeyCode::End.into(), "row-bottom"),
        (ctrl('a'), "col-left"),
        (ctrl('e'), "col-right"),
        (key('e'), "edit-cell"),
        (key('r'), "set-cell"),
        (key('x'), "clear-cell"),
        (key('a'), "append"),
        (key('o'), "open-down"),
        (key('O'), "open-up"),
        (alt('o'), "open-right"),
        (alt('O'), "open-left"),
        (key('D'), "delete-row"),
        (alt('d'), "delete-col"),
        (key('y'), "yank"),
        (key('p'), "paste"),
        (key('/'), "search"),
        (key('n'), "search-next"),
        (key('N'), "search-prev"),
        (key('m'), "mark-row"),
        (key('<'), "dec-col-width"),
        (key('>'), "inc-col-width"),
        (key(':'), "enter-command"),
        (ctrl('s'), "save"),
        (key('q'), "quit"),
    ]
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

fn define_navigation(reg: &mut CommandRegistry) {
    reg.define("move-up", "Move up one row", |ctx| nav_by(ctx, 0, -1));
    reg.define("move-down", "Move down one row", |ctx| nav_by(ctx, 0, 1));
    reg.define("move-left", "Move left one column", |ctx| nav_by(ctx, -1, 0));
    reg.define("move-right", "Move right one column", |ctx| nav_by(ctx, 1, 0));

    reg.define("page-up", "Move up one page (pagerows)", |ctx| page(ctx, 0, -1));
    reg.define("page-down", "Move down one page (pagerows)", |ctx| page(ctx, 0, 1));
    reg.define("page-left", "Move left one page (pagecols)", |ctx| page(ctx, -1, 0));
    reg.define("page-right", "Move right one page (pagecols)", |ctx| page(ctx, 1, 0));

    reg.define("row-top", "Move to the first row", |ctx| {
        let (_, col) = ctx.session.cursor();
        nav_to(ctx, to_isize(col), 0)
    });
    reg.define("row-bottom", "Move to the last row", |ctx| {
        let (_, col) = ctx.session.cursor();
        let (rows, _) = ctx.session.view().dimensions();
        nav_to(ctx, to_isize(col), to_isize(rows) - 1)
    });
    reg.define("col-left", "Move to the first column", |ctx| {
        let (row, _) = ctx.session.cursor();
        nav_to(ctx, 0, to_isize(row))
    });
    reg.define("col-right", "Move to the last column", |ctx| {
        let (row, _) = ctx.session.cursor();
        let (_, cols) = ctx.session.view().dimensions();
        nav_to(ctx, to_isize(cols) - 1, to_isize(row))
    });

    reg.define("goto", "goto ROW [COL]: move to a cell (0-based)", |ctx| {
        let row: isize = ctx.require_arg(0, "row")?;
        let col = match ctx.parse_arg(1, "col")? {
            Some(c) => c,
            None => to_isize(ctx.session.cursor().1),
        };
        nav_to(ctx, col, row)
    });
    reg.define("show-cell", "Show the current cell's value", |ctx| {
        ctx.session.show_cell_value();
        Ok(())
    });
}

fn nav_by(ctx: &mut CommandContext<'_>, dx: isize, dy: isize) -> Result<()> {
    ctx.session.move_by(dx, dy);
    ctx.session.show_cell_value();
    Ok(())
}

fn nav_to(ctx: &mut CommandContext<'_>, x: isize, y: isize) -> Result<()> {
    ctx.session.move_to(x, y);
    ctx.session.show_cell_value();
    Ok(())
}

fn page(ctx: &mut CommandContext<'_>, dx: isize, dy: isize) -> Result<()> {
    let opts = ctx.session.options();
    let (cols, rows) = (to_isize(opts.page_cols), to_isize(opts.page_rows));
    nav_by(ctx, dx * cols, dy * rows)
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

fn define_editing(reg: &mut CommandRegistry) {
    reg.define(
        "set-cell",
        "set-cell [VALUE]: set the current cell, prompting when no value is given",
        |ctx| {
            if ctx.args.is_empty() {
                return prompt_cell(ctx, String::new());
            }
            let value = ctx.args.join(" ");
            ctx.session.set_current_value(&value)?;
            ctx.session.show_cell_value();
            Ok(())
        },
    );
    reg.define("edit-cell", "Edit the current cell's value", |ctx| {
        let current = ctx.session.current_value().to_owned();
        prompt_cell(ctx, current)
    });
    reg.define("clear-cell", "Empty the current cell", |ctx| {
        ctx.session.set_current_value("")?;
        ctx.session.show_cell_value();
        Ok(())
    });
    reg.define("yank", "Copy the current cell's value", |ctx| {
        let value = ctx.session.current_value().to_owned();
        ctx.session.show_message(format!("yanked: {value}"));
        ctx.session.set_clipboard(value);
        Ok(())
    });
    reg.define("paste", "Write the copied value into the current cell", |ctx| {
        let value = ctx
            .session
            .clipboard()
            .map(str::to_owned)
            .ok_or_else(|| Error::invalid("nothing to paste"))?;
        ctx.session.set_current_value(&value)?;
        ctx.session.show_cell_value();
        Ok(())
    });
    reg.define("append", "Open a row below, move to it, and edit", |ctx| {
        ctx.invoke("open-down", Vec::new())?;
        ctx.invoke("move-down", Vec::new())?;
        ctx.invoke("set-cell", Vec::new())
    });
}

/// Prompt for a new value of the current cell. The cell is fixed now, so a
/// cursor move before Enter does not redirect the write.
fn prompt_cell(ctx: &mut CommandContext<'_>, initial: String) -> Result<()> {
    ctx.session.view_mut().ensure_mutable()?;
    let (row, col) = ctx.session.cursor();
    ctx.prompt(PromptRequest::new("> ").initial(initial), move |s, value| {
        s.view_mut().set_cell_value(row, col, &value)?;
        s.show_cell_value();
        Ok(())
    });
    Ok(())
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

fn define_structure(reg: &mut CommandRegistry) {
    reg.define("open-down", "Insert an empty row below the cursor", |ctx| {
        let (row, _) = ctx.session.cursor();
        let (rows, _) = ctx.session.view().dimensions();
        if rows == 0 {
            ctx.session.view_mut().insert_row(0)?;
        } else {
            ctx.session.view_mut().open_down(to_isize(row))?;
        }
        after_structural(ctx)
    });
    reg.define("open-up", "Insert an empty row above the cursor", |ctx| {
        let (row, _) = ctx.session.cursor();
        ctx.session.view_mut().insert_row(to_isize(row))?;
        after_structural(ctx)
    });
    reg.define("open-right", "Insert an empty column right of the cursor", |ctx| {
        let (_, col) = ctx.session.cursor();
        ctx.session.view_mut().open_right(to_isize(col))?;
        after_structural(ctx)
    });
    reg.define("open-left", "Insert an empty column left of the cursor", |ctx| {
        let (_, col) = ctx.session.cursor();
        ctx.session.view_mut().insert_column(to_isize(col))?;
        after_structural(ctx)
    });
    reg.define("delete-row", "Delete the cursor's row", |ctx| {
        let (row, _) = ctx.session.cursor();
        ctx.session.view_mut().delete_row(to_isize(row))?;
        after_structural(ctx)
    });
    reg.define("delete-col", "Delete the cursor's column", |ctx| {
        let (_, col) = ctx.session.cursor();
        ctx.session.view_mut().delete_col(to_isize(col))?;
        after_structural(ctx)
    });
    reg.define("resize", "resize ROWS COLS: resize the model", |ctx| {
        let rows: usize = ctx.require_arg(0, "rows")?;
        let cols: usize = ctx.require_arg(1, "cols")?;
        ctx.session.view_mut().resize(rows, cols)?;
        ctx.session.clamp_cursor();
        ctx.session.show_message(format!("{rows}x{cols}"));
        Ok(())
    });
}

fn after_structural(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.session.clamp_cursor();
    ctx.session.show_cell_value();
    Ok(())
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

fn define_search(reg: &mut CommandRegistry) {
    reg.define("search", "search [PATTERN]: find a regex, prompting when none is given", |ctx| {
        if ctx.args.is_empty() {
            let request = PromptRequest::new("/").cancel_on_empty_backspace();
            ctx.prompt(request, |s, pattern| s.search_for(&pattern));
            return Ok(());
        }
        let pattern = ctx.args.join(" ");
        ctx.session.search_for(&pattern)
    });
    reg.define("search-next", "Find the next match of the last search", |ctx| {
        ctx.session.search_next(SearchDirection::Forward)
    });
    reg.define("search-prev", "Find the previous match of the last search", |ctx| {
        ctx.session.search_next(SearchDirection::Backward)
    });
    reg.define(
        "replace",
        "replace PATTERN REPLACEMENT: regex replace in every cell",
        |ctx| {
            let [pattern, replacement] = ctx.args.as_slice() else {
                return Err(Error::invalid("usage: replace PATTERN REPLACEMENT"));
            };
            let (pattern, replacement) = (pattern.clone(), replacement.clone());
            let n = ctx.session.replace(&pattern, &replacement)?;
            ctx.session.show_message(format!("{n} replacement(s)"));
            Ok(())
        },
    );
    reg.define(
        "each-row",
        "each-row COMMAND [ARGS...]: run a command on every row of this column",
        |ctx| {
            let Some((name, args)) = ctx.args.split_first() else {
                return Err(Error::invalid("usage: each-row COMMAND [ARGS...]"));
            };
            let (name, args) = (name.clone(), args.to_vec());
            ctx.session.each_row(&name, &args)
        },
    );
}

// ---------------------------------------------------------------------------
// Display attributes
// ---------------------------------------------------------------------------

fn define_display(reg: &mut CommandRegistry) {
    reg.define(
        "mark-row",
        "mark-row [none|red|green|blue]: set or cycle the row marker",
        |ctx| {
            let (row, _) = ctx.session.cursor();
            let marker = match ctx.arg(0) {
                Some(name) => name.parse()?,
                None => ctx
                    .session
                    .view()
                    .row_attrs()
                    .get(row)
                    .map_or(Marker::None, |a| a.marker)
                    .next(),
            };
            ctx.session.view_mut().set_row_marker(row, marker)?;
            ctx.session.show_message(format!("marker: {marker}"));
            Ok(())
        },
    );
    reg.define("inc-col-width", "inc-col-width [N]: widen the column (widthstep)", |ctx| {
        let step = width_step(ctx)?;
        adjust_width(ctx, |w| w.saturating_add(step))
    });
    reg.define("dec-col-width", "dec-col-width [N]: narrow the column (widthstep)", |ctx| {
        let step = width_step(ctx)?;
        adjust_width(ctx, |w| w.saturating_sub(step))
    });
    reg.define("set-col-width", "set-col-width N: set the column width", |ctx| {
        let width: usize = ctx.require_arg(0, "width")?;
        adjust_width(ctx, |_| width)
    });
}

fn width_step(ctx: &CommandContext<'_>) -> Result<usize> {
    Ok(ctx
        .parse_arg(0, "width")?
        .unwrap_or(ctx.session.options().width_step))
}

fn adjust_width(ctx: &mut CommandContext<'_>, f: impl FnOnce(usize) -> usize) -> Result<()> {
    let (_, col) = ctx.session.cursor();
    let current = ctx
        .session
        .view()
        .col_attrs()
        .get(col)
        .map_or(DEFAULT_COL_SIZE, |a| a.size);
    ctx.session.view_mut().set_col_width(col, f(current))?;
    let width = ctx.session.view().col_attrs().get(col).map_or(0, |a| a.size);
    ctx.session.show_message(format!("column {col}: width {width}"));
    Ok(())
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

fn define_lifecycle(reg: &mut CommandRegistry) {
    reg.define("save", "save [CODEC FILE]: write the model", |ctx| match ctx.args.as_slice() {
        [] => ctx.session.save(),
        [codec, file] => {
            let (codec, file) = (codec.clone(), file.clone());
            ctx.session.save_as(&codec, &file)
        }
        _ => Err(Error::invalid("usage: save [CODEC FILE]")),
    });
    reg.define("save-and-quit", "Write the model and quit", |ctx| {
        ctx.session.save()?;
        ctx.session.quit()
    });
    reg.define("quit", "Quit, refusing when there are unsaved changes", |ctx| {
        ctx.session.quit()
    });
    reg.define("force-quit", "Quit, discarding unsaved changes", |ctx| {
        ctx.session.force_quit();
        Ok(())
    });
    reg.define("reload", "Re-read the model from its source", |ctx| {
        ctx.session.reload()
    });
}

// ---------------------------------------------------------------------------
// Meta
// ---------------------------------------------------------------------------

fn define_meta(reg: &mut CommandRegistry) {
    reg.define("enter-command", "Type a command line and run it", |ctx| {
        let request = PromptRequest::new(":").cancel_on_empty_backspace();
        ctx.prompt(request, |s, line| s.eval(&line));
        Ok(())
    });
    reg.define(
        "eval",
        "eval EXPR: evaluate a script; quote it to keep string literals intact",
        |ctx| {
            let src = ctx.args.join(" ");
            let value = script::eval(&mut *ctx.session, &src)?;
            ctx.session.show_message(value.to_string());
            Ok(())
        },
    );
    reg.define("set", "set [OPTION...]: show or change options", |ctx| {
        let directives = parse_set(&ctx.args);
        let mut shown = Vec::new();
        for d in &directives {
            if let Some(text) = ctx.session.options_mut().apply(d)? {
                shown.push(text);
            }
        }
        if !shown.is_empty() {
            ctx.session.show_message(shown.join("  "));
        }
        Ok(())
    });
    reg.define("help", "help [COMMAND]: describe a command or list them all", |ctx| {
        let text = match ctx.arg(0) {
            Some(name) => {
                let reg = ctx.session.registry();
                let cmd = reg
                    .command(name)
                    .ok_or_else(|| Error::NoSuchCommand(name.to_owned()))?;
                let keys: Vec<String> = reg.keys_for(cmd.name).iter().map(ToString::to_string).collect();
                if keys.is_empty() {
                    format!("{}: {}", cmd.name, cmd.doc)
                } else {
                    format!("{}: {} [{}]", cmd.name, cmd.doc, keys.join(" "))
                }
            }
            None => ctx.session.registry().names().join(" "),
        };
        ctx.session.show_message(text);
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::Mode;
    use crate::model::{ReadOnlyModel, StdModel};
    use crate::session::Session;
    use crate::source::Codec;
    use crate::viewctrl::MIN_COL_SIZE;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        let model = StdModel::from_rows([
            ["letters", "numbers", "greek"],
            ["a", "1", "alpha"],
            ["b", "2", "beta"],
        ]);
        Session::new(Codec::Csv.source("test.csv"), Box::new(model))
    }

    fn rows(s: &Session) -> Vec<Vec<String>> {
        let (r, c) = s.view().dimensions();
        (0..r)
            .map(|row| (0..c).map(|col| s.view().cell_value(row, col).to_owned()).collect())
            .collect()
    }

    fn type_line(s: &mut Session, text: &str) {
        for ch in text.chars() {
            s.key_pressed(KeyEvent::from(ch));
        }
        s.key_pressed(KeyEvent::plain(KeyCode::Enter));
    }

    // -- registry -------------------------------------------------------------

    #[test]
    fn every_default_key_is_bound() {
        let reg = builtin();
        for (key, name) in default_keys() {
            assert_eq!(reg.key_mapping(key).map(|c| c.name), Some(name), "{key}");
        }
    }

    #[test]
    fn aliases_resolve() {
        let reg = builtin();
        for (alias, target) in ALIASES {
            assert_eq!(reg.command(alias).map(|c| c.name), Some(target));
        }
    }

    #[test]
    fn unknown_command() {
        let mut s = session();
        assert!(matches!(s.eval("frobnicate"), Err(Error::NoSuchCommand(n)) if n == "frobnicate"));
        s.eval("   ").unwrap();
    }

    // -- navigation -----------------------------------------------------------

    #[test]
    fn edges_and_goto() {
        let mut s = session();
        s.eval("col-right").unwrap();
        assert_eq!(s.cursor(), (0, 2));
        s.eval("row-bottom").unwrap();
        assert_eq!(s.cursor(), (2, 2));
        assert_eq!(s.message(), "beta");
        s.eval("goto 1 0").unwrap();
        assert_eq!(s.cursor(), (1, 0));
        s.eval("goto -5").unwrap();
        assert_eq!(s.cursor(), (0, 0));
        assert!(s.eval("goto").is_err());
        assert!(s.eval("goto x").is_err());
    }

    #[test]
    fn paging_uses_options() {
        let mut s = session();
        s.eval("page-down").unwrap();
        assert_eq!(s.cursor(), (2, 0));
        s.eval("set pagerows=1").unwrap();
        s.eval("page-up").unwrap();
        assert_eq!(s.cursor(), (1, 0));
    }

    // -- editing --------------------------------------------------------------

    #[test]
    fn set_cell_with_and_without_value() {
        let mut s = session();
        s.eval("set-cell 'hello world'").unwrap();
        assert_eq!(s.view().cell_value(0, 0), "hello world");

        s.eval("set-cell").unwrap();
        assert_eq!(s.mode(), Mode::Entry);
        assert_eq!(s.frame().entry().value(), "");
        type_line(&mut s, "typed");
        assert_eq!(s.view().cell_value(0, 0), "typed");
    }

    #[test]
    fn edit_cell_prefills() {
        let mut s = session();
        s.eval("goto 1 2").unwrap();
        s.eval("edit-cell").unwrap();
        assert_eq!(s.frame().entry().value(), "alpha");
        type_line(&mut s, "s");
        assert_eq!(s.view().cell_value(1, 2), "alphas");
    }

    #[test]
    fn set_cell_prompt_on_read_only_fails_early() {
        let model = ReadOnlyModel(Box::new(StdModel::default()));
        let mut s = Session::new(Codec::Csv.source("x.csv"), Box::new(model));
        assert!(matches!(s.eval("set-cell"), Err(Error::ReadOnlyModel)));
        assert_eq!(s.mode(), Mode::Grid);
    }

    #[test]
    fn yank_paste_clear() {
        let mut s = session();
        assert!(s.eval("paste").is_err());
        s.eval("yank").unwrap();
        s.eval("move-down").unwrap();
        s.eval("paste").unwrap();
        assert_eq!(s.view().cell_value(1, 0), "letters");
        s.eval("clear-cell").unwrap();
        assert_eq!(s.view().cell_value(1, 0), "");
    }

    #[test]
    fn append_opens_row_and_prompts() {
        let mut s = session();
        s.eval("append").unwrap();
        assert_eq!(s.view().dimensions(), (4, 3));
        assert_eq!(s.cursor(), (1, 0));
        assert_eq!(s.mode(), Mode::Entry);
        type_line(&mut s, "new");
        assert_eq!(rows(&s)[1], vec!["new", "", ""]);
        assert_eq!(rows(&s)[2], vec!["a", "1", "alpha"]);
    }

    // -- structure ------------------------------------------------------------

    #[test]
    fn open_right_and_left() {
        let mut s = session();
        s.eval("goto 0 1").unwrap();
        s.eval("open-right").unwrap();
        assert_eq!(rows(&s)[0], vec!["letters", "numbers", "", "greek"]);
        s.eval("open-left").unwrap();
        assert_eq!(rows(&s)[0], vec!["letters", "", "numbers", "", "greek"]);
    }

    #[test]
    fn delete_row_and_col_clamp_cursor() {
        let mut s = session();
        s.eval("goto 2 2").unwrap();
        s.eval("delete-row").unwrap();
        assert_eq!(s.view().dimensions(), (2, 3));
        assert_eq!(s.cursor(), (1, 2));
        s.eval("delete-col").unwrap();
        assert_eq!(s.view().dimensions(), (2, 2));
        assert_eq!(s.cursor(), (1, 1));
        assert_eq!(s.message(), "1");
    }

    #[test]
    fn resize_command() {
        let mut s = session();
        s.eval("goto 2 2").unwrap();
        s.eval("resize 1 1").unwrap();
        assert_eq!(s.view().dimensions(), (1, 1));
        assert_eq!(s.cursor(), (0, 0));
        assert!(s.eval("resize 1").is_err());
    }

    #[test]
    fn resize_beyond_cell_limit_reports_error() {
        let mut s = session();
        let before = s.view().dimensions();
        for cmd in ["resize 4611686018427387904 4", "eval (resize 4611686018427387904 4)"] {
            let err = s.eval(cmd).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{cmd}: {err}");
            assert_eq!(s.view().dimensions(), before);
        }
    }

    // -- search ---------------------------------------------------------------

    #[test]
    fn search_prompt_and_repeat() {
        let mut s = session();
        s.eval("search").unwrap();
        assert_eq!(s.frame().entry().prompt(), "/");
        type_line(&mut s, "^[ab]$");
        assert_eq!(s.cursor(), (1, 0));
        s.eval("search-next").unwrap();
        assert_eq!(s.cursor(), (2, 0));
        s.eval("search-prev").unwrap();
        assert_eq!(s.cursor(), (1, 0));
    }

    #[test]
    fn search_not_found_keeps_cursor() {
        let mut s = session();
        s.eval("goto 1 1").unwrap();
        assert!(matches!(s.eval("search omega"), Err(Error::NotFound(_))));
        assert_eq!(s.cursor(), (1, 1));
    }

    #[test]
    fn replace_reports_count() {
        let mut s = session();
        s.eval(r"replace a A").unwrap();
        assert_eq!(s.message(), "4 replacement(s)");
        assert_eq!(s.view().cell_value(1, 2), "AlphA");
        assert!(s.eval("replace onlyone").is_err());
        assert!(matches!(s.eval("replace ( x"), Err(Error::Pattern(_))));
    }

    #[test]
    fn each_row_through_eval() {
        let mut s = session();
        s.eval("goto 0 1").unwrap();
        s.eval("each-row set-cell n").unwrap();
        assert_eq!(
            rows(&s).iter().map(|r| r[1].as_str()).collect::<Vec<_>>(),
            vec!["n", "n", "n"]
        );
        assert!(s.eval("each-row").is_err());
        assert!(matches!(
            s.eval("each-row goto"),
            Err(Error::RowFailed { row: 0, col: 1, .. })
        ));
    }

    // -- display --------------------------------------------------------------

    #[test]
    fn mark_row_sets_and_cycles() {
        let mut s = session();
        s.eval("mark-row").unwrap();
        assert_eq!(s.view().row_attrs()[0].marker, Marker::Red);
        s.eval("mark-row").unwrap();
        assert_eq!(s.view().row_attrs()[0].marker, Marker::Green);
        s.eval("mark-row none").unwrap();
        assert_eq!(s.view().row_attrs()[0].marker, Marker::None);
        assert!(s.eval("mark-row purple").is_err());
    }

    #[test]
    fn column_width_commands() {
        let mut s = session();
        s.eval("inc-col-width").unwrap();
        assert_eq!(s.view().col_attrs()[0].size, DEFAULT_COL_SIZE + 2);
        s.eval("dec-col-width 10").unwrap();
        assert_eq!(s.view().col_attrs()[0].size, DEFAULT_COL_SIZE - 8);
        s.eval("set-col-width 1").unwrap();
        assert_eq!(s.view().col_attrs()[0].size, MIN_COL_SIZE);
        assert!(s.eval("set-col-width").is_err());
    }

    // -- lifecycle ------------------------------------------------------------

    #[test]
    fn save_with_unknown_codec_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let mut s = session();
        let err = s.eval(&format!("save xlsx {}", path.display())).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedCodec(c) if c == "xlsx"));
        assert!(!path.exists());
    }

    #[test]
    fn save_usage() {
        let mut s = session();
        assert!(matches!(s.eval("save csv"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn quit_aliases() {
        let mut s = session();
        s.eval("set-cell x").unwrap();
        assert!(matches!(s.eval("q"), Err(Error::UnsavedChanges)));
        assert!(!s.should_quit());
        s.eval("q!").unwrap();
        assert!(s.should_quit());
    }

    // -- meta -----------------------------------------------------------------

    #[test]
    fn enter_command_evaluates_line() {
        let mut s = session();
        s.eval("enter-command").unwrap();
        assert_eq!(s.frame().entry().prompt(), ":");
        type_line(&mut s, "goto 2 1");
        assert_eq!(s.cursor(), (2, 1));
    }

    #[test]
    fn enter_command_error_is_shown() {
        let mut s = session();
        s.eval("enter-command").unwrap();
        type_line(&mut s, "bogus");
        assert_eq!(s.mode(), Mode::Grid);
        assert_eq!(s.message(), Error::NoSuchCommand("bogus".into()).to_string());
    }

    #[test]
    fn eval_script() {
        let mut s = session();
        s.eval("eval (+ 1 2)").unwrap();
        assert_eq!(s.message(), "3");
        s.eval(r#"eval '(set-cell "x y")'"#).unwrap();
        assert_eq!(s.view().cell_value(0, 0), "x y");
        s.eval("eval (dimensions)").unwrap();
        assert_eq!(s.message(), "(3 3)");
    }

    #[test]
    fn set_shows_queries() {
        let mut s = session();
        s.eval("set ic pagerows?").unwrap();
        assert_eq!(s.message(), "pagerows=25");
        assert!(s.options().ignore_case);
        assert!(s.eval("set bogus").is_err());
    }

    #[test]
    fn help_describes_commands() {
        let mut s = session();
        s.eval("help save").unwrap();
        assert_eq!(s.message(), "save: save [CODEC FILE]: write the model [C-s]");
        s.eval("help").unwrap();
        assert!(s.message().contains("move-up"));
        assert!(s.eval("help nothing").is_err());
    }
}
