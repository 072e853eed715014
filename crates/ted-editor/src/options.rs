//! Runtime options and the `set` command grammar.
//!
//! # Syntax
//!
//! | Syntax          | Effect                        |
//! |-----------------|-------------------------------|
//! | `set name`      | Enable boolean / show numeric |
//! | `set noname`    | Disable boolean               |
//! | `set name!`     | Toggle boolean                |
//! | `set name?`     | Query current value           |
//! | `set name=N`    | Assign numeric value          |
//! | `set`           | Show changed options          |
//! | `set all`       | Show all options              |
//!
//! # Options
//!
//! | Name         | Abbrev | Type    | Default | Used by                      |
//! |--------------|--------|---------|---------|------------------------------|
//! | `pagerows`   | `pr`   | integer | 25      | page-up / page-down          |
//! | `pagecols`   | `pc`   | integer | 15      | page-left / page-right       |
//! | `widthstep`  | `wst`  | integer | 2       | inc-col-width / dec-col-width|
//! | `ignorecase` | `ic`   | bool    | false   | search, replace              |
//! | `wrapscan`   | `ws`   | bool    | true    | search-next / search-prev    |

use crate::error::{Error, Result};

/// A parsed `set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    On(String),
    Off(String),
    Toggle(String),
    Query(String),
    Assign(String, String),
    ShowChanged,
    ShowAll,
}

/// Parse the arguments of `set` into directives.
///
/// No arguments means [`SetDirective::ShowChanged`].
#[must_use]
pub fn parse_set<S: AsRef<str>>(args: &[S]) -> Vec<SetDirective> {
    if args.is_empty() {
        return vec![SetDirective::ShowChanged];
    }
    args.iter().map(|a| parse_set_arg(a.as_ref())).collect()
}

/// Parse a single `set` argument.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if arg == "all" {
        return SetDirective::ShowAll;
    }
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_owned(), value.to_owned());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_owned());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_owned());
    }
    // "no" only negates a known boolean, so a future "notes" option would
    // still parse as itself.
    if let Some(name) = arg.strip_prefix("no") {
        if BoolOpt::lookup(name).is_some() {
            return SetDirective::Off(name.to_owned());
        }
    }
    if NumOpt::lookup(arg).is_some() {
        return SetDirective::Query(arg.to_owned());
    }
    SetDirective::On(arg.to_owned())
}

// ---------------------------------------------------------------------------
// Option names
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoolOpt {
    IgnoreCase,
    WrapScan,
}

impl BoolOpt {
    const ALL: [Self; 2] = [Self::IgnoreCase, Self::WrapScan];

    fn lookup(name: &str) -> Option<Self> {
        match name {
            "ignorecase" | "ic" => Some(Self::IgnoreCase),
            "wrapscan" | "ws" => Some(Self::WrapScan),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::IgnoreCase => "ignorecase",
            Self::WrapScan => "wrapscan",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumOpt {
    PageRows,
    PageCols,
    WidthStep,
}

impl NumOpt {
    const ALL: [Self; 3] = [Self::PageRows, Self::PageCols, Self::WidthStep];

    fn lookup(name: &str) -> Option<Self> {
        match name {
            "pagerows" | "pr" => Some(Self::PageRows),
            "pagecols" | "pc" => Some(Self::PageCols),
            "widthstep" | "wst" => Some(Self::WidthStep),
            _ => None,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::PageRows => "pagerows",
            Self::PageCols => "pagecols",
            Self::WidthStep => "widthstep",
        }
    }
}

/// `"name"` when true, `"noname"` when false.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_owned()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Session-wide option values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub page_rows: usize,
    pub page_cols: usize,
    pub width_step: usize,
    pub ignore_case: bool,
    pub wrap_scan: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            page_rows: 25,
            page_cols: 15,
            width_step: 2,
            ignore_case: false,
            wrap_scan: true,
        }
    }
}

impl Options {
    /// Apply one directive. Queries and listings return the text to show.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an unknown option, a boolean operation
    /// on a numeric option (or the reverse), or a value that is not a
    /// positive integer.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>> {
        match directive {
            SetDirective::On(name) => {
                *self.bool_mut(bool_opt(name)?) = true;
                Ok(None)
            }
            SetDirective::Off(name) => {
                *self.bool_mut(bool_opt(name)?) = false;
                Ok(None)
            }
            SetDirective::Toggle(name) => {
                let v = self.bool_mut(bool_opt(name)?);
                *v = !*v;
                Ok(None)
            }
            SetDirective::Query(name) => {
                if let Some(opt) = BoolOpt::lookup(name) {
                    Ok(Some(format_bool(opt.name(), self.bool_value(opt))))
                } else if let Some(opt) = NumOpt::lookup(name) {
                    Ok(Some(format!("{}={}", opt.name(), self.num_value(opt))))
                } else {
                    Err(unknown(name))
                }
            }
            SetDirective::Assign(name, value) => {
                let opt = NumOpt::lookup(name).ok_or_else(|| {
                    if BoolOpt::lookup(name).is_some() {
                        Error::invalid(format!("{name} is a boolean option"))
                    } else {
                        unknown(name)
                    }
                })?;
                let n: usize = value
                    .parse()
                    .ok()
                    .filter(|&n| n > 0)
                    .ok_or_else(|| Error::invalid(format!("{name}: expected a positive number, got {value:?}")))?;
                *self.num_mut(opt) = n;
                Ok(None)
            }
            SetDirective::ShowChanged => Ok(Some(self.describe(true))),
            SetDirective::ShowAll => Ok(Some(self.describe(false))),
        }
    }

    fn describe(&self, changed_only: bool) -> String {
        let defaults = Self::default();
        let mut parts = Vec::new();
        for opt in BoolOpt::ALL {
            let v = self.bool_value(opt);
            if !changed_only || v != defaults.bool_value(opt) {
                parts.push(format_bool(opt.name(), v));
            }
        }
        for opt in NumOpt::ALL {
            let v = self.num_value(opt);
            if !changed_only || v != defaults.num_value(opt) {
                parts.push(format!("{}={v}", opt.name()));
            }
        }
        parts.join("  ")
    }

    const fn bool_value(&self, opt: BoolOpt) -> bool {
        match opt {
            BoolOpt::IgnoreCase => self.ignore_case,
            BoolOpt::WrapScan => self.wrap_scan,
        }
    }

    const fn bool_mut(&mut self, opt: BoolOpt) -> &mut bool {
        match opt {
            BoolOpt::IgnoreCase => &mut self.ignore_case,
            BoolOpt::WrapScan => &mut self.wrap_scan,
        }
    }

    const fn num_value(&self, opt: NumOpt) -> usize {
        match opt {
            NumOpt::PageRows => self.page_rows,
            NumOpt::PageCols => self.page_cols,
            NumOpt::WidthStep => self.width_step,
        }
    }

    const fn num_mut(&mut self, opt: NumOpt) -> &mut usize {
        match opt {
            NumOpt::PageRows => &mut self.page_rows,
            NumOpt::PageCols => &mut self.page_cols,
            NumOpt::WidthStep => &mut self.width_step,
        }
    }
}

fn bool_opt(name: &str) -> Result<BoolOpt> {
    BoolOpt::lookup(name).ok_or_else(|| {
        if NumOpt::lookup(name).is_some() {
            Error::invalid(format!("{name} is a numeric option"))
        } else {
            unknown(name)
        }
    })
}

fn unknown(name: &str) -> Error {
    Error::invalid(format!("unknown option: {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- parsing -----------------------------------------------------------

    #[test]
    fn parse_forms() {
        assert_eq!(parse_set_arg("ic"), SetDirective::On("ic".into()));
        assert_eq!(parse_set_arg("noic"), SetDirective::Off("ic".into()));
        assert_eq!(parse_set_arg("wrapscan!"), SetDirective::Toggle("wrapscan".into()));
        assert_eq!(parse_set_arg("pagerows?"), SetDirective::Query("pagerows".into()));
        assert_eq!(
            parse_set_arg("pagerows=10"),
            SetDirective::Assign("pagerows".into(), "10".into())
        );
        assert_eq!(parse_set_arg("all"), SetDirective::ShowAll);
    }

    #[test]
    fn bare_numeric_is_a_query() {
        assert_eq!(parse_set_arg("pc"), SetDirective::Query("pc".into()));
    }

    #[test]
    fn no_prefix_needs_known_boolean() {
        assert_eq!(parse_set_arg("nothing"), SetDirective::On("nothing".into()));
    }

    #[test]
    fn empty_args_show_changed() {
        let none: [&str; 0] = [];
        assert_eq!(parse_set(&none), vec![SetDirective::ShowChanged]);
        assert_eq!(parse_set(&["ic", "pr=5"]).len(), 2);
    }

    // -- applying ----------------------------------------------------------

    #[test]
    fn defaults() {
        let o = Options::default();
        assert_eq!((o.page_rows, o.page_cols, o.width_step), (25, 15, 2));
        assert!(!o.ignore_case);
        assert!(o.wrap_scan);
    }

    #[test]
    fn boolean_directives() {
        let mut o = Options::default();
        o.apply(&parse_set_arg("ic")).unwrap();
        assert!(o.ignore_case);
        o.apply(&parse_set_arg("ws!")).unwrap();
        assert!(!o.wrap_scan);
        o.apply(&parse_set_arg("noignorecase")).unwrap();
        assert!(!o.ignore_case);
    }

    #[test]
    fn numeric_assign_and_query() {
        let mut o = Options::default();
        o.apply(&parse_set_arg("pagerows=10")).unwrap();
        assert_eq!(o.page_rows, 10);
        assert_eq!(
            o.apply(&parse_set_arg("pr")).unwrap(),
            Some("pagerows=10".to_owned())
        );
        assert_eq!(
            o.apply(&parse_set_arg("ic?")).unwrap(),
            Some("noignorecase".to_owned())
        );
    }

    #[test]
    fn bad_directives_are_rejected() {
        let mut o = Options::default();
        assert!(o.apply(&parse_set_arg("bogus")).is_err());
        assert!(o.apply(&parse_set_arg("pagerows=0")).is_err());
        assert!(o.apply(&parse_set_arg("pagerows=lots")).is_err());
        assert!(o.apply(&parse_set_arg("ic=3")).is_err());
        assert!(o.apply(&parse_set_arg("pagerows!")).is_err());
        assert_eq!(o, Options::default());
    }

    #[test]
    fn show_changed_lists_only_changes() {
        let mut o = Options::default();
        assert_eq!(o.apply(&SetDirective::ShowChanged).unwrap(), Some(String::new()));
        o.apply(&parse_set_arg("nows")).unwrap();
        o.apply(&parse_set_arg("wst=4")).unwrap();
        assert_eq!(
            o.apply(&SetDirective::ShowChanged).unwrap(),
            Some("nowrapscan  widthstep=4".to_owned())
        );
    }
}
