//! Scripting: a small s-expression language over the session.
//!
//! The `eval` command hands its text to [`eval`] together with a
//! [`ScriptHost`], the narrow surface scripts may touch: the cursor, the
//! current cell, and the model's size.
//!
//! ```text
//! (set-cell (concat (cell) "!"))
//! (set-cursor-row (+ (cursor-row) 10))
//! (resize (+ (nth 0 (dimensions)) 1) 4)
//! ```
//!
//! | Form                   | Value                                  |
//! |------------------------|----------------------------------------|
//! | `(cursor-row)`         | selected row                           |
//! | `(cursor-col)`         | selected column                        |
//! | `(set-cursor-row n)`   | moves, returns the clamped row         |
//! | `(set-cursor-col n)`   | moves, returns the clamped column      |
//! | `(cell)`               | current cell text                      |
//! | `(set-cell v)`         | writes `v` as text, returns it         |
//! | `(dimensions)`         | `(rows cols)`                          |
//! | `(resize r c)`         | resizes the model, returns nil         |
//! | `(nth i list)`         | element `i` of a list                  |
//! | `(+ a …)` `(- a …)`    | integer arithmetic                     |
//! | `(concat a …)`         | text of each argument joined           |
//!
//! Several top-level forms may be given; the value of the last is returned.
//! Integer arguments also accept text that parses as an integer, so
//! `(+ (cell) 1)` works on numeric cells.

use std::fmt;

use crate::error::{Error, Result};

/// What scripts can reach.
pub trait ScriptHost {
    /// The selected cell as `(row, col)`.
    fn cursor(&self) -> (usize, usize);

    /// Move the selection, clamped to the model.
    fn set_cursor(&mut self, row: isize, col: isize);

    fn current_value(&self) -> String;

    /// # Errors
    ///
    /// [`Error::ReadOnlyModel`] and bounds errors.
    fn set_current_value(&mut self, value: &str) -> Result<()>;

    /// `(rows, cols)`.
    fn dimensions(&self) -> (usize, usize);

    /// # Errors
    ///
    /// [`Error::ReadOnlyModel`].
    fn resize(&mut self, rows: usize, cols: usize) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// The result of evaluating a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Nil,
    Int(i64),
    Str(String),
    List(Vec<Value>),
}

impl Value {
    /// Text for cells and `concat`: strings unquoted, nil empty.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Nil => String::new(),
            Self::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| script_err(format!("not an integer: {s:?}"))),
            other => Err(script_err(format!("not an integer: {other}"))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("nil"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

fn script_err(msg: impl Into<String>) -> Error {
    Error::Script(msg.into())
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Int(i64),
    Str(String),
    Symbol(String),
    List(Vec<Expr>),
}

/// Deepest list nesting the reader accepts.
const MAX_DEPTH: usize = 256;

struct Reader<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Reader<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
        }
    }

    fn skip_blank(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == ';' {
                while self.chars.next_if(|&c| c != '\n').is_some() {}
            } else if c.is_whitespace() {
                self.chars.next();
            } else {
                break;
            }
        }
    }

    fn read_all(&mut self) -> Result<Vec<Expr>> {
        let mut forms = Vec::new();
        loop {
            self.skip_blank();
            if self.chars.peek().is_none() {
                return Ok(forms);
            }
            forms.push(self.read(0)?);
        }
    }

    fn read(&mut self, depth: usize) -> Result<Expr> {
        self.skip_blank();
        match self.chars.next() {
            None => Err(script_err("unexpected end of input")),
            Some('(') if depth >= MAX_DEPTH => Err(script_err("nesting too deep")),
            Some('(') => {
                let mut items = Vec::new();
                loop {
                    self.skip_blank();
                    match self.chars.peek() {
                        None => return Err(script_err("missing )")),
                        Some(')') => {
                            self.chars.next();
                            return Ok(Expr::List(items));
                        }
                        Some(_) => items.push(self.read(depth + 1)?),
                    }
                }
            }
            Some(')') => Err(script_err("unexpected )")),
            Some('"') => self.read_string(),
            Some(c) => {
                let mut atom = String::from(c);
                while let Some(c) = self
                    .chars
                    .next_if(|&c| !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | ';'))
                {
                    atom.push(c);
                }
                Ok(atom
                    .parse()
                    .map_or_else(|_| Expr::Symbol(atom), Expr::Int))
            }
        }
    }

    fn read_string(&mut self) -> Result<Expr> {
        let mut s = String::new();
        loop {
            match self.chars.next() {
                None => return Err(script_err("unterminated string")),
                Some('"') => return Ok(Expr::Str(s)),
                Some('\\') => match self.chars.next() {
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some(c) => s.push(c),
                    None => return Err(script_err("unterminated string")),
                },
                Some(c) => s.push(c),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate `src` against `host` and return the last form's value.
///
/// # Errors
///
/// [`Error::Script`] for syntax and type errors, plus any error from the
/// host.
pub fn eval(host: &mut dyn ScriptHost, src: &str) -> Result<Value> {
    let forms = Reader::new(src).read_all()?;
    if forms.is_empty() {
        return Err(script_err("nothing to evaluate"));
    }
    let mut last = Value::Nil;
    for form in &forms {
        last = eval_expr(host, form)?;
    }
    Ok(last)
}

fn eval_expr(host: &mut dyn ScriptHost, expr: &Expr) -> Result<Value> {
    match expr {
        Expr::Int(n) => Ok(Value::Int(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Symbol(s) if s == "nil" => Ok(Value::Nil),
        Expr::Symbol(s) => Err(script_err(format!("unbound symbol: {s}"))),
        Expr::List(items) => {
            let Some((head, rest)) = items.split_first() else {
                return Ok(Value::Nil);
            };
            let Expr::Symbol(name) = head else {
                return Err(script_err(format!("not a function: {}", show(head))));
            };
            let args = rest
                .iter()
                .map(|e| eval_expr(host, e))
                .collect::<Result<Vec<_>>>()?;
            call(host, name, &args)
        }
    }
}

fn call(host: &mut dyn ScriptHost, name: &str, args: &[Value]) -> Result<Value> {
    match name {
        "cursor-row" => {
            arity(name, args, 0)?;
            Ok(int(host.cursor().0))
        }
        "cursor-col" => {
            arity(name, args, 0)?;
            Ok(int(host.cursor().1))
        }
        "set-cursor-row" => {
            arity(name, args, 1)?;
            let (_, col) = host.cursor();
            host.set_cursor(to_isize(args[0].as_int()?), to_isize_usize(col));
            Ok(int(host.cursor().0))
        }
        "set-cursor-col" => {
            arity(name, args, 1)?;
            let (row, _) = host.cursor();
            host.set_cursor(to_isize_usize(row), to_isize(args[0].as_int()?));
            Ok(int(host.cursor().1))
        }
        "cell" => {
            arity(name, args, 0)?;
            Ok(Value::Str(host.current_value()))
        }
        "set-cell" => {
            arity(name, args, 1)?;
            let text = args[0].to_text();
            host.set_current_value(&text)?;
            Ok(Value::Str(text))
        }
        "dimensions" => {
            arity(name, args, 0)?;
            let (rows, cols) = host.dimensions();
            Ok(Value::List(vec![int(rows), int(cols)]))
        }
        "resize" => {
            arity(name, args, 2)?;
            let rows = to_count(args[0].as_int()?)?;
            let cols = to_count(args[1].as_int()?)?;
            host.resize(rows, cols)?;
            Ok(Value::Nil)
        }
        "nth" => {
            arity(name, args, 2)?;
            let i = args[0].as_int()?;
            let Value::List(items) = &args[1] else {
                return Err(script_err(format!("nth: not a list: {}", args[1])));
            };
            Ok(usize::try_from(i)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or(Value::Nil))
        }
        "+" => {
            let mut sum: i64 = 0;
            for a in args {
                sum = sum.checked_add(a.as_int()?).ok_or_else(|| script_err("overflow"))?;
            }
            Ok(Value::Int(sum))
        }
        "-" => match args {
            [] => Err(script_err("-: expected at least 1 argument")),
            [only] => Ok(Value::Int(only.as_int()?.checked_neg().ok_or_else(|| script_err("overflow"))?)),
            [first, rest @ ..] => {
                let mut acc = first.as_int()?;
                for a in rest {
                    acc = acc.checked_sub(a.as_int()?).ok_or_else(|| script_err("overflow"))?;
                }
                Ok(Value::Int(acc))
            }
        },
        "concat" => Ok(Value::Str(args.iter().map(Value::to_text).collect())),
        other => Err(script_err(format!("unknown function: {other}"))),
    }
}

fn arity(name: &str, args: &[Value], n: usize) -> Result<()> {
    if args.len() == n {
        Ok(())
    } else {
        Err(script_err(format!("{name}: expected {n} argument(s), got {}", args.len())))
    }
}

fn int(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn to_isize(n: i64) -> isize {
    isize::try_from(n).unwrap_or(if n < 0 { isize::MIN } else { isize::MAX })
}

fn to_isize_usize(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

fn to_count(n: i64) -> Result<usize> {
    usize::try_from(n).map_err(|_| script_err(format!("expected a non-negative size, got {n}")))
}

fn show(expr: &Expr) -> String {
    match expr {
        Expr::Int(n) => n.to_string(),
        Expr::Str(s) => format!("{s:?}"),
        Expr::Symbol(s) => s.clone(),
        Expr::List(_) => "(…)".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MutableModel, StdModel, TabularModel};
    use pretty_assertions::assert_eq;

    struct Host {
        model: StdModel,
        row: usize,
        col: usize,
    }

    impl Host {
        fn new() -> Self {
            Self {
                model: StdModel::from_rows([["a", "1"], ["b", "2"], ["c", "3"]]),
                row: 0,
                col: 0,
            }
        }
    }

    impl ScriptHost for Host {
        fn cursor(&self) -> (usize, usize) {
            (self.row, self.col)
        }

        fn set_cursor(&mut self, row: isize, col: isize) {
            let (rows, cols) = self.model.dimensions();
            self.row = usize::try_from(row.max(0)).unwrap().min(rows - 1);
            self.col = usize::try_from(col.max(0)).unwrap().min(cols - 1);
        }

        fn current_value(&self) -> String {
            self.model.cell_value(self.row, self.col).to_owned()
        }

        fn set_current_value(&mut self, value: &str) -> Result<()> {
            self.model.set_cell_value(self.row, self.col, value)
        }

        fn dimensions(&self) -> (usize, usize) {
            self.model.dimensions()
        }

        fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
            self.model.resize(rows, cols);
            Ok(())
        }
    }

    fn run(host: &mut Host, src: &str) -> Result<Value> {
        eval(host, src)
    }

    #[test]
    fn literals_and_arithmetic() {
        let mut h = Host::new();
        assert_eq!(run(&mut h, "42").unwrap(), Value::Int(42));
        assert_eq!(run(&mut h, "(+ 1 2 3)").unwrap(), Value::Int(6));
        assert_eq!(run(&mut h, "(- 10 4 1)").unwrap(), Value::Int(5));
        assert_eq!(run(&mut h, "(- 3)").unwrap(), Value::Int(-3));
        assert_eq!(run(&mut h, "(+)").unwrap(), Value::Int(0));
    }

    #[test]
    fn cursor_access() {
        let mut h = Host::new();
        assert_eq!(run(&mut h, "(set-cursor-row 2)").unwrap(), Value::Int(2));
        assert_eq!(run(&mut h, "(set-cursor-col 9)").unwrap(), Value::Int(1));
        assert_eq!((h.row, h.col), (2, 1));
        assert_eq!(run(&mut h, "(cell)").unwrap(), Value::Str("3".into()));
        assert_eq!(run(&mut h, "(set-cursor-row (- 5))").unwrap(), Value::Int(0));
    }

    #[test]
    fn cell_write_and_numeric_text() {
        let mut h = Host::new();
        h.col = 1;
        assert_eq!(run(&mut h, "(set-cell (+ (cell) 10))").unwrap(), Value::Str("11".into()));
        assert_eq!(h.model.cell_value(0, 1), "11");
        run(&mut h, r#"(set-cell (concat "x" (cell) "-" nil))"#).unwrap();
        assert_eq!(h.model.cell_value(0, 1), "x11-");
    }

    #[test]
    fn dimensions_and_resize() {
        let mut h = Host::new();
        assert_eq!(run(&mut h, "(dimensions)").unwrap().to_string(), "(3 2)");
        run(&mut h, "(resize (+ (nth 0 (dimensions)) 1) 4)").unwrap();
        assert_eq!(h.model.dimensions(), (4, 4));
    }

    #[test]
    fn last_form_wins_and_comments() {
        let mut h = Host::new();
        let v = run(&mut h, "(set-cursor-row 1) ; go down\n(cell)").unwrap();
        assert_eq!(v, Value::Str("b".into()));
        assert_eq!(v.to_string(), "\"b\"");
        assert_eq!(v.to_text(), "b");
    }

    #[test]
    fn errors() {
        let mut h = Host::new();
        for src in [
            "",
            "(cell",
            ")",
            "\"open",
            "(nope)",
            "foo",
            "(1 2)",
            "(+ 1 \"x\")",
            "(cell 1)",
            "(resize -1 2)",
        ] {
            assert!(matches!(run(&mut h, src), Err(Error::Script(_))), "{src:?}");
        }
    }

    #[test]
    fn nesting_is_bounded() {
        let mut h = Host::new();
        let deepest = format!("{}0{}", "(+ 1 ".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(run(&mut h, &deepest).unwrap(), Value::Int(256));

        let too_deep = format!("{}0{}", "(+ 1 ".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        for src in [too_deep, "(".repeat(200_000)] {
            let err = run(&mut h, &src).unwrap_err();
            assert!(matches!(&err, Error::Script(m) if m == "nesting too deep"), "{err}");
        }
    }

    #[test]
    fn host_errors_pass_through() {
        struct ReadOnly;
        impl ScriptHost for ReadOnly {
            fn cursor(&self) -> (usize, usize) {
                (0, 0)
            }
            fn set_cursor(&mut self, _: isize, _: isize) {}
            fn current_value(&self) -> String {
                String::new()
            }
            fn set_current_value(&mut self, _: &str) -> Result<()> {
                Err(Error::ReadOnlyModel)
            }
            fn dimensions(&self) -> (usize, usize) {
                (1, 1)
            }
            fn resize(&mut self, _: usize, _: usize) -> Result<()> {
                Err(Error::ReadOnlyModel)
            }
        }
        assert!(matches!(eval(&mut ReadOnly, "(set-cell 1)"), Err(Error::ReadOnlyModel)));
    }
}
