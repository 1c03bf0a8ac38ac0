//! Indentation-aware SQL text builder.
//!
//! `SqlWriter` is the single primitive every emitter writes through. It keeps
//! a buffer and an indent depth; scoped helpers (`with_indent`, `block`,
//! `try_catch`, `if_else`) take a closure and restore the depth on every
//! exit path, including early `?` returns and panics.
//!
//! ```ignore
//! let mut w = SqlWriter::new();
//! w.line("IF @@TRANCOUNT > 0");
//! w.block(|w| {
//!     w.line("ROLLBACK TRANSACTION;");
//!     Ok::<_, SqlError>(())
//! })?;
//! assert_eq!(w.finish(), "IF @@TRANCOUNT > 0\nBEGIN\n  ROLLBACK TRANSACTION;\nEND\n");
//! ```

use super::value::SqlValue;
use super::SqlError;

const INDENT: &str = "  ";

// =============================================================================
// Writer
// =============================================================================

/// Mutable SQL text buffer with a current indent depth.
///
/// Created per compile call and consumed by [`SqlWriter::finish`].
#[derive(Debug, Default)]
pub struct SqlWriter {
    buf: String,
    indent: usize,
    line_open: bool,
}

/// Restores the writer's indent depth when dropped.
struct IndentGuard<'a> {
    writer: &'a mut SqlWriter,
    levels: usize,
}

impl Drop for IndentGuard<'_> {
    fn drop(&mut self) {
        self.writer.indent -= self.levels;
    }
}

impl SqlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current indent depth.
    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Run `f` with the depth raised by `levels`; the depth is restored
    /// afterwards whatever `f` returns.
    pub fn with_indent<T, E>(
        &mut self,
        levels: usize,
        f: impl FnOnce(&mut SqlWriter) -> Result<T, E>,
    ) -> Result<T, E> {
        self.indent += levels;
        let guard = IndentGuard {
            writer: self,
            levels,
        };
        let result = f(&mut *guard.writer);
        drop(guard);
        result
    }

    /// Append a complete indent-prefixed line.
    pub fn line(&mut self, text: &str) {
        self.start_new_line(text);
        self.end_line();
    }

    /// Append each line of a multi-line string at the current indent.
    pub fn lines(&mut self, text: &str) {
        for l in text.lines() {
            self.line(l);
        }
    }

    /// Append raw text to the current line: no indent, no terminator.
    pub fn literal(&mut self, text: &str) {
        self.buf.push_str(text);
        self.line_open = true;
    }

    /// Begin a fresh indented line, closing the open one if any.
    pub fn start_new_line(&mut self, text: &str) {
        if self.line_open {
            self.buf.push('\n');
        }
        for _ in 0..self.indent {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text);
        self.line_open = true;
    }

    /// Terminate the open line, if any.
    pub fn end_line(&mut self) {
        if self.line_open {
            self.buf.push('\n');
            self.line_open = false;
        }
    }

    /// Terminate the open line and add an empty one.
    pub fn blank_line(&mut self) {
        self.end_line();
        self.buf.push('\n');
    }

    /// `BEGIN` / indented body / `END`.
    pub fn block<E>(&mut self, f: impl FnOnce(&mut SqlWriter) -> Result<(), E>) -> Result<(), E> {
        self.line("BEGIN");
        self.with_indent(1, |w| {
            f(w)?;
            w.end_line();
            Ok(())
        })?;
        self.line("END");
        Ok(())
    }

    /// `BEGIN TRY` / body / `END TRY` / `BEGIN CATCH` / handler / `END CATCH`.
    pub fn try_catch<E>(
        &mut self,
        try_fn: impl FnOnce(&mut SqlWriter) -> Result<(), E>,
        catch_fn: impl FnOnce(&mut SqlWriter) -> Result<(), E>,
    ) -> Result<(), E> {
        self.line("BEGIN TRY");
        self.with_indent(1, |w| {
            try_fn(w)?;
            w.end_line();
            Ok(())
        })?;
        self.line("END TRY");
        self.line("BEGIN CATCH");
        self.with_indent(1, |w| {
            catch_fn(w)?;
            w.end_line();
            Ok(())
        })?;
        self.line("END CATCH");
        Ok(())
    }

    /// `IF <condition>` followed by a `BEGIN`/`END` block.
    pub fn if_block<E>(
        &mut self,
        condition: &str,
        then_fn: impl FnOnce(&mut SqlWriter) -> Result<(), E>,
    ) -> Result<(), E> {
        self.line(&format!("IF {}", condition));
        self.block(then_fn)
    }

    /// `IF <condition>` block followed by an `ELSE` block.
    pub fn if_else<E>(
        &mut self,
        condition: &str,
        then_fn: impl FnOnce(&mut SqlWriter) -> Result<(), E>,
        else_fn: impl FnOnce(&mut SqlWriter) -> Result<(), E>,
    ) -> Result<(), E> {
        self.if_block(condition, then_fn)?;
        self.line("ELSE");
        self.block(else_fn)
    }

    /// Consume the writer and return the text.
    pub fn finish(self) -> String {
        self.buf
    }
}

// =============================================================================
// Quoting
// =============================================================================

/// Quote identifier with square brackets.
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

/// Quote a string literal, `'` doubled; non-ASCII text gets the `N` prefix.
pub fn quote_string(s: &str) -> String {
    let escaped = s.replace('\'', "''");
    if s.is_ascii() {
        format!("'{}'", escaped)
    } else {
        format!("N'{}'", escaped)
    }
}

/// Render a literal as T-SQL text for DDL and scripts.
///
/// The per-request query path never inlines values; it binds them through
/// the parameter registry instead.
pub fn quote_literal(value: &SqlValue) -> Result<String, SqlError> {
    match value {
        SqlValue::Null => Ok("NULL".into()),
        SqlValue::Bool(b) => Ok(if *b { "1" } else { "0" }.into()),
        SqlValue::Int(i) => Ok(i.to_string()),
        SqlValue::Float(f) if f.is_finite() => Ok(ryu::Buffer::new().format(*f).to_string()),
        SqlValue::String(s) => Ok(quote_string(s)),
        SqlValue::DateTime(dt) => Ok(format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.3f"))),
        SqlValue::Guid(g) => Ok(format!("'{}'", g.hyphenated())),
        SqlValue::Bytes(b) => Ok(format!(
            "CONVERT(VARBINARY(MAX), '0x{}', 1)",
            hex::encode_upper(b)
        )),
        other => Err(SqlError::UnsupportedValueKind(other.kind().into())),
    }
}

// =============================================================================
// Formatting helpers
// =============================================================================
//
// Pure string joins. They do not quote or sanitize anything: callers pass
// already-quoted identifiers and already-rendered literals.

/// `a, b, c`
pub fn column_list<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `(a, b), (c, d)`
pub fn parenthesized_row_list<S: AsRef<str>>(rows: &[Vec<S>]) -> String {
    rows.iter()
        .map(|row| format!("({})", column_list(row)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One item per line, every line but the last ending in `,`.
pub fn comma_join_lines<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",\n")
}
