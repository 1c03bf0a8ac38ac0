//! OData `$filter` parser.
//!
//! Supported grammar (keywords case-insensitive):
//!
//! ```text
//! filter     := term (("and" | "or") term)*
//! term       := column op value | "(" filter ")" | "not" "(" filter ")"
//! op         := eq | ne | gt | ge | lt | le
//!             | contains | notcontains | startswith | endswith
//! value      := 'text' | integer | decimal | null | true | false
//! ```
//!
//! Connectives fold left with no precedence between `and` and `or`;
//! parentheses group. The parser is a single left-to-right scan over a
//! stack of open groups.

use std::sync::LazyLock;

use regex::Regex;

use super::{ComparisonOp, FilterError, FilterNode, FilterResult, LogicalOp};
use crate::sql::SqlValue;

static IDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+").unwrap());

static COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(notcontains|contains|startswith|endswith|eq|ne|ge|gt|le|lt)(?:[^A-Za-z0-9_]|$)",
    )
    .unwrap()
});

static LOGICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(and|or)(?:[^A-Za-z0-9_]|$)").unwrap());

static STRING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^'((?:[^']|'')*)'").unwrap());

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?").unwrap());

static KEYWORD_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(null|true|false)(?:[^A-Za-z0-9_]|$)").unwrap());

static NOT_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^not\s*\(").unwrap());

const FRAGMENT_LEN: usize = 10;

/// Parse an OData filter string into a [`FilterNode`].
pub fn parse_odata_filter(input: &str) -> FilterResult<FilterNode> {
    let node = Parser::new(input).parse()?;
    tracing::debug!(filter = input, "parsed OData filter");
    Ok(node)
}

/// What the scanner accepts next.
#[derive(Debug)]
enum Expect {
    Operand,
    Comparison(String),
    Value(String, ComparisonOp),
    Connective,
}

/// One open group.
#[derive(Debug, Default)]
struct Scope {
    expr: Option<FilterNode>,
    pending: Option<(FilterNode, LogicalOp)>,
    negated: bool,
}

impl Scope {
    fn negated() -> Self {
        Self {
            negated: true,
            ..Self::default()
        }
    }

    fn attach(&mut self, node: FilterNode) {
        self.expr = Some(match self.pending.take() {
            Some((left, op)) => FilterNode::logical(left, op, node),
            None => node,
        });
    }

    fn finish(self) -> Option<FilterNode> {
        let expr = self.expr?;
        Some(if self.negated {
            FilterNode::negate(expr)
        } else {
            expr
        })
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    stack: Vec<Scope>,
    expect: Expect,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            stack: vec![Scope::default()],
            expect: Expect::Operand,
        }
    }

    fn rest(&self) -> &'a str {
        let input: &'a str = self.input;
        &input[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, message: impl Into<String>) -> FilterError {
        FilterError::Parse {
            message: message.into(),
            fragment: self.rest().chars().take(FRAGMENT_LEN).collect(),
        }
    }

    fn scope(&mut self) -> FilterResult<&mut Scope> {
        self.stack
            .last_mut()
            .ok_or_else(|| FilterError::Parse {
                message: "no open group".into(),
                fragment: String::new(),
            })
    }

    /// Consume the whole match of `re` at the cursor, returning capture 1
    /// (or the whole match when there is no group).
    fn eat(&mut self, re: &Regex) -> Option<&'a str> {
        let rest = self.rest();
        let caps = re.captures(rest)?;
        let whole = caps.get(0)?;
        let text = caps.get(1).unwrap_or(whole).as_str();
        self.pos += whole.end();
        Some(text)
    }

    /// Consume only capture 1 of `re`, leaving the trailing boundary
    /// character for the next step.
    fn eat_keyword(&mut self, re: &Regex) -> Option<&'a str> {
        let rest = self.rest();
        let keyword = re.captures(rest)?.get(1)?;
        self.pos += keyword.end();
        Some(keyword.as_str())
    }

    fn eat_char(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn parse(mut self) -> FilterResult<FilterNode> {
        loop {
            self.skip_whitespace();
            if self.rest().is_empty() {
                break;
            }
            let expect = std::mem::replace(&mut self.expect, Expect::Operand);
            self.expect = self.step(expect)?;
        }

        if self.stack.len() > 1 {
            return Err(self.error("unbalanced '(' in filter"));
        }
        if !matches!(self.expect, Expect::Connective) {
            return Err(self.error("unexpected end of filter"));
        }
        self.stack
            .pop()
            .and_then(Scope::finish)
            .ok_or_else(|| self.error("empty filter"))
    }

    fn step(&mut self, expect: Expect) -> FilterResult<Expect> {
        match expect {
            Expect::Operand => {
                if self.eat_char('(') {
                    self.stack.push(Scope::default());
                    Ok(Expect::Operand)
                } else if self.eat(&NOT_GROUP).is_some() {
                    self.stack.push(Scope::negated());
                    Ok(Expect::Operand)
                } else if let Some(column) = self.eat(&IDENT) {
                    Ok(Expect::Comparison(column.to_string()))
                } else {
                    Err(self.error("expected a column name or '('"))
                }
            }
            Expect::Comparison(column) => {
                let op = self
                    .eat_keyword(&COMPARISON)
                    .and_then(ComparisonOp::from_keyword)
                    .ok_or_else(|| self.error("expected a comparison operator"))?;
                Ok(Expect::Value(column, op))
            }
            Expect::Value(column, op) => {
                let value = self.value()?;
                let node = FilterNode::compare(
                    FilterNode::Column(column),
                    op,
                    FilterNode::Literal(value),
                );
                self.scope()?.attach(node);
                Ok(Expect::Connective)
            }
            Expect::Connective => {
                if self.eat_char(')') {
                    self.close_group()?;
                    Ok(Expect::Connective)
                } else if let Some(op) = self
                    .eat_keyword(&LOGICAL)
                    .and_then(LogicalOp::from_keyword)
                {
                    let left = self.scope()?.expr.take();
                    match left {
                        Some(left) => {
                            self.scope()?.pending = Some((left, op));
                            Ok(Expect::Operand)
                        }
                        None => Err(self.error("connective without a left operand")),
                    }
                } else {
                    Err(self.error("expected 'and', 'or' or ')'"))
                }
            }
        }
    }

    fn close_group(&mut self) -> FilterResult<()> {
        if self.stack.len() < 2 {
            return Err(self.error("unbalanced ')' in filter"));
        }
        let node = self
            .stack
            .pop()
            .and_then(Scope::finish)
            .ok_or_else(|| self.error("empty group"))?;
        self.scope()?.attach(node);
        Ok(())
    }

    fn value(&mut self) -> FilterResult<SqlValue> {
        if let Some(text) = self.eat(&STRING) {
            return Ok(SqlValue::String(text.replace("''", "'")));
        }
        if let Some(keyword) = self.eat_keyword(&KEYWORD_VALUE) {
            return Ok(match keyword.to_ascii_lowercase().as_str() {
                "true" => SqlValue::Bool(true),
                "false" => SqlValue::Bool(false),
                _ => SqlValue::Null,
            });
        }
        let start = self.pos;
        if let Some(number) = self.eat(&NUMBER) {
            let parsed = if number.contains('.') {
                number.parse::<f64>().ok().map(SqlValue::Float)
            } else {
                number.parse::<i64>().ok().map(SqlValue::Int)
            };
            return parsed.ok_or_else(|| {
                self.pos = start;
                self.error("number out of range")
            });
        }
        Err(self.error("expected a value"))
    }
}
