//! Statement assembly.
//!
//! Produces the result statement and, when a total is requested, the count
//! statement over the same source and filter:
//!
//! ```text
//! SELECT [$Type] = 'Result', RESULTS.[Name]
//! FROM [dbo].[GetOrders](@0, DEFAULT) RESULTS
//! WHERE [Age] > @1
//! ORDER BY [Name] ASC
//! OFFSET 0 ROWS FETCH NEXT 50 ROWS ONLY;
//!
//! SELECT [$Type] = '$Root', [TotalRecords] = COUNT(*)
//! FROM [dbo].[GetOrders](@0, DEFAULT) RESULTS
//! WHERE [Age] > @1;
//!
//! ```

use super::target::{Target, RESULTS_ALIAS};
use super::where_clause::WhereCompiler;
use super::{CompileError, CompileOptions, CompileResult, CompiledQuery};
use crate::catalog::sanitize;
use crate::request::{QueryRequest, SortExpr};
use crate::sql::{ParameterRegistry, SqlWriter, Token, TokenStream};

const RESULT_TYPE: &str = "Result";
const ROOT_TYPE: &str = "$Root";

pub struct QueryCompiler<'a> {
    options: &'a CompileOptions,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Self { options }
    }

    /// Compile `request` against `target`.
    ///
    /// `params` already holds the function call arguments, if any; filter
    /// literals are registered after them.
    pub fn compile(
        &self,
        request: &QueryRequest,
        target: &Target,
        mut params: ParameterRegistry,
    ) -> CompileResult<CompiledQuery> {
        let source = target.source().serialize();
        let filter = request
            .filter
            .as_ref()
            .map(|node| WhereCompiler::new(&mut params).compile(node))
            .transpose()?;

        let mut w = SqlWriter::new();

        w.start_new_line(&result_projection(&request.fields).serialize());
        w.start_new_line(&format!("FROM {}", source));
        if let Some(text) = &filter {
            write_clause(&mut w, "WHERE", text);
        }
        if !request.grouping.is_empty() {
            let mut ts = TokenStream::new();
            ts.comma_separated(
                request
                    .grouping
                    .iter()
                    .map(|g| Token::Ident(g.column.clone()).into()),
            );
            write_clause(&mut w, &Token::GroupBy.serialize(), &ts.serialize());
        }
        if let Some(order_by) = self.order_by(request) {
            write_clause(&mut w, "ORDER BY", &order_by);
        }
        if request.is_paged() {
            w.start_new_line(&self.paging(request)?);
        }
        end_statement(&mut w);

        if request.show_total {
            w.start_new_line(&count_projection().serialize());
            w.start_new_line(&format!("FROM {}", source));
            if let Some(text) = &filter {
                write_clause(&mut w, "WHERE", text);
            }
            end_statement(&mut w);
        }

        Ok(CompiledQuery {
            sql: w.finish(),
            params,
        })
    }

    /// Sort items, or `1 ASC` when paging needs a deterministic order.
    fn order_by(&self, request: &QueryRequest) -> Option<String> {
        if request.sort.is_empty() {
            return (request.skip.is_some() || request.take.is_some()).then(|| {
                let mut ts = TokenStream::new();
                ts.push(Token::LitInt(1)).space().push(Token::Asc);
                ts.serialize()
            });
        }

        let mut ts = TokenStream::new();
        ts.comma_separated(request.sort.iter().map(|s| {
            let mut item = TokenStream::from(match &s.expression {
                SortExpr::Column(name) => Token::Ident(name.clone()),
                SortExpr::Literal(text) => Token::Raw(sanitize(text)),
            });
            item.space()
                .push(if s.descending { Token::Desc } else { Token::Asc });
            item
        }));
        Some(ts.serialize())
    }

    /// `OFFSET n ROWS FETCH NEXT m ROWS ONLY`
    fn paging(&self, request: &QueryRequest) -> CompileResult<String> {
        let skip = request.skip.unwrap_or(0);
        let take = request.take.unwrap_or(self.options.default_take);
        let mut ts = TokenStream::new();
        ts.push(Token::Offset)
            .space()
            .push(Token::LitInt(row_count("skip", skip)?))
            .space()
            .push(Token::Rows)
            .space()
            .push(Token::Fetch)
            .space()
            .push(Token::Next)
            .space()
            .push(Token::LitInt(row_count("take", take)?))
            .space()
            .push(Token::Rows)
            .space()
            .push(Token::Only);
        Ok(ts.serialize())
    }
}

fn row_count(name: &str, value: u64) -> CompileResult<i64> {
    i64::try_from(value)
        .map_err(|_| CompileError::InvalidRequest(format!("{} is out of range: {}", name, value)))
}

/// `SELECT [$Type] = '<tag>', `
fn type_tag(tag: &str) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::Select)
        .space()
        .push(Token::Raw("[$Type]".into()))
        .space()
        .push(Token::Eq)
        .space()
        .push(Token::LitString(tag.into()))
        .comma()
        .space();
    ts
}

fn result_projection(fields: &[String]) -> TokenStream {
    let mut ts = type_tag(RESULT_TYPE);
    if fields.is_empty() {
        ts.push(Token::Raw(RESULTS_ALIAS.into()))
            .push(Token::Dot)
            .push(Token::Star);
    } else {
        ts.comma_separated(fields.iter().map(|f| {
            let mut item = TokenStream::from(Token::Raw(RESULTS_ALIAS.into()));
            item.push(Token::Dot).push(Token::Ident(f.clone()));
            item
        }));
    }
    ts
}

fn count_projection() -> TokenStream {
    let mut ts = type_tag(ROOT_TYPE);
    ts.push(Token::Ident("TotalRecords".into()))
        .space()
        .push(Token::Eq)
        .space()
        .push(Token::Count)
        .lparen()
        .push(Token::Star)
        .rparen();
    ts
}

/// Write `KEYWORD body`, continuing a multi-line body at column zero.
fn write_clause(w: &mut SqlWriter, keyword: &str, body: &str) {
    w.start_new_line(keyword);
    w.literal(" ");
    for (i, line) in body.lines().enumerate() {
        if i == 0 {
            w.literal(line);
        } else {
            w.start_new_line(line);
        }
    }
}

fn end_statement(w: &mut SqlWriter) {
    w.literal(";");
    w.blank_line();
}
