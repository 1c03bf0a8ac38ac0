//! Filter tree to SQL boolean text.
//!
//! Columns become bracket-quoted sanitized identifiers, non-null literals
//! become placeholders registered in first-reference order, and connectives
//! go on their own line:
//!
//! ```text
//! [Status] = @0
//! AND
//! [Age] > @1
//! ```
//!
//! A connective's operand is parenthesized only when it is itself a
//! connective, so flat chains stay unbracketed.

use super::CompileResult;
use crate::filter::{ComparisonOp, FilterError, FilterNode};
use crate::sql::{ParameterRegistry, SqlValue, SqlWriter, Token};

pub struct WhereCompiler<'a> {
    params: &'a mut ParameterRegistry,
}

impl<'a> WhereCompiler<'a> {
    pub fn new(params: &'a mut ParameterRegistry) -> Self {
        Self { params }
    }

    /// Render `node` as standalone text.
    pub fn compile(&mut self, node: &FilterNode) -> CompileResult<String> {
        let mut w = SqlWriter::new();
        self.write(node, &mut w)?;
        Ok(w.finish())
    }

    /// Render `node` onto the writer's open line.
    pub fn write(&mut self, node: &FilterNode, w: &mut SqlWriter) -> CompileResult<()> {
        match node {
            FilterNode::Column(name) => {
                w.literal(&Token::Ident(name.clone()).serialize());
            }
            FilterNode::Literal(value) => self.write_literal(value, w),
            FilterNode::Compare { left, op, right } => self.write_compare(left, *op, right, w)?,
            FilterNode::Logical { left, op, right } => {
                self.write_connective_operand(left, w)?;
                w.start_new_line(op.sql_keyword());
                w.start_new_line("");
                self.write_connective_operand(right, w)?;
            }
            FilterNode::Not(inner) => {
                w.literal("NOT (");
                self.write(inner, w)?;
                w.literal(")");
            }
        }
        Ok(())
    }

    fn write_literal(&mut self, value: &SqlValue, w: &mut SqlWriter) {
        if value.is_null() {
            w.literal(&Token::Null.serialize());
        } else {
            let name = self.params.register(value.clone());
            w.literal(&Token::Placeholder(name).serialize());
        }
    }

    fn write_group(&mut self, node: &FilterNode, w: &mut SqlWriter) -> CompileResult<()> {
        w.literal("(");
        w.with_indent(1, |w| self.write(node, w))?;
        w.literal(")");
        Ok(())
    }

    fn write_connective_operand(&mut self, node: &FilterNode, w: &mut SqlWriter) -> CompileResult<()> {
        if node.is_logical() {
            self.write_group(node, w)
        } else {
            self.write(node, w)
        }
    }

    fn write_comparison_operand(&mut self, node: &FilterNode, w: &mut SqlWriter) -> CompileResult<()> {
        match node {
            FilterNode::Column(_) | FilterNode::Literal(_) => self.write(node, w),
            nested => self.write_group(nested, w),
        }
    }

    fn write_compare(
        &mut self,
        left: &FilterNode,
        op: ComparisonOp,
        right: &FilterNode,
        w: &mut SqlWriter,
    ) -> CompileResult<()> {
        self.write_comparison_operand(left, w)?;

        if op.is_pattern() {
            let value = match right {
                FilterNode::Literal(value) => value,
                other => {
                    return Err(FilterError::InvalidOperand(format!(
                        "'{}' needs a literal right operand, found {:?}",
                        op, other
                    ))
                    .into())
                }
            };
            let text = value.pattern_text().map_err(FilterError::from)?;
            w.literal(&format!(" {} ", op.sql_operator()));
            self.write_literal(&SqlValue::String(op.pattern(&text)), w);
            return Ok(());
        }

        let null_right = matches!(right, FilterNode::Literal(SqlValue::Null));
        let sql_op = match (op, null_right) {
            (ComparisonOp::Eq, true) => "IS",
            (ComparisonOp::Ne, true) => "IS NOT",
            _ => op.sql_operator(),
        };
        w.literal(&format!(" {} ", sql_op));
        self.write_comparison_operand(right, w)
    }
}
