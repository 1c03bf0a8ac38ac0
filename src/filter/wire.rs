//! Grid wire filters.
//!
//! The wire form is a JSON array alternating operands and operators:
//!
//! ```text
//! ["Age", ">", 18]
//! [["Status", "=", "Active"], "and", ["Age", ">", 18]]
//! ["!", ["Name", "contains", "x"]]
//! ```
//!
//! Operands in the first position are column names or nested groups; each
//! following `(operator, operand)` pair is folded into the node built so far.

use serde_json::Value;

use super::{ComparisonOp, FilterError, FilterNode, FilterResult, LogicalOp};
use crate::sql::SqlValue;

const NEGATION: &str = "!";

/// Fold a wire filter array into a [`FilterNode`].
pub fn parse_wire_filter(value: &Value) -> FilterResult<FilterNode> {
    group(value)
}

fn group(value: &Value) -> FilterResult<FilterNode> {
    match value {
        Value::Array(items) => fold(items),
        other => Err(FilterError::InvalidWireFormat(format!(
            "expected a filter array, found {}",
            other
        ))),
    }
}

fn fold(items: &[Value]) -> FilterResult<FilterNode> {
    let (first, rest) = items
        .split_first()
        .ok_or_else(|| FilterError::InvalidWireFormat("empty filter group".into()))?;

    if first.as_str() == Some(NEGATION) {
        return match rest {
            [inner] => Ok(FilterNode::negate(group(inner)?)),
            _ => Err(FilterError::InvalidWireFormat(
                "'!' must be followed by exactly one group".into(),
            )),
        };
    }

    let mut acc = operand(first)?;

    // [column, value] is shorthand for equality
    if let (FilterNode::Column(_), [value]) = (&acc, rest) {
        return Ok(FilterNode::compare(acc, ComparisonOp::Eq, literal(value)?));
    }

    let mut iter = rest.iter();
    while let Some(token) = iter.next() {
        if token.is_array() {
            acc = acc.and(group(token)?);
            continue;
        }

        let text = token.as_str().ok_or_else(|| {
            FilterError::InvalidWireFormat(format!("expected an operator, found {}", token))
        })?;
        let next = iter.next().ok_or_else(|| {
            FilterError::InvalidWireFormat(format!("operator '{}' has no right operand", text))
        })?;

        acc = if let Some(op) = LogicalOp::from_keyword(text) {
            FilterNode::logical(acc, op, group(next)?)
        } else if let Some(op) = ComparisonOp::from_token(text) {
            let right = if next.is_array() {
                group(next)?
            } else {
                literal(next)?
            };
            FilterNode::compare(acc, op, right)
        } else {
            return Err(FilterError::UnsupportedOperator(text.to_string()));
        };
    }

    match acc {
        FilterNode::Column(name) => Err(FilterError::InvalidWireFormat(format!(
            "column '{}' has no comparison",
            name
        ))),
        node => Ok(node),
    }
}

fn operand(value: &Value) -> FilterResult<FilterNode> {
    match value {
        Value::String(name) => Ok(FilterNode::column(name.as_str())),
        Value::Array(items) => fold(items),
        other => Err(FilterError::InvalidWireFormat(format!(
            "expected a column name or group, found {}",
            other
        ))),
    }
}

fn literal(value: &Value) -> FilterResult<FilterNode> {
    Ok(FilterNode::Literal(SqlValue::from_json(value)?))
}
