//! Filter expression trees.
//!
//! A filter arrives either as an OData string (`Age gt 18 and Status eq 'A'`,
//! see [`odata`]) or as the grid wire array (`[["Age", ">", 18], "and", …]`,
//! see [`wire`]). Both are folded into the same owned [`FilterNode`] tree,
//! which the WHERE compiler renders.

pub mod odata;
pub mod wire;

use std::fmt;

use crate::sql::{SqlError, SqlValue};

pub use odata::parse_odata_filter;
pub use wire::parse_wire_filter;

/// Errors raised while reading a filter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("{message} near '{fragment}'")]
    Parse { message: String, fragment: String },

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid filter: {0}")]
    InvalidWireFormat(String),

    #[error("Invalid operand: {0}")]
    InvalidOperand(String),
}

impl From<SqlError> for FilterError {
    fn from(err: SqlError) -> Self {
        FilterError::InvalidOperand(err.to_string())
    }
}

pub type FilterResult<T> = Result<T, FilterError>;

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
}

impl ComparisonOp {
    /// Resolve an OData keyword (`eq`, `contains`, …), case-insensitive.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "eq" => Some(ComparisonOp::Eq),
            "ne" => Some(ComparisonOp::Ne),
            "lt" => Some(ComparisonOp::Lt),
            "le" => Some(ComparisonOp::Le),
            "gt" => Some(ComparisonOp::Gt),
            "ge" => Some(ComparisonOp::Ge),
            "contains" => Some(ComparisonOp::Contains),
            "notcontains" => Some(ComparisonOp::NotContains),
            "startswith" => Some(ComparisonOp::StartsWith),
            "endswith" => Some(ComparisonOp::EndsWith),
            _ => None,
        }
    }

    /// Resolve a grid wire token: symbols plus the OData keywords.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "=" => Some(ComparisonOp::Eq),
            "<>" => Some(ComparisonOp::Ne),
            "<" => Some(ComparisonOp::Lt),
            "<=" => Some(ComparisonOp::Le),
            ">" => Some(ComparisonOp::Gt),
            ">=" => Some(ComparisonOp::Ge),
            other => Self::from_keyword(other),
        }
    }

    /// The T-SQL operator text.
    pub fn sql_operator(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::Contains | ComparisonOp::StartsWith | ComparisonOp::EndsWith => "LIKE",
            ComparisonOp::NotContains => "NOT LIKE",
        }
    }

    /// Whether the operator is rendered as a LIKE pattern match.
    pub fn is_pattern(&self) -> bool {
        matches!(
            self,
            ComparisonOp::Contains
                | ComparisonOp::NotContains
                | ComparisonOp::StartsWith
                | ComparisonOp::EndsWith
        )
    }

    /// Wrap pattern text with `%` wildcards for this operator.
    pub fn pattern(&self, text: &str) -> String {
        match self {
            ComparisonOp::Contains | ComparisonOp::NotContains => format!("%{}%", text),
            ComparisonOp::StartsWith => format!("{}%", text),
            ComparisonOp::EndsWith => format!("%{}", text),
            _ => text.to_string(),
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Le => "le",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Ge => "ge",
            ComparisonOp::Contains => "contains",
            ComparisonOp::NotContains => "notcontains",
            ComparisonOp::StartsWith => "startswith",
            ComparisonOp::EndsWith => "endswith",
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// Case-insensitive `and` / `or`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("and") {
            Some(LogicalOp::And)
        } else if keyword.eq_ignore_ascii_case("or") {
            Some(LogicalOp::Or)
        } else {
            None
        }
    }

    pub fn sql_keyword(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_keyword())
    }
}

// ============================================================================
// Tree
// ============================================================================

/// A filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Column(String),
    Literal(SqlValue),
    Compare {
        left: Box<FilterNode>,
        op: ComparisonOp,
        right: Box<FilterNode>,
    },
    Logical {
        left: Box<FilterNode>,
        op: LogicalOp,
        right: Box<FilterNode>,
    },
    Not(Box<FilterNode>),
}

impl FilterNode {
    pub fn column(name: impl Into<String>) -> Self {
        FilterNode::Column(name.into())
    }

    pub fn literal(value: impl Into<SqlValue>) -> Self {
        FilterNode::Literal(value.into())
    }

    pub fn compare(left: FilterNode, op: ComparisonOp, right: FilterNode) -> Self {
        FilterNode::Compare {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn logical(left: FilterNode, op: LogicalOp, right: FilterNode) -> Self {
        FilterNode::Logical {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn and(self, right: FilterNode) -> Self {
        Self::logical(self, LogicalOp::And, right)
    }

    pub fn or(self, right: FilterNode) -> Self {
        Self::logical(self, LogicalOp::Or, right)
    }

    pub fn negate(inner: FilterNode) -> Self {
        FilterNode::Not(Box::new(inner))
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, FilterNode::Logical { .. })
    }

    /// Column names referenced anywhere in the tree, in visit order.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FilterNode::Column(name) => out.push(name),
            FilterNode::Literal(_) => {}
            FilterNode::Compare { left, right, .. } | FilterNode::Logical { left, right, .. } => {
                left.collect_columns(out);
                right.collect_columns(out);
            }
            FilterNode::Not(inner) => inner.collect_columns(out),
        }
    }
}
