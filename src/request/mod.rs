//! Grid query requests.
//!
//! A [`QueryRequest`] is what a caller asks of one grid endpoint: which
//! columns, which rows, in which order, which page. It is read from the
//! grid JSON body ([`QueryRequest::from_json`]) and optionally overlaid with
//! OData query-string parameters ([`QueryRequest::apply_odata_query`]).
//!
//! ```json
//! {
//!   "select": ["Name", "Region"],
//!   "filter": [["Status", "=", "Active"], "and", ["Age", ">", 18]],
//!   "orderby": [{ "selector": "Name", "desc": false }],
//!   "skip": 0,
//!   "take": 50,
//!   "showTotal": true,
//!   "userData": { "CustomerId": 42 }
//! }
//! ```

mod odata;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::compile::{CompileError, CompileResult};
use crate::filter::{parse_odata_filter, parse_wire_filter, FilterNode};
use crate::sql::SqlValue;

/// A grouping column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub column: String,
    pub expanded: bool,
}

/// What a sort orders by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortExpr {
    /// A column name, sanitized and bracket-quoted on output.
    Column(String),
    /// Expression text such as an ordinal (`1`), sanitized but not quoted.
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub expression: SortExpr,
    pub descending: bool,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            expression: SortExpr::Column(column.into()),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            expression: SortExpr::Column(column.into()),
            descending: true,
        }
    }
}

/// One grid query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    pub grouping: Vec<GroupSpec>,
    /// Projected columns; empty projects every column.
    pub fields: Vec<String>,
    pub filter: Option<FilterNode>,
    pub sort: Vec<SortSpec>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
    pub show_total: bool,
    pub load_all: bool,
    pub user_data: IndexMap<String, SqlValue>,
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    #[serde(default)]
    group: Option<Vec<WireGroup>>,
    #[serde(default)]
    select: Option<Vec<String>>,
    #[serde(default)]
    filter: Option<Value>,
    #[serde(default)]
    orderby: Option<Vec<WireSort>>,
    #[serde(default)]
    take: Option<u64>,
    #[serde(default)]
    skip: Option<u64>,
    #[serde(default)]
    show_total: bool,
    #[serde(default)]
    load_all: bool,
    #[serde(default)]
    user_data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct WireGroup {
    selector: String,
    #[serde(default)]
    expanded: bool,
}

#[derive(Debug, Deserialize)]
struct WireSort {
    #[serde(default)]
    selector: Option<String>,
    #[serde(default)]
    expression: Option<String>,
    #[serde(default)]
    desc: bool,
}

impl WireSort {
    fn into_spec(self) -> CompileResult<SortSpec> {
        let expression = match (self.selector, self.expression) {
            (Some(column), None) => SortExpr::Column(column),
            (None, Some(text)) => SortExpr::Literal(text),
            (Some(_), Some(_)) => {
                return Err(CompileError::InvalidRequest(
                    "orderby item has both selector and expression".into(),
                ))
            }
            (None, None) => {
                return Err(CompileError::InvalidRequest(
                    "orderby item needs a selector or an expression".into(),
                ))
            }
        };
        Ok(SortSpec {
            expression,
            descending: self.desc,
        })
    }
}

fn parse_filter(value: Value) -> CompileResult<Option<FilterNode>> {
    Ok(match value {
        Value::Null => None,
        Value::Array(ref items) if items.is_empty() => None,
        Value::String(ref text) if text.trim().is_empty() => None,
        Value::String(text) => Some(parse_odata_filter(&text)?),
        other => Some(parse_wire_filter(&other)?),
    })
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the grid JSON body.
    pub fn from_json(json: &str) -> CompileResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> CompileResult<Self> {
        let wire: WireRequest = serde_json::from_value(value)?;

        let sort = wire
            .orderby
            .unwrap_or_default()
            .into_iter()
            .map(WireSort::into_spec)
            .collect::<CompileResult<Vec<_>>>()?;

        let mut user_data = IndexMap::new();
        for (key, value) in wire.user_data.unwrap_or_default() {
            match SqlValue::from_json(&value) {
                Ok(v) => {
                    user_data.insert(key, v);
                }
                Err(_) => tracing::debug!(key = %key, "skipping non-scalar userData entry"),
            }
        }

        Ok(Self {
            grouping: wire
                .group
                .unwrap_or_default()
                .into_iter()
                .map(|g| GroupSpec {
                    column: g.selector,
                    expanded: g.expanded,
                })
                .collect(),
            fields: wire.select.unwrap_or_default(),
            filter: match wire.filter {
                Some(value) => parse_filter(value)?,
                None => None,
            },
            sort,
            skip: wire.skip,
            take: wire.take,
            show_total: wire.show_total,
            load_all: wire.load_all,
            user_data,
        })
    }

    // ------------------------------------------------------------------------
    // Builder
    // ------------------------------------------------------------------------

    pub fn select(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: FilterNode) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.grouping.push(GroupSpec {
            column: column.into(),
            expanded: false,
        });
        self
    }

    pub fn order_by(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }

    pub fn with_total(mut self) -> Self {
        self.show_total = true;
        self
    }

    pub fn load_all(mut self) -> Self {
        self.load_all = true;
        self
    }

    pub fn user_value(mut self, key: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.user_data.insert(key.into(), value.into());
        self
    }

    /// Whether OFFSET/FETCH applies to this request.
    pub fn is_paged(&self) -> bool {
        !self.load_all && (self.skip.is_some() || self.take.is_some())
    }
}
