//! OData query-string overlay.
//!
//! Recognized parameters override the corresponding body fields:
//!
//! | Parameter      | Effect                                         |
//! |----------------|------------------------------------------------|
//! | `$take`        | page size                                      |
//! | `$skip`        | page offset                                    |
//! | `$filter`      | replaces the filter (empty clears it)          |
//! | `$orderby`     | `col [asc\|desc], …`; digits sort by ordinal   |
//! | `$select`      | `col, …` or `*`                                |
//! | `$inlinecount` | `allpages` or `none`                           |
//!
//! Parameters without a `$` prefix become `userData` strings.

use url::form_urlencoded;

use super::{QueryRequest, SortExpr, SortSpec};
use crate::compile::{CompileError, CompileResult};
use crate::filter::parse_odata_filter;
use crate::sql::SqlValue;

fn invalid(message: impl Into<String>) -> CompileError {
    CompileError::InvalidRequest(message.into())
}

fn parse_count(name: &str, value: &str) -> CompileResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(format!("{} must be a non-negative integer, got '{}'", name, value)))
}

fn parse_orderby(value: &str) -> CompileResult<Vec<SortSpec>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let mut parts = item.split_whitespace();
            let name = parts.next().unwrap_or_default();
            let descending = match parts.next() {
                None => false,
                Some(dir) if dir.eq_ignore_ascii_case("asc") => false,
                Some(dir) if dir.eq_ignore_ascii_case("desc") => true,
                Some(dir) => return Err(invalid(format!("invalid sort direction '{}'", dir))),
            };
            if parts.next().is_some() {
                return Err(invalid(format!("invalid $orderby item '{}'", item)));
            }
            let expression = if name.bytes().all(|b| b.is_ascii_digit()) {
                SortExpr::Literal(name.to_string())
            } else {
                SortExpr::Column(name.to_string())
            };
            Ok(SortSpec {
                expression,
                descending,
            })
        })
        .collect()
}

fn parse_select(value: &str) -> Vec<String> {
    if value.trim() == "*" {
        return Vec::new();
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl QueryRequest {
    /// Build a request from a query string alone.
    pub fn from_odata_query(query: &str) -> CompileResult<Self> {
        let mut request = Self::default();
        request.apply_odata_query(query)?;
        Ok(request)
    }

    /// Overlay OData query-string parameters onto this request. A leading
    /// `?` is ignored.
    pub fn apply_odata_query(&mut self, query: &str) -> CompileResult<()> {
        let query = query.strip_prefix('?').unwrap_or(query);

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "$take" => self.take = Some(parse_count("$take", &value)?),
                "$skip" => self.skip = Some(parse_count("$skip", &value)?),
                "$filter" => {
                    self.filter = if value.trim().is_empty() {
                        None
                    } else {
                        Some(parse_odata_filter(&value)?)
                    };
                }
                "$orderby" => self.sort = parse_orderby(&value)?,
                "$select" => self.fields = parse_select(&value),
                "$inlinecount" => {
                    self.show_total = match &*value {
                        "allpages" => true,
                        "none" => false,
                        other => return Err(invalid(format!("invalid $inlinecount '{}'", other))),
                    };
                }
                "$expand" | "$format" => {
                    return Err(invalid(format!("{} is not supported", key)));
                }
                other if other.starts_with('$') => {
                    return Err(invalid(format!("unknown query option {}", other)));
                }
                other => {
                    self.user_data
                        .insert(other.to_string(), SqlValue::String(value.into_owned()));
                }
            }
        }

        Ok(())
    }
}
