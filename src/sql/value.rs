//! Literal values that flow from a request into bound parameters or SQL text.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde_json::Value;
use uuid::Uuid;

use super::SqlError;

/// A typed literal.
///
/// Every literal a caller supplies (filter operands, function arguments,
/// upsert rows) is carried as one of these until it is either bound as a
/// parameter or quoted into DDL text.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(NaiveDateTime),
    TimeSpan(TimeDelta),
    Guid(Uuid),
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::Int(_) => "int",
            SqlValue::Float(_) => "float",
            SqlValue::String(_) => "string",
            SqlValue::DateTime(_) => "datetime",
            SqlValue::TimeSpan(_) => "timespan",
            SqlValue::Guid(_) => "guid",
            SqlValue::Bytes(_) => "bytes",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Convert a JSON scalar.
    ///
    /// Integers outside the `i64` range become floats. Arrays and objects
    /// have no literal form.
    pub fn from_json(value: &Value) -> Result<Self, SqlError> {
        match value {
            Value::Null => Ok(SqlValue::Null),
            Value::Bool(b) => Ok(SqlValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(SqlValue::Int(i)),
                None => n
                    .as_f64()
                    .map(SqlValue::Float)
                    .ok_or_else(|| SqlError::UnsupportedValueKind(format!("number {}", n))),
            },
            Value::String(s) => Ok(SqlValue::String(s.clone())),
            Value::Array(_) => Err(SqlError::UnsupportedValueKind("array".into())),
            Value::Object(_) => Err(SqlError::UnsupportedValueKind("object".into())),
        }
    }

    /// Render for JSON output (CLI, logs).
    pub fn to_json(&self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Bool(*b),
            SqlValue::Int(i) => Value::from(*i),
            SqlValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            SqlValue::String(s) => Value::String(s.clone()),
            SqlValue::DateTime(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()),
            SqlValue::TimeSpan(span) => Value::from(span.num_milliseconds() as f64 / 1000.0),
            SqlValue::Guid(g) => Value::String(g.to_string()),
            SqlValue::Bytes(b) => Value::String(hex::encode_upper(b)),
        }
    }

    /// Text placed between `%` wildcards by the pattern operators.
    pub fn pattern_text(&self) -> Result<String, SqlError> {
        match self {
            SqlValue::String(s) => Ok(s.clone()),
            SqlValue::Int(i) => Ok(i.to_string()),
            SqlValue::Float(f) if f.is_finite() => Ok(ryu::Buffer::new().format(*f).to_string()),
            SqlValue::Guid(g) => Ok(g.to_string()),
            other => Err(SqlError::UnsupportedValueKind(format!(
                "{} in a pattern",
                other.kind()
            ))),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

impl From<i32> for SqlValue {
    fn from(i: i32) -> Self {
        SqlValue::Int(i64::from(i))
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        SqlValue::Int(i)
    }
}

impl From<f64> for SqlValue {
    fn from(f: f64) -> Self {
        SqlValue::Float(f)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::String(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::String(s)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(dt: NaiveDateTime) -> Self {
        SqlValue::DateTime(dt)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(d: NaiveDate) -> Self {
        SqlValue::DateTime(d.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<TimeDelta> for SqlValue {
    fn from(span: TimeDelta) -> Self {
        SqlValue::TimeSpan(span)
    }
}

impl From<Uuid> for SqlValue {
    fn from(g: Uuid) -> Self {
        SqlValue::Guid(g)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(b: Vec<u8>) -> Self {
        SqlValue::Bytes(b)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}
