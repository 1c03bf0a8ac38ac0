//! Type catalog - the static mapping between SQL Server type names,
//! runtime type names and the wire categories a grid client understands.
//!
//! The table is immutable and shared by every compile call. It also owns
//! identifier sanitization, since identifiers can never be bound as
//! parameters and must be made safe before they reach SQL text.
//!
//! # Examples
//!
//! ```ignore
//! use gridsql::catalog::{self, WireType};
//!
//! assert_eq!(catalog::sanitize("My-Table Name!"), "My_Table_Name_");
//! assert_eq!(catalog::sql_type_syntax("String", None, None)?, "NVARCHAR(MAX)");
//! assert_eq!(catalog::wire_type_of("datetime2")?, WireType::String);
//! ```

use std::fmt;

/// Errors raised by catalog lookups.
///
/// These point at programming or configuration mistakes, never at user input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Invalid length {length} for {type_name}")]
    InvalidLength { type_name: String, length: u32 },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

// =============================================================================
// Identifier Sanitization
// =============================================================================

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
///
/// Total and idempotent. Apply to every caller-influenced identifier
/// (schema, object, column, literal sort expression) before it is written
/// into SQL text.
pub fn sanitize(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

// =============================================================================
// Wire Types
// =============================================================================

/// Category a column value has on the JSON wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    String,
    Number,
    Boolean,
}

impl WireType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireType::String => "string",
            WireType::Number => "number",
            WireType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Catalog Table
// =============================================================================

/// How the DDL syntax of a type is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSyntax {
    /// Bare keyword: `INT`, `DATETIME2`.
    Plain,
    /// Length-bounded: `NVARCHAR(n)`, `MAX` when no length is given or the
    /// length exceeds `max_length`.
    Length { max_length: u32 },
    /// Fixed length: `NCHAR(n)` with `1 <= n <= max_length`, `(1)` when no
    /// length is given. There is no `MAX` form.
    Fixed { max_length: u32 },
    /// Precision and scale: `DECIMAL(p,s)` with the given defaults.
    Precision { precision: u8, scale: u8 },
}

/// One row of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeEntry {
    /// SQL Server type name, lower case.
    pub sql_name: &'static str,
    /// Rust type name a value of this column materializes into.
    pub runtime: &'static str,
    /// JSON category.
    pub wire: WireType,
    /// DDL rendering.
    pub syntax: TypeSyntax,
    /// Whether this entry is the one used when going runtime -> SQL.
    pub canonical: bool,
}

const fn entry(
    sql_name: &'static str,
    runtime: &'static str,
    wire: WireType,
    syntax: TypeSyntax,
    canonical: bool,
) -> TypeEntry {
    TypeEntry {
        sql_name,
        runtime,
        wire,
        syntax,
        canonical,
    }
}

use TypeSyntax::{Fixed, Length, Plain, Precision};
use WireType::{Boolean, Number, String as Text};

static CATALOG: &[TypeEntry] = &[
    // Boolean
    entry("bit", "bool", Boolean, Plain, true),
    // Integers
    entry("tinyint", "u8", Number, Plain, true),
    entry("smallint", "i16", Number, Plain, true),
    entry("int", "i32", Number, Plain, true),
    entry("bigint", "i64", Number, Plain, true),
    // Floating point
    entry("real", "f32", Number, Plain, true),
    entry("float", "f64", Number, Plain, true),
    // Exact numerics
    entry("decimal", "Decimal", Number, Precision { precision: 18, scale: 10 }, true),
    entry("numeric", "Decimal", Number, Precision { precision: 18, scale: 10 }, false),
    entry("money", "Decimal", Number, Plain, false),
    entry("smallmoney", "Decimal", Number, Plain, false),
    // Strings
    entry("nvarchar", "String", Text, Length { max_length: 4000 }, true),
    entry("varchar", "String", Text, Length { max_length: 8000 }, false),
    entry("nchar", "char", Text, Fixed { max_length: 4000 }, true),
    entry("char", "char", Text, Fixed { max_length: 8000 }, false),
    entry("ntext", "String", Text, Plain, false),
    entry("text", "String", Text, Plain, false),
    entry("xml", "String", Text, Plain, false),
    // Date and time
    entry("date", "NaiveDate", Text, Plain, true),
    entry("datetime2", "NaiveDateTime", Text, Plain, true),
    entry("datetime", "NaiveDateTime", Text, Plain, false),
    entry("smalldatetime", "NaiveDateTime", Text, Plain, false),
    entry("datetimeoffset", "DateTime<FixedOffset>", Text, Plain, true),
    entry("time", "TimeDelta", Text, Plain, true),
    // Identifiers and binary
    entry("uniqueidentifier", "Uuid", Text, Plain, true),
    entry("varbinary", "Vec<u8>", Text, Length { max_length: 8000 }, true),
    entry("binary", "Vec<u8>", Text, Fixed { max_length: 8000 }, false),
    entry("image", "Vec<u8>", Text, Plain, false),
];

/// All catalog rows, in table order.
pub fn entries() -> impl Iterator<Item = &'static TypeEntry> {
    CATALOG.iter()
}

/// Look up a row by SQL type name.
///
/// Case-insensitive; a trailing `(…)` length or precision is ignored, so
/// `NVARCHAR(50)` resolves like `nvarchar`.
pub fn lookup_sql(sql_type: &str) -> CatalogResult<&'static TypeEntry> {
    let base = sql_type
        .split('(')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    CATALOG
        .iter()
        .find(|e| e.sql_name == base)
        .ok_or_else(|| CatalogError::UnsupportedType(sql_type.to_string()))
}

/// Look up the canonical row for a runtime type name.
pub fn lookup_runtime(runtime_type: &str) -> CatalogResult<&'static TypeEntry> {
    CATALOG
        .iter()
        .find(|e| e.canonical && e.runtime == runtime_type)
        .ok_or_else(|| CatalogError::UnsupportedType(runtime_type.to_string()))
}

/// DDL syntax for a runtime type, e.g. `NVARCHAR(MAX)` or `DECIMAL(18,10)`.
///
/// `length` applies to length-bounded and fixed-length types, `precision` (precision, scale)
/// to exact numerics; both are ignored elsewhere.
pub fn sql_type_syntax(
    runtime_type: &str,
    length: Option<u32>,
    precision: Option<(u8, u8)>,
) -> CatalogResult<String> {
    let entry = lookup_runtime(runtime_type)?;
    let name = entry.sql_name.to_uppercase();

    Ok(match entry.syntax {
        Plain => name,
        Length { max_length } => match length {
            Some(n) if n > 0 && n <= max_length => format!("{}({})", name, n),
            _ => format!("{}(MAX)", name),
        },
        Fixed { max_length } => match length.unwrap_or(1) {
            n if n > 0 && n <= max_length => format!("{}({})", name, n),
            n => {
                return Err(CatalogError::InvalidLength {
                    type_name: name,
                    length: n,
                })
            }
        },
        Precision {
            precision: default_precision,
            scale: default_scale,
        } => {
            let (p, s) = precision.unwrap_or((default_precision, default_scale));
            format!("{}({},{})", name, p, s)
        }
    })
}

/// Wire category of a SQL type name.
pub fn wire_type_of(sql_type: &str) -> CatalogResult<WireType> {
    lookup_sql(sql_type).map(|e| e.wire)
}

/// Runtime type name of a SQL type name.
pub fn runtime_type_of(sql_type: &str) -> CatalogResult<&'static str> {
    lookup_sql(sql_type).map(|e| e.runtime)
}
