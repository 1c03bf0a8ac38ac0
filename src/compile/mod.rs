//! End-to-end compilation from a grid request to a SQL batch.
//!
//! ```text
//! object name → describe (SchemaProvider) → bind arguments → WHERE → statements
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gridsql::compile::{compile_grid_query, CompileOptions, ObjectName};
//! use gridsql::metadata::{ObjectInfo, StaticSchemaProvider};
//! use gridsql::request::QueryRequest;
//!
//! let provider = StaticSchemaProvider::new()
//!     .with_object(ObjectName::new("dbo", "GetOrders"), ObjectInfo::function(["CustomerId"]));
//!
//! let request = QueryRequest::from_json(r#"{
//!     "filter": ["Total", ">", 100],
//!     "take": 20,
//!     "userData": { "CustomerId": 42 }
//! }"#)?;
//!
//! let compiled = compile_grid_query(&provider, "dbo.GetOrders", &request, &CompileOptions::default())?;
//! println!("{}", compiled.sql);
//! ```

pub mod query;
pub mod target;
pub mod where_clause;

use serde_json::{json, Value};

use crate::catalog::CatalogError;
use crate::filter::FilterError;
use crate::metadata::{resolve_arguments, MetadataError, SchemaProvider};
use crate::request::QueryRequest;
use crate::sql::{ParameterRegistry, SqlError};

pub use query::QueryCompiler;
pub use target::{CallArgument, ObjectKind, ObjectName, Target};
pub use where_clause::WhereCompiler;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sql(#[from] SqlError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Invalid identifier chain: {0}")]
    InvalidIdentifierChain(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid request JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    /// Page size used when only `skip` is given.
    pub default_take: u64,

    /// Schema for one-part object names.
    pub default_schema: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            default_take: 200,
            default_schema: "dbo".to_string(),
        }
    }
}

impl CompileOptions {
    pub fn with_default_take(mut self, take: u64) -> Self {
        self.default_take = take;
        self
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = schema.into();
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// A compiled batch and its bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    /// One or two `;`-terminated statements.
    pub sql: String,

    /// Placeholder bindings in first-reference order.
    pub params: ParameterRegistry,
}

impl CompiledQuery {
    pub fn statement_count(&self) -> usize {
        self.sql.matches(";\n").count()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "sql": self.sql,
            "params": self.params.to_json(),
        })
    }
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Compile a grid query against a named view or table-valued function.
///
/// The object is looked up through `provider`; function parameters are
/// bound from the request's `userData` and fall back to `DEFAULT`.
pub fn compile_grid_query(
    provider: &dyn SchemaProvider,
    object: &str,
    request: &QueryRequest,
    options: &CompileOptions,
) -> CompileResult<CompiledQuery> {
    let name = ObjectName::parse(object, &options.default_schema)?;
    let info = provider
        .describe(&name)?
        .ok_or_else(|| CompileError::ObjectNotFound(name.to_string()))?;

    let mut params = ParameterRegistry::new();
    let target = match info.kind {
        ObjectKind::View => Target::view(name),
        ObjectKind::Function => {
            let arguments = resolve_arguments(&info.parameters, &request.user_data, &mut params);
            Target::function(name, arguments)
        }
    };

    let compiled = QueryCompiler::new(options).compile(request, &target, params)?;

    tracing::debug!(
        object = %target.object,
        kind = %target.kind,
        statements = compiled.statement_count(),
        parameters = compiled.params.len(),
        "compiled grid query"
    );
    tracing::trace!(sql = %compiled.sql, "generated SQL");

    Ok(compiled)
}
