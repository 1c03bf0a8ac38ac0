//! # gridsql
//!
//! Compiles grid queries into parameterized T-SQL over SQL Server views and
//! table-valued functions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │      QueryRequest (grid JSON body + OData overlay)       │
//! │      filter: wire array or OData string                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [filter]
//! ┌─────────────────────────────────────────────────────────┐
//! │                  FilterNode tree                         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile: target + WHERE + statements]
//! ┌─────────────────────────────────────────────────────────┐
//! │   SQL batch (result + optional count) + @N bindings      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are sanitized and bracket-quoted; literal values are never
//! written into query text, only bound through `@N` placeholders.

pub mod catalog;
pub mod compile;
pub mod config;
pub mod filter;
pub mod logging;
pub mod metadata;
pub mod request;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{
        compile_grid_query, CallArgument, CompileError, CompileOptions, CompileResult,
        CompiledQuery, ObjectKind, ObjectName, QueryCompiler, Target, WhereCompiler,
    };
    pub use crate::filter::{
        parse_odata_filter, parse_wire_filter, ComparisonOp, FilterError, FilterNode, LogicalOp,
    };
    pub use crate::metadata::{ObjectInfo, SchemaProvider, StaticSchemaProvider};
    pub use crate::request::{GroupSpec, QueryRequest, SortExpr, SortSpec};
    pub use crate::sql::{ParameterRegistry, SqlValue, SqlWriter};
}

pub use compile::{compile_grid_query, CompileError, CompileOptions, CompiledQuery};
pub use request::QueryRequest;
