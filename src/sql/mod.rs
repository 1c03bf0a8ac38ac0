//! SQL text generation.
//!
//! This module provides the building blocks every emitter writes through:
//!
//! - [`writer`] - indentation-aware text builder, literal quoting, join helpers
//! - [`token`] - keyword/identifier tokens serialized to T-SQL
//! - [`params`] - ordered placeholder -> value bindings
//! - [`value`] - typed literals
//! - [`ddl`] - schema-maintenance statements (CREATE, ALTER, MERGE, transactions)

pub mod ddl;
pub mod params;
pub mod token;
pub mod value;
pub mod writer;

use crate::catalog::CatalogError;

pub use params::ParameterRegistry;
pub use token::{Token, TokenStream};
pub use value::SqlValue;
pub use writer::{quote_literal, SqlWriter};

/// Errors raised while rendering SQL text.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SqlError {
    #[error("Unsupported value kind: {0}")]
    UnsupportedValueKind(String),

    #[error("Invalid statement: {0}")]
    InvalidStatement(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type SqlResult<T> = Result<T, SqlError>;
