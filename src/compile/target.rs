//! The database object a grid query reads from.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CompileError, CompileResult};
use crate::sql::{Token, TokenStream};

/// Alias every statement gives its row source.
pub const RESULTS_ALIAS: &str = "RESULTS";

/// A `schema.name` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectName {
    pub schema: String,
    pub name: String,
}

impl ObjectName {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parse `name` or `schema.name`; brackets around a part are dropped.
    ///
    /// A one-part name gets `default_schema`. More than two parts, or an
    /// empty part, is an [`CompileError::InvalidIdentifierChain`].
    pub fn parse(text: &str, default_schema: &str) -> CompileResult<Self> {
        let parts: Vec<&str> = text
            .split('.')
            .map(|p| p.trim().trim_start_matches('[').trim_end_matches(']'))
            .collect();

        if parts.iter().any(|p| p.is_empty()) {
            return Err(CompileError::InvalidIdentifierChain(text.to_string()));
        }

        match parts.as_slice() {
            [name] => Ok(Self::new(default_schema, *name)),
            [schema, name] => Ok(Self::new(*schema, *name)),
            _ => Err(CompileError::InvalidIdentifierChain(text.to_string())),
        }
    }

    pub fn token(&self) -> Token {
        Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// Views take no arguments; table-valued functions are called positionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    View,
    Function,
}

impl ObjectKind {
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "view" => Some(ObjectKind::View),
            "function" | "tvf" => Some(ObjectKind::Function),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::View => "view",
            ObjectKind::Function => "function",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One positional argument of a function call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArgument {
    /// A registered placeholder such as `@0`.
    Placeholder(String),
    /// The parameter's declared default.
    Default,
}

impl CallArgument {
    pub fn token(&self) -> Token {
        match self {
            CallArgument::Placeholder(name) => Token::Placeholder(name.clone()),
            CallArgument::Default => Token::Default,
        }
    }
}

/// A resolved row source.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub object: ObjectName,
    pub kind: ObjectKind,
    pub arguments: Vec<CallArgument>,
}

impl Target {
    pub fn view(object: ObjectName) -> Self {
        Self {
            object,
            kind: ObjectKind::View,
            arguments: Vec::new(),
        }
    }

    pub fn function(object: ObjectName, arguments: Vec<CallArgument>) -> Self {
        Self {
            object,
            kind: ObjectKind::Function,
            arguments,
        }
    }

    /// `[schema].[name] RESULTS` or `[schema].[name](@0, DEFAULT) RESULTS`.
    pub fn source(&self) -> TokenStream {
        let mut ts = TokenStream::from(self.object.token());
        if self.kind == ObjectKind::Function {
            ts.lparen()
                .comma_separated(self.arguments.iter().map(|a| a.token().into()))
                .rparen();
        }
        ts.space().push(Token::Raw(RESULTS_ALIAS.into()));
        ts
    }
}
