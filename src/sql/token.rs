//! SQL Tokens - the atomic units of SQL output.
//!
//! Clause fragments are assembled as token streams and serialized to
//! T-SQL text before they are handed to the [`SqlWriter`](super::writer::SqlWriter).
//! Identifiers only ever enter SQL text through [`Token::Ident`] or
//! [`Token::QualifiedIdent`], which sanitize and bracket-quote on output.

use crate::catalog::sanitize;

use super::writer::{quote_bracket, quote_string};

/// SQL Token - every element the compiler emits.
///
/// Adding a new variant here will cause compile errors everywhere
/// it needs to be handled (exhaustive matching).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // === Keywords ===
    Select,
    GroupBy,
    Asc,
    Desc,
    Offset,
    Fetch,
    Next,
    Rows,
    Only,
    Null,
    Default,
    Count,

    // === Punctuation ===
    Comma,
    Dot,
    Star,
    LParen,
    RParen,

    // === Operators ===
    Eq,

    // === Whitespace ===
    Space,

    // === Dynamic Content ===
    /// Simple identifier (column, alias). Sanitized, then bracket-quoted.
    Ident(String),
    /// Qualified identifier: `[schema].[name]`.
    QualifiedIdent { schema: String, name: String },
    /// Bound parameter placeholder generated by the parameter registry.
    Placeholder(String),
    /// Integer literal
    LitInt(i64),
    /// String literal, quoted with `''` escaping.
    LitString(String),

    // === Escape Hatch ===
    /// Raw SQL passed directly to output without escaping.
    ///
    /// # Security Warning
    ///
    /// **Never pass user input to this variant.** Only static fragments
    /// such as `[$Type]` or already-sanitized text belong here.
    Raw(String),
}

impl Token {
    /// Serialize this token to T-SQL text.
    pub fn serialize(&self) -> String {
        match self {
            // Keywords
            Token::Select => "SELECT".into(),
            Token::GroupBy => "GROUP BY".into(),
            Token::Asc => "ASC".into(),
            Token::Desc => "DESC".into(),
            Token::Offset => "OFFSET".into(),
            Token::Fetch => "FETCH".into(),
            Token::Next => "NEXT".into(),
            Token::Rows => "ROWS".into(),
            Token::Only => "ONLY".into(),
            Token::Null => "NULL".into(),
            Token::Default => "DEFAULT".into(),
            Token::Count => "COUNT".into(),

            // Punctuation
            Token::Comma => ",".into(),
            Token::Dot => ".".into(),
            Token::Star => "*".into(),
            Token::LParen => "(".into(),
            Token::RParen => ")".into(),

            // Operators
            Token::Eq => "=".into(),

            Token::Space => " ".into(),

            Token::Ident(name) => quote_bracket(&sanitize(name)),
            Token::QualifiedIdent { schema, name } => format!(
                "{}.{}",
                quote_bracket(&sanitize(schema)),
                quote_bracket(&sanitize(name))
            ),
            Token::Placeholder(name) => name.clone(),
            Token::LitInt(n) => n.to_string(),
            Token::LitString(s) => quote_string(s),

            Token::Raw(s) => s.clone(),
        }
    }
}

/// A stream of tokens that can be serialized to SQL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Create an empty token stream.
    pub fn new() -> Self {
        Self { tokens: vec![] }
    }

    /// Push a single token.
    pub fn push(&mut self, token: Token) -> &mut Self {
        self.tokens.push(token);
        self
    }

    /// Append another token stream.
    pub fn append(&mut self, other: &TokenStream) -> &mut Self {
        self.tokens.extend(other.tokens.iter().cloned());
        self
    }

    /// Push `items` separated by `, `.
    pub fn comma_separated(&mut self, items: impl IntoIterator<Item = TokenStream>) -> &mut Self {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.comma().space();
            }
            self.append(&item);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Serialize all tokens to a SQL string.
    pub fn serialize(&self) -> String {
        self.tokens.iter().map(Token::serialize).collect()
    }

    // Convenience methods for common tokens
    pub fn space(&mut self) -> &mut Self {
        self.push(Token::Space)
    }
    pub fn comma(&mut self) -> &mut Self {
        self.push(Token::Comma)
    }
    pub fn lparen(&mut self) -> &mut Self {
        self.push(Token::LParen)
    }
    pub fn rparen(&mut self) -> &mut Self {
        self.push(Token::RParen)
    }
}

impl From<Token> for TokenStream {
    fn from(token: Token) -> Self {
        Self {
            tokens: vec![token],
        }
    }
}
