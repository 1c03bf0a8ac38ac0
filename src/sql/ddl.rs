//! Schema-maintenance statements.
//!
//! These builders are used by tooling that keeps backing tables in shape,
//! not by the per-request query path. They share [`SqlWriter`] with the
//! query compiler and inline literals through [`quote_literal`], so their
//! output is a self-contained script.
//!
//! # Example
//!
//! ```ignore
//! use gridsql::sql::ddl::{ColumnDef, CreateTable};
//!
//! let sql = CreateTable::new("Orders")
//!     .schema("sales")
//!     .column(ColumnDef::new("Id", "i64").not_null())
//!     .column(ColumnDef::new("Customer", "String").length(100))
//!     .primary_key(["Id"])
//!     .to_sql()?;
//! ```

use super::token::Token;
use super::value::SqlValue;
use super::writer::{column_list, comma_join_lines, quote_literal, quote_string, SqlWriter};
use super::{SqlError, SqlResult};
use crate::catalog::{self, sanitize};

const DEFAULT_SCHEMA: &str = "dbo";

fn qualified(schema: &Option<String>, name: &str) -> String {
    Token::QualifiedIdent {
        schema: schema.clone().unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
        name: name.to_string(),
    }
    .serialize()
}

fn ident(name: &str) -> String {
    Token::Ident(name.to_string()).serialize()
}

// ============================================================================
// Column Definition
// ============================================================================

/// A column in CREATE TABLE / ALTER TABLE ADD.
///
/// The type is given as a runtime type name and resolved through the
/// type catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub runtime_type: String,
    pub length: Option<u32>,
    pub precision: Option<(u8, u8)>,
    pub nullable: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, runtime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runtime_type: runtime_type.into(),
            length: None,
            precision: None,
            nullable: true,
        }
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    pub fn precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some((precision, scale));
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// `[Name] NVARCHAR(100) NULL`
    pub fn render(&self) -> SqlResult<String> {
        let data_type =
            catalog::sql_type_syntax(&self.runtime_type, self.length, self.precision)?;
        Ok(format!(
            "{} {} {}",
            ident(&self.name),
            data_type,
            if self.nullable { "NULL" } else { "NOT NULL" }
        ))
    }
}

// ============================================================================
// CREATE TABLE
// ============================================================================

/// CREATE TABLE guarded by an existence check.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub primary_key: Vec<String>,
}

impl CreateTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn column(mut self, col: ColumnDef) -> Self {
        self.columns.push(col);
        self
    }

    pub fn columns(mut self, cols: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(cols);
        self
    }

    pub fn primary_key(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn to_sql(&self) -> SqlResult<String> {
        let mut w = SqlWriter::new();
        self.write(&mut w)?;
        Ok(w.finish())
    }

    pub fn write(&self, w: &mut SqlWriter) -> SqlResult<()> {
        if self.columns.is_empty() {
            return Err(SqlError::InvalidStatement(format!(
                "table {} has no columns",
                self.name
            )));
        }

        let table = qualified(&self.schema, &self.name);
        let mut items = self
            .columns
            .iter()
            .map(ColumnDef::render)
            .collect::<SqlResult<Vec<_>>>()?;

        if !self.primary_key.is_empty() {
            let keys: Vec<String> = self.primary_key.iter().map(|k| ident(k)).collect();
            items.push(format!(
                "CONSTRAINT {} PRIMARY KEY ({})",
                ident(&format!("PK_{}", self.name)),
                column_list(&keys)
            ));
        }

        w.if_block(
            &format!("OBJECT_ID(N{}, N'U') IS NULL", quote_string(&table)),
            |w| {
                w.line(&format!("CREATE TABLE {} (", table));
                w.with_indent(1, |w| {
                    w.lines(&comma_join_lines(&items));
                    Ok::<_, SqlError>(())
                })?;
                w.line(");");
                Ok(())
            },
        )
    }
}

// ============================================================================
// ALTER TABLE ADD
// ============================================================================

/// ALTER TABLE … ADD guarded by a column-existence check.
#[derive(Debug, Clone, PartialEq)]
pub struct AddColumn {
    pub schema: Option<String>,
    pub table: String,
    pub column: ColumnDef,
}

impl AddColumn {
    pub fn new(table: impl Into<String>, column: ColumnDef) -> Self {
        Self {
            schema: None,
            table: table.into(),
            column,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn to_sql(&self) -> SqlResult<String> {
        let mut w = SqlWriter::new();
        self.write(&mut w)?;
        Ok(w.finish())
    }

    pub fn write(&self, w: &mut SqlWriter) -> SqlResult<()> {
        let table = qualified(&self.schema, &self.table);
        let definition = self.column.render()?;

        w.if_block(
            &format!(
                "COL_LENGTH(N{}, N{}) IS NULL",
                quote_string(&table),
                quote_string(&sanitize(&self.column.name))
            ),
            |w| {
                w.line(&format!("ALTER TABLE {} ADD {};", table, definition));
                Ok(())
            },
        )
    }
}

// ============================================================================
// MERGE (upsert)
// ============================================================================

/// Upsert rows into a table with a single MERGE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Upsert {
    pub schema: Option<String>,
    pub table: String,
    pub key_columns: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl Upsert {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            schema: None,
            table: table.into(),
            key_columns: Vec::new(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Columns matched between source and target.
    pub fn keys(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.key_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// All columns carried by each row, keys included.
    pub fn columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn row(mut self, values: impl IntoIterator<Item = impl Into<SqlValue>>) -> Self {
        self.rows.push(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn to_sql(&self) -> SqlResult<String> {
        let mut w = SqlWriter::new();
        self.write(&mut w)?;
        Ok(w.finish())
    }

    fn validate(&self) -> SqlResult<()> {
        if self.rows.is_empty() {
            return Err(SqlError::InvalidStatement("upsert has no rows".into()));
        }
        if self.key_columns.is_empty() {
            return Err(SqlError::InvalidStatement("upsert has no key columns".into()));
        }
        if let Some(key) = self.key_columns.iter().find(|k| !self.columns.contains(k)) {
            return Err(SqlError::InvalidStatement(format!(
                "key column {} is not among the upserted columns",
                key
            )));
        }
        if let Some((i, row)) = self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.columns.len())
        {
            return Err(SqlError::InvalidStatement(format!(
                "row {} has {} values, expected {}",
                i,
                row.len(),
                self.columns.len()
            )));
        }
        Ok(())
    }

    pub fn write(&self, w: &mut SqlWriter) -> SqlResult<()> {
        self.validate()?;

        let columns: Vec<String> = self.columns.iter().map(|c| ident(c)).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| -> SqlResult<String> {
                let cells = row.iter().map(quote_literal).collect::<SqlResult<Vec<_>>>()?;
                Ok(format!("({})", column_list(&cells)))
            })
            .collect::<SqlResult<Vec<_>>>()?;

        let on = self
            .key_columns
            .iter()
            .map(|k| format!("TARGET.{0} = SOURCE.{0}", ident(k)))
            .collect::<Vec<_>>()
            .join(" AND ");

        let updates: Vec<String> = self
            .columns
            .iter()
            .filter(|c| !self.key_columns.contains(c))
            .map(|c| format!("TARGET.{0} = SOURCE.{0}", ident(c)))
            .collect();

        let source_columns: Vec<String> =
            columns.iter().map(|c| format!("SOURCE.{}", c)).collect();

        w.line(&format!(
            "MERGE INTO {} AS TARGET",
            qualified(&self.schema, &self.table)
        ));
        w.line("USING (VALUES");
        w.with_indent(1, |w| {
            w.lines(&comma_join_lines(&rows));
            Ok::<_, SqlError>(())
        })?;
        w.line(&format!(") AS SOURCE ({})", column_list(&columns)));
        w.line(&format!("ON {}", on));
        if !updates.is_empty() {
            w.line("WHEN MATCHED THEN");
            w.with_indent(1, |w| {
                w.line(&format!("UPDATE SET {}", column_list(&updates)));
                Ok::<_, SqlError>(())
            })?;
        }
        w.line("WHEN NOT MATCHED THEN");
        w.with_indent(1, |w| {
            w.line(&format!(
                "INSERT ({}) VALUES ({});",
                column_list(&columns),
                column_list(&source_columns)
            ));
            Ok(())
        })
    }
}

// ============================================================================
// Guards and transactions
// ============================================================================

/// Object type codes understood by `OBJECT_ID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Table,
    View,
    InlineFunction,
    TableFunction,
}

impl ObjectType {
    fn code(&self) -> &'static str {
        match self {
            ObjectType::Table => "U",
            ObjectType::View => "V",
            ObjectType::InlineFunction => "IF",
            ObjectType::TableFunction => "TF",
        }
    }
}

/// `IF OBJECT_ID(…) IS NOT NULL` block with an `ELSE` branch.
pub fn if_object_exists(
    w: &mut SqlWriter,
    schema: &str,
    name: &str,
    object_type: ObjectType,
    then_fn: impl FnOnce(&mut SqlWriter) -> SqlResult<()>,
    else_fn: impl FnOnce(&mut SqlWriter) -> SqlResult<()>,
) -> SqlResult<()> {
    let object = qualified(&Some(schema.to_string()), name);
    w.if_else(
        &format!(
            "OBJECT_ID(N{}, N'{}') IS NOT NULL",
            quote_string(&object),
            object_type.code()
        ),
        then_fn,
        else_fn,
    )
}

/// Wrap `body` in a transaction that commits on success and, on error,
/// rolls back any open transaction and re-raises with `THROW`.
pub fn transaction(
    w: &mut SqlWriter,
    body: impl FnOnce(&mut SqlWriter) -> SqlResult<()>,
) -> SqlResult<()> {
    w.line("BEGIN TRANSACTION;");
    w.try_catch(
        |w| {
            body(w)?;
            w.line("COMMIT TRANSACTION;");
            Ok(())
        },
        |w| {
            w.line("IF @@TRANCOUNT > 0");
            w.with_indent(1, |w| {
                w.line("ROLLBACK TRANSACTION;");
                Ok::<_, SqlError>(())
            })?;
            w.line("THROW;");
            Ok(())
        },
    )
}
