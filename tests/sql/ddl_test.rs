//! Tests for the schema-maintenance statements.

use chrono::NaiveDate;
use gridsql::sql::ddl::{
    if_object_exists, transaction, AddColumn, ColumnDef, CreateTable, ObjectType, Upsert,
};
use gridsql::sql::{SqlError, SqlValue, SqlWriter};
use insta::assert_snapshot;
use uuid::Uuid;

// ============================================================================
// CREATE TABLE
// ============================================================================

#[test]
fn test_create_table() {
    let sql = CreateTable::new("Orders")
        .schema("sales")
        .column(ColumnDef::new("Id", "i64").not_null())
        .column(ColumnDef::new("Customer", "String").length(100))
        .column(ColumnDef::new("Total", "Decimal").precision(12, 2))
        .column(ColumnDef::new("Notes", "String"))
        .column(ColumnDef::new("PlacedAt", "NaiveDateTime").not_null())
        .primary_key(["Id"])
        .to_sql()
        .unwrap();

    assert_snapshot!(sql, @r"
    IF OBJECT_ID(N'[sales].[Orders]', N'U') IS NULL
    BEGIN
      CREATE TABLE [sales].[Orders] (
        [Id] BIGINT NOT NULL,
        [Customer] NVARCHAR(100) NULL,
        [Total] DECIMAL(12,2) NULL,
        [Notes] NVARCHAR(MAX) NULL,
        [PlacedAt] DATETIME2 NOT NULL,
        CONSTRAINT [PK_Orders] PRIMARY KEY ([Id])
      );
    END
    ");
}

#[test]
fn test_create_table_defaults() {
    let sql = CreateTable::new("Rates")
        .columns([
            ColumnDef::new("Code", "String").length(3).not_null(),
            ColumnDef::new("Rate", "Decimal"),
            ColumnDef::new("Active", "bool"),
        ])
        .to_sql()
        .unwrap();

    assert_snapshot!(sql, @r"
    IF OBJECT_ID(N'[dbo].[Rates]', N'U') IS NULL
    BEGIN
      CREATE TABLE [dbo].[Rates] (
        [Code] NVARCHAR(3) NOT NULL,
        [Rate] DECIMAL(18,10) NULL,
        [Active] BIT NULL
      );
    END
    ");
}

#[test]
fn test_create_table_sanitizes_names() {
    let sql = CreateTable::new("Orders]; DROP TABLE x")
        .column(ColumnDef::new("Id", "i32"))
        .to_sql()
        .unwrap();
    assert!(sql.contains("CREATE TABLE [dbo].[Orders___DROP_TABLE_x] ("));
}

#[test]
fn test_create_table_errors() {
    assert!(matches!(
        CreateTable::new("Empty").to_sql(),
        Err(SqlError::InvalidStatement(_))
    ));
    assert!(matches!(
        CreateTable::new("T")
            .column(ColumnDef::new("X", "HashMap"))
            .to_sql(),
        Err(SqlError::Catalog(_))
    ));
}

// ============================================================================
// ALTER TABLE ADD
// ============================================================================

#[test]
fn test_add_column() {
    let sql = AddColumn::new("Orders", ColumnDef::new("Note", "String").length(200))
        .schema("sales")
        .to_sql()
        .unwrap();

    assert_snapshot!(sql, @r"
    IF COL_LENGTH(N'[sales].[Orders]', N'Note') IS NULL
    BEGIN
      ALTER TABLE [sales].[Orders] ADD [Note] NVARCHAR(200) NULL;
    END
    ");
}

// ============================================================================
// MERGE
// ============================================================================

#[test]
fn test_upsert() {
    let sql = Upsert::new("Customers")
        .keys(["Id"])
        .columns(["Id", "Name", "Active"])
        .row([SqlValue::Int(1), SqlValue::from("Ann"), SqlValue::Bool(true)])
        .row([SqlValue::Int(2), SqlValue::from("O'Brien"), SqlValue::Null])
        .to_sql()
        .unwrap();

    assert_snapshot!(sql, @r"
    MERGE INTO [dbo].[Customers] AS TARGET
    USING (VALUES
      (1, 'Ann', 1),
      (2, 'O''Brien', NULL)
    ) AS SOURCE ([Id], [Name], [Active])
    ON TARGET.[Id] = SOURCE.[Id]
    WHEN MATCHED THEN
      UPDATE SET TARGET.[Name] = SOURCE.[Name], TARGET.[Active] = SOURCE.[Active]
    WHEN NOT MATCHED THEN
      INSERT ([Id], [Name], [Active]) VALUES (SOURCE.[Id], SOURCE.[Name], SOURCE.[Active]);
    ");
}

#[test]
fn test_upsert_keys_only() {
    let sql = Upsert::new("Tags")
        .schema("meta")
        .keys(["Region", "Code"])
        .columns(["Region", "Code"])
        .row(["EU", "x"])
        .to_sql()
        .unwrap();

    assert_snapshot!(sql, @r"
    MERGE INTO [meta].[Tags] AS TARGET
    USING (VALUES
      ('EU', 'x')
    ) AS SOURCE ([Region], [Code])
    ON TARGET.[Region] = SOURCE.[Region] AND TARGET.[Code] = SOURCE.[Code]
    WHEN NOT MATCHED THEN
      INSERT ([Region], [Code]) VALUES (SOURCE.[Region], SOURCE.[Code]);
    ");
}

#[test]
fn test_upsert_literal_kinds() {
    let placed = NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let sql = Upsert::new("Events")
        .keys(["Id"])
        .columns(["Id", "At", "Rate", "Label", "Payload"])
        .row([
            SqlValue::Guid(Uuid::nil()),
            SqlValue::DateTime(placed),
            SqlValue::Float(2.5),
            SqlValue::from("Zoë"),
            SqlValue::Bytes(vec![0xDE, 0xAD]),
        ])
        .to_sql()
        .unwrap();

    assert!(sql.contains(
        "('00000000-0000-0000-0000-000000000000', '2024-01-15 09:30:00.000', 2.5, N'Zoë', CONVERT(VARBINARY(MAX), '0xDEAD', 1))"
    ));
}

#[test]
fn test_upsert_validation() {
    let no_rows = Upsert::new("T").keys(["Id"]).columns(["Id"]).to_sql();
    assert!(matches!(no_rows, Err(SqlError::InvalidStatement(_))));

    let no_keys = Upsert::new("T").columns(["Id"]).row([1]).to_sql();
    assert!(matches!(no_keys, Err(SqlError::InvalidStatement(_))));

    let stray_key = Upsert::new("T")
        .keys(["Code"])
        .columns(["Id"])
        .row([1])
        .to_sql();
    assert!(matches!(stray_key, Err(SqlError::InvalidStatement(_))));

    let ragged = Upsert::new("T")
        .keys(["Id"])
        .columns(["Id", "Name"])
        .row([SqlValue::Int(1), SqlValue::from("a")])
        .row([SqlValue::Int(2)])
        .to_sql();
    assert_eq!(
        ragged,
        Err(SqlError::InvalidStatement(
            "row 1 has 1 values, expected 2".into()
        ))
    );
}

#[test]
fn test_upsert_rejects_timespan_literal() {
    let result = Upsert::new("T")
        .keys(["Id"])
        .columns(["Id", "Span"])
        .row([
            SqlValue::Int(1),
            SqlValue::TimeSpan(chrono::TimeDelta::seconds(5)),
        ])
        .to_sql();
    assert!(matches!(result, Err(SqlError::UnsupportedValueKind(_))));
}

// ============================================================================
// Guards and transactions
// ============================================================================

#[test]
fn test_if_object_exists() {
    let mut w = SqlWriter::new();
    if_object_exists(
        &mut w,
        "dbo",
        "OpenOrders",
        ObjectType::View,
        |w| {
            w.line("DROP VIEW [dbo].[OpenOrders];");
            Ok(())
        },
        |w| {
            w.line("PRINT 'missing';");
            Ok(())
        },
    )
    .unwrap();

    assert_snapshot!(w.finish(), @r"
    IF OBJECT_ID(N'[dbo].[OpenOrders]', N'V') IS NOT NULL
    BEGIN
      DROP VIEW [dbo].[OpenOrders];
    END
    ELSE
    BEGIN
      PRINT 'missing';
    END
    ");
}

#[test]
fn test_function_object_codes() {
    let mut w = SqlWriter::new();
    if_object_exists(
        &mut w,
        "dbo",
        "GetOrders",
        ObjectType::InlineFunction,
        |_| Ok(()),
        |_| Ok(()),
    )
    .unwrap();
    assert!(w
        .finish()
        .starts_with("IF OBJECT_ID(N'[dbo].[GetOrders]', N'IF') IS NOT NULL\n"));
}

#[test]
fn test_transaction() {
    let mut w = SqlWriter::new();
    transaction(&mut w, |w| {
        AddColumn::new("Orders", ColumnDef::new("Note", "String")).write(w)
    })
    .unwrap();

    assert_snapshot!(w.finish(), @r"
    BEGIN TRANSACTION;
    BEGIN TRY
      IF COL_LENGTH(N'[dbo].[Orders]', N'Note') IS NULL
      BEGIN
        ALTER TABLE [dbo].[Orders] ADD [Note] NVARCHAR(MAX) NULL;
      END
      COMMIT TRANSACTION;
    END TRY
    BEGIN CATCH
      IF @@TRANCOUNT > 0
        ROLLBACK TRANSACTION;
      THROW;
    END CATCH
    ");
}

#[test]
fn test_transaction_body_error_restores_indent() {
    let mut w = SqlWriter::new();
    let result = transaction(&mut w, |w| CreateTable::new("Empty").write(w));

    assert!(matches!(result, Err(SqlError::InvalidStatement(_))));
    assert_eq!(w.indent(), 0);
}
