//! End-to-end tests: grid request JSON to a SQL batch.

use gridsql::compile::{compile_grid_query, CompileError, CompileOptions, ObjectName};
use gridsql::metadata::{
    MetadataError, MetadataResult, ObjectInfo, SchemaProvider, StaticSchemaProvider,
};
use gridsql::request::QueryRequest;
use gridsql::sql::SqlValue;
use insta::assert_snapshot;
use serde_json::json;

fn provider() -> StaticSchemaProvider {
    StaticSchemaProvider::new()
        .with_object(
            ObjectName::new("dbo", "GetOrders"),
            ObjectInfo::function(["CustomerId", "Since"]),
        )
        .with_object(ObjectName::new("sales", "OpenOrders"), ObjectInfo::view())
}

fn compile(object: &str, body: &str) -> Result<gridsql::CompiledQuery, CompileError> {
    let request = QueryRequest::from_json(body)?;
    compile_grid_query(&provider(), object, &request, &CompileOptions::default())
}

#[test]
fn test_function_batch() {
    let compiled = compile(
        "dbo.GetOrders",
        r#"{
            "group": [{"selector": "Region", "expanded": false}],
            "select": ["Region"],
            "filter": ["Total", ">", 100],
            "orderby": [{"selector": "Region", "desc": false}],
            "skip": 10,
            "take": 20,
            "showTotal": true,
            "userData": {"CustomerId": 42}
        }"#,
    )
    .unwrap();

    assert_snapshot!(compiled.sql.trim_end(), @r"
    SELECT [$Type] = 'Result', RESULTS.[Region]
    FROM [dbo].[GetOrders](@0, DEFAULT) RESULTS
    WHERE [Total] > @1
    GROUP BY [Region]
    ORDER BY [Region] ASC
    OFFSET 10 ROWS FETCH NEXT 20 ROWS ONLY;

    SELECT [$Type] = '$Root', [TotalRecords] = COUNT(*)
    FROM [dbo].[GetOrders](@0, DEFAULT) RESULTS
    WHERE [Total] > @1;
    ");

    assert_eq!(
        compiled.to_json()["params"],
        json!({"@0": 42, "@1": 100})
    );
}

#[test]
fn test_argument_names_ignore_case_and_prefix() {
    let compiled = compile(
        "dbo.GetOrders",
        r#"{"userData": {"@since": "2024-01-01", "customerid": 7, "Unused": true}}"#,
    )
    .unwrap();

    // bound in parameter order, not userData order
    assert!(compiled.sql.contains("FROM [dbo].[GetOrders](@0, @1) RESULTS;"));
    assert_eq!(compiled.params.get("@0"), Some(&SqlValue::Int(7)));
    assert_eq!(
        compiled.params.get("@1"),
        Some(&SqlValue::String("2024-01-01".into()))
    );
    assert_eq!(compiled.params.len(), 2);
}

#[test]
fn test_view_with_odata_filter() {
    let compiled = compile(
        "sales.OpenOrders",
        r#"{"filter": "Status eq 'Open' and Total ge 10.5", "take": 5}"#,
    )
    .unwrap();

    assert_snapshot!(compiled.sql.trim_end(), @r"
    SELECT [$Type] = 'Result', RESULTS.*
    FROM [sales].[OpenOrders] RESULTS
    WHERE [Status] = @0
    AND
    [Total] >= @1
    ORDER BY 1 ASC
    OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY;
    ");
    assert_eq!(compiled.params.get("@1"), Some(&SqlValue::Float(10.5)));
}

#[test]
fn test_default_schema_and_case() {
    let compiled = compile("getorders", "{}").unwrap();
    assert!(compiled
        .sql
        .contains("FROM [dbo].[getorders](DEFAULT, DEFAULT) RESULTS;"));

    let options = CompileOptions::default().with_default_schema("sales");
    let request = QueryRequest::new();
    let compiled = compile_grid_query(&provider(), "OpenOrders", &request, &options).unwrap();
    assert!(compiled.sql.contains("FROM [sales].[OpenOrders] RESULTS;"));
}

#[test]
fn test_bracketed_object_name() {
    let compiled = compile("[sales].[OpenOrders]", "{}").unwrap();
    assert_eq!(compiled.statement_count(), 1);
}

#[test]
fn test_unknown_object() {
    let err = compile("dbo.Missing", "{}").unwrap_err();
    assert!(matches!(err, CompileError::ObjectNotFound(ref name) if name == "dbo.Missing"));
}

#[test]
fn test_invalid_object_name() {
    let err = compile("a.b.c", "{}").unwrap_err();
    assert!(matches!(err, CompileError::InvalidIdentifierChain(_)));
}

#[test]
fn test_invalid_filter() {
    let err = compile("sales.OpenOrders", r#"{"filter": "Total gt"}"#).unwrap_err();
    assert!(matches!(err, CompileError::Filter(_)));
    assert_eq!(err.to_string(), "unexpected end of filter near ''");
}

struct Offline;

impl SchemaProvider for Offline {
    fn describe(&self, _object: &ObjectName) -> MetadataResult<Option<ObjectInfo>> {
        Err(MetadataError::Unavailable("connection refused".into()))
    }
}

#[test]
fn test_provider_failure() {
    let err = compile_grid_query(
        &Offline,
        "dbo.Orders",
        &QueryRequest::new(),
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CompileError::Metadata(MetadataError::Unavailable(_))
    ));
}

#[test]
fn test_hostile_identifiers_never_reach_sql() {
    let compiled = compile(
        "sales.OpenOrders",
        r#"{
            "select": ["Id]; DROP TABLE x;--"],
            "filter": [["Name'--", "=", "'; DELETE FROM y"]],
            "orderby": [{"expression": "1; EXEC xp_cmdshell", "desc": true}]
        }"#,
    )
    .unwrap();

    assert_eq!(compiled.sql.matches(';').count(), 1);
    assert!(compiled.sql.contains("RESULTS.[Id___DROP_TABLE_x___]"));
    assert!(compiled.sql.contains("WHERE [Name___] = @0"));
    assert!(compiled.sql.contains("ORDER BY 1__EXEC_xp_cmdshell DESC;"));
    assert_eq!(
        compiled.params.get("@0"),
        Some(&SqlValue::String("'; DELETE FROM y".into()))
    );
}

#[test]
fn test_compilation_is_deterministic() {
    let body = r#"{
        "filter": [["Total", ">", 1], "or", ["Name", "contains", "x"]],
        "orderby": [{"selector": "Total", "desc": true}],
        "take": 10,
        "showTotal": true,
        "userData": {"CustomerId": 1, "Since": "2024-01-01"}
    }"#;
    let first = compile("dbo.GetOrders", body).unwrap();
    let second = compile("dbo.GetOrders", body).unwrap();

    assert_eq!(first.sql, second.sql);
    assert_eq!(first.to_json(), second.to_json());
}
