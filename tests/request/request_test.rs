//! Tests for reading the grid JSON request body.

use gridsql::compile::CompileError;
use gridsql::filter::{ComparisonOp, FilterNode};
use gridsql::request::{GroupSpec, QueryRequest, SortExpr, SortSpec};
use gridsql::sql::SqlValue;
use serde_json::json;

#[test]
fn test_full_body() {
    let request = QueryRequest::from_json(
        r#"{
            "group": [{"selector": "Region", "expanded": true}, {"selector": "Country"}],
            "select": ["Region", "Country", "Total"],
            "filter": ["Total", ">", 100],
            "orderby": [{"selector": "Total", "desc": true}, {"expression": "1"}],
            "take": 50,
            "skip": 100,
            "showTotal": true,
            "loadAll": false,
            "userData": {"CustomerId": 42, "Region": "EU", "Since": null}
        }"#,
    )
    .unwrap();

    assert_eq!(
        request.grouping,
        vec![
            GroupSpec {
                column: "Region".into(),
                expanded: true
            },
            GroupSpec {
                column: "Country".into(),
                expanded: false
            },
        ]
    );
    assert_eq!(request.fields, vec!["Region", "Country", "Total"]);
    assert_eq!(
        request.filter,
        Some(FilterNode::compare(
            FilterNode::column("Total"),
            ComparisonOp::Gt,
            FilterNode::literal(100i64)
        ))
    );
    assert_eq!(
        request.sort,
        vec![
            SortSpec::desc("Total"),
            SortSpec {
                expression: SortExpr::Literal("1".into()),
                descending: false
            },
        ]
    );
    assert_eq!(request.take, Some(50));
    assert_eq!(request.skip, Some(100));
    assert!(request.show_total);
    assert!(!request.load_all);
    assert!(request.is_paged());

    let keys: Vec<&str> = request.user_data.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["CustomerId", "Region", "Since"]);
    assert_eq!(request.user_data["Since"], SqlValue::Null);
}

#[test]
fn test_filter_forms() {
    let wire = QueryRequest::from_json(r#"{"filter": ["Name", "Ann"]}"#).unwrap();
    let odata = QueryRequest::from_json(r#"{"filter": "Name eq 'Ann'"}"#).unwrap();
    assert!(wire.filter.is_some());
    assert_eq!(wire.filter, odata.filter);
}

#[test]
fn test_empty_filters_mean_none() {
    for body in [
        json!({"filter": []}),
        json!({"filter": ""}),
        json!({"filter": "   "}),
        json!({"filter": null}),
    ] {
        let request = QueryRequest::from_value(body.clone()).unwrap();
        assert_eq!(request.filter, None, "{body}");
    }
}

#[test]
fn test_bad_filter_is_error() {
    let err = QueryRequest::from_json(r#"{"filter": ["A", "~", 1]}"#).unwrap_err();
    assert!(matches!(err, CompileError::Filter(_)));

    let err = QueryRequest::from_json(r#"{"filter": 42}"#).unwrap_err();
    assert!(matches!(err, CompileError::Filter(_)));
}

#[test]
fn test_malformed_body() {
    assert!(matches!(
        QueryRequest::from_json("{not json"),
        Err(CompileError::Json(_))
    ));
    assert!(matches!(
        QueryRequest::from_json(r#"{"take": -1}"#),
        Err(CompileError::Json(_))
    ));
    assert!(matches!(
        QueryRequest::from_json(r#"{"group": [{"expanded": true}]}"#),
        Err(CompileError::Json(_))
    ));
}

#[test]
fn test_unknown_fields_ignored() {
    let request = QueryRequest::from_json(r#"{"requireTotalCount": true, "take": 3}"#).unwrap();
    assert_eq!(request.take, Some(3));
}

#[test]
fn test_builder_matches_json() {
    let built = QueryRequest::new()
        .select(["Id"])
        .order_by(SortSpec::asc("Id"))
        .take(10)
        .with_total()
        .user_value("Tenant", 3);

    let parsed = QueryRequest::from_json(
        r#"{
            "select": ["Id"],
            "orderby": [{"selector": "Id"}],
            "take": 10,
            "showTotal": true,
            "userData": {"Tenant": 3}
        }"#,
    )
    .unwrap();

    assert_eq!(built, parsed);
}
