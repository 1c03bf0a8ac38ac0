//! Tests for the OData `$filter` parser.

use gridsql::filter::{parse_odata_filter, ComparisonOp, FilterError, FilterNode, LogicalOp};
use gridsql::sql::SqlValue;

fn cmp(column: &str, op: ComparisonOp, value: impl Into<SqlValue>) -> FilterNode {
    FilterNode::compare(FilterNode::column(column), op, FilterNode::literal(value))
}

fn parse_error(input: &str) -> (String, String) {
    match parse_odata_filter(input) {
        Err(FilterError::Parse { message, fragment }) => (message, fragment),
        other => panic!("expected a parse error for {input:?}, got {other:?}"),
    }
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_comparison() {
    assert_eq!(
        parse_odata_filter("Age gt 18").unwrap(),
        cmp("Age", ComparisonOp::Gt, 18i64)
    );
}

#[test]
fn test_every_operator() {
    let cases = [
        ("eq", ComparisonOp::Eq),
        ("ne", ComparisonOp::Ne),
        ("lt", ComparisonOp::Lt),
        ("le", ComparisonOp::Le),
        ("gt", ComparisonOp::Gt),
        ("ge", ComparisonOp::Ge),
        ("contains", ComparisonOp::Contains),
        ("notcontains", ComparisonOp::NotContains),
        ("startswith", ComparisonOp::StartsWith),
        ("endswith", ComparisonOp::EndsWith),
    ];
    for (keyword, op) in cases {
        let text = format!("Name {} 'x'", keyword);
        assert_eq!(parse_odata_filter(&text).unwrap(), cmp("Name", op, "x"), "{text}");
    }
}

#[test]
fn test_keywords_ignore_case() {
    assert_eq!(
        parse_odata_filter("Name STARTSWITH 'Jo' AND Age Ge 21").unwrap(),
        cmp("Name", ComparisonOp::StartsWith, "Jo").and(cmp("Age", ComparisonOp::Ge, 21i64))
    );
}

#[test]
fn test_values() {
    assert_eq!(
        parse_odata_filter("Rate le 2.75").unwrap(),
        cmp("Rate", ComparisonOp::Le, 2.75)
    );
    assert_eq!(
        parse_odata_filter("Delta gt -5").unwrap(),
        cmp("Delta", ComparisonOp::Gt, -5i64)
    );
    assert_eq!(
        parse_odata_filter("ClosedAt eq null").unwrap(),
        cmp("ClosedAt", ComparisonOp::Eq, SqlValue::Null)
    );
    assert_eq!(
        parse_odata_filter("Active eq TRUE").unwrap(),
        cmp("Active", ComparisonOp::Eq, true)
    );
    assert_eq!(
        parse_odata_filter("Name eq ''").unwrap(),
        cmp("Name", ComparisonOp::Eq, "")
    );
}

#[test]
fn test_quoted_keywords_are_strings() {
    assert_eq!(
        parse_odata_filter("Name eq 'null and true'").unwrap(),
        cmp("Name", ComparisonOp::Eq, "null and true")
    );
}

#[test]
fn test_whitespace_is_ignored() {
    assert_eq!(
        parse_odata_filter("   Age   gt\t18  ").unwrap(),
        cmp("Age", ComparisonOp::Gt, 18i64)
    );
    assert_eq!(
        parse_odata_filter("(Age gt 18)").unwrap(),
        parse_odata_filter("( Age gt 18 )").unwrap()
    );
}

// ============================================================================
// Connectives and groups
// ============================================================================

#[test]
fn test_connectives_fold_left() {
    let node = parse_odata_filter("A eq 1 and B eq 2 or C eq 3").unwrap();
    assert_eq!(
        node,
        FilterNode::logical(
            FilterNode::logical(
                cmp("A", ComparisonOp::Eq, 1i64),
                LogicalOp::And,
                cmp("B", ComparisonOp::Eq, 2i64),
            ),
            LogicalOp::Or,
            cmp("C", ComparisonOp::Eq, 3i64),
        )
    );
}

#[test]
fn test_parentheses_nest() {
    let node = parse_odata_filter("A eq 1 and (B eq 2 or C eq 3)").unwrap();
    assert_eq!(
        node,
        cmp("A", ComparisonOp::Eq, 1i64).and(
            cmp("B", ComparisonOp::Eq, 2i64).or(cmp("C", ComparisonOp::Eq, 3i64))
        )
    );
}

#[test]
fn test_leading_group() {
    let node = parse_odata_filter("(A eq 1 or B eq 2) and C eq 3").unwrap();
    assert_eq!(
        node,
        cmp("A", ComparisonOp::Eq, 1i64)
            .or(cmp("B", ComparisonOp::Eq, 2i64))
            .and(cmp("C", ComparisonOp::Eq, 3i64))
    );
}

#[test]
fn test_redundant_parentheses() {
    assert_eq!(
        parse_odata_filter("((A eq 1))").unwrap(),
        cmp("A", ComparisonOp::Eq, 1i64)
    );
}

#[test]
fn test_not_group() {
    assert_eq!(
        parse_odata_filter("not (A eq 1)").unwrap(),
        FilterNode::negate(cmp("A", ComparisonOp::Eq, 1i64))
    );
    assert_eq!(
        parse_odata_filter("B eq 2 and NOT(A eq 1 or A eq 3)").unwrap(),
        cmp("B", ComparisonOp::Eq, 2i64).and(FilterNode::negate(
            cmp("A", ComparisonOp::Eq, 1i64).or(cmp("A", ComparisonOp::Eq, 3i64))
        ))
    );
}

#[test]
fn test_column_named_like_keyword() {
    assert_eq!(
        parse_odata_filter("notes contains 'x'").unwrap(),
        cmp("notes", ComparisonOp::Contains, "x")
    );
    assert_eq!(
        parse_odata_filter("order eq 1").unwrap(),
        cmp("order", ComparisonOp::Eq, 1i64)
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_truncated_comparison() {
    let (message, fragment) = parse_error("Age gt");
    assert_eq!(message, "unexpected end of filter");
    assert_eq!(fragment, "");
}

#[test]
fn test_missing_operator() {
    let (message, fragment) = parse_error("Age 18");
    assert_eq!(message, "expected a comparison operator");
    assert_eq!(fragment, "18");
}

#[test]
fn test_unterminated_string() {
    let (message, fragment) = parse_error("Name eq 'unterminated");
    assert_eq!(message, "expected a value");
    assert_eq!(fragment, "'untermina");
}

#[test]
fn test_dangling_connective() {
    let (message, _) = parse_error("Age gt 18 and");
    assert_eq!(message, "unexpected end of filter");
}

#[test]
fn test_unbalanced_groups() {
    let (message, _) = parse_error("(Age gt 18");
    assert_eq!(message, "unbalanced '(' in filter");

    let (message, fragment) = parse_error("Age gt 18)");
    assert_eq!(message, "unbalanced ')' in filter");
    assert_eq!(fragment, "");
}

#[test]
fn test_unknown_connective() {
    let (message, fragment) = parse_error("A eq 1 xor B eq 2");
    assert_eq!(message, "expected 'and', 'or' or ')'");
    assert_eq!(fragment, "xor B eq 2");
}

#[test]
fn test_empty_filter() {
    assert!(parse_odata_filter("").is_err());
    assert!(parse_odata_filter("()").is_err());
}

#[test]
fn test_error_display() {
    let err = parse_odata_filter("Age 18").unwrap_err();
    assert_eq!(err.to_string(), "expected a comparison operator near '18'");
}
