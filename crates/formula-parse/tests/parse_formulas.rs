use formula_parse::{
    parse_formula, BinaryOp, CellRef, Expr, ParseOptions, TokenKind, UnaryOp,
};
use pretty_assertions::assert_eq;

fn parse(input: &str) -> Expr {
    parse_formula(input, ParseOptions::default())
        .unwrap_or_else(|e| panic!("{input:?} should parse, got {e}"))
}

fn plain_cell(row: i64, col: i64) -> CellRef {
    CellRef {
        row,
        col,
        row_abs: false,
        col_abs: false,
        sheet: None,
    }
}

#[test]
fn composite_formula_has_the_expected_shape() {
    let expr = parse("SUM(A1:B10,100)+IF(C1>0,\"yes\",\"no\")");

    let Expr::Binary(add) = expr else {
        panic!("expected a binary root");
    };
    assert_eq!(add.op, BinaryOp::Add);

    let Expr::FunctionCall(sum) = *add.left else {
        panic!("expected SUM call on the left");
    };
    assert_eq!(sum.name, "SUM");
    assert_eq!(sum.args.len(), 2);
    let Expr::RangeRef(range) = &sum.args[0] else {
        panic!("expected a range as SUM's first argument");
    };
    assert_eq!(range.start, plain_cell(0, 0));
    assert_eq!(range.end, plain_cell(9, 1));
    assert_eq!(sum.args[1], Expr::Number(100.0));

    let Expr::FunctionCall(if_call) = *add.right else {
        panic!("expected IF call on the right");
    };
    assert_eq!(if_call.name, "IF");
    assert_eq!(if_call.args.len(), 3);
    let Expr::Binary(cond) = &if_call.args[0] else {
        panic!("expected a comparison condition");
    };
    assert_eq!(cond.op, BinaryOp::Gt);
    assert_eq!(*cond.left, Expr::CellRef(plain_cell(0, 2)));
    assert_eq!(if_call.args[1], Expr::String("yes".to_string()));
    assert_eq!(if_call.args[2], Expr::String("no".to_string()));
}

#[test]
fn argument_count_matches_the_source() {
    for k in 1..=6 {
        let args: Vec<String> = (0..k).map(|i| i.to_string()).collect();
        let formula = format!("COUNT({})", args.join(","));
        let Expr::FunctionCall(call) = parse(&formula) else {
            panic!("expected FunctionCall");
        };
        assert_eq!(call.args.len(), k);
    }
}

#[test]
fn nested_calls_and_arrays_compose() {
    let expr = parse("SUM({1,2;3,4},MAX(A1,-B2))%");
    let Expr::Unary(percent) = expr else {
        panic!("expected trailing percent");
    };
    assert_eq!(percent.op, UnaryOp::Percent);

    let Expr::FunctionCall(sum) = *percent.expr else {
        panic!("expected SUM call");
    };
    assert_eq!(sum.args.len(), 2);
    let Expr::Array(array) = &sum.args[0] else {
        panic!("expected an array literal");
    };
    assert_eq!(array.rows.len(), 2);
    assert_eq!(array.rows[0].len(), 2);

    let Expr::FunctionCall(max) = &sum.args[1] else {
        panic!("expected MAX call");
    };
    assert_eq!(max.name, "MAX");
    let Expr::Unary(neg) = &max.args[1] else {
        panic!("expected negated argument");
    };
    assert_eq!(neg.op, UnaryOp::Minus);
}

#[test]
fn sheet_context_flows_into_ranges() {
    let opts = ParseOptions {
        current_sheet: Some("Data".to_string()),
    };
    let expr = parse_formula("A1:B2", opts).unwrap();
    let Expr::RangeRef(range) = expr else {
        panic!("expected a range");
    };
    assert_eq!(range.start.sheet.as_deref(), Some("Data"));
    assert_eq!(range.end.sheet.as_deref(), Some("Data"));
}

#[test]
fn quoted_sheet_prefix_parses_to_a_qualified_reference() {
    let expr = parse("'Q1 Report'!$C$3");
    assert_eq!(
        expr,
        Expr::CellRef(CellRef {
            row: 2,
            col: 2,
            row_abs: true,
            col_abs: true,
            sheet: Some("Q1 Report".to_string()),
        })
    );
}

#[test]
fn malformed_inputs_always_carry_a_position_and_token() {
    let cases = [
        "SUM(",
        "1:2",
        "(1+2",
        "Data!",
        "{1,2",
        "1 2",
        "\"open",
        "~",
        "",
    ];
    for input in cases {
        let err = parse_formula(input, ParseOptions::default())
            .expect_err(&format!("{input:?} should fail"));
        assert!(
            err.position <= input.len(),
            "{input:?}: position {} out of bounds",
            err.position
        );
        assert_eq!(err.position, err.token.span.start, "{input:?}");
        assert!(!err.message.is_empty(), "{input:?}");
    }
}

#[test]
fn error_shape_is_stable_for_unclosed_calls() {
    let err = parse_formula("SUM(", ParseOptions::default()).unwrap_err();
    assert_eq!(err.position, 4);
    assert_eq!(err.token.kind, TokenKind::Eof);
    assert_eq!(err.token.span.start, err.token.span.end);
}

#[test]
fn ast_json_debug_serialization_round_trips() {
    let expr = parse("IF(A1>=5%,{1;2},X.Y)");
    let json = expr.to_json();
    let back: Expr = serde_json::from_str(&json).unwrap();
    assert_eq!(back, expr);
}
