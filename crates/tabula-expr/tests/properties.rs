use proptest::prelude::*;
use tabula_columnar::{Frame, Value};
use tabula_expr::{parse, Dialect, FrameExprExt};

const CASES: u32 = 128;

fn frame_strategy() -> impl Strategy<Value = Frame> {
    (0usize..30).prop_flat_map(|rows| {
        (
            prop::collection::vec(0i32..100, rows),
            prop::collection::vec(prop::sample::select(vec!["IT", "HR", "Ops"]), rows),
        )
            .prop_map(|(ages, depts)| {
                Frame::from_columns(vec![
                    ("age", ages.into_iter().map(Value::Int).collect()),
                    ("dept", depts.into_iter().map(Value::from).collect()),
                ])
                .unwrap()
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: CASES,
        .. ProptestConfig::default()
    })]

    #[test]
    fn parser_never_panics(input in "\\PC{0,64}") {
        let _ = parse(&input, Dialect::Sql, &[]);
        let _ = parse(&input, Dialect::Expr, &[]);
    }

    #[test]
    fn parser_never_panics_on_operator_soup(
        input in "[a-z0-9 '%_(),.=<>!&|{}\\[\\]+*/-]{0,48}"
    ) {
        let _ = parse(&input, Dialect::Sql, &[]);
        let _ = parse(&input, Dialect::Expr, &[Value::Int(1), Value::from("x")]);
    }

    #[test]
    fn between_equals_range_filter(frame in frame_strategy(), low in 0i32..100, span in 0i32..50) {
        let high = low + span;
        let by_query = frame.query(&format!("age BETWEEN {low} AND {high}")).unwrap();
        let by_closure = frame.filter(|row| {
            matches!(row.get("age"), Some(Value::Int(age)) if (low..=high).contains(age))
        });
        prop_assert_eq!(by_query, by_closure);
    }

    #[test]
    fn dialects_agree(frame in frame_strategy(), pivot in 0i32..100) {
        let sql = frame.query(&format!("dept IN ('IT', 'Ops') AND NOT age > {pivot}")).unwrap();
        let expr = frame
            .expr(
                "['IT', 'Ops'].includes(dept) && !(age > {})",
                &[Value::Int(pivot)],
            )
            .unwrap();
        prop_assert_eq!(sql, expr);
    }

    #[test]
    fn query_filters_are_idempotent(frame in frame_strategy(), pivot in 0i32..100) {
        let query = format!("age >= {pivot} OR dept = 'HR'");
        let once = frame.query(&query).unwrap();
        let twice = once.query(&query).unwrap();
        prop_assert_eq!(once, twice);
    }
}
