use pretty_assertions::assert_eq;
use tabula_columnar::{AggSpec, Aggregator, Column, ColumnKind, Frame, FrameError, Value};

fn staff() -> Frame {
    Frame::from_columns(vec![
        ("id", vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        (
            "dept",
            vec![Value::from("IT"), Value::from("IT"), Value::from("HR")],
        ),
        (
            "salary",
            vec![Value::Int(100), Value::Int(200), Value::Int(150)],
        ),
    ])
    .unwrap()
}

fn column(frame: &Frame, name: &str) -> Vec<Value> {
    frame.column(name).unwrap().materialize()
}

#[test]
fn sum_per_department_in_first_seen_order() {
    let out = staff()
        .group_by(&["dept"])
        .unwrap()
        .aggregate(&[AggSpec::sum("salary")])
        .unwrap();

    assert_eq!(out.column_names(), &["dept", "salary"]);
    assert_eq!(column(&out, "dept"), vec![Value::from("IT"), Value::from("HR")]);
    assert_eq!(
        column(&out, "salary"),
        vec![Value::Float(300.0), Value::Float(150.0)]
    );
}

#[test]
fn several_aggregators_on_one_column_get_suffixed_names() {
    let out = staff()
        .group_by(&["dept"])
        .unwrap()
        .aggregate(&[
            AggSpec::sum("salary"),
            AggSpec::mean("salary"),
            AggSpec::min("salary"),
            AggSpec::max("salary"),
            AggSpec::count("id"),
        ])
        .unwrap();

    assert_eq!(
        out.column_names(),
        &[
            "dept",
            "salary_sum",
            "salary_mean",
            "salary_min",
            "salary_max",
            "id"
        ]
    );
    assert_eq!(
        out.kinds(),
        vec![
            ColumnKind::Text,
            ColumnKind::Float64,
            ColumnKind::Float64,
            ColumnKind::Int32,
            ColumnKind::Int32,
            ColumnKind::Int32,
        ]
    );
    assert_eq!(
        column(&out, "salary_mean"),
        vec![Value::Float(150.0), Value::Float(150.0)]
    );
    assert_eq!(column(&out, "salary_min"), vec![Value::Int(100), Value::Int(150)]);
    assert_eq!(column(&out, "salary_max"), vec![Value::Int(200), Value::Int(150)]);
    assert_eq!(column(&out, "id"), vec![Value::Int(2), Value::Int(1)]);
}

#[test]
fn counting_a_key_column_avoids_a_name_clash() {
    let out = staff()
        .group_by(&["dept"])
        .unwrap()
        .aggregate(&[AggSpec::count("dept")])
        .unwrap();
    assert_eq!(out.column_names(), &["dept", "dept_count"]);
}

#[test]
fn count_includes_non_numeric_values_but_sum_rejects_them() {
    let frame = staff();
    let groups = frame.group_by(&["dept"]).unwrap();
    let counted = groups.aggregate(&[AggSpec::count("dept")]).unwrap();
    assert_eq!(column(&counted, "dept_count"), vec![Value::Int(2), Value::Int(1)]);

    let err = groups.aggregate(&[AggSpec::sum("dept")]).unwrap_err();
    assert!(matches!(err, FrameError::TypeMismatch(_)), "{err:?}");
}

#[test]
fn custom_reducer_sees_raw_group_values() {
    let out = staff()
        .group_by(&["dept"])
        .unwrap()
        .aggregate(&[AggSpec::custom("id", "ids", |values| {
            Value::from(
                values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("+"),
            )
        })])
        .unwrap();
    assert_eq!(column(&out, "id"), vec![Value::from("1+2"), Value::from("3")]);
}

#[test]
fn multi_column_keys_use_structural_equality() {
    let frame = Frame::from_columns(vec![
        (
            "region",
            vec![
                Value::from("n"),
                Value::from("n"),
                Value::from("s"),
                Value::from("n"),
            ],
        ),
        (
            "year",
            vec![Value::Int(2023), Value::Int(2024), Value::Int(2023), Value::Int(2023)],
        ),
        (
            "amount",
            vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0), Value::Float(4.0)],
        ),
    ])
    .unwrap();

    let groups = frame.group_by(&["region", "year"]).unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups.indices(), &[vec![0, 3], vec![1], vec![2]]);

    let out = groups.aggregate(&[AggSpec::sum("amount")]).unwrap();
    assert_eq!(out.column_names(), &["region", "year", "amount"]);
    assert_eq!(out.column("year").unwrap().kind(), ColumnKind::Int32);
    assert_eq!(
        column(&out, "amount"),
        vec![Value::Float(5.0), Value::Float(2.0), Value::Float(3.0)]
    );

    let north_2023 = groups
        .get_group(&[Value::from("n"), Value::Int(2023)])
        .unwrap();
    assert_eq!(north_2023.row_count(), 2);
}

#[test]
fn null_keys_form_their_own_group() {
    let frame = Frame::from_columns(vec![
        ("k", vec![Value::from("a"), Value::Null, Value::Null]),
        ("v", vec![Value::Int(1), Value::Int(2), Value::Null]),
    ])
    .unwrap();
    let out = frame
        .group_by(&["k"])
        .unwrap()
        .aggregate(&[AggSpec::sum("v")])
        .unwrap();
    assert_eq!(column(&out, "k"), vec![Value::from("a"), Value::Null]);
    assert_eq!(column(&out, "v"), vec![Value::Float(1.0), Value::Float(2.0)]);
}

#[test]
fn empty_frame_groups_to_empty_output_with_kinds() {
    let frame = Frame::from_typed_columns(vec![
        ("k", Column::text(Vec::<&str>::new())),
        ("v", Column::float64(Vec::new())),
    ])
    .unwrap();
    let out = frame
        .group_by(&["k"])
        .unwrap()
        .aggregate(&[AggSpec::sum("v"), AggSpec::count("v")])
        .unwrap();
    assert_eq!(out.row_count(), 0);
    assert_eq!(
        out.kinds(),
        vec![ColumnKind::Text, ColumnKind::Float64, ColumnKind::Int32]
    );
}

#[test]
fn group_by_validates_columns() {
    let frame = staff();
    assert_eq!(
        frame.group_by(&["nope"]).unwrap_err(),
        FrameError::UnknownColumn("nope".to_string())
    );
    assert!(matches!(
        frame.group_by::<&str>(&[]),
        Err(FrameError::InvalidArgument(_))
    ));
    let groups = frame.group_by(&["dept"]).unwrap();
    assert!(matches!(
        groups.aggregate(&[AggSpec::sum("nope")]),
        Err(FrameError::UnknownColumn(_))
    ));
    assert!(matches!(
        AggSpec::parse("salary", "median"),
        Err(FrameError::InvalidArgument(_))
    ));
    assert!(matches!(
        AggSpec::parse("salary", "avg").map(|s| s.aggregator),
        Ok(Aggregator::Mean)
    ));
}

#[test]
fn apply_unions_returned_fields() {
    let out = staff()
        .group_by(&["dept"])
        .unwrap()
        .apply(|group| {
            let mut record = vec![("rows".to_string(), Value::Int(group.row_count() as i32))];
            if group.row_count() > 1 {
                record.push(("top".to_string(), group.at(1).unwrap().get("id").cloned().unwrap()));
            }
            record
        })
        .unwrap();

    assert_eq!(out.column_names(), &["dept", "rows", "top"]);
    assert_eq!(column(&out, "rows"), vec![Value::Int(2), Value::Int(1)]);
    assert_eq!(column(&out, "top"), vec![Value::Int(2), Value::Null]);
}

#[test]
fn apply_may_override_key_values() {
    let out = staff()
        .group_by(&["dept"])
        .unwrap()
        .apply(|group| {
            let dept = group.at(0).unwrap().get("dept").cloned().unwrap();
            vec![("dept".to_string(), Value::from(dept.to_string().to_lowercase()))]
        })
        .unwrap();
    assert_eq!(out.column_names(), &["dept"]);
    assert_eq!(column(&out, "dept"), vec![Value::from("it"), Value::from("hr")]);
}

#[test]
fn clashing_output_names_are_rejected_with_the_offending_spec() {
    let frame = staff();
    let groups = frame.group_by(&["dept"]).unwrap();
    let err = groups
        .aggregate(&[AggSpec::sum("salary"), AggSpec::sum("salary")])
        .unwrap_err();
    assert!(
        matches!(&err, FrameError::InvalidArgument(msg) if msg.contains("sum(salary)")),
        "{err:?}"
    );

    let err = groups
        .aggregate(&[
            AggSpec::sum("salary"),
            AggSpec::custom("salary", "sum", |values| Value::Int(values.len() as i32)),
        ])
        .unwrap_err();
    assert!(
        matches!(&err, FrameError::InvalidArgument(msg) if msg.contains("salary_sum")),
        "{err:?}"
    );
}

#[test]
fn min_and_max_ignore_nan_values() {
    let frame = Frame::from_columns(vec![
        ("k", vec![Value::from("a"), Value::from("a"), Value::from("a")]),
        (
            "v",
            vec![Value::Float(f64::NAN), Value::Float(2.5), Value::Float(-1.0)],
        ),
    ])
    .unwrap();
    let out = frame
        .group_by(&["k"])
        .unwrap()
        .aggregate(&[AggSpec::min("v"), AggSpec::max("v")])
        .unwrap();
    assert_eq!(column(&out, "v_min"), vec![Value::Float(-1.0)]);
    assert_eq!(column(&out, "v_max"), vec![Value::Float(2.5)]);
}

#[test]
fn apply_on_empty_frame_keeps_key_kinds() {
    let frame = Frame::from_typed_columns(vec![
        ("k", Column::int32(Vec::new())),
        ("v", Column::float64(Vec::new())),
    ])
    .unwrap();
    let out = frame
        .group_by(&["k"])
        .unwrap()
        .apply(|group| vec![("n".to_string(), Value::Int(group.row_count() as i32))])
        .unwrap();
    assert_eq!(out.row_count(), 0);
    assert_eq!(out.column_names(), &["k"]);
    assert_eq!(out.kinds(), vec![ColumnKind::Int32]);
}

#[test]
fn apply_keeps_key_kinds_alongside_returned_fields() {
    let frame = Frame::from_typed_columns(vec![
        ("k", Column::float64(vec![1.0, 1.0, 2.0])),
        ("v", Column::int32(vec![1, 2, 3])),
    ])
    .unwrap();
    let out = frame
        .group_by(&["k"])
        .unwrap()
        .apply(|group| vec![("rows".to_string(), Value::Int(group.row_count() as i32))])
        .unwrap();
    assert_eq!(out.kinds(), vec![ColumnKind::Float64, ColumnKind::Int32]);
    assert_eq!(column(&out, "k"), vec![Value::Float(1.0), Value::Float(2.0)]);
}
