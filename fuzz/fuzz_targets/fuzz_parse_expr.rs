#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;
use tabula_columnar::{Frame, Value};
use tabula_expr::{parse, Dialect, FrameExprExt};

const MAX_INPUT_BYTES: usize = 4_096;

fn frame() -> &'static Frame {
    static FRAME: OnceLock<Frame> = OnceLock::new();
    FRAME.get_or_init(|| {
        Frame::from_columns(vec![
            ("age", vec![Value::Int(i32::MAX), Value::Int(0), Value::Null]),
            (
                "city",
                vec![Value::from("San Francisco"), Value::from(""), Value::Int(4)],
            ),
        ])
        .unwrap_or_default()
    })
}

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let rest = &rest[..rest.len().min(MAX_INPUT_BYTES)];
    let template = String::from_utf8_lossy(rest);

    // Vary the placeholder values so substitution paths see every value shape.
    let values: Vec<Value> = (0..selector % 4)
        .map(|i| match (selector >> 2).wrapping_add(i) % 5 {
            0 => Value::Int(i32::from(selector)),
            1 => Value::Float(f64::from(selector) / 3.0),
            2 => Value::from("Fran"),
            3 => Value::Null,
            _ => Value::List(vec![Value::Int(0), Value::from("x")]),
        })
        .collect();

    let _ = parse(&template, Dialect::Expr, &values);
    if let Ok(out) = frame().expr(&template, &values) {
        assert!(out.row_count() <= frame().row_count());
    }
});
