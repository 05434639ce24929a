#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;
use tabula_columnar::{Frame, Value};
use tabula_expr::{parse, Dialect, FrameExprExt};

/// Keep the harness itself bounded; queries are short in practice.
const MAX_INPUT_BYTES: usize = 4_096;

fn frame() -> &'static Frame {
    static FRAME: OnceLock<Frame> = OnceLock::new();
    FRAME.get_or_init(|| {
        Frame::from_columns(vec![
            ("id", vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
            (
                "dept",
                vec![Value::from("IT"), Value::Null, Value::from("HR")],
            ),
            (
                "score",
                vec![Value::Float(1.5), Value::Float(f64::NAN), Value::Int(-7)],
            ),
        ])
        .unwrap_or_default()
    })
}

fuzz_target!(|data: &[u8]| {
    let data = &data[..data.len().min(MAX_INPUT_BYTES)];
    let input = String::from_utf8_lossy(data);

    let parsed = parse(&input, Dialect::Sql, &[]);
    let filtered = frame().query(&input);
    // Compilation only adds column binding and literal-pattern checks on top of parsing.
    if parsed.is_err() {
        assert!(filtered.is_err());
    }
    if let Ok(out) = filtered {
        assert!(out.row_count() <= frame().row_count());
    }
});
