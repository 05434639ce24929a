use tabula_columnar::{Frame, FrameResult, Value};

use crate::compile::{compile_expr, compile_query};

/// String-predicate filtering for [`Frame`].
///
/// Each method compiles once against the frame's schema, then evaluates row by row. A row whose
/// evaluation fails (absent field, incomparable operands, ...) is excluded rather than failing
/// the whole call; only malformed input is reported as an error.
pub trait FrameExprExt {
    /// Filter with a SQL-like condition, e.g. `"dept IN ('IT', 'HR') AND salary > 100"`.
    fn query(&self, query: &str) -> FrameResult<Frame>;

    /// Filter with an expression template, substituting `values` for `{}` placeholders.
    ///
    /// ```
    /// use tabula_columnar::{Frame, Value};
    /// use tabula_expr::FrameExprExt;
    ///
    /// let frame = Frame::from_columns(vec![
    ///     ("city", vec![Value::from("New York"), Value::from("San Francisco")]),
    /// ])
    /// .unwrap();
    /// let out = frame.expr("city_includes({})", &[Value::from("Fran")]).unwrap();
    /// assert_eq!(out.row_count(), 1);
    /// ```
    fn expr(&self, template: &str, values: &[Value]) -> FrameResult<Frame>;

    /// [`FrameExprExt::expr`] without placeholders.
    fn filter_expr(&self, expression: &str) -> FrameResult<Frame> {
        self.expr(expression, &[])
    }
}

impl FrameExprExt for Frame {
    fn query(&self, query: &str) -> FrameResult<Frame> {
        let predicate = compile_query(query, self.schema())?;
        Ok(self.filter_fallible(|row| predicate.test(row)))
    }

    fn expr(&self, template: &str, values: &[Value]) -> FrameResult<Frame> {
        let predicate = compile_expr(template, values, self.schema())?;
        Ok(self.filter_fallible(|row| predicate.test(row)))
    }
}
