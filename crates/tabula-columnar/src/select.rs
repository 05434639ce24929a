#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::frame::Frame;
use crate::row::Row;
use crate::types::{compare_values, Value};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Operator accepted by [`Frame::filter_where`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WhereOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Contains,
    StartsWith,
    EndsWith,
    Match,
}

impl FromStr for WhereOp {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "==" | "===" => WhereOp::Eq,
            "!=" | "!==" => WhereOp::Ne,
            ">" => WhereOp::Gt,
            ">=" => WhereOp::Gte,
            "<" => WhereOp::Lt,
            "<=" => WhereOp::Lte,
            "in" => WhereOp::In,
            "contains" => WhereOp::Contains,
            "startsWith" => WhereOp::StartsWith,
            "endsWith" => WhereOp::EndsWith,
            "match" => WhereOp::Match,
            other => return Err(FrameError::UnsupportedOperator(other.to_string())),
        })
    }
}

impl fmt::Display for WhereOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WhereOp::Eq => "==",
            WhereOp::Ne => "!=",
            WhereOp::Gt => ">",
            WhereOp::Gte => ">=",
            WhereOp::Lt => "<",
            WhereOp::Lte => "<=",
            WhereOp::In => "in",
            WhereOp::Contains => "contains",
            WhereOp::StartsWith => "startsWith",
            WhereOp::EndsWith => "endsWith",
            WhereOp::Match => "match",
        })
    }
}

/// A `WhereOp` bound to its operand, validated before any row is visited.
enum CellTest {
    Compare(WhereOp, Value),
    Member(Vec<Value>),
    Text(WhereOp, String),
    Pattern(Regex),
}

impl CellTest {
    fn new(op: WhereOp, value: Value) -> FrameResult<Self> {
        match op {
            WhereOp::Eq | WhereOp::Ne | WhereOp::Gt | WhereOp::Gte | WhereOp::Lt | WhereOp::Lte => {
                Ok(CellTest::Compare(op, value))
            }
            WhereOp::In => match value {
                Value::List(items) => Ok(CellTest::Member(items)),
                other => Err(FrameError::InvalidArgument(format!(
                    "`in` expects a list of values, got {}",
                    other.type_name()
                ))),
            },
            WhereOp::Contains | WhereOp::StartsWith | WhereOp::EndsWith => {
                if value.is_null() {
                    return Err(FrameError::InvalidArgument(format!(
                        "`{op}` expects a text operand, got null"
                    )));
                }
                Ok(CellTest::Text(op, value.to_string()))
            }
            WhereOp::Match => {
                let Value::Text(pattern) = &value else {
                    return Err(FrameError::InvalidArgument(format!(
                        "`match` expects a text pattern, got {}",
                        value.type_name()
                    )));
                };
                let re = Regex::new(pattern).map_err(|err| {
                    FrameError::InvalidArgument(format!("invalid pattern {pattern:?}: {err}"))
                })?;
                Ok(CellTest::Pattern(re))
            }
        }
    }

    fn matches(&self, cell: &Value) -> bool {
        match self {
            CellTest::Compare(WhereOp::Eq, value) => cell.loose_eq(value),
            CellTest::Compare(WhereOp::Ne, value) => !cell.loose_eq(value),
            CellTest::Compare(op, value) => {
                let Some(ord) = compare_values(cell, value) else {
                    return false;
                };
                match op {
                    WhereOp::Gt => ord == Ordering::Greater,
                    WhereOp::Gte => ord != Ordering::Less,
                    WhereOp::Lt => ord == Ordering::Less,
                    WhereOp::Lte => ord != Ordering::Greater,
                    _ => false,
                }
            }
            CellTest::Member(items) => items.iter().any(|item| cell.loose_eq(item)),
            CellTest::Text(op, needle) => {
                if cell.is_null() {
                    return false;
                }
                let haystack = cell.to_string();
                match op {
                    WhereOp::Contains => haystack.contains(needle.as_str()),
                    WhereOp::StartsWith => haystack.starts_with(needle.as_str()),
                    WhereOp::EndsWith => haystack.ends_with(needle.as_str()),
                    _ => false,
                }
            }
            CellTest::Pattern(re) => cell.as_text().is_some_and(|text| re.is_match(text)),
        }
    }
}

impl Frame {
    /// The selection kernel: gather every column at `indices`.
    ///
    /// `indices` may repeat or reorder rows. Column kinds are preserved, including when the
    /// result is empty. Every other row-selecting operation in this crate reduces to this call.
    pub fn select_rows(&self, indices: &[usize]) -> FrameResult<Frame> {
        if let Some(&bad) = indices.iter().find(|&&idx| idx >= self.row_count()) {
            return Err(FrameError::out_of_range(bad, self.row_count()));
        }
        let columns = self
            .columns()
            .iter()
            .map(|column| Arc::new(column.gather_unchecked(indices)))
            .collect();
        Ok(Frame::from_parts(
            Arc::clone(self.schema_arc()),
            columns,
            indices.len(),
        ))
    }

    /// Keep the rows whose bit is set in `mask`.
    pub fn select_mask(&self, mask: &BitVec) -> FrameResult<Frame> {
        if mask.len() != self.row_count() {
            return Err(FrameError::InvalidArgument(format!(
                "mask has {} entries, frame has {} rows",
                mask.len(),
                self.row_count()
            )));
        }
        let indices: Vec<usize> = mask.iter_ones().collect();
        self.select_rows(&indices)
    }

    /// Evaluate `predicate` against every row.
    pub fn predicate_mask(&self, predicate: impl Fn(&Row) -> bool) -> BitVec {
        self.rows().map(|row| predicate(&row)).collect()
    }

    /// Keep the rows for which `predicate` returns `true`.
    pub fn filter(&self, predicate: impl Fn(&Row) -> bool) -> Frame {
        let indices: Vec<usize> = self.predicate_mask(predicate).iter_ones().collect();
        self.select_rows_unchecked(&indices)
    }

    /// Like [`Frame::filter`], but a row whose predicate fails is excluded instead of aborting
    /// the whole operation.
    pub fn filter_fallible<E: fmt::Display>(
        &self,
        predicate: impl Fn(&Row) -> Result<bool, E>,
    ) -> Frame {
        let mut failures = 0usize;
        let mask: BitVec = self
            .rows()
            .enumerate()
            .map(|(idx, row)| match predicate(&row) {
                Ok(keep) => keep,
                Err(err) => {
                    log::trace!("row {idx} excluded: {err}");
                    failures += 1;
                    false
                }
            })
            .collect();
        if failures > 0 {
            log::debug!(
                "{failures} of {} rows excluded by predicate errors",
                self.row_count()
            );
        }
        let indices: Vec<usize> = mask.iter_ones().collect();
        self.select_rows_unchecked(&indices)
    }

    /// Filter on one column with an operator given by name (`"=="`, `">="`, `"in"`,
    /// `"contains"`, `"startsWith"`, `"endsWith"`, `"match"`, ...).
    pub fn filter_where(&self, column: &str, op: &str, value: impl Into<Value>) -> FrameResult<Frame> {
        let op: WhereOp = op.parse()?;
        self.filter_op(column, op, value)
    }

    pub fn filter_op(&self, column: &str, op: WhereOp, value: impl Into<Value>) -> FrameResult<Frame> {
        let column: &Column = self.column(column)?;
        let test = CellTest::new(op, value.into())?;
        let indices: Vec<usize> = column
            .iter()
            .enumerate()
            .filter(|(_, cell)| test.matches(cell))
            .map(|(idx, _)| idx)
            .collect();
        self.select_rows(&indices)
    }

    pub(crate) fn select_rows_unchecked(&self, indices: &[usize]) -> Frame {
        match self.select_rows(indices) {
            Ok(frame) => frame,
            Err(err) => {
                debug_assert!(false, "internal selection produced invalid indices: {err}");
                Frame::from_parts(
                    Arc::clone(self.schema_arc()),
                    self.columns()
                        .iter()
                        .map(|c| Arc::new(c.gather_unchecked(&[])))
                        .collect(),
                    0,
                )
            }
        }
    }
}
