#![forbid(unsafe_code)]

//! Positional (`iloc`, `at`, `head`, `tail`) and label (`loc`) selectors.
//!
//! Rows are labelled by their default integer index, so a `loc` row label is a plain position
//! without negative wraparound.

use crate::bitmap::BitVec;
use crate::error::{FrameError, FrameResult};
use crate::frame::Frame;
use crate::row::Row;
use crate::types::Value;
use std::fmt;
use std::ops::Range;

/// Row or column selector for [`Frame::iloc`].
///
/// Negative `Single`/`Many` positions count from the end. Ranges are clamped to the axis
/// length, like slicing.
pub enum PosSelector<'a> {
    Single(i64),
    Many(Vec<i64>),
    Range(Range<usize>),
    Predicate(Box<dyn Fn(usize) -> bool + 'a>),
}

impl fmt::Debug for PosSelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PosSelector::Single(pos) => f.debug_tuple("Single").field(pos).finish(),
            PosSelector::Many(pos) => f.debug_tuple("Many").field(pos).finish(),
            PosSelector::Range(range) => f.debug_tuple("Range").field(range).finish(),
            PosSelector::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<i64> for PosSelector<'_> {
    fn from(pos: i64) -> Self {
        PosSelector::Single(pos)
    }
}

impl From<Vec<i64>> for PosSelector<'_> {
    fn from(pos: Vec<i64>) -> Self {
        PosSelector::Many(pos)
    }
}

impl From<&[i64]> for PosSelector<'_> {
    fn from(pos: &[i64]) -> Self {
        PosSelector::Many(pos.to_vec())
    }
}

impl From<Range<usize>> for PosSelector<'_> {
    fn from(range: Range<usize>) -> Self {
        PosSelector::Range(range)
    }
}

impl<'a> PosSelector<'a> {
    pub fn predicate(keep: impl Fn(usize) -> bool + 'a) -> Self {
        PosSelector::Predicate(Box::new(keep))
    }

    fn is_single(&self) -> bool {
        matches!(self, PosSelector::Single(_))
    }

    fn resolve(&self, len: usize) -> FrameResult<Vec<usize>> {
        match self {
            PosSelector::Single(pos) => Ok(vec![resolve_signed(*pos, len)?]),
            PosSelector::Many(positions) => positions
                .iter()
                .map(|&pos| resolve_signed(pos, len))
                .collect(),
            PosSelector::Range(range) => {
                let end = range.end.min(len);
                Ok((range.start.min(end)..end).collect())
            }
            PosSelector::Predicate(keep) => Ok((0..len).filter(|&pos| keep(pos)).collect()),
        }
    }
}

fn resolve_signed(pos: i64, len: usize) -> FrameResult<usize> {
    let resolved = if pos < 0 {
        i64::try_from(len).ok().and_then(|len| len.checked_add(pos))
    } else {
        Some(pos)
    };
    resolved
        .and_then(|p| usize::try_from(p).ok())
        .filter(|&p| p < len)
        .ok_or_else(|| FrameError::out_of_range(pos, len))
}

/// Row selector for [`Frame::loc`].
pub enum LocRows<'a> {
    Label(usize),
    Labels(Vec<usize>),
    Range(Range<usize>),
    Predicate(Box<dyn Fn(&Row) -> bool + 'a>),
    /// Rows where every listed column equals the given value.
    Conditions(Vec<(String, Value)>),
}

impl fmt::Debug for LocRows<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocRows::Label(label) => f.debug_tuple("Label").field(label).finish(),
            LocRows::Labels(labels) => f.debug_tuple("Labels").field(labels).finish(),
            LocRows::Range(range) => f.debug_tuple("Range").field(range).finish(),
            LocRows::Predicate(_) => f.write_str("Predicate(..)"),
            LocRows::Conditions(conds) => f.debug_tuple("Conditions").field(conds).finish(),
        }
    }
}

impl From<usize> for LocRows<'_> {
    fn from(label: usize) -> Self {
        LocRows::Label(label)
    }
}

impl From<Vec<usize>> for LocRows<'_> {
    fn from(labels: Vec<usize>) -> Self {
        LocRows::Labels(labels)
    }
}

impl From<Range<usize>> for LocRows<'_> {
    fn from(range: Range<usize>) -> Self {
        LocRows::Range(range)
    }
}

impl<'a> LocRows<'a> {
    pub fn predicate(keep: impl Fn(&Row) -> bool + 'a) -> Self {
        LocRows::Predicate(Box::new(keep))
    }

    pub fn conditions<K, V, I>(conditions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        LocRows::Conditions(
            conditions
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Column selector for [`Frame::loc`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LocCols {
    Name(String),
    Names(Vec<String>),
}

impl From<&str> for LocCols {
    fn from(name: &str) -> Self {
        LocCols::Name(name.to_string())
    }
}

impl From<Vec<&str>> for LocCols {
    fn from(names: Vec<&str>) -> Self {
        LocCols::Names(names.into_iter().map(str::to_string).collect())
    }
}

/// Result of `iloc`/`loc`: single selectors collapse to a row or a scalar.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    Frame(Frame),
    Row(Row),
    Scalar(Value),
}

impl Selection {
    pub fn into_frame(self) -> Option<Frame> {
        match self {
            Selection::Frame(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn into_row(self) -> Option<Row> {
        match self {
            Selection::Row(row) => Some(row),
            _ => None,
        }
    }

    pub fn into_scalar(self) -> Option<Value> {
        match self {
            Selection::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

impl Frame {
    /// The row at `index`. Unlike [`Frame::iloc`], negative indices are rejected.
    pub fn at(&self, index: i64) -> FrameResult<Row> {
        match usize::try_from(index) {
            Ok(idx) if idx < self.row_count() => Ok(self.row_unchecked(idx)),
            _ => Err(FrameError::out_of_range(index, self.row_count())),
        }
    }

    /// The first `n` rows; `n` past the end is clamped.
    pub fn head(&self, n: usize) -> FrameResult<Frame> {
        let n = preview_len(n, self.row_count())?;
        self.select_rows(&(0..n).collect::<Vec<_>>())
    }

    /// The last `n` rows; `n` past the end is clamped.
    pub fn tail(&self, n: usize) -> FrameResult<Frame> {
        let n = preview_len(n, self.row_count())?;
        let start = self.row_count() - n;
        self.select_rows(&(start..self.row_count()).collect::<Vec<_>>())
    }

    pub fn head_default(&self) -> Frame {
        self.select_rows_unchecked(
            &(0..Self::DEFAULT_PREVIEW_ROWS.min(self.row_count())).collect::<Vec<_>>(),
        )
    }

    pub fn tail_default(&self) -> Frame {
        let start = self.row_count().saturating_sub(Self::DEFAULT_PREVIEW_ROWS);
        self.select_rows_unchecked(&(start..self.row_count()).collect::<Vec<_>>())
    }

    /// Select by position.
    ///
    /// A single-integer row selector collapses the result to a [`Selection::Row`], or to a
    /// [`Selection::Scalar`] when the column selector is also a single integer. Everything else
    /// yields a [`Selection::Frame`].
    pub fn iloc<'a>(
        &self,
        rows: impl Into<PosSelector<'a>>,
        cols: Option<PosSelector<'_>>,
    ) -> FrameResult<Selection> {
        let rows = rows.into();
        let row_idx = rows.resolve(self.row_count())?;
        let col_idx = match &cols {
            Some(cols) => cols.resolve(self.column_count())?,
            None => (0..self.column_count()).collect(),
        };

        let single_row = rows.is_single();
        match (single_row, &cols) {
            (true, None) => Ok(Selection::Row(self.row_unchecked(row_idx[0]))),
            (true, Some(cols)) if cols.is_single() => {
                Ok(Selection::Scalar(self.columns()[col_idx[0]].value(row_idx[0])))
            }
            _ => {
                let projected = if cols.is_some() {
                    self.project_positions(&col_idx)?
                } else {
                    self.clone()
                };
                Ok(Selection::Frame(projected.select_rows(&row_idx)?))
            }
        }
    }

    /// Select by row label (or equality conditions / row predicate) and column name.
    pub fn loc<'a>(
        &self,
        rows: impl Into<LocRows<'a>>,
        cols: Option<LocCols>,
    ) -> FrameResult<Selection> {
        let rows = rows.into();
        let col_idx = match &cols {
            Some(LocCols::Name(name)) => vec![self.schema().require(name)?],
            Some(LocCols::Names(names)) => names
                .iter()
                .map(|name| self.schema().require(name))
                .collect::<FrameResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        let row_idx: Vec<usize> = match &rows {
            LocRows::Label(label) => {
                if *label >= self.row_count() {
                    return Err(FrameError::out_of_range(*label, self.row_count()));
                }
                vec![*label]
            }
            LocRows::Labels(labels) => {
                if let Some(&bad) = labels.iter().find(|&&l| l >= self.row_count()) {
                    return Err(FrameError::out_of_range(bad, self.row_count()));
                }
                labels.clone()
            }
            LocRows::Range(range) => {
                let end = range.end.min(self.row_count());
                (range.start.min(end)..end).collect()
            }
            LocRows::Predicate(keep) => self.predicate_mask(keep).iter_ones().collect(),
            LocRows::Conditions(conditions) => self.conditions_mask(conditions)?.iter_ones().collect(),
        };

        match (&rows, &cols) {
            (LocRows::Label(_), None) => Ok(Selection::Row(self.row_unchecked(row_idx[0]))),
            (LocRows::Label(_), Some(LocCols::Name(_))) => {
                Ok(Selection::Scalar(self.columns()[col_idx[0]].value(row_idx[0])))
            }
            (_, None) => Ok(Selection::Frame(self.select_rows(&row_idx)?)),
            (_, Some(_)) => Ok(Selection::Frame(
                self.project_positions(&col_idx)?.select_rows(&row_idx)?,
            )),
        }
    }

    fn conditions_mask(&self, conditions: &[(String, Value)]) -> FrameResult<BitVec> {
        let mut mask = BitVec::with_len_all_true(self.row_count());
        for (name, expected) in conditions {
            let column = self.column(name)?;
            let matches: BitVec = column.iter().map(|v| v.loose_eq(expected)).collect();
            mask.and_inplace(&matches);
        }
        Ok(mask)
    }
}

fn preview_len(n: usize, rows: usize) -> FrameResult<usize> {
    if n == 0 {
        return Err(FrameError::InvalidArgument(
            "row count must be a positive integer".to_string(),
        ));
    }
    Ok(n.min(rows))
}
