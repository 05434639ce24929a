#![forbid(unsafe_code)]

use crate::bitmap::BitVec;
use crate::error::{FrameError, FrameResult};
use crate::types::{ColumnKind, Value};
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
enum ColumnData {
    Bool(Vec<bool>),
    Int32(Vec<i32>),
    Float64(Vec<f64>),
    Text(Vec<Arc<str>>),
    Date(Vec<NaiveDate>),
    Mixed(Vec<Value>),
}

/// A dense, kind-tagged column.
///
/// Packed kinds carry an optional validity bitmap; a cleared bit reads back as [`Value::Null`].
/// `Mixed` columns store nulls inline and never have a bitmap.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    data: ColumnData,
    validity: Option<BitVec>,
}

impl Column {
    pub fn bool(values: Vec<bool>) -> Self {
        Self::packed(ColumnData::Bool(values))
    }

    pub fn int32(values: Vec<i32>) -> Self {
        Self::packed(ColumnData::Int32(values))
    }

    pub fn float64(values: Vec<f64>) -> Self {
        Self::packed(ColumnData::Float64(values))
    }

    pub fn text<S: Into<Arc<str>>>(values: Vec<S>) -> Self {
        Self::packed(ColumnData::Text(values.into_iter().map(Into::into).collect()))
    }

    pub fn date(values: Vec<NaiveDate>) -> Self {
        Self::packed(ColumnData::Date(values))
    }

    pub fn mixed(values: Vec<Value>) -> Self {
        Self::packed(ColumnData::Mixed(values))
    }

    fn packed(data: ColumnData) -> Self {
        Self {
            data,
            validity: None,
        }
    }

    /// Build a column from loose values, inferring the kind from the non-null values.
    ///
    /// A single observed kind yields a packed column (nulls tracked in the validity bitmap);
    /// several kinds, lists, or no non-null values at all yield a `Mixed` column.
    pub fn from_values(values: Vec<Value>) -> Self {
        let mut observed: Option<ColumnKind> = None;
        let mut uniform = true;
        for value in &values {
            let Some(kind) = value.kind() else {
                continue;
            };
            match observed {
                None => observed = Some(kind),
                Some(prev) if prev != kind => {
                    uniform = false;
                    break;
                }
                Some(_) => {}
            }
        }

        match observed {
            Some(kind) if uniform && kind != ColumnKind::Mixed => {
                // Every non-null value has `kind`, so conversion cannot fail.
                Self::with_kind(kind, values).unwrap_or_else(|_| {
                    debug_assert!(false, "uniform values failed to pack as {kind}");
                    Column::mixed(Vec::new())
                })
            }
            _ => Column::mixed(values),
        }
    }

    /// Build a column of an explicit kind.
    ///
    /// `Int` values widen into `Float64` columns; every other mismatch is a
    /// [`FrameError::TypeMismatch`] (no silent narrowing).
    pub fn with_kind(kind: ColumnKind, values: Vec<Value>) -> FrameResult<Self> {
        let mut builder = ColumnBuilder::new(kind, values.len());
        for value in values {
            builder.push(value)?;
        }
        Ok(builder.finish())
    }

    pub fn kind(&self) -> ColumnKind {
        match &self.data {
            ColumnData::Bool(_) => ColumnKind::Bool,
            ColumnData::Int32(_) => ColumnKind::Int32,
            ColumnData::Float64(_) => ColumnKind::Float64,
            ColumnData::Text(_) => ColumnKind::Text,
            ColumnData::Date(_) => ColumnKind::Date,
            ColumnData::Mixed(_) => ColumnKind::Mixed,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Bool(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Date(v) => v.len(),
            ColumnData::Mixed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match (&self.data, &self.validity) {
            (ColumnData::Mixed(values), _) => values.iter().filter(|v| v.is_null()).count(),
            (_, Some(validity)) => validity.len() - validity.count_ones(),
            (_, None) => 0,
        }
    }

    pub fn get(&self, index: usize) -> FrameResult<Value> {
        if index >= self.len() {
            return Err(FrameError::out_of_range(index, self.len()));
        }
        Ok(self.value(index))
    }

    /// Read a value at a position already validated against `len()`.
    pub(crate) fn value(&self, index: usize) -> Value {
        if self.validity.as_ref().is_some_and(|v| !v.get(index)) {
            return Value::Null;
        }
        match &self.data {
            ColumnData::Bool(v) => Value::Bool(v[index]),
            ColumnData::Int32(v) => Value::Int(v[index]),
            ColumnData::Float64(v) => Value::Float(v[index]),
            ColumnData::Text(v) => Value::Text(v[index].clone()),
            ColumnData::Date(v) => Value::Date(v[index]),
            ColumnData::Mixed(v) => v[index].clone(),
        }
    }

    /// Build a new column of the same kind with `out[i] = self[indices[i]]`.
    ///
    /// Indices may repeat or reorder. The result keeps this column's kind even when `indices`
    /// is empty.
    pub fn gather(&self, indices: &[usize]) -> FrameResult<Column> {
        let len = self.len();
        if let Some(&bad) = indices.iter().find(|&&idx| idx >= len) {
            return Err(FrameError::out_of_range(bad, len));
        }
        Ok(self.gather_unchecked(indices))
    }

    pub(crate) fn gather_unchecked(&self, indices: &[usize]) -> Column {
        fn pick<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&idx| values[idx].clone()).collect()
        }

        let data = match &self.data {
            ColumnData::Bool(v) => ColumnData::Bool(pick(v, indices)),
            ColumnData::Int32(v) => ColumnData::Int32(pick(v, indices)),
            ColumnData::Float64(v) => ColumnData::Float64(pick(v, indices)),
            ColumnData::Text(v) => ColumnData::Text(pick(v, indices)),
            ColumnData::Date(v) => ColumnData::Date(pick(v, indices)),
            ColumnData::Mixed(v) => ColumnData::Mixed(pick(v, indices)),
        };
        let validity = self
            .validity
            .as_ref()
            .map(|v| v.gather(indices))
            .filter(|v| !v.all_true());
        Column { data, validity }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Value> + '_ {
        (0..self.len()).map(move |idx| self.value(idx))
    }

    /// Copy the column out as loose values (the export path for writers).
    pub fn materialize(&self) -> Vec<Value> {
        self.iter().collect()
    }
}

enum ColumnBuilder {
    Bool(Vec<bool>, BitVec),
    Int32(Vec<i32>, BitVec),
    Float64(Vec<f64>, BitVec),
    Text(Vec<Arc<str>>, BitVec),
    Date(Vec<NaiveDate>, BitVec),
    Mixed(Vec<Value>),
}

impl ColumnBuilder {
    fn new(kind: ColumnKind, capacity: usize) -> Self {
        let validity = BitVec::with_capacity_bits(capacity);
        match kind {
            ColumnKind::Bool => ColumnBuilder::Bool(Vec::with_capacity(capacity), validity),
            ColumnKind::Int32 => ColumnBuilder::Int32(Vec::with_capacity(capacity), validity),
            ColumnKind::Float64 => ColumnBuilder::Float64(Vec::with_capacity(capacity), validity),
            ColumnKind::Text => ColumnBuilder::Text(Vec::with_capacity(capacity), validity),
            ColumnKind::Date => ColumnBuilder::Date(Vec::with_capacity(capacity), validity),
            ColumnKind::Mixed => ColumnBuilder::Mixed(Vec::with_capacity(capacity)),
        }
    }

    fn kind(&self) -> ColumnKind {
        match self {
            ColumnBuilder::Bool(..) => ColumnKind::Bool,
            ColumnBuilder::Int32(..) => ColumnKind::Int32,
            ColumnBuilder::Float64(..) => ColumnKind::Float64,
            ColumnBuilder::Text(..) => ColumnKind::Text,
            ColumnBuilder::Date(..) => ColumnKind::Date,
            ColumnBuilder::Mixed(_) => ColumnKind::Mixed,
        }
    }

    fn push(&mut self, value: Value) -> FrameResult<()> {
        let kind = self.kind();
        let mismatch = |value: &Value| {
            FrameError::TypeMismatch(format!(
                "cannot store {} value {value} in a {kind} column",
                value.type_name()
            ))
        };

        match (self, value) {
            (ColumnBuilder::Mixed(values), value) => values.push(value),
            (ColumnBuilder::Bool(values, validity), Value::Null) => {
                values.push(false);
                validity.push(false);
            }
            (ColumnBuilder::Int32(values, validity), Value::Null) => {
                values.push(0);
                validity.push(false);
            }
            (ColumnBuilder::Float64(values, validity), Value::Null) => {
                values.push(0.0);
                validity.push(false);
            }
            (ColumnBuilder::Text(values, validity), Value::Null) => {
                values.push(Arc::from(""));
                validity.push(false);
            }
            (ColumnBuilder::Date(values, validity), Value::Null) => {
                values.push(NaiveDate::MIN);
                validity.push(false);
            }
            (ColumnBuilder::Bool(values, validity), Value::Bool(v)) => {
                values.push(v);
                validity.push(true);
            }
            (ColumnBuilder::Int32(values, validity), Value::Int(v)) => {
                values.push(v);
                validity.push(true);
            }
            (ColumnBuilder::Float64(values, validity), Value::Float(v)) => {
                values.push(v);
                validity.push(true);
            }
            (ColumnBuilder::Float64(values, validity), Value::Int(v)) => {
                values.push(f64::from(v));
                validity.push(true);
            }
            (ColumnBuilder::Text(values, validity), Value::Text(v)) => {
                values.push(v);
                validity.push(true);
            }
            (ColumnBuilder::Date(values, validity), Value::Date(v)) => {
                values.push(v);
                validity.push(true);
            }
            (_, other) => return Err(mismatch(&other)),
        }
        Ok(())
    }

    fn finish(self) -> Column {
        fn validity(bits: BitVec) -> Option<BitVec> {
            (!bits.all_true()).then_some(bits)
        }

        match self {
            ColumnBuilder::Bool(v, bits) => Column {
                data: ColumnData::Bool(v),
                validity: validity(bits),
            },
            ColumnBuilder::Int32(v, bits) => Column {
                data: ColumnData::Int32(v),
                validity: validity(bits),
            },
            ColumnBuilder::Float64(v, bits) => Column {
                data: ColumnData::Float64(v),
                validity: validity(bits),
            },
            ColumnBuilder::Text(v, bits) => Column {
                data: ColumnData::Text(v),
                validity: validity(bits),
            },
            ColumnBuilder::Date(v, bits) => Column {
                data: ColumnData::Date(v),
                validity: validity(bits),
            },
            ColumnBuilder::Mixed(v) => Column::mixed(v),
        }
    }
}
