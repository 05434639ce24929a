#![forbid(unsafe_code)]

use crate::error::{FrameError, FrameResult};
use crate::frame::Frame;
use crate::types::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Ordered, unique column names with a name → position lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Schema {
    pub fn new(names: Vec<String>) -> FrameResult<Self> {
        let mut positions = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if positions.insert(name.clone(), idx).is_some() {
                return Err(FrameError::InvalidArgument(format!(
                    "duplicate column name {name:?}"
                )));
            }
        }
        Ok(Self { names, positions })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub(crate) fn require(&self, name: &str) -> FrameResult<usize> {
        self.position(name)
            .ok_or_else(|| FrameError::UnknownColumn(name.to_string()))
    }
}

/// One materialized row: the frame's schema plus one value per column.
///
/// Rows are derived on demand for predicates and export; they are never the storage form.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(schema: Arc<Schema>, values: Vec<Value>) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self { schema, values }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(self.schema.position(name)?)
    }

    /// Fetch by column position; this is what compiled predicates use.
    pub fn value(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn to_pairs(&self) -> Vec<(String, Value)> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Row {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Lazy iterator over a frame's rows, in index order.
///
/// A clone continues from the same position; call [`Frame::rows`] again for a fresh pass.
#[derive(Clone, Debug)]
pub struct Rows<'a> {
    frame: &'a Frame,
    next: usize,
    end: usize,
}

impl<'a> Rows<'a> {
    pub(crate) fn new(frame: &'a Frame) -> Self {
        Self {
            frame,
            next: 0,
            end: frame.row_count(),
        }
    }
}

impl Iterator for Rows<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if self.next >= self.end {
            return None;
        }
        let row = self.frame.row_unchecked(self.next);
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for Rows<'_> {
    fn next_back(&mut self) -> Option<Row> {
        if self.next >= self.end {
            return None;
        }
        self.end -= 1;
        Some(self.frame.row_unchecked(self.end))
    }
}

impl ExactSizeIterator for Rows<'_> {}
