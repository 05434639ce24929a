#![forbid(unsafe_code)]

use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::row::{Row, Rows, Schema};
use crate::types::{ColumnKind, Value};
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// An immutable columnar table.
///
/// Invariants:
/// - every column holds exactly `row_count()` values;
/// - column names are unique;
/// - column order is significant and preserved by every operation.
///
/// Columns are reference counted, so projections share storage with their source; nothing ever
/// mutates a column after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    schema: Arc<Schema>,
    columns: Vec<Arc<Column>>,
    rows: usize,
}

impl Default for Frame {
    fn default() -> Self {
        Self::empty()
    }
}

impl Frame {
    /// Default row count for [`Frame::head_default`] / [`Frame::tail_default`].
    pub const DEFAULT_PREVIEW_ROWS: usize = 5;

    pub fn empty() -> Self {
        Self {
            schema: Arc::new(Schema::default()),
            columns: Vec::new(),
            rows: 0,
        }
    }

    /// Build a frame from row mappings.
    ///
    /// Column names are the union of keys in first-seen order; keys missing from a row read
    /// back as [`Value::Null`]. Each column's kind is inferred from its observed values (see
    /// [`Column::from_values`]).
    pub fn from_rows<I, R, K>(rows: I) -> FrameResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut columns: Vec<Vec<Value>> = Vec::new();
        let mut row_count = 0usize;

        for row in rows {
            for (key, value) in row {
                let key = key.into();
                let pos = match positions.get(&key) {
                    Some(&pos) => pos,
                    None => {
                        let pos = names.len();
                        positions.insert(key.clone(), pos);
                        names.push(key);
                        columns.push(vec![Value::Null; row_count]);
                        pos
                    }
                };
                let column = &mut columns[pos];
                if column.len() > row_count {
                    // Repeated key within one row: the last value wins.
                    column[row_count] = value;
                } else {
                    column.push(value);
                }
            }
            row_count += 1;
            for column in &mut columns {
                if column.len() < row_count {
                    column.push(Value::Null);
                }
            }
        }

        let columns = columns.into_iter().map(Column::from_values).collect();
        Self::assemble(names, columns, row_count)
    }

    /// Build a frame from named value sequences, inferring each column's kind.
    pub fn from_columns<K: Into<String>>(columns: Vec<(K, Vec<Value>)>) -> FrameResult<Self> {
        let columns = columns
            .into_iter()
            .map(|(name, values)| (name, Column::from_values(values)))
            .collect();
        Self::from_typed_columns(columns)
    }

    /// Build a frame from pre-built columns; the caller chooses each kind.
    pub fn from_typed_columns<K: Into<String>>(columns: Vec<(K, Column)>) -> FrameResult<Self> {
        let (names, columns): (Vec<String>, Vec<Column>) = columns
            .into_iter()
            .map(|(name, column)| (name.into(), column))
            .unzip();
        let rows = columns.first().map(Column::len).unwrap_or(0);
        for (name, column) in names.iter().zip(&columns) {
            if column.len() != rows {
                return Err(FrameError::InconsistentColumnLength {
                    column: name.clone(),
                    expected: rows,
                    actual: column.len(),
                });
            }
        }
        Self::assemble(names, columns, rows)
    }

    /// Build a frame from positional rows (array-of-arrays) under the given column names.
    pub fn from_arrays<K: Into<String>>(names: Vec<K>, rows: Vec<Vec<Value>>) -> FrameResult<Self> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut columns: Vec<Vec<Value>> = names
            .iter()
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != names.len() {
                return Err(FrameError::InconsistentColumnLength {
                    column: format!("<row {idx}>"),
                    expected: names.len(),
                    actual: row.len(),
                });
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }
        Self::from_columns(names.into_iter().zip(columns).collect())
    }

    fn assemble(names: Vec<String>, columns: Vec<Column>, rows: usize) -> FrameResult<Self> {
        let schema = Schema::new(names)?;
        Ok(Self {
            schema: Arc::new(schema),
            columns: columns.into_iter().map(Arc::new).collect(),
            rows,
        })
    }

    /// Re-wrap already validated parts. Shares the column storage.
    pub(crate) fn from_parts(
        schema: Arc<Schema>,
        columns: Vec<Arc<Column>>,
        rows: usize,
    ) -> Self {
        debug_assert_eq!(schema.len(), columns.len());
        debug_assert!(columns.iter().all(|c| c.len() == rows));
        Self {
            schema,
            columns,
            rows,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn schema_arc(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn column_names(&self) -> &[String] {
        self.schema.names()
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, name: &str) -> FrameResult<&Column> {
        let idx = self.schema.require(name)?;
        Ok(&self.columns[idx])
    }

    pub fn column_at(&self, position: usize) -> Option<&Column> {
        self.columns.get(position).map(Arc::as_ref)
    }

    pub(crate) fn columns(&self) -> &[Arc<Column>] {
        &self.columns
    }

    pub fn kinds(&self) -> Vec<ColumnKind> {
        self.columns.iter().map(|c| c.kind()).collect()
    }

    /// Lazy rows in index order. Each call starts a new pass.
    pub fn rows(&self) -> Rows<'_> {
        Rows::new(self)
    }

    pub(crate) fn row_unchecked(&self, index: usize) -> Row {
        let values = self.columns.iter().map(|c| c.value(index)).collect();
        Row::new(Arc::clone(&self.schema), values)
    }

    /// Keep only `names`, in the order given.
    pub fn project<S: AsRef<str>>(&self, names: &[S]) -> FrameResult<Frame> {
        let positions = names
            .iter()
            .map(|name| self.schema.require(name.as_ref()))
            .collect::<FrameResult<Vec<_>>>()?;
        self.project_positions(&positions)
    }

    /// Drop `names`, keeping the remaining columns in their original order.
    pub fn exclude<S: AsRef<str>>(&self, names: &[S]) -> FrameResult<Frame> {
        let mut dropped = vec![false; self.columns.len()];
        for name in names {
            dropped[self.schema.require(name.as_ref())?] = true;
        }
        let keep: Vec<usize> = (0..self.columns.len()).filter(|&i| !dropped[i]).collect();
        self.project_positions(&keep)
    }

    /// Keep the columns whose name matches the regular expression `pattern`.
    ///
    /// No match is not an error: the result simply has zero columns.
    pub fn project_by_pattern(&self, pattern: &str) -> FrameResult<Frame> {
        let re = Regex::new(pattern).map_err(|err| {
            FrameError::InvalidArgument(format!("invalid column pattern {pattern:?}: {err}"))
        })?;
        self.project_matching(|name| re.is_match(name))
    }

    /// Keep the columns whose name satisfies `keep`.
    pub fn project_matching(&self, keep: impl Fn(&str) -> bool) -> FrameResult<Frame> {
        let positions: Vec<usize> = self
            .schema
            .names()
            .iter()
            .enumerate()
            .filter(|(_, name)| keep(name))
            .map(|(idx, _)| idx)
            .collect();
        self.project_positions(&positions)
    }

    pub(crate) fn project_positions(&self, positions: &[usize]) -> FrameResult<Frame> {
        let names = positions
            .iter()
            .map(|&idx| self.schema.names()[idx].clone())
            .collect();
        let schema = Schema::new(names)?;
        let columns = positions
            .iter()
            .map(|&idx| Arc::clone(&self.columns[idx]))
            .collect();
        Ok(Frame::from_parts(Arc::new(schema), columns, self.rows))
    }
}
