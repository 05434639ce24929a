#![forbid(unsafe_code)]

use crate::column::Column;
use crate::error::{FrameError, FrameResult};
use crate::frame::Frame;
use crate::types::{compare_values, ColumnKind, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Output of a [`GroupBy::apply`] callback: field name → value, in the order the fields should
/// appear.
pub type Record = Vec<(String, Value)>;

type Reducer = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

#[derive(Clone)]
pub enum Aggregator {
    Sum,
    Mean,
    Min,
    Max,
    Count,
    /// Receives the group's raw values, nulls included.
    Custom { name: String, reduce: Reducer },
}

impl Aggregator {
    pub fn custom(
        name: impl Into<String>,
        reduce: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        Aggregator::Custom {
            name: name.into(),
            reduce: Arc::new(reduce),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Aggregator::Sum => "sum",
            Aggregator::Mean => "mean",
            Aggregator::Min => "min",
            Aggregator::Max => "max",
            Aggregator::Count => "count",
            Aggregator::Custom { name, .. } => name,
        }
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregator::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for Aggregator {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Aggregator::Sum),
            "mean" | "avg" => Ok(Aggregator::Mean),
            "min" => Ok(Aggregator::Min),
            "max" => Ok(Aggregator::Max),
            "count" => Ok(Aggregator::Count),
            other => Err(FrameError::InvalidArgument(format!(
                "unknown aggregator {other:?}"
            ))),
        }
    }
}

/// One `(column, aggregator)` pair of an aggregation.
#[derive(Clone, Debug)]
pub struct AggSpec {
    pub column: String,
    pub aggregator: Aggregator,
}

impl AggSpec {
    pub fn new(column: impl Into<String>, aggregator: Aggregator) -> Self {
        Self {
            column: column.into(),
            aggregator,
        }
    }

    pub fn sum(column: impl Into<String>) -> Self {
        Self::new(column, Aggregator::Sum)
    }

    pub fn mean(column: impl Into<String>) -> Self {
        Self::new(column, Aggregator::Mean)
    }

    pub fn min(column: impl Into<String>) -> Self {
        Self::new(column, Aggregator::Min)
    }

    pub fn max(column: impl Into<String>) -> Self {
        Self::new(column, Aggregator::Max)
    }

    pub fn count(column: impl Into<String>) -> Self {
        Self::new(column, Aggregator::Count)
    }

    pub fn custom(
        column: impl Into<String>,
        name: impl Into<String>,
        reduce: impl Fn(&[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        Self::new(column, Aggregator::custom(name, reduce))
    }

    /// Build from an aggregator name such as `"sum"` or `"mean"`.
    pub fn parse(column: impl Into<String>, aggregator: &str) -> FrameResult<Self> {
        Ok(Self::new(column, aggregator.parse()?))
    }
}

/// Row indices of a frame partitioned by the values of one or more key columns.
///
/// Groups are kept in order of first occurrence. Per-group frames are only built on demand.
#[derive(Clone, Debug)]
pub struct GroupBy<'a> {
    frame: &'a Frame,
    key_columns: Vec<usize>,
    keys: Vec<Vec<Value>>,
    groups: Vec<Vec<usize>>,
}

impl Frame {
    pub fn group_by<S: AsRef<str>>(&self, by: &[S]) -> FrameResult<GroupBy<'_>> {
        if by.is_empty() {
            return Err(FrameError::InvalidArgument(
                "group_by needs at least one key column".to_string(),
            ));
        }
        let key_columns = by
            .iter()
            .map(|name| self.schema().require(name.as_ref()))
            .collect::<FrameResult<Vec<_>>>()?;

        let mut lookup: HashMap<Vec<Value>, usize> = HashMap::new();
        let mut keys: Vec<Vec<Value>> = Vec::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for row in 0..self.row_count() {
            let key: Vec<Value> = key_columns
                .iter()
                .map(|&col| self.columns()[col].value(row))
                .collect();
            match lookup.get(&key) {
                Some(&slot) => groups[slot].push(row),
                None => {
                    lookup.insert(key.clone(), groups.len());
                    keys.push(key);
                    groups.push(vec![row]);
                }
            }
        }
        log::debug!(
            "group_by {:?}: {} rows into {} groups",
            by.iter().map(|s| s.as_ref()).collect::<Vec<&str>>(),
            self.row_count(),
            groups.len()
        );

        Ok(GroupBy {
            frame: self,
            key_columns,
            keys,
            groups,
        })
    }
}

impl<'a> GroupBy<'a> {
    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> &[Vec<Value>] {
        &self.keys
    }

    /// Row indices of each group, aligned with [`GroupBy::keys`].
    pub fn indices(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// The sub-frame for `key`.
    pub fn get_group(&self, key: &[Value]) -> FrameResult<Frame> {
        let slot = self
            .keys
            .iter()
            .position(|k| k.as_slice() == key)
            .ok_or_else(|| FrameError::InvalidArgument(format!("no group with key {key:?}")))?;
        self.frame.select_rows(&self.groups[slot])
    }

    fn key_names(&self) -> Vec<String> {
        self.key_columns
            .iter()
            .map(|&col| self.frame.column_names()[col].clone())
            .collect()
    }

    /// Key columns gathered at each group's first row, so their kinds are preserved.
    fn key_output(&self) -> Vec<(String, Column)> {
        let firsts: Vec<usize> = self.groups.iter().map(|g| g[0]).collect();
        self.key_names()
            .into_iter()
            .zip(&self.key_columns)
            .map(|(name, &col)| (name, self.frame.columns()[col].gather_unchecked(&firsts)))
            .collect()
    }

    /// One output row per group: the key columns, then one column per spec.
    ///
    /// An output column is named after its source column when that column has a single spec,
    /// and `column_aggregator` when it has several (or when the plain name is a key column).
    pub fn aggregate(&self, specs: &[AggSpec]) -> FrameResult<Frame> {
        let sources = specs
            .iter()
            .map(|spec| self.frame.column(&spec.column))
            .collect::<FrameResult<Vec<_>>>()?;

        let key_names = self.key_names();
        let mut per_column: HashMap<&str, usize> = HashMap::new();
        for spec in specs {
            *per_column.entry(spec.column.as_str()).or_default() += 1;
        }

        let mut taken: HashSet<String> = key_names.iter().cloned().collect();
        let mut names = Vec::with_capacity(specs.len());
        for spec in specs {
            let name = if per_column[spec.column.as_str()] == 1 && !key_names.contains(&spec.column)
            {
                spec.column.clone()
            } else {
                format!("{}_{}", spec.column, spec.aggregator.name())
            };
            if !taken.insert(name.clone()) {
                return Err(FrameError::InvalidArgument(format!(
                    "aggregate {}({}) would produce duplicate output column `{name}`",
                    spec.aggregator.name(),
                    spec.column
                )));
            }
            names.push(name);
        }

        let mut output = self.key_output();
        for ((spec, source), name) in specs.iter().zip(sources).zip(names) {
            let values = self
                .groups
                .iter()
                .map(|rows| {
                    let values: Vec<Value> = rows.iter().map(|&row| source.value(row)).collect();
                    reduce(&spec.aggregator, &spec.column, &values)
                })
                .collect::<FrameResult<Vec<_>>>()?;
            let column = match &spec.aggregator {
                Aggregator::Sum | Aggregator::Mean => Column::with_kind(ColumnKind::Float64, values)?,
                Aggregator::Count => Column::with_kind(ColumnKind::Int32, values)?,
                Aggregator::Min | Aggregator::Max => Column::with_kind(source.kind(), values)?,
                Aggregator::Custom { .. } => Column::from_values(values),
            };
            output.push((name, column));
        }
        Frame::from_typed_columns(output)
    }

    /// Run `f` on each group's sub-frame and assemble the returned records.
    ///
    /// Output columns are the key columns followed by the union of returned field names in
    /// first-seen order. A field missing from some group's record reads back as null there; a
    /// returned field named like a key column replaces that key's value.
    pub fn apply(&self, f: impl Fn(&Frame) -> Record) -> FrameResult<Frame> {
        let key_names = self.key_names();
        let mut names: Vec<String> = key_names.clone();
        let mut positions: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        let mut rows: Vec<Vec<Value>> = Vec::with_capacity(self.groups.len());
        let mut overridden: HashSet<usize> = HashSet::new();

        for (key, group) in self.keys.iter().zip(&self.groups) {
            let sub = self.frame.select_rows(group)?;
            let mut row = key.clone();
            row.resize(names.len(), Value::Null);
            for (field, value) in f(&sub) {
                let pos = match positions.get(&field) {
                    Some(&pos) => pos,
                    None => {
                        let pos = names.len();
                        positions.insert(field.clone(), pos);
                        names.push(field);
                        pos
                    }
                };
                if row.len() <= pos {
                    row.resize(pos + 1, Value::Null);
                }
                if pos < key_names.len() {
                    overridden.insert(pos);
                }
                row[pos] = value;
            }
            rows.push(row);
        }
        let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); names.len()];
        for row in rows {
            let padded = row.into_iter().chain(std::iter::repeat(Value::Null));
            for (column, value) in columns.iter_mut().zip(padded) {
                column.push(value);
            }
        }

        // Keys nobody overrode keep their source kind, even when there are no groups.
        let mut output: Vec<(String, Column)> = Vec::with_capacity(names.len());
        let mut keys = self.key_output().into_iter();
        for (pos, (name, values)) in names.into_iter().zip(columns).enumerate() {
            let key = keys.next();
            let column = match key {
                Some((_, column)) if pos < key_names.len() && !overridden.contains(&pos) => column,
                _ => Column::from_values(values),
            };
            output.push((name, column));
        }
        Frame::from_typed_columns(output)
    }
}

fn numeric<'v>(
    aggregator: &Aggregator,
    column: &str,
    values: &'v [Value],
) -> FrameResult<Vec<(f64, &'v Value)>> {
    values
        .iter()
        .filter(|v| !v.is_null())
        .map(|v| {
            v.as_f64().map(|n| (n, v)).ok_or_else(|| {
                FrameError::TypeMismatch(format!(
                    "{} over column {column} requires numeric values, found {} {v}",
                    aggregator.name(),
                    v.type_name()
                ))
            })
        })
        .collect()
}

fn reduce(aggregator: &Aggregator, column: &str, values: &[Value]) -> FrameResult<Value> {
    Ok(match aggregator {
        Aggregator::Count => Value::Int(i32::try_from(values.len()).unwrap_or(i32::MAX)),
        Aggregator::Sum => {
            let nums = numeric(aggregator, column, values)?;
            if nums.is_empty() {
                Value::Null
            } else {
                Value::Float(nums.iter().map(|(n, _)| n).sum())
            }
        }
        Aggregator::Mean => {
            let nums = numeric(aggregator, column, values)?;
            if nums.is_empty() {
                Value::Null
            } else {
                let total: f64 = nums.iter().map(|(n, _)| n).sum();
                Value::Float(total / nums.len() as f64)
            }
        }
        Aggregator::Min | Aggregator::Max => {
            let want = if matches!(aggregator, Aggregator::Min) {
                Ordering::Less
            } else {
                Ordering::Greater
            };
            numeric(aggregator, column, values)?
                .into_iter()
                .filter(|(n, _)| !n.is_nan())
                .map(|(_, v)| v)
                .reduce(|best, v| {
                    if compare_values(v, best) == Some(want) {
                        v
                    } else {
                        best
                    }
                })
                .cloned()
                .unwrap_or(Value::Null)
        }
        Aggregator::Custom { reduce: func, .. } => func(values),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_reducers_skip_nulls() {
        let values = vec![Value::Int(4), Value::Null, Value::Float(2.0)];
        assert_eq!(reduce(&Aggregator::Sum, "v", &values).unwrap(), Value::Float(6.0));
        assert_eq!(reduce(&Aggregator::Mean, "v", &values).unwrap(), Value::Float(3.0));
        assert_eq!(reduce(&Aggregator::Min, "v", &values).unwrap(), Value::Float(2.0));
        assert_eq!(reduce(&Aggregator::Max, "v", &values).unwrap(), Value::Int(4));
        assert_eq!(reduce(&Aggregator::Count, "v", &values).unwrap(), Value::Int(3));
    }

    #[test]
    fn min_and_max_skip_nan() {
        let values = vec![Value::Float(f64::NAN), Value::Float(3.0), Value::Int(1)];
        assert_eq!(reduce(&Aggregator::Min, "v", &values).unwrap(), Value::Int(1));
        assert_eq!(reduce(&Aggregator::Max, "v", &values).unwrap(), Value::Float(3.0));
        let only_nan = vec![Value::Null, Value::Float(f64::NAN)];
        assert_eq!(reduce(&Aggregator::Max, "v", &only_nan).unwrap(), Value::Null);
    }

    #[test]
    fn all_null_group_reduces_to_null() {
        let values = vec![Value::Null, Value::Null];
        assert_eq!(reduce(&Aggregator::Sum, "v", &values).unwrap(), Value::Null);
        assert_eq!(reduce(&Aggregator::Max, "v", &values).unwrap(), Value::Null);
    }

    #[test]
    fn text_values_are_a_type_mismatch() {
        let values = vec![Value::Int(1), Value::from("x")];
        let err = reduce(&Aggregator::Sum, "v", &values).unwrap_err();
        assert!(matches!(err, FrameError::TypeMismatch(_)), "{err:?}");
    }

    #[test]
    fn aggregator_names_parse() {
        assert!(matches!("avg".parse::<Aggregator>(), Ok(Aggregator::Mean)));
        assert!(matches!(
            "median".parse::<Aggregator>(),
            Err(FrameError::InvalidArgument(_))
        ));
    }
}
