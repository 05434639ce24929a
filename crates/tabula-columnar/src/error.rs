pub type FrameResult<T> = Result<T, FrameError>;

/// Structural errors surfaced by frame operations.
///
/// Operations validate eagerly: when one of these is returned, no partially built frame escapes.
/// Failures while evaluating a predicate against a single row are not represented here; they
/// exclude the row instead.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("invalid predicate: {0}")]
    InvalidPredicate(String),

    #[error("invalid query syntax: {0}")]
    InvalidQuerySyntax(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("inconsistent column length for {column}: expected {expected} values, got {actual}")]
    InconsistentColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },
}

impl FrameError {
    pub(crate) fn out_of_range(index: impl TryInto<i64>, len: usize) -> Self {
        FrameError::IndexOutOfRange {
            index: index.try_into().unwrap_or(i64::MAX),
            len,
        }
    }
}
