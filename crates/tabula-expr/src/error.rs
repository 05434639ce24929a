use tabula_columnar::FrameError;

use crate::lexer::Dialect;

pub(crate) type SyntaxResult<T> = Result<T, SyntaxError>;

/// A malformed expression or query, before it is tied to a dialect's public error kind.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    message: String,
}

impl SyntaxError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub(crate) fn into_frame_error(self, dialect: Dialect) -> FrameError {
        match dialect {
            Dialect::Expr => FrameError::InvalidPredicate(self.message),
            Dialect::Sql => FrameError::InvalidQuerySyntax(self.message),
        }
    }
}

/// Why a compiled predicate could not produce a value for one row.
///
/// These never escape a filter: the row is excluded and the error is logged at `trace` level.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("cannot apply `{op}` to {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot apply `{op}` to {operand}")]
    BadOperand {
        op: &'static str,
        operand: &'static str,
    },

    #[error("`{method}` expects {expected}, got {actual}")]
    BadReceiver {
        method: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("integer division by zero")]
    DivideByZero,

    #[error("invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}
