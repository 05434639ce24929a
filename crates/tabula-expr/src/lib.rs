//! String predicates over [`tabula_columnar::Frame`].
//!
//! Two surface grammars compile to the same [`Predicate`]:
//! - an expression dialect (`age > {} && city_includes('Fran')`), with `{}` placeholders filled
//!   positionally from the call site and `<field>_includes(..)` / `_startsWith` / `_endsWith` /
//!   `_match` pseudo-methods;
//! - a SQL-like dialect (`dept = 'IT' AND age BETWEEN 30 AND 40`).
//!
//! Input is tokenized and parsed into a tree, never executed as code. Identifiers are bound to
//! column positions at compile time; evaluation only reads the current row.

#![forbid(unsafe_code)]

mod compile;
mod error;
mod ext;
mod lexer;
mod parser;

pub use crate::compile::{compile_expr, compile_query, Predicate};
pub use crate::error::{EvalError, SyntaxError};
pub use crate::ext::FrameExprExt;
pub use crate::lexer::Dialect;
pub use crate::parser::{parse, BinaryOp, Expr, Method, UnaryOp};
