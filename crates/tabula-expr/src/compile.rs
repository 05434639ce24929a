use regex::Regex;
use tabula_columnar::{compare_values, FrameResult, Row, Schema, Value};

use crate::error::{EvalError, SyntaxError};
use crate::lexer::Dialect;
use crate::parser::{self, BinaryOp, Expr, Method, UnaryOp};

/// Expression tree with identifiers bound to column positions.
#[derive(Debug)]
enum Node {
    Const(Value),
    Slot { position: usize, name: String },
    Missing(String),
    List(Vec<Node>),
    Unary {
        op: UnaryOp,
        node: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    All(Vec<Node>),
    Any(Vec<Node>),
    Method {
        receiver: Box<Node>,
        method: Method,
        arg: Box<Node>,
        /// Precompiled when the pattern of a `match` is a literal.
        regex: Option<Regex>,
    },
    InList {
        node: Box<Node>,
        list: Vec<Node>,
        negated: bool,
    },
    IsNull {
        node: Box<Node>,
        negated: bool,
    },
}

/// A compiled row predicate.
///
/// Holds no reference to the frame it was compiled against and is `Send + Sync`, so one
/// predicate can be shared between threads filtering the same (or a same-shaped) frame.
#[derive(Debug)]
pub struct Predicate {
    root: Node,
    source: String,
    dialect: Dialect,
}

impl Predicate {
    fn compile(
        source: &str,
        dialect: Dialect,
        values: &[Value],
        schema: &Schema,
    ) -> FrameResult<Self> {
        let expr = parser::parse(source, dialect, values)
            .map_err(|err| err.into_frame_error(dialect))?;
        let mut binder = Binder {
            schema,
            bound: Vec::new(),
        };
        let root = binder
            .bind(expr)
            .map_err(|err| err.into_frame_error(dialect))?;
        log::debug!(
            "compiled {dialect} {source:?} over fields {:?}",
            binder.bound
        );
        Ok(Self {
            root,
            source: source.to_string(),
            dialect,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Evaluate against one row, yielding the raw result value.
    pub fn evaluate(&self, row: &Row) -> Result<Value, EvalError> {
        eval(&self.root, row)
    }

    /// Evaluate and reduce the result to a boolean by truthiness.
    pub fn test(&self, row: &Row) -> Result<bool, EvalError> {
        self.evaluate(row).map(|value| value.truthy())
    }

    /// Like [`Predicate::test`], treating an evaluation failure as "no match".
    pub fn matches(&self, row: &Row) -> bool {
        self.test(row).unwrap_or(false)
    }
}

/// Compile a SQL-like condition (`dept = 'IT' AND age BETWEEN 30 AND 40`) against `schema`.
///
/// Malformed input fails with [`tabula_columnar::FrameError::InvalidQuerySyntax`].
pub fn compile_query(query: &str, schema: &Schema) -> FrameResult<Predicate> {
    Predicate::compile(query, Dialect::Sql, &[], schema)
}

/// Compile an expression template, substituting `values` for its `{}` placeholders in order.
///
/// Malformed input, or a placeholder/value count mismatch, fails with
/// [`tabula_columnar::FrameError::InvalidPredicate`].
pub fn compile_expr(template: &str, values: &[Value], schema: &Schema) -> FrameResult<Predicate> {
    Predicate::compile(template, Dialect::Expr, values, schema)
}

struct Binder<'a> {
    schema: &'a Schema,
    bound: Vec<String>,
}

impl Binder<'_> {
    fn bind(&mut self, expr: Expr) -> Result<Node, SyntaxError> {
        Ok(match expr {
            Expr::Literal(value) => Node::Const(value),
            Expr::Field(name) => match self.schema.position(&name) {
                Some(position) => {
                    if !self.bound.contains(&name) {
                        self.bound.push(name.clone());
                    }
                    Node::Slot { position, name }
                }
                None => {
                    log::warn!("field `{name}` is not a column of this frame; no row will match through it");
                    Node::Missing(name)
                }
            },
            Expr::List(items) => Node::List(self.bind_all(items)?),
            Expr::Unary { op, expr } => Node::Unary {
                op,
                node: Box::new(self.bind(*expr)?),
            },
            Expr::Binary { op, left, right } => Node::Binary {
                op,
                left: Box::new(self.bind(*left)?),
                right: Box::new(self.bind(*right)?),
            },
            Expr::All(operands) => Node::All(self.bind_all(operands)?),
            Expr::Any(operands) => Node::Any(self.bind_all(operands)?),
            Expr::Method {
                receiver,
                method,
                arg,
            } => {
                let receiver = self.bind(*receiver)?;
                let arg = self.bind(*arg)?;
                let regex = match (&arg, method) {
                    (Node::Const(Value::Text(pattern)), Method::Match) => {
                        Some(Regex::new(pattern).map_err(|err| {
                            SyntaxError::new(format!("invalid pattern {pattern:?}: {err}"))
                        })?)
                    }
                    _ => None,
                };
                Node::Method {
                    receiver: Box::new(receiver),
                    method,
                    arg: Box::new(arg),
                    regex,
                }
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => Node::InList {
                node: Box::new(self.bind(*expr)?),
                list: self.bind_all(list)?,
                negated,
            },
            Expr::IsNull { expr, negated } => Node::IsNull {
                node: Box::new(self.bind(*expr)?),
                negated,
            },
        })
    }

    fn bind_all(&mut self, exprs: Vec<Expr>) -> Result<Vec<Node>, SyntaxError> {
        exprs.into_iter().map(|expr| self.bind(expr)).collect()
    }
}

fn field(row: &Row, position: usize, name: &str) -> Result<Value, EvalError> {
    // Rows from the frame the predicate was compiled against hit the positional path.
    let at_position = row
        .schema()
        .names()
        .get(position)
        .filter(|n| n.as_str() == name)
        .and_then(|_| row.value(position));
    at_position
        .or_else(|| row.get(name))
        .cloned()
        .ok_or_else(|| EvalError::UnknownField(name.to_string()))
}

fn eval(node: &Node, row: &Row) -> Result<Value, EvalError> {
    match node {
        Node::Const(value) => Ok(value.clone()),
        Node::Slot { position, name } => field(row, *position, name),
        Node::Missing(name) => Err(EvalError::UnknownField(name.clone())),
        Node::List(items) => items
            .iter()
            .map(|item| eval(item, row))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Node::Unary { op, node } => {
            let value = eval(node, row)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
                UnaryOp::Negate => negate(value),
            }
        }
        Node::All(operands) => {
            for operand in operands {
                if !eval(operand, row)?.truthy() {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        Node::Any(operands) => {
            for operand in operands {
                if eval(operand, row)?.truthy() {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        Node::Binary { op, left, right } => {
            let left = eval(left, row)?;
            let right = eval(right, row)?;
            binary(*op, &left, &right)
        }
        Node::Method {
            receiver,
            method,
            arg,
            regex,
        } => {
            let receiver = eval(receiver, row)?;
            let arg = eval(arg, row)?;
            call_method(*method, &receiver, &arg, regex.as_ref())
        }
        Node::InList {
            node,
            list,
            negated,
        } => {
            let value = eval(node, row)?;
            let mut found = false;
            for item in list {
                if eval(item, row)?.loose_eq(&value) {
                    found = true;
                    break;
                }
            }
            Ok(Value::Bool(found != *negated))
        }
        Node::IsNull { node, negated } => Ok(Value::Bool(eval(node, row)?.is_null() != *negated)),
    }
}

fn negate(value: Value) -> Result<Value, EvalError> {
    match value {
        Value::Int(n) => Ok(n
            .checked_neg()
            .map(Value::Int)
            .unwrap_or(Value::Float(-(n as f64)))),
        Value::Float(n) => Ok(Value::Float(-n)),
        other => Err(EvalError::BadOperand {
            op: "-",
            operand: other.type_name(),
        }),
    }
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    EvalError::TypeMismatch {
        op: op.symbol(),
        left: left.type_name(),
        right: right.type_name(),
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    use std::cmp::Ordering;

    let ordered = |test: fn(Ordering) -> bool| {
        compare_values(left, right)
            .map(|ord| Value::Bool(test(ord)))
            .ok_or_else(|| mismatch(op, left, right))
    };

    match op {
        BinaryOp::Equals => Ok(Value::Bool(left.loose_eq(right))),
        BinaryOp::NotEquals => Ok(Value::Bool(!left.loose_eq(right))),
        BinaryOp::Less => ordered(Ordering::is_lt),
        BinaryOp::LessEquals => ordered(Ordering::is_le),
        BinaryOp::Greater => ordered(Ordering::is_gt),
        BinaryOp::GreaterEquals => ordered(Ordering::is_ge),
        BinaryOp::Add => match (left, right) {
            (Value::Text(_), _) | (_, Value::Text(_)) => {
                Ok(Value::from(format!("{left}{right}")))
            }
            _ => arithmetic(op, left, right),
        },
        BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Remainder => {
            arithmetic(op, left, right)
        }
    }
}

/// Integer arithmetic stays integral until it overflows; division always yields a float.
fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    if let (Value::Int(l), Value::Int(r)) = (left, right) {
        let exact = match op {
            BinaryOp::Add => l.checked_add(*r),
            BinaryOp::Subtract => l.checked_sub(*r),
            BinaryOp::Multiply => l.checked_mul(*r),
            BinaryOp::Remainder if *r == 0 => return Err(EvalError::DivideByZero),
            BinaryOp::Remainder => l.checked_rem(*r),
            _ => None,
        };
        if let Some(n) = exact {
            return Ok(Value::Int(n));
        }
    }

    let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) else {
        return Err(mismatch(op, left, right));
    };
    let out = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Subtract => l - r,
        BinaryOp::Multiply => l * r,
        BinaryOp::Divide => l / r,
        BinaryOp::Remainder => l % r,
        _ => return Err(mismatch(op, left, right)),
    };
    Ok(Value::Float(out))
}

fn call_method(
    method: Method,
    receiver: &Value,
    arg: &Value,
    regex: Option<&Regex>,
) -> Result<Value, EvalError> {
    if let (Method::Includes, Value::List(items)) = (method, receiver) {
        return Ok(Value::Bool(items.iter().any(|item| item.loose_eq(arg))));
    }

    let Some(text) = receiver.as_text() else {
        return Err(EvalError::BadReceiver {
            method: method.name(),
            expected: if method == Method::Includes {
                "text or list"
            } else {
                "text"
            },
            actual: receiver.type_name(),
        });
    };
    if arg.is_null() {
        return Err(EvalError::TypeMismatch {
            op: method.name(),
            left: receiver.type_name(),
            right: arg.type_name(),
        });
    }

    let matched = match method {
        Method::Includes => text.contains(arg.to_string().as_str()),
        Method::StartsWith => text.starts_with(arg.to_string().as_str()),
        Method::EndsWith => text.ends_with(arg.to_string().as_str()),
        Method::Match => match regex {
            Some(regex) => regex.is_match(text),
            None => {
                let pattern = arg.as_text().ok_or(EvalError::TypeMismatch {
                    op: method.name(),
                    left: receiver.type_name(),
                    right: arg.type_name(),
                })?;
                Regex::new(pattern)
                    .map_err(|err| EvalError::InvalidPattern {
                        pattern: pattern.to_string(),
                        message: err.to_string(),
                    })?
                    .is_match(text)
            }
        },
    };
    Ok(Value::Bool(matched))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn integer_arithmetic_widens_on_overflow() {
        assert_eq!(
            arithmetic(BinaryOp::Add, &Value::Int(i32::MAX), &Value::Int(1)).unwrap(),
            Value::Float(i32::MAX as f64 + 1.0)
        );
        assert_eq!(
            arithmetic(BinaryOp::Divide, &Value::Int(7), &Value::Int(2)).unwrap(),
            Value::Float(3.5)
        );
        assert_eq!(
            arithmetic(BinaryOp::Remainder, &Value::Int(7), &Value::Int(0)),
            Err(EvalError::DivideByZero)
        );
        assert_eq!(negate(Value::Int(i32::MIN)).unwrap(), Value::Float(2147483648.0));
    }

    #[test]
    fn text_concatenation_and_mismatches() {
        assert_eq!(
            binary(BinaryOp::Add, &Value::from("n="), &Value::Int(3)).unwrap(),
            Value::from("n=3")
        );
        assert!(matches!(
            binary(BinaryOp::Less, &Value::from("a"), &Value::Int(1)),
            Err(EvalError::TypeMismatch { op: "<", .. })
        ));
        assert!(matches!(
            binary(BinaryOp::Multiply, &Value::Bool(true), &Value::Int(1)),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn methods_check_their_receiver() {
        assert_eq!(
            call_method(Method::Includes, &Value::from("San Francisco"), &Value::from("Fran"), None)
                .unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call_method(
                Method::Includes,
                &Value::List(vec![Value::Int(1), Value::Int(2)]),
                &Value::Float(2.0),
                None
            )
            .unwrap(),
            Value::Bool(true)
        );
        assert!(matches!(
            call_method(Method::StartsWith, &Value::Int(1), &Value::from("1"), None),
            Err(EvalError::BadReceiver { expected: "text", .. })
        ));
        assert!(matches!(
            call_method(Method::Match, &Value::from("x"), &Value::from("("), None),
            Err(EvalError::InvalidPattern { .. })
        ));
    }
}
