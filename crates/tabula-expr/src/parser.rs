use crate::error::{SyntaxError, SyntaxResult};
use crate::lexer::{Dialect, Lexer, Token};
use tabula_columnar::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// A bare identifier, resolved against the frame's columns at compile time.
    Field(String),
    List(Vec<Expr>),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Conjunction of every operand; chains like `a && b && c` stay flat.
    All(Vec<Expr>),
    /// Disjunction of every operand.
    Any(Vec<Expr>),
    /// Text containment / prefix / suffix / pattern test, or list membership for `includes`.
    Method {
        receiver: Box<Expr>,
        method: Method,
        arg: Box<Expr>,
    },
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    IsNull {
        expr: Box<Expr>,
        negated: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
}

impl BinaryOp {
    pub(crate) fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Equals => "==",
            BinaryOp::NotEquals => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEquals => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEquals => ">=",
        }
    }
}

impl Expr {
    fn node_count(&self) -> usize {
        1 + match self {
            Expr::Literal(_) | Expr::Field(_) => 0,
            Expr::List(items) | Expr::All(items) | Expr::Any(items) => {
                items.iter().map(Expr::node_count).sum()
            }
            Expr::Unary { expr, .. } | Expr::IsNull { expr, .. } => expr.node_count(),
            Expr::Binary { left, right, .. } => left.node_count() + right.node_count(),
            Expr::Method { receiver, arg, .. } => receiver.node_count() + arg.node_count(),
            Expr::InList { expr, list, .. } => {
                expr.node_count() + list.iter().map(Expr::node_count).sum::<usize>()
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Infix {
    Binary(BinaryOp),
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Includes,
    StartsWith,
    EndsWith,
    Match,
}

impl Method {
    pub(crate) fn name(self) -> &'static str {
        match self {
            Method::Includes => "includes",
            Method::StartsWith => "startsWith",
            Method::EndsWith => "endsWith",
            Method::Match => "match",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "includes" => Some(Method::Includes),
            "startsWith" => Some(Method::StartsWith),
            "endsWith" => Some(Method::EndsWith),
            "match" | "test" => Some(Method::Match),
            _ => None,
        }
    }

    /// Split `<field>_<method>` into its parts.
    fn split_suffixed(ident: &str) -> Option<(&str, Self)> {
        let (field, suffix) = ident.rsplit_once('_')?;
        if field.is_empty() {
            return None;
        }
        Method::from_name(suffix).map(|method| (field, method))
    }
}

// Binding powers, higher binds tighter.
const BP_OR: u8 = 1;
const BP_AND: u8 = 2;
const BP_NOT: u8 = 3;
const BP_COMPARE: u8 = 4;
const BP_UNARY: u8 = 7;

/// Budget shared by nesting and by chained non-logical operators, so the tree depth (and with
/// it every recursive pass over the tree) stays bounded.
const MAX_DEPTH: usize = 256;
/// `BETWEEN` duplicates its operand; cap the total number of copied nodes.
const MAX_COPIED_NODES: usize = 4_096;

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: Token,
    dialect: Dialect,
    values: &'a [Value],
    next_value: usize,
    depth: usize,
    copied_nodes: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, dialect: Dialect, values: &'a [Value]) -> SyntaxResult<Self> {
        let mut lexer = Lexer::new(input, dialect);
        let lookahead = lexer.next_token()?;
        Ok(Self {
            lexer,
            lookahead,
            dialect,
            values,
            next_value: 0,
            depth: 0,
            copied_nodes: 0,
        })
    }

    fn bump(&mut self) -> SyntaxResult<Token> {
        let current = std::mem::replace(&mut self.lookahead, Token::Eof);
        self.lookahead = self.lexer.next_token()?;
        Ok(current)
    }

    fn expect(&mut self, token: Token) -> SyntaxResult<()> {
        if self.lookahead == token {
            self.bump()?;
            Ok(())
        } else {
            Err(SyntaxError::new(format!(
                "expected {token:?}, found {:?}",
                self.lookahead
            )))
        }
    }

    fn parse(&mut self) -> SyntaxResult<Expr> {
        if self.dialect == Dialect::Sql && self.lookahead == Token::Where {
            self.bump()?;
        }
        let expr = self.parse_expr(0)?;
        match &self.lookahead {
            Token::Eof => {}
            Token::Assign => {
                return Err(SyntaxError::new(
                    "assignment is not allowed; use == to compare",
                ))
            }
            other => return Err(SyntaxError::new(format!("unexpected token {other:?}"))),
        }
        if self.next_value != self.values.len() {
            return Err(SyntaxError::new(format!(
                "{} values supplied for {} placeholders",
                self.values.len(),
                self.next_value
            )));
        }
        Ok(expr)
    }

    fn descend(&mut self) -> SyntaxResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(SyntaxError::new(
                "expression nested or chained too deeply",
            ));
        }
        Ok(())
    }

    fn parse_expr(&mut self, min_prec: u8) -> SyntaxResult<Expr> {
        let entry_depth = self.depth;
        self.descend()?;
        let expr = self.parse_expr_inner(min_prec);
        self.depth = entry_depth;
        expr
    }

    fn parse_expr_inner(&mut self, min_prec: u8) -> SyntaxResult<Expr> {
        let mut left = self.parse_prefix()?;
        loop {
            if self.dialect == Dialect::Sql
                && BP_COMPARE >= min_prec
                && matches!(
                    self.lookahead,
                    Token::Not | Token::In | Token::Like | Token::Between | Token::Is
                )
            {
                self.descend()?;
                left = self.parse_sql_predicate(left)?;
                continue;
            }
            let Some((infix, prec)) = self.infix_binding_power() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.bump()?;
            left = match infix {
                // Logical chains are collected into one flat operand list.
                Infix::And => match left {
                    Expr::All(mut operands) => {
                        operands.push(self.parse_expr(prec + 1)?);
                        Expr::All(operands)
                    }
                    left => Expr::All(vec![left, self.parse_expr(prec + 1)?]),
                },
                Infix::Or => match left {
                    Expr::Any(mut operands) => {
                        operands.push(self.parse_expr(prec + 1)?);
                        Expr::Any(operands)
                    }
                    left => Expr::Any(vec![left, self.parse_expr(prec + 1)?]),
                },
                Infix::Binary(op) => {
                    self.descend()?;
                    binary(op, left, self.parse_expr(prec + 1)?)
                }
            };
        }
        Ok(left)
    }

    /// `IN`, `LIKE`, `BETWEEN` and `IS` (each optionally negated) after a complete operand.
    fn parse_sql_predicate(&mut self, left: Expr) -> SyntaxResult<Expr> {
        let negated = match self.lookahead {
            Token::Not => {
                self.bump()?;
                if !matches!(self.lookahead, Token::In | Token::Like | Token::Between) {
                    return Err(SyntaxError::new(format!(
                        "expected IN, LIKE or BETWEEN after NOT, found {:?}",
                        self.lookahead
                    )));
                }
                true
            }
            _ => false,
        };

        let expr = match self.bump()? {
            Token::In => {
                self.expect(Token::LParen)?;
                let list = self.parse_list(Token::RParen)?;
                if list.is_empty() {
                    return Err(SyntaxError::new("IN list cannot be empty"));
                }
                return Ok(Expr::InList {
                    expr: Box::new(left),
                    list,
                    negated,
                });
            }
            Token::Like => match self.bump()? {
                Token::String(pattern) => like(left, &pattern),
                other => {
                    return Err(SyntaxError::new(format!(
                        "LIKE expects a quoted pattern, found {other:?}"
                    )))
                }
            },
            Token::Between => {
                // Bounds bind tighter than AND so the separator is left for us.
                let low = self.parse_expr(BP_COMPARE + 1)?;
                self.expect(Token::And)?;
                let high = self.parse_expr(BP_COMPARE + 1)?;
                self.copied_nodes += left.node_count();
                if self.copied_nodes > MAX_COPIED_NODES {
                    return Err(SyntaxError::new("BETWEEN operands are too large"));
                }
                Expr::All(vec![
                    binary(BinaryOp::GreaterEquals, left.clone(), low),
                    binary(BinaryOp::LessEquals, left, high),
                ])
            }
            Token::Is => {
                let negated = if self.lookahead == Token::Not {
                    self.bump()?;
                    true
                } else {
                    false
                };
                self.expect(Token::Null)?;
                return Ok(Expr::IsNull {
                    expr: Box::new(left),
                    negated,
                });
            }
            other => {
                debug_assert!(false, "parse_sql_predicate consumed {other:?}");
                return Err(SyntaxError::new(format!("unexpected token {other:?}")));
            }
        };

        Ok(if negated {
            Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(expr),
            }
        } else {
            expr
        })
    }

    fn parse_prefix(&mut self) -> SyntaxResult<Expr> {
        let expr = match &self.lookahead {
            Token::Minus => {
                self.bump()?;
                let expr = self.parse_expr(BP_UNARY)?;
                return Ok(Expr::Unary {
                    op: UnaryOp::Negate,
                    expr: Box::new(expr),
                });
            }
            Token::Bang => {
                self.bump()?;
                let expr = self.parse_expr(BP_UNARY)?;
                return Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(expr),
                });
            }
            Token::Not => {
                self.bump()?;
                let expr = self.parse_expr(BP_NOT)?;
                return Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(expr),
                });
            }
            Token::Int(n) => {
                let n = *n;
                self.bump()?;
                Expr::Literal(Value::Int(n))
            }
            Token::Float(n) => {
                let n = *n;
                self.bump()?;
                Expr::Literal(Value::Float(n))
            }
            Token::String(s) => {
                let s = Value::from(s.as_str());
                self.bump()?;
                Expr::Literal(s)
            }
            Token::True | Token::False => {
                let b = self.lookahead == Token::True;
                self.bump()?;
                Expr::Literal(Value::Bool(b))
            }
            Token::Null => {
                self.bump()?;
                Expr::Literal(Value::Null)
            }
            Token::Placeholder => {
                self.bump()?;
                let value = self.values.get(self.next_value).cloned().ok_or_else(|| {
                    SyntaxError::new(format!(
                        "placeholder #{} has no value ({} supplied)",
                        self.next_value + 1,
                        self.values.len()
                    ))
                })?;
                self.next_value += 1;
                Expr::Literal(value)
            }
            Token::Identifier(_) => self.parse_ident_like()?,
            Token::LParen => {
                self.bump()?;
                let inner = self.parse_expr(0)?;
                self.expect(Token::RParen)?;
                inner
            }
            Token::LBracket if self.dialect == Dialect::Expr => {
                self.bump()?;
                Expr::List(self.parse_list(Token::RBracket)?)
            }
            other => {
                return Err(SyntaxError::new(format!(
                    "unexpected token in {}: {other:?}",
                    self.dialect
                )))
            }
        };
        if self.dialect == Dialect::Expr {
            self.parse_postfix(expr)
        } else {
            Ok(expr)
        }
    }

    /// `.includes(x)` style method calls.
    fn parse_postfix(&mut self, mut expr: Expr) -> SyntaxResult<Expr> {
        while self.lookahead == Token::Dot {
            self.descend()?;
            self.bump()?;
            let name = match self.bump()? {
                Token::Identifier(name) => name,
                other => {
                    return Err(SyntaxError::new(format!(
                        "expected method name after '.', found {other:?}"
                    )))
                }
            };
            let method = Method::from_name(&name)
                .ok_or_else(|| SyntaxError::new(format!("unknown method `{name}`")))?;
            let arg = self.parse_call_arg(&name)?;
            expr = Expr::Method {
                receiver: Box::new(expr),
                method,
                arg: Box::new(arg),
            };
        }
        Ok(expr)
    }

    fn parse_ident_like(&mut self) -> SyntaxResult<Expr> {
        let ident = match self.bump()? {
            Token::Identifier(ident) => ident,
            other => {
                debug_assert!(false, "parse_ident_like called with lookahead={other:?}");
                return Err(SyntaxError::new("expected identifier"));
            }
        };
        if self.lookahead != Token::LParen {
            return Ok(Expr::Field(ident));
        }
        if self.dialect == Dialect::Sql {
            return Err(SyntaxError::new(format!(
                "function calls are not supported: {ident}(...)"
            )));
        }
        let (field, method) = Method::split_suffixed(&ident)
            .ok_or_else(|| SyntaxError::new(format!("unknown function `{ident}`")))?;
        let field = field.to_string();
        let arg = self.parse_call_arg(&ident)?;
        Ok(Expr::Method {
            receiver: Box::new(Expr::Field(field)),
            method,
            arg: Box::new(arg),
        })
    }

    fn parse_call_arg(&mut self, name: &str) -> SyntaxResult<Expr> {
        self.expect(Token::LParen)?;
        let mut args = self.parse_list(Token::RParen)?;
        if args.len() != 1 {
            return Err(SyntaxError::new(format!(
                "`{name}` takes exactly one argument, got {}",
                args.len()
            )));
        }
        Ok(args.remove(0))
    }

    /// Comma-separated expressions up to and including `close`.
    fn parse_list(&mut self, close: Token) -> SyntaxResult<Vec<Expr>> {
        let mut items = Vec::new();
        if self.lookahead != close {
            loop {
                items.push(self.parse_expr(0)?);
                if self.lookahead == Token::Comma {
                    self.bump()?;
                    continue;
                }
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    fn infix_binding_power(&self) -> Option<(Infix, u8)> {
        let op = match (&self.lookahead, self.dialect) {
            (Token::OrOr, _) | (Token::Or, Dialect::Sql) => return Some((Infix::Or, BP_OR)),
            (Token::AndAnd, _) | (Token::And, Dialect::Sql) => return Some((Infix::And, BP_AND)),
            (Token::Equals, _) => (BinaryOp::Equals, BP_COMPARE),
            (Token::NotEquals, _) => (BinaryOp::NotEquals, BP_COMPARE),
            (Token::Less, _) => (BinaryOp::Less, BP_COMPARE),
            (Token::LessEquals, _) => (BinaryOp::LessEquals, BP_COMPARE),
            (Token::Greater, _) => (BinaryOp::Greater, BP_COMPARE),
            (Token::GreaterEquals, _) => (BinaryOp::GreaterEquals, BP_COMPARE),
            (Token::Plus, _) => (BinaryOp::Add, 5),
            (Token::Minus, _) => (BinaryOp::Subtract, 5),
            (Token::Star, _) => (BinaryOp::Multiply, 6),
            (Token::Slash, _) => (BinaryOp::Divide, 6),
            (Token::Percent, _) => (BinaryOp::Remainder, 6),
            _ => return None,
        };
        Some((Infix::Binary(op.0), op.1))
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn method(receiver: Expr, method: Method, arg: &str) -> Expr {
    Expr::Method {
        receiver: Box::new(receiver),
        method,
        arg: Box::new(Expr::Literal(Value::from(arg))),
    }
}

/// Rewrite `target LIKE pattern`.
///
/// `%x%`, `%x` and `x%` (with no further `%` in `x`) become containment, suffix and prefix
/// tests on `x` taken literally, `_` included. A pattern without wildcards becomes equality, and
/// anything else becomes an anchored regular expression (`%` matches any run, `_` any single
/// character). Matching is case-sensitive.
fn like(target: Expr, pattern: &str) -> Expr {
    let literal = |s: &str| !s.contains('%');

    if let Some(inner) = pattern.strip_prefix('%').and_then(|p| p.strip_suffix('%')) {
        if literal(inner) {
            return method(target, Method::Includes, inner);
        }
    }
    if let Some(inner) = pattern.strip_prefix('%') {
        if literal(inner) {
            return method(target, Method::EndsWith, inner);
        }
    }
    if let Some(inner) = pattern.strip_suffix('%') {
        if literal(inner) {
            return method(target, Method::StartsWith, inner);
        }
    }
    if !pattern.contains(['%', '_']) {
        return binary(
            BinaryOp::Equals,
            target,
            Expr::Literal(Value::from(pattern)),
        );
    }

    let mut regex = String::from("(?s)^");
    for ch in pattern.chars() {
        match ch {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            other => regex.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    regex.push('$');
    method(target, Method::Match, &regex)
}

/// Parse `input` in `dialect`, substituting `values` for `{}` placeholders in order.
pub fn parse(input: &str, dialect: Dialect, values: &[Value]) -> Result<Expr, SyntaxError> {
    Parser::new(input, dialect, values)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(name: &str) -> Expr {
        Expr::Field(name.to_string())
    }

    fn lit(value: impl Into<Value>) -> Expr {
        Expr::Literal(value.into())
    }

    fn sql(input: &str) -> Expr {
        parse(input, Dialect::Sql, &[]).unwrap()
    }

    #[test]
    fn and_binds_tighter_than_or() {
        assert_eq!(
            parse("a || b && c", Dialect::Expr, &[]).unwrap(),
            Expr::Any(vec![field("a"), Expr::All(vec![field("b"), field("c")])])
        );
    }

    #[test]
    fn suffixed_methods_rewrite_to_method_calls() {
        assert_eq!(
            parse("city_includes('Fran')", Dialect::Expr, &[]).unwrap(),
            method(field("city"), Method::Includes, "Fran")
        );
        assert_eq!(
            parse("first_name_startsWith({})", Dialect::Expr, &[Value::from("A")]).unwrap(),
            method(field("first_name"), Method::StartsWith, "A")
        );
        assert!(parse("city_contains('x')", Dialect::Expr, &[]).is_err());
    }

    #[test]
    fn dotted_methods_and_array_literals() {
        assert_eq!(
            parse("[1, 2].includes(n)", Dialect::Expr, &[]).unwrap(),
            Expr::Method {
                receiver: Box::new(Expr::List(vec![lit(1), lit(2)])),
                method: Method::Includes,
                arg: Box::new(field("n")),
            }
        );
    }

    #[test]
    fn placeholder_count_must_match() {
        assert!(parse("a > {}", Dialect::Expr, &[]).is_err());
        assert!(parse("a > 1", Dialect::Expr, &[Value::Int(1)]).is_err());
        assert_eq!(
            parse("a > {} && b == {}", Dialect::Expr, &[Value::Int(1), Value::from("x")])
                .unwrap(),
            Expr::All(vec![
                binary(BinaryOp::Greater, field("a"), lit(1)),
                binary(BinaryOp::Equals, field("b"), lit("x")),
            ])
        );
    }

    #[test]
    fn assignment_is_rejected_in_expressions() {
        let err = parse("a = 1", Dialect::Expr, &[]).unwrap_err();
        assert!(err.to_string().contains("assignment"), "{err}");
    }

    #[test]
    fn between_desugars_to_a_range_check() {
        assert_eq!(
            sql("age BETWEEN 30 AND 40 AND active = true"),
            Expr::All(vec![
                binary(BinaryOp::GreaterEquals, field("age"), lit(30)),
                binary(BinaryOp::LessEquals, field("age"), lit(40)),
                binary(BinaryOp::Equals, field("active"), lit(true)),
            ])
        );
    }

    #[test]
    fn like_forms_are_classified() {
        assert_eq!(sql("c LIKE '%ran%'"), method(field("c"), Method::Includes, "ran"));
        assert_eq!(sql("c LIKE '%York'"), method(field("c"), Method::EndsWith, "York"));
        assert_eq!(sql("c LIKE 'San%'"), method(field("c"), Method::StartsWith, "San"));
        assert_eq!(
            sql("c LIKE 'Paris'"),
            binary(BinaryOp::Equals, field("c"), lit("Paris"))
        );
        assert_eq!(
            sql("c LIKE '%a_b%'"),
            method(field("c"), Method::Includes, "a_b")
        );
        assert_eq!(sql("c LIKE 'SKU_%'"), method(field("c"), Method::StartsWith, "SKU_"));
        assert_eq!(
            sql("c LIKE 'S_n%o.'"),
            method(field("c"), Method::Match, r"(?s)^S.n.*o\.$")
        );
    }

    #[test]
    fn negated_sql_forms() {
        assert_eq!(
            sql("dept NOT IN ('IT', 'HR')"),
            Expr::InList {
                expr: Box::new(field("dept")),
                list: vec![lit("IT"), lit("HR")],
                negated: true,
            }
        );
        assert_eq!(
            sql("WHERE manager IS NOT NULL"),
            Expr::IsNull {
                expr: Box::new(field("manager")),
                negated: true,
            }
        );
        assert_eq!(
            sql("NOT a = 1 OR b = 2"),
            Expr::Any(vec![
                Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(binary(BinaryOp::Equals, field("a"), lit(1))),
                },
                binary(BinaryOp::Equals, field("b"), lit(2)),
            ])
        );
    }

    #[test]
    fn logical_chains_stay_flat() {
        let input = vec!["a = 1"; 10_000].join(" OR ");
        match sql(&input) {
            Expr::Any(operands) => assert_eq!(operands.len(), 10_000),
            other => panic!("expected a flat disjunction, got {other:?}"),
        }
        assert_eq!(
            parse("a && (b && c) && d", Dialect::Expr, &[]).unwrap(),
            Expr::All(vec![
                field("a"),
                Expr::All(vec![field("b"), field("c")]),
                field("d")
            ])
        );
    }

    #[test]
    fn long_arithmetic_chains_are_rejected() {
        let input = vec!["1"; 10_000].join(" + ");
        let err = parse(&input, Dialect::Expr, &[]).unwrap_err();
        assert!(err.to_string().contains("too deeply"), "{err}");
        let input = vec!["1"; 100].join(" + ");
        assert!(parse(&input, Dialect::Expr, &[]).is_ok());
    }

    #[test]
    fn method_chains_count_against_the_depth_budget() {
        let input = format!("a{}", ".includes('x')".repeat(1_000));
        assert!(parse(&input, Dialect::Expr, &[]).is_err());
    }

    #[test]
    fn repeated_between_cannot_blow_up() {
        let input = format!("{}a{}", "(".repeat(60), " BETWEEN 1 AND 2)".repeat(60));
        assert!(parse(&input, Dialect::Sql, &[]).is_err());
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let input = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert!(parse(&input, Dialect::Expr, &[]).is_err());
        let input = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(parse(&input, Dialect::Expr, &[]).unwrap(), lit(1));
    }

    #[test]
    fn malformed_queries_fail() {
        for input in [
            "",
            "age >",
            "age BETWEEN 1",
            "dept IN ()",
            "dept IN 'IT'",
            "name LIKE 3",
            "a IS 3",
            "a NOT = 1",
            "count(a) > 1",
            "(a = 1",
        ] {
            assert!(parse(input, Dialect::Sql, &[]).is_err(), "{input:?}");
        }
    }
}
