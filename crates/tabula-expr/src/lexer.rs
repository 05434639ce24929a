use crate::error::{SyntaxError, SyntaxResult};

/// Which surface grammar the lexer and parser accept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    /// JavaScript-flavoured boolean expressions with `{}` placeholders.
    Expr,
    /// SQL `WHERE`-clause flavoured conditions.
    Sql,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Dialect::Expr => "expression",
            Dialect::Sql => "query",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Token {
    Identifier(String),
    Int(i32),
    Float(f64),
    String(String),
    Placeholder,
    True,
    False,
    Null,
    // SQL keywords.
    And,
    Or,
    Not,
    In,
    Like,
    Between,
    Is,
    Where,
    Comma,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Equals,
    NotEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    AndAnd,
    OrOr,
    /// A lone `=` in the expression dialect; never valid there.
    Assign,
    Eof,
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    chars: std::str::Chars<'a>,
    peeked: Option<char>,
    dialect: Dialect,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str, dialect: Dialect) -> Self {
        let mut chars = input.chars();
        let peeked = chars.next();
        Self {
            input,
            chars,
            peeked,
            dialect,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let current = self.peeked.take();
        self.peeked = self.chars.next();
        current
    }

    fn peek(&self) -> Option<char> {
        self.peeked
    }

    /// Consume `next` if it is the upcoming character.
    fn eat(&mut self, next: char) -> bool {
        if self.peek() == Some(next) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn consume_while<F>(&mut self, mut predicate: F) -> String
    where
        F: FnMut(char) -> bool,
    {
        let mut buf = String::new();
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            buf.push(ch);
            self.bump();
        }
        buf
    }

    fn skip_whitespace(&mut self) {
        self.consume_while(|c| c.is_whitespace());
    }

    /// Read a quoted run up to `quote`; a doubled quote stands for a literal one. In the
    /// expression dialect a backslash escapes the next character instead.
    fn quoted(&mut self, quote: char, what: &str) -> SyntaxResult<String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(SyntaxError::new(format!("unterminated {what}"))),
                Some('\\') if self.dialect == Dialect::Expr && quote != '`' => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(c) => out.push(c),
                    None => return Err(SyntaxError::new(format!("unterminated {what}"))),
                },
                Some(c) if c == quote => {
                    if self.eat(quote) {
                        out.push(quote);
                        continue;
                    }
                    break;
                }
                Some(c) => out.push(c),
            }
        }
        Ok(out)
    }

    fn number(&mut self) -> SyntaxResult<Token> {
        let mut num_str = self.consume_while(|c| c.is_ascii_digit());
        let mut is_float = false;
        if self.peek() == Some('.') {
            is_float = true;
            num_str.push('.');
            self.bump();
            let frac = self.consume_while(|c| c.is_ascii_digit());
            if frac.is_empty() {
                return Err(SyntaxError::new(format!(
                    "invalid number {num_str:?} (expected digits after '.')"
                )));
            }
            num_str.push_str(&frac);
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            is_float = true;
            if let Some(exp) = self.bump() {
                num_str.push(exp);
            }
            if matches!(self.peek(), Some('+' | '-')) {
                if let Some(sign) = self.bump() {
                    num_str.push(sign);
                }
            }
            let exp_digits = self.consume_while(|c| c.is_ascii_digit());
            if exp_digits.is_empty() {
                return Err(SyntaxError::new(format!(
                    "invalid number {num_str:?} (expected exponent digits)"
                )));
            }
            num_str.push_str(&exp_digits);
        }

        if !is_float {
            if let Ok(n) = num_str.parse::<i32>() {
                return Ok(Token::Int(n));
            }
        }
        num_str
            .parse::<f64>()
            .map(Token::Float)
            .map_err(|_| SyntaxError::new(format!("invalid number {num_str:?}")))
    }

    fn keyword(&self, ident: String) -> Token {
        match self.dialect {
            Dialect::Expr => match ident.as_str() {
                "true" => Token::True,
                "false" => Token::False,
                "null" | "undefined" => Token::Null,
                _ => Token::Identifier(ident),
            },
            Dialect::Sql => match ident.to_ascii_uppercase().as_str() {
                "AND" => Token::And,
                "OR" => Token::Or,
                "NOT" => Token::Not,
                "IN" => Token::In,
                "LIKE" => Token::Like,
                "BETWEEN" => Token::Between,
                "IS" => Token::Is,
                "NULL" => Token::Null,
                "TRUE" => Token::True,
                "FALSE" => Token::False,
                "WHERE" => Token::Where,
                _ => Token::Identifier(ident),
            },
        }
    }

    pub(crate) fn next_token(&mut self) -> SyntaxResult<Token> {
        self.skip_whitespace();
        let Some(ch) = self.peek() else {
            return Ok(Token::Eof);
        };

        let single = match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            ',' => Some(Token::Comma),
            '.' => Some(Token::Dot),
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '%' => Some(Token::Percent),
            _ => None,
        };
        if let Some(token) = single {
            self.bump();
            return Ok(token);
        }

        match ch {
            '{' if self.dialect == Dialect::Expr => {
                self.bump();
                if self.eat('}') {
                    Ok(Token::Placeholder)
                } else {
                    Err(SyntaxError::new("expected '}' to close placeholder"))
                }
            }
            '=' => {
                self.bump();
                if self.eat('=') {
                    self.eat('=');
                    Ok(Token::Equals)
                } else if self.dialect == Dialect::Sql {
                    Ok(Token::Equals)
                } else {
                    Ok(Token::Assign)
                }
            }
            '!' => {
                self.bump();
                if self.eat('=') {
                    self.eat('=');
                    Ok(Token::NotEquals)
                } else {
                    Ok(Token::Bang)
                }
            }
            '<' => {
                self.bump();
                if self.eat('=') {
                    Ok(Token::LessEquals)
                } else if self.dialect == Dialect::Sql && self.eat('>') {
                    Ok(Token::NotEquals)
                } else {
                    Ok(Token::Less)
                }
            }
            '>' => {
                self.bump();
                if self.eat('=') {
                    Ok(Token::GreaterEquals)
                } else {
                    Ok(Token::Greater)
                }
            }
            '&' => {
                self.bump();
                if self.eat('&') {
                    Ok(Token::AndAnd)
                } else {
                    Err(SyntaxError::new("unexpected character '&'"))
                }
            }
            '|' => {
                self.bump();
                if self.eat('|') {
                    Ok(Token::OrOr)
                } else {
                    Err(SyntaxError::new("unexpected character '|'"))
                }
            }
            '\'' => self.quoted('\'', "string").map(Token::String),
            '"' => self.quoted('"', "string").map(Token::String),
            '`' => self.quoted('`', "quoted identifier").map(Token::Identifier),
            c if c.is_ascii_digit() => self.number(),
            c if is_ident_start(c) => {
                let ident = self.consume_while(is_ident_part);
                Ok(self.keyword(ident))
            }
            other => Err(SyntaxError::new(format!(
                "unexpected character {other:?} in {:?}",
                self.input
            ))),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(input: &str, dialect: Dialect) -> Vec<Token> {
        let mut lexer = Lexer::new(input, dialect);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token().unwrap();
            if token == Token::Eof {
                return out;
            }
            out.push(token);
        }
    }

    #[test]
    fn expression_operators() {
        assert_eq!(
            tokens("a === 1 && b !== 'x' || !c", Dialect::Expr),
            vec![
                Token::Identifier("a".into()),
                Token::Equals,
                Token::Int(1),
                Token::AndAnd,
                Token::Identifier("b".into()),
                Token::NotEquals,
                Token::String("x".into()),
                Token::OrOr,
                Token::Bang,
                Token::Identifier("c".into()),
            ]
        );
    }

    #[test]
    fn sql_keywords_are_case_insensitive() {
        assert_eq!(
            tokens("age between 1 And 2 OR name <> 'x'", Dialect::Sql),
            vec![
                Token::Identifier("age".into()),
                Token::Between,
                Token::Int(1),
                Token::And,
                Token::Int(2),
                Token::Or,
                Token::Identifier("name".into()),
                Token::NotEquals,
                Token::String("x".into()),
            ]
        );
    }

    #[test]
    fn bang_is_shared_by_both_dialects() {
        assert_eq!(
            tokens("!(a != 1)", Dialect::Sql),
            vec![
                Token::Bang,
                Token::LParen,
                Token::Identifier("a".into()),
                Token::NotEquals,
                Token::Int(1),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn single_equals_depends_on_dialect() {
        assert_eq!(tokens("a = 1", Dialect::Sql)[1], Token::Equals);
        assert_eq!(tokens("a = 1", Dialect::Expr)[1], Token::Assign);
    }

    #[test]
    fn numbers_distinguish_int_and_float() {
        assert_eq!(
            tokens("7 2.5 1e3 3000000000", Dialect::Expr),
            vec![
                Token::Int(7),
                Token::Float(2.5),
                Token::Float(1000.0),
                Token::Float(3_000_000_000.0),
            ]
        );
    }

    #[test]
    fn quoting_rules() {
        assert_eq!(
            tokens(r#"`first name` = 'O''Brien' OR dept = "IT""#, Dialect::Sql),
            vec![
                Token::Identifier("first name".into()),
                Token::Equals,
                Token::String("O'Brien".into()),
                Token::Or,
                Token::Identifier("dept".into()),
                Token::Equals,
                Token::String("IT".into()),
            ]
        );
        assert_eq!(
            tokens(r#"`first name` == "say \"hi\"""#, Dialect::Expr),
            vec![
                Token::Identifier("first name".into()),
                Token::Equals,
                Token::String("say \"hi\"".into()),
            ]
        );
    }

    #[test]
    fn placeholders_only_in_expressions() {
        assert_eq!(tokens("{}", Dialect::Expr), vec![Token::Placeholder]);
        assert!(Lexer::new("{}", Dialect::Sql).next_token().is_err());
        assert!(Lexer::new("'open", Dialect::Sql).next_token().is_err());
    }
}
