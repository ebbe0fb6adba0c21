//! Parser for the attribute DSL.
//!
//! Grammar (in rough EBNF):
//!
//! expr       = or_expr
//! or_expr    = and_expr ("|" and_expr)*
//! and_expr   = unary_expr ("&" unary_expr)*
//! unary_expr = "!" unary_expr | primary
//! primary    = "(" expr ")" | attr_expr
//! attr_expr  = NAME (compare_op value_list)?
//! compare_op = "=" | "!=" | "<" | "<=" | ">" | ">="
//! value_list = value ("|" value)*
//! value      = IDENT | NUMBER | QUOTED | "*"

use super::ast::{AttrExpr, AttrValue, CompareOp};
use super::lexer::{Token, tokenize};

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

fn is_compare_op(tok: Option<&Token>) -> bool {
    matches!(
        tok,
        Some(Token::Eq | Token::Ne | Token::Lt | Token::Le | Token::Gt | Token::Ge)
    )
}

fn is_name(tok: Option<&Token>) -> bool {
    matches!(tok, Some(Token::Ident(_) | Token::Number(_)))
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos).cloned().unwrap_or(Token::Eof);
        self.pos += 1;
        tok
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        let tok = self.advance();
        if &tok == expected {
            Ok(())
        } else {
            Err(format!("Expected {expected:?}, got {tok:?}"))
        }
    }

    fn parse_expr(&mut self) -> Result<AttrExpr, String> {
        self.parse_or_expr()
    }

    /// or_expr = and_expr ("|" and_expr)*
    fn parse_or_expr(&mut self) -> Result<AttrExpr, String> {
        let mut left = self.parse_and_expr()?;

        while matches!(self.peek(), Token::Or) {
            self.advance();
            let right = self.parse_and_expr()?;
            left = AttrExpr::Or(vec![left, right]);
        }

        Ok(left.simplify())
    }

    /// and_expr = unary_expr ("&" unary_expr)*
    fn parse_and_expr(&mut self) -> Result<AttrExpr, String> {
        let mut left = self.parse_unary_expr()?;

        while matches!(self.peek(), Token::And) {
            self.advance();
            let right = self.parse_unary_expr()?;
            left = AttrExpr::And(vec![left, right]);
        }

        Ok(left.simplify())
    }

    /// unary_expr = "!" unary_expr | primary
    fn parse_unary_expr(&mut self) -> Result<AttrExpr, String> {
        if !matches!(self.peek(), Token::Not) {
            return self.parse_primary();
        }
        self.advance();

        if is_name(Some(self.peek())) {
            let next = self.tokens.get(self.pos + 1);
            if !is_compare_op(next) {
                // `!attr` is negated presence
                let name = match self.advance() {
                    Token::Ident(name) | Token::Number(name) => name,
                    other => return Err(format!("Expected attribute name, got {other:?}")),
                };
                return Ok(AttrExpr::Exists {
                    name,
                    negated: true,
                });
            }
            let inner = self.parse_primary()?;
            return Ok(AttrExpr::Not(Box::new(inner)));
        }

        let inner = self.parse_unary_expr()?;
        Ok(AttrExpr::Not(Box::new(inner)))
    }

    /// primary = "(" expr ")" | attr_expr
    fn parse_primary(&mut self) -> Result<AttrExpr, String> {
        match self.peek() {
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(_) | Token::Number(_) => self.parse_attr_expr(),
            Token::Eof => Ok(AttrExpr::True),
            other => Err(format!("Unexpected token: {other:?}")),
        }
    }

    /// attr_expr = NAME (compare_op value_list)?
    fn parse_attr_expr(&mut self) -> Result<AttrExpr, String> {
        let name = match self.advance() {
            Token::Ident(name) | Token::Number(name) => name,
            other => return Err(format!("Expected attribute name, got {other:?}")),
        };

        let op = match self.peek() {
            Token::Eq => CompareOp::Eq,
            Token::Ne => CompareOp::Ne,
            Token::Lt => CompareOp::Lt,
            Token::Le => CompareOp::Le,
            Token::Gt => CompareOp::Gt,
            Token::Ge => CompareOp::Ge,
            _ => {
                return Ok(AttrExpr::Exists {
                    name,
                    negated: false,
                });
            }
        };
        self.advance();

        match op {
            CompareOp::Eq => {
                let values = self.parse_value_list()?;
                Ok(AttrExpr::Match { name, values })
            }
            CompareOp::Ne => {
                // `a!=b` reads as "not a=b"; a numeric right side compares numerically
                match self.advance() {
                    Token::Number(raw) => Ok(AttrExpr::NumericCompare {
                        name,
                        op,
                        value: parse_number(&raw)?,
                    }),
                    other => {
                        let value = Self::value_from(other)?;
                        Ok(AttrExpr::Not(Box::new(AttrExpr::Match {
                            name,
                            values: vec![value],
                        })))
                    }
                }
            }
            op => match self.advance() {
                Token::Number(raw) => Ok(AttrExpr::NumericCompare {
                    name,
                    op,
                    value: parse_number(&raw)?,
                }),
                other => Err(format!("Expected number after {op}, got {other:?}")),
            },
        }
    }

    /// value_list = value ("|" value)*
    fn parse_value_list(&mut self) -> Result<Vec<AttrValue>, String> {
        let mut values = vec![self.parse_value()?];

        while matches!(self.peek(), Token::Or) {
            // `type=a|b | name=c`: a name followed by an operator starts a new expression
            if is_name(self.tokens.get(self.pos + 1))
                && is_compare_op(self.tokens.get(self.pos + 2))
            {
                break;
            }

            self.advance();
            values.push(self.parse_value()?);
        }

        Ok(values)
    }

    fn parse_value(&mut self) -> Result<AttrValue, String> {
        let tok = self.advance();
        Self::value_from(tok)
    }

    fn value_from(tok: Token) -> Result<AttrValue, String> {
        match tok {
            Token::Star => Ok(AttrValue::Any),
            Token::Ident(s) if s.contains('*') => Ok(AttrValue::Glob(s)),
            Token::Ident(s) | Token::Number(s) | Token::Quoted(s) => Ok(AttrValue::Exact(s)),
            other => Err(format!("Expected value, got {other:?}")),
        }
    }
}

fn parse_number(raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|e| format!("Invalid number '{raw}': {e}"))
}

/// Parse an attribute DSL string into an AST.
pub fn parse_attr_expr(input: &str) -> Result<AttrExpr, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(AttrExpr::True);
    }

    let tokens = tokenize(input)?;
    let mut parser = Parser::new(tokens);
    let ast = parser.parse_expr()?;

    if !matches!(parser.peek(), Token::Eof) {
        return Err(format!(
            "Unexpected token after expression: {:?}",
            parser.peek()
        ));
    }

    Ok(ast)
}
