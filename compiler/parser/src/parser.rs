use std::iter::Peekable;

use thiserror::Error;

use ast::*;
use lexer::{Token, TokenType, TokenValue};

/// The single error kind the parser produces. The first token that cannot
/// extend a valid derivation aborts the whole parse; there is no recovery
/// and no partial tree.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("syntax error at line {line}: unexpected '{found}', expected {expected}")]
    UnexpectedToken {
        found: String,
        line: i32,
        expected: String,
    },
    #[error("syntax error: unexpected end of file, expected {expected}")]
    UnexpectedEof { expected: String },
}

fn error_at(token: Option<Token>, expected: &str) -> ParseError {
    match token {
        Some(t) => ParseError::UnexpectedToken {
            found: t.lexeme(),
            line: t.line,
            expected: expected.to_string(),
        },
        None => ParseError::UnexpectedEof {
            expected: expected.to_string(),
        },
    }
}

macro_rules! match_token_types {
    ($( $token:pat ),+ ) => {
        $(
        Some(Token{ kind: $token, ..})
        )|+
    };
}

pub struct Parser {
    tokens: Peekable<std::vec::IntoIter<Token>>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens: tokens.into_iter().peekable(),
        }
    }

    /// Parses the whole token stream into a `CompUnit`: one or more
    /// function definitions in source order.
    pub fn parse(&mut self) -> Result<CompUnit, ParseError> {
        let mut funcs = vec![self.parse_func_def()?];

        while self.tokens.peek().is_some() {
            funcs.push(self.parse_func_def()?);
        }

        Ok(CompUnit { funcs })
    }

    fn parse_func_def(&mut self) -> Result<FuncDef, ParseError> {
        let func_type = self.parse_func_type()?;
        let ident = self.parse_ident()?;

        self.expect(TokenType::OpenParen)?;
        self.expect(TokenType::CloseParen)?;

        let body = self.parse_block()?;

        Ok(FuncDef {
            func_type,
            ident,
            body,
        })
    }

    fn parse_func_type(&mut self) -> Result<FuncType, ParseError> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenType::Int,
                ..
            }) => Ok(FuncType::Int),
            Some(Token {
                kind: TokenType::Void,
                ..
            }) => Ok(FuncType::Void),
            t => Err(error_at(t, "'int' or 'void'")),
        }
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(TokenType::OpenBrace)?;

        let mut items = vec![];

        while self
            .tokens
            .peek()
            .is_some_and(|t| t.kind != TokenType::CloseBrace)
        {
            items.push(self.parse_stmt()?);
        }

        self.expect(TokenType::CloseBrace)?;

        Ok(Block { items })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.tokens.peek() {
            match_token_types!(TokenType::Return) => {
                self.expect(TokenType::Return)?;

                if self
                    .tokens
                    .peek()
                    .is_some_and(|t| t.kind == TokenType::Semicolon)
                {
                    self.expect(TokenType::Semicolon)?;
                    return Ok(Stmt::Return { expr: None });
                }

                let expr = self.parse_expr(0)?;
                self.expect(TokenType::Semicolon)?;

                Ok(Stmt::Return { expr: Some(expr) })
            }
            match_token_types!(TokenType::OpenBrace) => Ok(Stmt::Compound {
                block: self.parse_block()?,
            }),
            match_token_types!(TokenType::If) => self.parse_if_stmt(),
            match_token_types!(TokenType::Int) => Ok(Stmt::Decl(self.parse_var_decl()?)),
            match_token_types!(TokenType::Identifier) => {
                let lval = self.parse_lval()?;
                self.expect(TokenType::Equal)?;
                let expr = self.parse_expr(0)?;
                self.expect(TokenType::Semicolon)?;

                Ok(Stmt::Assign { lval, expr })
            }
            t => {
                let t = t.cloned();
                Err(error_at(t, "a statement"))
            }
        }
    }

    fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenType::If)?;
        self.expect(TokenType::OpenParen)?;

        let condition = self.parse_expr(0)?;

        self.expect(TokenType::CloseParen)?;

        let then = Box::new(self.parse_stmt()?);

        // an `else` binds to the nearest preceding unmatched `if`
        let otherwise = if self
            .tokens
            .peek()
            .is_some_and(|t| t.kind == TokenType::Else)
        {
            self.expect(TokenType::Else)?;
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then,
            otherwise,
        })
    }

    fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        self.expect(TokenType::Int)?;

        let mut defs = vec![self.parse_var_def()?];

        while self
            .tokens
            .peek()
            .is_some_and(|t| t.kind == TokenType::Comma)
        {
            self.expect(TokenType::Comma)?;
            defs.push(self.parse_var_def()?);
        }

        self.expect(TokenType::Semicolon)?;

        Ok(VarDecl { defs })
    }

    fn parse_var_def(&mut self) -> Result<VarDef, ParseError> {
        let ident = self.parse_ident()?;

        let init = if self
            .tokens
            .peek()
            .is_some_and(|t| t.kind == TokenType::Equal)
        {
            self.expect(TokenType::Equal)?;
            Some(self.parse_expr(0)?)
        } else {
            None
        };

        Ok(VarDef { ident, init })
    }

    fn parse_lval(&mut self) -> Result<Lval, ParseError> {
        let ident = self.parse_ident()?;
        Ok(Lval { ident })
    }

    fn parse_ident(&mut self) -> Result<String, ParseError> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenType::Identifier,
                value: TokenValue::Ident(ident),
                ..
            }) => Ok(ident),
            t => Err(error_at(t, "an identifier")),
        }
    }

    /// Precedence-climbing expression parser. Each binary tier is
    /// left-associative: the right operand is parsed at `prec + 1`.
    fn parse_expr(&mut self, min_prec: i32) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;

        while let Some(next) = self.peek() {
            if let Some(prec) = get_precedence(next.kind) {
                if prec >= min_prec {
                    let op = self.parse_binop()?;
                    let right = self.parse_expr(prec + 1)?;
                    left = Expr::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                } else {
                    break;
                }
            } else {
                break;
            }
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        match self.tokens.peek() {
            match_token_types!(TokenType::Plus, TokenType::Minus, TokenType::Bang) => {
                let op = self.parse_unop()?;
                let expr = self.parse_factor()?;

                Ok(Expr::Unary {
                    op,
                    expr: Box::new(expr),
                })
            }
            Some(_) => self.parse_primary_expr(),
            None => Err(ParseError::UnexpectedEof {
                expected: "an expression".to_string(),
            }),
        }
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
        match self.tokens.peek() {
            Some(Token {
                kind: TokenType::OpenParen,
                ..
            }) => {
                self.tokens.next();
                let expr = self.parse_expr(0)?;
                self.expect(TokenType::CloseParen)?;

                Ok(expr)
            }
            Some(Token {
                kind: TokenType::Constant,
                value: TokenValue::Integer(val),
                ..
            }) => {
                let val = *val;
                self.tokens.next();
                Ok(Expr::Constant(val))
            }
            Some(Token {
                kind: TokenType::Identifier,
                value: TokenValue::Ident(ident),
                ..
            }) => {
                let ident = ident.clone();
                self.tokens.next();
                Ok(Expr::Var(Lval { ident }))
            }
            t => {
                let t = t.cloned();
                Err(error_at(t, "an expression"))
            }
        }
    }

    fn parse_unop(&mut self) -> Result<UnaryOp, ParseError> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenType::Plus,
                ..
            }) => Ok(UnaryOp::Plus),
            Some(Token {
                kind: TokenType::Minus,
                ..
            }) => Ok(UnaryOp::Negate),
            Some(Token {
                kind: TokenType::Bang,
                ..
            }) => Ok(UnaryOp::Not),
            t => Err(error_at(t, "a unary operator")),
        }
    }

    fn parse_binop(&mut self) -> Result<BinaryOp, ParseError> {
        match self.tokens.next() {
            Some(Token {
                kind: TokenType::Plus,
                ..
            }) => Ok(BinaryOp::Add),
            Some(Token {
                kind: TokenType::Minus,
                ..
            }) => Ok(BinaryOp::Subtract),
            Some(Token {
                kind: TokenType::Star,
                ..
            }) => Ok(BinaryOp::Multiply),
            Some(Token {
                kind: TokenType::Slash,
                ..
            }) => Ok(BinaryOp::Divide),
            Some(Token {
                kind: TokenType::Percent,
                ..
            }) => Ok(BinaryOp::Modulo),

            Some(Token {
                kind: TokenType::Less,
                ..
            }) => Ok(BinaryOp::Less),
            Some(Token {
                kind: TokenType::LessEqual,
                ..
            }) => Ok(BinaryOp::LessEqual),
            Some(Token {
                kind: TokenType::Greater,
                ..
            }) => Ok(BinaryOp::Greater),
            Some(Token {
                kind: TokenType::GreaterEqual,
                ..
            }) => Ok(BinaryOp::GreaterEqual),
            Some(Token {
                kind: TokenType::EqualEqual,
                ..
            }) => Ok(BinaryOp::Equal),
            Some(Token {
                kind: TokenType::BangEqual,
                ..
            }) => Ok(BinaryOp::NotEqual),
            Some(Token {
                kind: TokenType::AmpAmp,
                ..
            }) => Ok(BinaryOp::And),
            Some(Token {
                kind: TokenType::PipePipe,
                ..
            }) => Ok(BinaryOp::Or),
            t => Err(error_at(t, "a binary operator")),
        }
    }

    /// Checks if next token is of correct expected type
    fn expect(&mut self, expected: TokenType) -> Result<Token, ParseError> {
        match self.tokens.next() {
            Some(t) if t.kind == expected => Ok(t),
            t => Err(error_at(t, &format!("'{}'", expected))),
        }
    }

    fn peek(&mut self) -> Option<Token> {
        self.tokens.peek().cloned()
    }
}

/// Binary operator precedence, highest binds tightest. Tokens with no
/// precedence end the expression.
fn get_precedence(token: TokenType) -> Option<i32> {
    match token {
        TokenType::Star | TokenType::Slash | TokenType::Percent => Some(50),
        TokenType::Plus | TokenType::Minus => Some(45),
        TokenType::Less | TokenType::LessEqual | TokenType::Greater | TokenType::GreaterEqual => {
            Some(35)
        }
        TokenType::EqualEqual | TokenType::BangEqual => Some(30),
        TokenType::AmpAmp => Some(10),
        TokenType::PipePipe => Some(5),
        _ => None,
    }
}
