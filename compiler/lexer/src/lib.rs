use std::fmt::{Display, Formatter};
use std::str::Chars;

use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Token {
    pub kind: TokenType,
    pub start: usize,
    pub end: usize,
    pub value: TokenValue,
    pub line: i32,
    pub col: i32,
}

impl Token {
    fn new(
        kind: TokenType,
        start: usize,
        end: usize,
        value: TokenValue,
        line: i32,
        col: i32,
    ) -> Self {
        Self {
            kind,
            start,
            end,
            value,
            line,
            col,
        }
    }

    /// Surface text of this token, used in diagnostics
    pub fn lexeme(&self) -> String {
        match &self.value {
            TokenValue::Ident(name) => name.clone(),
            TokenValue::Integer(val) => val.to_string(),
            TokenValue::Error(LexError::UnexpectedChar(c)) => c.to_string(),
            TokenValue::Error(LexError::InvalidIdentifier(text)) => text.clone(),
            TokenValue::None => self.kind.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum TokenValue {
    None,
    Integer(i64),
    Ident(String),
    Error(LexError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenType {
    // Single-character tokens
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Semicolon,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AmpAmp,
    PipePipe,

    // Literals
    Identifier,
    Constant,

    // Keywords
    Int,
    Void,
    If,
    Else,
    Return,

    // Informational
    Whitespace,
    Eof,
    InvalidIdent,
    Unknown,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TokenType::OpenParen => "(",
            TokenType::CloseParen => ")",
            TokenType::OpenBracket => "[",
            TokenType::CloseBracket => "]",
            TokenType::OpenBrace => "{",
            TokenType::CloseBrace => "}",
            TokenType::Semicolon => ";",
            TokenType::Comma => ",",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Star => "*",
            TokenType::Slash => "/",
            TokenType::Percent => "%",
            TokenType::Bang => "!",
            TokenType::BangEqual => "!=",
            TokenType::Equal => "=",
            TokenType::EqualEqual => "==",
            TokenType::Less => "<",
            TokenType::LessEqual => "<=",
            TokenType::Greater => ">",
            TokenType::GreaterEqual => ">=",
            TokenType::AmpAmp => "&&",
            TokenType::PipePipe => "||",
            TokenType::Identifier => "identifier",
            TokenType::Constant => "integer constant",
            TokenType::Int => "int",
            TokenType::Void => "void",
            TokenType::If => "if",
            TokenType::Else => "else",
            TokenType::Return => "return",
            TokenType::Whitespace => "whitespace",
            TokenType::Eof => "end of file",
            TokenType::InvalidIdent => "invalid identifier",
            TokenType::Unknown => "invalid character",
        };

        write!(f, "{}", text)
    }
}

const EOF: char = '\0';

pub struct Lexer<'a> {
    /// Source Text
    source: &'a str,

    /// Remaining source characters
    chars: Chars<'a>,
    line: i32,
    col: i32,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars(),
            line: 1,
            col: 1,
        }
    }

    pub fn tokenize(&'a mut self) -> impl Iterator<Item = Token> + '_ {
        std::iter::from_fn(move || {
            let token = self.scan_token();
            if token.kind != TokenType::Eof {
                Some(token)
            } else {
                None
            }
        })
        .filter(|t| t.kind != TokenType::Whitespace)
    }

    fn scan_token(&mut self) -> Token {
        let start = self.offset();
        let line = self.line;
        let col = self.col;

        let c = match self.advance() {
            Some(c) => c,
            None => {
                return Token::new(
                    TokenType::Eof,
                    start,
                    self.offset(),
                    TokenValue::None,
                    self.line,
                    self.col,
                )
            }
        };

        let token_type = match c {
            '(' => TokenType::OpenParen,
            ')' => TokenType::CloseParen,
            '[' => TokenType::OpenBracket,
            ']' => TokenType::CloseBracket,
            '{' => TokenType::OpenBrace,
            '}' => TokenType::CloseBrace,
            ';' => TokenType::Semicolon,
            ',' => TokenType::Comma,
            '+' => TokenType::Plus,
            '-' => TokenType::Minus,
            '*' => TokenType::Star,
            '%' => TokenType::Percent,
            '/' => match self.peek() {
                '/' => {
                    self.line_comment();
                    TokenType::Whitespace
                }
                '*' => {
                    self.block_comment();
                    TokenType::Whitespace
                }
                _ => TokenType::Slash,
            },
            '=' => match self.peek() {
                '=' => {
                    self.advance();
                    TokenType::EqualEqual
                }
                _ => TokenType::Equal,
            },
            '!' => match self.peek() {
                '=' => {
                    self.advance();
                    TokenType::BangEqual
                }
                _ => TokenType::Bang,
            },
            '<' => match self.peek() {
                '=' => {
                    self.advance();
                    TokenType::LessEqual
                }
                _ => TokenType::Less,
            },
            '>' => match self.peek() {
                '=' => {
                    self.advance();
                    TokenType::GreaterEqual
                }
                _ => TokenType::Greater,
            },
            '&' => match self.peek() {
                '&' => {
                    self.advance();
                    TokenType::AmpAmp
                }
                _ => TokenType::Unknown,
            },
            '|' => match self.peek() {
                '|' => {
                    self.advance();
                    TokenType::PipePipe
                }
                _ => TokenType::Unknown,
            },
            _c @ '0'..='9' => self.number(),
            _c @ 'a'..='z' | _c @ 'A'..='Z' | _c @ '_' => self.identifier(start),
            ' ' | '\r' | '\t' => TokenType::Whitespace,
            '\n' => {
                self.line += 1;
                self.col = 1;
                TokenType::Whitespace
            }
            _ => TokenType::Unknown,
        };

        let end = self.offset();

        let token_value = match token_type {
            TokenType::Constant => match self.source[start..end].parse::<i64>() {
                Ok(val) => TokenValue::Integer(val),
                Err(_) => TokenValue::Error(LexError::InvalidIdentifier(
                    self.source[start..end].to_string(),
                )),
            },
            TokenType::Identifier => TokenValue::Ident(self.source[start..end].to_string()),
            TokenType::InvalidIdent => TokenValue::Error(LexError::InvalidIdentifier(
                self.source[start..end].to_string(),
            )),
            TokenType::Unknown => TokenValue::Error(LexError::UnexpectedChar(c)),
            _ => TokenValue::None,
        };

        Token::new(token_type, start, end, token_value, line, col)
    }

    fn number(&mut self) -> TokenType {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // a digit run flowing into identifier characters is not a valid constant
        if self.peek().is_alphanumeric() || self.peek() == '_' {
            while self.peek().is_alphanumeric() || self.peek() == '_' {
                self.advance();
            }
            return TokenType::InvalidIdent;
        }

        TokenType::Constant
    }

    fn identifier(&mut self, start: usize) -> TokenType {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        match &self.source[start..self.offset()] {
            "int" => TokenType::Int,
            "void" => TokenType::Void,
            "if" => TokenType::If,
            "else" => TokenType::Else,
            "return" => TokenType::Return,
            _ => TokenType::Identifier,
        }
    }

    fn line_comment(&mut self) {
        while self.peek() != '\n' && self.peek() != EOF {
            self.advance();
        }
    }

    fn block_comment(&mut self) {
        self.advance();

        // an unterminated block comment swallows the rest of the input
        loop {
            match self.advance() {
                Some('*') if self.peek() == '/' => {
                    self.advance();
                    break;
                }
                Some('\n') => {
                    self.line += 1;
                    self.col = 1;
                }
                Some(_) => {}
                None => break,
            }
        }
    }

    /// Get offset into source text
    fn offset(&self) -> usize {
        self.source.len() - self.chars.as_str().len()
    }

    fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.col += 1;

        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_identifiers() {
        let src = "int void if else return intx main";

        let mut lexer = Lexer::new(src);
        let kinds: Vec<TokenType> = lexer.tokenize().map(|t| t.kind).collect();

        assert_eq!(
            kinds,
            vec![
                TokenType::Int,
                TokenType::Void,
                TokenType::If,
                TokenType::Else,
                TokenType::Return,
                TokenType::Identifier,
                TokenType::Identifier,
            ]
        );
    }

    #[test]
    fn two_char_operators() {
        let src = "<= >= == != && ||";

        let mut lexer = Lexer::new(src);
        let kinds: Vec<TokenType> = lexer.tokenize().map(|t| t.kind).collect();

        assert_eq!(
            kinds,
            vec![
                TokenType::LessEqual,
                TokenType::GreaterEqual,
                TokenType::EqualEqual,
                TokenType::BangEqual,
                TokenType::AmpAmp,
                TokenType::PipePipe,
            ]
        );
    }

    #[test]
    fn assign_is_not_equality() {
        let src = "a = b == c";

        let mut lexer = Lexer::new(src);
        let kinds: Vec<TokenType> = lexer.tokenize().map(|t| t.kind).collect();

        assert_eq!(
            kinds,
            vec![
                TokenType::Identifier,
                TokenType::Equal,
                TokenType::Identifier,
                TokenType::EqualEqual,
                TokenType::Identifier,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let src = "int a; // trailing comment\n/* block\n comment */ int b;";

        let mut lexer = Lexer::new(src);
        let kinds: Vec<TokenType> = lexer.tokenize().map(|t| t.kind).collect();

        assert_eq!(
            kinds,
            vec![
                TokenType::Int,
                TokenType::Identifier,
                TokenType::Semicolon,
                TokenType::Int,
                TokenType::Identifier,
                TokenType::Semicolon,
            ]
        );
    }

    #[test]
    fn line_tracking() {
        let src = "int a;\nint b;";

        let mut lexer = Lexer::new(src);
        let tokens: Vec<Token> = lexer.tokenize().collect();

        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[3].line, 2);
    }

    #[test]
    fn integer_constant_value() {
        let src = "return 42;";

        let mut lexer = Lexer::new(src);
        let tokens: Vec<Token> = lexer.tokenize().collect();

        assert_eq!(tokens[1].kind, TokenType::Constant);
        assert_eq!(tokens[1].value, TokenValue::Integer(42));
    }

    #[test]
    fn lone_ampersand_is_an_error_token() {
        let src = "a & b";

        let mut lexer = Lexer::new(src);
        let tokens: Vec<Token> = lexer.tokenize().collect();

        assert_eq!(tokens[1].kind, TokenType::Unknown);
        assert_eq!(
            tokens[1].value,
            TokenValue::Error(LexError::UnexpectedChar('&'))
        );
    }

    #[test]
    fn digits_flowing_into_letters() {
        let src = "123abc";

        let mut lexer = Lexer::new(src);
        let tokens: Vec<Token> = lexer.tokenize().collect();

        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenType::InvalidIdent);
        assert_eq!(tokens[0].lexeme(), "123abc");
    }

    #[test]
    fn brackets_are_lexed() {
        let src = "a[0]";

        let mut lexer = Lexer::new(src);
        let kinds: Vec<TokenType> = lexer.tokenize().map(|t| t.kind).collect();

        assert_eq!(
            kinds,
            vec![
                TokenType::Identifier,
                TokenType::OpenBracket,
                TokenType::Constant,
                TokenType::CloseBracket,
            ]
        );
    }
}
