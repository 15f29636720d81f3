//! Hand-written SQL tokenizer.

use super::token::{Comment, CommentKind, Parameter};
use super::{Keyword, Span, Token, TokenKind};

/// Splits SQL text into tokens, collecting comments on the side.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Start of the token being scanned.
    start: usize,
    comments: Vec<Comment>,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            comments: Vec::new(),
        }
    }

    /// Comments seen so far, in source order.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Consumes the lexer, returning the collected comments.
    #[must_use]
    pub fn into_comments(self) -> Vec<Comment> {
        self.comments
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.advance();
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            self.eat_while(char::is_whitespace);
            let at = self.pos;
            match (self.peek(), self.peek_next()) {
                (Some('-'), Some('-')) => {
                    self.eat_while(|c| c != '\n');
                    self.push_comment(CommentKind::Line, at, 2, 0);
                }
                (Some('#'), _) => {
                    self.eat_while(|c| c != '\n');
                    self.push_comment(CommentKind::Line, at, 1, 0);
                }
                (Some('/'), Some('*')) => {
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while let Some(c) = self.advance() {
                        if c == '*' && self.peek() == Some('/') {
                            self.advance();
                            closed = true;
                            break;
                        }
                    }
                    self.push_comment(CommentKind::Block, at, 2, if closed { 2 } else { 0 });
                }
                _ => break,
            }
        }
    }

    fn push_comment(&mut self, kind: CommentKind, at: usize, open: usize, close: usize) {
        let body = &self.input[at + open..self.pos - close];
        self.comments.push(Comment {
            kind,
            span: Span::new(at, self.pos),
            text: body.trim().to_string(),
        });
    }

    const fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    fn error(&self, message: impl Into<String>) -> Token {
        self.make_token(TokenKind::Error(message.into()))
    }

    fn scan_word(&mut self) -> Token {
        self.eat_while(|c| c.is_alphanumeric() || c == '_' || c == '$');
        let text = &self.input[self.start..self.pos];
        Keyword::from_str(text).map_or_else(
            || self.make_token(TokenKind::Identifier(text.to_string())),
            |kw| self.make_token(TokenKind::Keyword(kw)),
        )
    }

    /// Scans `"x"`, `` `x` `` or `[x]`; doubled closing quotes escape themselves.
    fn scan_quoted_identifier(&mut self, close: char) -> Token {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some(c) if c == close => {
                    if close != ']' && self.peek() == Some(close) {
                        self.advance();
                        value.push(close);
                    } else {
                        return self.make_token(TokenKind::QuotedIdentifier(value));
                    }
                }
                Some(c) => value.push(c),
                None => return self.error("unterminated quoted identifier"),
            }
        }
    }

    fn scan_string(&mut self) -> Token {
        let mut value = String::new();
        loop {
            match self.advance() {
                Some('\'') if self.peek() == Some('\'') => {
                    self.advance();
                    value.push('\'');
                }
                Some('\'') => return self.make_token(TokenKind::String(value)),
                Some(c) => value.push(c),
                None => return self.error("unterminated string literal"),
            }
        }
    }

    fn scan_blob(&mut self) -> Token {
        // X and the opening quote are already consumed.
        let content_start = self.pos;
        loop {
            match self.advance() {
                Some('\'') => break,
                Some(c) if c.is_ascii_hexdigit() => {}
                Some(_) => return self.error("invalid character in blob literal"),
                None => return self.error("unterminated blob literal"),
            }
        }
        let hex = &self.input[content_start..self.pos - 1];
        if hex.len() % 2 != 0 {
            return self.error("odd number of hex digits in blob literal");
        }
        let bytes = (0..hex.len())
            .step_by(2)
            .filter_map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
            .collect();
        self.make_token(TokenKind::Blob(bytes))
    }

    #[allow(clippy::cast_precision_loss)]
    fn scan_number(&mut self) -> Token {
        let first = self.input[self.start..].chars().next();
        if first == Some('0') && matches!(self.peek(), Some('x' | 'X')) {
            self.advance();
            self.eat_while(|c| c.is_ascii_hexdigit() || c == '_');
            let digits = self.input[self.start + 2..self.pos].replace('_', "");
            if digits.is_empty() {
                return self.error("hex literal without digits");
            }
            return match i64::from_str_radix(&digits, 16) {
                Ok(n) => self.make_token(TokenKind::Integer(n)),
                Err(_) => match u128::from_str_radix(&digits, 16) {
                    Ok(n) => self.make_token(TokenKind::Float(n as f64)),
                    Err(e) => self.error(format!("invalid hex literal: {e}")),
                },
            };
        }

        let mut is_float = first == Some('.');
        self.eat_while(|c| c.is_ascii_digit() || c == '_');
        if !is_float && self.peek() == Some('.') {
            is_float = true;
            self.advance();
            self.eat_while(|c| c.is_ascii_digit() || c == '_');
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exponent_follows = match self.peek_next() {
                Some('+' | '-') => true,
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if exponent_follows {
                is_float = true;
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.eat_while(|c| c.is_ascii_digit());
            }
        }

        let text = self.input[self.start..self.pos].replace('_', "");
        if !is_float {
            if let Ok(n) = text.parse::<i64>() {
                return self.make_token(TokenKind::Integer(n));
            }
        }
        match text.parse::<f64>() {
            Ok(f) => self.make_token(TokenKind::Float(f)),
            Err(e) => self.error(format!("invalid number {text}: {e}")),
        }
    }

    fn scan_parameter(&mut self, prefix: char) -> Token {
        if prefix == '?' {
            let digits_start = self.pos;
            self.eat_while(|c| c.is_ascii_digit());
            if self.pos == digits_start {
                return self.make_token(TokenKind::Parameter(Parameter::Anonymous));
            }
            return match self.input[digits_start..self.pos].parse::<u32>() {
                Ok(n) => self.make_token(TokenKind::Parameter(Parameter::Numbered(n))),
                Err(e) => self.error(format!("invalid parameter number: {e}")),
            };
        }

        let name_start = self.pos;
        self.eat_while(|c| c.is_alphanumeric() || c == '_');
        if self.pos == name_start {
            return self.error(format!("expected a parameter name after {prefix}"));
        }
        let name = self.input[name_start..self.pos].to_string();
        self.make_token(TokenKind::Parameter(Parameter::Named { prefix, name }))
    }

    /// Scans the next significant token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        self.start = self.pos;

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '+' => self.make_token(TokenKind::Plus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),
            '%' => self.make_token(TokenKind::Percent),
            '~' => self.make_token(TokenKind::BitNot),
            '&' => self.make_token(TokenKind::BitAnd),
            '-' => {
                if self.peek() == Some('>') {
                    self.advance();
                    if self.peek() == Some('>') {
                        self.advance();
                        return self.make_token(TokenKind::LongArrow);
                    }
                    return self.make_token(TokenKind::Arrow);
                }
                self.make_token(TokenKind::Minus)
            }
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            '.' => self.make_token(TokenKind::Dot),
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                }
                self.make_token(TokenKind::Eq)
            }
            '<' => match self.peek() {
                Some('=') => {
                    self.advance();
                    if self.peek() == Some('>') {
                        self.advance();
                        return self.make_token(TokenKind::NullSafeEq);
                    }
                    self.make_token(TokenKind::LtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                }
                Some('<') => {
                    self.advance();
                    self.make_token(TokenKind::LeftShift)
                }
                _ => self.make_token(TokenKind::Lt),
            },
            '>' => match self.peek() {
                Some('=') => {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                }
                Some('>') => {
                    self.advance();
                    self.make_token(TokenKind::RightShift)
                }
                _ => self.make_token(TokenKind::Gt),
            },
            '!' if self.peek() == Some('=') => {
                self.advance();
                self.make_token(TokenKind::NotEq)
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    return self.make_token(TokenKind::Concat);
                }
                self.make_token(TokenKind::BitOr)
            }
            ':' if self.peek() == Some(':') => {
                self.advance();
                self.make_token(TokenKind::DoubleColon)
            }
            '?' | ':' | '@' | '$' => self.scan_parameter(c),
            '\'' => self.scan_string(),
            '"' => self.scan_quoted_identifier('"'),
            '`' => self.scan_quoted_identifier('`'),
            '[' => self.scan_quoted_identifier(']'),
            'x' | 'X' if self.peek() == Some('\'') => {
                self.advance();
                self.scan_blob()
            }
            c if c.is_ascii_digit() => self.scan_number(),
            c if c.is_alphabetic() || c == '_' => self.scan_word(),
            c => self.error(format!("unexpected character: {c}")),
        }
    }

    /// Tokenizes the whole input; the last token is always `Eof`.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is_eof();
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }
}
