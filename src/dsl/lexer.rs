//! Lexer (tokenizer) for the score DSL.

use crate::error::{CsgError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text (symbols are stored without the leading ':')
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A keyword, p-field reference, converter or option name
    Identifier,
    /// An unsigned integer literal
    Integer,
    /// An unsigned floating point literal
    Float,
    /// A Ruby-style symbol (`:thickness`)
    Symbol,
    /// Comma ','
    Comma,
    /// Plus '+'
    Plus,
    /// Minus '-'
    Minus,
    /// Star '*'
    Star,
    /// Slash '/'
    Slash,
    /// Open parenthesis '('
    OpenParen,
    /// Close parenthesis ')'
    CloseParen,
    /// Open brace '{'
    OpenBrace,
    /// Close brace '}'
    CloseBrace,
    /// Option arrow '=>'
    FatArrow,
    /// Statement separator ';'
    Semicolon,
    /// Newline
    Newline,
    /// End of file
    Eof,
}

impl TokenKind {
    /// Human-readable name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Integer => "integer",
            Self::Float => "number",
            Self::Symbol => "symbol",
            Self::Comma => "','",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::OpenParen => "'('",
            Self::CloseParen => "')'",
            Self::OpenBrace => "'{'",
            Self::CloseBrace => "'}'",
            Self::FatArrow => "'=>'",
            Self::Semicolon => "';'",
            Self::Newline => "end of line",
            Self::Eof => "end of input",
        }
    }
}

/// Lexer for tokenizing score DSL input.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let start_line = self.line;
        let start_column = self.column;

        let ch = match self.peek_char() {
            Some(ch) => ch,
            None => return Ok(self.token(TokenKind::Eof, String::new(), start_line, start_column)),
        };

        let single = match ch {
            '\n' => Some(TokenKind::Newline),
            ',' => Some(TokenKind::Comma),
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            '{' => Some(TokenKind::OpenBrace),
            '}' => Some(TokenKind::CloseBrace),
            ';' => Some(TokenKind::Semicolon),
            _ => None,
        };
        if let Some(kind) = single {
            self.advance();
            return Ok(self.token(kind, ch.to_string(), start_line, start_column));
        }

        let token = match ch {
            '=' => {
                self.advance();
                if self.peek_char() != Some('>') {
                    return Err(CsgError::syntax(
                        start_line,
                        start_column,
                        "expected '=>' after '='",
                    ));
                }
                self.advance();
                self.token(TokenKind::FatArrow, "=>".to_string(), start_line, start_column)
            }
            ':' => {
                self.advance();
                let name = self.read_identifier();
                if name.is_empty() {
                    return Err(CsgError::syntax(
                        start_line,
                        start_column,
                        "expected a symbol name after ':'",
                    ));
                }
                self.token(TokenKind::Symbol, name, start_line, start_column)
            }
            '0'..='9' => {
                let (text, is_float) = self.read_number();
                let kind = if is_float {
                    TokenKind::Float
                } else {
                    TokenKind::Integer
                };
                self.token(kind, text, start_line, start_column)
            }
            _ if ch.is_alphabetic() || ch == '_' => {
                let text = self.read_identifier();
                self.token(TokenKind::Identifier, text, start_line, start_column)
            }
            _ => {
                return Err(CsgError::syntax(
                    start_line,
                    start_column,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };

        Ok(token)
    }

    /// Tokenize the remaining input, including the trailing `Eof` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn token(&self, kind: TokenKind, text: String, line: usize, column: usize) -> Token {
        Token {
            kind,
            text,
            line,
            column,
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn peek_second(&self) -> Option<char> {
        let mut ahead = self.chars.clone();
        ahead.next();
        ahead.next().map(|(_, ch)| ch)
    }

    /// Length of a `\` line continuation at the cursor, or 0 if there is none.
    fn continuation_len(&self) -> usize {
        let mut ahead = self.chars.clone().map(|(_, ch)| ch);
        match (ahead.next(), ahead.next(), ahead.next()) {
            (Some('\\'), Some('\n'), _) => 2,
            (Some('\\'), Some('\r'), Some('\n')) => 3,
            _ => 0,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else if ch == '\\' && self.continuation_len() > 0 {
                // Explicit line continuation, LF or CRLF
                let len = self.continuation_len();
                for _ in 0..len {
                    self.advance();
                }
            } else if ch == '#' {
                while let Some(c) = self.peek_char() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }

    fn read_digits(&mut self, text: &mut String) {
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> (String, bool) {
        let mut text = String::new();
        let mut is_float = false;

        self.read_digits(&mut text);

        // Decimal part; a '.' not followed by a digit is left alone
        if self.peek_char() == Some('.') && self.peek_second().map_or(false, |c| c.is_ascii_digit())
        {
            is_float = true;
            text.push('.');
            self.advance();
            self.read_digits(&mut text);
        }

        // Exponent part
        if let Some(e @ ('e' | 'E')) = self.peek_char() {
            let mut ahead = self.chars.clone();
            ahead.next();
            let next = ahead.next().map(|(_, c)| c);
            let after_sign = ahead.next().map(|(_, c)| c);
            let has_exponent = match next {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => after_sign.map_or(false, |c| c.is_ascii_digit()),
                _ => false,
            };
            if has_exponent {
                is_float = true;
                text.push(e);
                self.advance();
                if let Some(sign @ ('+' | '-')) = self.peek_char() {
                    text.push(sign);
                    self.advance();
                }
                self.read_digits(&mut text);
            }
        }

        (text, is_float)
    }
}
