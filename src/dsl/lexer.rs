//! Lexer (tokenizer) for the netlist language.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{GradspiceError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the netlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// An identifier (element name, node name, keyword)
    Identifier,
    /// A number, possibly with a unit suffix
    Number,
    /// A directive (starts with '.')
    Directive,
    Newline,
    Eof,
}

/// Unit suffixes accepted after a number.
const SUFFIXES: [char; 9] = ['p', 'n', 'u', 'µ', 'm', 'k', 'K', 'M', 'G'];

/// Lexer for tokenizing netlist input.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let line = self.line;
        let column = self.column;
        let token = |kind, text| Token {
            kind,
            text,
            line,
            column,
        };

        let Some(&ch) = self.chars.peek() else {
            return Ok(token(TokenKind::Eof, String::new()));
        };

        match ch {
            '\n' => {
                self.advance();
                Ok(token(TokenKind::Newline, "\n".to_string()))
            }
            '.' => {
                self.advance();
                let name = self.read_identifier();
                if name.is_empty() {
                    return Err(GradspiceError::lexer(line, column, "empty directive name"));
                }
                Ok(token(TokenKind::Directive, format!(".{name}")))
            }
            '-' | '+' | '0'..='9' => {
                let text = self.read_number();
                // A bare sign, or digits running into letters ("1abc"), is not a number
                match self.chars.peek().copied() {
                    Some(c) if c.is_alphanumeric() || c == '_' => {
                        let rest = self.read_identifier();
                        Err(GradspiceError::lexer(
                            line,
                            column,
                            format!("malformed number '{text}{rest}'"),
                        ))
                    }
                    _ if !text.chars().any(|c| c.is_ascii_digit()) => Err(GradspiceError::lexer(
                        line,
                        column,
                        format!("malformed number '{text}'"),
                    )),
                    _ => Ok(token(TokenKind::Number, text)),
                }
            }
            _ if ch.is_alphabetic() || ch == '_' => {
                let text = self.read_identifier();
                Ok(token(TokenKind::Identifier, text))
            }
            _ => Err(GradspiceError::lexer(
                line,
                column,
                format!("unexpected character '{ch}'"),
            )),
        }
    }

    /// Collect every token up to and including [`TokenKind::Eof`].
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

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn advance_if(&mut self, accept: impl Fn(char) -> bool) -> Option<char> {
        match self.chars.peek() {
            Some(&ch) if accept(ch) => self.advance(),
            _ => None,
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else if ch == '#' || ch == ';' {
                while self.advance_if(|c| c != '\n').is_some() {}
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.advance_if(|c| c.is_alphanumeric() || c == '_') {
            text.push(ch);
        }
        text
    }

    fn read_digits(&mut self, text: &mut String) {
        while let Some(ch) = self.advance_if(|c| c.is_ascii_digit()) {
            text.push(ch);
        }
    }

    fn read_number(&mut self) -> String {
        let mut text = String::new();

        if let Some(sign) = self.advance_if(|c| c == '-' || c == '+') {
            text.push(sign);
        }
        self.read_digits(&mut text);

        if let Some(dot) = self.advance_if(|c| c == '.') {
            text.push(dot);
            self.read_digits(&mut text);
        }

        if let Some(e) = self.advance_if(|c| c == 'e' || c == 'E') {
            text.push(e);
            if let Some(sign) = self.advance_if(|c| c == '-' || c == '+') {
                text.push(sign);
            }
            self.read_digits(&mut text);
        }

        if let Some(suffix) = self.advance_if(|c| SUFFIXES.contains(&c)) {
            text.push(suffix);
        }

        text
    }
}

/// Parse a number string with optional unit suffix.
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    let last = text.chars().last()?;

    let multiplier = match last {
        'p' => 1e-12,
        'n' => 1e-9,
        'u' | 'µ' => 1e-6,
        'm' => 1e-3,
        'k' | 'K' => 1e3,
        'M' => 1e6,
        'G' => 1e9,
        _ => return text.parse::<f64>().ok(),
    };

    text[..text.len() - last.len_utf8()]
        .parse::<f64>()
        .ok()
        .map(|v| v * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_parse_value() {
        assert_relative_eq!(parse_value("10k").unwrap(), 10_000.0);
        assert_relative_eq!(parse_value("100n").unwrap(), 100e-9);
        assert_relative_eq!(parse_value("4.7u").unwrap(), 4.7e-6);
        assert_relative_eq!(parse_value("1M").unwrap(), 1_000_000.0);
        assert_relative_eq!(parse_value("2.2").unwrap(), 2.2);
        assert_relative_eq!(parse_value("1e-9").unwrap(), 1e-9);
        assert_relative_eq!(parse_value("-1.5").unwrap(), -1.5);
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("k"), None);
    }

    #[test]
    fn test_lexer_element_line() {
        let tokens = Lexer::new("R1 in out 10k").tokenize().unwrap();
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["R1", "in", "out", "10k", ""]);
        assert_eq!(tokens[3].kind, TokenKind::Number);
        assert_eq!(tokens[3].column, 11);
    }

    #[test]
    fn test_lexer_directive_and_comments() {
        assert_eq!(
            kinds(".tstep 1m # step\n; whole line\nB1 0 1 1.5"),
            vec![
                TokenKind::Directive,
                TokenKind::Number,
                TokenKind::Newline,
                TokenKind::Newline,
                TokenKind::Identifier,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_tracks_lines() {
        let tokens = Lexer::new("R1 a b 1\n\nC1 b 0 1u").tokenize().unwrap();
        let c1 = tokens.iter().find(|t| t.text == "C1").unwrap();
        assert_eq!((c1.line, c1.column), (3, 1));
    }

    #[test]
    fn test_lexer_errors() {
        let err = Lexer::new("R1 a b 10x").tokenize().unwrap_err();
        assert!(matches!(err, GradspiceError::LexerError { line: 1, column: 8, .. }));

        let err = Lexer::new("R1 a @ 1").tokenize().unwrap_err();
        assert!(matches!(err, GradspiceError::LexerError { column: 6, .. }));

        assert!(Lexer::new("R1 a b -").tokenize().is_err());
    }
}
