//! Tokenizer for Python-flavoured key/value text.
//!
//! Newlines are only significant outside brackets, so the lexer drops them
//! while any bracket is open. Comments and `\`-continuations are skipped.

use std::ops::Range;

use crate::descriptor::DescriptorError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Str(String),
    Number(String),
    Open(char),
    Close(char),
    Comma,
    Equals,
    Colon,
    Dot,
    Star,
    Newline,
    Punct(char),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(s) if s == name)
    }
}

/// Deepest bracket nesting accepted. Values are read recursively, so this
/// bounds the reader's stack use.
const MAX_NESTING: usize = 100;

/// Tokenize `src`, failing only on input that is not text-shaped.
pub(crate) fn tokenize(src: &str) -> Result<Vec<Token>, DescriptorError> {
    Lexer::new(src).run()
}

struct Lexer<'a> {
    src: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    brackets: Vec<(char, usize)>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            chars: src.char_indices().collect(),
            pos: 0,
            brackets: Vec::new(),
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(i, _)| *i)
            .unwrap_or(self.src.len())
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let end = self.offset();
        self.tokens.push(Token {
            kind,
            span: start..end,
        });
    }

    fn run(mut self) -> Result<Vec<Token>, DescriptorError> {
        while let Some(c) = self.peek() {
            let start = self.offset();
            match c {
                ' ' | '\t' | '\r' | '\x0c' | '\u{feff}' => self.pos += 1,
                '\\' if matches!(self.peek_at(1), Some('\n')) => self.pos += 2,
                '\\' if self.peek_at(1) == Some('\r') && self.peek_at(2) == Some('\n') => {
                    self.pos += 3
                }
                '#' => {
                    while !matches!(self.peek(), None | Some('\n')) {
                        self.pos += 1;
                    }
                }
                '\n' => {
                    self.pos += 1;
                    if self.brackets.is_empty() {
                        self.push(TokenKind::Newline, start);
                    }
                }
                '\'' | '"' => {
                    let value = self.string(false)?;
                    self.push(TokenKind::Str(value), start);
                }
                '(' | '[' | '{' => {
                    if self.brackets.len() >= MAX_NESTING {
                        return Err(DescriptorError::malformed(format!(
                            "brackets nested deeper than {} at byte {}",
                            MAX_NESTING, start
                        )));
                    }
                    self.pos += 1;
                    self.brackets.push((c, start));
                    self.push(TokenKind::Open(c), start);
                }
                ')' | ']' | '}' => {
                    self.close_bracket(c, start)?;
                    self.pos += 1;
                    self.push(TokenKind::Close(c), start);
                }
                ',' => self.single(TokenKind::Comma, start),
                '=' => self.single(TokenKind::Equals, start),
                ':' => self.single(TokenKind::Colon, start),
                '.' => self.single(TokenKind::Dot, start),
                '*' => self.single(TokenKind::Star, start),
                c if c.is_ascii_digit() => {
                    while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '.' || c == '_')
                    {
                        self.pos += 1;
                    }
                    let text = self.src[start..self.offset()].to_string();
                    self.push(TokenKind::Number(text), start);
                }
                c if c.is_alphabetic() || c == '_' => self.word(start)?,
                c if c.is_control() => {
                    return Err(DescriptorError::malformed(format!(
                        "unexpected control character U+{:04X} at byte {}",
                        c as u32, start
                    )));
                }
                c => self.single(TokenKind::Punct(c), start),
            }
        }

        if let Some((open, at)) = self.brackets.last() {
            return Err(DescriptorError::malformed(format!(
                "unclosed '{}' opened at byte {}",
                open, at
            )));
        }

        Ok(self.tokens)
    }

    fn single(&mut self, kind: TokenKind, start: usize) {
        self.pos += 1;
        self.push(kind, start);
    }

    fn close_bracket(&mut self, close: char, at: usize) -> Result<(), DescriptorError> {
        let expected = match close {
            ')' => '(',
            ']' => '[',
            _ => '{',
        };
        match self.brackets.pop() {
            Some((open, _)) if open == expected => Ok(()),
            Some((open, _)) => Err(DescriptorError::malformed(format!(
                "mismatched '{}' at byte {} (expected closer for '{}')",
                close, at, open
            ))),
            None => Err(DescriptorError::malformed(format!(
                "unbalanced '{}' at byte {}",
                close, at
            ))),
        }
    }

    fn word(&mut self, start: usize) -> Result<(), DescriptorError> {
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word = &self.src[start..self.offset()];

        if matches!(self.peek(), Some('\'' | '"')) && is_string_prefix(word) {
            let raw = word.contains(['r', 'R']);
            let value = self.string(raw)?;
            self.push(TokenKind::Str(value), start);
        } else {
            self.push(TokenKind::Ident(word.to_string()), start);
        }
        Ok(())
    }

    /// Read a quoted string starting at the current quote character.
    fn string(&mut self, raw: bool) -> Result<String, DescriptorError> {
        let start = self.offset();
        let quote = self.peek().unwrap_or('\'');
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };

        let mut out = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(DescriptorError::malformed(format!(
                    "unterminated string starting at byte {}",
                    start
                )));
            };

            if c == quote {
                if !triple {
                    self.pos += 1;
                    return Ok(out);
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.pos += 3;
                    return Ok(out);
                }
            }

            match c {
                '\n' if !triple => {
                    return Err(DescriptorError::malformed(format!(
                        "unterminated string starting at byte {}",
                        start
                    )));
                }
                '\\' if raw => {
                    // A raw string still cannot end on an escaped quote.
                    out.push('\\');
                    self.pos += 1;
                    if let Some(next) = self.peek() {
                        out.push(next);
                        self.pos += 1;
                    }
                }
                '\\' => {
                    self.pos += 1;
                    self.escape(&mut out)?;
                }
                '\n' | '\t' | '\r' | '\x0c' => {
                    out.push(c);
                    self.pos += 1;
                }
                c if c.is_control() => {
                    return Err(DescriptorError::malformed(format!(
                        "unexpected control character U+{:04X} in string at byte {}",
                        c as u32,
                        self.offset()
                    )));
                }
                c => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), DescriptorError> {
        let Some(c) = self.peek() else {
            return Err(DescriptorError::malformed("dangling escape at end of input"));
        };
        self.pos += 1;
        match c {
            '\n' => {}
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '0' => out.push('\0'),
            '\\' | '\'' | '"' => out.push(c),
            'x' => out.push(self.hex_escape(2)?),
            'u' => out.push(self.hex_escape(4)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_escape(&mut self, digits: usize) -> Result<char, DescriptorError> {
        let at = self.offset();
        let mut value = 0u32;
        for _ in 0..digits {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| {
                    DescriptorError::malformed(format!("invalid hex escape at byte {}", at))
                })?;
            value = value * 16 + digit;
            self.pos += 1;
        }
        char::from_u32(value).ok_or_else(|| {
            DescriptorError::malformed(format!("invalid character escape at byte {}", at))
        })
    }
}

fn is_string_prefix(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "r" | "u" | "b" | "f" | "rb" | "br" | "fr" | "rf"
    )
}
