//! Literal values read from a token stream.
//!
//! Only the literal subset that shows up in descriptors is understood:
//! strings (with implicit concatenation), lists, tuples, dicts and
//! `dict(key=...)` calls. Anything else is kept as an opaque expression.

use super::lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Str(String),
    List(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    Expr(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Strings of a list value; a bare string counts as a one-element list.
    pub fn string_items(&self) -> Option<Vec<String>> {
        match self {
            Value::Str(s) => Some(vec![s.clone()]),
            Value::List(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Cursor over a token slice of the original source.
pub(crate) struct Cursor<'a> {
    src: &'a str,
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a str, tokens: &'a [Token]) -> Self {
        Self {
            src,
            tokens,
            pos: 0,
        }
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    pub fn peek_nth(&self, n: usize) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    pub fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Source text covered by tokens `from..self.pos`.
    pub fn text_since(&self, from: usize) -> &'a str {
        if from >= self.pos {
            return "";
        }
        let start = self.tokens[from].span.start;
        let end = self.tokens[self.pos - 1].span.end;
        self.src[start..end].trim()
    }

    /// Source text from the current token to the end of the logical line.
    pub fn rest_of_line(&mut self) -> &'a str {
        let from = self.pos;
        while !matches!(self.peek_kind(), None | Some(TokenKind::Newline)) {
            self.pos += 1;
        }
        self.text_since(from)
    }

    /// Skip to the next top-level `,` or newline, or the enclosing closer.
    pub fn skip_expression(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::Open(_) => depth += 1,
                TokenKind::Close(_) if depth == 0 => return,
                TokenKind::Close(_) => depth -= 1,
                TokenKind::Comma | TokenKind::Newline if depth == 0 => return,
                _ => {}
            }
            self.pos += 1;
        }
    }

    fn at_value_end(&self) -> bool {
        matches!(
            self.peek_kind(),
            None | Some(
                TokenKind::Comma | TokenKind::Newline | TokenKind::Close(_) | TokenKind::Colon
            )
        )
    }

    /// Parse one value. Never fails: unrecognized input becomes [`Value::Expr`].
    pub fn value(&mut self) -> Value {
        let start = self.pos;
        if let Some(value) = self.literal()
            && self.at_value_end()
        {
            return value;
        }
        self.pos = start;
        self.skip_expression();
        Value::Expr(self.text_since(start).to_string())
    }

    fn literal(&mut self) -> Option<Value> {
        match self.peek_kind()? {
            TokenKind::Str(_) => {
                let mut out = String::new();
                while let Some(TokenKind::Str(s)) = self.peek_kind() {
                    out.push_str(s);
                    self.pos += 1;
                }
                Some(Value::Str(out))
            }
            TokenKind::Open('[') => self.sequence(']').map(|(items, _)| Value::List(items)),
            TokenKind::Open('(') => {
                let (mut items, trailing_comma) = self.sequence(')')?;
                // `("a" "b")` is a parenthesized string, not a tuple.
                if items.len() == 1 && !trailing_comma {
                    items.pop()
                } else {
                    Some(Value::List(items))
                }
            }
            TokenKind::Open('{') => self.dict(),
            TokenKind::Ident(name)
                if name == "dict" && self.peek_nth(1) == Some(&TokenKind::Open('(')) =>
            {
                self.dict_call()
            }
            _ => None,
        }
    }

    fn sequence(&mut self, close: char) -> Option<(Vec<Value>, bool)> {
        self.pos += 1;
        let mut items = Vec::new();
        let mut trailing_comma = false;
        loop {
            match self.peek_kind()? {
                TokenKind::Close(c) if *c == close => {
                    self.pos += 1;
                    return Some((items, trailing_comma));
                }
                _ => {
                    items.push(self.value());
                    trailing_comma = false;
                }
            }
            match self.peek_kind()? {
                TokenKind::Comma => {
                    self.pos += 1;
                    trailing_comma = true;
                }
                TokenKind::Close(c) if *c == close => {}
                _ => return None,
            }
        }
    }

    fn dict(&mut self) -> Option<Value> {
        self.pos += 1;
        let mut entries = Vec::new();
        loop {
            if let TokenKind::Close('}') = self.peek_kind()? {
                self.pos += 1;
                return Some(Value::Dict(entries));
            }
            let key = self.value();
            if self.peek_kind()? != &TokenKind::Colon {
                return None;
            }
            self.pos += 1;
            let value = self.value();
            entries.push((key, value));
            match self.peek_kind()? {
                TokenKind::Comma => self.pos += 1,
                TokenKind::Close('}') => {}
                _ => return None,
            }
        }
    }

    /// `dict(console_scripts=[...])`
    fn dict_call(&mut self) -> Option<Value> {
        self.pos += 2;
        let mut entries = Vec::new();
        loop {
            match self.peek_kind()? {
                TokenKind::Close(')') => {
                    self.pos += 1;
                    return Some(Value::Dict(entries));
                }
                TokenKind::Ident(key) if self.peek_nth(1) == Some(&TokenKind::Equals) => {
                    let key = Value::Str(key.clone());
                    self.pos += 2;
                    entries.push((key, self.value()));
                }
                _ => return None,
            }
            match self.peek_kind()? {
                TokenKind::Comma => self.pos += 1,
                TokenKind::Close(')') => {}
                _ => return None,
            }
        }
    }
}
