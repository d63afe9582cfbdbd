//! Shared tokenizer and literal reader for descriptor and entry-module text.

mod lexer;
mod value;

pub(crate) use lexer::{Token, TokenKind, tokenize};
pub(crate) use value::{Cursor, Value};
