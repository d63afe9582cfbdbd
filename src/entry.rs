//! Package entry modules.
//!
//! An entry module is the `__init__`-style file a consumer imports. It
//! typically re-exports names from submodules (`from .client import Client`),
//! may pin its public surface with `__all__`, and often carries
//! `__version__`. Everything else in the file is skipped.

use log::debug;
use serde::Serialize;

use crate::descriptor::DescriptorError;
use crate::syntax::{Cursor, TokenKind, Value, tokenize};

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryModule {
    pub version: Option<String>,
    pub all: Option<Vec<String>>,
    pub imports: Vec<Reexport>,
}

/// One `from <module> import ...` statement.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Reexport {
    /// Module path as written, including leading dots for relative imports.
    pub module: String,
    pub names: Vec<ImportedName>,
    /// `from module import *`
    pub glob: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedName {
    /// Name the import binds in the entry module.
    pub fn binding(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

impl Reexport {
    pub fn is_relative(&self) -> bool {
        self.module.starts_with('.')
    }
}

impl EntryModule {
    /// Public names of the module: `__all__` when declared, otherwise every
    /// imported binding that does not start with an underscore.
    pub fn exports(&self) -> Vec<&str> {
        if let Some(all) = &self.all {
            return all.iter().map(String::as_str).collect();
        }
        self.imports
            .iter()
            .flat_map(|r| r.names.iter().map(ImportedName::binding))
            .filter(|name| !name.starts_with('_'))
            .collect()
    }
}

/// Read the re-export surface of an entry module.
///
/// Unrecognized statements are skipped; only text that cannot be tokenized
/// is rejected.
pub fn parse_entry_module(text: &str) -> Result<EntryModule, DescriptorError> {
    let tokens = tokenize(text)?;
    let mut cursor = Cursor::new(text, &tokens);
    let mut module = EntryModule::default();

    while !cursor.is_done() {
        let statement_start = cursor.position();
        let top_level = cursor
            .peek()
            .is_some_and(|t| starts_unindented_line(text, t.span.start));
        match cursor.peek_kind() {
            // nested in a def, class or if block
            _ if !top_level => {}
            Some(TokenKind::Ident(word)) if word == "from" => {
                cursor.bump();
                if let Some(reexport) = read_from_import(&mut cursor) {
                    module.imports.push(reexport);
                }
            }
            Some(TokenKind::Ident(word)) if word == "__all__" => {
                cursor.bump();
                read_all(&mut cursor, &mut module);
            }
            Some(TokenKind::Ident(word))
                if word == "__version__" && cursor.peek_nth(1) == Some(&TokenKind::Equals) =>
            {
                cursor.bump();
                cursor.bump();
                match cursor.value() {
                    Value::Str(v) => module.version = Some(v),
                    other => debug!("__version__ is not a literal: {:?}", other),
                }
            }
            _ => {}
        }
        skip_statement(&mut cursor);
        if cursor.position() == statement_start {
            cursor.bump();
        }
    }

    Ok(module)
}

/// Whether the physical line holding `offset` begins without indentation.
fn starts_unindented_line(text: &str, offset: usize) -> bool {
    let line_start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line = text[line_start..].trim_start_matches('\u{feff}');
    !line.starts_with([' ', '\t', '\x0c'])
}

fn skip_statement(cursor: &mut Cursor<'_>) {
    while let Some(kind) = cursor.peek_kind() {
        cursor.bump();
        if matches!(kind, TokenKind::Newline | TokenKind::Punct(';')) {
            break;
        }
    }
}

fn read_from_import(cursor: &mut Cursor<'_>) -> Option<Reexport> {
    let mut path = String::new();
    loop {
        match cursor.peek_kind()? {
            TokenKind::Dot => path.push('.'),
            TokenKind::Ident(part) if part != "import" => path.push_str(part),
            _ => break,
        }
        cursor.bump();
    }
    if path.is_empty() || path == "__future__" || !cursor.peek()?.is_ident("import") {
        return None;
    }
    cursor.bump();

    if cursor.peek_kind()? == &TokenKind::Star {
        cursor.bump();
        return Some(Reexport {
            module: path,
            names: Vec::new(),
            glob: true,
        });
    }

    let parenthesized = cursor.peek_kind()? == &TokenKind::Open('(');
    if parenthesized {
        cursor.bump();
    }

    let mut names = Vec::new();
    while let Some(TokenKind::Ident(name)) = cursor.peek_kind() {
        cursor.bump();
        let alias = if cursor.peek().is_some_and(|t| t.is_ident("as")) {
            cursor.bump();
            match cursor.bump().map(|t| &t.kind) {
                Some(TokenKind::Ident(alias)) => Some(alias.clone()),
                _ => return None,
            }
        } else {
            None
        };
        names.push(ImportedName {
            name: name.clone(),
            alias,
        });
        if cursor.peek_kind() == Some(&TokenKind::Comma) {
            cursor.bump();
        } else {
            break;
        }
    }

    if parenthesized {
        if cursor.peek_kind() != Some(&TokenKind::Close(')')) {
            return None;
        }
        cursor.bump();
    }

    if names.is_empty() {
        return None;
    }
    Some(Reexport {
        module: path,
        names,
        glob: false,
    })
}

/// `__all__ = [...]` replaces, `__all__ += [...]` extends.
fn read_all(cursor: &mut Cursor<'_>, module: &mut EntryModule) {
    let extend = match (cursor.peek_kind(), cursor.peek_nth(1)) {
        (Some(TokenKind::Equals), _) => {
            cursor.bump();
            false
        }
        (Some(TokenKind::Punct('+')), Some(TokenKind::Equals)) => {
            cursor.bump();
            cursor.bump();
            true
        }
        _ => return,
    };

    let value = cursor.value();
    let names = match &value {
        Value::List(_) => value.string_items().unwrap_or_default(),
        other => {
            debug!("__all__ is not a literal list: {:?}", other);
            return;
        }
    };

    match (&mut module.all, extend) {
        (Some(all), true) => all.extend(names),
        (all, _) => *all = Some(names),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INIT: &str = r#"
"""Route53 constructs."""
import abc
import jsii

from jsii.python import classproperty
from ._jsii import *
from .records import (
    AliasRecord,
    CnameRecord as Cname,
)
from . import _internal, util; from .. import parent

__version__ = "0.33.0"

class HostedZone(object):
    def __init__(self):
        from .lazy import helper

__all__ = ["AliasRecord", "Cname", "HostedZone"]
__all__ += ("__jsii_assembly__",)
"#;

    #[test]
    fn test_parse_entry_module() {
        let m = parse_entry_module(INIT).unwrap();
        assert_eq!(m.version.as_deref(), Some("0.33.0"));
        assert_eq!(
            m.all,
            Some(vec![
                "AliasRecord".to_string(),
                "Cname".to_string(),
                "HostedZone".to_string(),
                "__jsii_assembly__".to_string(),
            ])
        );

        let modules: Vec<_> = m.imports.iter().map(|r| r.module.as_str()).collect();
        assert_eq!(
            modules,
            vec!["jsii.python", "._jsii", ".records", ".", ".."]
        );
        assert!(m.imports[1].glob);
        assert_eq!(m.imports[2].names[1].binding(), "Cname");
        assert_eq!(m.imports[2].names[1].name, "CnameRecord");
        assert!(m.imports[2].is_relative());
        assert!(!m.imports[0].is_relative());
    }

    #[test]
    fn test_exports_prefer_all() {
        let m = parse_entry_module(INIT).unwrap();
        assert_eq!(m.exports().len(), 4);
    }

    #[test]
    fn test_exports_without_all() {
        let m = parse_entry_module(
            "from .core import Engine, _private\nfrom .util import fmt as format_value\n",
        )
        .unwrap();
        assert_eq!(m.all, None);
        assert_eq!(m.exports(), vec!["Engine", "format_value"]);
    }

    #[test]
    fn test_nested_imports_are_not_reexports() {
        let m = parse_entry_module(
            "from .core import Engine\n\ndef serve():\n    from .bert.extract_features import convert_lst_to_features\n    __version__ = 'inner'\n\nif True:\n\tfrom .debug import trace\n",
        )
        .unwrap();
        assert_eq!(m.exports(), vec!["Engine"]);
        assert_eq!(m.imports.len(), 1);
        assert_eq!(m.version, None);
    }

    #[test]
    fn test_empty_module() {
        assert_eq!(parse_entry_module("").unwrap(), EntryModule::default());
    }

    #[test]
    fn test_non_literal_version_ignored() {
        let m = parse_entry_module("__version__ = get_version()\n").unwrap();
        assert_eq!(m.version, None);
    }

    #[test]
    fn test_untokenizable_module_is_malformed() {
        let err = parse_entry_module("__all__ = ['a'\n").unwrap_err();
        assert!(err.is_malformed());
    }
}
