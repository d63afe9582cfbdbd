use log::debug;
use std::ops::Range;

use super::{Descriptor, DescriptorError, EntryPointGroup};
use crate::syntax::{Cursor, Token, TokenKind, Value, tokenize};

/// Parse descriptor text into a [`Descriptor`].
///
/// Accepts flat `key=value` / `key: value` listings as well as source text
/// that contains a `setup(...)` call, in which case only the call's keyword
/// arguments are read (including `**name` arguments whose dict literal is
/// assigned earlier in the file). Missing keys take their defaults and unknown keys
/// are ignored. Fails only when the text cannot be tokenized or holds no
/// key/value pair at all.
pub fn parse_descriptor(text: &str) -> Result<Descriptor, DescriptorError> {
    if let Some(pairs) = read_colon_listing(text)? {
        return Ok(build(pairs));
    }

    let tokens = tokenize(text)?;

    let pairs = match find_setup_call(&tokens) {
        Some(args) => {
            debug!("Reading keyword arguments of setup() call");
            let mut pairs = splatted_pairs(text, &tokens, args.clone());
            pairs.extend(read_pairs(text, &tokens[args]));
            if pairs.is_empty() {
                debug!("setup() call has no readable arguments, reading the whole text");
                read_pairs(text, &tokens)
            } else {
                pairs
            }
        }
        None => read_pairs(text, &tokens),
    };

    if pairs.is_empty() {
        return Err(DescriptorError::malformed("no key/value pairs found"));
    }

    Ok(build(pairs))
}

/// Parse raw descriptor bytes. Input that is not UTF-8 text is malformed.
pub fn parse_descriptor_bytes(bytes: &[u8]) -> Result<Descriptor, DescriptorError> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        DescriptorError::malformed(format!("input is not UTF-8 text ({})", e))
    })?;
    parse_descriptor(text)
}

/// Read a listing whose first entry is `key: value` line by line from the
/// raw text. Plain values are the trimmed rest of the line, verbatim, so
/// quotes and `#` in free text survive. Values opening with a bracket or a
/// quote are read as literals and may continue onto following lines.
///
/// Returns `None` when the text is not such a listing.
fn read_colon_listing(text: &str) -> Result<Option<Vec<(String, Value)>>, DescriptorError> {
    let lines: Vec<&str> = text.lines().collect();
    let first = lines.iter().find(|line| {
        let line = line.trim_start_matches('\u{feff}').trim();
        !line.is_empty() && !line.starts_with('#')
    });
    if !first.is_some_and(|line| split_colon_key(line).is_some()) {
        return Ok(None);
    }

    if let Some((at, c)) = text
        .char_indices()
        .find(|&(_, c)| c.is_control() && !matches!(c, '\t' | '\n' | '\r' | '\x0c'))
    {
        return Err(DescriptorError::malformed(format!(
            "unexpected control character U+{:04X} at byte {}",
            c as u32, at
        )));
    }

    let mut pairs = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        i += 1;
        let Some((key, rest)) = split_colon_key(line) else {
            let trimmed = line.trim();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                debug!("Skipping non key/value line: {:?}", line);
            }
            continue;
        };

        let value = if rest.starts_with(['[', '{', '(', '\'', '"']) {
            let mut fragment = rest.to_string();
            let mut end = i;
            loop {
                if let Some(value) = literal(&fragment) {
                    i = end;
                    break value;
                }
                match lines.get(end) {
                    Some(next) if split_colon_key(next).is_none() => {
                        fragment.push('\n');
                        fragment.push_str(next);
                        end += 1;
                    }
                    _ => break Value::Str(rest.to_string()),
                }
            }
        } else {
            Value::Str(rest.to_string())
        };

        pairs.push((key.to_string(), value));
    }

    Ok(Some(pairs))
}

/// `key: rest` for an unindented line starting with an identifier and a colon.
fn split_colon_key(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start_matches('\u{feff}');
    let (key, rest) = line.split_once(':')?;
    let key = key.trim_end();
    let first = key.chars().next()?;
    if !(first.is_alphabetic() || first == '_')
        || !key.chars().all(|c| c.is_alphanumeric() || c == '_')
        || matches!(key, "try" | "else" | "finally")
    {
        return None;
    }
    Some((key, rest.trim()))
}

/// The whole of `text` as one literal value, if it is one.
fn literal(text: &str) -> Option<Value> {
    let tokens = tokenize(text).ok()?;
    let mut cursor = Cursor::new(text, &tokens);
    let value = cursor.value();
    while cursor.peek_kind() == Some(&TokenKind::Newline) {
        cursor.bump();
    }
    match value {
        Value::Expr(_) => None,
        value if cursor.is_done() => Some(value),
        _ => None,
    }
}

/// Token range holding the arguments of the first `setup(...)` call.
fn find_setup_call(tokens: &[Token]) -> Option<Range<usize>> {
    let open = (0..tokens.len().saturating_sub(1)).find(|&i| {
        tokens[i].is_ident("setup")
            && tokens[i + 1].kind == TokenKind::Open('(')
            && !(i > 0 && tokens[i - 1].is_ident("def"))
    })? + 1;

    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::Open(_) => depth += 1,
            TokenKind::Close(_) => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + 1..i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Keyword arguments passed as `**name`, resolved through the last top-level
/// `name = {...}` or `name = dict(...)` before the call.
fn splatted_pairs(src: &str, tokens: &[Token], args: Range<usize>) -> Vec<(String, Value)> {
    let mut pairs = Vec::new();
    let call = &tokens[args.clone()];

    for (i, window) in call.windows(3).enumerate() {
        let (TokenKind::Star, TokenKind::Star, TokenKind::Ident(name)) =
            (&window[0].kind, &window[1].kind, &window[2].kind)
        else {
            continue;
        };
        if i > 0 && call[i - 1].kind != TokenKind::Comma {
            continue;
        }

        let assignment = (0..args.start).rev().find(|&j| {
            tokens[j].is_ident(name)
                && (j == 0 || tokens[j - 1].kind == TokenKind::Newline)
                && tokens.get(j + 1).map(|t| &t.kind) == Some(&TokenKind::Equals)
                && tokens.get(j + 2).map(|t| &t.kind) != Some(&TokenKind::Equals)
        });
        let Some(j) = assignment else {
            debug!("Cannot resolve **{} passed to setup()", name);
            continue;
        };

        match Cursor::new(src, &tokens[j + 2..]).value() {
            Value::Dict(entries) => pairs.extend(
                entries
                    .into_iter()
                    .filter_map(|(key, value)| Some((key.as_str()?.to_string(), value))),
            ),
            other => debug!("**{} is not a dict literal: {:?}", name, other),
        }
    }

    pairs
}

fn read_pairs(src: &str, tokens: &[Token]) -> Vec<(String, Value)> {
    let mut cursor = Cursor::new(src, tokens);
    let mut pairs = Vec::new();

    loop {
        while matches!(
            cursor.peek_kind(),
            Some(TokenKind::Comma | TokenKind::Newline)
        ) {
            cursor.bump();
        }
        if cursor.is_done() {
            break;
        }

        let start = cursor.position();
        let key = match (cursor.peek_kind(), cursor.peek_nth(1), cursor.peek_nth(2)) {
            // `a == b` is a comparison, not an assignment
            (Some(TokenKind::Ident(_)), Some(TokenKind::Equals), Some(TokenKind::Equals)) => None,
            (Some(TokenKind::Ident(key)), Some(sep @ (TokenKind::Equals | TokenKind::Colon)), _) => {
                Some((key.clone(), sep.clone()))
            }
            _ => None,
        };

        let Some((key, sep)) = key else {
            cursor.skip_expression();
            debug!("Skipping non key/value text: {:?}", cursor.text_since(start));
            // A stray closer cannot be skipped by skip_expression.
            if cursor.position() == start {
                cursor.bump();
            }
            continue;
        };
        cursor.bump();
        cursor.bump();

        let value = if sep == TokenKind::Colon
            && !matches!(
                cursor.peek_kind(),
                Some(TokenKind::Str(_) | TokenKind::Open(_))
            ) {
            Value::Str(cursor.rest_of_line().to_string())
        } else {
            cursor.value()
        };

        if !matches!(
            cursor.peek_kind(),
            None | Some(TokenKind::Comma | TokenKind::Newline)
        ) {
            cursor.skip_expression();
            debug!("Ignoring trailing text after '{}'", key);
        }

        pairs.push((key, value));
    }

    pairs
}

fn build(pairs: Vec<(String, Value)>) -> Descriptor {
    let mut d = Descriptor::default();

    for (key, value) in pairs {
        match key.as_str() {
            "name" => match value {
                Value::Str(s) => d.name = Some(s),
                other => debug!("name is not a literal: {:?}", other),
            },
            "version" => set_string(&mut d.version, &key, value),
            "author" => set_string(&mut d.author, &key, value),
            "author_email" => set_string(&mut d.author_email, &key, value),
            "license" => set_string(&mut d.license, &key, value),
            "description" => set_string(&mut d.description, &key, value),
            "url" => set_string(&mut d.url, &key, value),
            "packages" => set_list(&mut d.packages, &key, value),
            "install_requires" => set_list(&mut d.install_requires, &key, value),
            "entry_points" => match entry_point_groups(&value) {
                Some(groups) => d.entry_points = groups,
                None => debug!("entry_points is not a literal: {:?}", value),
            },
            _ => debug!("Ignoring unknown key '{}'", key),
        }
    }

    d
}

fn set_string(field: &mut String, key: &str, value: Value) {
    match value {
        Value::Str(s) => *field = s,
        other => debug!("{} is not a string literal: {:?}", key, other),
    }
}

fn set_list(field: &mut Vec<String>, key: &str, value: Value) {
    match value.string_items() {
        Some(items) => *field = items,
        None => debug!("{} is not a list literal: {:?}", key, value),
    }
}

fn entry_point_groups(value: &Value) -> Option<Vec<EntryPointGroup>> {
    match value {
        Value::Dict(entries) => Some(
            entries
                .iter()
                .filter_map(|(group, specs)| {
                    Some(EntryPointGroup {
                        group: group.as_str()?.to_string(),
                        entries: specs.string_items()?,
                    })
                })
                .collect(),
        ),
        Value::Str(ini) => Some(entry_points_from_ini(ini)),
        _ => None,
    }
}

/// The `[group]\nname = target` string form of `entry_points`.
fn entry_points_from_ini(text: &str) -> Vec<EntryPointGroup> {
    let mut groups: Vec<EntryPointGroup> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(group) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            groups.push(EntryPointGroup {
                group: group.trim().to_string(),
                entries: Vec::new(),
            });
        } else if let Some(current) = groups.last_mut() {
            current.entries.push(line.to_string());
        } else {
            debug!("Entry point outside of a group: {}", line);
        }
    }
    groups
}
