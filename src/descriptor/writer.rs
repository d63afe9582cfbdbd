use std::fmt::Write;

use super::{Descriptor, EntryPointGroup};

/// Render a descriptor as a flat `key=value` listing.
///
/// Field order is fixed (name, version, author, author_email, license,
/// description, url, packages, install_requires, entry_points) so output is
/// reproducible. `name` is left out for anonymous descriptors.
pub fn render_descriptor(d: &Descriptor) -> String {
    let mut out = String::new();
    for (key, value) in fields(d) {
        let _ = writeln!(out, "{}={}", key, value);
    }
    out
}

/// Render a descriptor as a complete `setup.py`.
pub fn render_setup_py(d: &Descriptor) -> String {
    let mut out = String::from("from setuptools import setup\n\nsetup(\n");
    for (key, value) in fields(d) {
        let _ = writeln!(out, "    {}={},", key, value);
    }
    out.push_str(")\n");
    out
}

fn fields(d: &Descriptor) -> Vec<(&'static str, String)> {
    let mut fields = Vec::with_capacity(10);
    if let Some(name) = &d.name {
        fields.push(("name", quote(name)));
    }
    fields.extend([
        ("version", quote(&d.version)),
        ("author", quote(&d.author)),
        ("author_email", quote(&d.author_email)),
        ("license", quote(&d.license)),
        ("description", quote(&d.description)),
        ("url", quote(&d.url)),
        ("packages", list(&d.packages)),
        ("install_requires", list(&d.install_requires)),
        ("entry_points", entry_points(&d.entry_points)),
    ]);
    fields
}

fn list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| quote(s)).collect();
    format!("[{}]", quoted.join(", "))
}

fn entry_points(groups: &[EntryPointGroup]) -> String {
    let rendered: Vec<String> = groups
        .iter()
        .map(|g| format!("{}: {}", quote(&g.group), list(&g.entries)))
        .collect();
    format!("{{{}}}", rendered.join(", "))
}

/// Single-quoted string literal that the reader decodes back to `s`.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x100 && c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            '\u{feff}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DEFAULT_VERSION, parse_descriptor};

    fn full() -> Descriptor {
        Descriptor {
            name: Some("sample".into()),
            version: "1.2.3".into(),
            author: "Ada O'Neil".into(),
            author_email: "ada@example.com".into(),
            license: "MIT".into(),
            description: "Line one\nLine two\twith tab \\ slash\u{7f}".into(),
            url: "https://example.com/sample".into(),
            packages: vec!["sample".into(), "sample.sub".into()],
            install_requires: vec!["c".into(), "a>=1".into(), "b; python_version<'3'".into()],
            entry_points: vec![EntryPointGroup {
                group: "console_scripts".into(),
                entries: vec!["sample = sample.cli:main".into()],
            }],
        }
    }

    #[test]
    fn test_render_field_order() {
        let text = render_descriptor(&Descriptor::named("sample"));
        let keys: Vec<&str> = text
            .lines()
            .map(|l| l.split_once('=').unwrap().0)
            .collect();
        assert_eq!(
            keys,
            vec![
                "name",
                "version",
                "author",
                "author_email",
                "license",
                "description",
                "url",
                "packages",
                "install_requires",
                "entry_points"
            ]
        );
        assert!(text.contains(&format!("version='{}'", DEFAULT_VERSION)));
    }

    #[test]
    fn test_render_anonymous_omits_name() {
        let text = render_descriptor(&Descriptor::default());
        assert!(!text.contains("name="));
        assert!(text.starts_with("version='0.0.0'\n"));
    }

    #[test]
    fn test_round_trip() {
        for d in [full(), Descriptor::default(), Descriptor::named("")] {
            assert_eq!(parse_descriptor(&render_descriptor(&d)).unwrap(), d);
        }
    }

    #[test]
    fn test_round_trip_setup_py() {
        let d = full();
        let text = render_setup_py(&d);
        assert!(text.starts_with("from setuptools import setup\n\nsetup(\n    name='sample',\n"));
        assert_eq!(parse_descriptor(&text).unwrap(), d);
    }

    #[test]
    fn test_idempotence() {
        let rendered = render_descriptor(&full());
        let again = render_descriptor(&parse_descriptor(&rendered).unwrap());
        assert_eq!(again, rendered);
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("it's"), r"'it\'s'");
        assert_eq!(quote("a\\b"), r"'a\\b'");
        assert_eq!(quote("\u{1}"), r"'\x01'");
        assert_eq!(quote("\u{85}"), r"'\x85'");
    }

    #[test]
    fn test_render_lists() {
        let d = Descriptor {
            install_requires: vec!["a".into(), "b".into(), "c".into()],
            ..Default::default()
        };
        assert!(render_descriptor(&d).contains("install_requires=['a', 'b', 'c']\n"));
    }
}
