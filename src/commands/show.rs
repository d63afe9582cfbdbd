use anyhow::Result;
use log::debug;
use std::fmt::Write;
use std::path::Path;

use crate::{descriptor::Descriptor, package::load_descriptor, runtime::Runtime};

use super::config::{Config, OutputFormat};
use super::parse::format_descriptor;

/// Show detailed information about a descriptor
#[tracing::instrument(skip(config))]
pub fn show<R: Runtime>(config: &Config<R>, path: &Path) -> Result<()> {
    debug!("Showing info for {:?}", path);
    let descriptor = load_descriptor(&config.runtime, path)?;

    match config.format {
        OutputFormat::Text => print!("{}", format_summary(&descriptor, path)),
        OutputFormat::Json => print!("{}", format_descriptor(&descriptor, OutputFormat::Json)?),
    }
    Ok(())
}

pub(crate) fn format_summary(d: &Descriptor, path: &Path) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Package: {}", d.display_name());
    let _ = writeln!(out, "Version: {}", d.version);
    let _ = writeln!(out, "Source: {}", path.display());

    if !d.description.is_empty() {
        let _ = writeln!(out, "\nDescription: {}", d.description);
    }

    if !d.author.is_empty() {
        if d.author_email.is_empty() {
            let _ = writeln!(out, "Author: {}", d.author);
        } else {
            let _ = writeln!(out, "Author: {} <{}>", d.author, d.author_email);
        }
    } else if !d.author_email.is_empty() {
        let _ = writeln!(out, "Author: <{}>", d.author_email);
    }

    if !d.license.is_empty() {
        let _ = writeln!(out, "License: {}", d.license);
    }

    if !d.url.is_empty() {
        let _ = writeln!(out, "Homepage: {}", d.url);
    }

    let _ = writeln!(out, "\nPackages:");
    write_items(&mut out, &d.packages);

    let _ = writeln!(out, "\nDependencies:");
    write_items(&mut out, &d.install_requires);

    if !d.entry_points.is_empty() {
        let _ = writeln!(out, "\nEntry points:");
        for group in &d.entry_points {
            let _ = writeln!(out, "  [{}]", group.group);
            for entry in &group.entries {
                let _ = writeln!(out, "    {}", entry);
            }
        }
    }

    out
}

fn write_items(out: &mut String, items: &[String]) {
    if items.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for item in items {
        let _ = writeln!(out, "  {}", item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::EntryPointGroup;

    #[test]
    fn test_summary_full() {
        let d = Descriptor {
            name: Some("htv".into()),
            version: "0.1.6".into(),
            author: "Jane".into(),
            author_email: "jane@example.com".into(),
            license: "MIT".into(),
            description: "HTML validator".into(),
            url: "https://example.com".into(),
            packages: vec!["htvalidator".into()],
            install_requires: vec!["requests".into()],
            entry_points: vec![EntryPointGroup {
                group: "console_scripts".into(),
                entries: vec!["htv = htvalidator.cli:main".into()],
            }],
        };
        let out = format_summary(&d, Path::new("/src/htv/setup.py"));

        assert!(out.starts_with("Package: htv\nVersion: 0.1.6\nSource: /src/htv/setup.py\n"));
        assert!(out.contains("Author: Jane <jane@example.com>\n"));
        assert!(out.contains("License: MIT\n"));
        assert!(out.contains("Homepage: https://example.com\n"));
        assert!(out.contains("\nDependencies:\n  requests\n"));
        assert!(out.contains("  [console_scripts]\n    htv = htvalidator.cli:main\n"));
    }

    #[test]
    fn test_summary_minimal() {
        let out = format_summary(&Descriptor::default(), Path::new("x.pkgdesc"));
        assert!(out.starts_with("Package: (anonymous)\nVersion: 0.0.0\n"));
        assert!(out.contains("\nPackages:\n  (none)\n"));
        assert!(out.contains("\nDependencies:\n  (none)\n"));
        assert!(!out.contains("License:"));
        assert!(!out.contains("Entry points:"));
    }
}
