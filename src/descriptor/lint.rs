//! Descriptor validation.
//!
//! The reader never rejects a descriptor for its content; these checks
//! report what a package index would likely refuse or flag.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use super::Descriptor;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub field: &'static str,
    pub message: String,
}

impl Finding {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Error,
            field,
            message: message.into(),
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Finding {
            severity: Severity::Warning,
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.field, self.message)
    }
}

/// Check a descriptor, returning findings in field order.
pub fn lint(d: &Descriptor) -> Vec<Finding> {
    let mut findings = Vec::new();

    match d.name.as_deref() {
        None => findings.push(Finding::error("name", "descriptor has no name")),
        Some(name) if !is_valid_name(name) => findings.push(Finding::error(
            "name",
            format!(
                "'{}' must be ASCII letters, digits, '.', '_' or '-' and start and end alphanumeric",
                name
            ),
        )),
        Some(_) => {}
    }

    if !is_release_version(&d.version) {
        findings.push(Finding::warning(
            "version",
            format!("'{}' is not a dotted release version", d.version),
        ));
    }

    if d.author.trim().is_empty() {
        findings.push(Finding::warning("author", "author is empty"));
    }

    if !d.author_email.is_empty() && !d.author_email.contains('@') {
        findings.push(Finding::warning(
            "author_email",
            format!("'{}' does not look like an email address", d.author_email),
        ));
    }

    if d.license.trim().is_empty() {
        findings.push(Finding::warning("license", "license is empty"));
    }

    for dup in duplicates(&d.packages) {
        findings.push(Finding::warning(
            "packages",
            format!("'{}' is listed more than once", dup),
        ));
    }

    for dup in duplicates(&d.install_requires) {
        findings.push(Finding::warning(
            "install_requires",
            format!("'{}' is listed more than once", dup),
        ));
    }

    findings
}

fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
        }
        _ => false,
    }
}

/// `N(.N)*` with optional `aN`/`bN`/`rcN`, `.postN` and `.devN` suffixes.
fn is_release_version(version: &str) -> bool {
    let version = version.strip_prefix('v').unwrap_or(version);

    let mut release_end = version
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(version.len());
    // "1.0.post1": the dot belongs to the suffix
    if release_end < version.len() && version[..release_end].ends_with('.') {
        release_end -= 1;
    }
    let (release, mut rest) = version.split_at(release_end);
    if release.is_empty() || release.split('.').any(|part| part.is_empty()) {
        return false;
    }

    for prefix in ["rc", "a", "b"] {
        if let Some(tail) = rest.strip_prefix(prefix) {
            rest = strip_number(tail);
            break;
        }
    }
    if let Some(tail) = rest.strip_prefix(".post") {
        rest = strip_number(tail);
    }
    if let Some(tail) = rest.strip_prefix(".dev") {
        rest = strip_number(tail);
    }
    rest.is_empty()
}

fn strip_number(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn duplicates(items: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    items
        .iter()
        .filter(|item| !seen.insert(item.as_str()) && reported.insert(item.as_str()))
        .map(String::as_str)
        .collect()
}
