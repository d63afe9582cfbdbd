//! Core metadata (`PKG-INFO` in sdists, `METADATA` in wheels).
//!
//! The format is a block of RFC 822 style `Header: value` lines, ended by a
//! blank line. Headers may repeat (`Requires-Dist`) and long values continue
//! on lines that start with whitespace.

use log::debug;

use super::{Descriptor, DescriptorError};

/// Old setuptools writes this for fields that were never set.
const UNKNOWN: &str = "UNKNOWN";

pub fn parse_core_metadata(text: &str) -> Result<Descriptor, DescriptorError> {
    let headers = read_headers(text)?;
    let mut d = Descriptor::default();

    for (key, value) in headers {
        if value == UNKNOWN {
            continue;
        }
        match key.to_ascii_lowercase().as_str() {
            "name" => d.name = Some(value),
            "version" => d.version = value,
            "author" => d.author = value,
            "author-email" => d.author_email = value,
            "license" => d.license = value,
            "summary" => d.description = value,
            "home-page" => d.url = value,
            "requires-dist" => d.install_requires.push(value),
            _ => debug!("Ignoring metadata header '{}'", key),
        }
    }

    Ok(d)
}

fn read_headers(text: &str) -> Result<Vec<(String, String)>, DescriptorError> {
    let mut headers: Vec<(String, String)> = Vec::new();

    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            if headers.is_empty() {
                continue;
            }
            break;
        }

        if line.starts_with([' ', '\t']) {
            match headers.last_mut() {
                Some((_, value)) => {
                    value.push('\n');
                    value.push_str(line.trim());
                }
                None => {
                    return Err(DescriptorError::malformed(format!(
                        "continuation line {} before any header",
                        number + 1
                    )));
                }
            }
            continue;
        }

        match line.split_once(':') {
            Some((key, value)) if is_header_name(key) => {
                headers.push((key.to_string(), value.trim().to_string()));
            }
            _ if headers.is_empty() => {
                return Err(DescriptorError::malformed(format!(
                    "line {} is not a metadata header",
                    number + 1
                )));
            }
            _ => debug!("Skipping metadata line {}: {:?}", number + 1, line),
        }
    }

    if headers.is_empty() {
        return Err(DescriptorError::malformed("no metadata headers found"));
    }
    Ok(headers)
}

fn is_header_name(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}
