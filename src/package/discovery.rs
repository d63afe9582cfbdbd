use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Extension for standalone descriptor listings.
pub const DESCRIPTOR_EXTENSION: &str = "pkgdesc";

/// Find all descriptor sources below `root`, sorted by path.
///
/// Matches `setup.py`, `PKG-INFO`, `METADATA`, `*.pkgdesc` files and
/// distribution archives. Hidden directories and directory symlinks are not
/// entered.
#[tracing::instrument(skip(runtime, root))]
pub fn find_descriptor_files<R: Runtime>(runtime: &R, root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    if !runtime.exists(root) {
        return Ok(found);
    }

    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for path in runtime.read_dir(&dir)? {
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if runtime.is_dir(&path) {
                if name.starts_with('.') {
                    continue;
                }
                if runtime.is_symlink(&path) {
                    debug!("Not following directory symlink {:?}", path);
                    continue;
                }
                pending.push(path);
            } else if is_descriptor_file(name) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

fn is_descriptor_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    matches!(name, "setup.py" | "PKG-INFO" | "METADATA")
        || lower.ends_with(&format!(".{}", DESCRIPTOR_EXTENSION))
        || lower.ends_with(".tar.gz")
        || lower.ends_with(".tgz")
        || lower.ends_with(".whl")
}
