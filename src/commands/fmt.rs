use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;

use crate::{
    archive::SourceKind,
    descriptor::{parse_descriptor_bytes, render_descriptor},
    runtime::Runtime,
};

use super::config::Config;

/// Rewrite a descriptor listing in normalized form.
///
/// With `check` set nothing is written and the command fails when the file
/// is not already normalized. Python scripts (`setup.py` or any other `*.py`)
/// and core metadata files are never rewritten.
#[tracing::instrument(skip(config))]
pub fn fmt<R: Runtime>(config: &Config<R>, path: &Path, check: bool) -> Result<()> {
    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
    let is_script = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("py"));
    if is_script || SourceKind::for_file_name(file_name) == SourceKind::CoreMetadata {
        anyhow::bail!(
            "Refusing to rewrite {}: only descriptor listings can be formatted.\n\
             Use `pkgdesc parse` to print a normalized copy instead.",
            path.display()
        );
    }

    let bytes = config.runtime.read(path)?;
    let descriptor = parse_descriptor_bytes(&bytes)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let normalized = render_descriptor(&descriptor);

    if bytes == normalized.as_bytes() {
        debug!("{:?} is already normalized", path);
        return Ok(());
    }

    if check {
        anyhow::bail!("{} is not normalized", path.display());
    }

    config.runtime.write(path, normalized.as_bytes())?;
    info!("Formatted {}", path.display());
    println!("Formatted {}", path.display());
    Ok(())
}
