use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use crate::{
    descriptor::{Descriptor, render_descriptor, render_setup_py},
    runtime::Runtime,
};

use super::config::Config;

/// Render a JSON descriptor as descriptor text or as a `setup.py`.
#[tracing::instrument(skip(config))]
pub fn render<R: Runtime>(config: &Config<R>, json_path: &Path, setup_py: bool) -> Result<()> {
    debug!("Rendering {:?} (setup.py: {})", json_path, setup_py);
    let json = config.runtime.read_to_string(json_path)?;
    let descriptor = Descriptor::from_json(&json)
        .with_context(|| format!("Failed to read descriptor JSON {}", json_path.display()))?;

    let text = if setup_py {
        render_setup_py(&descriptor)
    } else {
        render_descriptor(&descriptor)
    };
    print!("{}", text);
    Ok(())
}
