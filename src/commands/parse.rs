use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::{
    descriptor::{Descriptor, render_descriptor},
    package::load_descriptor,
    runtime::Runtime,
};

use super::config::{Config, OutputFormat};

/// Print the descriptor stored at `path`.
#[tracing::instrument(skip(config))]
pub fn parse<R: Runtime>(config: &Config<R>, path: &Path) -> Result<()> {
    debug!("Parsing descriptor {:?}", path);
    let descriptor = load_descriptor(&config.runtime, path)?;
    print!("{}", format_descriptor(&descriptor, config.format)?);
    Ok(())
}

pub(crate) fn format_descriptor(descriptor: &Descriptor, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_descriptor(descriptor),
        OutputFormat::Json => format!("{}\n", descriptor.to_json()?),
    })
}
