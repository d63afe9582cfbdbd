use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use crate::archive::{ArchiveReader, ArchiveReaderImpl, SourceKind};
use crate::descriptor::{Descriptor, parse_descriptor_bytes};
use crate::entry::{EntryModule, parse_entry_module};
use crate::runtime::Runtime;

/// Load the descriptor stored at `path`.
///
/// Archives are searched for their best descriptor member, `PKG-INFO` and
/// `METADATA` are read as core metadata, anything else as descriptor text.
#[tracing::instrument(skip(runtime))]
pub fn load_descriptor<R: Runtime>(runtime: &R, path: &Path) -> Result<Descriptor> {
    let archives = ArchiveReaderImpl::new();
    if archives.can_handle(path) {
        let source = archives.read_descriptor(runtime, path)?;
        debug!("Using {} from {:?}", source.member, path);
        return source
            .parse()
            .with_context(|| format!("Failed to parse {} in {}", source.member, path.display()));
    }

    let file_name = path.file_name().and_then(|s| s.to_str()).unwrap_or_default();
    match SourceKind::for_file_name(file_name) {
        SourceKind::CoreMetadata => {
            let text = runtime.read_to_string(path)?;
            SourceKind::CoreMetadata
                .parse(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))
        }
        SourceKind::SetupPy => {
            let bytes = runtime.read(path)?;
            parse_descriptor_bytes(&bytes)
                .with_context(|| format!("Failed to parse {}", path.display()))
        }
    }
}

/// Load an `__init__`-style entry module.
#[tracing::instrument(skip(runtime))]
pub fn load_entry_module<R: Runtime>(runtime: &R, path: &Path) -> Result<EntryModule> {
    let text = runtime.read_to_string(path)?;
    parse_entry_module(&text).with_context(|| format!("Failed to parse {}", path.display()))
}
