//! Descriptor lookup inside distribution archives.
//!
//! Source distributions (`.tar.gz`) carry `PKG-INFO` and usually `setup.py`
//! under a single top-level directory; wheels (`.whl`, zip) carry
//! `<name>.dist-info/METADATA`. Archives are read in memory and never
//! extracted to disk.

mod tar_gz;
mod zip;

use anyhow::{Context, Result, anyhow};
use std::path::Path;

use crate::descriptor::{Descriptor, DescriptorError, parse_core_metadata, parse_descriptor};
use crate::runtime::Runtime;

pub use tar_gz::TarGzReader;
pub use zip::ZipReader;

/// Which reader a piece of descriptor text needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    SetupPy,
    CoreMetadata,
}

impl SourceKind {
    /// `PKG-INFO` and `METADATA` are core metadata; anything else is read as
    /// key/value or `setup.py` text.
    pub fn for_file_name(name: &str) -> Self {
        match name {
            "PKG-INFO" | "METADATA" => SourceKind::CoreMetadata,
            _ => SourceKind::SetupPy,
        }
    }

    pub fn parse(self, text: &str) -> Result<Descriptor, DescriptorError> {
        match self {
            SourceKind::SetupPy => parse_descriptor(text),
            SourceKind::CoreMetadata => parse_core_metadata(text),
        }
    }
}

/// Descriptor text found inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSource {
    pub kind: SourceKind,
    /// Archive member path, e.g. `ruffini-1.0/PKG-INFO`.
    pub member: String,
    pub text: String,
}

impl DescriptorSource {
    pub fn parse(&self) -> Result<Descriptor, DescriptorError> {
        self.kind.parse(&self.text)
    }
}

/// Trait for format-specific archive readers
pub trait ArchiveReader: Send + Sync {
    /// Check if this reader can handle the given archive format
    fn can_handle(&self, archive_path: &Path) -> bool;

    /// Find and read the best descriptor member of the archive
    fn read_descriptor<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
    ) -> Result<DescriptorSource>;
}

/// Dispatcher that selects the appropriate reader based on archive format.
pub struct ArchiveReaderImpl {
    tar_gz: TarGzReader,
    zip: ZipReader,
}

impl Default for ArchiveReaderImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveReaderImpl {
    pub fn new() -> Self {
        Self {
            tar_gz: TarGzReader,
            zip: ZipReader,
        }
    }
}

impl ArchiveReader for ArchiveReaderImpl {
    fn can_handle(&self, archive_path: &Path) -> bool {
        self.tar_gz.can_handle(archive_path) || self.zip.can_handle(archive_path)
    }

    #[tracing::instrument(skip(self, runtime, archive_path))]
    fn read_descriptor<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
    ) -> Result<DescriptorSource> {
        if self.tar_gz.can_handle(archive_path) {
            return self.tar_gz.read_descriptor(runtime, archive_path);
        }
        if self.zip.can_handle(archive_path) {
            return self.zip.read_descriptor(runtime, archive_path);
        }
        Err(anyhow!(
            "Unsupported archive format: {}",
            archive_path.display()
        ))
    }
}

/// Rank of an archive member as a descriptor source; lower wins.
///
/// Only members at the archive root or one directory down count, so
/// vendored packages and `*.egg-info` copies are ignored.
pub(crate) fn member_rank(member: &str) -> Option<(u8, SourceKind)> {
    let parts: Vec<&str> = member
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect();

    match parts.as_slice() {
        [dist_info, "METADATA"] if dist_info.ends_with(".dist-info") => {
            Some((0, SourceKind::CoreMetadata))
        }
        ["PKG-INFO"] | [_, "PKG-INFO"] => Some((1, SourceKind::CoreMetadata)),
        ["setup.py"] | [_, "setup.py"] => Some((2, SourceKind::SetupPy)),
        _ => None,
    }
}

/// Keeps the best-ranked member seen so far while scanning an archive.
#[derive(Default)]
pub(crate) struct BestMember {
    best: Option<(u8, DescriptorSource)>,
}

impl BestMember {
    pub fn wants(&self, rank: u8) -> bool {
        self.best.as_ref().is_none_or(|(current, _)| rank < *current)
    }

    pub fn offer(&mut self, rank: u8, kind: SourceKind, member: String, bytes: Vec<u8>) -> Result<()> {
        if !self.wants(rank) {
            return Ok(());
        }
        let text = String::from_utf8(bytes)
            .with_context(|| format!("Archive member {} is not UTF-8 text", member))?;
        self.best = Some((rank, DescriptorSource { kind, member, text }));
        Ok(())
    }

    pub fn finish(self, archive_path: &Path) -> Result<DescriptorSource> {
        self.best.map(|(_, source)| source).ok_or_else(|| {
            anyhow!(
                "No METADATA, PKG-INFO or setup.py found in {}",
                archive_path.display()
            )
        })
    }
}
