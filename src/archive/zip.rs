use anyhow::{Context, Result};
use log::debug;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

use super::{ArchiveReader, BestMember, DescriptorSource, member_rank};
use crate::runtime::Runtime;

/// Reader for wheels and .zip source distributions
pub struct ZipReader;

impl ArchiveReader for ZipReader {
    fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".whl") || name.ends_with(".zip")
    }

    fn read_descriptor<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
    ) -> Result<DescriptorSource> {
        debug!("Scanning zip archive {:?}", archive_path);

        // zip needs Read + Seek, so the archive is read into memory
        let buffer = runtime
            .read(archive_path)
            .with_context(|| format!("Failed to read archive {:?}", archive_path))?;
        let mut archive = ZipArchive::new(std::io::Cursor::new(buffer))
            .with_context(|| format!("Failed to parse ZIP archive {:?}", archive_path))?;

        let mut candidates: Vec<_> = archive
            .file_names()
            .filter_map(|name| member_rank(name).map(|(rank, kind)| (rank, kind, name.to_string())))
            .collect();
        candidates.sort_by_key(|(rank, _, _)| *rank);

        let mut best = BestMember::default();
        if let Some((rank, kind, member)) = candidates.into_iter().next() {
            debug!("Found descriptor candidate {}", member);
            let mut entry = archive
                .by_name(&member)
                .with_context(|| format!("Failed to open {} in {:?}", member, archive_path))?;
            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .with_context(|| format!("Failed to read {} from {:?}", member, archive_path))?;
            best.offer(rank, kind, member, bytes)?;
        }

        best.finish(archive_path)
    }
}
