use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::debug;
use std::io::Read;
use std::path::Path;
use tar::Archive;

use super::{ArchiveReader, BestMember, DescriptorSource, member_rank};
use crate::runtime::Runtime;

/// Reader for .tar.gz / .tgz source distributions
pub struct TarGzReader;

impl ArchiveReader for TarGzReader {
    fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".tar.gz") || name.ends_with(".tgz")
    }

    fn read_descriptor<R: Runtime>(
        &self,
        runtime: &R,
        archive_path: &Path,
    ) -> Result<DescriptorSource> {
        debug!("Scanning tar.gz archive {:?}", archive_path);
        let file = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
        let mut archive = Archive::new(GzDecoder::new(file));

        let mut best = BestMember::default();
        let entries = archive
            .entries()
            .with_context(|| format!("Failed to read tar archive {:?}", archive_path))?;

        for entry in entries {
            let mut entry =
                entry.with_context(|| format!("Failed to read entry in {:?}", archive_path))?;
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let member = entry.path()?.to_string_lossy().into_owned();
            let Some((rank, kind)) = member_rank(&member) else {
                continue;
            };
            if !best.wants(rank) {
                continue;
            }

            debug!("Found descriptor candidate {}", member);
            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .with_context(|| format!("Failed to read {} from {:?}", member, archive_path))?;
            best.offer(rank, kind, member, bytes)?;
        }

        best.finish(archive_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::SourceKind;
    use crate::archive::test_archives::write_tar_gz;
    use crate::runtime::RealRuntime;
    use tempfile::tempdir;

    #[test]
    fn test_can_handle() {
        assert!(TarGzReader.can_handle(Path::new("a.tar.gz")));
        assert!(TarGzReader.can_handle(Path::new("A.TGZ")));
        assert!(!TarGzReader.can_handle(Path::new("a.whl")));
    }

    #[test]
    fn test_prefers_pkg_info_over_setup_py() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("call-recorder-api-1.0.1.tar.gz");
        write_tar_gz(
            &path,
            &[
                ("call-recorder-api-1.0.1/setup.py", "setup(name='from-setup')"),
                ("call-recorder-api-1.0.1/call_recorder_api/__init__.py", ""),
                (
                    "call-recorder-api-1.0.1/PKG-INFO",
                    "Name: call-recorder-api\nVersion: 1.0.1\n",
                ),
            ],
        );

        let source = TarGzReader.read_descriptor(&RealRuntime, &path).unwrap();
        assert_eq!(source.kind, SourceKind::CoreMetadata);
        assert_eq!(source.member, "call-recorder-api-1.0.1/PKG-INFO");
    }

    #[test]
    fn test_falls_back_to_setup_py() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ruffini-1.0.tar.gz");
        write_tar_gz(
            &path,
            &[(
                "ruffini-1.0/setup.py",
                "from distutils.core import setup\nsetup(name='ruffini', version='1.0')\n",
            )],
        );

        let source = TarGzReader.read_descriptor(&RealRuntime, &path).unwrap();
        assert_eq!(source.kind, SourceKind::SetupPy);
        let d = source.parse().unwrap();
        assert_eq!(d.name.as_deref(), Some("ruffini"));
        assert_eq!(d.version, "1.0");
    }

    #[test]
    fn test_archive_without_descriptor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty-1.0.tar.gz");
        write_tar_gz(&path, &[("empty-1.0/README", "nothing here")]);

        let err = TarGzReader.read_descriptor(&RealRuntime, &path).unwrap_err();
        assert!(err.to_string().contains("No METADATA, PKG-INFO or setup.py"));
    }

    #[test]
    fn test_corrupt_archive_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.tar.gz");
        std::fs::write(&path, b"definitely not gzip").unwrap();

        assert!(TarGzReader.read_descriptor(&RealRuntime, &path).is_err());
    }
}
