use anyhow::Result;
use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::{
    descriptor::{Finding, Severity, lint},
    package::load_descriptor,
    runtime::Runtime,
};

use super::config::{Config, OutputFormat};

#[derive(Serialize, Debug)]
pub(crate) struct FileReport {
    pub path: PathBuf,
    pub findings: Vec<Finding>,
}

impl FileReport {
    fn errors(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }
}

/// Validate descriptors. Fails when any file has an error-level finding or
/// cannot be read at all.
#[tracing::instrument(skip(config, paths))]
pub fn check<R: Runtime>(config: &Config<R>, paths: &[PathBuf]) -> Result<()> {
    let mut reports = Vec::new();
    for path in paths {
        debug!("Checking {:?}", path);
        let descriptor = load_descriptor(&config.runtime, path)?;
        reports.push(FileReport {
            path: path.clone(),
            findings: lint(&descriptor),
        });
    }

    match config.format {
        OutputFormat::Text => print!("{}", format_reports(&reports)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
    }

    let failed = reports.iter().filter(|r| r.errors() > 0).count();
    if failed > 0 {
        warn!("{} of {} descriptor(s) have errors", failed, reports.len());
        anyhow::bail!("{} descriptor(s) failed validation", failed);
    }
    Ok(())
}

pub(crate) fn format_reports(reports: &[FileReport]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&format_report(&report.path, &report.findings));
    }
    out
}

fn format_report(path: &Path, findings: &[Finding]) -> String {
    if findings.is_empty() {
        return format!("{}: ok\n", path.display());
    }
    findings
        .iter()
        .map(|f| format!("{}: {}\n", path.display(), f))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn config_with(files: Vec<(&'static str, &'static str)>) -> Config<MockRuntime> {
        let mut runtime = MockRuntime::new();
        for (path, content) in files {
            runtime
                .expect_read()
                .with(eq(PathBuf::from(path)))
                .returning(move |_| Ok(content.as_bytes().to_vec()));
        }
        Config::new(runtime, Some(PathBuf::from("/")), OutputFormat::Text).unwrap()
    }

    #[test]
    fn test_check_passes_with_warnings_only() {
        let config = config_with(vec![("/a.pkgdesc", "name='a'\nversion='1.0'")]);
        check(&config, &[PathBuf::from("/a.pkgdesc")]).unwrap();
    }

    #[test]
    fn test_check_fails_on_errors() {
        let config = config_with(vec![
            ("/a.pkgdesc", "name='a'\nauthor='x'\nlicense='MIT'"),
            ("/anon.pkgdesc", "version='1.0'"),
        ]);
        let err = check(
            &config,
            &[PathBuf::from("/a.pkgdesc"), PathBuf::from("/anon.pkgdesc")],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "1 descriptor(s) failed validation");
    }

    #[test]
    fn test_check_unreadable_file_propagates() {
        let config = config_with(vec![("/bin.pkgdesc", "\u{0}\u{1}")]);
        assert!(check(&config, &[PathBuf::from("/bin.pkgdesc")]).is_err());
    }

    #[test]
    fn test_format_reports() {
        let reports = vec![
            FileReport {
                path: PathBuf::from("/ok.pkgdesc"),
                findings: vec![],
            },
            FileReport {
                path: PathBuf::from("/anon.pkgdesc"),
                findings: lint(&crate::descriptor::Descriptor::default()),
            },
        ];
        let out = format_reports(&reports);
        assert!(out.starts_with("/ok.pkgdesc: ok\n"));
        assert!(out.contains("/anon.pkgdesc: error: name: descriptor has no name\n"));
        assert!(out.contains("/anon.pkgdesc: warning: license: license is empty\n"));
    }
}
