use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::path::PathBuf;

use crate::{
    package::{find_descriptor_files, load_descriptor},
    runtime::Runtime,
};

use super::config::{Config, OutputFormat};

#[derive(Serialize, Debug, PartialEq, Eq)]
pub(crate) struct Listing {
    pub name: Option<String>,
    pub version: String,
    pub path: PathBuf,
}

/// List all descriptors found under the configured root
#[tracing::instrument(skip(config))]
pub fn list<R: Runtime>(config: &Config<R>, name_pattern: Option<&str>) -> Result<()> {
    let listings = collect(config, name_pattern)?;

    match config.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listings)?),
        OutputFormat::Text if listings.is_empty() => println!("No descriptors found."),
        OutputFormat::Text => {
            for listing in &listings {
                println!(
                    "{} {}  {}",
                    listing.name.as_deref().unwrap_or("(anonymous)"),
                    listing.version,
                    listing.path.display()
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn collect<R: Runtime>(
    config: &Config<R>,
    name_pattern: Option<&str>,
) -> Result<Vec<Listing>> {
    let pattern = name_pattern
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid --match pattern")?;

    debug!("Listing descriptors from {:?}", config.root);
    let files = find_descriptor_files(&config.runtime, &config.root)?;
    debug!("Found {} descriptor file(s)", files.len());

    let mut listings = Vec::new();
    for path in files {
        let descriptor = match load_descriptor(&config.runtime, &path) {
            Ok(d) => d,
            Err(e) => {
                debug!("Failed to load descriptor from {:?}: {:#}", path, e);
                continue;
            }
        };

        if let Some(pattern) = &pattern {
            let matched = descriptor
                .name
                .as_deref()
                .is_some_and(|name| pattern.matches(name));
            if !matched {
                continue;
            }
        }

        listings.push(Listing {
            name: descriptor.name,
            version: descriptor.version,
            path,
        });
    }
    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn configured_runtime() -> MockRuntime {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/pkgs");

        runtime.expect_exists().returning(|_| true);
        runtime.expect_is_dir().returning(|_| false);
        runtime
            .expect_read_dir()
            .with(eq(root))
            .returning(|p| {
                Ok(vec![
                    p.join("a.pkgdesc"),
                    p.join("b.pkgdesc"),
                    p.join("broken.pkgdesc"),
                ])
            });
        runtime
            .expect_read()
            .with(eq(PathBuf::from("/pkgs/a.pkgdesc")))
            .returning(|_| Ok(b"name='aws-cdk.aws-sqs'\nversion='0.33.0'".to_vec()));
        runtime
            .expect_read()
            .with(eq(PathBuf::from("/pkgs/b.pkgdesc")))
            .returning(|_| Ok(b"version='1.0'".to_vec()));
        runtime
            .expect_read()
            .with(eq(PathBuf::from("/pkgs/broken.pkgdesc")))
            .returning(|_| Ok(b"not a descriptor".to_vec()));
        runtime
    }

    fn config() -> Config<MockRuntime> {
        Config::new(
            configured_runtime(),
            Some(PathBuf::from("/pkgs")),
            OutputFormat::Text,
        )
        .unwrap()
    }

    #[test]
    fn test_collect_skips_unreadable() {
        let listings = collect(&config(), None).unwrap();
        assert_eq!(
            listings,
            vec![
                Listing {
                    name: Some("aws-cdk.aws-sqs".into()),
                    version: "0.33.0".into(),
                    path: PathBuf::from("/pkgs/a.pkgdesc"),
                },
                Listing {
                    name: None,
                    version: "1.0".into(),
                    path: PathBuf::from("/pkgs/b.pkgdesc"),
                },
            ]
        );
    }

    #[test]
    fn test_collect_with_pattern() {
        let listings = collect(&config(), Some("aws-cdk.*")).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name.as_deref(), Some("aws-cdk.aws-sqs"));
    }

    #[test]
    fn test_collect_invalid_pattern() {
        let runtime = MockRuntime::new();
        let config = Config::new(runtime, Some(PathBuf::from("/pkgs")), OutputFormat::Text).unwrap();
        let err = collect(&config, Some("[")).unwrap_err();
        assert!(err.to_string().contains("Invalid --match pattern"));
    }
}
