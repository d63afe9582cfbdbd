use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::runtime::Runtime;

/// How commands print their results.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Descriptor text / human-readable summary
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

pub struct Config<R: Runtime> {
    pub runtime: R,
    /// Directory scanned by `list`.
    pub root: PathBuf,
    pub format: OutputFormat,
}

impl<R: Runtime> Config<R> {
    /// Build the command configuration. Without an explicit root the current
    /// directory is used.
    pub fn new(runtime: R, root: Option<PathBuf>, format: OutputFormat) -> Result<Self> {
        let root = match root {
            Some(path) => path,
            None => runtime.current_dir()?,
        };
        debug!("Using root {:?} with {:?} output", root, format);

        Ok(Self {
            runtime,
            root,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::{configure_mock_runtime_basics, test_home};

    #[test]
    fn test_config_explicit_root() {
        let runtime = MockRuntime::new();
        let config = Config::new(runtime, Some(PathBuf::from("/srv/pkgs")), OutputFormat::Json)
            .unwrap();
        assert_eq!(config.root, PathBuf::from("/srv/pkgs"));
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_config_defaults_to_current_dir() {
        let mut runtime = MockRuntime::new();
        configure_mock_runtime_basics(&mut runtime);

        let config = Config::new(runtime, None, OutputFormat::default()).unwrap();
        assert_eq!(config.root, test_home());
        assert_eq!(config.format, OutputFormat::Text);
    }

    #[test]
    fn test_config_current_dir_failure_propagates() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_current_dir()
            .returning(|| Err(anyhow::anyhow!("cwd removed")));

        let result = Config::new(runtime, None, OutputFormat::Text);
        assert!(result.is_err());
    }
}
