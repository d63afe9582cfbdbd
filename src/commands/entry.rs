use anyhow::Result;
use log::debug;
use std::fmt::Write;
use std::path::Path;

use crate::{entry::EntryModule, package::load_entry_module, runtime::Runtime};

use super::config::{Config, OutputFormat};

/// Print the re-export surface of a package entry module.
#[tracing::instrument(skip(config))]
pub fn entry<R: Runtime>(config: &Config<R>, path: &Path) -> Result<()> {
    let module = load_entry_module(&config.runtime, path)?;
    debug!("{:?} has {} import statement(s)", path, module.imports.len());

    match config.format {
        OutputFormat::Text => print!("{}", format_entry_module(&module)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&module)?),
    }
    Ok(())
}

pub(crate) fn format_entry_module(module: &EntryModule) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Version: {}",
        module.version.as_deref().unwrap_or("(not set)")
    );
    let _ = writeln!(out, "Exports: {}", module.exports().join(", "));

    if module.imports.is_empty() {
        return out;
    }

    let width = module
        .imports
        .iter()
        .map(|r| r.module.len())
        .max()
        .unwrap_or(0);

    let _ = writeln!(out, "\nRe-exports:");
    for reexport in &module.imports {
        let names = if reexport.glob {
            "*".to_string()
        } else {
            reexport
                .names
                .iter()
                .map(|n| match &n.alias {
                    Some(alias) => format!("{} as {}", n.name, alias),
                    None => n.name.clone(),
                })
                .collect::<Vec<_>>()
                .join(", ")
        };
        let _ = writeln!(out, "  {:<width$}  {}", reexport.module, names, width = width);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::config::OutputFormat;
    use crate::entry::parse_entry_module;
    use crate::runtime::MockRuntime;
    use std::path::PathBuf;

    #[test]
    fn test_format_entry_module() {
        let module = parse_entry_module(
            "from .client import Client as C, Config\nfrom .errors import *\n__version__ = '2.1'\n",
        )
        .unwrap();
        let out = format_entry_module(&module);

        assert_eq!(
            out,
            "Version: 2.1\n\
             Exports: C, Config\n\
             \n\
             Re-exports:\n  \
               .client  Client as C, Config\n  \
               .errors  *\n"
        );
    }

    #[test]
    fn test_format_empty_module() {
        let out = format_entry_module(&EntryModule::default());
        assert_eq!(out, "Version: (not set)\nExports: \n");
    }

    #[test_log::test]
    fn test_entry_command_reads_through_runtime() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .times(1)
            .returning(|_| Ok("from .core import run\n".to_string()));
        let config = Config::new(runtime, Some(PathBuf::from("/")), OutputFormat::Json).unwrap();

        entry(&config, Path::new("/pkg/__init__.py")).unwrap();
    }
}
