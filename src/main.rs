use anyhow::Result;
use clap::Parser;
use pkgdesc::commands::{self, config::Config, config::OutputFormat};
use std::path::PathBuf;

/// pkgdesc - package descriptor reader and writer
///
/// Read the metadata of a Python-style package from `setup.py`, `PKG-INFO`,
/// standalone descriptor listings, or sdist and wheel archives, and write it
/// back in a normalized `key=value` form.
///
/// Examples:
///   pkgdesc parse setup.py            # Print the normalized descriptor
///   pkgdesc --format json show dist/ruffini-1.0.tar.gz
///   pkgdesc list --match 'aws-cdk.*'  # Scan the current directory
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGDESC_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory scanned by `list` (defaults to the current directory; also via PKGDESC_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "PKGDESC_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Parse a descriptor source and print it normalized
    Parse(PathArgs),

    /// Render a JSON descriptor as descriptor text
    Render(RenderArgs),

    /// Rewrite a descriptor listing in normalized form
    Fmt(FmtArgs),

    /// Show a human-readable summary of a descriptor
    Show(PathArgs),

    /// Validate one or more descriptors
    Check(CheckArgs),

    /// List descriptors found below the root directory
    List(ListArgs),

    /// Show the re-exports of a package entry module
    Entry(PathArgs),
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Descriptor source: setup.py, PKG-INFO, METADATA, *.pkgdesc, or an archive
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// JSON file holding the descriptor fields
    #[arg(value_name = "JSON")]
    pub json: PathBuf,

    /// Emit a setuptools `setup.py` instead of a listing
    #[arg(long)]
    pub setup_py: bool,
}

#[derive(clap::Args, Debug)]
pub struct FmtArgs {
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Fail instead of writing when the file is not normalized
    #[arg(long)]
    pub check: bool,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    #[arg(value_name = "FILE", required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only list packages whose name matches this glob pattern
    #[arg(long = "match", short = 'm', value_name = "PATTERN")]
    pub pattern: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = Config::new(pkgdesc::runtime::RealRuntime, cli.root, cli.format)?;

    match cli.command {
        Commands::Parse(args) => commands::parse(&config, &args.path)?,
        Commands::Render(args) => commands::render(&config, &args.json, args.setup_py)?,
        Commands::Fmt(args) => commands::fmt(&config, &args.path, args.check)?,
        Commands::Show(args) => commands::show(&config, &args.path)?,
        Commands::Check(args) => commands::check(&config, &args.paths)?,
        Commands::List(args) => commands::list(&config, args.pattern.as_deref())?,
        Commands::Entry(args) => commands::entry(&config, &args.path)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parse_parsing() {
        let cli = Cli::try_parse_from(["pkgdesc", "parse", "setup.py"]).unwrap();
        match cli.command {
            Commands::Parse(args) => assert_eq!(args.path, PathBuf::from("setup.py")),
            _ => panic!("Expected Parse command"),
        }
        assert_eq!(cli.root, None);
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_render_setup_py_flag() {
        let cli = Cli::try_parse_from(["pkgdesc", "render", "d.json", "--setup-py"]).unwrap();
        match cli.command {
            Commands::Render(args) => {
                assert_eq!(args.json, PathBuf::from("d.json"));
                assert!(args.setup_py);
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_cli_fmt_check_flag() {
        let cli = Cli::try_parse_from(["pkgdesc", "fmt", "--check", "a.pkgdesc"]).unwrap();
        match cli.command {
            Commands::Fmt(args) => assert!(args.check),
            _ => panic!("Expected Fmt command"),
        }
    }

    #[test]
    fn test_cli_check_requires_files() {
        assert!(Cli::try_parse_from(["pkgdesc", "check"]).is_err());

        let cli = Cli::try_parse_from(["pkgdesc", "check", "a.pkgdesc", "b/setup.py"]).unwrap();
        match cli.command {
            Commands::Check(args) => assert_eq!(args.paths.len(), 2),
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from([
            "pkgdesc", "--root", "/tmp", "list", "--format", "json", "--match", "aws-*",
        ])
        .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp")));
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Commands::List(args) => assert_eq!(args.pattern.as_deref(), Some("aws-*")),
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["pkgdesc", "setup.py"]);
        assert!(result.is_err());
    }
}
