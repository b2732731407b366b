//! CLI definitions and command dispatch.

use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::{Parser, Subcommand};
use iconsmith_core::{
    clean,
    config::{DIST_DIR, ICONS_DIR, METADATA_FILE},
};
use log::LevelFilter;

use crate::commands::{allocate_codepoints, build, lint};

#[derive(Parser)]
#[command(name = "iconsmith")]
#[command(about = "Build icon fonts, stylesheets and libraries from a directory of SVG icons")]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, clap::Args)]
pub struct Verbosity {
    /// Increase logging output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Verbosity {
    pub fn level_filter(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct BuildArgs {
    /// Project root holding package.json and assets/
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// Output directory (default: <root>/dist)
    #[arg(long)]
    pub dist: Option<PathBuf>,
    /// Version written into the fonts instead of the package.json one
    #[arg(long)]
    pub product_version: Option<String>,
    /// Assign codepoints to new icons before building
    #[arg(long)]
    pub allocate_codepoints: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full build pipeline
    Build {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Assign codepoints to icons that have none
    Codepoints {
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Check icon files against the metadata file
    Lint {
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Icon directory (default: <root>/assets/icons)
        #[arg(long)]
        icons: Option<PathBuf>,
        /// Metadata file (default: <root>/src/element-icon-metadata.json)
        #[arg(long)]
        metadata: Option<PathBuf>,
    },
    /// Remove the output directory
    Clean {
        #[arg(long, default_value = DIST_DIR)]
        dist: PathBuf,
    },
}

impl Commands {
    pub fn run(self) -> Result<ExitCode> {
        let ok = match self {
            Commands::Build { args } => build(&args),
            Commands::Codepoints { root } => {
                allocate_codepoints(&root)?;
                true
            }
            Commands::Lint { root, icons, metadata } => {
                let icons = icons.unwrap_or_else(|| root.join(ICONS_DIR));
                let metadata = metadata.unwrap_or_else(|| root.join(METADATA_FILE));
                lint(&icons, &metadata)?
            }
            Commands::Clean { dist } => {
                clean(&dist)?;
                true
            }
        };
        Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, write};

    use clap::CommandFactory;
    use tempfile::tempdir;

    use super::*;

    fn run(args: &[&str]) -> String {
        let code = Cli::try_parse_from(args).unwrap().command.run().unwrap();
        format!("{code:?}")
    }

    fn failure() -> String {
        format!("{:?}", ExitCode::FAILURE)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        let level = |args: &[&str]| Cli::try_parse_from(args).unwrap().verbosity.level_filter();
        assert_eq!(level(&["iconsmith", "clean"]), LevelFilter::Info);
        assert_eq!(level(&["iconsmith", "-v", "clean"]), LevelFilter::Debug);
        assert_eq!(level(&["iconsmith", "clean", "-vv"]), LevelFilter::Trace);
        assert_eq!(level(&["iconsmith", "-q", "clean"]), LevelFilter::Warn);
    }

    #[test]
    fn test_build_flags() {
        let cli = Cli::try_parse_from([
            "iconsmith",
            "build",
            "--root",
            "proj",
            "--product-version",
            "3.1.0",
            "--allocate-codepoints",
        ])
        .unwrap();
        let Commands::Build { args } = cli.command else { panic!("expected build") };
        assert_eq!(args.root, PathBuf::from("proj"));
        assert_eq!(args.dist, None);
        assert_eq!(args.product_version.as_deref(), Some("3.1.0"));
        assert!(args.allocate_codepoints);
    }

    #[test]
    fn test_lint_mismatch_exits_with_failure() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        create_dir_all(root.join("assets/icons")).unwrap();
        create_dir_all(root.join("src")).unwrap();
        write(root.join("assets/icons/home.svg"), "<svg/>").unwrap();
        write(
            root.join("src/element-icon-metadata.json"),
            r#"[{"name":"home"},{"name":"gear"}]"#,
        )
        .unwrap();
        let root_arg = root.to_str().unwrap();

        assert_eq!(run(&["iconsmith", "lint", "--root", root_arg]), failure());

        write(root.join("assets/icons/gear.svg"), "<svg/>").unwrap();
        assert_eq!(
            run(&["iconsmith", "lint", "--root", root_arg]),
            format!("{:?}", ExitCode::SUCCESS)
        );
    }

    #[test]
    fn test_failed_build_exits_with_failure() {
        let dir = tempdir().unwrap();
        create_dir_all(dir.path().join("assets/icons")).unwrap();
        let root_arg = dir.path().to_str().unwrap();
        assert_eq!(run(&["iconsmith", "build", "--root", root_arg]), failure());
    }
}
