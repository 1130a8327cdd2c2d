// src/main.rs

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use debindex::index::Compression;
use debindex::index::check::check_repository;
use debindex::repo::{self, RepoConfig};
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "debindex")]
#[command(author, version, about = "Regenerate Packages and refresh Release hashes for flat Debian repositories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct RootArgs {
    /// Repository root (default: current directory)
    #[arg(short, long, env = "DEBINDEX_ROOT")]
    root: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate Packages, its compressed forms, and Release checksums
    Update {
        #[command(flatten)]
        root: RootArgs,

        /// Directory holding the .deb archives, relative to the root
        #[arg(short, long, env = "DEBINDEX_DEBS_DIR", default_value = repo::DEFAULT_DEBS_DIR)]
        debs_dir: PathBuf,

        /// Extra compressed forms of Packages to write next to Packages.bz2 (gzip, xz, zstd)
        #[arg(short, long = "compress", value_delimiter = ',')]
        compress: Vec<Compression>,

        /// Also write SHA256 fields and a Release SHA256 section
        #[arg(long)]
        sha256: bool,

        /// Set the Release Date field to the current time
        #[arg(long)]
        touch_date: bool,
    },
    /// Verify Packages and Release against the files on disk
    Check {
        #[command(flatten)]
        root: RootArgs,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    match root {
        Some(root) => Ok(root),
        None => std::env::current_dir().context("Failed to determine current directory"),
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout only carries the summary
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Update {
            root,
            debs_dir,
            compress,
            sha256,
            touch_date,
        }) => {
            let mut config = RepoConfig::new(resolve_root(root.root)?);
            config.debs_dir = debs_dir;
            config.compressions = compress;
            config.sha256 = sha256;
            config.touch_date = touch_date;

            info!("Updating repository at: {}", config.root.display());
            let summary = repo::update(&config)?;

            if root.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary);
            }
            Ok(())
        }
        Some(Commands::Check { root }) => {
            let root_path = resolve_root(root.root)?;
            info!("Checking repository at: {}", root_path.display());
            let report = check_repository(&root_path)?;

            if root.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for problem in &report.problems {
                    println!("{}", problem);
                }
                println!(
                    "Checked {} file(s), {} problem(s) found.",
                    report.checked,
                    report.problems.len()
                );
            }

            if !report.is_clean() {
                anyhow::bail!("Repository index is inconsistent");
            }
            Ok(())
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "debindex", &mut io::stdout());
            Ok(())
        }
        None => {
            // No command provided, show help
            println!("debindex v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'debindex --help' for usage information");
            Ok(())
        }
    }
}
