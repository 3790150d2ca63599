use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "file-roulette")]
#[command(about = "Open random files from a directory tree, without repeats", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Pick random files and open them with the default application
    Pick {
        /// Directory to pick from
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// How many files to pick
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
        /// Also consider files that were already opened on previous runs
        #[arg(long)]
        no_dedup: bool,
        /// Print the chosen paths without opening anything
        #[arg(long)]
        dry_run: bool,
        /// Fixed RNG seed, for reproducing a selection
        #[arg(long, hide = true)]
        seed: Option<u64>,
    },
    /// Show open-history and candidate-pool statistics for a directory
    Stats {
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Clear the recorded open history for a directory
    ResetHistory {
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Print the effective configuration for a directory
    PrintConfig {
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
    /// Write a default .file-roulette.toml into a directory
    InitConfig {
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Overwrite an existing config file without asking
        #[arg(long)]
        force: bool,
    },
    /// Add the Explorer right-click menu entry (Windows, no admin needed)
    RegisterMenu,
    /// Remove the Explorer right-click menu entry
    UnregisterMenu,
}
