//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// dropdir - Keep named folders and drop files into them
#[derive(Parser, Debug)]
#[command(name = "dropdir")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Registry file (.json, .toml, .yaml or .yml)
    #[arg(long, global = true, env = "DROPDIR_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Set the base location new folders are created in
    ///
    /// Examples:
    ///   dropdir init ~/Storage     # Use ~/Storage, creating it if asked
    ///   dropdir init               # Prompt for the location
    Init {
        /// Base directory; `~` is expanded and quotes are stripped
        location: Option<String>,
    },

    /// Create a named folder under the base location
    ///
    /// Examples:
    ///   dropdir store invoices -d "Paid invoices"
    ///   dropdir store              # Prompt for name and description
    Store {
        /// Folder name (a single path component)
        name: Option<String>,

        /// Short description shown by `recent`
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List folders, newest first
    Recent {
        /// Show at most this many folders
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Copy or move files and directories into a folder
    ///
    /// Without PATHS a line of dragged-and-dropped paths is read; quoted
    /// paths and backslash-escaped spaces are understood.
    ///
    /// Examples:
    ///   dropdir drop ~/Downloads/report.pdf -f invoices
    ///   dropdir drop a.txt b.txt -f scans --move -y
    ///   dropdir drop               # Prompt for everything
    Drop {
        /// Files or directories to transfer
        paths: Vec<String>,

        /// Destination folder name
        #[arg(short, long)]
        folder: Option<String>,

        /// Move instead of copy
        #[arg(long = "move", conflicts_with = "copy")]
        move_files: bool,

        /// Copy without asking (the default when not interactive)
        #[arg(long)]
        copy: bool,

        /// Overwrite existing destinations without asking
        #[arg(short, long, conflicts_with = "no_clobber")]
        yes: bool,

        /// Fail instead of overwriting existing destinations
        #[arg(long)]
        no_clobber: bool,
    },

    /// Unregister a folder; its directory is left on disk
    Forget {
        /// Folder name
        name: String,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   dropdir completions bash > ~/.local/share/bash-completion/completions/dropdir
    ///   dropdir completions zsh > ~/.zfunc/_dropdir
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
