//! dropdir CLI
//!
//! Keeps a registry of named folders under one base location and drops
//! files and directories into them.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;
mod progress;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use commands::DropOptions;
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        if e.is_cancelled() {
            eprintln!("{} {}", "cancelled:".yellow().bold(), e);
            return;
        }
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "dropdir", &mut std::io::stdout());
            Ok(())
        }
        Some(cmd) => {
            let ctx = Context::open(cli.config)?;
            execute_command(&ctx, cmd)
        }
        None => {
            println!("{} keep named folders and drop files into them", "dropdir".green().bold());
            println!();
            println!("Run {} for available commands.", "dropdir --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init { location } => commands::run_init(ctx, location),
        Commands::Store { name, description } => commands::run_store(ctx, name, description),
        Commands::Recent { limit, json } => commands::run_recent(ctx, limit, json),
        Commands::Drop {
            paths,
            folder,
            move_files,
            copy,
            yes,
            no_clobber,
        } => commands::run_drop(
            ctx,
            DropOptions {
                paths,
                folder,
                mode: DropOptions::mode_from_flags(move_files, copy),
                overwrite_policy: DropOptions::policy_from_flags(yes, no_clobber),
            },
        ),
        Commands::Forget { name } => commands::run_forget(ctx, &name),
        Commands::Completions { .. } => Ok(()),
    }
}
