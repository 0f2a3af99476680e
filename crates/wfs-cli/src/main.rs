//! wfs CLI
//!
//! Shell-style commands over a sandboxed storage directory on the host.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use context::Context;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| CliError::user(format!("failed to set tracing subscriber: {e}")))?;
        tracing::debug!("Verbose mode enabled");
    }

    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        Some(cmd) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(execute_command(&ctx, cmd))
        }
        None => {
            println!("{} sandboxed storage CLI", "wfs".green().bold());
            println!();
            println!("Run {} for available commands.", "wfs --help".cyan());
            Ok(())
        }
    }
}

async fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    if cmd == Commands::Config {
        return commands::run_config(ctx);
    }

    let fs = ctx.filesystem()?;
    match cmd {
        Commands::Ls { path, json } => commands::run_ls(&fs, &path, json).await,
        Commands::Cat { path } => commands::run_cat(&fs, &path).await,
        Commands::Write {
            path,
            content,
            base64,
        } => commands::run_write(&fs, &path, content, base64).await,
        Commands::Append {
            path,
            content,
            base64,
        } => commands::run_append(&fs, &path, content, base64).await,
        Commands::Mkdir { path, parents } => commands::run_mkdir(&fs, &path, parents).await,
        Commands::Rm { path, recursive } => commands::run_rm(&fs, &path, recursive).await,
        Commands::Stat { path, json } => commands::run_stat(&fs, &path, json).await,
        Commands::Url { path } => commands::run_url(&fs, &path).await,
        // Handled above; needs no storage.
        Commands::Config => Ok(()),
    }
}
