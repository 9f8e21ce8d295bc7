//! Notevault CLI - an end-to-end encrypted, signed note vault
//!
//! This is the command-line interface for Notevault. It is thin glue over
//! `notevault-core`: every cryptographic and conflict decision lives there.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{init, misc, notes};
use crate::errors::exit_code_for;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        eprintln!("Error: {}", e);
        std::process::exit(exit_code_for(&e));
    }
}

/// Logs go to stderr. RUST_LOG wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init(args) => init::handle_init(ctx, args),
        Commands::Add(args) => notes::handle_add(ctx, args),
        Commands::List(args) => notes::handle_list(ctx, args),
        Commands::Show(args) => notes::handle_show(ctx, args),
        Commands::Unlock(args) => notes::handle_unlock(ctx, args),
        Commands::Edit(args) => notes::handle_edit(ctx, args),
        Commands::Delete(args) => notes::handle_delete(ctx, args),
        Commands::Whoami => misc::handle_whoami(ctx),
        Commands::Completions { shell } => misc::handle_completions(*shell),
    }
}
