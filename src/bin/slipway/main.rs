//! Slipway CLI - resolves native library requirements of a build

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use slipway::resolver::LocateError;
use slipway::util::diagnostic;
use slipway::util::GlobalContext;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        match e.downcast_ref::<LocateError>() {
            Some(err) => diagnostic::emit(&err.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("slipway=debug")
    } else {
        EnvFilter::new("slipway=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);
    ctx.set_color(!cli.no_color);
    let manifest_path = cli.manifest_path.as_deref();

    // Execute command
    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, &ctx, manifest_path),
        Commands::Libraries(args) => commands::libraries::execute(args, &ctx, manifest_path),
        Commands::Units => commands::units::execute(&ctx, manifest_path),
        Commands::Check(args) => commands::check::execute(args, &ctx, manifest_path),
        Commands::Config(args) => commands::config::execute(args, &ctx, manifest_path),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
