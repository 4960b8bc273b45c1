//! adless - local ad and tracker blocker
//!
//! Blocks domains by managing a marker-delimited block in the system hosts file.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::FmtSubscriber;

use adless::cli::{Cli, Commands, Verbosity};
use adless::commands::{self, Context};
use adless::error::exit_code_for;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbosity()) {
        eprintln!("Warning: failed to set up logging: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn init_logging(verbosity: Verbosity) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(verbosity.level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::new(cli.config);

    match cli.command {
        Commands::Enable => commands::enable::run(&ctx).await,
        Commands::Disable => commands::disable::run(&ctx).await,
        Commands::Update => commands::update::run(&ctx).await,
        Commands::Status => commands::status::run(&ctx).await,
        Commands::Restore => commands::restore::run(&ctx).await,
        Commands::Config { action } => commands::config::run(action, &ctx).await,
        Commands::Version => {
            println!("adless {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
