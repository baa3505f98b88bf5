//! quill - Persona Evolution CLI
//!
//! Records posts with their engagement, evolves a writing persona from
//! them, and generates new LinkedIn posts in that voice.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;
mod engine;
mod error;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays parseable
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("quill=info".parse()?))
        .init();

    let cli = Cli::parse();

    let config = config::Config::load()?;
    let user = cli.user.as_deref();
    let json = cli.json;

    match cli.command {
        Commands::Post(cmd) => commands::post::execute(cmd, &config, user, json).await,
        Commands::Persona(cmd) => commands::persona::execute(cmd, &config, user, json).await,
        Commands::Context(cmd) => commands::context::execute(cmd, &config, user, json).await,
        Commands::Reference(cmd) => commands::reference::execute(cmd, &config, user, json).await,
        Commands::Generate(args) => commands::generate::execute(args, &config, user, json).await,
        Commands::Version => {
            println!("quill {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
