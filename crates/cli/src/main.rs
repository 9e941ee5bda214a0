//! Loresmith CLI - the main entry point.
//!
//! Commands:
//! - `init`   - Write a default config file
//! - `ask`    - Ask one question (optionally streamed)
//! - `chat`   - Interactive session with conversation memory
//! - `doctor` - Check the configured backend is reachable

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "loresmith",
    about = "Loresmith - an autonomous reasoning agent over your documents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file to ~/.loresmith/config.toml
    Init,

    /// Ask the agent a single question
    Ask {
        /// The question to ask
        question: String,

        /// Stream the reasoning and answer as it is produced
        #[arg(short, long)]
        stream: bool,

        /// Print the full reasoning trace after the answer
        #[arg(short, long)]
        trace: bool,
    },

    /// Chat interactively with conversation memory
    Chat,

    /// Check the configured backend is reachable
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run()?,
        Commands::Ask {
            question,
            stream,
            trace,
        } => commands::ask::run(&question, stream, trace).await?,
        Commands::Chat => commands::chat::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
