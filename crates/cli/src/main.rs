//! Solace CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Write a default solace.toml
//! - `turn`    — Process a single message through the pipeline
//! - `chat`    — Interactive conversation loop

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "solace",
    about = "Solace — conversational pipeline for an AI wellness companion",
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
    /// Write a default solace.toml in the current directory
    Onboard,

    /// Process a single message and print the structured reply
    Turn {
        /// The user message
        message: String,

        /// User id for the per-user memory log
        #[arg(short, long, default_value = "local-user")]
        user: String,

        /// Language hint (ISO 639-1, e.g. "en", "es")
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Interactive conversation loop
    Chat {
        /// User id for the per-user memory log
        #[arg(short, long, default_value = "local-user")]
        user: String,
    },
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
        Commands::Onboard => commands::onboard::run()?,
        Commands::Turn { message, user, language } => {
            commands::turn::run(&message, &user, language.as_deref()).await?
        }
        Commands::Chat { user } => commands::chat::run(&user).await?,
    }

    Ok(())
}
