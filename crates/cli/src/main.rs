//! Violet Pages CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! vp-cli migrate
//!
//! # Drop a cached book description
//! vp-cli description evict <volume-id>
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vp-cli")]
#[command(author, version, about = "Violet Pages CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage cached book descriptions
    Description {
        #[command(subcommand)]
        action: DescriptionAction,
    },
}

#[derive(Subcommand)]
enum DescriptionAction {
    /// Remove a cached description so it is normalized again on next view
    Evict {
        /// Google Books volume id
        volume_id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Description { action } => match action {
            DescriptionAction::Evict { volume_id } => {
                commands::description::evict(&volume_id).await?;
            }
        },
    }
    Ok(())
}
