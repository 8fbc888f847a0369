//! wagpt-demo CLI: run the WhatsApp GPT demo bot. Config from env and optional CLI args.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use wagpt_core::init_tracing;
use wagpt_demo::{build_bot, DemoConfig};

#[derive(Parser)]
#[command(name = "wagpt-demo")]
#[command(about = "WhatsApp GPT demo bot over GREEN-API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (config from env; CLI args override INSTANCE_ID / INSTANCE_TOKEN).
    Run {
        #[arg(long)]
        instance_id: Option<String>,
        #[arg(short, long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { instance_id, token } => run(instance_id, token).await,
    }
}

async fn run(instance_id: Option<String>, token: Option<String>) -> Result<()> {
    let config = DemoConfig::load(instance_id, token)?;
    init_tracing(config.log_file.as_deref().map(Path::new))?;

    let bot = Arc::new(build_bot(&config)?);

    let stopper = bot.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Stopping bot...");
            stopper.stop();
            std::process::exit(0);
        }
    });

    info!("Starting WhatsApp GPT Demo Bot...");
    if let Err(e) = bot.connect().await {
        error!(error = %e, "Failed to start bot");
        return Ok(());
    }
    info!("Bot started successfully!");

    bot.run().await?;
    Ok(())
}
