mod commands;
mod gateway;

use clap::{Parser, Subcommand};
use doorman_channels::TelegramChannel;
use doorman_core::{config, counter::CounterStore, runtime::RuntimeConfig};
use doorman_media::{openai::OpenAiClient, MediaPipeline, RetryPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "doorman",
    version,
    about = "Doorman — welcomes new chat members with AI-generated images"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot.
    Start,
    /// Check configuration and show the welcome counter.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let cfg = config::load(&cli.config)?;

            if cfg.telegram.bot_token.is_empty() {
                anyhow::bail!("telegram.bot_token is empty. Set it in config.toml.");
            }
            if cfg.openai.api_key.is_empty() {
                anyhow::bail!("openai.api_key is empty. Set it in config.toml.");
            }
            if cfg.chats.welcome_chat_id == 0 {
                anyhow::bail!("chats.welcome_chat_id is not set.");
            }

            let data_dir = PathBuf::from(config::shellexpand(&cfg.doorman.data_dir));
            std::fs::create_dir_all(&data_dir)?;

            let openai = Arc::new(OpenAiClient::from_config(&cfg.openai));
            let media = MediaPipeline::new(
                openai.clone(),
                data_dir.join("welcome_images"),
                cfg.welcome
                    .watermark_path
                    .as_deref()
                    .map(|p| PathBuf::from(config::shellexpand(p))),
                RetryPolicy::new(
                    cfg.welcome.max_generation_attempts,
                    Duration::from_secs(cfg.welcome.retry_base_delay_secs),
                ),
            );

            let channel = Arc::new(TelegramChannel::new(
                cfg.telegram.clone(),
                cfg.chats.clone(),
            ));
            let runtime = Arc::new(RuntimeConfig::from_config(&cfg.welcome));
            let counter = Arc::new(CounterStore::new(&data_dir));

            println!("Doorman — starting bot...");
            let gw = Arc::new(gateway::Gateway::new(
                channel,
                openai,
                media,
                runtime,
                counter,
                cfg.chats.clone(),
                cfg.welcome.prompt_template.clone(),
            ));
            gw.run().await?;
        }
        Commands::Status => {
            let cfg = config::load(&cli.config)?;
            println!("Doorman — Status\n");
            println!("Config: {}", cli.config);
            println!(
                "  telegram: {}",
                if cfg.telegram.bot_token.is_empty() {
                    "missing bot_token"
                } else {
                    "configured"
                }
            );
            println!(
                "  openai: {}",
                if cfg.openai.api_key.is_empty() {
                    "missing api_key"
                } else {
                    "configured"
                }
            );
            println!(
                "  chats: group={} welcome={} general={} admin={}",
                cfg.chats.group_chat_id,
                cfg.chats.welcome_chat_id,
                cfg.chats.general_chat_id,
                cfg.chats.admin_chat_id
            );

            let data_dir = PathBuf::from(config::shellexpand(&cfg.doorman.data_dir));
            let counter = CounterStore::new(&data_dir);
            println!("\nMembers welcomed: {}", counter.read().await?);
        }
    }

    Ok(())
}
