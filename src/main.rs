use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use relay_bot::application::runtime::Bot;
use relay_bot::infrastructure::adapters::ConsoleClient;
use relay_bot::infrastructure::config::Config;

#[derive(Parser)]
#[command(name = "relay-bot")]
#[command(about = "A pluggable chat-bot routing core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_bot(cli.config),
        Commands::Version => {
            println!("relay-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => init_config(cli.config),
    }
}

fn run_bot(config_path: String) {
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    tracing::info!("Starting relay-bot: {}", config.bot.name);

    let bot = match Bot::new(config, Arc::new(ConsoleClient::new())) {
        Ok(bot) => bot,
        Err(e) => {
            tracing::error!("Failed to construct bot: {}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    // Production has no coordinated shutdown: the token is never
    // cancelled, the process runs until killed.
    if let Err(e) = rt.block_on(bot.run(CancellationToken::new())) {
        tracing::error!("Bot stopped with error: {}", e);
        std::process::exit(1);
    }
}

fn init_config(config_path: String) {
    if std::path::Path::new(&config_path).exists() {
        tracing::warn!("{} already exists, not overwriting", config_path);
        return;
    }

    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => {
            if let Err(e) = std::fs::write(&config_path, yaml) {
                tracing::error!("Failed to write {}: {}", config_path, e);
            } else {
                tracing::info!("Wrote default config to {}", config_path);
            }
        }
        Err(e) => tracing::error!("Failed to serialize default config: {}", e),
    }
}
