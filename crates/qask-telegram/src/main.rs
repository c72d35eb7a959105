//! Qask Telegram bot binary.
//!
//! Start the bot with:
//! ```bash
//! TG_BOT_TOKEN=xxx cargo run -p qask-telegram -- --config ./configs/qask_telegram.conf
//! ```

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use qask_telegram::config::{self, BotConfig};
use qask_telegram::QaskBot;
use tracing_subscriber::EnvFilter;

/// Qask Telegram Bot - quiz questions and reports from Telegram
#[derive(Parser, Debug)]
#[command(name = "qask-telegram")]
#[command(about = "Telegram front-end for the Qask quiz backend")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Verbose logging (-v, -vv, -vvv); overrides log_level from the config
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_filter(verbose: u8, log_level: &str) -> String {
    match verbose {
        0 => format!("qask_telegram={},teloxide=warn", log_level),
        1 => "qask_telegram=debug,teloxide=info".to_string(),
        2 => "qask_telegram=trace,teloxide=debug".to_string(),
        _ => "trace".to_string(),
    }
}

fn init_logging(args: &Args, config: &BotConfig) -> std::io::Result<()> {
    let filter = log_filter(args.verbose, &config.log_level);
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_file {
        Some(path) => {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let _ = dotenvy::from_filename(".env.local").or_else(|_| dotenvy::dotenv());

    let config = BotConfig::load(&args.config)?;
    init_logging(&args, &config)?;
    tracing::info!(config = %args.config.display(), backend = %config.backend_url(), "Configuration loaded");

    let token = config::bot_token()?;
    let bot = QaskBot::new(token, &config)?;

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\nQask Telegram Bot");
            println!("   Bot: @{}", username);
            println!("   Backend: {}", config.backend_url());
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    println!("\n   Press Ctrl+C to stop\n");

    bot.start_polling().await?;

    Ok(())
}
