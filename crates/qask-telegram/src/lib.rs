//! Telegram front-end for the Qask quiz backend.
//!
//! Users register, tune their profile, pull quiz questions and report
//! problems through inline keyboards. All game data lives in the backend;
//! the bot keeps only per-user conversational state in memory.
//!
//! # Environment Variables
//!
//! Required:
//! - `TG_BOT_TOKEN`: Bot token from @BotFather
//!
//! # Configuration
//!
//! A TOML file (default `./configs/qask_telegram.conf`) with the backend
//! address and logging options; see [`config`].
//!
//! # Example
//!
//! ```no_run
//! use qask_telegram::{BotConfig, QaskBot};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BotConfig::new().with_backend("127.0.0.1", 8080);
//!     let bot = QaskBot::new(qask_telegram::config::bot_token()?, &config)?;
//!     bot.start_polling().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Commands
//!
//! - `/start` - Welcome screen and registration
//! - `/help` - Show available commands
//! - `/play` - Questions and game settings
//! - `/profile` - Profile settings
//! - `/report` - Report a problem

pub mod backend;
pub mod bot;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod router;
pub mod screens;
pub mod session;
pub mod store;
pub mod transport;
pub mod views;

pub use backend::{Backend, Profile, QaskClient};
pub use bot::QaskBot;
pub use config::BotConfig;
pub use dispatch::{Dispatcher, Inbound, Request, Sender, Services};
pub use error::{BotError, Result};
pub use router::{Router, Visibility};
pub use screens::{Area, Button, Screen};
pub use session::{PendingInput, Session};
pub use store::SessionStore;
pub use transport::{TelegramTransport, Transport};
