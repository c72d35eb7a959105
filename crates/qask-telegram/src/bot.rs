//! Main Telegram bot implementation.

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::requests::Requester;
use teloxide::types::Update;
use teloxide::{dptree, respond, Bot};
use tracing::{debug, info};

use crate::backend::QaskClient;
use crate::config::BotConfig;
use crate::dispatch::{Dispatcher, Inbound, Services};
use crate::error::Result;
use crate::handlers;
use crate::store::SessionStore;
use crate::transport::TelegramTransport;

/// The Qask Telegram bot.
pub struct QaskBot {
    /// The teloxide bot instance.
    bot: Bot,
    /// Routes updates to handlers; shared with the update listener.
    dispatcher: Arc<Dispatcher>,
}

impl QaskBot {
    /// Create the bot with a fresh session store.
    pub fn new(token: impl Into<String>, config: &BotConfig) -> Result<Self> {
        let bot = Bot::new(token);
        let backend = QaskClient::from_config(config)?;
        info!(backend = %backend.base_url(), "Using qask backend");

        let services = Arc::new(Services::new(
            Arc::new(TelegramTransport::new(bot.clone())),
            Arc::new(backend),
            Arc::new(SessionStore::new()),
        ));
        let dispatcher = Dispatcher::new(
            services,
            handlers::command_router()?,
            handlers::callback_router()?,
            config.max_concurrent_updates,
        );

        Ok(Self {
            bot,
            dispatcher: Arc::new(dispatcher),
        })
    }

    /// Get the bot's username.
    pub async fn get_me(&self) -> Result<String> {
        let me = self.bot.get_me().await?;
        Ok(me.username().to_string())
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Receive updates by long polling until Ctrl+C.
    pub async fn start_polling(&self) -> Result<()> {
        info!("Starting Telegram bot in polling mode...");

        let dispatcher = Arc::clone(&self.dispatcher);
        let on_update = move |update: Update| {
            let dispatcher = Arc::clone(&dispatcher);
            async move {
                dispatcher.dispatch(Inbound::from_update(&update)).await;
                respond(())
            }
        };

        let handler = dptree::entry()
            .branch(Update::filter_callback_query().endpoint(on_update.clone()))
            .branch(Update::filter_message().endpoint(on_update));

        info!("Bot is running! Send /start to begin.");

        teloxide::dispatching::Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|upd| async move {
                debug!(update = ?upd, "Unhandled update");
            })
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!(sessions = self.dispatcher.store().len().await, "Bot stopped");
        Ok(())
    }
}
