//! Message transport.
//!
//! Handlers never talk to teloxide directly: they render [`Screen`]s through
//! the [`Transport`] trait, which the bot implements over the Telegram Bot API.

use async_trait::async_trait;
use teloxide::payloads::{EditMessageTextSetters, SendMessageSetters};
use teloxide::requests::Requester;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId};
use teloxide::Bot;
use tracing::trace;

use crate::error::Result;
use crate::screens::Screen;

/// Send/edit capability used by the dispatch loop and handlers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `screen` as a new message and return its ID.
    async fn send(&self, chat_id: ChatId, screen: &Screen) -> Result<MessageId>;

    /// Replace the content of an existing message with `screen`.
    async fn edit(&self, chat_id: ChatId, message_id: MessageId, screen: &Screen) -> Result<()>;

    /// Acknowledge a callback query so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<()>;

    /// Send a plain text message.
    async fn notify(&self, chat_id: ChatId, text: &str) -> Result<MessageId> {
        self.send(chat_id, &Screen::new(text)).await
    }
}

/// [`Transport`] backed by a teloxide [`Bot`].
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// Build the inline keyboard for `screen`.
pub fn keyboard(screen: &Screen) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(screen.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.action.clone()))
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(&self, chat_id: ChatId, screen: &Screen) -> Result<MessageId> {
        let mut req = self.bot.send_message(chat_id, screen.text.clone());
        if screen.has_keyboard() {
            req = req.reply_markup(keyboard(screen));
        }
        let sent = req.await?;
        trace!(chat_id = %chat_id, message_id = sent.id.0, "Message sent");
        Ok(sent.id)
    }

    async fn edit(&self, chat_id: ChatId, message_id: MessageId, screen: &Screen) -> Result<()> {
        let mut req = self
            .bot
            .edit_message_text(chat_id, message_id, screen.text.clone());
        if screen.has_keyboard() {
            req = req.reply_markup(keyboard(screen));
        }
        req.await?;
        trace!(chat_id = %chat_id, message_id = message_id.0, "Message edited");
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.bot.answer_callback_query(callback_id.to_string()).await?;
        Ok(())
    }
}
