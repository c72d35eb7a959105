//! Update classification and dispatch.
//!
//! Each inbound update is handled in one pass:
//!
//! 1. classify it as a callback action, a text message or something to ignore;
//! 2. decide whether it is a command (starts with `/`) or plain content;
//! 3. resolve the sender's session;
//! 4. content fills the session's pending input, if any;
//! 5. commands go through the matching [`Router`], gated on visibility.
//!
//! A session's mutex is held for the whole handler, so updates of one user
//! never interleave. A semaphore bounds how many handlers run at once.

use std::sync::Arc;

use teloxide::types::{ChatId, MessageId, Update, UpdateKind, User};
use tokio::sync::{OwnedMutexGuard, Semaphore};
use tracing::{debug, error, info, trace, warn};

use crate::backend::Backend;
use crate::error::{BotError, Result};
use crate::handlers;
use crate::router::Router;
use crate::session::Session;
use crate::store::SessionStore;
use crate::transport::Transport;
use crate::views;

/// Prefix that marks a message or callback payload as a command.
pub const COMMAND_PREFIX: char = '/';

/// The Telegram user behind an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    pub first_name: String,
    pub user_name: Option<String>,
}

impl From<&User> for Sender {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.0 as i64,
            first_name: user.first_name.clone(),
            user_name: user.username.clone(),
        }
    }
}

/// An update reduced to what the bot acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// An inline keyboard button press.
    Callback {
        id: String,
        chat_id: ChatId,
        message_id: MessageId,
        data: String,
        from: Sender,
    },
    /// A text message.
    Text {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        from: Option<Sender>,
    },
    /// Anything else; dropped without further processing.
    Ignored,
}

impl Inbound {
    /// Classify a raw Telegram update.
    pub fn from_update(update: &Update) -> Self {
        match &update.kind {
            UpdateKind::CallbackQuery(query) => {
                let (Some(data), Some(message)) = (query.data.as_ref(), query.message.as_ref())
                else {
                    return Inbound::Ignored;
                };
                Inbound::Callback {
                    id: query.id.clone(),
                    chat_id: message.chat().id,
                    message_id: message.id(),
                    data: data.clone(),
                    from: Sender::from(&query.from),
                }
            }
            UpdateKind::Message(message) => match message.text() {
                Some(text) => Inbound::Text {
                    chat_id: message.chat.id,
                    message_id: message.id,
                    text: text.to_string(),
                    from: message.from.as_ref().map(Sender::from),
                },
                None => Inbound::Ignored,
            },
            _ => Inbound::Ignored,
        }
    }

    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            Inbound::Callback { chat_id, .. } | Inbound::Text { chat_id, .. } => Some(*chat_id),
            Inbound::Ignored => None,
        }
    }

    /// Message text or callback data.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Inbound::Callback { data, .. } => Some(data),
            Inbound::Text { text, .. } => Some(text),
            Inbound::Ignored => None,
        }
    }

    pub fn sender(&self) -> Option<&Sender> {
        match self {
            Inbound::Callback { from, .. } => Some(from),
            Inbound::Text { from, .. } => from.as_ref(),
            Inbound::Ignored => None,
        }
    }

    /// Message the pressed button belongs to, for callbacks.
    pub fn callback_message(&self) -> Option<MessageId> {
        match self {
            Inbound::Callback { message_id, .. } => Some(*message_id),
            _ => None,
        }
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, Inbound::Callback { .. })
    }

    pub fn is_command(&self) -> bool {
        self.payload()
            .map(|p| p.starts_with(COMMAND_PREFIX))
            .unwrap_or(false)
    }

    /// The command path: the payload up to the first whitespace.
    pub fn command_path(&self) -> Option<&str> {
        if !self.is_command() {
            return None;
        }
        self.payload()
            .and_then(|p| p.split_whitespace().next())
    }

    /// Everything after the command path, trimmed.
    pub fn command_args(&self) -> &str {
        let Some(payload) = self.payload().filter(|_| self.is_command()) else {
            return "";
        };
        payload
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim())
            .unwrap_or("")
    }
}

/// Collaborators shared by every handler.
pub struct Services {
    pub transport: Arc<dyn Transport>,
    pub backend: Arc<dyn Backend>,
    pub store: Arc<SessionStore>,
}

impl Services {
    pub fn new(
        transport: Arc<dyn Transport>,
        backend: Arc<dyn Backend>,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            transport,
            backend,
            store,
        }
    }
}

/// Input of a route handler.
pub struct Request {
    pub update: Inbound,
    /// The sender's session, locked for the duration of the handler.
    pub session: Option<OwnedMutexGuard<Session>>,
    pub services: Arc<Services>,
}

impl Request {
    pub fn chat_id(&self) -> ChatId {
        // Ignored updates never reach a handler.
        self.update.chat_id().unwrap_or(ChatId(0))
    }

    /// The session, or `MissingSession` for anonymous senders.
    pub fn session_mut(&mut self) -> Result<&mut Session> {
        let chat_id = self.chat_id();
        self.session
            .as_deref_mut()
            .ok_or(BotError::MissingSession(chat_id.0))
    }

    /// Split into the update, the locked session and the services.
    pub fn into_parts(self) -> Result<(Inbound, OwnedMutexGuard<Session>, Arc<Services>)> {
        let chat_id = self.chat_id();
        let session = self.session.ok_or(BotError::MissingSession(chat_id.0))?;
        Ok((self.update, session, self.services))
    }

    pub fn is_registered(&self) -> bool {
        self.session.as_ref().map(|s| s.registered).unwrap_or(false)
    }
}

/// Routes updates to handlers.
pub struct Dispatcher {
    services: Arc<Services>,
    commands: Arc<Router>,
    callbacks: Arc<Router>,
    permits: Arc<Semaphore>,
}

impl Dispatcher {
    /// Create a dispatcher running at most `max_concurrent` handlers at once.
    pub fn new(
        services: Arc<Services>,
        commands: Router,
        callbacks: Router,
        max_concurrent: usize,
    ) -> Self {
        info!(
            commands = ?commands.paths(),
            callbacks = ?callbacks.paths(),
            max_concurrent,
            "Dispatcher configured"
        );
        Self {
            services,
            commands: Arc::new(commands),
            callbacks: Arc::new(callbacks),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn store(&self) -> &SessionStore {
        &self.services.store
    }

    /// Handle one update. Errors are reported to the user, never propagated.
    pub async fn dispatch(&self, update: Inbound) {
        let Some(chat_id) = update.chat_id() else {
            trace!("Ignoring update without text or callback data");
            return;
        };

        let Ok(_permit) = self.permits.acquire().await else {
            warn!(chat_id = %chat_id, "Dispatcher closed, dropping update");
            return;
        };

        if let Inbound::Callback { id, .. } = &update {
            if let Err(e) = self.services.transport.answer_callback(id).await {
                warn!(chat_id = %chat_id, error = %e, "Failed to answer callback query");
            }
        }

        let result = if update.is_command() {
            self.dispatch_command(chat_id, update).await
        } else {
            self.dispatch_content(chat_id, update).await
        };

        if let Err(e) = result {
            self.report_failure(chat_id, e).await;
        }
    }

    async fn dispatch_command(&self, chat_id: ChatId, update: Inbound) -> Result<()> {
        let (router, channel) = if update.is_callback() {
            (&self.callbacks, "callback")
        } else {
            (&self.commands, "message")
        };
        let path = update.command_path().unwrap_or_default().to_string();
        info!(chat_id = %chat_id, channel, command = %path, "Received command");

        let session = self.services.store.find(chat_id.0).await;

        let Some(handler) = router.resolve(&path) else {
            info!(chat_id = %chat_id, channel, command = %path, "Unknown command");
            return self.unknown_command(chat_id).await;
        };

        if session.is_none() && !router.is_public(&path) {
            info!(chat_id = %chat_id, channel, command = %path, "Command requires a session");
            return self.unknown_command(chat_id).await;
        }

        let session = match session {
            Some(handle) => Some(handle.lock_owned().await),
            None => None,
        };

        handler(Request {
            update,
            session,
            services: Arc::clone(&self.services),
        })
        .await
    }

    async fn dispatch_content(&self, chat_id: ChatId, update: Inbound) -> Result<()> {
        let Inbound::Text { text, .. } = update else {
            debug!(chat_id = %chat_id, data = ?update.payload(), "Callback without command, ignoring");
            return Ok(());
        };
        info!(chat_id = %chat_id, "Received message");

        let Some(handle) = self.services.store.find(chat_id.0).await else {
            return self.unknown_command(chat_id).await;
        };
        let mut session = handle.lock().await;

        // The marker is cleared here, before any side effect can fail.
        let Some(target) = session.take_input(&text) else {
            debug!(chat_id = %chat_id, "No pending input, ignoring message");
            return Ok(());
        };
        debug!(chat_id = %chat_id, ?target, "Pending input captured");

        handlers::input_captured(&self.services, &mut session, target).await
    }

    async fn unknown_command(&self, chat_id: ChatId) -> Result<()> {
        self.services
            .transport
            .notify(chat_id, views::UNKNOWN_COMMAND)
            .await?;
        Ok(())
    }

    async fn report_failure(&self, chat_id: ChatId, error: BotError) {
        let notice = match &error {
            BotError::Transport(_) => {
                warn!(chat_id = %chat_id, error = %error, "Transport failure");
                return;
            }
            BotError::MissingSession(_) => views::UNKNOWN_COMMAND.to_string(),
            BotError::Backend(reason) => {
                warn!(chat_id = %chat_id, error = %error, "Backend failure");
                views::internal_error(reason)
            }
            other => {
                error!(chat_id = %chat_id, error = %other, "Handler failed");
                views::internal_error(&other.to_string())
            }
        };

        if let Err(e) = self.services.transport.notify(chat_id, &notice).await {
            warn!(chat_id = %chat_id, error = %e, "Failed to report error to user");
        }
    }
}
