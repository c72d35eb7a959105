//! Shared test doubles for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use qask_telegram::backend::{Backend, Profile};
use qask_telegram::dispatch::{Dispatcher, Inbound, Sender, Services};
use qask_telegram::error::{BotError, Result};
use qask_telegram::handlers;
use qask_telegram::screens::Screen;
use qask_telegram::session::Question;
use qask_telegram::store::{SessionHandle, SessionStore};
use qask_telegram::transport::Transport;
use teloxide::types::{ChatId, MessageId};

/// Something the bot did on the Telegram side.
#[derive(Debug, Clone, PartialEq)]
pub enum Outgoing {
    Sent {
        chat_id: ChatId,
        message_id: MessageId,
        screen: Screen,
    },
    Edited {
        chat_id: ChatId,
        message_id: MessageId,
        screen: Screen,
    },
    Answered(String),
}

/// Transport that records everything and hands out increasing message IDs.
pub struct RecordingTransport {
    next_id: AtomicI32,
    log: Mutex<Vec<Outgoing>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI32::new(100),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn log(&self) -> Vec<Outgoing> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }

    /// Messages sent to `chat`, in order.
    pub fn sent_to(&self, chat: i64) -> Vec<(MessageId, Screen)> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::Sent {
                    chat_id,
                    message_id,
                    screen,
                } if chat_id == ChatId(chat) => Some((message_id, screen)),
                _ => None,
            })
            .collect()
    }

    /// Edits made in `chat`, in order.
    pub fn edits_in(&self, chat: i64) -> Vec<(MessageId, Screen)> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::Edited {
                    chat_id,
                    message_id,
                    screen,
                } if chat_id == ChatId(chat) => Some((message_id, screen)),
                _ => None,
            })
            .collect()
    }

    pub fn last_sent_text(&self, chat: i64) -> Option<String> {
        self.sent_to(chat).last().map(|(_, s)| s.text.clone())
    }

    pub fn answered(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|o| match o {
                Outgoing::Answered(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, chat_id: ChatId, screen: &Screen) -> Result<MessageId> {
        let message_id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.log.lock().unwrap().push(Outgoing::Sent {
            chat_id,
            message_id,
            screen: screen.clone(),
        });
        Ok(message_id)
    }

    async fn edit(&self, chat_id: ChatId, message_id: MessageId, screen: &Screen) -> Result<()> {
        self.log.lock().unwrap().push(Outgoing::Edited {
            chat_id,
            message_id,
            screen: screen.clone(),
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<()> {
        self.log
            .lock()
            .unwrap()
            .push(Outgoing::Answered(callback_id.to_string()));
        Ok(())
    }
}

/// Scriptable backend.
#[derive(Default)]
pub struct MockBackend {
    pub register_error: Mutex<Option<String>>,
    pub report_error: Mutex<Option<String>>,
    pub question: Mutex<Option<Question>>,
    pub known_users: Mutex<HashMap<i64, Profile>>,
    pub registered: Mutex<Vec<Profile>>,
    pub reports: Mutex<Vec<(Profile, String)>>,
}

impl MockBackend {
    pub fn fail_registration(&self, reason: &str) {
        *self.register_error.lock().unwrap() = Some(reason.to_string());
    }

    pub fn fail_reports(&self, reason: &str) {
        *self.report_error.lock().unwrap() = Some(reason.to_string());
    }

    pub fn serve_question(&self, question: &str, answer: &str, comment: &str) {
        *self.question.lock().unwrap() = Some(Question {
            question: question.to_string(),
            answer: answer.to_string(),
            comment: comment.to_string(),
        });
    }

    pub fn know_user(&self, profile: Profile) {
        self.known_users
            .lock()
            .unwrap()
            .insert(profile.tg_id, profile);
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn register_user(&self, profile: &Profile) -> Result<()> {
        if let Some(reason) = self.register_error.lock().unwrap().clone() {
            return Err(BotError::Backend(reason));
        }
        self.registered.lock().unwrap().push(profile.clone());
        Ok(())
    }

    async fn submit_report(&self, profile: &Profile, message: &str) -> Result<()> {
        if let Some(reason) = self.report_error.lock().unwrap().clone() {
            return Err(BotError::Backend(reason));
        }
        self.reports
            .lock()
            .unwrap()
            .push((profile.clone(), message.to_string()));
        Ok(())
    }

    async fn fetch_question(&self, _tg_id: i64) -> Result<Question> {
        self.question
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BotError::Backend("no questions left".to_string()))
    }

    async fn find_user(&self, tg_id: i64) -> Result<Option<Profile>> {
        Ok(self.known_users.lock().unwrap().get(&tg_id).cloned())
    }
}

/// A dispatcher wired to the recording transport and the mock backend.
pub struct Harness {
    pub transport: Arc<RecordingTransport>,
    pub backend: Arc<MockBackend>,
    pub store: Arc<SessionStore>,
    pub dispatcher: Arc<Dispatcher>,
}

impl Harness {
    pub fn new() -> Self {
        let transport = Arc::new(RecordingTransport::new());
        let backend = Arc::new(MockBackend::default());
        let store = Arc::new(SessionStore::new());
        let services = Arc::new(Services::new(
            transport.clone(),
            backend.clone(),
            store.clone(),
        ));
        let dispatcher = Dispatcher::new(
            services,
            handlers::command_router().unwrap(),
            handlers::callback_router().unwrap(),
            8,
        );

        Self {
            transport,
            backend,
            store,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Deliver a text message from `chat`.
    pub async fn text(&self, chat: i64, text: &str) {
        self.dispatcher.dispatch(text_update(chat, text)).await;
    }

    /// Deliver a button press on `message` from `chat`.
    pub async fn press(&self, chat: i64, message: MessageId, data: &str) {
        self.dispatcher
            .dispatch(callback_update(chat, message, data))
            .await;
    }

    pub async fn session(&self, chat: i64) -> SessionHandle {
        self.store.find(chat).await.expect("session exists")
    }

    /// Run `/start` and return the welcome message ID.
    pub async fn start(&self, chat: i64) -> MessageId {
        self.text(chat, "/start").await;
        let (message, _) = self
            .transport
            .sent_to(chat)
            .pop()
            .expect("welcome screen sent");
        message
    }

    /// Start and register `chat` through the welcome screen.
    pub async fn register(&self, chat: i64) -> MessageId {
        let welcome = self.start(chat).await;
        self.press(chat, welcome, "/register").await;
        assert!(self.session(chat).await.lock().await.registered);
        welcome
    }
}

pub fn sender(chat: i64) -> Sender {
    Sender {
        id: chat,
        first_name: "Tester".to_string(),
        user_name: Some("tester".to_string()),
    }
}

pub fn text_update(chat: i64, text: &str) -> Inbound {
    Inbound::Text {
        chat_id: ChatId(chat),
        message_id: MessageId(1),
        text: text.to_string(),
        from: Some(sender(chat)),
    }
}

pub fn callback_update(chat: i64, message: MessageId, data: &str) -> Inbound {
    Inbound::Callback {
        id: format!("cb-{}-{}", chat, data),
        chat_id: ChatId(chat),
        message_id: message,
        data: data.to_string(),
        from: sender(chat),
    }
}
