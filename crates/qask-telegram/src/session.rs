//! Per-user conversational state.

use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId, MessageId};

use crate::backend::Profile;
use crate::screens::{Area, ScreenStack};

/// Session field that captures the next plain-text message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    FirstName,
    UserName,
    ReportMessage,
}

/// Content feeds a user receives on the play screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscriptions {
    pub quest_feed: bool,
    pub math_problem_feed: bool,
}

impl Default for Subscriptions {
    fn default() -> Self {
        Self {
            quest_feed: true,
            math_problem_feed: true,
        }
    }
}

/// A quiz item returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub comment: String,
}

impl Question {
    pub fn has_comment(&self) -> bool {
        !self.comment.trim().is_empty()
    }
}

/// A user's session, kept in memory for the lifetime of the process.
#[derive(Debug)]
pub struct Session {
    /// Telegram chat ID (the user ID in private chats).
    external_id: i64,
    pub first_name: String,
    pub user_name: String,
    /// Set only after the backend confirmed the registration.
    pub registered: bool,
    pub subscriptions: Subscriptions,
    /// Last report text captured from the user.
    pub report_message: String,
    /// Question currently shown on the question card.
    pub current_question: Option<Question>,
    /// Message holding the question card.
    pub question_message: Option<MessageId>,
    pending_input: Option<PendingInput>,
    welcome: ScreenStack,
    profile: ScreenStack,
    play: ScreenStack,
}

impl Session {
    /// Create a new, unregistered session.
    pub fn new(external_id: i64) -> Self {
        Self {
            external_id,
            first_name: String::new(),
            user_name: String::new(),
            registered: false,
            subscriptions: Subscriptions::default(),
            report_message: String::new(),
            current_question: None,
            question_message: None,
            pending_input: None,
            welcome: ScreenStack::default(),
            profile: ScreenStack::default(),
            play: ScreenStack::default(),
        }
    }

    pub fn external_id(&self) -> i64 {
        self.external_id
    }

    pub fn chat_id(&self) -> ChatId {
        ChatId(self.external_id)
    }

    /// Identity sent to the backend.
    pub fn profile(&self) -> Profile {
        Profile {
            first_name: self.first_name.clone(),
            user_name: self.user_name.clone(),
            tg_id: self.external_id,
        }
    }

    /// Capture the next plain-text message into `target`.
    pub fn expect_input(&mut self, target: PendingInput) {
        self.pending_input = Some(target);
    }

    pub fn pending_input(&self) -> Option<PendingInput> {
        self.pending_input
    }

    /// Write `text` into the pending field and clear the marker.
    ///
    /// Returns the field that was filled, or `None` when no input was expected.
    pub fn take_input(&mut self, text: &str) -> Option<PendingInput> {
        let target = self.pending_input.take()?;
        let value = text.trim().to_string();
        match target {
            PendingInput::FirstName => self.first_name = value,
            PendingInput::UserName => self.user_name = value,
            PendingInput::ReportMessage => self.report_message = value,
        }
        Some(target)
    }

    pub fn screens(&self, area: Area) -> &ScreenStack {
        match area {
            Area::Welcome => &self.welcome,
            Area::Profile => &self.profile,
            Area::Play => &self.play,
        }
    }

    pub fn screens_mut(&mut self, area: Area) -> &mut ScreenStack {
        match area {
            Area::Welcome => &mut self.welcome,
            Area::Profile => &mut self.profile,
            Area::Play => &mut self.play,
        }
    }

    /// Find the area whose live message is `message`.
    pub fn area_of(&self, message: MessageId) -> Option<Area> {
        Area::ALL
            .into_iter()
            .find(|&area| self.screens(area).message() == Some(message))
    }
}
