//! Editable multi-screen messages.
//!
//! Every UI area (welcome, profile, play) owns one live Telegram message and a
//! stack of the screens shown in it. Nested screens edit the live message and
//! push onto the stack; `/back` pops and re-renders the previous screen.

use teloxide::types::MessageId;
use tracing::debug;

use crate::error::Result;
use crate::session::Session;
use crate::transport::Transport;

/// Maximum number of screens remembered per area. Older ones are dropped.
pub const MAX_SCREEN_DEPTH: usize = 8;

/// A UI area that owns its own editable message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    Welcome,
    Profile,
    Play,
}

impl Area {
    /// All areas, in lookup order.
    pub const ALL: [Area; 3] = [Area::Welcome, Area::Profile, Area::Play];
}

/// An inline keyboard button that triggers a callback action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }
}

/// One rendered page: text plus an inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Screen {
    pub text: String,
    pub rows: Vec<Vec<Button>>,
}

impl Screen {
    /// Create a screen without buttons.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rows: Vec::new(),
        }
    }

    /// Append a keyboard row.
    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }

    /// Whether the screen carries an inline keyboard.
    pub fn has_keyboard(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Iterate over all callback actions on this screen.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(|b| b.action.as_str())
    }
}

/// Back-navigation stack of one area, newest screen last.
#[derive(Debug, Default)]
pub struct ScreenStack {
    screens: Vec<Screen>,
    message: Option<MessageId>,
}

impl ScreenStack {
    /// The screen currently shown, if any.
    pub fn head(&self) -> Option<&Screen> {
        self.screens.last()
    }

    /// The screen `back` would return to.
    pub fn previous(&self) -> Option<&Screen> {
        self.screens.len().checked_sub(2).map(|i| &self.screens[i])
    }

    pub fn depth(&self) -> usize {
        self.screens.len()
    }

    /// Live message handle of the area.
    pub fn message(&self) -> Option<MessageId> {
        self.message
    }

    pub fn set_message(&mut self, message: MessageId) {
        self.message = Some(message);
    }

    /// Start a fresh chain with `screen` as its only entry.
    pub fn reset(&mut self, screen: Screen) {
        self.screens.clear();
        self.screens.push(screen);
    }

    /// Push a screen on top of the chain.
    pub fn push(&mut self, screen: Screen) {
        if self.screens.len() == MAX_SCREEN_DEPTH {
            self.screens.remove(0);
        }
        self.screens.push(screen);
    }

    /// Swap the head for `screen` without growing the chain.
    pub fn replace(&mut self, screen: Screen) {
        match self.screens.last_mut() {
            Some(head) => *head = screen,
            None => self.screens.push(screen),
        }
    }

    /// Swap the bottom of the chain, leaving the screens above it in place.
    pub fn replace_root(&mut self, screen: Screen) {
        match self.screens.first_mut() {
            Some(root) => *root = screen,
            None => self.screens.push(screen),
        }
    }

    /// Drop the head and return the new one. No-op without history.
    pub fn back(&mut self) -> Option<&Screen> {
        if self.screens.len() < 2 {
            return None;
        }
        self.screens.pop();
        self.screens.last()
    }
}

/// Render `screen` as a new message and make it the root of `area`.
pub async fn show_root(
    transport: &dyn Transport,
    session: &mut Session,
    area: Area,
    screen: Screen,
) -> Result<MessageId> {
    let message = transport.send(session.chat_id(), &screen).await?;
    let stack = session.screens_mut(area);
    stack.reset(screen);
    stack.set_message(message);
    debug!(chat_id = %session.external_id(), ?area, "Root screen rendered");
    Ok(message)
}

/// Render a nested screen in `area`, editing its live message when possible.
pub async fn show(
    transport: &dyn Transport,
    session: &mut Session,
    area: Area,
    screen: Screen,
) -> Result<()> {
    render_in_place(transport, session, area, &screen).await?;
    session.screens_mut(area).push(screen);
    Ok(())
}

/// Re-render the head of `area` with new content, keeping the chain length.
pub async fn replace(
    transport: &dyn Transport,
    session: &mut Session,
    area: Area,
    screen: Screen,
) -> Result<()> {
    render_in_place(transport, session, area, &screen).await?;
    session.screens_mut(area).replace(screen);
    Ok(())
}

/// Navigate back in `area`. Returns false when there is nothing to go back to.
pub async fn back(transport: &dyn Transport, session: &mut Session, area: Area) -> Result<bool> {
    let stack = session.screens(area);
    let (Some(message), Some(previous)) = (stack.message(), stack.previous().cloned()) else {
        debug!(chat_id = %session.external_id(), ?area, "Nothing to go back to");
        return Ok(false);
    };

    transport.edit(session.chat_id(), message, &previous).await?;
    session.screens_mut(area).back();
    Ok(true)
}

async fn render_in_place(
    transport: &dyn Transport,
    session: &mut Session,
    area: Area,
    screen: &Screen,
) -> Result<()> {
    let chat_id = session.chat_id();
    match session.screens(area).message() {
        Some(message) => transport.edit(chat_id, message, screen).await,
        None => {
            let message = transport.send(chat_id, screen).await?;
            session.screens_mut(area).set_message(message);
            Ok(())
        }
    }
}
