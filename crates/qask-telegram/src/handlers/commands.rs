//! Text command handlers.

use tracing::{debug, info};

use crate::dispatch::Request;
use crate::error::Result;
use crate::screens::{self, Area};
use crate::session::PendingInput;
use crate::views;

/// `/start`: create the session on first contact and show the welcome screen.
pub async fn start(mut req: Request) -> Result<()> {
    let chat_id = req.chat_id();
    let session = match req.session.take() {
        Some(session) => session,
        None => {
            let handle = req.services.store.get_or_create(chat_id.0).await;
            info!(chat_id = %chat_id, "New session");
            handle.lock_owned().await
        }
    };
    let session = req.session.insert(session);

    if let Some(sender) = req.update.sender() {
        if session.first_name.is_empty() {
            session.first_name = sender.first_name.clone();
        }
        if session.user_name.is_empty() {
            session.user_name = sender.user_name.clone().unwrap_or_default();
        }
    }

    let transport = req.services.transport.as_ref();
    if session.registered {
        transport.notify(chat_id, views::ALREADY_REGISTERED).await?;
        return Ok(());
    }

    let screen = views::welcome(session);
    screens::show_root(transport, session, Area::Welcome, screen).await?;
    Ok(())
}

/// `/help`: command list matching the sender's registration state.
pub async fn help(req: Request) -> Result<()> {
    req.services
        .transport
        .send(req.chat_id(), &views::help(req.is_registered()))
        .await?;
    Ok(())
}

/// `/play`: the play menu. Users registered elsewhere are recognized through
/// the backend.
pub async fn play(mut req: Request) -> Result<()> {
    let chat_id = req.chat_id();
    let services = req.services.clone();
    let session = req.session_mut()?;

    if !session.registered {
        match services.backend.find_user(session.external_id()).await? {
            Some(profile) => {
                info!(chat_id = %chat_id, "Known backend user, marking registered");
                if !profile.first_name.is_empty() {
                    session.first_name = profile.first_name;
                }
                if !profile.user_name.is_empty() {
                    session.user_name = profile.user_name;
                }
                session.registered = true;
            }
            None => {
                debug!(chat_id = %chat_id, "Unregistered user asked to play");
                services
                    .transport
                    .notify(chat_id, views::UNAVAILABLE_COMMAND)
                    .await?;
                return Ok(());
            }
        }
    }

    let screen = views::play_menu(&session.subscriptions);
    screens::show_root(services.transport.as_ref(), session, Area::Play, screen).await?;
    Ok(())
}

/// `/profile`: the profile settings screen.
pub async fn profile(mut req: Request) -> Result<()> {
    let services = req.services.clone();
    let session = req.session_mut()?;
    let screen = views::profile_menu(session);
    screens::show_root(services.transport.as_ref(), session, Area::Profile, screen).await?;
    Ok(())
}

/// `/report`: wait for a problem description.
pub async fn report(mut req: Request) -> Result<()> {
    super::prompt(&mut req, PendingInput::ReportMessage).await
}
