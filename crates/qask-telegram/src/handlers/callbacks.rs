//! Inline keyboard action handlers.

use tracing::{debug, info};

use crate::dispatch::{Inbound, Request};
use crate::error::Result;
use crate::screens::{self, Area};
use crate::session::{PendingInput, Session};
use crate::views::{self, CardFace};

/// Whether the pressed button sits on the current welcome message.
/// Buttons of older welcome messages are ignored.
fn on_live_welcome(update: &Inbound, session: &Session) -> bool {
    let live = session.screens(Area::Welcome).message();
    let pressed = update.callback_message();
    if live.is_some() && live == pressed {
        return true;
    }
    debug!(chat_id = %session.chat_id(), ?pressed, ?live, "Ignoring stale welcome button");
    false
}

/// `/register`: register the user with the backend.
pub async fn register(req: Request) -> Result<()> {
    let (update, mut session, services) = req.into_parts()?;
    let chat_id = session.chat_id();
    if !on_live_welcome(&update, &session) {
        return Ok(());
    }
    if session.registered {
        services
            .transport
            .notify(chat_id, views::ALREADY_REGISTERED)
            .await?;
        return Ok(());
    }

    services.backend.register_user(&session.profile()).await?;
    session.registered = true;
    info!(chat_id = %chat_id, "User registered");

    screens::replace(
        services.transport.as_ref(),
        &mut session,
        Area::Welcome,
        views::registered(),
    )
    .await?;
    services.transport.send(chat_id, &views::help(true)).await?;
    Ok(())
}

/// `/profile` (welcome screen button): profile settings.
pub async fn profile(req: Request) -> Result<()> {
    let (update, mut session, services) = req.into_parts()?;
    if !on_live_welcome(&update, &session) {
        return Ok(());
    }

    let screen = views::profile_menu(&session);
    screens::show_root(services.transport.as_ref(), &mut session, Area::Profile, screen).await?;
    Ok(())
}

pub async fn set_first_name(mut req: Request) -> Result<()> {
    super::prompt(&mut req, PendingInput::FirstName).await
}

pub async fn set_user_name(mut req: Request) -> Result<()> {
    super::prompt(&mut req, PendingInput::UserName).await
}

pub async fn send_report(mut req: Request) -> Result<()> {
    super::prompt(&mut req, PendingInput::ReportMessage).await
}

/// `/getQuestion`: fetch a question and send it as a new card.
pub async fn get_question(req: Request) -> Result<()> {
    let (_, mut session, services) = req.into_parts()?;
    let chat_id = session.chat_id();

    let question = services.backend.fetch_question(session.external_id()).await?;
    let card = views::question_card(&question, CardFace::Question);
    let message = services.transport.send(chat_id, &card).await?;
    debug!(chat_id = %chat_id, message_id = message.0, "Question card sent");

    session.current_question = Some(question);
    session.question_message = Some(message);
    Ok(())
}

pub async fn show_question(req: Request) -> Result<()> {
    flip_card(req, CardFace::Question).await
}

pub async fn show_answer(req: Request) -> Result<()> {
    flip_card(req, CardFace::Answer).await
}

pub async fn show_comment(req: Request) -> Result<()> {
    flip_card(req, CardFace::Comment).await
}

/// Show another face of the current question card.
async fn flip_card(req: Request, face: CardFace) -> Result<()> {
    let (update, session, services) = req.into_parts()?;
    let (Some(question), Some(message)) = (&session.current_question, session.question_message)
    else {
        debug!(chat_id = %session.chat_id(), "No question card to flip");
        return Ok(());
    };
    if update.callback_message() != Some(message) {
        debug!(chat_id = %session.chat_id(), "Ignoring button of an old question card");
        return Ok(());
    }
    if face == CardFace::Comment && !question.has_comment() {
        return Ok(());
    }

    let card = views::question_card(question, face);
    services
        .transport
        .edit(session.chat_id(), message, &card)
        .await?;
    Ok(())
}

pub async fn get_math_problem(req: Request) -> Result<()> {
    req.services
        .transport
        .notify(req.chat_id(), views::UNAVAILABLE_COMMAND)
        .await?;
    Ok(())
}

/// `/settings`: game settings, nested under the play menu.
pub async fn settings(req: Request) -> Result<()> {
    let (_, mut session, services) = req.into_parts()?;
    screens::show(
        services.transport.as_ref(),
        &mut session,
        Area::Play,
        views::game_settings(),
    )
    .await
}

/// `/subscriptions`: subscription toggles, nested under game settings.
pub async fn subscriptions(req: Request) -> Result<()> {
    let (_, mut session, services) = req.into_parts()?;
    let screen = views::subscription_settings(&session.subscriptions);
    screens::show(services.transport.as_ref(), &mut session, Area::Play, screen).await
}

pub async fn toggle_questions(req: Request) -> Result<()> {
    toggle_subscription(req, |session| {
        session.subscriptions.quest_feed = !session.subscriptions.quest_feed
    })
    .await
}

pub async fn toggle_math_problems(req: Request) -> Result<()> {
    toggle_subscription(req, |session| {
        session.subscriptions.math_problem_feed = !session.subscriptions.math_problem_feed
    })
    .await
}

/// Apply `toggle` and redraw the subscription screen in place. The play menu
/// at the bottom of the chain is rebuilt so going back shows current buttons.
async fn toggle_subscription(req: Request, toggle: impl FnOnce(&mut Session)) -> Result<()> {
    let (_, mut session, services) = req.into_parts()?;
    toggle(&mut *session);
    debug!(chat_id = %session.chat_id(), subscriptions = ?session.subscriptions, "Subscriptions changed");

    let menu = views::play_menu(&session.subscriptions);
    let screen = views::subscription_settings(&session.subscriptions);
    screens::replace(services.transport.as_ref(), &mut session, Area::Play, screen).await?;
    session.screens_mut(Area::Play).replace_root(menu);
    Ok(())
}

/// `/back`: previous screen of the area the button belongs to.
pub async fn back(req: Request) -> Result<()> {
    let (update, mut session, services) = req.into_parts()?;
    let area = update
        .callback_message()
        .and_then(|message| session.area_of(message))
        .unwrap_or(Area::Play);

    screens::back(services.transport.as_ref(), &mut session, area).await?;
    Ok(())
}
