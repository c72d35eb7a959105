//! Route handlers.
//!
//! Text commands live in [`commands`], inline keyboard actions in
//! [`callbacks`]. Both routers are built once at startup.

pub mod callbacks;
pub mod commands;

use tracing::info;

use crate::dispatch::{Request, Services};
use crate::error::Result;
use crate::router::{Router, Visibility};
use crate::session::{PendingInput, Session};
use crate::views;

/// Router for `/commands` sent as text messages.
pub fn command_router() -> Result<Router> {
    let mut router = Router::new("commands");
    router
        .route("/start", Visibility::Public, commands::start)?
        .route("/help", Visibility::Public, commands::help)?
        .route("/play", Visibility::Private, commands::play)?
        .route("/profile", Visibility::Private, commands::profile)?
        .route("/report", Visibility::Private, commands::report)?;
    Ok(router)
}

/// Router for inline keyboard actions.
pub fn callback_router() -> Result<Router> {
    let mut router = Router::new("callbacks");
    router
        .route("/register", Visibility::Private, callbacks::register)?
        .route("/profile", Visibility::Private, callbacks::profile)?
        .route("/setFirstName", Visibility::Private, callbacks::set_first_name)?
        .route("/setUserName", Visibility::Private, callbacks::set_user_name)?
        .route("/sendReport", Visibility::Private, callbacks::send_report)?
        .route("/getQuestion", Visibility::Private, callbacks::get_question)?
        .route("/showQuestion", Visibility::Private, callbacks::show_question)?
        .route("/showAnswer", Visibility::Private, callbacks::show_answer)?
        .route("/showComment", Visibility::Private, callbacks::show_comment)?
        .route("/getMathProblem", Visibility::Private, callbacks::get_math_problem)?
        .route("/settings", Visibility::Private, callbacks::settings)?
        .route("/subscriptions", Visibility::Private, callbacks::subscriptions)?
        .route("/subscribeQuestions", Visibility::Private, callbacks::toggle_questions)?
        .route("/subscribeMathProblems", Visibility::Private, callbacks::toggle_math_problems)?
        .route("/back", Visibility::Private, callbacks::back)?;
    Ok(router)
}

/// Make the next plain-text message fill `target` and tell the user.
pub(crate) async fn prompt(req: &mut Request, target: PendingInput) -> Result<()> {
    let chat_id = req.chat_id();
    req.session_mut()?.expect_input(target);
    req.services
        .transport
        .notify(chat_id, views::input_prompt(target))
        .await?;
    Ok(())
}

/// Follow-up after a pending input was written into the session.
///
/// The pending marker is already cleared when this runs.
pub async fn input_captured(
    services: &Services,
    session: &mut Session,
    target: PendingInput,
) -> Result<()> {
    let chat_id = session.chat_id();
    if target == PendingInput::ReportMessage {
        services
            .backend
            .submit_report(&session.profile(), &session.report_message)
            .await?;
        info!(chat_id = %chat_id, "Report submitted");
    }

    services
        .transport
        .notify(chat_id, &views::input_saved(target, session))
        .await?;
    Ok(())
}
