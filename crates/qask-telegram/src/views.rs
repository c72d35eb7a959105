//! Screens and messages rendered by the bot.

use crate::screens::{Button, Screen};
use crate::session::{PendingInput, Question, Session, Subscriptions};

pub const UNKNOWN_COMMAND: &str = "Error! Unknown command";
pub const UNAVAILABLE_COMMAND: &str = "This command is not available";
pub const ALREADY_REGISTERED: &str = "You are already registered!";
pub const REPORT_RECEIVED: &str = "Your report has been received. Thank you!";

const BACK: &str = "<< Back";

const UNREGISTERED_HELP: &str = "Available commands:\n\
    /help - this help\n\
    /start - registration";

const REGISTERED_HELP: &str = "Available commands:\n\
    /play - play\n\
    /profile - profile settings\n\
    /report - report a problem";

/// Message shown when a backend call fails.
pub fn internal_error(reason: &str) -> String {
    format!(
        "An internal error occurred:\n\"{}\"\nPlease try again later.",
        reason
    )
}

pub fn help(registered: bool) -> Screen {
    Screen::new(if registered {
        REGISTERED_HELP
    } else {
        UNREGISTERED_HELP
    })
}

/// Root of the welcome area, shown on `/start`.
pub fn welcome(session: &Session) -> Screen {
    let greeting = if session.first_name.is_empty() {
        "Welcome!".to_string()
    } else {
        format!("Welcome, {}!", session.first_name)
    };

    Screen::new(format!(
        "{}\nYou need to register to play. Tap \"Register\" to do it right now.",
        greeting
    ))
    .row(vec![Button::new("Register", "/register")])
    .row(vec![Button::new("Profile settings", "/profile")])
}

/// Welcome area after a successful registration.
pub fn registered() -> Screen {
    Screen::new("Registration successful")
        .row(vec![Button::new("Profile settings", "/profile")])
}

/// Root of the profile area.
pub fn profile_menu(session: &Session) -> Screen {
    Screen::new("Profile settings")
        .row(vec![Button::new(
            format!("First name [{}]", session.first_name),
            "/setFirstName",
        )])
        .row(vec![Button::new(
            format!("Username [{}]", session.user_name),
            "/setUserName",
        )])
}

/// Root of the play area. Buttons follow the user's subscriptions.
pub fn play_menu(subscriptions: &Subscriptions) -> Screen {
    let mut screen = Screen::new("Choose an action:");
    if subscriptions.quest_feed {
        screen = screen.row(vec![Button::new("Random question", "/getQuestion")]);
    }
    if subscriptions.math_problem_feed {
        screen = screen.row(vec![Button::new("Math problem", "/getMathProblem")]);
    }
    screen.row(vec![Button::new("Game settings", "/settings")])
}

pub fn game_settings() -> Screen {
    Screen::new("Game settings")
        .row(vec![Button::new("Subscriptions", "/subscriptions")])
        .row(vec![Button::new(BACK, "/back")])
}

pub fn subscription_settings(subscriptions: &Subscriptions) -> Screen {
    Screen::new("Subscription settings")
        .row(vec![Button::new(
            format!("{} Receive questions", check(subscriptions.quest_feed)),
            "/subscribeQuestions",
        )])
        .row(vec![Button::new(
            format!("{} Receive math problems", check(subscriptions.math_problem_feed)),
            "/subscribeMathProblems",
        )])
        .row(vec![Button::new(BACK, "/back")])
}

fn check(enabled: bool) -> &'static str {
    if enabled {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Prompt shown when the bot starts waiting for `target`.
pub fn input_prompt(target: PendingInput) -> &'static str {
    match target {
        PendingInput::FirstName => "Okay, enter a new first name",
        PendingInput::UserName => "Okay, enter a new username",
        PendingInput::ReportMessage => "Okay, describe the problem",
    }
}

/// Confirmation after a profile field was captured.
pub fn input_saved(target: PendingInput, session: &Session) -> String {
    match target {
        PendingInput::FirstName => format!("First name set to \"{}\"", session.first_name),
        PendingInput::UserName => format!("Username set to \"{}\"", session.user_name),
        PendingInput::ReportMessage => REPORT_RECEIVED.to_string(),
    }
}

/// Which side of the question card is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFace {
    Question,
    Answer,
    Comment,
}

pub fn question_card(question: &Question, face: CardFace) -> Screen {
    let text = match face {
        CardFace::Question => &question.question,
        CardFace::Answer => &question.answer,
        CardFace::Comment => &question.comment,
    };

    let mut flip = Vec::new();
    if face != CardFace::Question {
        flip.push(Button::new("Show question", "/showQuestion"));
    }
    if face != CardFace::Answer {
        flip.push(Button::new("Show answer", "/showAnswer"));
    }
    if face != CardFace::Comment && question.has_comment() {
        flip.push(Button::new("Show comment", "/showComment"));
    }

    Screen::new(text.clone()).row(flip).row(vec![
        Button::new("Report a problem", "/sendReport"),
        Button::new("Next question", "/getQuestion"),
    ])
}
