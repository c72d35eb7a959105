//! Client for the qask backend.
//!
//! Every call is a single attempt bounded by the configured timeout. Failures
//! surface as [`BotError::Backend`] carrying the reason reported by the
//! backend (the response body) or by the HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::BotConfig;
use crate::error::{BotError, Result};
use crate::session::Question;

/// Value of the `from` field identifying this front-end to the backend.
pub const CLIENT_ORIGIN: &str = "telegram";

/// User identity as the backend knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub tg_id: i64,
}

/// Operations the bot needs from the quiz backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Register a new user. Succeeds only on `201 Created`.
    async fn register_user(&self, profile: &Profile) -> Result<()>;

    /// Submit a problem report about the current question.
    async fn submit_report(&self, profile: &Profile, message: &str) -> Result<()>;

    /// Fetch the next question for a user.
    async fn fetch_question(&self, tg_id: i64) -> Result<Question>;

    /// Look up a user registered on another session. `None` when unknown.
    async fn find_user(&self, tg_id: i64) -> Result<Option<Profile>>;
}

#[derive(Serialize)]
struct UserRequest<'a> {
    #[serde(flatten)]
    profile: &'a Profile,
    from: &'static str,
}

#[derive(Serialize)]
struct ReportRequest<'a> {
    #[serde(flatten)]
    profile: &'a Profile,
    from: &'static str,
    message: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRequest {
    tg_id: i64,
    from: &'static str,
}

#[derive(Serialize)]
struct LookupRequest {
    from: &'static str,
}

/// HTTP implementation of [`Backend`].
#[derive(Debug, Clone)]
pub struct QaskClient {
    http: reqwest::Client,
    base_url: Url,
}

impl QaskClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    /// Create a client from the bot configuration.
    pub fn from_config(config: &BotConfig) -> Result<Self> {
        Self::new(&config.backend_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

/// Map any status other than `201 Created` to an error carrying the body.
async fn expect_created(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    if status == StatusCode::CREATED {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    let reason = if body.trim().is_empty() {
        status.to_string()
    } else {
        body.trim().to_string()
    };
    Err(BotError::Backend(reason))
}

#[async_trait]
impl Backend for QaskClient {
    async fn register_user(&self, profile: &Profile) -> Result<()> {
        let url = self.endpoint("users")?;
        debug!(tg_id = profile.tg_id, %url, "Registering user");

        let response = self
            .http
            .post(url)
            .json(&UserRequest {
                profile,
                from: CLIENT_ORIGIN,
            })
            .send()
            .await?;

        expect_created(response).await.inspect_err(|e| {
            warn!(tg_id = profile.tg_id, error = %e, "Registration rejected");
        })?;
        info!(tg_id = profile.tg_id, "User registered");
        Ok(())
    }

    async fn submit_report(&self, profile: &Profile, message: &str) -> Result<()> {
        let url = self.endpoint("reports")?;
        debug!(tg_id = profile.tg_id, %url, "Submitting report");

        let response = self
            .http
            .post(url)
            .json(&ReportRequest {
                profile,
                from: CLIENT_ORIGIN,
                message,
            })
            .send()
            .await?;

        expect_created(response).await?;
        info!(tg_id = profile.tg_id, "Report submitted");
        Ok(())
    }

    async fn fetch_question(&self, tg_id: i64) -> Result<Question> {
        let url = self.endpoint("questions")?;
        debug!(tg_id, %url, "Fetching question");

        // The backend expects a JSON body even on GET.
        let response = self
            .http
            .get(url)
            .json(&QuestionRequest {
                tg_id,
                from: CLIENT_ORIGIN,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Backend(format!("{}: {}", status, body.trim())));
        }

        let body = response.text().await?;
        let question: Question = serde_json::from_str(&body)
            .map_err(|e| BotError::Backend(format!("malformed question: {}", e)))?;
        Ok(question)
    }

    async fn find_user(&self, tg_id: i64) -> Result<Option<Profile>> {
        let url = self.endpoint(&format!("users/tgid/{}", tg_id))?;
        debug!(tg_id, %url, "Looking up user");

        let response = self
            .http
            .get(url)
            .json(&LookupRequest {
                from: CLIENT_ORIGIN,
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Backend(format!("{}: {}", status, body.trim())));
        }

        let body = response.text().await?;
        let mut profile: Profile = serde_json::from_str(&body)
            .map_err(|e| BotError::Backend(format!("malformed user: {}", e)))?;
        profile.tg_id = tg_id;
        Ok(Some(profile))
    }
}
