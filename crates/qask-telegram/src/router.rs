//! Command routing tables.
//!
//! The bot keeps two routers: one for `/commands` typed as text messages and
//! one for callback actions sent by inline keyboard buttons. Both are built
//! once at startup and only read afterwards.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::debug;

use crate::dispatch::Request;
use crate::error::{BotError, Result};

/// Future returned by a route handler.
pub type HandlerFuture = BoxFuture<'static, Result<()>>;

/// A route handler. Receives the session (if any) and the update.
pub type Handler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Who may invoke a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Available before a session exists (bootstrap commands).
    Public,
    /// Requires an existing session.
    Private,
}

#[derive(Clone)]
struct Route {
    visibility: Visibility,
    handler: Handler,
}

/// Exact-match table of command paths.
#[derive(Clone)]
pub struct Router {
    name: &'static str,
    routes: HashMap<String, Route>,
}

impl Router {
    /// Create an empty router. `name` only shows up in logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            routes: HashMap::new(),
        }
    }

    /// Register `handler` at `path`, replacing any previous handler there.
    pub fn route<F, Fut>(&mut self, path: &str, visibility: Visibility, handler: F) -> Result<&mut Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let path = normalize(path);
        if path.is_empty() {
            return Err(BotError::EmptyRoute);
        }

        let handler: Handler = Arc::new(move |req: Request| handler(req).boxed());
        let previous = self
            .routes
            .insert(path.to_string(), Route { visibility, handler });

        if previous.is_some() {
            debug!(router = self.name, path, "Route replaced");
        } else {
            debug!(router = self.name, path, ?visibility, "Route registered");
        }
        Ok(self)
    }

    /// Look up the handler for `path`.
    pub fn resolve(&self, path: &str) -> Option<Handler> {
        let path = normalize(path);
        let handler = self.routes.get(path).map(|r| Arc::clone(&r.handler));
        debug!(router = self.name, path, found = handler.is_some(), "Resolving route");
        handler
    }

    /// Whether `path` is registered as public. Unknown paths are not.
    pub fn is_public(&self, path: &str) -> bool {
        self.routes
            .get(normalize(path))
            .map(|r| r.visibility == Visibility::Public)
            .unwrap_or(false)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(normalize(path))
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("name", &self.name)
            .field("paths", &self.paths())
            .finish()
    }
}

// Some clients append trailing spaces to button payloads.
fn normalize(path: &str) -> &str {
    path.trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop(_req: Request) -> Result<()> {
        Ok(())
    }

    #[test]
    fn test_empty_path_rejected() {
        let mut router = Router::new("test");
        assert!(matches!(
            router.route("", Visibility::Public, noop),
            Err(BotError::EmptyRoute)
        ));
        assert!(matches!(
            router.route("   ", Visibility::Public, noop),
            Err(BotError::EmptyRoute)
        ));
        assert!(router.is_empty());
    }

    #[test]
    fn test_unknown_path() {
        let mut router = Router::new("test");
        router.route("/start", Visibility::Public, noop).unwrap();

        assert!(router.resolve("/stop").is_none());
        assert!(router.resolve("/sta").is_none());
        assert!(router.resolve("/start/extra").is_none());
        assert!(!router.is_public("/stop"));
    }

    #[test]
    fn test_trailing_whitespace_trimmed() {
        let mut router = Router::new("test");
        router.route("/help", Visibility::Public, noop).unwrap();

        assert!(router.resolve("/help  ").is_some());
        assert!(router.is_public("/help \t"));
        assert!(router.resolve(" /help").is_none());
    }

    #[test]
    fn test_visibility() {
        let mut router = Router::new("test");
        router
            .route("/start", Visibility::Public, noop)
            .unwrap()
            .route("/play", Visibility::Private, noop)
            .unwrap();

        assert!(router.is_public("/start"));
        assert!(!router.is_public("/play"));
        assert!(router.contains("/play"));
        assert_eq!(router.paths(), vec!["/play", "/start"]);
    }

    #[test]
    fn test_reregistration_overwrites_visibility() {
        let mut router = Router::new("test");
        router.route("/play", Visibility::Public, noop).unwrap();
        router.route("/play", Visibility::Private, noop).unwrap();

        assert_eq!(router.len(), 1);
        assert!(!router.is_public("/play"));
    }
}
