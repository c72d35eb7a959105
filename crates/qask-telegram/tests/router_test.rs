//! Integration tests for route registration and resolution.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{text_update, MockBackend, RecordingTransport};
use qask_telegram::dispatch::{Request, Services};
use qask_telegram::error::{BotError, Result};
use qask_telegram::router::{Router, Visibility};
use qask_telegram::store::SessionStore;

fn services() -> Arc<Services> {
    Arc::new(Services::new(
        Arc::new(RecordingTransport::new()),
        Arc::new(MockBackend::default()),
        Arc::new(SessionStore::new()),
    ))
}

fn counting(counter: &Arc<AtomicUsize>) -> impl Fn(Request) -> futures::future::Ready<Result<()>> {
    let counter = Arc::clone(counter);
    move |_req| {
        counter.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(Ok(()))
    }
}

#[tokio::test]
async fn test_reregistration_keeps_only_second_handler() {
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let mut router = Router::new("commands");
    router
        .route("/play", Visibility::Private, counting(&first))
        .unwrap();
    router
        .route("/play", Visibility::Private, counting(&second))
        .unwrap();

    let handler = router.resolve("/play").expect("route registered");
    handler(Request {
        update: text_update(1, "/play"),
        session: None,
        services: services(),
    })
    .await
    .unwrap();

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    assert_eq!(router.len(), 1);
}

#[tokio::test]
async fn test_handler_errors_propagate() {
    let mut router = Router::new("callbacks");
    router
        .route("/fail", Visibility::Private, |_req: Request| async {
            Err::<(), _>(BotError::Backend("boom".to_string()))
        })
        .unwrap();

    let handler = router.resolve("/fail").unwrap();
    let err = handler(Request {
        update: text_update(1, "/fail"),
        session: None,
        services: services(),
    })
    .await
    .unwrap_err();

    assert!(matches!(err, BotError::Backend(reason) if reason == "boom"));
}

#[test]
fn test_unregistered_paths_do_not_resolve() {
    let commands = qask_telegram::handlers::command_router().unwrap();
    let callbacks = qask_telegram::handlers::callback_router().unwrap();

    for path in ["/stop", "/Start", "start", "/play/now", "/"] {
        assert!(commands.resolve(path).is_none(), "{} resolved", path);
        assert!(callbacks.resolve(path).is_none(), "{} resolved", path);
    }
}
