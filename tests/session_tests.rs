//! Engine session memoization, retry and timeout behavior

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use clipmerge::engine::EngineSession;
use clipmerge::ports::EngineLoadConfig;
use clipmerge::ErrorKind;
use common::*;

fn session(engine: &Arc<ScriptedEngine>) -> (EngineSession, Arc<ScriptedFactory>) {
    let factory = ScriptedFactory::new(Arc::clone(engine));
    let session = EngineSession::new(factory.clone(), EngineLoadConfig::default());
    (session, factory)
}

#[tokio::test]
async fn test_concurrent_callers_share_one_load() {
    let engine = ScriptedEngine::new();
    engine.delay_loads(Duration::from_millis(30));
    let (session, factory) = session(&engine);

    let (a, b) = tokio::join!(session.ensure_ready(), session.ensure_ready());

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(engine.load_count(), 1);
    assert_eq!(factory.created.load(Ordering::SeqCst), 1);
    assert!(session.is_ready());
}

#[tokio::test]
async fn test_ready_session_does_not_reload() {
    let engine = ScriptedEngine::new();
    let (session, _factory) = session(&engine);

    session.ensure_ready().await.unwrap();
    session.acquire().await.unwrap();

    assert_eq!(engine.load_count(), 1);
}

#[tokio::test]
async fn test_failed_load_is_retried_on_next_call() {
    let engine = ScriptedEngine::new();
    engine.fail_loads(1);
    let (session, factory) = session(&engine);

    let err = session.ensure_ready().await.err().unwrap();
    assert_eq!(err.kind(), ErrorKind::EngineUnavailable);
    assert!(!session.is_ready());

    session.ensure_ready().await.unwrap();
    assert_eq!(engine.load_count(), 2);
    assert_eq!(factory.created.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_waiter_retries_when_inflight_load_fails() {
    let engine = ScriptedEngine::new();
    engine.fail_loads(1);
    engine.delay_loads(Duration::from_millis(10));
    let (session, _factory) = session(&engine);

    let (first, second) = tokio::join!(session.ensure_ready(), session.ensure_ready());

    assert!(first.is_err());
    assert!(second.is_ok());
    assert_eq!(engine.load_count(), 2);
}

#[tokio::test]
async fn test_slow_load_times_out() {
    let engine = ScriptedEngine::new();
    engine.delay_loads(Duration::from_millis(500));
    let (session, _factory) = session(&engine);
    let session = session.with_ready_timeout(Duration::from_millis(20));

    let err = session.acquire().await.err().unwrap();

    assert_eq!(err.kind(), ErrorKind::EngineUnavailable);
    assert!(err.to_string().contains("timed out"));
    assert!(!session.is_ready());
}
