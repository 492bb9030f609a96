//! Tests for session module

use super::*;
use crate::adapter::HasMoreRule;
use crate::dedup::Identity;
use crate::pager::PageOutcome;
use crate::scroll::{ScrollMetrics, ScrollRegion, ScrollSource};
use crate::test_support::{items, ScriptedFetcher};
use crate::types::FetchMode;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn session(fetcher: &Arc<ScriptedFetcher>, limit: u32) -> Session<Value, Value> {
    Session::new(SessionConfig::<Value, Value>::json(fetcher.clone()).with_limit(limit)).unwrap()
}

fn bulk_session(fetcher: &Arc<ScriptedFetcher>, limit: u32) -> Session<Value, Value> {
    Session::new(
        SessionConfig::<Value, Value>::json(fetcher.clone())
            .with_limit(limit)
            .with_mode(FetchMode::Bulk),
    )
    .unwrap()
}

/// Scroll position at `fraction` of the scrollable distance
fn scrolled(fraction: f64) -> ScrollMetrics {
    ScrollMetrics::new(fraction * 1000.0, 1600.0, 600.0)
}

// ============================================================================
// SessionConfig Tests
// ============================================================================

#[test]
fn test_config_defaults() {
    let config = SessionConfig::<Value, Value>::json(ScriptedFetcher::new());
    assert_eq!(config.limit, 20);
    assert_eq!(config.mode, FetchMode::Sequential);
    assert_eq!(config.scroll_threshold, 0.8);
    assert_eq!(config.initial_page, 1);
    assert!(matches!(config.has_more, HasMoreRule::PageFull));
    assert!(matches!(&config.identity, Identity::Field(f) if f == "id"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_builder() {
    let config = SessionConfig::<Value, Value>::json(ScriptedFetcher::new())
        .with_limit(50)
        .with_mode(FetchMode::Bulk)
        .with_scroll_threshold(0.6)
        .with_initial_page(2)
        .with_identity(Identity::field("uuid"));

    assert_eq!(config.limit, 50);
    assert_eq!(config.mode, FetchMode::Bulk);
    assert_eq!(config.scroll_threshold, 0.6);
    assert_eq!(config.initial_page, 2);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validation() {
    let zero_limit = SessionConfig::<Value, Value>::json(ScriptedFetcher::new()).with_limit(0);
    assert!(zero_limit.validate().is_err());

    let bad_threshold =
        SessionConfig::<Value, Value>::json(ScriptedFetcher::new()).with_scroll_threshold(1.5);
    assert!(Session::new(bad_threshold).is_err());

    let empty_field = SessionConfig::<Value, Value>::json(ScriptedFetcher::new())
        .with_identity(Identity::field(" "));
    assert!(empty_field.validate().is_err());

    let zero_page =
        SessionConfig::<Value, Value>::json(ScriptedFetcher::new()).with_initial_page(0);
    let err = Session::new(zero_page).unwrap_err();
    assert!(err.to_string().contains("initial_page"));
}

// ============================================================================
// Activation Tests
// ============================================================================

#[tokio::test]
async fn test_activate_twice_fetches_once() {
    let fetcher = Arc::new(ScriptedFetcher::new().page(1, items(1..=2)));
    let session = session(&fetcher, 2);

    let (first, second) = tokio::join!(session.activate(), session.activate());

    assert!(first.is_loaded());
    assert!(second.is_skipped());
    assert_eq!(fetcher.calls(), vec![1]);

    assert!(session.activate().await.is_skipped());
    assert_eq!(fetcher.calls(), vec![1]);
}

#[tokio::test]
async fn test_load_next_page_activates_first() {
    let fetcher = Arc::new(ScriptedFetcher::new().page(1, items(1..=2)));
    let session = session(&fetcher, 2);
    assert!(!session.is_activated());

    session.load_next_page().await;

    assert!(session.is_activated());
    assert_eq!(fetcher.calls(), vec![1]);
    assert_eq!(session.state().items, items(1..=2));
}

#[tokio::test]
async fn test_end_to_end_short_final_page() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(1, vec![json!({"id": 1}), json!({"id": 2})])
            .page(2, vec![json!({"id": 3})]),
    );
    let session = session(&fetcher, 2);

    session.activate().await;
    session.load_next_page().await;

    let state = session.state();
    assert_eq!(state.items, vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
    assert!(!state.has_more);
    assert_eq!(state.current_page, 1);
    assert_eq!(state.last_loaded_page, Some(2));
    assert!(!state.loading);
    assert!(!state.initial_loading);
    assert_eq!(state.error, None);

    // Exhausted: further calls never reach the fetcher
    assert!(session.load_next_page().await.is_skipped());
    assert_eq!(fetcher.calls(), vec![1, 2]);
}

#[tokio::test]
async fn test_failed_page_is_retried() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(1, items(1..=2))
            .fail(2, 503, r#"{"responseObject": {"message": "Try again later"}}"#),
    );
    let session = session(&fetcher, 2);

    session.activate().await;
    session.load_next_page().await;
    session.load_next_page().await;

    let state = session.state();
    assert_eq!(state.items, items(1..=2));
    assert_eq!(state.error.as_deref(), Some("Try again later"));
    assert_eq!(fetcher.calls(), vec![1, 2, 2]);
    assert_eq!(session.stats().errors, 2);
}

#[tokio::test]
async fn test_failed_first_page_is_retried() {
    let fetcher = Arc::new(ScriptedFetcher::new().fail(1, 500, ""));
    let session = session(&fetcher, 2);

    session.activate().await;
    assert_eq!(session.state().error.as_deref(), Some("HTTP 500: "));

    session.load_next_page().await;
    assert_eq!(fetcher.calls(), vec![1, 1]);
}

// ============================================================================
// Reset / Refresh Tests
// ============================================================================

#[tokio::test]
async fn test_reset_after_forty_items() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(1, items(1..=20))
            .page(2, items(21..=40)),
    );
    let session = session(&fetcher, 20);

    session.activate().await;
    session.load_next_page().await;
    assert_eq!(session.state().len(), 40);

    session.reset();

    let state = session.state();
    assert!(state.items.is_empty());
    assert_eq!(state.current_page, 1);
    assert!(state.has_more);
    assert_eq!(state.error, None);
    assert!(state.initial_loading);
    assert!(!session.is_activated());
    // Reset alone does not fetch
    assert_eq!(fetcher.calls(), vec![1, 2]);

    session.activate().await;
    assert_eq!(fetcher.calls(), vec![1, 2, 1]);
    assert_eq!(session.state().items, items(1..=20));
}

#[tokio::test]
async fn test_refresh_replaces_items() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(1, items(1..=2))
            .page(2, items(3..=4)),
    );
    let session = session(&fetcher, 2);

    session.activate().await;
    session.load_next_page().await;
    assert_eq!(session.state().len(), 4);

    let outcome = session.refresh().await;

    assert!(outcome.is_loaded());
    let state = session.state();
    assert_eq!(state.items, items(1..=2));
    assert_eq!(state.current_page, 1);
    assert!(state.has_more);
    assert!(session.is_activated());
    assert_eq!(fetcher.calls(), vec![1, 2, 1]);

    // Guard is lowered, so paging resumes
    session.load_next_page().await;
    assert_eq!(fetcher.calls(), vec![1, 2, 1, 2]);
}

#[tokio::test]
async fn test_reset_discards_in_flight_activation() {
    let gate = Arc::new(Notify::new());
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(1, items(1..=2))
            .wait_for(1, gate.clone()),
    );
    let session = session(&fetcher, 2);

    let mut activation = tokio_test::task::spawn({
        let session = session.clone();
        async move { session.activate().await }
    });
    tokio_test::assert_pending!(activation.poll());

    session.reset();
    gate.notify_one();

    let outcome = tokio_test::assert_ready!(activation.poll());
    assert_eq!(outcome, PageOutcome::Discarded);
    assert!(session.state().items.is_empty());
    assert!(session.state().initial_loading);
    assert_eq!(session.stats().stale_discarded, 1);
}

#[tokio::test]
async fn test_reset_discards_in_flight_refresh() {
    let gate = Arc::new(Notify::new());
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(1, items(1..=2))
            .wait_for(1, gate.clone()),
    );
    let session = session(&fetcher, 2);

    let mut refresh = tokio_test::task::spawn({
        let session = session.clone();
        async move { session.refresh().await }
    });
    tokio_test::assert_pending!(refresh.poll());

    // Paging is blocked while the refresh owns the session
    assert!(session.state().loading);
    assert!(session.load_next_page().await.is_skipped());

    session.reset();
    gate.notify_one();

    let outcome = tokio_test::assert_ready!(refresh.poll());
    assert_eq!(outcome, PageOutcome::Discarded);
    assert!(session.state().items.is_empty());

    // The next activation starts from scratch
    gate.notify_one();
    assert!(session.activate().await.is_loaded());
    assert_eq!(session.state().items, items(1..=2));
}

#[tokio::test]
async fn test_reset_discards_in_flight_bulk_round() {
    let gate = Arc::new(Notify::new());
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page_with_total(1, items(1..=2), 3)
            .page(2, items(3..=4))
            .page(3, items(5..=6))
            .wait_for(2, gate.clone()),
    );
    let session = bulk_session(&fetcher, 2);

    let mut round = tokio_test::task::spawn({
        let session = session.clone();
        async move { session.activate().await }
    });
    tokio_test::assert_pending!(round.poll());
    assert_eq!(fetcher.completed(), vec![1, 3]);

    session.reset();
    gate.notify_one();

    let outcome = tokio_test::assert_ready!(round.poll());
    assert_eq!(outcome, PageOutcome::Discarded);
    assert!(session.state().items.is_empty());
    assert!(session.state().has_more);
    assert_eq!(session.stats().stale_discarded, 1);

    // A fresh round after the reset applies normally
    gate.notify_one();
    assert!(session.activate().await.is_loaded());
    assert_eq!(session.state().items, items(1..=6));
}

// ============================================================================
// Bulk Mode Tests
// ============================================================================

#[tokio::test]
async fn test_bulk_activation_fetches_everything() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page_with_total(1, items(1..=2), 3)
            .page_with_total(2, items(3..=4), 3)
            .page_with_total(3, items(5..=5), 3),
    );
    let session = bulk_session(&fetcher, 2);

    session.activate().await;

    let state = session.state();
    assert_eq!(state.items, items(1..=5));
    assert!(!state.has_more);
    assert_eq!(fetcher.calls().len(), 3);

    assert!(session.load_next_page().await.is_skipped());
    assert_eq!(fetcher.calls().len(), 3);
}

#[tokio::test]
async fn test_bulk_refresh_reruns_every_page() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page_with_total(1, items(1..=2), 2)
            .page_with_total(2, items(3..=4), 2),
    );
    let session = bulk_session(&fetcher, 2);

    session.activate().await;
    session.refresh().await;

    assert_eq!(session.state().items, items(1..=4));
    assert_eq!(fetcher.calls().len(), 4);
}

#[tokio::test]
async fn test_fetch_all_in_sequential_session() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page_with_total(1, items([1, 2]), 2)
            .page_with_total(2, items([2, 3]), 2),
    );
    let session = session(&fetcher, 2);

    session.fetch_all().await;

    assert!(session.is_activated());
    assert_eq!(session.state().items, items([1, 2, 3]));
    assert_eq!(session.stats().duplicates_dropped, 1);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Post {
    id: u64,
    title: String,
}

#[tokio::test]
async fn test_typed_items() {
    let fetcher = Arc::new(ScriptedFetcher::new().page(
        1,
        vec![json!({"id": 7, "title": "hello"}), json!({"id": 8, "title": "world"})],
    ));
    let session: Session<Value, Post> =
        Session::new(SessionConfig::<Value, Post>::json(fetcher.clone())).unwrap();

    session.activate().await;

    let state = session.state();
    assert_eq!(
        state.items,
        vec![
            Post {
                id: 7,
                title: "hello".into()
            },
            Post {
                id: 8,
                title: "world".into()
            },
        ]
    );
    // Short page with the default limit
    assert!(!state.has_more);
}

// ============================================================================
// Scroll Tests
// ============================================================================

#[tokio::test]
async fn test_scroll_past_threshold_loads_next_page() {
    let fetcher = Arc::new(
        ScriptedFetcher::new()
            .page(1, items(1..=2))
            .page(2, items(3..=4)),
    );
    let session = session(&fetcher, 2);
    session.register_scroll_container(None).unwrap();
    session.activate().await;

    session.viewport().emit(scrolled(0.79));
    tokio::task::yield_now().await;
    assert_eq!(fetcher.calls(), vec![1]);

    let mut rx = session.subscribe();
    session.viewport().emit(scrolled(0.81));
    tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|s| s.last_loaded_page == Some(2)),
    )
    .await
    .expect("scroll fetch timed out")
    .unwrap();

    assert_eq!(fetcher.calls(), vec![1, 2]);
    assert_eq!(session.state().items, items(1..=4));
}

#[tokio::test]
async fn test_register_custom_container_replaces_viewport() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let session = session(&fetcher, 2);
    let feed = ScrollRegion::element("feed");

    session.register_scroll_container(None).unwrap();
    assert_eq!(session.viewport().listener_count(), 1);

    let container: Arc<dyn ScrollSource> = Arc::new(feed.clone());
    session.register_scroll_container(Some(container)).unwrap();
    assert_eq!(session.viewport().listener_count(), 0);
    assert_eq!(feed.listener_count(), 1);
    assert!(session.is_scroll_attached());

    session.detach_scroll();
    assert_eq!(feed.listener_count(), 0);
    assert!(!session.is_scroll_attached());
}

#[tokio::test]
async fn test_dropping_session_detaches_scroll() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let feed = ScrollRegion::element("feed");
    {
        let session = session(&fetcher, 2);
        session
            .register_scroll_container(Some(Arc::new(feed.clone())))
            .unwrap();
        assert_eq!(feed.listener_count(), 1);
    }
    assert_eq!(feed.listener_count(), 0);

    // Events after teardown are harmless
    feed.emit(scrolled(0.95));
    assert!(fetcher.calls().is_empty());
}

#[test]
fn test_register_scroll_requires_runtime() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let session = session(&fetcher, 2);

    let err = session.register_scroll_container(None).unwrap_err();
    assert!(err.to_string().contains("no tokio runtime"));
}

#[test]
fn test_session_accessors() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    let session = Session::new(
        SessionConfig::<Value, Value>::json(fetcher)
            .with_limit(5)
            .with_initial_page(3)
            .with_scroll_threshold(0.5),
    )
    .unwrap();

    assert_eq!(session.limit(), 5);
    assert_eq!(session.initial_page(), 3);
    assert_eq!(session.scroll_threshold(), 0.5);
    assert_eq!(session.mode(), FetchMode::Sequential);
    assert_eq!(session.state().current_page, 3);
    assert!(format!("{:?}", session).contains("Session"));
}
