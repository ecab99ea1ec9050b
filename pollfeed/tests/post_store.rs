//! Behavioral tests for PostStore: loading, the display state machine and
//! voting.

mod common;

use std::time::Duration;

use chrono::Utc;
use pollfeed::{
    DisplayState, Event, PostRef, PostStore, StaticProvider, StoreConfig, StoreError, VoteOutcome,
};
use tokio_stream::StreamExt;

use common::{immediate_store, mock_option, mock_post, mock_posts};

const SETTLE: Duration = Duration::from_millis(2500);

fn delayed_store(provider: StaticProvider) -> PostStore<StaticProvider> {
    PostStore::new(provider, StoreConfig::default().with_settle_delay(SETTLE))
}

// =============================================================================
// Loading and display state
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_load_with_posts_settles_on_posts_after_delay() {
    let store = delayed_store(StaticProvider::new(mock_posts(7)));
    assert_eq!(store.state(), DisplayState::Loading);

    assert_eq!(store.load().await.unwrap(), 7);
    // Cells arrive immediately, the state only after the settling delay.
    assert_eq!(store.cells().len(), 7);
    assert_eq!(store.state(), DisplayState::Loading);

    tokio::time::sleep(Duration::from_millis(2400)).await;
    assert_eq!(store.state(), DisplayState::Loading);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(store.state(), DisplayState::Posts);
    assert_eq!(store.cells().len(), 7);
}

#[tokio::test(start_paused = true)]
async fn test_load_without_posts_settles_on_empty() {
    let store = delayed_store(StaticProvider::new(vec![]));

    assert_eq!(store.load().await.unwrap(), 0);
    assert_eq!(store.state(), DisplayState::Loading);

    tokio::time::sleep(SETTLE + Duration::from_millis(100)).await;
    assert_eq!(store.state(), DisplayState::Empty);
    assert!(store.cells().is_empty());
    assert!(store.current_user().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_settles_on_empty() {
    let store = delayed_store(StaticProvider::failing("source not found"));

    assert!(store.load().await.is_err());
    assert!(store.posts().is_empty());

    tokio::time::sleep(SETTLE + Duration::from_millis(100)).await;
    assert_eq!(store.state(), DisplayState::Empty);
    assert!(store.posts().is_empty());
    assert!(store.cells().is_empty());
}

#[tokio::test]
async fn test_failed_load_can_be_retried() {
    let (store, provider) = immediate_store(mock_posts(2));
    provider.set_failure(Some("unreadable".into()));

    assert!(store.load().await.is_err());
    assert_eq!(store.state(), DisplayState::Empty);

    provider.set_failure(None);
    assert_eq!(store.load().await.unwrap(), 2);
    assert_eq!(store.state(), DisplayState::Posts);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_refresh_cycles_through_refreshing() {
    let (store, provider) = immediate_store(mock_posts(3));
    store.load().await.unwrap();
    let mut events = store.subscribe();

    provider.set_posts(mock_posts(5));
    assert_eq!(store.refresh().await.unwrap(), 5);
    assert_eq!(store.state(), DisplayState::Posts);
    assert_eq!(store.cells().len(), 5);

    let states: Vec<_> = events
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            Event::StateChanged { new, .. } => Some(new),
            _ => None,
        })
        .collect();
    assert_eq!(states, [DisplayState::Refreshing, DisplayState::Posts]);
}

#[tokio::test]
async fn test_failed_refresh_keeps_posts_but_shows_empty() {
    let (store, provider) = immediate_store(mock_posts(3));
    store.load().await.unwrap();

    provider.set_failure(Some("offline".into()));
    assert!(store.refresh().await.is_err());
    assert_eq!(store.state(), DisplayState::Empty);
    assert_eq!(store.posts().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_shows_refreshing_during_delay() {
    let store = delayed_store(StaticProvider::new(mock_posts(1)));
    store.load().await.unwrap();
    tokio::time::sleep(SETTLE * 2).await;
    assert_eq!(store.state(), DisplayState::Posts);

    store.refresh().await.unwrap();
    assert_eq!(store.state(), DisplayState::Refreshing);
    tokio::time::sleep(SETTLE * 2).await;
    assert_eq!(store.state(), DisplayState::Posts);
}

#[tokio::test]
async fn test_load_next_page_has_no_exit() {
    let (store, _) = immediate_store(mock_posts(2));
    store.load().await.unwrap();

    store.load_next_page();
    assert_eq!(store.state(), DisplayState::LoadingNextPage);

    let post = store.posts()[0].clone();
    store.vote(&post.options[0], PostRef::Index(0)).unwrap();
    assert_eq!(store.state(), DisplayState::LoadingNextPage);
}

#[tokio::test]
async fn test_concurrent_loads_are_not_deduplicated() {
    let (store, provider) = immediate_store(mock_posts(4));

    let (a, b) = tokio::join!(store.load(), store.load());
    assert_eq!(a.unwrap(), 4);
    assert_eq!(b.unwrap(), 4);
    assert_eq!(provider.calls(), 2);
    assert_eq!(store.cells().len(), 4);
}

#[tokio::test]
async fn test_seven_posts_scenario() {
    let (store, _) = immediate_store(mock_posts(7));
    store.load().await.unwrap();

    assert_eq!(store.cells().len(), 7);
    assert_eq!(store.state(), DisplayState::Posts);
    assert_eq!(store.header_label(), "7 Active Polls");
}

// =============================================================================
// Voting
// =============================================================================

#[tokio::test]
async fn test_vote_scenario() {
    let post = mock_post();
    let (store, _) = immediate_store(vec![post.clone()]);
    store.load().await.unwrap();

    let a = post.options[0].clone();
    let before = Utc::now();
    let outcome = store.vote(&a, PostRef::Index(0)).unwrap();

    let posts = store.posts();
    let voted = &posts[0];
    assert_eq!(voted.options[0].voted, 1);
    assert_eq!(voted.options[1].voted, 0);
    assert!(voted.last_vote_at.unwrap() >= before);

    assert_eq!(voted.voted_bys.len(), 1);
    let record = &voted.voted_bys[0];
    assert_eq!(record.post_id.as_deref(), Some(post.id.as_str()));
    assert_eq!(record.selected_option.id, a.id);
    // Snapshot taken before the increment.
    assert_eq!(record.selected_option.voted, 0);
    assert_eq!(outcome, VoteOutcome::Applied(record.clone()));

    let cell = &store.cells()[0];
    assert_eq!(cell.total_vote_count, 1);
    assert!(cell.is_voted);
    assert_eq!(cell.voted_users.len(), 1);
}

#[tokio::test]
async fn test_vote_by_id_leaves_other_posts_alone() {
    let posts = mock_posts(3);
    let (store, _) = immediate_store(posts.clone());
    store.load().await.unwrap();

    let target = &posts[1];
    let outcome = store.vote(&target.options[1], target.id.as_str()).unwrap();
    assert!(outcome.is_applied());

    let after = store.posts();
    assert_eq!(after[1].options[1].voted, 1);
    assert_eq!(after[1].options[0].voted, 0);
    for i in [0, 2] {
        assert_eq!(after[i].total_votes(), 0);
        assert!(after[i].voted_bys.is_empty());
        assert!(after[i].last_vote_at.is_none());
    }

    let cells = store.cells();
    assert!(!cells[0].is_voted);
    assert!(cells[1].is_voted);
    assert!(!cells[2].is_voted);
}

#[tokio::test]
async fn test_vote_with_unknown_target_is_noop() {
    let post = mock_post();
    let (store, _) = immediate_store(vec![post.clone()]);
    store.load().await.unwrap();
    let cells_before = store.cells();
    let mut events = store.subscribe();

    assert_eq!(
        store.vote(&post.options[0], PostRef::Index(1)).unwrap(),
        VoteOutcome::TargetNotFound
    );
    assert_eq!(
        store.vote(&post.options[0], PostRef::Id("missing".into())).unwrap(),
        VoteOutcome::TargetNotFound
    );

    assert_eq!(store.posts()[0].total_votes(), 0);
    assert!(store.posts()[0].voted_bys.is_empty());
    assert_eq!(*store.cells(), *cells_before);
    assert!(events.drain().is_empty());
}

#[tokio::test]
async fn test_vote_with_foreign_option_is_noop() {
    let post = mock_post();
    let (store, _) = immediate_store(vec![post]);
    store.load().await.unwrap();
    let cells_before = store.cells();
    let mut events = store.subscribe();

    let outcome = store.vote(&mock_option(0), PostRef::Index(0)).unwrap();
    assert_eq!(outcome, VoteOutcome::OptionNotFound);
    assert!(store.posts()[0].voted_bys.is_empty());
    assert!(store.posts()[0].last_vote_at.is_none());
    assert_eq!(*store.cells(), *cells_before);
    assert!(events.drain().is_empty());
}

#[tokio::test]
async fn test_vote_before_load_requires_current_user() {
    let (store, _) = immediate_store(vec![]);
    store.set_current_user(None);
    // No posts: target resolution fails first and stays a no-op.
    assert_eq!(
        store.vote(&mock_option(0), PostRef::Index(0)).unwrap(),
        VoteOutcome::TargetNotFound
    );

    let mut post = mock_post();
    post.user = None;
    let (store, _) = immediate_store(vec![post.clone()]);
    store.load().await.unwrap();
    assert_eq!(
        store.vote(&post.options[0], PostRef::Index(0)),
        Err(StoreError::NoCurrentUser)
    );
    assert_eq!(store.posts()[0].total_votes(), 0);
}

#[tokio::test]
async fn test_second_vote_by_same_user_is_counted() {
    let post = mock_post();
    let (store, _) = immediate_store(vec![post.clone()]);
    store.load().await.unwrap();

    store.vote(&post.options[0], PostRef::Index(0)).unwrap();
    let second = store.vote(&post.options[1], PostRef::Index(0)).unwrap();
    assert!(second.is_applied());

    let cell = &store.cells()[0];
    assert_eq!(cell.total_vote_count, 2);
    assert_eq!(cell.voted_users.len(), 2);
}

#[tokio::test]
async fn test_vote_does_not_change_state() {
    let post = mock_post();
    let (store, _) = immediate_store(vec![post.clone()]);
    store.load().await.unwrap();
    let mut events = store.subscribe();

    store.vote(&post.options[0], PostRef::Index(0)).unwrap();
    let events = events.drain();
    assert_eq!(events.len(), 1);
    match &events[0] {
        Event::CellsChanged(cells) => assert_eq!(cells[0].total_vote_count, 1),
        other => panic!("expected CellsChanged, got {:?}", other),
    }
    assert_eq!(store.state(), DisplayState::Posts);
}

#[tokio::test]
async fn test_derivation_holds_for_many_posts_and_votes() {
    let posts = mock_posts(200);
    let (store, _) = immediate_store(posts.clone());
    store.load().await.unwrap();

    // Every third post gets no votes; the rest get a varying number.
    for (i, post) in posts.iter().enumerate() {
        if i % 3 == 0 {
            continue;
        }
        for v in 0..(i % 7 + 1) {
            let option = &post.options[v % 2];
            assert!(store.vote(option, i).unwrap().is_applied());
        }
    }

    let cells = store.cells();
    let posts = store.posts();
    assert_eq!(cells.len(), 200);
    for (i, (cell, post)) in cells.iter().zip(posts.iter()).enumerate() {
        assert_eq!(cell.id, post.id);
        let expected: u64 = post.options.iter().map(|o| u64::from(o.voted)).sum();
        assert_eq!(cell.total_vote_count, expected);
        assert_eq!(cell.is_voted, i % 3 != 0);
        if i % 3 != 0 {
            assert_eq!(cell.total_vote_count, (i % 7 + 1) as u64);
        }
    }
}

// =============================================================================
// Subscriptions
// =============================================================================

#[tokio::test]
async fn test_subscription_sees_user_cells_and_state_in_order() {
    let (store, _) = immediate_store(mock_posts(2));
    let mut events = store.subscribe();
    store.load().await.unwrap();

    let kinds: Vec<_> = events.drain().iter().map(Event::kind).collect();
    assert_eq!(kinds, ["current_user", "cells", "state"]);
}

#[tokio::test]
async fn test_subscription_stream() {
    let post = mock_post();
    let (store, _) = immediate_store(vec![post.clone()]);
    store.load().await.unwrap();

    let stream = store.subscribe().into_stream();
    tokio::pin!(stream);

    store.vote(&post.options[1], PostRef::Index(0)).unwrap();
    match stream.next().await {
        Some(Event::CellsChanged(cells)) => {
            assert_eq!(cells[0].options[1].voted, 1);
        }
        other => panic!("expected CellsChanged, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancelled_subscription_stops_receiving() {
    let post = mock_post();
    let (store, _) = immediate_store(vec![post.clone()]);
    store.load().await.unwrap();

    let mut kept = store.subscribe();
    let cancelled = store.subscribe();
    cancelled.cancel();

    store.vote(&post.options[0], PostRef::Index(0)).unwrap();
    assert!(matches!(kept.try_recv(), Some(Event::CellsChanged(_))));
}

#[tokio::test(start_paused = true)]
async fn test_store_handles_share_state() {
    let store = delayed_store(StaticProvider::new(mock_posts(1)));
    let other = store.clone();
    let mut events = other.subscribe();

    store.start().await.unwrap();
    assert_eq!(other.cells().len(), 1);

    // The settle task keeps running after the loading task is gone.
    loop {
        match events.recv().await {
            Some(Event::StateChanged { new, .. }) => {
                assert_eq!(new, DisplayState::Posts);
                break;
            }
            Some(_) => continue,
            None => panic!("store closed"),
        }
    }
    assert_eq!(other.state(), DisplayState::Posts);
}
