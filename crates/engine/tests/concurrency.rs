//! Concurrency Integration Test
//!
//! Exercises the engine under concurrent callers:
//! 1. Racing submissions for the same frame (exactly one wins)
//! 2. Independent sessions progressing in parallel
//! 3. Optimistic commit retries against a conflicting store
//! 4. Cancel racing a stream of decisions
//! 5. Commits that land in the store before the engine installs them

use arena_clock::ManualClock;
use arena_core::{Frame, GameDecision, GameSession, Segment, SessionId, SessionStatus, Timeframe};
use arena_engine::{
    DecisionRejection, DecisionRequest, EngineConfig, EngineError, GameEngine,
    InMemorySessionStore, SessionConfig, StrategyRegistry,
};
use arena_market_data::InMemoryFrameSource;
use arena_ports::{SessionStore, StoreError, StoreResult, UnitOfWork};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration as StdDuration;

/// Store that reports a version conflict for the next `armed` updates
struct ConflictingStore {
    inner: InMemorySessionStore,
    armed: Arc<AtomicUsize>,
}

#[async_trait]
impl SessionStore for ConflictingStore {
    async fn commit(&self, unit: UnitOfWork) -> StoreResult<()> {
        if unit.expected_version.is_some()
            && self
                .armed
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(StoreError::VersionConflict {
                session_id: unit.session.id,
                expected: unit.expected_version,
                actual: unit.expected_version.map(|v| v + 1),
            });
        }
        self.inner.commit(unit).await
    }

    async fn load_session(&self, id: SessionId) -> StoreResult<Option<GameSession>> {
        self.inner.load_session(id).await
    }

    async fn load_decisions(&self, id: SessionId) -> StoreResult<Vec<GameDecision>> {
        self.inner.load_decisions(id).await
    }
}

/// Store that commits immediately but acknowledges updates late
struct SlowAckStore {
    inner: InMemorySessionStore,
    delay: StdDuration,
}

#[async_trait]
impl SessionStore for SlowAckStore {
    async fn commit(&self, unit: UnitOfWork) -> StoreResult<()> {
        let is_update = unit.expected_version.is_some();
        self.inner.commit(unit).await?;
        if is_update {
            tokio::time::sleep(self.delay).await;
        }
        Ok(())
    }

    async fn load_session(&self, id: SessionId) -> StoreResult<Option<GameSession>> {
        self.inner.load_session(id).await
    }

    async fn load_decisions(&self, id: SessionId) -> StoreResult<Vec<GameDecision>> {
        self.inner.load_decisions(id).await
    }
}

fn segment(id: &str, n: usize) -> Segment {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let frames = (0..n)
        .map(|i| {
            let close = dec!(150) + Decimal::from(i as i64 * 2);
            Frame::new(
                start + Duration::days(i as i64),
                close,
                close + dec!(1),
                close - dec!(1),
                close,
                dec!(500000),
            )
        })
        .collect();
    Segment::new(id, "AAPL", Timeframe::Day1, frames)
}

fn registry() -> StrategyRegistry {
    let source = InMemoryFrameSource::new()
        .with_segment(segment("short", 6))
        .with_segment(segment("long", 60));
    let mut registry = StrategyRegistry::with_defaults();
    registry.register_provider(Arc::new(source), 0);
    registry
}

fn engine() -> Arc<GameEngine> {
    let clock = ManualClock::starting_now();
    Arc::new(
        GameEngine::with_in_memory_store(EngineConfig::default(), registry(), Arc::new(clock))
            .unwrap(),
    )
}

fn slow_engine(delay_ms: u64) -> Arc<GameEngine> {
    let store = SlowAckStore {
        inner: InMemorySessionStore::new(),
        delay: StdDuration::from_millis(delay_ms),
    };
    Arc::new(
        GameEngine::new(
            EngineConfig::default(),
            registry(),
            Arc::new(store),
            Arc::new(ManualClock::starting_now()),
        )
        .unwrap(),
    )
}

fn aapl() -> SessionConfig {
    SessionConfig::new("AAPL", Timeframe::Day1)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_submissions() {
    let _ = env_logger::try_init();
    let engine = engine();
    let session = engine
        .create_session("player-1", "short", aapl())
        .await
        .unwrap();
    engine.start(session.id).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let id = session.id;
            tokio::spawn(async move {
                engine
                    .submit_decision(DecisionRequest::buy(id, 0, dec!(150), dec!(10)))
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(e) => {
                assert_eq!(e.rejection(), Some(DecisionRejection::DuplicateFrame));
                duplicates += 1;
            }
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(duplicates, 7);

    let s = engine.get_session(session.id).unwrap();
    assert_eq!(s.current_frame_index, 1);
    assert_eq!(s.version, 2);
    assert_eq!(engine.decisions(session.id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_sessions_progress_in_parallel() {
    let engine = engine();

    let mut ids = Vec::new();
    for i in 0..16 {
        let session = engine
            .create_session(format!("player-{i}"), "short", aapl())
            .await
            .unwrap();
        engine.start(session.id).await.unwrap();
        ids.push(session.id);
    }

    let handles: Vec<_> = ids
        .iter()
        .map(|id| {
            let engine = Arc::clone(&engine);
            let id = *id;
            tokio::spawn(async move {
                engine
                    .submit_decision(DecisionRequest::buy(id, 0, dec!(150), dec!(100)))
                    .await?;
                for frame in 1..5 {
                    engine
                        .submit_decision(DecisionRequest::skip(id, frame))
                        .await?;
                }
                engine
                    .submit_decision(DecisionRequest::sell(id, 5, dec!(160), dec!(100)))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for id in ids {
        let s = engine.get_session(id).unwrap();
        assert_eq!(s.status, SessionStatus::Completed);
        assert_eq!(s.current_balance, dec!(101000));
        assert_eq!(engine.decisions(id).await.unwrap().len(), 6);
    }
    assert_eq!(
        engine
            .leaderboard(&arena_engine::LeaderboardScope::Global, 100)
            .len(),
        16
    );
}

#[tokio::test]
async fn test_version_conflicts_are_retried() {
    let armed = Arc::new(AtomicUsize::new(0));
    let store = ConflictingStore {
        inner: InMemorySessionStore::new(),
        armed: Arc::clone(&armed),
    };
    let engine = GameEngine::new(
        EngineConfig::default(),
        registry(),
        Arc::new(store),
        Arc::new(ManualClock::starting_now()),
    )
    .unwrap();

    let session = engine
        .create_session("player-1", "short", aapl())
        .await
        .unwrap();
    engine.start(session.id).await.unwrap();

    armed.store(3, Ordering::SeqCst);
    let decision = engine
        .submit_decision(DecisionRequest::skip(session.id, 0))
        .await
        .unwrap();

    assert_eq!(decision.frame_index, 0);
    assert_eq!(armed.load(Ordering::SeqCst), 0);
    let s = engine.get_session(session.id).unwrap();
    assert_eq!(s.current_frame_index, 1);
    assert_eq!(s.version, 2);
}

#[tokio::test]
async fn test_exhausted_retries_leave_session_unchanged() {
    let armed = Arc::new(AtomicUsize::new(0));
    let store = ConflictingStore {
        inner: InMemorySessionStore::new(),
        armed: Arc::clone(&armed),
    };
    let config = EngineConfig {
        max_commit_retries: 2,
        ..Default::default()
    };
    let engine = GameEngine::new(
        config,
        registry(),
        Arc::new(store),
        Arc::new(ManualClock::starting_now()),
    )
    .unwrap();

    let session = engine
        .create_session("player-1", "short", aapl())
        .await
        .unwrap();
    let started = engine.start(session.id).await.unwrap();

    armed.store(100, Ordering::SeqCst);
    let err = engine
        .submit_decision(DecisionRequest::buy(session.id, 0, dec!(150), dec!(10)))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Infrastructure(_)));
    // one initial attempt plus two retries
    assert_eq!(armed.load(Ordering::SeqCst), 97);
    assert_eq!(engine.get_session(session.id).unwrap(), started);
    assert!(engine.decisions(session.id).await.unwrap().is_empty());

    armed.store(0, Ordering::SeqCst);
    engine
        .submit_decision(DecisionRequest::buy(session.id, 0, dec!(150), dec!(10)))
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_racing_decisions() {
    let engine = engine();
    let session = engine
        .create_session("player-1", "long", aapl().with_auto_complete(false))
        .await
        .unwrap();
    engine.start(session.id).await.unwrap();

    let player = {
        let engine = Arc::clone(&engine);
        let id = session.id;
        tokio::spawn(async move {
            for frame in 0..60 {
                if engine
                    .submit_decision(DecisionRequest::skip(id, frame))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        })
    };
    let canceller = {
        let engine = Arc::clone(&engine);
        let id = session.id;
        tokio::spawn(async move {
            tokio::task::yield_now().await;
            engine.cancel(id).await
        })
    };

    player.await.unwrap();
    let cancelled = canceller.await.unwrap().unwrap();

    let s = engine.get_session(session.id).unwrap();
    assert_eq!(s.status, SessionStatus::Cancelled);
    assert_eq!(s, cancelled);
    let decisions = engine.decisions(session.id).await.unwrap();
    assert_eq!(decisions.len(), s.current_frame_index);
    assert!(
        decisions
            .iter()
            .enumerate()
            .all(|(i, d)| d.frame_index == i)
    );
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_loses_to_commit_not_yet_installed() {
    let engine = slow_engine(50);
    let session = engine
        .create_session("player-1", "short", aapl())
        .await
        .unwrap();
    engine.start(session.id).await.unwrap();

    let first = {
        let engine = Arc::clone(&engine);
        let id = session.id;
        tokio::spawn(async move {
            engine
                .submit_decision(DecisionRequest::buy(id, 0, dec!(150), dec!(10)))
                .await
        })
    };
    // the first buy is in the store but still waiting on its acknowledgement
    tokio::time::sleep(StdDuration::from_millis(5)).await;

    let err = engine
        .submit_decision(DecisionRequest::buy(session.id, 0, dec!(150), dec!(10)))
        .await
        .unwrap_err();
    assert_eq!(err.rejection(), Some(DecisionRejection::DuplicateFrame));

    let accepted = first.await.unwrap().unwrap();
    assert_eq!(accepted.frame_index, 0);

    let s = engine.get_session(session.id).unwrap();
    assert_eq!(s.current_frame_index, 1);
    assert_eq!(s.version, 2);
    assert!(s.open_position.is_some());
    assert_eq!(engine.decisions(session.id).await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_submit_does_not_wedge_session() {
    let engine = slow_engine(50);
    let session = engine
        .create_session("player-1", "short", aapl())
        .await
        .unwrap();
    engine.start(session.id).await.unwrap();

    // committed, then abandoned before the engine could install it
    let timed_out = tokio::time::timeout(
        StdDuration::from_millis(10),
        engine.submit_decision(DecisionRequest::skip(session.id, 0)),
    )
    .await;
    assert!(timed_out.is_err());

    let cancelled = engine.cancel(session.id).await.unwrap();
    assert_eq!(cancelled.status, SessionStatus::Cancelled);
    assert_eq!(cancelled.current_frame_index, 1);

    let s = engine.get_session(session.id).unwrap();
    assert_eq!(s, cancelled);
    let decisions = engine.decisions(session.id).await.unwrap();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].frame_index, 0);
}
