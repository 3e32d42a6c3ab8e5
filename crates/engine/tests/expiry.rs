//! Session Expiry Integration Test
//!
//! Idle sessions are expired by the sweep:
//! 1. Only RUNNING or PAUSED sessions idle past the timeout expire
//! 2. A store failure on one session does not stop the sweep
//! 3. The background sweeper runs on the tokio timer

use arena_clock::ManualClock;
use arena_core::{Frame, GameDecision, GameSession, Segment, SessionId, SessionStatus, Timeframe};
use arena_engine::{
    DecisionRequest, EngineConfig, EngineError, GameEngine, InMemorySessionStore, SessionConfig,
    StrategyRegistry,
};
use arena_market_data::InMemoryFrameSource;
use arena_ports::{SessionStore, StoreError, StoreResult, UnitOfWork};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Store that refuses every write for poisoned sessions
#[derive(Default)]
struct FlakyStore {
    inner: InMemorySessionStore,
    poisoned: Mutex<HashSet<SessionId>>,
}

impl FlakyStore {
    fn poison(&self, id: SessionId) {
        self.poisoned.lock().unwrap().insert(id);
    }
}

#[async_trait]
impl SessionStore for FlakyStore {
    async fn commit(&self, unit: UnitOfWork) -> StoreResult<()> {
        if self.poisoned.lock().unwrap().contains(&unit.session.id) {
            return Err(StoreError::Unavailable("disk full".to_string()));
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

fn registry() -> StrategyRegistry {
    let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    let frames = (0..8)
        .map(|i| {
            let close = dec!(42) + Decimal::from(i % 3);
            Frame::new(
                start + Duration::hours(i),
                close,
                close + dec!(0.5),
                close - dec!(0.5),
                close,
                dec!(10000),
            )
        })
        .collect();
    let source = InMemoryFrameSource::new().with_segment(Segment::new(
        "tsla-h1",
        "TSLA",
        Timeframe::Hour1,
        frames,
    ));
    let mut registry = StrategyRegistry::with_defaults();
    registry.register_provider(Arc::new(source), 0);
    registry
}

fn tsla() -> SessionConfig {
    SessionConfig::new("TSLA", Timeframe::Hour1)
}

async fn running(engine: &GameEngine) -> SessionId {
    let session = engine.create_session("player", "tsla-h1", tsla()).await.unwrap();
    engine.start(session.id).await.unwrap();
    session.id
}

#[tokio::test]
async fn test_sweep_expires_only_idle_active_sessions() {
    let _ = env_logger::try_init();
    let clock = ManualClock::starting_now();
    let engine = GameEngine::with_in_memory_store(
        EngineConfig::default(),
        registry(),
        Arc::new(clock.clone()),
    )
    .unwrap();

    let idle_running = running(&engine).await;
    engine
        .submit_decision(DecisionRequest::buy(idle_running, 0, dec!(42), dec!(10)))
        .await
        .unwrap();
    let idle_paused = running(&engine).await;
    engine.pause(idle_paused).await.unwrap();
    let never_started = engine
        .create_session("player", "tsla-h1", tsla())
        .await
        .unwrap()
        .id;

    clock.advance(Duration::minutes(31));
    let fresh = running(&engine).await;

    let report = engine.sweep_expired().await;

    let expired: HashSet<_> = report.expired.iter().copied().collect();
    assert_eq!(expired, HashSet::from([idle_running, idle_paused]));
    assert!(report.failed.is_empty());

    let s = engine.get_session(idle_running).unwrap();
    assert_eq!(s.status, SessionStatus::Expired);
    assert!(s.score.is_some());
    assert_eq!(
        engine.get_session(never_started).unwrap().status,
        SessionStatus::Created
    );
    assert_eq!(
        engine.get_session(fresh).unwrap().status,
        SessionStatus::Running
    );

    assert!(engine.sweep_expired().await.is_empty());
}

#[tokio::test]
async fn test_expire_requires_idle_timeout() {
    let clock = ManualClock::starting_now();
    let engine = GameEngine::with_in_memory_store(
        EngineConfig::default(),
        registry(),
        Arc::new(clock.clone()),
    )
    .unwrap();
    let id = running(&engine).await;

    clock.advance(Duration::minutes(29));
    let err = engine.expire(id).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::InvalidStateTransition {
            current: SessionStatus::Running,
            operation: "expire",
            ..
        }
    ));

    // activity resets the idle timer
    engine
        .submit_decision(DecisionRequest::skip(id, 0))
        .await
        .unwrap();
    clock.advance(Duration::minutes(29));
    assert!(engine.expire(id).await.is_err());

    clock.advance(Duration::minutes(2));
    let expired = engine.expire(id).await.unwrap();
    assert_eq!(expired.status, SessionStatus::Expired);
}

#[tokio::test]
async fn test_sweep_continues_past_failures() {
    let clock = ManualClock::starting_now();
    let store = Arc::new(FlakyStore::default());
    let engine = GameEngine::new(
        EngineConfig::default(),
        registry(),
        store.clone(),
        Arc::new(clock.clone()),
    )
    .unwrap();

    let broken = running(&engine).await;
    let healthy = running(&engine).await;
    store.poison(broken);
    clock.advance(Duration::hours(1));

    let report = engine.sweep_expired().await;

    assert_eq!(report.expired, vec![healthy]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].session_id, broken);
    assert!(matches!(
        report.failed[0].error,
        EngineError::Infrastructure(_)
    ));
    assert_eq!(
        engine.get_session(broken).unwrap().status,
        SessionStatus::Running
    );
}

#[tokio::test(start_paused = true)]
async fn test_background_sweeper_expires_idle_sessions() {
    let clock = ManualClock::starting_now();
    let engine = Arc::new(
        GameEngine::with_in_memory_store(
            EngineConfig::default(),
            registry(),
            Arc::new(clock.clone()),
        )
        .unwrap(),
    );
    let id = running(&engine).await;

    let sweeper = engine.spawn_expiry_sweeper(engine.config().sweep_interval());
    clock.advance(Duration::minutes(31));
    tokio::time::sleep(std::time::Duration::from_secs(61)).await;

    assert_eq!(
        engine.get_session(id).unwrap().status,
        SessionStatus::Expired
    );
    sweeper.abort();
}
