//! Bootstrap - engine setup from a runner file
//!
//! Loads the segment catalogue, registers it as the market data provider
//! next to the default scoring and detector strategies, and builds the
//! engine.

use arena_engine::{ConfigError, EngineError, GameEngine, StrategyRegistry};
use arena_market_data::JsonFileFrameSource;
use arena_ports::{Clock, MarketDataError};
use log::info;
use std::sync::Arc;
use thiserror::Error;

use crate::script::RunnerConfig;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to load catalogue: {0}")]
    Catalogue(#[from] MarketDataError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Build an engine for `config`, reading its catalogue from disk
pub async fn bootstrap(
    config: &RunnerConfig,
    clock: Arc<dyn Clock>,
) -> Result<GameEngine, RunnerError> {
    let source = JsonFileFrameSource::load(&config.catalogue).await?;
    let segments = source.segment_ids();

    let mut registry = StrategyRegistry::with_defaults();
    registry.register_provider(Arc::new(source), 0);

    let engine = GameEngine::with_in_memory_store(config.engine.clone(), registry, clock)?;
    info!(
        "Engine ready: {} segments ({}), {} scripted players",
        segments.len(),
        segments.join(", "),
        config.players.len()
    );
    Ok(engine)
}
