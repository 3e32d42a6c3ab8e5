//! Strategy registry
//!
//! Holds the implementations available to one engine instance, grouped by
//! role. Selection picks the enabled registration with the lowest priority
//! number, optionally restricted to a configured name. Ties keep
//! registration order.

use arena_keypoints::{
    BreakoutDetector, LocalExtremaDetector, RandomSampleDetector, VolumeSpikeDetector,
};
use arena_ports::{Detector, MarketFrameSource, Scoring};
use arena_scoring::{RealizedPnlScoring, WeightedHorizonScoring};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::StrategyToggle;
use crate::error::{EngineError, Result};

/// Role a pluggable strategy fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyRole {
    Scoring,
    Detector,
    MarketDataProvider,
}

impl fmt::Display for StrategyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StrategyRole::Scoring => "scoring",
            StrategyRole::Detector => "detector",
            StrategyRole::MarketDataProvider => "market data provider",
        };
        f.write_str(s)
    }
}

/// One implementation registered under a role
pub struct Registration<T: ?Sized> {
    pub name: String,
    /// Lower is preferred
    pub priority: i32,
    pub enabled: bool,
    pub implementation: Arc<T>,
}

impl<T: ?Sized> Clone for Registration<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            priority: self.priority,
            enabled: self.enabled,
            implementation: Arc::clone(&self.implementation),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Registration<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .finish()
    }
}

fn select<T: ?Sized>(
    registrations: &[Registration<T>],
    preferred: Option<&str>,
    role: StrategyRole,
) -> Result<Arc<T>> {
    registrations
        .iter()
        .filter(|r| r.enabled)
        .filter(|r| preferred.is_none_or(|name| r.name == name))
        .min_by_key(|r| r.priority)
        .map(|r| Arc::clone(&r.implementation))
        .ok_or(EngineError::StrategyUnavailable { role })
}

fn toggle<T: ?Sized>(registrations: &mut [Registration<T>], toggle: &StrategyToggle) -> bool {
    let Some(registration) = registrations.iter_mut().find(|r| r.name == toggle.name) else {
        return false;
    };
    if let Some(enabled) = toggle.enabled {
        registration.enabled = enabled;
    }
    if let Some(priority) = toggle.priority {
        registration.priority = priority;
    }
    debug!(
        "Strategy {} '{}': enabled={}, priority={}",
        toggle.role, registration.name, registration.enabled, registration.priority
    );
    true
}

/// Explicit, engine-owned registry of pluggable strategies
#[derive(Default, Clone)]
pub struct StrategyRegistry {
    scoring: Vec<Registration<dyn Scoring>>,
    detectors: Vec<Registration<dyn Detector>>,
    providers: Vec<Registration<dyn MarketFrameSource>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every bundled scoring and detector strategy.
    ///
    /// Market data providers are deployment specific and must be added by
    /// the caller.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .register_scoring(Arc::new(WeightedHorizonScoring::new()), 0)
            .register_scoring(Arc::new(RealizedPnlScoring::new()), 10)
            .register_detector(Arc::new(LocalExtremaDetector::new()), 0)
            .register_detector(Arc::new(VolumeSpikeDetector::new()), 10)
            .register_detector(Arc::new(BreakoutDetector::new()), 20)
            .register_detector(Arc::new(RandomSampleDetector::new()), 100);
        registry
    }

    pub fn register_scoring(&mut self, strategy: Arc<dyn Scoring>, priority: i32) -> &mut Self {
        self.scoring.push(Registration {
            name: strategy.name().to_string(),
            priority,
            enabled: true,
            implementation: strategy,
        });
        self
    }

    pub fn register_detector(&mut self, detector: Arc<dyn Detector>, priority: i32) -> &mut Self {
        self.detectors.push(Registration {
            name: detector.name().to_string(),
            priority,
            enabled: true,
            implementation: detector,
        });
        self
    }

    pub fn register_provider(
        &mut self,
        provider: Arc<dyn MarketFrameSource>,
        priority: i32,
    ) -> &mut Self {
        self.providers.push(Registration {
            name: provider.name().to_string(),
            priority,
            enabled: true,
            implementation: provider,
        });
        self
    }

    /// Apply enable/priority overrides; an unknown name is a config error
    pub fn apply_toggles(&mut self, toggles: &[StrategyToggle]) -> Result<()> {
        for t in toggles {
            let found = match t.role {
                StrategyRole::Scoring => toggle(&mut self.scoring, t),
                StrategyRole::Detector => toggle(&mut self.detectors, t),
                StrategyRole::MarketDataProvider => toggle(&mut self.providers, t),
            };
            if !found {
                return Err(EngineError::InvalidConfig(format!(
                    "no {} strategy named '{}'",
                    t.role, t.name
                )));
            }
        }
        Ok(())
    }

    pub fn scoring(&self, preferred: Option<&str>) -> Result<Arc<dyn Scoring>> {
        select(&self.scoring, preferred, StrategyRole::Scoring)
    }

    pub fn detector(&self, preferred: Option<&str>) -> Result<Arc<dyn Detector>> {
        select(&self.detectors, preferred, StrategyRole::Detector)
    }

    pub fn provider(&self, preferred: Option<&str>) -> Result<Arc<dyn MarketFrameSource>> {
        select(&self.providers, preferred, StrategyRole::MarketDataProvider)
    }

    /// Registered names for a role, in registration order
    pub fn names(&self, role: StrategyRole) -> Vec<String> {
        fn names_of<T: ?Sized>(registrations: &[Registration<T>]) -> Vec<String> {
            registrations.iter().map(|r| r.name.clone()).collect()
        }
        match role {
            StrategyRole::Scoring => names_of(&self.scoring),
            StrategyRole::Detector => names_of(&self.detectors),
            StrategyRole::MarketDataProvider => names_of(&self.providers),
        }
    }
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("scoring", &self.scoring)
            .field("detectors", &self.detectors)
            .field("providers", &self.providers)
            .finish()
    }
}
