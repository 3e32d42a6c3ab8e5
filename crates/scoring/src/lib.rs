//! Arena Scoring Strategies
//!
//! Implementations of the `Scoring` port:
//! - [`WeightedHorizonScoring`]: weighted look-ahead P&L minus risk penalties (default)
//! - [`RealizedPnlScoring`]: booked P&L only
//!
//! Both fold a finished session the same way (see [`fold_session`]).

pub mod realized;
pub mod session;
pub mod stats;
pub mod weighted_horizon;

// Re-export main types
pub use realized::{REALIZED_PNL, RealizedPnlScoring};
pub use session::fold_session;
pub use weighted_horizon::{WEIGHTED_HORIZON, WeightedHorizonConfig, WeightedHorizonScoring};
