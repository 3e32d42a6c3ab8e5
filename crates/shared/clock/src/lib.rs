//! Arena Clock Infrastructure
//!
//! Time sources for the engine:
//!
//! - [`SystemClock`]: wall-clock time at millisecond resolution
//! - [`ManualClock`]: frozen time that only moves when advanced, for
//!   deterministic tests of expiry and response-time measurement
//!
//! ## Usage
//!
//! ```ignore
//! use arena_clock::ManualClock;
//! use chrono::Duration;
//!
//! let clock = ManualClock::starting_now();
//! clock.advance(Duration::minutes(31));
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use arena_ports::Clock;
