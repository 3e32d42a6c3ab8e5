//! Arena Market Data
//!
//! Implementations of the `MarketFrameSource` port:
//! - `InMemoryFrameSource` - DashMap-backed catalogue for simulation and tests
//! - `JsonFileFrameSource` - catalogue loaded from a JSON file

mod in_memory;
mod json_file;

pub use in_memory::{IN_MEMORY, InMemoryFrameSource};
pub use json_file::{FrameCatalog, JSON_FILE, JsonFileFrameSource};
