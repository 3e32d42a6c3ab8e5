use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Price value - uses Decimal for precision
pub type Price = Decimal;

/// Quantity value - uses Decimal for precision
pub type Quantity = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Stock (ticker) code a segment was cut from
pub type StockCode = String;

/// Game session identifier
pub type SessionId = Uuid;

/// Decision identifier
pub type DecisionId = Uuid;

/// Player identifier, opaque to the engine
pub type UserId = String;

/// Identifier of a segment in the market data catalogue
pub type SegmentId = String;
