use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Price, Quantity};

/// The single open long position of a game session.
///
/// Exists only between a BUY and the SELL(s) that close it. There is no
/// short side and no lot averaging: a session holds at most one position
/// and a BUY is rejected while one is open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Frame at which the position was opened
    pub entry_frame_index: usize,

    /// Fill price of the opening BUY
    pub entry_price: Price,

    /// Remaining quantity (always positive while the position exists)
    pub quantity: Quantity,
}

impl Position {
    /// Open a new long position
    pub fn open(entry_frame_index: usize, entry_price: Price, quantity: Quantity) -> Self {
        Self {
            entry_frame_index,
            entry_price,
            quantity,
        }
    }

    /// Mark-to-market P&L at `mark_price`
    pub fn unrealized_pnl(&self, mark_price: Price) -> Decimal {
        (mark_price - self.entry_price) * self.quantity
    }

    /// Entry notional
    pub fn cost_basis(&self) -> Decimal {
        self.entry_price * self.quantity
    }

    /// Reduce the position, returning the realized P&L of the closed part.
    ///
    /// `quantity` is capped at the remaining size.
    pub fn reduce(&mut self, quantity: Quantity, price: Price) -> Decimal {
        let closed = quantity.min(self.quantity);
        self.quantity -= closed;
        (price - self.entry_price) * closed
    }

    /// Check if position is closed (quantity is zero)
    pub fn is_closed(&self) -> bool {
        self.quantity.is_zero()
    }
}
