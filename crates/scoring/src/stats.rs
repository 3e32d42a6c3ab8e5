//! Window statistics shared by scoring strategies.
//!
//! Every function takes the decision price as the starting point of the
//! path, followed by the closes of the future window.

use arena_core::{Frame, Price};
use rust_decimal::{Decimal, MathematicalOps};

/// Largest peak-to-trough decline of the close path, as a fraction of the peak
pub fn max_drawdown(start: Price, window: &[Frame]) -> Decimal {
    let mut peak = start;
    let mut worst = Decimal::ZERO;

    for frame in window {
        peak = peak.max(frame.close);
        if peak > Decimal::ZERO {
            worst = worst.max((peak - frame.close) / peak);
        }
    }

    worst
}

/// Simple bar-to-bar returns of the close path
pub fn returns(start: Price, window: &[Frame]) -> Vec<Decimal> {
    let mut prev = start;
    let mut out = Vec::with_capacity(window.len());

    for frame in window {
        if !prev.is_zero() {
            out.push(frame.close / prev - Decimal::ONE);
        }
        prev = frame.close;
    }

    out
}

/// Population standard deviation, zero for fewer than two samples
pub fn stdev(samples: &[Decimal]) -> Decimal {
    if samples.len() < 2 {
        return Decimal::ZERO;
    }

    let n = Decimal::from(samples.len());
    let mean = samples.iter().copied().sum::<Decimal>() / n;
    let variance = samples
        .iter()
        .map(|r| (*r - mean) * (*r - mean))
        .sum::<Decimal>()
        / n;

    variance.sqrt().unwrap_or(Decimal::ZERO)
}
