//! Per-bar decision validation and execution
//!
//! The processor is pure: it takes a session snapshot and returns the next
//! snapshot plus the decision record, leaving the input untouched. A failed
//! validation therefore never leaves partial state behind.

use arena_core::{
    DecisionType, Frame, GameDecision, GameSession, Position, Price, Quantity, Segment,
    SessionId, SessionStatus, Timestamp,
};
use arena_ports::{Scoring, StrategyError};
use chrono::Utc;
use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::{DecisionRejection, EngineError, Result};

/// A player's decision on one frame, as submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub session_id: SessionId,
    pub frame_index: usize,
    pub decision_type: DecisionType,
    pub price: Price,
    /// Ignored for SKIP
    pub quantity: Quantity,
    pub client_timestamp: Timestamp,
}

impl DecisionRequest {
    pub fn new(
        session_id: SessionId,
        frame_index: usize,
        decision_type: DecisionType,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            session_id,
            frame_index,
            decision_type,
            price,
            quantity,
            client_timestamp: Utc::now(),
        }
    }

    pub fn buy(session_id: SessionId, frame_index: usize, price: Price, quantity: Quantity) -> Self {
        Self::new(session_id, frame_index, DecisionType::Buy, price, quantity)
    }

    pub fn sell(session_id: SessionId, frame_index: usize, price: Price, quantity: Quantity) -> Self {
        Self::new(session_id, frame_index, DecisionType::Sell, price, quantity)
    }

    pub fn skip(session_id: SessionId, frame_index: usize) -> Self {
        Self::new(
            session_id,
            frame_index,
            DecisionType::Skip,
            Decimal::ZERO,
            Decimal::ZERO,
        )
    }

    pub fn with_client_timestamp(mut self, client_timestamp: Timestamp) -> Self {
        self.client_timestamp = client_timestamp;
        self
    }
}

/// Result of applying one decision
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub session: GameSession,
    pub decision: GameDecision,
}

/// Validates and applies decisions against one session's segment and settings
pub struct DecisionProcessor<'a> {
    segment: &'a Segment,
    config: &'a SessionConfig,
    scoring: &'a dyn Scoring,
}

impl<'a> DecisionProcessor<'a> {
    pub fn new(segment: &'a Segment, config: &'a SessionConfig, scoring: &'a dyn Scoring) -> Self {
        Self {
            segment,
            config,
            scoring,
        }
    }

    /// Run the precondition checks in order; the first failure wins
    pub fn validate(&self, session: &GameSession, request: &DecisionRequest) -> Result<&'a Frame> {
        use DecisionRejection::*;

        if session.status != SessionStatus::Running {
            return Err(EngineError::rejected(SessionNotRunning));
        }

        if request.frame_index < session.current_frame_index {
            return Err(EngineError::rejected(DuplicateFrame));
        }
        if request.frame_index != session.current_frame_index {
            return Err(EngineError::rejected(OutOfOrderFrame));
        }
        let frame = self
            .segment
            .get(request.frame_index)
            .ok_or(EngineError::rejected(OutOfOrderFrame))?;

        let is_trade = request.decision_type.is_trade();
        if is_trade && request.quantity <= Decimal::ZERO {
            return Err(EngineError::rejected(NonPositiveQuantity));
        }

        if is_trade {
            let allowed = frame
                .close
                .abs()
                .checked_mul(self.config.price_tolerance)
                .unwrap_or(Decimal::MAX);
            let gap = request.price.checked_sub(frame.close).map(|d| d.abs());
            if gap.is_none_or(|g| g > allowed) {
                return Err(EngineError::rejected(StalePrice));
            }
        }

        // request values are client supplied: a notional or realized move
        // that does not fit a Decimal violates the position constraint
        let position_ok = match request.decision_type {
            DecisionType::Buy => {
                session.open_position.is_none()
                    && request
                        .price
                        .checked_mul(request.quantity)
                        .is_some_and(|notional| notional <= session.current_balance)
            }
            DecisionType::Sell => session.open_position.as_ref().is_some_and(|p| {
                request.quantity <= p.quantity
                    && request
                        .price
                        .checked_sub(p.entry_price)
                        .and_then(|diff| diff.checked_mul(request.quantity))
                        .is_some()
            }),
            DecisionType::Skip => true,
        };
        if !position_ok {
            return Err(EngineError::rejected(PositionConstraint));
        }

        Ok(frame)
    }

    /// Validate, then compute the next session snapshot and the decision record
    pub fn process(
        &self,
        session: &GameSession,
        request: &DecisionRequest,
        now: Timestamp,
    ) -> Result<DecisionOutcome> {
        let frame = self.validate(session, request)?;
        let index = request.frame_index;
        let mut next = session.clone();

        let (price, quantity) = if request.decision_type.is_trade() {
            (request.price, request.quantity)
        } else {
            (frame.close, Decimal::ZERO)
        };
        let fee = price
            .checked_mul(quantity)
            .and_then(|notional| notional.checked_mul(self.config.fee_rate))
            .ok_or(EngineError::rejected(DecisionRejection::PositionConstraint))?;

        let mut realized_pnl = Decimal::ZERO;
        match request.decision_type {
            DecisionType::Buy => {
                next.open_position = Some(Position::open(index, price, quantity));
            }
            DecisionType::Sell => {
                let mut closed = false;
                if let Some(position) = next.open_position.as_mut() {
                    realized_pnl = position.reduce(quantity, price);
                    closed = position.is_closed();
                }
                if closed {
                    next.open_position = None;
                    next.record_closed_trade(realized_pnl);
                }
            }
            DecisionType::Skip => {}
        }
        if request.decision_type.is_trade() {
            next.book(realized_pnl, fee);
        }

        next.current_frame_index += 1;
        next.frame_presented_at = now;
        next.updated_at = now;
        next.version += 1;

        let mut decision = GameDecision {
            id: Uuid::new_v4(),
            session_id: session.id,
            frame_index: index,
            decision_type: request.decision_type,
            price,
            quantity,
            fee,
            client_timestamp: request.client_timestamp,
            decision_time: now,
            response_time_ms: (now - session.frame_presented_at)
                .num_milliseconds()
                .max(0),
            realized_pnl,
            score_contribution: Decimal::ZERO,
        };
        decision.score_contribution = self.score_contribution(&decision)?;

        Ok(DecisionOutcome {
            session: next,
            decision,
        })
    }

    /// Strategy score over the frames after the decision's bar; zero when
    /// the strategy lacks enough future data
    fn score_contribution(&self, decision: &GameDecision) -> Result<Decimal> {
        let window = self.segment.after(decision.frame_index);
        let seed = self.config.seed.wrapping_add(decision.frame_index as u64);

        match self
            .scoring
            .calculate_score(decision, window, &self.config.scoring, seed)
        {
            Ok(result) => Ok(result.total_score),
            Err(StrategyError::InsufficientData {
                required,
                available,
                ..
            }) => {
                trace!(
                    "Frame {} unscored: {} future frames, {} needed",
                    decision.frame_index, available, required
                );
                Ok(Decimal::ZERO)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::{Difficulty, Timeframe};
    use arena_ports::{RiskPenalty, ScoringParams};
    use arena_scoring::WeightedHorizonScoring;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn segment(closes: &[Decimal]) -> Segment {
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let frames = closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                Frame::new(start + Duration::days(i as i64), *c, *c, *c, *c, dec!(1000))
            })
            .collect();
        Segment::new("seg-1", "AAPL", Timeframe::Day1, frames)
    }

    fn running(total_frames: usize) -> GameSession {
        let mut s = GameSession::new(
            "player-1",
            "seg-1",
            "AAPL",
            Timeframe::Day1,
            total_frames,
            dec!(100000),
            Difficulty::Medium,
            Utc::now(),
        );
        s.status = SessionStatus::Running;
        s
    }

    fn config() -> SessionConfig {
        SessionConfig::new("AAPL", Timeframe::Day1).with_scoring(ScoringParams {
            window_sizes: vec![1],
            weights: vec![dec!(1)],
            risk_penalty: RiskPenalty::none(),
        })
    }

    fn rejection(result: Result<DecisionOutcome>) -> DecisionRejection {
        result.unwrap_err().rejection().unwrap()
    }

    #[test]
    fn test_buy_then_sell_realizes_pnl() {
        let seg = segment(&[
            dec!(150),
            dec!(152),
            dec!(149),
            dec!(155),
            dec!(158),
            dec!(160),
        ]);
        let cfg = config();
        let scoring = WeightedHorizonScoring::new();
        let processor = DecisionProcessor::new(&seg, &cfg, &scoring);
        let mut session = running(6);
        let id = session.id;
        let now = Utc::now();

        session = processor
            .process(&session, &DecisionRequest::buy(id, 0, dec!(150), dec!(100)), now)
            .unwrap()
            .session;
        for i in 1..5 {
            session = processor
                .process(&session, &DecisionRequest::skip(id, i), now)
                .unwrap()
                .session;
        }
        let outcome = processor
            .process(&session, &DecisionRequest::sell(id, 5, dec!(160), dec!(100)), now)
            .unwrap();

        assert_eq!(outcome.decision.realized_pnl, dec!(1000));
        assert_eq!(outcome.session.current_balance, dec!(101000));
        assert_eq!(outcome.session.total_pnl, dec!(1000));
        assert_eq!(outcome.session.total_trades, 1);
        assert_eq!(outcome.session.winning_trades, 1);
        assert_eq!(outcome.session.current_frame_index, 6);
        assert!(outcome.session.open_position.is_none());
    }

    #[test]
    fn test_score_contribution_uses_future_window() {
        let seg = segment(&[dec!(100), dec!(104)]);
        let cfg = config();
        let scoring = WeightedHorizonScoring::new();
        let processor = DecisionProcessor::new(&seg, &cfg, &scoring);
        let session = running(2);

        let buy = processor
            .process(
                &session,
                &DecisionRequest::buy(session.id, 0, dec!(100), dec!(10)),
                Utc::now(),
            )
            .unwrap();
        // the last frame has no future
        let sell = processor
            .process(
                &buy.session,
                &DecisionRequest::sell(session.id, 1, dec!(104), dec!(10)),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(buy.decision.score_contribution, dec!(40));
        assert_eq!(sell.decision.score_contribution, Decimal::ZERO);
    }

    #[test]
    fn test_skip_records_close_and_no_quantity() {
        let seg = segment(&[dec!(50), dec!(51)]);
        let cfg = config();
        let scoring = WeightedHorizonScoring::new();
        let processor = DecisionProcessor::new(&seg, &cfg, &scoring);
        let session = running(2);

        let request = DecisionRequest::new(session.id, 0, DecisionType::Skip, dec!(1), dec!(-5));
        let outcome = processor.process(&session, &request, Utc::now()).unwrap();

        assert_eq!(outcome.decision.price, dec!(50));
        assert_eq!(outcome.decision.quantity, Decimal::ZERO);
        assert_eq!(outcome.session.current_balance, session.current_balance);
    }

    #[test]
    fn test_fee_is_charged_on_both_sides() {
        let seg = segment(&[dec!(100), dec!(110), dec!(110)]);
        let cfg = config().with_fee_rate(dec!(0.001));
        let scoring = WeightedHorizonScoring::new();
        let processor = DecisionProcessor::new(&seg, &cfg, &scoring);
        let session = running(3);
        let id = session.id;

        let buy = processor
            .process(&session, &DecisionRequest::buy(id, 0, dec!(100), dec!(10)), Utc::now())
            .unwrap();
        let sell = processor
            .process(&buy.session, &DecisionRequest::sell(id, 1, dec!(110), dec!(10)), Utc::now())
            .unwrap();

        assert_eq!(buy.decision.fee, dec!(1));
        assert_eq!(sell.decision.fee, dec!(1.1));
        // 100000 - 1 + 100 - 1.1
        assert_eq!(sell.session.current_balance, dec!(100097.9));
        assert_eq!(sell.session.total_pnl, dec!(100));
    }

    #[test]
    fn test_partial_sell_keeps_position_open() {
        let seg = segment(&[dec!(100), dec!(90), dec!(95)]);
        let cfg = config();
        let scoring = WeightedHorizonScoring::new();
        let processor = DecisionProcessor::new(&seg, &cfg, &scoring);
        let session = running(3);
        let id = session.id;

        let buy = processor
            .process(&session, &DecisionRequest::buy(id, 0, dec!(100), dec!(10)), Utc::now())
            .unwrap();
        let sell = processor
            .process(&buy.session, &DecisionRequest::sell(id, 1, dec!(90), dec!(4)), Utc::now())
            .unwrap();

        assert_eq!(sell.decision.realized_pnl, dec!(-40));
        assert_eq!(sell.session.open_position.as_ref().unwrap().quantity, dec!(6));
        assert_eq!(sell.session.total_trades, 0);
        assert_eq!(sell.session.max_drawdown, dec!(0.0004));
    }

    #[test]
    fn test_response_time_measured_from_presentation() {
        let seg = segment(&[dec!(100), dec!(100)]);
        let cfg = config();
        let scoring = WeightedHorizonScoring::new();
        let processor = DecisionProcessor::new(&seg, &cfg, &scoring);
        let mut session = running(2);
        let presented = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
        session.frame_presented_at = presented;

        let outcome = processor
            .process(
                &session,
                &DecisionRequest::skip(session.id, 0),
                presented + Duration::milliseconds(1750),
            )
            .unwrap();
        assert_eq!(outcome.decision.response_time_ms, 1750);

        // clock skew never yields a negative response time
        let outcome = processor
            .process(
                &session,
                &DecisionRequest::skip(session.id, 0),
                presented - Duration::seconds(3),
            )
            .unwrap();
        assert_eq!(outcome.decision.response_time_ms, 0);
    }

    #[test]
    fn test_rejections_in_precedence_order() {
        let seg = segment(&[dec!(100), dec!(100), dec!(100)]);
        let cfg = config();
        let scoring = WeightedHorizonScoring::new();
        let processor = DecisionProcessor::new(&seg, &cfg, &scoring);
        let now = Utc::now();

        let mut paused = running(3);
        paused.status = SessionStatus::Paused;
        // not running beats a wrong frame
        assert_eq!(
            rejection(processor.process(
                &paused,
                &DecisionRequest::buy(paused.id, 2, dec!(100), dec!(1)),
                now
            )),
            DecisionRejection::SessionNotRunning
        );

        let mut s = running(3);
        s.current_frame_index = 1;
        let id = s.id;
        assert_eq!(
            rejection(processor.process(&s, &DecisionRequest::skip(id, 0), now)),
            DecisionRejection::DuplicateFrame
        );
        assert_eq!(
            rejection(processor.process(&s, &DecisionRequest::skip(id, 2), now)),
            DecisionRejection::OutOfOrderFrame
        );
        // wrong frame beats bad quantity
        assert_eq!(
            rejection(processor.process(&s, &DecisionRequest::buy(id, 2, dec!(100), dec!(0)), now)),
            DecisionRejection::OutOfOrderFrame
        );
        // bad quantity beats stale price
        assert_eq!(
            rejection(processor.process(&s, &DecisionRequest::buy(id, 1, dec!(500), dec!(0)), now)),
            DecisionRejection::NonPositiveQuantity
        );
        assert_eq!(
            rejection(processor.process(&s, &DecisionRequest::buy(id, 1, dec!(101.5), dec!(1)), now)),
            DecisionRejection::StalePrice
        );
        assert_eq!(
            rejection(processor.process(&s, &DecisionRequest::sell(id, 1, dec!(100), dec!(1)), now)),
            DecisionRejection::PositionConstraint
        );
        // notional above balance
        assert_eq!(
            rejection(processor.process(&s, &DecisionRequest::buy(id, 1, dec!(100), dec!(2000)), now)),
            DecisionRejection::PositionConstraint
        );
    }

    #[test]
    fn test_oversized_quantity_is_rejected_not_overflowed() {
        let seg = segment(&[dec!(150), dec!(150)]);
        let cfg = config();
        let scoring = WeightedHorizonScoring::new();
        let processor = DecisionProcessor::new(&seg, &cfg, &scoring);
        let session = running(2);
        let huge = Decimal::MAX / dec!(100);

        let err = processor
            .process(&session, &DecisionRequest::buy(session.id, 0, dec!(150), huge), Utc::now())
            .unwrap_err();
        assert_eq!(err.rejection(), Some(DecisionRejection::PositionConstraint));

        // a price nowhere near the bar cannot overflow the tolerance check either
        let err = processor
            .process(
                &session,
                &DecisionRequest::buy(session.id, 0, Decimal::MIN, dec!(1)),
                Utc::now(),
            )
            .unwrap_err();
        assert_eq!(err.rejection(), Some(DecisionRejection::StalePrice));
    }

    #[test]
    fn test_buy_while_long_is_rejected() {
        let seg = segment(&[dec!(100), dec!(100)]);
        let cfg = config();
        let scoring = WeightedHorizonScoring::new();
        let processor = DecisionProcessor::new(&seg, &cfg, &scoring);
        let session = running(2);
        let id = session.id;

        let buy = processor
            .process(&session, &DecisionRequest::buy(id, 0, dec!(100), dec!(1)), Utc::now())
            .unwrap();
        let err = processor
            .process(&buy.session, &DecisionRequest::buy(id, 1, dec!(100), dec!(1)), Utc::now())
            .unwrap_err();

        assert_eq!(err.rejection(), Some(DecisionRejection::PositionConstraint));
    }
}
