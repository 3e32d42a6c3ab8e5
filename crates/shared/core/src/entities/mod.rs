mod decision;
mod frame;
mod keypoint;
mod position;
mod scoring_result;
mod session;
mod session_status;

pub use decision::{DecisionType, GameDecision};
pub use frame::{Frame, Segment, Timeframe};
pub use keypoint::{KeypointDetection, KeypointType};
pub use position::Position;
pub use scoring_result::ScoringResult;
pub use session::{Difficulty, GameSession};
pub use session_status::SessionStatus;
