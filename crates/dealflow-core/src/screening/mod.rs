//! Deal records and the pure screening functions over them: scoring,
//! filtering/ranking and portfolio metrics.

pub mod deal;
pub mod metrics;
pub mod score;
pub mod screener;

pub use deal::{compute_ev_ebitda, try_ev_ebitda, Deal, DealStage};
pub use score::{score_deal, screening_score, ScoreBreakdown};
