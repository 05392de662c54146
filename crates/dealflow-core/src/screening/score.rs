use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::screening::deal::Deal;
use crate::types::*;

const MARGIN_WEIGHT: Decimal = dec!(0.4);
const GROWTH_WEIGHT: Decimal = dec!(0.4);
const MULTIPLE_WEIGHT: Decimal = dec!(0.2);
/// Multiples at or below this earn the full multiple component
const MULTIPLE_HURDLE: Decimal = dec!(5);
const SCALE: Decimal = dec!(100);

/// Screening score with its weighted components, each already scaled to
/// points (the components sum to `score`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub margin_component: Decimal,
    pub growth_component: Decimal,
    pub multiple_component: Decimal,
    pub score: Decimal,
}

/// `100 × (0.4·margin + 0.4·growth + 0.2 / (1 + max(ev_ebitda − 5, 0)))`
///
/// Higher margin and growth score better; multiples above 5x are penalised
/// hyperbolically, so the multiple component is exactly 20 points at or
/// below 5x and tends to zero as the multiple grows.
pub fn screening_score(margin: Rate, growth: Rate, ev_ebitda: Multiple) -> ScoreBreakdown {
    let excess_multiple = ev_ebitda
        .saturating_sub(MULTIPLE_HURDLE)
        .max(Decimal::ZERO);

    // Imported rows can carry extreme ratios; saturate rather than overflow.
    let margin_component = (SCALE * MARGIN_WEIGHT).saturating_mul(margin);
    let growth_component = (SCALE * GROWTH_WEIGHT).saturating_mul(growth);
    let multiple_component =
        SCALE * (MULTIPLE_WEIGHT / Decimal::ONE.saturating_add(excess_multiple));

    ScoreBreakdown {
        margin_component,
        growth_component,
        multiple_component,
        score: margin_component
            .saturating_add(growth_component)
            .saturating_add(multiple_component),
    }
}

/// Score a deal on its margin, growth and effective EV/EBITDA.
pub fn score_deal(deal: &Deal) -> ScoreBreakdown {
    screening_score(
        deal.ebitda_margin,
        deal.growth_rate,
        deal.effective_ev_ebitda(),
    )
}
