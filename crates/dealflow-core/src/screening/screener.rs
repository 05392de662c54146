use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::DealflowError;
use crate::screening::deal::Deal;
use crate::screening::score::score_deal;
use crate::types::*;
use crate::DealflowResult;

/// Criteria for screening a set of deals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geography: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ev_ebitda_min: Option<Multiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ev_ebitda_max: Option<Multiple>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_min: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_max: Option<Money>,
    /// Maximum number of ranked deals returned
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    200
}

impl Default for ScreenerFilters {
    fn default() -> Self {
        ScreenerFilters {
            sector: None,
            geography: None,
            ev_ebitda_min: None,
            ev_ebitda_max: None,
            revenue_min: None,
            revenue_max: None,
            limit: default_limit(),
        }
    }
}

/// Input for a screening run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenInput {
    pub deals: Vec<Deal>,
    #[serde(default)]
    pub filters: ScreenerFilters,
}

/// A deal with its screening score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDeal {
    #[serde(flatten)]
    pub deal: Deal,
    pub ev_ebitda_effective: Multiple,
    pub score: Decimal,
}

/// Output of a screening run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenOutput {
    pub matched: usize,
    pub deals: Vec<ScoredDeal>,
}

fn check_range(field: &str, min: Option<Decimal>, max: Option<Decimal>) -> DealflowResult<()> {
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(DealflowError::InvalidInput {
                field: field.into(),
                reason: format!("Minimum {lo} exceeds maximum {hi}"),
            });
        }
    }
    Ok(())
}

fn within(value: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> bool {
    min.is_none_or(|lo| value >= lo) && max.is_none_or(|hi| value <= hi)
}

impl ScreenerFilters {
    /// Whether a deal passes every set criterion (bounds inclusive).
    pub fn matches(&self, deal: &Deal) -> bool {
        self.sector.as_ref().is_none_or(|s| *s == deal.sector)
            && self.geography.as_ref().is_none_or(|g| *g == deal.geography)
            && within(deal.revenue, self.revenue_min, self.revenue_max)
            && within(
                deal.effective_ev_ebitda(),
                self.ev_ebitda_min,
                self.ev_ebitda_max,
            )
    }
}

/// Filter deals and rank the survivors by screening score, best first.
pub fn screen_deals(
    deals: &[Deal],
    filters: &ScreenerFilters,
) -> DealflowResult<Vec<ScoredDeal>> {
    check_range("ev_ebitda", filters.ev_ebitda_min, filters.ev_ebitda_max)?;
    check_range("revenue", filters.revenue_min, filters.revenue_max)?;

    let mut ranked: Vec<ScoredDeal> = deals
        .iter()
        .filter(|d| filters.matches(d))
        .map(|d| ScoredDeal {
            ev_ebitda_effective: d.effective_ev_ebitda(),
            score: score_deal(d).score,
            deal: d.clone(),
        })
        .collect();

    // Stable sort keeps input order among equal scores.
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(filters.limit);
    Ok(ranked)
}

/// [`screen_deals`] wrapped in the standard computation envelope.
pub fn run_screen(input: &ScreenInput) -> DealflowResult<ComputationOutput<ScreenOutput>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let deals = screen_deals(&input.deals, &input.filters)?;
    if deals.is_empty() && !input.deals.is_empty() {
        warnings.push(format!(
            "No deals matched the filters out of {} screened",
            input.deals.len()
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Deal Screener: filter and rank by margin/growth/multiple score",
        &input.filters,
        warnings,
        elapsed,
        ScreenOutput {
            matched: deals.len(),
            deals,
        },
    ))
}
