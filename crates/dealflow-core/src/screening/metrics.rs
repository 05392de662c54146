use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::screening::deal::Deal;
use crate::types::*;
use crate::DealflowResult;

/// Summary statistics over a deal pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealMetrics {
    pub count: usize,
    /// Mean EV/EBITDA over deals with a positive multiple (2 dp)
    pub avg_multiple: Option<Multiple>,
    /// Median EV/EBITDA over deals with a positive multiple (2 dp)
    pub median_multiple: Option<Multiple>,
    pub by_sector: BTreeMap<String, usize>,
    pub by_geo: BTreeMap<String, usize>,
}

fn median(sorted: &[Decimal]) -> Option<Decimal> {
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 0 => {
            let (lo, hi) = (sorted[n / 2 - 1], sorted[n / 2]);
            Some(match lo.checked_add(hi) {
                Some(total) => total / Decimal::TWO,
                None => lo + (hi - lo) / Decimal::TWO,
            })
        }
        _ => Some(sorted[n / 2]),
    }
}

/// Count deals by sector and geography and summarise their multiples.
pub fn deal_metrics(deals: &[Deal]) -> DealMetrics {
    let mut multiples: Vec<Multiple> = deals
        .iter()
        .map(Deal::effective_ev_ebitda)
        .filter(|m| *m > Decimal::ZERO)
        .collect();
    multiples.sort();

    let avg_multiple = if multiples.is_empty() {
        None
    } else {
        let n = Decimal::from(multiples.len());
        let mean = multiples
            .iter()
            .try_fold(Decimal::ZERO, |acc, m| acc.checked_add(*m))
            .map(|total| total / n)
            // Sum out of range: running mean instead
            .unwrap_or_else(|| {
                multiples.iter().zip(1u32..).fold(Decimal::ZERO, |mean, (m, k)| {
                    mean + (*m - mean) / Decimal::from(k)
                })
            });
        Some(mean.round_dp(2))
    };

    let mut by_sector = BTreeMap::new();
    let mut by_geo = BTreeMap::new();
    for deal in deals {
        *by_sector.entry(deal.sector.clone()).or_insert(0) += 1;
        *by_geo.entry(deal.geography.clone()).or_insert(0) += 1;
    }

    DealMetrics {
        count: deals.len(),
        avg_multiple,
        median_multiple: median(&multiples).map(|m| m.round_dp(2)),
        by_sector,
        by_geo,
    }
}

/// [`deal_metrics`] wrapped in the standard computation envelope.
pub fn run_deal_metrics(deals: &[Deal]) -> DealflowResult<ComputationOutput<DealMetrics>> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let metrics = deal_metrics(deals);
    let excluded = deals
        .iter()
        .filter(|d| d.effective_ev_ebitda() <= Decimal::ZERO)
        .count();
    if excluded > 0 {
        warnings.push(format!(
            "{excluded} deal(s) without a positive EV/EBITDA excluded from multiple statistics"
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Pipeline metrics: multiple distribution and sector/geography counts",
        &serde_json::json!({ "deals": deals.len() }),
        warnings,
        elapsed,
        metrics,
    ))
}
