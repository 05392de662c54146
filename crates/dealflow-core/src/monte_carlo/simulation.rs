use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statrs::distribution::{LogNormal, Normal, Triangular, Uniform};
use std::time::Instant;

use crate::error::DealflowError;
use crate::lbo::{run_lbo, LboAssumptions};
use crate::types::*;
use crate::DealflowResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Probability distribution specification for a Monte Carlo variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum McDistribution {
    Normal { mean: f64, std_dev: f64 },
    LogNormal { mu: f64, sigma: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
    Uniform { min: f64, max: f64 },
}

/// Input for a Monte Carlo LBO.
///
/// Every assumption not given a distribution stays at its `base` value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LboMonteCarloInput {
    pub base: LboAssumptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_growth: Option<McDistribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebitda_margin: Option<McDistribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_multiple: Option<McDistribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<McDistribution>,
    /// Number of simulation paths (minimum 100).
    #[serde(default = "default_num_simulations")]
    pub num_simulations: u32,
    /// Optional seed for reproducibility.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_num_simulations() -> u32 {
    10_000
}

/// Percentile summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McPercentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// Distribution summary of one simulated output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McSummary {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: McPercentiles,
}

/// Probability that MOIC reaches a given multiple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdProbability {
    pub threshold: f64,
    pub probability: f64,
}

/// Output of a Monte Carlo LBO.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LboMonteCarloOutput {
    pub moic: McSummary,
    pub irr: McSummary,
    /// Share of successful paths returning less than invested capital
    pub probability_of_loss: f64,
    pub probability_moic_above: Vec<ThresholdProbability>,
    pub successful_paths: u32,
    /// Paths whose sampled assumptions were invalid or breached the guardrail
    pub failed_paths: u32,
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

fn invalid_distribution(field: &str, e: impl std::fmt::Display) -> DealflowError {
    DealflowError::InvalidInput {
        field: field.into(),
        reason: format!("Invalid distribution parameters: {e}"),
    }
}

/// Sample a single value from the given distribution using the provided RNG.
fn sample(rng: &mut StdRng, dist: &McDistribution, field: &str) -> DealflowResult<f64> {
    match dist {
        McDistribution::Normal { mean, std_dev } => {
            let n = Normal::new(*mean, *std_dev).map_err(|e| invalid_distribution(field, e))?;
            Ok(rng.sample(n))
        }
        McDistribution::LogNormal { mu, sigma } => {
            let ln = LogNormal::new(*mu, *sigma).map_err(|e| invalid_distribution(field, e))?;
            Ok(rng.sample(ln))
        }
        McDistribution::Triangular { min, mode, max } => {
            let t =
                Triangular::new(*min, *max, *mode).map_err(|e| invalid_distribution(field, e))?;
            Ok(rng.sample(t))
        }
        McDistribution::Uniform { min, max } => {
            let u = Uniform::new(*min, *max).map_err(|e| invalid_distribution(field, e))?;
            Ok(rng.sample(u))
        }
    }
}

fn to_decimal(value: f64, field: &str) -> DealflowResult<Decimal> {
    Decimal::from_f64(value).ok_or_else(|| DealflowError::InvalidInput {
        field: field.into(),
        reason: format!("Sampled value {value} is not representable"),
    })
}

// ---------------------------------------------------------------------------
// Statistics helpers
// ---------------------------------------------------------------------------

/// Compute the percentile value from a **sorted** slice using linear interpolation.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Summarise a non-empty slice, sorting it in place.
fn summarise(values: &mut [f64]) -> McSummary {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len() as f64;

    let mean = values.iter().sum::<f64>() / n;
    let median = percentile_sorted(values, 50.0);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    McSummary {
        mean,
        median,
        std_dev: variance.sqrt(),
        min: values[0],
        max: values[values.len() - 1],
        percentiles: McPercentiles {
            p5: percentile_sorted(values, 5.0),
            p10: percentile_sorted(values, 10.0),
            p25: percentile_sorted(values, 25.0),
            p50: median,
            p75: percentile_sorted(values, 75.0),
            p90: percentile_sorted(values, 90.0),
            p95: percentile_sorted(values, 95.0),
        },
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the LBO engine over sampled operating and exit assumptions.
///
/// Each path is an independent [`run_lbo`] call. Paths that fail validation
/// or the entry guardrail are counted in `failed_paths`; the run fails only
/// when no path succeeds.
pub fn run_lbo_monte_carlo(
    input: &LboMonteCarloInput,
) -> DealflowResult<ComputationOutput<LboMonteCarloOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.num_simulations < 100 {
        return Err(DealflowError::InvalidInput {
            field: "num_simulations".into(),
            reason: "Must be at least 100".into(),
        });
    }

    let sampled: Vec<(&str, &McDistribution)> = [
        ("revenue_growth", &input.revenue_growth),
        ("ebitda_margin", &input.ebitda_margin),
        ("exit_multiple", &input.exit_multiple),
        ("interest_rate", &input.interest_rate),
    ]
    .into_iter()
    .filter_map(|(name, dist)| dist.as_ref().map(|d| (name, d)))
    .collect();

    if sampled.is_empty() {
        warnings.push("No distributions given; every path equals the base case".into());
    }

    let mut rng = match input.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let n = input.num_simulations as usize;
    let mut moics: Vec<f64> = Vec::with_capacity(n);
    let mut irrs: Vec<f64> = Vec::with_capacity(n);
    let mut failed: u32 = 0;

    for _ in 0..n {
        let mut path = input.base.clone();
        for (name, dist) in &sampled {
            let value = to_decimal(sample(&mut rng, dist, name)?, name)?;
            path = path.with_override(name, value)?;
        }

        match run_lbo(&path) {
            Ok(result) => {
                moics.push(result.moic.to_f64().unwrap_or(0.0));
                irrs.push(result.irr.to_f64().unwrap_or(-1.0));
            }
            Err(e) => {
                debug!("monte carlo path rejected: {e}");
                failed += 1;
            }
        }
    }

    if moics.is_empty() {
        return Err(DealflowError::InsufficientData(
            "Every simulated path failed validation or the entry guardrail".into(),
        ));
    }
    if failed > 0 {
        warnings.push(format!(
            "{failed} of {} simulations rejected (invalid sampled assumptions or negative entry equity)",
            input.num_simulations
        ));
    }

    let successful = moics.len() as f64;
    let share_where = |pred: &dyn Fn(f64) -> bool| {
        moics.iter().filter(|m| pred(**m)).count() as f64 / successful
    };
    let probability_of_loss = share_where(&|m| m < 1.0);
    let probability_moic_above = [2.0, 3.0]
        .into_iter()
        .map(|threshold| ThresholdProbability {
            threshold,
            probability: share_where(&|m| m > threshold),
        })
        .collect();

    let successful_paths = moics.len() as u32;
    let output = LboMonteCarloOutput {
        moic: summarise(&mut moics),
        irr: summarise(&mut irrs),
        probability_of_loss,
        probability_moic_above,
        successful_paths,
        failed_paths: failed,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_precision(
        "Monte Carlo LBO",
        &serde_json::json!({
            "num_simulations": input.num_simulations,
            "seed": input.seed,
            "sampled": sampled.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
        }),
        warnings,
        elapsed,
        "ieee754_f64",
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base() -> LboAssumptions {
        LboAssumptions {
            entry_ebitda: dec!(50),
            entry_multiple: dec!(10),
            revenue_growth: dec!(0.08),
            ebitda_margin: dec!(0.20),
            capex_pct_revenue: dec!(0.04),
            nwc_pct_revenue: dec!(0.02),
            interest_rate: dec!(0.08),
            leverage_multiple: dec!(4),
            exit_multiple: dec!(9),
            years: 5,
            tax_rate: dec!(0.25),
        }
    }

    fn input(seed: u64) -> LboMonteCarloInput {
        LboMonteCarloInput {
            base: base(),
            revenue_growth: Some(McDistribution::Normal {
                mean: 0.08,
                std_dev: 0.03,
            }),
            ebitda_margin: None,
            exit_multiple: Some(McDistribution::Triangular {
                min: 7.0,
                mode: 9.0,
                max: 11.0,
            }),
            interest_rate: None,
            num_simulations: 500,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = run_lbo_monte_carlo(&input(42)).unwrap().result;
        let b = run_lbo_monte_carlo(&input(42)).unwrap().result;
        assert_eq!(a.moic.mean, b.moic.mean);
        assert_eq!(a.irr.percentiles.p95, b.irr.percentiles.p95);
    }

    #[test]
    fn test_distribution_centres_on_base_case() {
        let out = run_lbo_monte_carlo(&input(7)).unwrap().result;
        assert_eq!(out.successful_paths, 500);
        assert_eq!(out.failed_paths, 0);
        // Base case MOIC ~1.84
        assert!(
            (out.moic.median - 1.84).abs() < 0.15,
            "median MOIC {}",
            out.moic.median
        );
        assert!(out.moic.percentiles.p5 <= out.moic.percentiles.p95);
        assert!(out.probability_of_loss < 0.05);
    }

    #[test]
    fn test_no_distributions_collapses_to_base() {
        let mut inp = input(1);
        inp.revenue_growth = None;
        inp.exit_multiple = None;
        let out = run_lbo_monte_carlo(&inp).unwrap();
        assert_eq!(out.result.moic.std_dev, 0.0);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_margin_paths_counted() {
        let mut inp = input(3);
        // Roughly half of the samples fall outside (0, 1]
        inp.ebitda_margin = Some(McDistribution::Uniform { min: -1.0, max: 1.0 });
        let out = run_lbo_monte_carlo(&inp).unwrap();
        assert!(out.result.failed_paths > 0);
        assert_eq!(
            out.result.failed_paths + out.result.successful_paths,
            inp.num_simulations
        );
    }

    #[test]
    fn test_minimum_simulations() {
        let mut inp = input(1);
        inp.num_simulations = 10;
        assert!(run_lbo_monte_carlo(&inp).is_err());
    }
}
