use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::DealflowError;
use crate::lbo::{run_lbo, LboAssumptions, LboResult};
use crate::types::*;
use crate::DealflowResult;

/// Upper bound on stepped values along one sweep axis
pub const MAX_SWEEP_POINTS: usize = 1_000;

/// Which LBO output a sensitivity grid reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LboMetric {
    #[default]
    Irr,
    Moic,
    EquityValueAtExit,
    ExitEv,
    ExitDebt,
}

impl LboMetric {
    pub fn extract(self, result: &LboResult) -> Decimal {
        match self {
            LboMetric::Irr => result.irr,
            LboMetric::Moic => result.moic,
            LboMetric::EquityValueAtExit => result.equity_value_at_exit,
            LboMetric::ExitEv => result.exit_ev,
            LboMetric::ExitDebt => result.exit_debt,
        }
    }
}

/// Input for a 2-way LBO sensitivity grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LboSensitivityInput {
    /// Base case; the two swept fields are overridden per cell
    pub base: LboAssumptions,
    /// First assumption to sweep (rows), named as an `LboAssumptions` field
    pub variable_1: SensitivityVariable,
    /// Second assumption to sweep (columns)
    pub variable_2: SensitivityVariable,
    #[serde(default)]
    pub output_metric: LboMetric,
}

/// Output of a 2-way LBO sensitivity grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LboSensitivityOutput {
    pub variable_1_name: String,
    pub variable_2_name: String,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: LboMetric,
    /// `matrix[i][j]` is the metric at (`variable_1_values[i]`,
    /// `variable_2_values[j]`); `None` where the scenario is infeasible
    pub matrix: Vec<Vec<Option<Decimal>>>,
    pub base_case_value: Decimal,
    /// Grid cell closest to the base case (row, col)
    pub base_case_position: (usize, usize),
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
///
/// A sweep is limited to [`MAX_SWEEP_POINTS`] stepped values (plus `max` when
/// the last step falls short of it); finer grids are rejected up front.
fn generate_sweep_values(var: &SensitivityVariable) -> DealflowResult<Vec<Decimal>> {
    let invalid = |reason: String| DealflowError::InvalidInput {
        field: format!("variable:{}", var.name),
        reason,
    };
    if var.step <= Decimal::ZERO {
        return Err(invalid("Step must be positive".into()));
    }
    if var.min > var.max {
        return Err(invalid("Min must be <= max".into()));
    }

    let steps = var
        .max
        .checked_sub(var.min)
        .and_then(|span| span.checked_div(var.step))
        .and_then(|steps| steps.floor().to_usize())
        .filter(|steps| *steps < MAX_SWEEP_POINTS)
        .ok_or_else(|| {
            invalid(format!(
                "Sweep from {} to {} by {} exceeds {MAX_SWEEP_POINTS} points",
                var.min, var.max, var.step
            ))
        })?;

    let mut values = Vec::with_capacity(steps + 2);
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        match current.checked_add(var.step) {
            Some(next) => current = next,
            None => break,
        }
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Sweep two assumptions over a grid and run the LBO at every point.
///
/// Cells are independent runs. A cell whose scenario fails validation or the
/// entry guardrail is `None` and noted in the warnings; the base case itself
/// must succeed.
pub fn run_lbo_sensitivity(
    input: &LboSensitivityInput,
) -> DealflowResult<ComputationOutput<LboSensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let name_1 = input.variable_1.name.as_str();
    let name_2 = input.variable_2.name.as_str();
    if name_1 == name_2 {
        return Err(DealflowError::InvalidInput {
            field: "variable_2".into(),
            reason: format!("Both axes sweep '{name_1}'"),
        });
    }
    let base_1 = input.base.field(name_1)?;
    let base_2 = input.base.field(name_2)?;

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;

    let base_result = run_lbo(&input.base)?;
    let base_case_value = input.output_metric.extract(&base_result);

    let mut matrix = Vec::with_capacity(v1_values.len());
    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            let cell = input
                .base
                .with_override(name_1, *v1)
                .and_then(|a| a.with_override(name_2, *v2))
                .and_then(|a| run_lbo(&a));
            match cell {
                Ok(result) => row.push(Some(input.output_metric.extract(&result))),
                Err(e) => {
                    warnings.push(format!("Evaluation failed at ({v1}, {v2}): {e}"));
                    row.push(None);
                }
            }
        }
        matrix.push(row);
    }

    let base_row = closest_index(&v1_values, base_1);
    let base_col = closest_index(&v2_values, base_2);

    let output = LboSensitivityOutput {
        variable_1_name: input.variable_1.name.clone(),
        variable_2_name: input.variable_2.name.clone(),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric,
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way LBO Sensitivity Analysis",
        &serde_json::json!({
            "variable_1": input.variable_1.name,
            "variable_2": input.variable_2.name,
            "output_metric": input.output_metric,
            "base": input.base,
        }),
        warnings,
        elapsed,
        output,
    ))
}
