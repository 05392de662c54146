use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::lbo::assumptions::{self, LboAssumptions};
use crate::lbo::entry::{self, EntryValuation};
use crate::lbo::exit::{self, ExitValuation};
use crate::lbo::returns::{self, ReturnMetrics};
use crate::lbo::simulator::{self, YearRecord};
use crate::types::*;
use crate::DealflowResult;

/// Full LBO output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LboResult {
    pub entry_ev: Money,
    pub entry_debt: Money,
    pub entry_equity: Money,
    pub exit_ev: Money,
    pub exit_debt: Money,
    pub equity_value_at_exit: Money,
    pub moic: Multiple,
    pub irr: Rate,
    /// Year-by-year schedule, `year` running 1..=years
    pub yearly: Vec<YearRecord>,
}

fn assemble(
    entry: EntryValuation,
    exit: ExitValuation,
    returns: ReturnMetrics,
    yearly: Vec<YearRecord>,
) -> LboResult {
    LboResult {
        entry_ev: entry.entry_ev,
        entry_debt: entry.entry_debt,
        entry_equity: entry.entry_equity,
        exit_ev: exit.exit_ev,
        exit_debt: exit.exit_debt,
        equity_value_at_exit: exit.equity_value_at_exit,
        moic: returns.moic,
        irr: returns.irr,
        yearly,
    }
}

/// Run the LBO underwriting engine.
///
/// Validation and the entry guardrail fail before any year is simulated;
/// no partial result is ever returned alongside an error.
pub fn run_lbo(input: &LboAssumptions) -> DealflowResult<LboResult> {
    let validated = assumptions::validate(input)?;
    let entry = entry::value_entry(&validated)?;
    debug!(
        "entry EV {}, debt {}, equity {}",
        entry.entry_ev, entry.entry_debt, entry.entry_equity
    );

    let yearly = simulator::simulate_years(&validated, entry.entry_debt)?;
    let exit = exit::value_exit(&yearly, input.exit_multiple)?;
    let returns = returns::calculate_returns(
        entry.entry_equity,
        exit.equity_value_at_exit,
        input.years,
    )?;
    debug!("exit EV {}, MOIC {}, IRR {}", exit.exit_ev, returns.moic, returns.irr);

    Ok(assemble(entry, exit, returns, yearly))
}

/// Notes about modelling simplifications that affected this run.
fn collect_warnings(input: &LboAssumptions, result: &LboResult) -> Vec<String> {
    let mut warnings = Vec::new();

    if input.capex_pct_revenue < Decimal::ZERO {
        warnings.push(format!(
            "capex_pct_revenue is negative ({}); capex is modelled as a cash inflow",
            input.capex_pct_revenue
        ));
    }
    if input.nwc_pct_revenue < Decimal::ZERO {
        warnings.push(format!(
            "nwc_pct_revenue is negative ({}); working capital is modelled as a cash release",
            input.nwc_pct_revenue
        ));
    }

    let mut opening = result.entry_debt;
    for record in &result.yearly {
        if record.fcf < Decimal::ZERO {
            warnings.push(format!(
                "Year {}: negative free cash flow of {} added to debt",
                record.year, record.fcf
            ));
        } else if record.fcf > opening {
            warnings.push(format!(
                "Year {}: surplus free cash flow of {} after full paydown is not retained",
                record.year,
                record.fcf - opening
            ));
        }
        opening = record.debt_end;
    }

    if result.exit_ev < result.exit_debt {
        warnings.push(format!(
            "Exit debt {} exceeds exit EV {}; equity value at exit floored at zero",
            result.exit_debt, result.exit_ev
        ));
    }

    warnings
}

/// [`run_lbo`] wrapped in the standard computation envelope, with warnings
/// for discarded surplus cash, debt growth and floored exit equity.
pub fn build_lbo(input: &LboAssumptions) -> DealflowResult<ComputationOutput<LboResult>> {
    let start = Instant::now();

    let result = run_lbo(input)?;
    let warnings = collect_warnings(input, &result);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "LBO Quick Model (full cash sweep, single entry/exit cash flow)",
        input,
        warnings,
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DealflowError;
    use rust_decimal::MathematicalOps;
    use rust_decimal_macros::dec;

    /// The documented reference run.
    fn reference_input() -> LboAssumptions {
        LboAssumptions {
            entry_ebitda: dec!(50),
            entry_multiple: dec!(10),
            revenue_growth: dec!(0.08),
            ebitda_margin: dec!(0.20),
            capex_pct_revenue: dec!(0.04),
            nwc_pct_revenue: dec!(0.02),
            interest_rate: dec!(0.08),
            leverage_multiple: dec!(4.0),
            exit_multiple: dec!(9),
            years: 5,
            tax_rate: dec!(0.25),
        }
    }

    #[test]
    fn test_reference_scenario() {
        let out = run_lbo(&reference_input()).unwrap();

        assert_eq!(out.entry_ev, dec!(500));
        assert_eq!(out.entry_debt, dec!(200));
        assert_eq!(out.entry_equity, dec!(300));
        assert_eq!(out.yearly.len(), 5);

        assert!(
            (out.moic - dec!(1.8428)).abs() < dec!(0.001),
            "MOIC should be ~1.84, got {}",
            out.moic
        );
        assert!(
            (out.irr - dec!(0.1300)).abs() < dec!(0.001),
            "IRR should be ~13%, got {}",
            out.irr
        );
    }

    #[test]
    fn test_reference_schedule_year_one() {
        let out = run_lbo(&reference_input()).unwrap();
        let y1 = &out.yearly[0];
        assert_eq!(y1.revenue, dec!(270));
        assert_eq!(y1.ebitda, dec!(54));
        assert_eq!(y1.interest, dec!(16));
        assert_eq!(y1.tax, dec!(9.5));
        assert_eq!(y1.fcf, dec!(12.3));
        assert_eq!(y1.debt_end, dec!(187.7));
    }

    #[test]
    fn test_exit_ties_to_last_year() {
        let input = reference_input();
        let out = run_lbo(&input).unwrap();
        let last = out.yearly.last().unwrap();
        assert_eq!(out.exit_ev, last.ebitda * input.exit_multiple);
        assert_eq!(out.exit_debt, last.debt_end);
        assert_eq!(out.equity_value_at_exit, out.exit_ev - out.exit_debt);
    }

    #[test]
    fn test_irr_matches_moic() {
        let out = run_lbo(&reference_input()).unwrap();
        let expected = out.moic.powd(Decimal::ONE / Decimal::from(5u32)) - Decimal::ONE;
        assert_eq!(out.irr, expected);
    }

    #[test]
    fn test_guardrail_stops_run() {
        let mut input = reference_input();
        input.leverage_multiple = dec!(10);
        assert!(matches!(
            run_lbo(&input),
            Err(DealflowError::NegativeEquityGuardrail { .. })
        ));
    }

    #[test]
    fn test_invalid_assumption_stops_run() {
        let mut input = reference_input();
        input.years = 0;
        assert!(matches!(
            run_lbo(&input),
            Err(DealflowError::InvalidAssumption { .. })
        ));
    }

    #[test]
    fn test_envelope_has_no_warnings_for_reference_run() {
        let out = build_lbo(&reference_input()).unwrap();
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
        assert_eq!(out.assumptions["years"], 5);
    }

    #[test]
    fn test_surplus_cash_warning() {
        let mut input = reference_input();
        input.leverage_multiple = dec!(0.2);
        let out = build_lbo(&input).unwrap();
        assert!(out
            .warnings
            .iter()
            .any(|w| w.contains("surplus free cash flow")));
    }

    #[test]
    fn test_negative_fcf_and_floored_equity_warnings() {
        let mut input = reference_input();
        input.capex_pct_revenue = dec!(0.5);
        input.leverage_multiple = dec!(9);
        input.exit_multiple = dec!(1);
        let out = build_lbo(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("negative free cash flow")));
        assert!(out.warnings.iter().any(|w| w.contains("floored at zero")));
        assert_eq!(out.result.equity_value_at_exit, Decimal::ZERO);
        assert_eq!(out.result.irr, dec!(-1));
    }
}
