use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DealflowError;
use crate::lbo::simulator::YearRecord;
use crate::types::*;
use crate::DealflowResult;

/// Valuation at the end of the hold period
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitValuation {
    pub exit_ev: Money,
    pub exit_debt: Money,
    /// Floored at zero: equity can be wiped out but not go negative
    pub equity_value_at_exit: Money,
}

/// Value the exit off the final year's EBITDA and closing debt.
pub fn value_exit(schedule: &[YearRecord], exit_multiple: Multiple) -> DealflowResult<ExitValuation> {
    let last = schedule.last().ok_or_else(|| {
        DealflowError::InsufficientData("Exit valuation requires at least one projected year".into())
    })?;

    let exit_ev = last
        .ebitda
        .checked_mul(exit_multiple)
        .ok_or_else(|| DealflowError::overflow("exit enterprise value"))?;
    let exit_debt = last.debt_end;
    let equity_value_at_exit = exit_ev
        .checked_sub(exit_debt)
        .ok_or_else(|| DealflowError::overflow("exit equity"))?
        .max(Decimal::ZERO);

    Ok(ExitValuation {
        exit_ev,
        exit_debt,
        equity_value_at_exit,
    })
}
