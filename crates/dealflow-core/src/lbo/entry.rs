use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DealflowError;
use crate::lbo::assumptions::ValidatedAssumptions;
use crate::types::Money;
use crate::DealflowResult;

/// Capital structure at acquisition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryValuation {
    pub entry_ev: Money,
    pub entry_debt: Money,
    pub entry_equity: Money,
}

/// Price the entry and enforce the solvency guardrail.
///
/// A deal whose debt meets or exceeds its enterprise value is not
/// underwritten: `entry_equity <= 0` returns
/// [`DealflowError::NegativeEquityGuardrail`].
pub fn value_entry(validated: &ValidatedAssumptions<'_>) -> DealflowResult<EntryValuation> {
    let a = validated.assumptions;
    let entry_ev = a
        .entry_ebitda
        .checked_mul(a.entry_multiple)
        .ok_or_else(|| DealflowError::overflow("entry enterprise value"))?;
    let entry_debt = a
        .leverage_multiple
        .checked_mul(a.entry_ebitda)
        .ok_or_else(|| DealflowError::overflow("entry debt"))?;
    let entry_equity = entry_ev
        .checked_sub(entry_debt)
        .ok_or_else(|| DealflowError::overflow("entry equity"))?;

    if entry_equity <= Decimal::ZERO {
        warn!("guardrail: entry debt {entry_debt} >= entry EV {entry_ev}");
        return Err(DealflowError::NegativeEquityGuardrail {
            entry_ev,
            entry_debt,
        });
    }

    Ok(EntryValuation {
        entry_ev,
        entry_debt,
        entry_equity,
    })
}
