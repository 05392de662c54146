use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};

use crate::error::DealflowError;
use crate::types::*;
use crate::DealflowResult;

/// Headline sponsor returns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnMetrics {
    /// Multiple on invested capital: exit equity / entry equity
    pub moic: Multiple,
    /// Annualised return implied by MOIC over the hold
    pub irr: Rate,
}

/// MOIC and the geometric IRR proxy `moic^(1/years) - 1`.
///
/// One outflow at entry and one inflow at exit are assumed, so this is the
/// exact IRR of that two-point cash flow series. A zero `entry_equity`
/// cannot get past the entry guardrail and is reported as
/// [`DealflowError::DivisionByZero`].
pub fn calculate_returns(
    entry_equity: Money,
    equity_value_at_exit: Money,
    years: u32,
) -> DealflowResult<ReturnMetrics> {
    if entry_equity.is_zero() {
        return Err(DealflowError::DivisionByZero {
            context: "entry_equity cannot be zero for MOIC".into(),
        });
    }
    if years == 0 {
        return Err(DealflowError::DivisionByZero {
            context: "holding period cannot be zero for IRR".into(),
        });
    }

    let moic = equity_value_at_exit
        .checked_div(entry_equity)
        .ok_or_else(|| DealflowError::overflow("MOIC (exit equity / entry equity)"))?;
    let exponent = Decimal::ONE / Decimal::from(years);
    let growth = if moic.is_zero() {
        Decimal::ZERO
    } else {
        moic.checked_powd(exponent)
            .ok_or_else(|| {
                DealflowError::overflow(format!("IRR from MOIC {moic} over {years} years"))
            })?
    };

    Ok(ReturnMetrics {
        moic,
        irr: growth - Decimal::ONE,
    })
}
