use log::trace;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DealflowError;
use crate::lbo::assumptions::ValidatedAssumptions;
use crate::types::*;
use crate::DealflowResult;

/// One year of the operating and debt schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    pub year: u32,
    pub revenue: Money,
    pub ebitda: Money,
    /// Interest on the balance entering the year
    pub interest: Money,
    pub capex: Money,
    pub nwc_change: Money,
    pub tax: Money,
    /// Cash available for debt paydown after interest and tax
    pub fcf: Money,
    /// Closing debt balance, floored at zero
    pub debt_end: Money,
}

/// State threaded from one year into the next.
#[derive(Debug, Clone, Copy)]
struct Carry {
    debt_balance: Money,
    revenue_prev: Money,
}

fn checked(value: Option<Decimal>, what: &str, year: u32) -> DealflowResult<Decimal> {
    value.ok_or_else(|| DealflowError::overflow(format!("year {year} {what}")))
}

/// Advance the schedule by one year.
///
/// All free cash flow goes to debt paydown. A negative FCF adds to the
/// balance; FCF beyond the outstanding balance is discarded, not banked.
fn step(
    validated: &ValidatedAssumptions<'_>,
    carry: Carry,
    year: u32,
) -> DealflowResult<(Carry, YearRecord)> {
    let a = validated.assumptions;

    let revenue = checked(
        Decimal::ONE
            .checked_add(a.revenue_growth)
            .and_then(|factor| carry.revenue_prev.checked_mul(factor)),
        "revenue",
        year,
    )?;
    let ebitda = checked(a.ebitda_margin.checked_mul(revenue), "ebitda", year)?;
    let interest = checked(
        a.interest_rate.checked_mul(carry.debt_balance),
        "interest",
        year,
    )?;
    let capex = checked(a.capex_pct_revenue.checked_mul(revenue), "capex", year)?;
    let nwc_change = checked(a.nwc_pct_revenue.checked_mul(revenue), "nwc_change", year)?;

    // Losses neither carry forward nor earn a refund.
    let taxable_income = checked(ebitda.checked_sub(interest), "taxable income", year)?
        .max(Decimal::ZERO);
    let tax = checked(a.tax_rate.checked_mul(taxable_income), "tax", year)?;

    let fcf = checked(
        ebitda
            .checked_sub(capex)
            .and_then(|v| v.checked_sub(nwc_change))
            .and_then(|v| v.checked_sub(interest))
            .and_then(|v| v.checked_sub(tax)),
        "fcf",
        year,
    )?;
    let debt_end = checked(carry.debt_balance.checked_sub(fcf), "debt_end", year)?
        .max(Decimal::ZERO);

    trace!("year {year}: revenue {revenue}, fcf {fcf}, debt {debt_end}");

    let record = YearRecord {
        year,
        revenue,
        ebitda,
        interest,
        capex,
        nwc_change,
        tax,
        fcf,
        debt_end,
    };
    let next = Carry {
        debt_balance: debt_end,
        revenue_prev: revenue,
    };
    Ok((next, record))
}

/// Project the hold period year by year, starting from `entry_debt`.
///
/// Returns exactly `years` records ordered by `year` from 1. Each year's
/// interest is charged on the previous year's closing balance, so the
/// projection is a strict left fold over the horizon.
pub fn simulate_years(
    validated: &ValidatedAssumptions<'_>,
    entry_debt: Money,
) -> DealflowResult<Vec<YearRecord>> {
    let years = validated.assumptions.years;
    let initial = Carry {
        debt_balance: entry_debt,
        revenue_prev: validated.base_revenue,
    };

    let (_, records) = (1..=years).try_fold(
        (initial, Vec::with_capacity(years as usize)),
        |(carry, mut records), year| {
            let (next, record) = step(validated, carry, year)?;
            records.push(record);
            Ok::<_, DealflowError>((next, records))
        },
    )?;

    Ok(records)
}
