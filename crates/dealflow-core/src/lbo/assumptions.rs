use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DealflowError;
use crate::types::*;
use crate::DealflowResult;

/// Deal and financing assumptions for a single LBO run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LboAssumptions {
    /// Entry (LTM) EBITDA
    pub entry_ebitda: Money,
    /// EV/EBITDA paid at entry
    pub entry_multiple: Multiple,
    /// Revenue growth per year (decimal; negative means declining revenue)
    pub revenue_growth: Rate,
    /// EBITDA margin, held constant over the hold period
    pub ebitda_margin: Rate,
    /// Capital expenditures as a fraction of revenue
    pub capex_pct_revenue: Rate,
    /// Net working capital investment as a fraction of revenue
    pub nwc_pct_revenue: Rate,
    /// Interest rate charged on the opening debt balance each year
    pub interest_rate: Rate,
    /// Entry debt as a multiple of entry EBITDA
    pub leverage_multiple: Multiple,
    /// EV/EBITDA received at exit
    pub exit_multiple: Multiple,
    /// Holding period in whole years
    #[serde(default = "default_years")]
    pub years: u32,
    /// Cash tax rate on (EBITDA - interest)
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Rate,
}

fn default_years() -> u32 {
    5
}

fn default_tax_rate() -> Rate {
    Decimal::new(25, 2)
}

/// Assumptions that passed validation, with the base-year revenue derived
/// from entry EBITDA and margin.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedAssumptions<'a> {
    pub assumptions: &'a LboAssumptions,
    /// Year-0 revenue: `entry_ebitda / ebitda_margin`
    pub base_revenue: Money,
}

/// Check every assumption against its domain and derive base revenue.
///
/// Fails with [`DealflowError::InvalidAssumption`] naming the first field
/// that violates its rule, or [`DealflowError::NumericOverflow`] when the
/// derived base revenue does not fit a Decimal. Negative capex/NWC
/// percentages are accepted here; they surface as warnings in
/// [`crate::lbo::build_lbo`].
pub fn validate(input: &LboAssumptions) -> DealflowResult<ValidatedAssumptions<'_>> {
    if input.entry_ebitda <= Decimal::ZERO {
        return Err(DealflowError::invalid_assumption(
            "entry_ebitda",
            "Entry EBITDA must be positive",
        ));
    }
    if input.ebitda_margin <= Decimal::ZERO || input.ebitda_margin > Decimal::ONE {
        return Err(DealflowError::invalid_assumption(
            "ebitda_margin",
            "EBITDA margin must be in (0, 1]",
        ));
    }
    if input.years < 1 {
        return Err(DealflowError::invalid_assumption(
            "years",
            "Holding period must be at least 1 year",
        ));
    }
    if input.tax_rate < Decimal::ZERO || input.tax_rate > Decimal::ONE {
        return Err(DealflowError::invalid_assumption(
            "tax_rate",
            "Tax rate must be in [0, 1]",
        ));
    }
    if input.entry_multiple <= Decimal::ZERO {
        return Err(DealflowError::invalid_assumption(
            "entry_multiple",
            "Entry multiple must be positive",
        ));
    }
    if input.exit_multiple <= Decimal::ZERO {
        return Err(DealflowError::invalid_assumption(
            "exit_multiple",
            "Exit multiple must be positive",
        ));
    }
    if input.leverage_multiple < Decimal::ZERO {
        return Err(DealflowError::invalid_assumption(
            "leverage_multiple",
            "Leverage multiple cannot be negative",
        ));
    }
    if input.interest_rate < Decimal::ZERO {
        return Err(DealflowError::invalid_assumption(
            "interest_rate",
            "Interest rate cannot be negative",
        ));
    }

    let base_revenue = input
        .entry_ebitda
        .checked_div(input.ebitda_margin)
        .ok_or_else(|| DealflowError::overflow("base revenue (entry_ebitda / ebitda_margin)"))?;
    debug!(
        "validated LBO assumptions: base revenue {base_revenue}, {} year hold",
        input.years
    );

    Ok(ValidatedAssumptions {
        assumptions: input,
        base_revenue,
    })
}

impl LboAssumptions {
    /// Names of the fields accepted by [`LboAssumptions::with_override`].
    pub const FIELD_NAMES: [&'static str; 11] = [
        "entry_ebitda",
        "entry_multiple",
        "revenue_growth",
        "ebitda_margin",
        "capex_pct_revenue",
        "nwc_pct_revenue",
        "interest_rate",
        "leverage_multiple",
        "exit_multiple",
        "years",
        "tax_rate",
    ];

    /// Current value of a field by name (`years` as a whole Decimal).
    pub fn field(&self, name: &str) -> DealflowResult<Decimal> {
        Ok(match name {
            "entry_ebitda" => self.entry_ebitda,
            "entry_multiple" => self.entry_multiple,
            "revenue_growth" => self.revenue_growth,
            "ebitda_margin" => self.ebitda_margin,
            "capex_pct_revenue" => self.capex_pct_revenue,
            "nwc_pct_revenue" => self.nwc_pct_revenue,
            "interest_rate" => self.interest_rate,
            "leverage_multiple" => self.leverage_multiple,
            "exit_multiple" => self.exit_multiple,
            "years" => Decimal::from(self.years),
            "tax_rate" => self.tax_rate,
            other => return Err(unknown_field(other)),
        })
    }

    /// Copy of these assumptions with one field replaced by name.
    ///
    /// `years` only accepts whole numbers of at least 1.
    pub fn with_override(&self, field: &str, value: Decimal) -> DealflowResult<Self> {
        let mut next = self.clone();
        match field {
            "entry_ebitda" => next.entry_ebitda = value,
            "entry_multiple" => next.entry_multiple = value,
            "revenue_growth" => next.revenue_growth = value,
            "ebitda_margin" => next.ebitda_margin = value,
            "capex_pct_revenue" => next.capex_pct_revenue = value,
            "nwc_pct_revenue" => next.nwc_pct_revenue = value,
            "interest_rate" => next.interest_rate = value,
            "leverage_multiple" => next.leverage_multiple = value,
            "exit_multiple" => next.exit_multiple = value,
            "tax_rate" => next.tax_rate = value,
            "years" => {
                if !value.fract().is_zero() || value < Decimal::ONE {
                    return Err(DealflowError::InvalidInput {
                        field: "years".into(),
                        reason: format!("Holding period must be a whole number >= 1, got {value}"),
                    });
                }
                next.years = value.to_u32().ok_or_else(|| DealflowError::InvalidInput {
                    field: "years".into(),
                    reason: format!("Holding period {value} is out of range"),
                })?;
            }
            other => return Err(unknown_field(other)),
        }
        Ok(next)
    }
}

fn unknown_field(name: &str) -> DealflowError {
    DealflowError::InvalidInput {
        field: name.into(),
        reason: format!(
            "Unknown assumption; expected one of {}",
            LboAssumptions::FIELD_NAMES.join(", ")
        ),
    }
}

/// Optional values a deal record can contribute to an LBO run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealDefaults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_ebitda: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_multiple: Option<Multiple>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ebitda_margin: Option<Rate>,
}

impl DealDefaults {
    /// Overlay the present defaults onto `base`; absent ones leave `base` as is.
    pub fn apply(&self, base: LboAssumptions) -> LboAssumptions {
        LboAssumptions {
            entry_ebitda: self.entry_ebitda.unwrap_or(base.entry_ebitda),
            entry_multiple: self.entry_multiple.unwrap_or(base.entry_multiple),
            ebitda_margin: self.ebitda_margin.unwrap_or(base.ebitda_margin),
            ..base
        }
    }
}
