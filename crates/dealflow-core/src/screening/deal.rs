use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::lbo::DealDefaults;
use crate::types::*;

/// Pipeline stage of a deal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealStage {
    #[default]
    Sourced,
    Screened,
    Diligence,
    #[serde(rename = "IC")]
    InvestmentCommittee,
    Closed,
}

/// A target company in the deal pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub sector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsector: Option<String>,
    pub geography: String,
    pub revenue: Money,
    pub ebitda: Money,
    pub ebitda_margin: Rate,
    pub ev: Money,
    /// Stored EV/EBITDA; derived from `ev / ebitda` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ev_ebitda: Option<Multiple>,
    #[serde(default)]
    pub growth_rate: Rate,
    #[serde(default)]
    pub net_debt: Money,
    #[serde(default)]
    pub deal_stage: DealStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// EV/EBITDA rounded to 2 dp; zero when EBITDA is zero, `None` when the
/// ratio does not fit a Decimal.
pub fn try_ev_ebitda(ev: Money, ebitda: Money) -> Option<Multiple> {
    if ebitda.is_zero() {
        return Some(Decimal::ZERO);
    }
    ev.checked_div(ebitda).map(|m| m.round_dp(2))
}

/// EV/EBITDA rounded to 2 dp; zero when EBITDA is zero or the ratio is out
/// of range.
pub fn compute_ev_ebitda(ev: Money, ebitda: Money) -> Multiple {
    try_ev_ebitda(ev, ebitda).unwrap_or(Decimal::ZERO)
}

impl Deal {
    /// Stored multiple if set and non-zero, otherwise derived from EV and EBITDA.
    pub fn effective_ev_ebitda(&self) -> Multiple {
        match self.ev_ebitda {
            Some(m) if !m.is_zero() => m,
            _ => compute_ev_ebitda(self.ev, self.ebitda),
        }
    }

    /// Values this deal can pre-populate an LBO run with. Only economically
    /// usable numbers are offered.
    pub fn lbo_defaults(&self) -> DealDefaults {
        let multiple = self.effective_ev_ebitda();
        DealDefaults {
            entry_ebitda: (self.ebitda > Decimal::ZERO).then_some(self.ebitda),
            entry_multiple: (multiple > Decimal::ZERO).then_some(multiple),
            ebitda_margin: (self.ebitda_margin > Decimal::ZERO
                && self.ebitda_margin <= Decimal::ONE)
                .then_some(self.ebitda_margin),
        }
    }
}
