use serde::{Deserialize, Serialize};

use crate::error::DealflowError;
use crate::DealflowResult;

const COLUMN_COUNT: usize = 10;

/// A deal attribute that can be read from an import column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealColumn {
    Name,
    Sector,
    Subsector,
    Geography,
    Revenue,
    Ebitda,
    Ev,
    EvEbitda,
    GrowthRate,
    NetDebt,
}

impl DealColumn {
    pub const REQUIRED: [DealColumn; 5] = [
        DealColumn::Name,
        DealColumn::Sector,
        DealColumn::Geography,
        DealColumn::Revenue,
        DealColumn::Ebitda,
    ];

    pub const ALL: [DealColumn; COLUMN_COUNT] = [
        DealColumn::Name,
        DealColumn::Sector,
        DealColumn::Subsector,
        DealColumn::Geography,
        DealColumn::Revenue,
        DealColumn::Ebitda,
        DealColumn::Ev,
        DealColumn::EvEbitda,
        DealColumn::GrowthRate,
        DealColumn::NetDebt,
    ];

    /// Accepted header spellings (lower-case), in order of preference.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            DealColumn::Name => &["name", "company", "company_name"],
            DealColumn::Sector => &["sector"],
            DealColumn::Subsector => &["subsector", "sub_sector"],
            DealColumn::Geography => &["geography", "geo", "country", "region"],
            DealColumn::Revenue => &["revenue", "ltm_revenue", "ntm_revenue"],
            DealColumn::Ebitda => &["ebitda", "ltm_ebitda", "ntm_ebitda"],
            DealColumn::Ev => &["ev", "enterprise_value"],
            DealColumn::EvEbitda => &["ev/ebitda", "ev_ebitda", "multiple"],
            DealColumn::GrowthRate => &["growth", "growth_rate", "revenue_growth"],
            DealColumn::NetDebt => &["net_debt", "debt"],
        }
    }

    pub fn label(self) -> &'static str {
        self.aliases()[0]
    }
}

/// Resolved header positions for each deal attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [Option<usize>; COLUMN_COUNT],
}

impl ColumnMap {
    /// Match headers case-insensitively against each column's aliases.
    ///
    /// Fails with [`DealflowError::InvalidInput`] naming the first required
    /// column that has no matching header.
    pub fn resolve<'h>(headers: impl IntoIterator<Item = &'h str>) -> DealflowResult<Self> {
        let lowered: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut map = ColumnMap::default();
        for (slot, column) in DealColumn::ALL.iter().enumerate() {
            map.positions[slot] = column
                .aliases()
                .iter()
                .find_map(|alias| lowered.iter().position(|h| h == alias));
        }

        if let Some(missing) = DealColumn::REQUIRED.iter().find(|c| map.get(**c).is_none()) {
            return Err(DealflowError::InvalidInput {
                field: missing.label().into(),
                reason: format!(
                    "Missing required column (accepted headers: {})",
                    missing.aliases().join(", ")
                ),
            });
        }
        Ok(map)
    }

    /// Position of the column in each record, if the header was present.
    pub fn get(&self, column: DealColumn) -> Option<usize> {
        let slot = DealColumn::ALL.iter().position(|c| *c == column)?;
        self.positions[slot]
    }
}
