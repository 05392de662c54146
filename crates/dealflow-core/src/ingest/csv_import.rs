use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

use crate::ingest::columns::{ColumnMap, DealColumn};
use crate::screening::deal::{try_ev_ebitda, Deal, DealStage};
use crate::types::*;
use crate::DealflowResult;

const DEFAULT_SOURCE: &str = "csv_upload";
/// EV/EBITDA assumed for rows when the file has no EV column at all
const DEFAULT_EV_MULTIPLE: Multiple = dec!(8.0);

/// Input for a bulk CSV import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestInput {
    /// Raw CSV text including the header row
    pub csv: String,
    /// Source tag stamped on every imported deal (default "csv_upload")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// EV/EBITDA used to impute EV when the file carries no EV column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ev_multiple: Option<Multiple>,
}

/// A data row that could not be imported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// 1-based line number in the file (the header is line 1)
    pub line: u64,
    pub reason: String,
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub accepted_count: usize,
    pub rejected_count: usize,
    pub accepted: Vec<Deal>,
    pub rejected: Vec<RejectedRow>,
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Cell accessor for one record against the resolved column map.
struct Row<'r> {
    record: &'r StringRecord,
    columns: &'r ColumnMap,
}

impl Row<'_> {
    /// Trimmed, non-empty cell; `None` if the column is absent or blank.
    fn cell(&self, column: DealColumn) -> Option<&str> {
        let idx = self.columns.get(column)?;
        self.record
            .get(idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn text(&self, column: DealColumn) -> Result<String, String> {
        self.cell(column)
            .map(str::to_string)
            .ok_or_else(|| format!("missing value for {}", column.label()))
    }

    fn number(&self, column: DealColumn) -> Result<Decimal, String> {
        let raw = self
            .cell(column)
            .ok_or_else(|| format!("missing value for {}", column.label()))?;
        parse_decimal(raw)
            .ok_or_else(|| format!("non-numeric value '{raw}' for {}", column.label()))
    }

    fn optional_number(&self, column: DealColumn) -> Result<Option<Decimal>, String> {
        match self.cell(column) {
            None => Ok(None),
            Some(_) => self.number(column).map(Some),
        }
    }
}

fn out_of_range(column: DealColumn) -> String {
    format!("value out of range for {}", column.label())
}

fn build_deal(
    row: &Row<'_>,
    source: &str,
    default_multiple: Multiple,
    imported_at: DateTime<Utc>,
) -> Result<Deal, String> {
    let name = row.text(DealColumn::Name)?;
    let sector = row.text(DealColumn::Sector)?;
    let geography = row.text(DealColumn::Geography)?;
    let revenue = row.number(DealColumn::Revenue)?;
    let ebitda = row.number(DealColumn::Ebitda)?;

    let subsector = row.cell(DealColumn::Subsector).map(str::to_string);
    let ev = match row.optional_number(DealColumn::Ev)? {
        Some(ev) => ev,
        None => ebitda
            .max(Decimal::ZERO)
            .checked_mul(default_multiple)
            .ok_or_else(|| out_of_range(DealColumn::Ev))?,
    };
    let ev_ebitda = match row.optional_number(DealColumn::EvEbitda)? {
        Some(m) => m,
        None => try_ev_ebitda(ev, ebitda).ok_or_else(|| out_of_range(DealColumn::EvEbitda))?,
    };
    let growth_rate = row
        .optional_number(DealColumn::GrowthRate)?
        .unwrap_or(Decimal::ZERO);
    let net_debt = row
        .optional_number(DealColumn::NetDebt)?
        .unwrap_or(Decimal::ZERO);
    let ebitda_margin = if revenue.is_zero() {
        Decimal::ZERO
    } else {
        ebitda
            .checked_div(revenue)
            .ok_or_else(|| out_of_range(DealColumn::Ebitda))?
    };

    Ok(Deal {
        id: None,
        name,
        sector,
        subsector,
        geography,
        revenue,
        ebitda,
        ebitda_margin,
        ev,
        ev_ebitda: Some(ev_ebitda),
        growth_rate,
        net_debt,
        deal_stage: DealStage::Sourced,
        source: Some(source.to_string()),
        created_at: Some(imported_at),
        updated_at: Some(imported_at),
    })
}

/// Map, validate and convert CSV rows into deal records.
///
/// A header lacking a required column fails the whole import. Individual
/// rows with a missing required value or a non-numeric figure are rejected
/// and listed in the report; the rest are accepted.
pub fn ingest_csv(
    input: &IngestInput,
    imported_at: DateTime<Utc>,
) -> DealflowResult<ComputationOutput<IngestReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input.csv.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = ColumnMap::resolve(headers.iter())?;
    debug!("resolved import columns from {} headers", headers.len());

    let source = input.source.as_deref().unwrap_or(DEFAULT_SOURCE);
    let default_multiple = input.default_ev_multiple.unwrap_or(DEFAULT_EV_MULTIPLE);
    if columns.get(DealColumn::Ev).is_none() {
        warnings.push(format!(
            "No EV column; enterprise value imputed at {default_multiple}x EBITDA"
        ));
    }

    let mut accepted = Vec::new();
    let mut rejected = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // Header occupies line 1
        let fallback_line = idx as u64 + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                rejected.push(RejectedRow {
                    line: e.position().map_or(fallback_line, |p| p.line()),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map_or(fallback_line, |p| p.line());
        let row = Row {
            record: &record,
            columns: &columns,
        };
        match build_deal(&row, source, default_multiple, imported_at) {
            Ok(deal) => accepted.push(deal),
            Err(reason) => rejected.push(RejectedRow { line, reason }),
        }
    }

    if accepted.is_empty() && rejected.is_empty() {
        warnings.push("CSV contains a header but no data rows".into());
    }
    if !rejected.is_empty() {
        warnings.push(format!("{} row(s) rejected", rejected.len()));
    }
    info!(
        "imported {} deal(s), rejected {} row(s)",
        accepted.len(),
        rejected.len()
    );

    let report = IngestReport {
        accepted_count: accepted.len(),
        rejected_count: rejected.len(),
        accepted,
        rejected,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bulk deal import: column mapping and row validation",
        &serde_json::json!({
            "source": source,
            "default_ev_multiple": default_multiple.to_string(),
            "imported_at": imported_at.to_rfc3339(),
        }),
        warnings,
        elapsed,
        report,
    ))
}
