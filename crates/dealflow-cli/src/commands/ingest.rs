use chrono::Utc;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use dealflow_core::ingest::{ingest_csv, IngestInput};

use crate::input;

/// Arguments for a bulk CSV import
#[derive(Args)]
pub struct IngestArgs {
    /// Path to the CSV file (otherwise read from stdin)
    #[arg(long)]
    pub file: Option<String>,

    /// Source tag stamped on imported deals
    #[arg(long)]
    pub source: Option<String>,

    /// EV/EBITDA used to impute EV when the file has no EV column (default 8.0)
    #[arg(long)]
    pub default_ev_multiple: Option<Decimal>,
}

pub fn run_ingest(args: IngestArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let csv = if let Some(ref path) = args.file {
        input::file::read_text(path)?
    } else if let Some(text) = input::stdin::read_stdin_text()? {
        text
    } else {
        return Err("--file <deals.csv> or CSV on stdin required for ingest".into());
    };

    let ingest_input = IngestInput {
        csv,
        source: args.source,
        default_ev_multiple: args.default_ev_multiple,
    };
    let result = ingest_csv(&ingest_input, Utc::now())?;
    Ok(serde_json::to_value(result)?)
}
