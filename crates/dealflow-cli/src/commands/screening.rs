use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use dealflow_core::screening::metrics;
use dealflow_core::screening::screener::{self, ScreenInput, ScreenerFilters};
use dealflow_core::screening::{score_deal, screening_score, Deal};

use crate::input;

/// Read a JSON array of deals from `--deals` or stdin.
fn read_deals(path: Option<&str>) -> Result<Vec<Deal>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err("--deals <deals.json> or a JSON array on stdin is required".into())
    }
}

/// Arguments for a single screening score
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ScoreArgs {
    /// Path to a deal JSON record (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// EBITDA margin (e.g. 0.15 for 15%)
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// Revenue growth (e.g. 0.08 for 8%)
    #[arg(long)]
    pub growth: Option<Decimal>,

    /// EV/EBITDA multiple
    #[arg(long)]
    pub ev_ebitda: Option<Decimal>,
}

pub fn run_score(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let breakdown = if let Some(ref path) = args.input {
        let deal: Deal = input::file::read_json(path)?;
        score_deal(&deal)
    } else if let Some(data) = input::stdin::read_stdin()? {
        let deal: Deal = serde_json::from_value(data)?;
        score_deal(&deal)
    } else {
        let margin = args
            .margin
            .ok_or("--margin is required (or provide --input)")?;
        let growth = args
            .growth
            .ok_or("--growth is required (or provide --input)")?;
        let ev_ebitda = args
            .ev_ebitda
            .ok_or("--ev-ebitda is required (or provide --input)")?;
        screening_score(margin, growth, ev_ebitda)
    };
    Ok(serde_json::to_value(breakdown)?)
}

/// Arguments for screening a deal set
#[derive(Args)]
pub struct ScreenArgs {
    /// Path to JSON file with `deals` and `filters` (overrides the flags below)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a JSON array of deals (otherwise read from stdin)
    #[arg(long)]
    pub deals: Option<String>,

    /// Exact sector match
    #[arg(long)]
    pub sector: Option<String>,

    /// Exact geography match
    #[arg(long)]
    pub geography: Option<String>,

    /// Minimum EV/EBITDA (inclusive)
    #[arg(long)]
    pub ev_ebitda_min: Option<Decimal>,

    /// Maximum EV/EBITDA (inclusive)
    #[arg(long)]
    pub ev_ebitda_max: Option<Decimal>,

    /// Minimum revenue (inclusive)
    #[arg(long)]
    pub revenue_min: Option<Decimal>,

    /// Maximum revenue (inclusive)
    #[arg(long)]
    pub revenue_max: Option<Decimal>,

    /// Maximum number of deals returned
    #[arg(long, default_value_t = 200)]
    pub limit: usize,
}

pub fn run_screen(args: ScreenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let screen_input: ScreenInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else {
        ScreenInput {
            deals: read_deals(args.deals.as_deref())?,
            filters: ScreenerFilters {
                sector: args.sector,
                geography: args.geography,
                ev_ebitda_min: args.ev_ebitda_min,
                ev_ebitda_max: args.ev_ebitda_max,
                revenue_min: args.revenue_min,
                revenue_max: args.revenue_max,
                limit: args.limit,
            },
        }
    };

    let result = screener::run_screen(&screen_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for pipeline metrics
#[derive(Args)]
pub struct MetricsArgs {
    /// Path to a JSON array of deals (otherwise read from stdin)
    #[arg(long)]
    pub deals: Option<String>,
}

pub fn run_metrics(args: MetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let deals = read_deals(args.deals.as_deref())?;
    let result = metrics::run_deal_metrics(&deals)?;
    Ok(serde_json::to_value(result)?)
}
