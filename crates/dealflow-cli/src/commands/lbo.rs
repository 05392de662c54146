use clap::Args;
use log::info;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use dealflow_core::lbo::{self, DealDefaults, LboAssumptions};
use dealflow_core::screening::Deal;

use crate::input;

/// Arguments for the LBO model
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct LboArgs {
    /// Path to JSON assumptions file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to a deal JSON record. Its EBITDA, entry multiple and margin
    /// replace those in --input or stdin, and fill in flags left unset
    #[arg(long)]
    pub deal: Option<String>,

    /// Entry (LTM) EBITDA
    #[arg(long)]
    pub entry_ebitda: Option<Decimal>,

    /// EV/EBITDA paid at entry
    #[arg(long)]
    pub entry_multiple: Option<Decimal>,

    /// Annual revenue growth (e.g. 0.08 for 8%)
    #[arg(long)]
    pub revenue_growth: Option<Decimal>,

    /// EBITDA margin, in (0, 1]
    #[arg(long)]
    pub ebitda_margin: Option<Decimal>,

    /// Capex as a fraction of revenue
    #[arg(long)]
    pub capex_pct_revenue: Option<Decimal>,

    /// Net working capital investment as a fraction of revenue
    #[arg(long)]
    pub nwc_pct_revenue: Option<Decimal>,

    /// Interest rate on the opening debt balance
    #[arg(long)]
    pub interest_rate: Option<Decimal>,

    /// Entry debt as a multiple of entry EBITDA
    #[arg(long, alias = "leverage")]
    pub leverage_multiple: Option<Decimal>,

    /// EV/EBITDA received at exit
    #[arg(long)]
    pub exit_multiple: Option<Decimal>,

    /// Holding period in years (default 5)
    #[arg(long)]
    pub years: Option<u32>,

    /// Cash tax rate (default 0.25)
    #[arg(long)]
    pub tax_rate: Option<Decimal>,
}

fn required(value: Option<Decimal>, flag: &str) -> Result<Decimal, Box<dyn std::error::Error>> {
    value.ok_or_else(|| format!("--{flag} is required (or provide --input)").into())
}

fn assumptions_from_flags(
    args: &LboArgs,
    defaults: &DealDefaults,
) -> Result<LboAssumptions, Box<dyn std::error::Error>> {
    Ok(LboAssumptions {
        entry_ebitda: required(args.entry_ebitda.or(defaults.entry_ebitda), "entry-ebitda")?,
        entry_multiple: required(
            args.entry_multiple.or(defaults.entry_multiple),
            "entry-multiple",
        )?,
        revenue_growth: required(args.revenue_growth, "revenue-growth")?,
        ebitda_margin: required(
            args.ebitda_margin.or(defaults.ebitda_margin),
            "ebitda-margin",
        )?,
        capex_pct_revenue: required(args.capex_pct_revenue, "capex-pct-revenue")?,
        nwc_pct_revenue: required(args.nwc_pct_revenue, "nwc-pct-revenue")?,
        interest_rate: required(args.interest_rate, "interest-rate")?,
        leverage_multiple: required(args.leverage_multiple, "leverage-multiple")?,
        exit_multiple: required(args.exit_multiple, "exit-multiple")?,
        years: args.years.unwrap_or(5),
        tax_rate: args.tax_rate.unwrap_or(dec!(0.25)),
    })
}

fn deal_defaults(args: &LboArgs) -> Result<DealDefaults, Box<dyn std::error::Error>> {
    match args.deal {
        Some(ref path) => {
            let deal: Deal = input::file::read_json(path)?;
            info!("pre-filling LBO assumptions from deal '{}'", deal.name);
            Ok(deal.lbo_defaults())
        }
        None => Ok(DealDefaults::default()),
    }
}

/// A JSON payload takes the deal's values over its own; without one the
/// assumptions come from flags, with the deal covering the unset ones.
fn resolve_assumptions(
    args: &LboArgs,
    payload: Option<LboAssumptions>,
    defaults: &DealDefaults,
) -> Result<LboAssumptions, Box<dyn std::error::Error>> {
    match payload {
        Some(base) => Ok(defaults.apply(base)),
        None => assumptions_from_flags(args, defaults),
    }
}

pub fn run_lbo(args: LboArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let defaults = deal_defaults(&args)?;
    let payload: Option<LboAssumptions> = if let Some(ref path) = args.input {
        Some(input::file::read_json(path)?)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Some(serde_json::from_value(data)?)
    } else {
        None
    };
    let assumptions = resolve_assumptions(&args, payload, &defaults)?;

    let result = lbo::build_lbo(&assumptions)?;
    Ok(serde_json::to_value(result)?)
}
