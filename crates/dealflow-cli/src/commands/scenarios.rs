use clap::Args;
use serde_json::Value;

use dealflow_core::lbo::LboAssumptions;
use dealflow_core::monte_carlo::{self, LboMonteCarloInput};
use dealflow_core::scenarios::{self, LboMetric, LboSensitivityInput};
use dealflow_core::SensitivityVariable;

use crate::input;

/// Arguments for an LBO sensitivity grid
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to JSON file with the full sensitivity input (overrides the flags below)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to JSON file with the base case LBO assumptions
    #[arg(long)]
    pub base_inputs: Option<String>,

    /// Row variable in format name:min:max:step
    /// (e.g. "exit_multiple:7:11:1")
    #[arg(long)]
    pub var1: Option<String>,

    /// Column variable in format name:min:max:step
    /// (e.g. "leverage_multiple:3:6:0.5")
    #[arg(long)]
    pub var2: Option<String>,

    /// Output metric: irr, moic, equity_value_at_exit, exit_ev, exit_debt
    #[arg(long, default_value = "irr")]
    pub metric: String,
}

fn parse_sens_var(raw: &str) -> Result<SensitivityVariable, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = raw.split(':').collect();
    if parts.len() != 4 {
        return Err(format!(
            "Sensitivity variable must be name:min:max:step, got '{}'",
            raw
        )
        .into());
    }
    Ok(SensitivityVariable {
        name: parts[0].to_string(),
        min: parts[1].parse()?,
        max: parts[2].parse()?,
        step: parts[3].parse()?,
    })
}

fn parse_metric(name: &str) -> Result<LboMetric, Box<dyn std::error::Error>> {
    serde_json::from_value(Value::String(name.to_lowercase())).map_err(|_| {
        format!(
            "Unknown metric '{}'. Available metrics: irr, moic, equity_value_at_exit, exit_ev, exit_debt",
            name
        )
        .into()
    })
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input: LboSensitivityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else {
        let base: LboAssumptions = if let Some(ref path) = args.base_inputs {
            input::file::read_json(path)?
        } else if let Some(data) = input::stdin::read_stdin()? {
            serde_json::from_value(data)?
        } else {
            return Err("--base-inputs <file.json> or stdin required for sensitivity".into());
        };
        let var1 = args
            .var1
            .as_deref()
            .ok_or("--var1 is required (or provide --input)")?;
        let var2 = args
            .var2
            .as_deref()
            .ok_or("--var2 is required (or provide --input)")?;

        LboSensitivityInput {
            base,
            variable_1: parse_sens_var(var1)?,
            variable_2: parse_sens_var(var2)?,
            output_metric: parse_metric(&args.metric)?,
        }
    };

    let result = scenarios::run_lbo_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a Monte Carlo LBO
#[derive(Args)]
pub struct MonteCarloArgs {
    /// Path to JSON input file (base assumptions and distributions)
    #[arg(long)]
    pub input: Option<String>,

    /// Number of simulation paths (overrides the input file)
    #[arg(long)]
    pub simulations: Option<u32>,

    /// RNG seed for reproducible runs (overrides the input file)
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_monte_carlo(args: MonteCarloArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut mc_input: LboMonteCarloInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <file.json> or stdin required for Monte Carlo".into());
    };

    if let Some(n) = args.simulations {
        mc_input.num_simulations = n;
    }
    if args.seed.is_some() {
        mc_input.seed = args.seed;
    }

    let result = monte_carlo::run_lbo_monte_carlo(&mc_input)?;
    Ok(serde_json::to_value(result)?)
}
