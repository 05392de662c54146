pub mod simulation;

pub use simulation::{
    run_lbo_monte_carlo, LboMonteCarloInput, LboMonteCarloOutput, McDistribution, McSummary,
};
