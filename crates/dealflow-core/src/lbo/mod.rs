//! Leveraged-buyout underwriting engine.
//!
//! The pipeline is a chain of pure stages:
//! [`assumptions::validate`] → [`entry::value_entry`] →
//! [`simulator::simulate_years`] → [`exit::value_exit`] →
//! [`returns::calculate_returns`] → [`model::run_lbo`] (assembly).

pub mod assumptions;
pub mod entry;
pub mod exit;
pub mod model;
pub mod returns;
pub mod simulator;

pub use assumptions::{DealDefaults, LboAssumptions, ValidatedAssumptions};
pub use model::{build_lbo, run_lbo, LboResult};
pub use simulator::YearRecord;
