//! Scenario tooling that drives the LBO engine as independent runs.

pub mod sensitivity;

pub use sensitivity::{
    run_lbo_sensitivity, LboMetric, LboSensitivityInput, LboSensitivityOutput, MAX_SWEEP_POINTS,
};
