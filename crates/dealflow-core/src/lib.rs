pub mod error;
pub mod types;

#[cfg(feature = "lbo")]
pub mod lbo;

#[cfg(feature = "screening")]
pub mod screening;

#[cfg(feature = "ingest")]
pub mod ingest;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "monte_carlo")]
pub mod monte_carlo;

pub use error::DealflowError;
pub use types::*;

/// Standard result type for all dealflow operations
pub type DealflowResult<T> = Result<T, DealflowError>;
