//! Bulk deal import from tabular (CSV) data.

pub mod columns;
pub mod csv_import;

pub use columns::{ColumnMap, DealColumn};
pub use csv_import::{ingest_csv, IngestInput, IngestReport, RejectedRow};
