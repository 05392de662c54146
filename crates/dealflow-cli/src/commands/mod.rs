pub mod ingest;
pub mod lbo;
pub mod scenarios;
pub mod screening;
