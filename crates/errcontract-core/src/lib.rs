//! errcontract-core: configuration, errors, tracing, and shared collection
//! types for the errcontract analysis engine.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod types;

pub use config::ContractConfig;
pub use errors::{AnalysisError, ErrorCode};
