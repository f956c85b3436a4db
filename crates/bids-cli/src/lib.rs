//! Behavioral Survey to BIDS Transpiler CLI.

pub mod bids_validator;
pub mod cli;
pub mod commands;
pub mod logging;
pub mod pipeline;
pub mod summary;
pub mod types;
pub mod writer;
