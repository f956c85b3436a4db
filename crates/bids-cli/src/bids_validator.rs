//! Invocation of the external BIDS validator.
//!
//! The validator is an independently maintained black box run via `deno`;
//! it takes the dataset directory and returns pass/fail plus diagnostics.
//! A machine without the runtime skips validation instead of failing the
//! conversion.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use tracing::{info, warn};

const VALIDATOR_RUNTIME: &str = "deno";
const VALIDATOR_ARGS: [&str; 3] = ["run", "-ERN", "jsr:@bids/validator"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatorOutcome {
    Passed,
    Failed { detail: String },
    /// Runtime missing or not runnable; conversion output stands as-is.
    Unavailable { reason: String },
}

pub fn run_bids_validator(dataset_root: &Path) -> ValidatorOutcome {
    info!(dataset = %dataset_root.display(), "running BIDS validator");
    let output = Command::new(VALIDATOR_RUNTIME)
        .args(VALIDATOR_ARGS)
        .arg(dataset_root)
        .arg("--ignoreWarnings")
        .output();
    match output {
        Ok(output) if output.status.success() => {
            info!("BIDS validation passed");
            ValidatorOutcome::Passed
        }
        Ok(output) => {
            let mut detail = String::from_utf8_lossy(&output.stdout).into_owned();
            detail.push_str(&String::from_utf8_lossy(&output.stderr));
            let detail = truncate(detail.trim(), 2000);
            warn!(%detail, "BIDS validation failed");
            ValidatorOutcome::Failed { detail }
        }
        Err(error) if error.kind() == ErrorKind::NotFound => {
            let reason = format!("{VALIDATOR_RUNTIME} not found; skipping standard validation");
            warn!(%reason, "BIDS validator unavailable");
            ValidatorOutcome::Unavailable { reason }
        }
        Err(error) => {
            let reason = error.to_string();
            warn!(%reason, "BIDS validator could not run");
            ValidatorOutcome::Unavailable { reason }
        }
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut boundary = limit;
    while boundary > 0 && !text.is_char_boundary(boundary) {
        boundary -= 1;
    }
    format!("{}...", &text[..boundary])
}
