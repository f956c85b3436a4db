//! Cross-reference validation.
//!
//! Runs after all definitions are parsed and before any normalization.
//! Every check reports independently and the report carries the complete
//! set of violations for the run, never just the first.

pub mod checks;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use bids_ingest::TaskSource;
use bids_model::{
    ConvertOptions, Issue, IssueSeverity, Sheet, TaskDefinition, ValidationReport,
    VariableDefinition,
};

use crate::checks::items::{check_item_references, check_missing_response_columns};
use crate::checks::sheets::check_task_sheets;
use crate::checks::subjects::check_subjects;
use crate::checks::variables::check_variable_columns;

/// Everything the validator cross-references, borrowed from the parse
/// stage.
#[derive(Debug)]
pub struct ValidationInput<'a> {
    pub demographics: &'a Sheet,
    pub variables: &'a [VariableDefinition],
    pub tasks: &'a [TaskDefinition],
    pub task_sources: &'a [TaskSource],
    /// Response-table name plus its normalized item columns, per table.
    pub response_tables: &'a [(String, Vec<String>)],
}

/// Run every cross-reference check and collect all violations.
pub fn validate_dataset(input: &ValidationInput<'_>, options: &ConvertOptions) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.extend(check_task_sheets(
        input.task_sources,
        options.min_required_sheets,
    ));
    report.extend(check_subjects(input.demographics));
    report.extend(check_item_references(input.tasks, input.response_tables));
    report.extend(check_missing_response_columns(
        input.tasks,
        input.response_tables,
    ));
    report.extend(check_variable_columns(input.variables, input.demographics));

    info!(
        error_count = report.error_count(),
        warning_count = report.warning_count(),
        "cross-reference validation complete"
    );
    report
}

#[derive(Debug, Serialize)]
struct ValidationReportPayload<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    study_name: &'a str,
    error_count: usize,
    warning_count: usize,
    issues: Vec<IssueJson<'a>>,
}

#[derive(Debug, Serialize)]
struct IssueJson<'a> {
    severity: IssueSeverity,
    kind: &'static str,
    message: &'a str,
    source: Option<&'a str>,
    subject: Option<&'a str>,
    item: Option<&'a str>,
}

impl<'a> From<&'a Issue> for IssueJson<'a> {
    fn from(issue: &'a Issue) -> Self {
        Self {
            severity: issue.severity(),
            kind: issue.kind.as_str(),
            message: &issue.message,
            source: issue.source.as_deref(),
            subject: issue.subject.as_deref(),
            item: issue.item.as_deref(),
        }
    }
}

const REPORT_SCHEMA: &str = "bids-transpiler.validation-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

/// Write the run's issue report as JSON next to the emitted dataset.
pub fn write_validation_report_json(
    output_dir: &Path,
    study_name: &str,
    report: &ValidationReport,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join("validation_report.json");
    let payload = ValidationReportPayload {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        study_name,
        error_count: report.error_count(),
        warning_count: report.warning_count(),
        issues: report.issues.iter().map(IssueJson::from).collect(),
    };
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(&output_path, format!("{json}\n"))?;
    Ok(output_path)
}
