//! Conversion pipeline with explicit stages.
//!
//! The pipeline runs these stages in order:
//! 1. **Parse**: read the study folder, parse definitions and responses
//! 2. **Validate**: cross-reference checks over the whole dataset
//! 3. **Normalize**: per-cell coercion and missing-value policy
//! 4. **Emit**: assemble sidecar documents and tables
//!
//! Each stage takes the output of the previous stage and returns typed
//! results; no stage retries or loops back. Emission only runs when the
//! collected report carries zero errors.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use bids_ingest::{
    StudyFolder, TaskSource, load_study, parse_dataset_metadata_sheet, parse_session_sheet,
    parse_task_source, parse_variable_sheet,
};
use bids_model::{
    ConvertOptions, DataType, Dataset, Issue, Sheet, SubjectId, ValidationReport,
    VariableDefinition, is_blank,
};
use bids_output::{EmitResult, NormalizedTask, emit_dataset};
use bids_transform::{
    DEMOGRAPHICS_ID_COLUMN, DemographicsRow, TaskRow, normalize_demographics,
    normalize_task_responses,
};
use bids_validate::{ValidationInput, validate_dataset};

/// Result of the parse stage: the assembled dataset plus everything the
/// validator cross-references against it.
#[derive(Debug)]
pub struct ParseResult {
    pub dataset: Dataset,
    pub demographics: Sheet,
    pub task_sources: Vec<TaskSource>,
    /// Response-table name and normalized columns, per session table.
    pub response_tables: Vec<(String, Vec<String>)>,
    /// Issues collected while parsing definitions and session tables.
    pub issues: Vec<Issue>,
}

/// Read and parse a study folder into the typed model.
pub fn parse_study(study_folder: &Path) -> Result<ParseResult> {
    let span = info_span!("parse", study_folder = %study_folder.display());
    let _guard = span.enter();
    let start = Instant::now();

    let StudyFolder {
        demographics,
        variables,
        dataset_metadata,
        sessions,
        tasks: task_sources,
    } = load_study(study_folder).context("load study folder")?;

    let mut issues = Vec::new();

    let parsed_variables =
        parse_variable_sheet(&variables).context("parse variable definitions")?;
    issues.extend(parsed_variables.issues);

    let metadata = dataset_metadata
        .as_ref()
        .map(parse_dataset_metadata_sheet)
        .unwrap_or_default();

    let mut tasks = Vec::new();
    for source in &task_sources {
        let parsed = parse_task_source(source)
            .with_context(|| format!("parse task source {:?}", source.name))?;
        issues.extend(parsed.issues);
        tasks.push(parsed.task);
    }

    let mut records = Vec::new();
    let mut response_tables = Vec::new();
    for sheet in &sessions {
        let parsed = parse_session_sheet(sheet)
            .with_context(|| format!("parse session table {:?}", sheet.name))?;
        issues.extend(parsed.issues);
        response_tables.push((sheet.name.clone(), parsed.columns));
        records.extend(parsed.records);
    }

    let mut variables = parsed_variables.variables;
    extend_with_passthrough_columns(&mut variables, &demographics);

    let subjects = subjects_from_demographics(&demographics);
    let dataset = Dataset {
        study_name: derive_study_name(study_folder),
        variables,
        tasks,
        subjects,
        records,
        metadata,
    };

    info!(
        variable_count = dataset.variables.len(),
        task_count = dataset.tasks.len(),
        subject_count = dataset.subjects.len(),
        record_count = dataset.records.len(),
        issue_count = issues.len(),
        duration_ms = start.elapsed().as_millis(),
        "parse complete"
    );
    Ok(ParseResult {
        dataset,
        demographics,
        task_sources,
        response_tables,
        issues,
    })
}

/// Run cross-reference validation; the returned report starts with the
/// parse-stage issues so one run reports the complete set of problems.
pub fn validate(parsed: &ParseResult, options: &ConvertOptions) -> ValidationReport {
    let span = info_span!("validate");
    let _guard = span.enter();
    let start = Instant::now();

    let mut report = ValidationReport::new();
    report.extend(parsed.issues.iter().cloned());
    let input = ValidationInput {
        demographics: &parsed.demographics,
        variables: &parsed.dataset.variables,
        tasks: &parsed.dataset.tasks,
        task_sources: &parsed.task_sources,
        response_tables: &parsed.response_tables,
    };
    let cross = validate_dataset(&input, options);
    report.extend(cross.issues);

    info!(
        error_count = report.error_count(),
        warning_count = report.warning_count(),
        duration_ms = start.elapsed().as_millis(),
        "validation complete"
    );
    report
}

/// Result of the normalize stage. `task_rows` is parallel to
/// `dataset.tasks`.
#[derive(Debug)]
pub struct NormalizedData {
    pub demographics_rows: Vec<DemographicsRow>,
    pub task_rows: Vec<Vec<TaskRow>>,
    pub issues: Vec<Issue>,
}

/// Coerce demographics and responses per their declared types.
///
/// Coercion failures are collected per subject and item; they are fatal
/// for emission but never stop normalization of unrelated records.
pub fn normalize(parsed: &ParseResult, options: &ConvertOptions) -> NormalizedData {
    let span = info_span!("normalize");
    let _guard = span.enter();
    let start = Instant::now();

    let mut issues = Vec::new();
    let demographics = normalize_demographics(
        &parsed.demographics,
        &parsed.dataset.variables,
        options,
    );
    issues.extend(demographics.issues);

    let mut task_rows = Vec::with_capacity(parsed.dataset.tasks.len());
    for task in &parsed.dataset.tasks {
        let responses = normalize_task_responses(task, &parsed.dataset.records, options);
        issues.extend(responses.issues);
        task_rows.push(responses.rows);
    }

    info!(
        demographics_rows = demographics.rows.len(),
        issue_count = issues.len(),
        duration_ms = start.elapsed().as_millis(),
        "normalization complete"
    );
    NormalizedData {
        demographics_rows: demographics.rows,
        task_rows,
        issues,
    }
}

/// Assemble the artifact set from the validated dataset and its
/// normalized rows.
pub fn emit(
    parsed: &ParseResult,
    normalized: &NormalizedData,
    options: &ConvertOptions,
) -> EmitResult {
    let span = info_span!("emit");
    let _guard = span.enter();

    let tasks: Vec<NormalizedTask<'_>> = parsed
        .dataset
        .tasks
        .iter()
        .zip(&normalized.task_rows)
        .map(|(task, rows)| NormalizedTask {
            task,
            rows: rows.as_slice(),
        })
        .collect();
    emit_dataset(
        &parsed.dataset,
        &normalized.demographics_rows,
        &tasks,
        options,
    )
}

/// Demographics columns without a definition are tolerated: they pass
/// through as string-typed variables with a generic description, appended
/// after the declared definitions in sheet order.
fn extend_with_passthrough_columns(variables: &mut Vec<VariableDefinition>, demographics: &Sheet) {
    for header in &demographics.headers {
        let name = header.trim().to_lowercase();
        if name.is_empty() || name == DEMOGRAPHICS_ID_COLUMN {
            continue;
        }
        if variables
            .iter()
            .any(|variable| variable.name.eq_ignore_ascii_case(&name))
        {
            continue;
        }
        variables.push(VariableDefinition {
            name,
            description: "No description available".to_string(),
            data_type: DataType::String,
            levels: None,
        });
    }
}

/// Unique subjects from the demographics table, in first-seen order.
/// Invalid rows are skipped here; the validator reports them.
fn subjects_from_demographics(demographics: &Sheet) -> Vec<SubjectId> {
    let id_col = demographics
        .column_index(DEMOGRAPHICS_ID_COLUMN)
        .unwrap_or(0);
    let mut subjects: Vec<SubjectId> = Vec::new();
    for row in 0..demographics.rows.len() {
        let raw = demographics.value(row, id_col);
        if is_blank(raw) {
            continue;
        }
        if let Ok(subject) = SubjectId::new(raw)
            && !subjects.contains(&subject)
        {
            subjects.push(subject);
        }
    }
    subjects
}

fn derive_study_name(study_folder: &Path) -> String {
    study_folder
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("study")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_columns_are_appended_as_strings() {
        let mut sheet = Sheet::new(
            "demographics",
            vec![
                "id".to_string(),
                "age".to_string(),
                "Undeclared".to_string(),
            ],
        );
        sheet.push_row(vec![
            "001".to_string(),
            "30".to_string(),
            "x".to_string(),
        ]);
        let mut variables = vec![VariableDefinition {
            name: "age".to_string(),
            description: "Age in years".to_string(),
            data_type: DataType::Integer,
            levels: None,
        }];
        extend_with_passthrough_columns(&mut variables, &sheet);
        assert_eq!(variables.len(), 2);
        assert_eq!(variables[1].name, "undeclared");
        assert_eq!(variables[1].data_type, DataType::String);
        assert_eq!(variables[1].description, "No description available");
    }

    #[test]
    fn subjects_keep_first_seen_order_and_dedupe() {
        let mut sheet = Sheet::new("demographics", vec!["id".to_string()]);
        for id in ["002", "001", "sub-002", ""] {
            sheet.push_row(vec![id.to_string()]);
        }
        let subjects = subjects_from_demographics(&sheet);
        let names: Vec<&str> = subjects.iter().map(SubjectId::as_str).collect();
        assert_eq!(names, vec!["sub-002", "sub-001"]);
    }

    #[test]
    fn study_name_falls_back() {
        assert_eq!(derive_study_name(Path::new("/data/mystudy")), "mystudy");
        assert_eq!(derive_study_name(Path::new("/")), "study");
    }
}
