//! Row-level normalization: demographics rows against variable
//! definitions, response records against the task that owns each item.
//!
//! Coercion failures are fatal for the affected cell's record but never
//! abort unrelated subjects or tasks; every failure is collected with its
//! subject and item context.

use tracing::debug;

use bids_model::{
    ConvertOptions, DataType, Issue, ResponseRecord, SessionId, Sheet, SubjectId, TaskDefinition,
    VariableDefinition, is_blank,
};

use crate::normalize::{CoercionFailure, NormalizedValue, normalize_value};

pub const DEMOGRAPHICS_ID_COLUMN: &str = "id";

/// One demographics row: values in variable-definition order.
#[derive(Debug, Clone)]
pub struct DemographicsRow {
    pub subject: SubjectId,
    pub values: Vec<NormalizedValue>,
}

#[derive(Debug, Default)]
pub struct DemographicsResult {
    pub rows: Vec<DemographicsRow>,
    pub issues: Vec<Issue>,
}

/// Normalize the demographics table against the variable definitions.
///
/// Columns are matched by name, case-insensitively; a definition without a
/// matching column yields all-missing values (the validator has already
/// flagged it). The `id` definition is carried by the subject itself and
/// is skipped here.
pub fn normalize_demographics(
    sheet: &Sheet,
    variables: &[VariableDefinition],
    options: &ConvertOptions,
) -> DemographicsResult {
    let id_col = sheet.column_index(DEMOGRAPHICS_ID_COLUMN).unwrap_or(0);
    let mut result = DemographicsResult::default();

    for row in 0..sheet.rows.len() {
        let raw_subject = sheet.value(row, id_col);
        if is_blank(raw_subject) {
            // Already reported by the validator; nothing to normalize.
            continue;
        }
        let Ok(subject) = SubjectId::new(raw_subject) else {
            continue;
        };

        let mut values = Vec::with_capacity(variables.len());
        for variable in variables {
            if variable.name.eq_ignore_ascii_case(DEMOGRAPHICS_ID_COLUMN) {
                continue;
            }
            let raw = sheet
                .column_index(&variable.name)
                .map(|col| sheet.value(row, col))
                .unwrap_or("");
            match normalize_value(variable.data_type, variable.levels.as_ref(), raw, options) {
                Ok(value) => values.push(value),
                Err(failure) => {
                    result
                        .issues
                        .push(coercion_issue(failure, &subject, &variable.name, &sheet.name));
                    values.push(NormalizedValue::Missing);
                }
            }
        }
        result.rows.push(DemographicsRow { subject, values });
    }

    debug!(
        row_count = result.rows.len(),
        issue_count = result.issues.len(),
        "demographics normalized"
    );
    result
}

/// One emitted table row for a subject/session/task triple, values in task
/// item order.
#[derive(Debug, Clone)]
pub struct TaskRow {
    pub subject: SubjectId,
    pub session: SessionId,
    pub values: Vec<NormalizedValue>,
}

#[derive(Debug, Default)]
pub struct TaskResponses {
    pub rows: Vec<TaskRow>,
    pub issues: Vec<Issue>,
}

/// Normalize every response record against one task.
///
/// A record contributes a row only when its session table carried at least
/// one of the task's columns; a present-but-blank cell still emits as
/// missing. Likert items coerce as categorical values against their level
/// codes; non-Likert items pass through as sanitized text.
pub fn normalize_task_responses(
    task: &TaskDefinition,
    records: &[ResponseRecord],
    options: &ConvertOptions,
) -> TaskResponses {
    let mut result = TaskResponses::default();

    for record in records {
        let has_any_column = task
            .items
            .iter()
            .any(|item| record.value(&item.name).is_some());
        if !has_any_column {
            continue;
        }

        let mut values = Vec::with_capacity(task.items.len());
        for item in &task.items {
            let raw = record.value(&item.name).unwrap_or("");
            let (data_type, levels) = if item.is_likert() {
                (DataType::Categorical, Some(&item.levels))
            } else {
                (DataType::String, None)
            };
            match normalize_value(data_type, levels, raw, options) {
                Ok(value) => values.push(value),
                Err(failure) => {
                    result.issues.push(coercion_issue(
                        failure,
                        &record.subject,
                        &item.name,
                        task.name.as_str(),
                    ));
                    values.push(NormalizedValue::Missing);
                }
            }
        }
        result.rows.push(TaskRow {
            subject: record.subject.clone(),
            session: record.session.clone(),
            values,
        });
    }

    debug!(
        task = %task.name,
        row_count = result.rows.len(),
        issue_count = result.issues.len(),
        "task responses normalized"
    );
    result
}

fn coercion_issue(
    failure: CoercionFailure,
    subject: &SubjectId,
    item: &str,
    source: &str,
) -> Issue {
    Issue::new(
        failure.kind,
        format!(
            "{subject}: value {:?} for {item:?} failed coercion ({})",
            failure.raw, failure.detail
        ),
    )
    .with_source(source.to_string())
    .with_subject(subject.to_string())
    .with_item(item.to_string())
}
