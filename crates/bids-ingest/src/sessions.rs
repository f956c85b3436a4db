//! Per-session response table parsing.

use std::collections::BTreeMap;

use tracing::debug;

use bids_model::{Issue, IssueKind, ResponseRecord, SessionId, Sheet, SubjectId, is_blank};

use crate::error::{IngestError, Result};
use crate::tasks::normalize_item_name;

pub const SUBJECT_COLUMN: &str = "id";
pub const SESSION_COLUMN: &str = "ses";

#[derive(Debug)]
pub struct ParsedSessions {
    pub records: Vec<ResponseRecord>,
    /// Response column names after item-name normalization, in sheet order,
    /// excluding the id/ses columns. Input to the cross-reference checks.
    pub columns: Vec<String>,
    pub issues: Vec<Issue>,
}

/// Parse one session response table into [`ResponseRecord`]s.
///
/// The table must carry `id` and `ses` leading columns; every other column
/// is a response column keyed by its normalized item name. Blank cells are
/// kept so the missing-value policy is applied in one place downstream.
pub fn parse_session_sheet(sheet: &Sheet) -> Result<ParsedSessions> {
    let subject_col = sheet
        .column_index(SUBJECT_COLUMN)
        .ok_or_else(|| IngestError::MissingColumn {
            sheet: sheet.name.clone(),
            column: SUBJECT_COLUMN.to_string(),
        })?;
    let session_col = sheet
        .column_index(SESSION_COLUMN)
        .ok_or_else(|| IngestError::MissingColumn {
            sheet: sheet.name.clone(),
            column: SESSION_COLUMN.to_string(),
        })?;

    let response_columns: Vec<(usize, String)> = sheet
        .headers
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != subject_col && *index != session_col)
        .map(|(index, header)| (index, normalize_item_name(header)))
        .collect();

    let mut records = Vec::new();
    let mut issues = Vec::new();
    for row in 0..sheet.rows.len() {
        let raw_subject = sheet.value(row, subject_col);
        if is_blank(raw_subject) {
            issues.push(
                Issue::new(
                    IssueKind::MissingSubjectId,
                    format!("row {} has no subject id", row + 1),
                )
                .with_source(sheet.name.clone()),
            );
            continue;
        }
        let subject = match SubjectId::new(raw_subject) {
            Ok(subject) => subject,
            Err(_) => {
                issues.push(
                    Issue::new(
                        IssueKind::MissingSubjectId,
                        format!("row {} has an unusable subject id {raw_subject:?}", row + 1),
                    )
                    .with_source(sheet.name.clone()),
                );
                continue;
            }
        };
        let raw_session = sheet.value(row, session_col);
        let session = match SessionId::new(raw_session) {
            Ok(session) => session,
            Err(_) => {
                issues.push(
                    Issue::new(
                        IssueKind::MissingSubjectId,
                        format!(
                            "row {} ({}) has an unusable session id {raw_session:?}",
                            row + 1,
                            subject
                        ),
                    )
                    .with_source(sheet.name.clone())
                    .with_subject(subject.to_string()),
                );
                continue;
            }
        };

        let mut values = BTreeMap::new();
        for (index, name) in &response_columns {
            values.insert(name.clone(), sheet.value(row, *index).to_string());
        }
        records.push(ResponseRecord {
            subject,
            session,
            values,
        });
    }

    debug!(
        sheet = %sheet.name,
        record_count = records.len(),
        column_count = response_columns.len(),
        "session table parsed"
    );
    Ok(ParsedSessions {
        records,
        columns: response_columns.into_iter().map(|(_, name)| name).collect(),
        issues,
    })
}
