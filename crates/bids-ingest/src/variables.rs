//! Definition Parser for the variable-definition and dataset-metadata
//! sheets.

use std::collections::BTreeSet;

use tracing::debug;

use bids_model::{
    DataType, Issue, IssueKind, Levels, Sheet, VariableDefinition, is_blank,
};

use crate::error::{IngestError, Result};

pub const VARIABLE_NAME_COLUMN: &str = "VariableName";
pub const DESCRIPTION_COLUMN: &str = "Description";
pub const DATA_TYPE_COLUMN: &str = "DataType";
pub const LEVELS_COLUMN: &str = "Levels";

/// Outcome of parsing the variable-definition sheet: the definitions that
/// parsed cleanly plus every problem found. Rows with errors are dropped
/// from the definition list, never half-built.
#[derive(Debug)]
pub struct ParsedVariables {
    pub variables: Vec<VariableDefinition>,
    pub issues: Vec<Issue>,
}

/// Parse the variable-definition sheet.
///
/// Requires columns {VariableName, Description, DataType, Levels}; the
/// levels-string of a categorical row is a semicolon-separated list of
/// `code:label` pairs split on the first colon.
pub fn parse_variable_sheet(sheet: &Sheet) -> Result<ParsedVariables> {
    let name_col = require_column(sheet, VARIABLE_NAME_COLUMN)?;
    let description_col = require_column(sheet, DESCRIPTION_COLUMN)?;
    let data_type_col = require_column(sheet, DATA_TYPE_COLUMN)?;
    let levels_col = sheet.column_index(LEVELS_COLUMN);

    let mut variables = Vec::new();
    let mut issues = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();

    for row in 0..sheet.rows.len() {
        let raw_name = sheet.value(row, name_col);
        if is_blank(raw_name) {
            continue;
        }
        let name = raw_name.trim().to_lowercase();
        if !seen.insert(name.clone()) {
            issues.push(
                Issue::new(
                    IssueKind::DuplicateVariableName,
                    format!("variable {name:?} is defined more than once"),
                )
                .with_source(sheet.name.clone())
                .with_item(name),
            );
            continue;
        }

        let data_type: DataType = sheet
            .value(row, data_type_col)
            .parse()
            .map_err(|_| IngestError::InvalidDataType {
                sheet: sheet.name.clone(),
                variable: name.clone(),
                value: sheet.value(row, data_type_col).to_string(),
            })?;

        let levels_raw = levels_col.map(|col| sheet.value(row, col)).unwrap_or("");
        let levels = if data_type == DataType::Categorical {
            match parse_levels_string(levels_raw) {
                Ok(levels) => Some(levels),
                Err(error) => {
                    issues.push(error.into_issue(&sheet.name, &name));
                    continue;
                }
            }
        } else {
            // Levels text on non-categorical rows carries no meaning.
            None
        };

        variables.push(VariableDefinition {
            name,
            description: sheet.value(row, description_col).trim().to_string(),
            data_type,
            levels,
        });
    }

    debug!(
        sheet = %sheet.name,
        variable_count = variables.len(),
        issue_count = issues.len(),
        "variable sheet parsed"
    );
    Ok(ParsedVariables { variables, issues })
}

/// Failure modes of a categorical levels-string.
#[derive(Debug, PartialEq, Eq)]
pub enum LevelsStringError {
    /// Empty string, a pair without a colon, or a non-integer code.
    Malformed { pair: String },
    DuplicateCode { code: i64 },
}

impl LevelsStringError {
    fn into_issue(self, sheet: &str, variable: &str) -> Issue {
        let issue = match self {
            LevelsStringError::Malformed { pair } => Issue::new(
                IssueKind::MalformedLevels,
                format!("variable {variable:?} has a malformed level pair {pair:?}"),
            ),
            LevelsStringError::DuplicateCode { code } => Issue::new(
                IssueKind::DuplicateLevelCode,
                format!("variable {variable:?} defines level code {code} more than once"),
            ),
        };
        issue.with_source(sheet.to_string()).with_item(variable.to_string())
    }
}

/// Parse a `code:label;code:label;...` levels-string into ordered levels.
///
/// Splitting is on the first colon of each pair, so labels may themselves
/// contain colons. A categorical definition without any pair is malformed:
/// absence is an error, never a guess.
pub fn parse_levels_string(raw: &str) -> std::result::Result<Levels, LevelsStringError> {
    let mut levels = Levels::new();
    for pair in raw.split(';') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((code, label)) = pair.split_once(':') else {
            return Err(LevelsStringError::Malformed {
                pair: pair.to_string(),
            });
        };
        let code: i64 = code
            .trim()
            .parse()
            .map_err(|_| LevelsStringError::Malformed {
                pair: pair.to_string(),
            })?;
        if !levels.insert(code, label.trim().to_string()) {
            return Err(LevelsStringError::DuplicateCode { code });
        }
    }
    if levels.is_empty() {
        return Err(LevelsStringError::Malformed {
            pair: raw.trim().to_string(),
        });
    }
    Ok(levels)
}

/// Parse the dataset-metadata sheet: first column keys, second column
/// values, in row order.
pub fn parse_dataset_metadata_sheet(sheet: &Sheet) -> Vec<(String, String)> {
    let mut metadata = Vec::new();
    for row in 0..sheet.rows.len() {
        let key = sheet.value(row, 0).trim();
        if key.is_empty() {
            continue;
        }
        let value = sheet.value(row, 1).trim();
        metadata.push((key.to_string(), value.to_string()));
    }
    metadata
}

fn require_column(sheet: &Sheet, column: &str) -> Result<usize> {
    sheet
        .column_index(column)
        .ok_or_else(|| IngestError::MissingColumn {
            sheet: sheet.name.clone(),
            column: column.to_string(),
        })
}
