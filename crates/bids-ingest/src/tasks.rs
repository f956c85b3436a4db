//! Task definition parsing: items sheet, task-description sheet and
//! non-Likert sheet into a typed [`TaskDefinition`].

use std::collections::BTreeSet;

use tracing::debug;

use bids_model::{Issue, IssueKind, ItemDefinition, Sheet, TaskDefinition, TaskName};

use crate::discovery::TaskSource;
use crate::error::{IngestError, Result};
use crate::levels::{level_columns, resolve_item_levels};

pub const ITEM_NAME_COLUMN: &str = "itemname";
pub const ITEM_DESCRIPTION_COLUMN: &str = "itemdescription";
pub const LIKERT_SCALE_COLUMN: &str = "likert_scale";
pub const KEY_NAME_COLUMN: &str = "key name";
pub const KEY_DESCRIPTION_COLUMN: &str = "description";

const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug)]
pub struct ParsedTask {
    pub task: TaskDefinition,
    pub issues: Vec<Issue>,
}

/// Parse one task definition source into a [`TaskDefinition`].
///
/// Missing sheets yield an empty section; the cross-reference validator
/// reports short sources, so parsing stays total over whatever was found.
pub fn parse_task_source(source: &TaskSource) -> Result<ParsedTask> {
    let name = TaskName::new(source.name.as_str()).map_err(|_| IngestError::InvalidTaskName {
        name: source.name.clone(),
    })?;

    let mut issues = Vec::new();
    let items = match &source.items {
        Some(sheet) => parse_item_sheet(sheet, &mut issues)?,
        None => Vec::new(),
    };
    let metadata = match &source.meta {
        Some(sheet) => parse_key_value_sheet(sheet)?,
        None => Vec::new(),
    };
    let extra_fields = match &source.non_likert {
        Some(sheet) => parse_key_value_sheet(sheet)?,
        None => Vec::new(),
    };

    debug!(
        task = %name,
        item_count = items.len(),
        issue_count = issues.len(),
        "task source parsed"
    );
    Ok(ParsedTask {
        task: TaskDefinition {
            name,
            items,
            metadata,
            extra_fields,
        },
        issues,
    })
}

fn parse_item_sheet(sheet: &Sheet, issues: &mut Vec<Issue>) -> Result<Vec<ItemDefinition>> {
    let name_col = sheet
        .column_index(ITEM_NAME_COLUMN)
        .ok_or_else(|| IngestError::MissingColumn {
            sheet: sheet.name.clone(),
            column: ITEM_NAME_COLUMN.to_string(),
        })?;
    let description_col = sheet.column_index(ITEM_DESCRIPTION_COLUMN);
    let likert_col = sheet.column_index(LIKERT_SCALE_COLUMN);
    let columns = level_columns(sheet);

    let mut items = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for row in 0..sheet.rows.len() {
        let raw_name = sheet.value(row, name_col).trim();
        if !is_item_row(raw_name) {
            continue;
        }
        let name = normalize_item_name(raw_name);
        if !seen.insert(name.to_ascii_uppercase()) {
            issues.push(
                Issue::new(
                    IssueKind::DuplicateVariableName,
                    format!("item {name:?} is defined more than once in this task"),
                )
                .with_source(sheet.name.clone())
                .with_item(name),
            );
            continue;
        }

        let description = description_col
            .map(|col| sheet.value(row, col).trim())
            .filter(|text| !text.is_empty())
            .unwrap_or(NO_DESCRIPTION)
            .to_string();
        let likert_scale = likert_col
            .map(|col| parse_likert_scale(sheet.value(row, col)))
            .unwrap_or(0);

        let resolved = resolve_item_levels(sheet, row, &columns, &name, likert_scale);
        issues.extend(resolved.issues);
        items.push(ItemDefinition {
            name,
            description,
            likert_scale,
            levels: resolved.levels,
            units: resolved.units,
        });
    }
    Ok(items)
}

/// Rows that do not define an item: blank names, header echoes from merged
/// exports, and the instructional example rows some sheets carry.
fn is_item_row(raw_name: &str) -> bool {
    if raw_name.is_empty() {
        return false;
    }
    let lowered = raw_name.to_ascii_lowercase();
    !lowered.starts_with(ITEM_NAME_COLUMN) && !lowered.contains("example")
}

/// The declared scale arrives as free text, sometimes with a float
/// spelling (`"4.0"`). Anything that does not parse to a whole number
/// counts as non-Likert.
fn parse_likert_scale(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0;
    }
    if let Ok(value) = trimmed.parse::<u32>() {
        return value;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) => {
            value as u32
        }
        _ => 0,
    }
}

/// Uppercase the alphabetic prefix of names that end in digits, dropping a
/// single separator (`ads-1` -> `ADS1`). Names of any other shape are kept
/// as spelled. Response-table headers go through the same normalization so
/// the two sides meet on equal terms.
pub fn normalize_item_name(name: &str) -> String {
    let trimmed = name.trim();
    let digit_start = trimmed.find(|ch: char| ch.is_ascii_digit());
    let Some(digit_start) = digit_start else {
        return trimmed.to_string();
    };
    let (head, digits) = trimmed.split_at(digit_start);
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return trimmed.to_string();
    }
    let head = head.strip_suffix([' ', '-', '_']).unwrap_or(head);
    if head.is_empty() || !head.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return trimmed.to_string();
    }
    format!("{}{digits}", head.to_ascii_uppercase())
}

fn parse_key_value_sheet(sheet: &Sheet) -> Result<Vec<(String, String)>> {
    let key_col = sheet
        .column_index(KEY_NAME_COLUMN)
        .ok_or_else(|| IngestError::MissingColumn {
            sheet: sheet.name.clone(),
            column: KEY_NAME_COLUMN.to_string(),
        })?;
    let value_col = sheet
        .column_index(KEY_DESCRIPTION_COLUMN)
        .ok_or_else(|| IngestError::MissingColumn {
            sheet: sheet.name.clone(),
            column: KEY_DESCRIPTION_COLUMN.to_string(),
        })?;

    let mut entries = Vec::new();
    for row in 0..sheet.rows.len() {
        let key = sheet.value(row, key_col).trim();
        let value = sheet.value(row, value_col).trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        if key.to_ascii_lowercase().starts_with(KEY_NAME_COLUMN) {
            continue;
        }
        entries.push((key.to_string(), value.to_string()));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items_sheet(rows: &[&[&str]]) -> Sheet {
        let mut sheet = Sheet::new(
            "quest_items",
            [
                "itemname",
                "itemdescription",
                "likert_scale",
                "levels",
                "leveldescription",
                "levels1",
                "leveldescription1",
            ]
            .iter()
            .map(|header| (*header).to_string())
            .collect(),
        );
        for row in rows {
            sheet.push_row(row.iter().map(|cell| (*cell).to_string()).collect());
        }
        sheet
    }

    fn key_value_sheet(name: &str, rows: &[(&str, &str)]) -> Sheet {
        let mut sheet = Sheet::new(
            name,
            vec!["key name".to_string(), "description".to_string()],
        );
        for (key, value) in rows {
            sheet.push_row(vec![(*key).to_string(), (*value).to_string()]);
        }
        sheet
    }

    fn source(items: Sheet) -> TaskSource {
        TaskSource {
            name: "quest".to_string(),
            items: Some(items),
            meta: Some(key_value_sheet(
                "quest_meta",
                &[("TaskName", "quest"), ("Instructions", "Answer honestly")],
            )),
            non_likert: Some(key_value_sheet("quest_nonlikert", &[("rt", "Reaction time")])),
        }
    }

    #[test]
    fn parses_items_with_levels() {
        let sheet = items_sheet(&[
            &["quest_1", "First question", "2", "0", "no", "1", "yes"],
            &["rt", "Reaction time", "0", "", "ms", "", ""],
        ]);
        let parsed = parse_task_source(&source(sheet)).unwrap();
        assert!(parsed.issues.is_empty());
        let task = parsed.task;
        assert_eq!(task.name.as_str(), "quest");
        assert_eq!(task.items.len(), 2);
        assert_eq!(task.items[0].name, "QUEST1");
        assert_eq!(task.items[0].levels.label(1), Some("yes"));
        assert_eq!(task.items[1].units.as_deref(), Some("ms"));
        assert_eq!(task.metadata.len(), 2);
        assert_eq!(task.extra_fields[0].0, "rt");
    }

    #[test]
    fn skips_header_echo_and_example_rows() {
        let sheet = items_sheet(&[
            &["itemname", "itemdescription", "", "", "", "", ""],
            &["q_example", "An example item", "0", "", "", "", ""],
            &["q1", "Real item", "0", "", "", "", ""],
        ]);
        let parsed = parse_task_source(&source(sheet)).unwrap();
        assert_eq!(parsed.task.items.len(), 1);
        assert_eq!(parsed.task.items[0].name, "Q1");
    }

    #[test]
    fn duplicate_items_are_reported_once() {
        let sheet = items_sheet(&[
            &["q1", "First", "0", "", "", "", ""],
            &["Q-1", "Same after normalization", "0", "", "", "", ""],
        ]);
        let parsed = parse_task_source(&source(sheet)).unwrap();
        assert_eq!(parsed.task.items.len(), 1);
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.issues[0].kind, IssueKind::DuplicateVariableName);
    }

    #[test]
    fn missing_sheets_parse_to_empty_sections() {
        let parsed = parse_task_source(&TaskSource {
            name: "quest".to_string(),
            items: None,
            meta: None,
            non_likert: None,
        })
        .unwrap();
        assert!(parsed.task.items.is_empty());
        assert!(parsed.task.metadata.is_empty());
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn likert_scale_accepts_float_spellings() {
        assert_eq!(parse_likert_scale("4"), 4);
        assert_eq!(parse_likert_scale("4.0"), 4);
        assert_eq!(parse_likert_scale(""), 0);
        assert_eq!(parse_likert_scale("4.5"), 0);
        assert_eq!(parse_likert_scale("many"), 0);
    }

    #[test]
    fn item_name_normalization() {
        assert_eq!(normalize_item_name("ads1"), "ADS1");
        assert_eq!(normalize_item_name("ads_12"), "ADS12");
        assert_eq!(normalize_item_name("ads-3"), "ADS3");
        assert_eq!(normalize_item_name("Ads 4"), "ADS4");
        // No trailing digits, or digits in the middle: unchanged.
        assert_eq!(normalize_item_name("total_score"), "total_score");
        assert_eq!(normalize_item_name("a1b"), "a1b");
    }
}
