//! Sidecar and dataset-level JSON documents.

use regex::Regex;
use serde_json::{Map, Value, json};

use bids_model::{Issue, IssueKind, TaskDefinition, VariableDefinition};

pub const DEFAULT_BIDS_VERSION: &str = "1.8.0";
const ANONYMIZED_PREFIX: &str = "Question";

/// Subject-level metadata document: one entry per variable definition in
/// definition order, with a Levels sub-object for categorical variables.
/// The raw `id` column is replaced by a fixed `participant_id` entry.
pub fn participants_sidecar(variables: &[VariableDefinition]) -> Value {
    let mut document = Map::new();
    for variable in variables {
        if variable.name.eq_ignore_ascii_case("id") {
            continue;
        }
        let mut entry = Map::new();
        entry.insert(
            "Description".to_string(),
            Value::String(variable.description.clone()),
        );
        if let Some(levels) = &variable.levels {
            entry.insert(
                "Levels".to_string(),
                serde_json::to_value(levels).expect("levels serialize"),
            );
        }
        document.insert(variable.name.clone(), Value::Object(entry));
    }
    document.insert(
        "participant_id".to_string(),
        json!({
            "Description": "Unique participant identifier",
            "LongName": "Participant ID",
        }),
    );
    Value::Object(document)
}

/// Task sidecar: one entry per item, non-Likert sheet entries merged as
/// description-only entries, task metadata as document-level fields.
///
/// With anonymization on, item descriptions become `Question N` while item
/// names and levels are preserved.
pub fn task_sidecar(task: &TaskDefinition, anonymize: bool) -> Value {
    let mut document = Map::new();
    for (index, item) in task.items.iter().enumerate() {
        let description = if anonymize {
            format!("{ANONYMIZED_PREFIX} {}", index + 1)
        } else {
            item.description.clone()
        };
        let mut entry = Map::new();
        entry.insert("Description".to_string(), Value::String(description));
        if item.is_likert() {
            entry.insert(
                "Levels".to_string(),
                serde_json::to_value(&item.levels).expect("levels serialize"),
            );
        } else if let Some(units) = &item.units {
            entry.insert("Units".to_string(), Value::String(units.clone()));
        }
        document.insert(item.name.clone(), Value::Object(entry));
    }

    for (key, value) in &task.extra_fields {
        document.insert(
            key.clone(),
            json!({ "Description": value }),
        );
    }

    for (key, value) in &task.metadata {
        if key.eq_ignore_ascii_case("taskname") {
            // The sanitized identifier, so the field matches the file names.
            document.insert(
                "TaskName".to_string(),
                Value::String(task.name.as_str().to_string()),
            );
            continue;
        }
        document.insert(key.clone(), Value::String(value.clone()));
    }
    Value::Object(document)
}

/// Build `dataset_description.json` from the dataset metadata pairs.
///
/// Array-valued standard fields are split from their delimited spellings,
/// the common `Licence` typo folds into `License`, and the required
/// fields are defaulted (with a warning) when absent or invalid.
pub fn dataset_description(
    metadata: &[(String, String)],
    study_name: &str,
) -> (Value, Vec<Issue>) {
    let mut document = Map::new();
    let mut issues = Vec::new();

    for (key, value) in metadata {
        let key = key.trim();
        let value = value.trim();
        match key.to_ascii_lowercase().as_str() {
            "authors" => {
                document.insert("Authors".to_string(), split_array_field(value));
            }
            "referencesandlinks" | "referencesandlink" => {
                document.insert("ReferencesAndLinks".to_string(), split_array_field(value));
            }
            "fundingsources" | "funding" => {
                document.insert("Funding".to_string(), split_array_field(value));
            }
            "license" | "licence" => {
                document.insert("License".to_string(), Value::String(value.to_string()));
            }
            _ => {
                document.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
    }

    let name_missing = document
        .get("Name")
        .and_then(Value::as_str)
        .map(str::is_empty)
        .unwrap_or(true);
    if name_missing {
        issues.push(default_issue("Name", study_name));
        document.insert("Name".to_string(), Value::String(study_name.to_string()));
    }

    let version_pattern = Regex::new(r"^\d+\.\d+\.\d+$").expect("static pattern");
    let version_valid = document
        .get("BIDSVersion")
        .and_then(Value::as_str)
        .map(|version| version_pattern.is_match(version))
        .unwrap_or(false);
    if !version_valid {
        issues.push(default_issue("BIDSVersion", DEFAULT_BIDS_VERSION));
        document.insert(
            "BIDSVersion".to_string(),
            Value::String(DEFAULT_BIDS_VERSION.to_string()),
        );
    }

    let type_valid = document
        .get("DatasetType")
        .and_then(Value::as_str)
        .map(|dataset_type| matches!(dataset_type, "raw" | "derivative"))
        .unwrap_or(false);
    if !type_valid {
        issues.push(default_issue("DatasetType", "raw"));
        document.insert("DatasetType".to_string(), Value::String("raw".to_string()));
    }

    (Value::Object(document), issues)
}

fn default_issue(field: &str, value: &str) -> Issue {
    Issue::new(
        IssueKind::DatasetDescriptionDefault,
        format!("dataset description field {field:?} missing or invalid; using {value:?}"),
    )
    .with_source("dataset_description".to_string())
    .with_item(field.to_string())
}

/// Split a delimited field into an array: semicolons preferred, commas as
/// the fallback, a single entry otherwise. Empty entries are dropped.
fn split_array_field(value: &str) -> Value {
    let delimiter = if value.contains(';') {
        ';'
    } else {
        ','
    };
    let entries: Vec<Value> = value
        .split(delimiter)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| Value::String(entry.to_string()))
        .collect();
    Value::Array(entries)
}

/// Render a document with 4-space indentation and a trailing newline.
pub fn render_json(value: &Value) -> String {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    serde::Serialize::serialize(value, &mut serializer).expect("json serialize");
    let mut rendered = String::from_utf8(buffer).expect("json is utf-8");
    rendered.push('\n');
    rendered
}
