//! Integration tests for the cross-reference validator.

use bids_ingest::TaskSource;
use bids_model::{
    ConvertOptions, DataType, IssueKind, ItemDefinition, Levels, Sheet, TaskDefinition, TaskName,
    ValidationReport, VariableDefinition,
};
use bids_validate::{ValidationInput, validate_dataset, write_validation_report_json};

fn demographics(ids: &[&str]) -> Sheet {
    let mut sheet = Sheet::new("demographics", vec!["id".to_string(), "age".to_string()]);
    for id in ids {
        sheet.push_row(vec![(*id).to_string(), "30".to_string()]);
    }
    sheet
}

fn variables() -> Vec<VariableDefinition> {
    vec![
        VariableDefinition {
            name: "id".to_string(),
            description: "Subject identifier".to_string(),
            data_type: DataType::String,
            levels: None,
        },
        VariableDefinition {
            name: "age".to_string(),
            description: "Age in years".to_string(),
            data_type: DataType::Integer,
            levels: None,
        },
    ]
}

fn likert_task(name: &str, items: &[&str]) -> TaskDefinition {
    let mut levels = Levels::new();
    levels.insert(0, "no");
    levels.insert(1, "yes");
    TaskDefinition {
        name: TaskName::new(name).unwrap(),
        items: items
            .iter()
            .map(|item| ItemDefinition {
                name: (*item).to_string(),
                description: format!("Item {item}"),
                likert_scale: 2,
                levels: levels.clone(),
                units: None,
            })
            .collect(),
        metadata: Vec::new(),
        extra_fields: Vec::new(),
    }
}

fn complete_source(name: &str) -> TaskSource {
    let sheet = |suffix: &str| Sheet::new(format!("{name}_{suffix}"), vec!["a".to_string()]);
    TaskSource {
        name: name.to_string(),
        items: Some(sheet("items")),
        meta: Some(sheet("meta")),
        non_likert: Some(sheet("nonlikert")),
    }
}

fn run(
    demographics: &Sheet,
    tasks: &[TaskDefinition],
    sources: &[TaskSource],
    tables: &[(String, Vec<String>)],
) -> ValidationReport {
    let variables = variables();
    let input = ValidationInput {
        demographics,
        variables: &variables,
        tasks,
        task_sources: sources,
        response_tables: tables,
    };
    validate_dataset(&input, &ConvertOptions::default())
}

#[test]
fn clean_study_validates_without_errors() {
    let tasks = vec![likert_task("ads", &["ADS1", "ADS2"])];
    let tables = vec![(
        "ses-01".to_string(),
        vec!["ADS1".to_string(), "ADS2".to_string()],
    )];
    let report = run(
        &demographics(&["001", "002"]),
        &tasks,
        &[complete_source("ads")],
        &tables,
    );
    assert!(!report.has_errors());
    assert_eq!(report.warning_count(), 0);
}

#[test]
fn unknown_item_reference_names_the_item() {
    let tasks = vec![likert_task("ads", &["ADS1"])];
    let tables = vec![(
        "ses-01".to_string(),
        vec!["ADS1".to_string(), "TESTQUEST99".to_string()],
    )];
    let report = run(
        &demographics(&["001"]),
        &tasks,
        &[complete_source("ads")],
        &tables,
    );
    assert!(report.has_errors());
    let issue = report
        .issues
        .iter()
        .find(|issue| issue.kind == IssueKind::UnknownItemReference)
        .expect("unknown item issue");
    assert_eq!(issue.item.as_deref(), Some("TESTQUEST99"));
}

#[test]
fn duplicate_subject_blocks_before_any_output() {
    let tasks = vec![likert_task("ads", &["ADS1"])];
    let tables = vec![("ses-01".to_string(), vec!["ADS1".to_string()])];
    let report = run(
        &demographics(&["sub-001", "sub-001"]),
        &tasks,
        &[complete_source("ads")],
        &tables,
    );
    assert!(report.has_errors());
    assert!(report
        .issues
        .iter()
        .any(|issue| issue.kind == IssueKind::DuplicateSubjectId));
}

#[test]
fn all_violations_are_collected_in_one_run() {
    let tasks = vec![likert_task("ads", &["ADS1", "ADS2"])];
    // Short task source, duplicate subject, unknown column, uncollected
    // item: one run reports all four.
    let short_source = TaskSource {
        name: "ads".to_string(),
        items: None,
        meta: None,
        non_likert: None,
    };
    let tables = vec![(
        "ses-01".to_string(),
        vec!["ADS1".to_string(), "OTHER9".to_string()],
    )];
    let report = run(
        &demographics(&["001", "001"]),
        &tasks,
        &[short_source],
        &tables,
    );
    let kinds: Vec<IssueKind> = report.issues.iter().map(|issue| issue.kind).collect();
    assert!(kinds.contains(&IssueKind::MissingSheet));
    assert!(kinds.contains(&IssueKind::DuplicateSubjectId));
    assert!(kinds.contains(&IssueKind::UnknownItemReference));
    assert!(kinds.contains(&IssueKind::MissingResponseColumn));
}

#[test]
fn report_json_is_written() {
    let dir = tempfile::TempDir::new().unwrap();
    let tasks = vec![likert_task("ads", &["ADS1"])];
    let tables = vec![("ses-01".to_string(), vec!["ADS1".to_string()])];
    let report = run(
        &demographics(&["001", "001"]),
        &tasks,
        &[complete_source("ads")],
        &tables,
    );
    let path = write_validation_report_json(dir.path(), "demo", &report).unwrap();
    let content = std::fs::read_to_string(path).unwrap();
    assert!(content.contains("bids-transpiler.validation-report"));
    assert!(content.contains("DuplicateSubjectId"));
}
