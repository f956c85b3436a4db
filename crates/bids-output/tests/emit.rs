//! Integration tests for dataset emission.

use std::collections::BTreeMap;
use std::path::PathBuf;

use bids_model::{
    ConvertOptions, DataType, Dataset, ItemDefinition, Levels, ResponseRecord, SessionId,
    SubjectId, TaskDefinition, TaskName, VariableDefinition,
};
use bids_output::{NormalizedTask, emit_dataset};
use bids_transform::{DemographicsRow, NormalizedValue, TaskRow};

fn levels(pairs: &[(i64, &str)]) -> Levels {
    let mut levels = Levels::new();
    for (code, label) in pairs {
        levels.insert(*code, (*label).to_string());
    }
    levels
}

fn dataset() -> Dataset {
    let subject = SubjectId::new("001").unwrap();
    let mut values = BTreeMap::new();
    values.insert("TESTQUEST01".to_string(), "2".to_string());
    Dataset {
        study_name: "demo".to_string(),
        variables: vec![
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
            VariableDefinition {
                name: "sex".to_string(),
                description: "Biological sex".to_string(),
                data_type: DataType::Categorical,
                levels: Some(levels(&[(0, "female"), (1, "male")])),
            },
        ],
        tasks: vec![
            TaskDefinition {
                name: TaskName::new("testquest").unwrap(),
                items: vec![ItemDefinition {
                    name: "TESTQUEST01".to_string(),
                    description: "How often do you rest?".to_string(),
                    likert_scale: 4,
                    levels: levels(&[
                        (0, "Rarely"),
                        (1, "Some"),
                        (2, "Occasionally"),
                        (3, "Often"),
                    ]),
                    units: None,
                }],
                metadata: vec![("TaskName".to_string(), "Test Quest".to_string())],
                extra_fields: Vec::new(),
            },
            TaskDefinition {
                name: TaskName::new("uncollected").unwrap(),
                items: vec![ItemDefinition {
                    name: "UNC1".to_string(),
                    description: "Never collected".to_string(),
                    likert_scale: 0,
                    levels: Levels::new(),
                    units: None,
                }],
                metadata: Vec::new(),
                extra_fields: Vec::new(),
            },
        ],
        subjects: vec![subject.clone()],
        records: vec![ResponseRecord {
            subject,
            session: SessionId::new("1").unwrap(),
            values,
        }],
        metadata: vec![
            ("Name".to_string(), "Demo Study".to_string()),
            ("BIDSVersion".to_string(), "1.8.0".to_string()),
            ("DatasetType".to_string(), "raw".to_string()),
        ],
    }
}

fn demographics_rows() -> Vec<DemographicsRow> {
    vec![DemographicsRow {
        subject: SubjectId::new("001").unwrap(),
        values: vec![NormalizedValue::Integer(34), NormalizedValue::Integer(0)],
    }]
}

fn task_rows() -> Vec<TaskRow> {
    vec![TaskRow {
        subject: SubjectId::new("001").unwrap(),
        session: SessionId::new("1").unwrap(),
        values: vec![NormalizedValue::Integer(2)],
    }]
}

#[test]
fn emits_the_full_artifact_set() {
    let dataset = dataset();
    let rows = task_rows();
    let tasks = vec![
        NormalizedTask {
            task: &dataset.tasks[0],
            rows: &rows,
        },
        NormalizedTask {
            task: &dataset.tasks[1],
            rows: &[],
        },
    ];
    let result = emit_dataset(&dataset, &demographics_rows(), &tasks, &ConvertOptions::default());
    assert!(result.issues.is_empty());

    let paths: Vec<PathBuf> = result
        .artifacts
        .iter()
        .map(|artifact| artifact.path.clone())
        .collect();
    assert_eq!(
        paths,
        vec![
            PathBuf::from("dataset_description.json"),
            PathBuf::from("participants.json"),
            PathBuf::from("participants.tsv"),
            PathBuf::from("task-testquest_beh.json"),
            PathBuf::from("sub-001/ses-01/beh/sub-001_ses-01_task-testquest_beh.tsv"),
        ]
    );
    // The uncollected task emits neither a table nor a sidecar.
    assert!(!paths.iter().any(|path| path.to_string_lossy().contains("uncollected")));
}

#[test]
fn participants_artifacts_follow_definition_order() {
    let dataset = dataset();
    let result = emit_dataset(
        &dataset,
        &demographics_rows(),
        &[],
        &ConvertOptions::default(),
    );
    let tsv = result
        .artifacts
        .iter()
        .find(|artifact| artifact.path.ends_with("participants.tsv"))
        .unwrap()
        .render();
    assert_eq!(tsv, "participant_id\tage\tsex\nsub-001\t34\t0\n");

    let sidecar = result
        .artifacts
        .iter()
        .find(|artifact| artifact.path.ends_with("participants.json"))
        .unwrap()
        .render();
    // Keys in definition order, id replaced by the trailing participant_id.
    let age_pos = sidecar.find("\"age\"").unwrap();
    let sex_pos = sidecar.find("\"sex\"").unwrap();
    let pid_pos = sidecar.find("\"participant_id\"").unwrap();
    assert!(age_pos < sex_pos && sex_pos < pid_pos);
    assert!(sidecar.contains("\"Levels\""));
}

#[test]
fn task_sidecar_levels_annotate_responses() {
    let dataset = dataset();
    let rows = task_rows();
    let tasks = vec![NormalizedTask {
        task: &dataset.tasks[0],
        rows: &rows,
    }];
    let result = emit_dataset(&dataset, &demographics_rows(), &tasks, &ConvertOptions::default());
    let sidecar = result
        .artifacts
        .iter()
        .find(|artifact| artifact.path.ends_with("task-testquest_beh.json"))
        .unwrap()
        .render();
    assert!(sidecar.contains("\"2\": \"Occasionally\""));
    let table = result
        .artifacts
        .iter()
        .find(|artifact| artifact.path.extension().is_some_and(|ext| ext == "tsv")
            && artifact.path.to_string_lossy().contains("task-testquest"))
        .unwrap()
        .render();
    assert_eq!(table, "TESTQUEST01\n2\n");
}

#[test]
fn emission_is_deterministic() {
    let dataset = dataset();
    let rows = task_rows();
    let demographics = demographics_rows();
    let render_all = || {
        let tasks = vec![NormalizedTask {
            task: &dataset.tasks[0],
            rows: &rows,
        }];
        emit_dataset(&dataset, &demographics, &tasks, &ConvertOptions::default())
            .artifacts
            .iter()
            .map(|artifact| (artifact.path.clone(), artifact.render()))
            .collect::<Vec<_>>()
    };
    assert_eq!(render_all(), render_all());
}
