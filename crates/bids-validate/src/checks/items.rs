//! Cross-references between response-table columns and task items.

use std::collections::BTreeSet;

use bids_model::{Issue, IssueKind, TaskDefinition};

/// Every response column must belong to exactly one task.
pub fn check_item_references(
    tasks: &[TaskDefinition],
    response_tables: &[(String, Vec<String>)],
) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (table, columns) in response_tables {
        for column in columns {
            let owners: Vec<&TaskDefinition> = tasks
                .iter()
                .filter(|task| task.has_item(column))
                .collect();
            match owners.len() {
                1 => {}
                0 => issues.push(
                    Issue::new(
                        IssueKind::UnknownItemReference,
                        format!("column {column:?} matches no declared task item"),
                    )
                    .with_source(table.clone())
                    .with_item(column.clone()),
                ),
                n => issues.push(
                    Issue::new(
                        IssueKind::UnknownItemReference,
                        format!("column {column:?} is declared by {n} tasks"),
                    )
                    .with_source(table.clone())
                    .with_item(column.clone()),
                ),
            }
        }
    }
    issues
}

/// A declared item that never appears as a response column is a warning:
/// the schema may define more items than are currently collected.
pub fn check_missing_response_columns(
    tasks: &[TaskDefinition],
    response_tables: &[(String, Vec<String>)],
) -> Vec<Issue> {
    let collected: BTreeSet<String> = response_tables
        .iter()
        .flat_map(|(_, columns)| columns.iter())
        .map(|column| column.to_ascii_uppercase())
        .collect();

    let mut issues = Vec::new();
    for task in tasks {
        for item in &task.items {
            if !collected.contains(&item.name.to_ascii_uppercase()) {
                issues.push(
                    Issue::new(
                        IssueKind::MissingResponseColumn,
                        format!(
                            "item {:?} of task {} appears in no response table",
                            item.name, task.name
                        ),
                    )
                    .with_source(task.name.as_str().to_string())
                    .with_item(item.name.clone()),
                );
            }
        }
    }
    issues
}
