//! Flat TSV table assembly.
//!
//! Tables are built as strings directly so emitted bytes are fully
//! determined by definition order and the rendered values.

use bids_model::{ConvertOptions, TaskDefinition, VariableDefinition};
use bids_transform::{DemographicsRow, TaskRow};

/// `participants.tsv`: `participant_id` first, then one column per
/// variable definition (minus the raw id column) in definition order.
pub fn participants_table(
    variables: &[VariableDefinition],
    rows: &[DemographicsRow],
    options: &ConvertOptions,
) -> String {
    let mut header: Vec<&str> = vec!["participant_id"];
    header.extend(
        variables
            .iter()
            .filter(|variable| !variable.name.eq_ignore_ascii_case("id"))
            .map(|variable| variable.name.as_str()),
    );

    let mut table = header.join("\t");
    table.push('\n');
    for row in rows {
        let mut cells: Vec<String> = vec![row.subject.as_str().to_string()];
        cells.extend(row.values.iter().map(|value| value.render(options)));
        table.push_str(&cells.join("\t"));
        table.push('\n');
    }
    table
}

/// One subject/session/task table: exactly the task's item columns in item
/// order, one data row.
pub fn task_table(task: &TaskDefinition, row: &TaskRow, options: &ConvertOptions) -> String {
    let header: Vec<&str> = task.items.iter().map(|item| item.name.as_str()).collect();
    let cells: Vec<String> = row.values.iter().map(|value| value.render(options)).collect();
    format!("{}\n{}\n", header.join("\t"), cells.join("\t"))
}
