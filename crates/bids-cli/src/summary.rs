use std::cmp::Ordering;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use bids_model::{Issue, IssueSeverity};

use crate::bids_validator::ValidatorOutcome;
use crate::types::ConvertResult;

pub fn print_summary(result: &ConvertResult) {
    println!("Study: {}", result.study_name);
    println!("Output: {}", result.output_dir.display());
    if let Some(path) = &result.report_path {
        println!("Validation report: {}", path.display());
    }
    if result.dry_run {
        println!("Dry run: no files written");
    } else if !result.emitted {
        println!("No output emitted: validation errors must be fixed first");
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Task"),
        header_cell("Items"),
        header_cell("Rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    let mut total_rows = 0usize;
    for task in &result.tasks {
        total_rows += task.row_count;
        table.add_row(vec![
            Cell::new(&task.name)
                .fg(comfy_table::Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(task.item_count),
            Cell::new(task.row_count),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(comfy_table::Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    print_issue_table(&result.report.issues);

    match &result.validator {
        Some(ValidatorOutcome::Passed) => println!("BIDS validator: passed"),
        Some(ValidatorOutcome::Failed { detail }) => {
            println!("BIDS validator: FAILED");
            eprintln!("{detail}");
        }
        Some(ValidatorOutcome::Unavailable { reason }) => {
            println!("BIDS validator: skipped ({reason})");
        }
        None => {}
    }
}

fn print_issue_table(issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }
    let mut ordered: Vec<&Issue> = issues.iter().collect();
    ordered.sort_by(|a, b| {
        let severity = severity_rank(b.severity()).cmp(&severity_rank(a.severity()));
        if severity != Ordering::Equal {
            return severity;
        }
        let kind = a.kind.as_str().cmp(b.kind.as_str());
        if kind != Ordering::Equal {
            return kind;
        }
        a.source.cmp(&b.source)
    });

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Kind"),
        header_cell("Source"),
        header_cell("Subject"),
        header_cell("Item"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for issue in ordered {
        table.add_row(vec![
            severity_cell(issue.severity()),
            Cell::new(issue.kind.as_str()),
            optional_cell(issue.source.as_deref()),
            optional_cell(issue.subject.as_deref()),
            optional_cell(issue.item.as_deref()),
            Cell::new(&issue.message),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: IssueSeverity) -> Cell {
    match severity {
        IssueSeverity::Error => Cell::new("ERROR").fg(comfy_table::Color::Red),
        IssueSeverity::Warning => Cell::new("WARN").fg(comfy_table::Color::Yellow),
    }
}

fn severity_rank(severity: IssueSeverity) -> u8 {
    match severity {
        IssueSeverity::Error => 2,
        IssueSeverity::Warning => 1,
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(comfy_table::Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(comfy_table::Color::DarkGrey)
}
