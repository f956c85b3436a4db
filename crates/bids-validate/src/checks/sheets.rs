//! Task definition source completeness.

use bids_ingest::TaskSource;
use bids_model::{Issue, IssueKind};

/// Every task source must supply at least the configured minimum number of
/// sheets (items, task metadata, non-Likert fields).
pub fn check_task_sheets(sources: &[TaskSource], min_required: usize) -> Vec<Issue> {
    let mut issues = Vec::new();
    for source in sources {
        let count = source.sheet_count();
        if count < min_required {
            let mut missing = Vec::new();
            if source.items.is_none() {
                missing.push("items");
            }
            if source.meta.is_none() {
                missing.push("task metadata");
            }
            if source.non_likert.is_none() {
                missing.push("non-likert");
            }
            issues.push(
                Issue::new(
                    IssueKind::MissingSheet,
                    format!(
                        "task {:?} supplies {count} of {min_required} required sheets (missing: {})",
                        source.name,
                        missing.join(", ")
                    ),
                )
                .with_source(source.name.clone()),
            );
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use bids_model::Sheet;

    use super::*;

    fn sheet(name: &str) -> Sheet {
        Sheet::new(name, vec!["a".to_string()])
    }

    #[test]
    fn complete_source_passes() {
        let source = TaskSource {
            name: "ads".to_string(),
            items: Some(sheet("ads_items")),
            meta: Some(sheet("ads_meta")),
            non_likert: Some(sheet("ads_nonlikert")),
        };
        assert!(check_task_sheets(&[source], 3).is_empty());
    }

    #[test]
    fn short_source_names_the_task_and_missing_sheets() {
        let source = TaskSource {
            name: "ads".to_string(),
            items: Some(sheet("ads_items")),
            meta: None,
            non_likert: None,
        };
        let issues = check_task_sheets(&[source], 3);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingSheet);
        assert!(issues[0].message.contains("ads"));
        assert!(issues[0].message.contains("task metadata"));
        assert!(issues[0].message.contains("non-likert"));
    }
}
