//! Demographics subject-identifier checks.

use std::collections::BTreeSet;

use bids_model::{Issue, IssueKind, Sheet, SubjectId, is_blank};

pub const ID_COLUMN: &str = "id";

/// The leading subject-identifier column must be present and every value
/// non-empty and unique. Duplicates are detected on normalized ids so two
/// spellings of the same subject collide; the first occurrence wins.
pub fn check_subjects(demographics: &Sheet) -> Vec<Issue> {
    let mut issues = Vec::new();
    if demographics.headers.is_empty() {
        issues.push(
            Issue::new(
                IssueKind::MissingSubjectId,
                "demographics table has no columns",
            )
            .with_source(demographics.name.clone()),
        );
        return issues;
    }
    let id_col = demographics.column_index(ID_COLUMN).unwrap_or(0);

    let mut seen: BTreeSet<String> = BTreeSet::new();
    for row in 0..demographics.rows.len() {
        let raw = demographics.value(row, id_col);
        if is_blank(raw) {
            issues.push(
                Issue::new(
                    IssueKind::MissingSubjectId,
                    format!("demographics row {} has no subject id", row + 1),
                )
                .with_source(demographics.name.clone()),
            );
            continue;
        }
        let Ok(subject) = SubjectId::new(raw) else {
            issues.push(
                Issue::new(
                    IssueKind::MissingSubjectId,
                    format!(
                        "demographics row {} has an unusable subject id {raw:?}",
                        row + 1
                    ),
                )
                .with_source(demographics.name.clone()),
            );
            continue;
        };
        if !seen.insert(subject.as_str().to_string()) {
            issues.push(
                Issue::new(
                    IssueKind::DuplicateSubjectId,
                    format!("subject id {subject} appears more than once"),
                )
                .with_source(demographics.name.clone())
                .with_subject(subject.to_string()),
            );
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demographics(ids: &[&str]) -> Sheet {
        let mut sheet = Sheet::new("demographics", vec!["id".to_string(), "age".to_string()]);
        for id in ids {
            sheet.push_row(vec![(*id).to_string(), "30".to_string()]);
        }
        sheet
    }

    #[test]
    fn unique_ids_pass() {
        assert!(check_subjects(&demographics(&["001", "002"])).is_empty());
    }

    #[test]
    fn duplicate_ids_are_reported() {
        let issues = check_subjects(&demographics(&["sub-001", "sub-001"]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::DuplicateSubjectId);
        assert_eq!(issues[0].subject.as_deref(), Some("sub-001"));
    }

    #[test]
    fn duplicates_collide_after_normalization() {
        // "001" and "sub-001" are the same subject once normalized.
        let issues = check_subjects(&demographics(&["001", "sub-001"]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::DuplicateSubjectId);
    }

    #[test]
    fn blank_ids_are_reported_per_row() {
        let issues = check_subjects(&demographics(&["001", "", ""]));
        assert_eq!(issues.len(), 2);
        assert!(issues
            .iter()
            .all(|issue| issue.kind == IssueKind::MissingSubjectId));
    }
}
