use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Warning,
    Error,
}

/// The fixed taxonomy of problems a conversion run can report.
///
/// Every kind has an intrinsic severity; the validator never raises on
/// first occurrence, it collects the complete set for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    MalformedLevels,
    DuplicateLevelCode,
    DuplicateVariableName,
    UnmatchedLevelPair,
    LevelCountMismatch,
    MissingSheet,
    UnknownItemReference,
    DuplicateSubjectId,
    MissingSubjectId,
    TypeCoercion,
    UnknownLevelCode,
    /// Declared item never appears as a response-table column.
    MissingResponseColumn,
    /// Declared variable has no matching demographics column.
    MissingVariableColumn,
    /// A required dataset-description field was defaulted.
    DatasetDescriptionDefault,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MalformedLevels => "MalformedLevels",
            IssueKind::DuplicateLevelCode => "DuplicateLevelCode",
            IssueKind::DuplicateVariableName => "DuplicateVariableName",
            IssueKind::UnmatchedLevelPair => "UnmatchedLevelPair",
            IssueKind::LevelCountMismatch => "LevelCountMismatch",
            IssueKind::MissingSheet => "MissingSheet",
            IssueKind::UnknownItemReference => "UnknownItemReference",
            IssueKind::DuplicateSubjectId => "DuplicateSubjectId",
            IssueKind::MissingSubjectId => "MissingSubjectId",
            IssueKind::TypeCoercion => "TypeCoercion",
            IssueKind::UnknownLevelCode => "UnknownLevelCode",
            IssueKind::MissingResponseColumn => "MissingResponseColumn",
            IssueKind::MissingVariableColumn => "MissingVariableColumn",
            IssueKind::DatasetDescriptionDefault => "DatasetDescriptionDefault",
        }
    }

    pub fn severity(&self) -> IssueSeverity {
        match self {
            IssueKind::MissingResponseColumn
            | IssueKind::MissingVariableColumn
            | IssueKind::DatasetDescriptionDefault => IssueSeverity::Warning,
            _ => IssueSeverity::Error,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single problem found while parsing, validating or normalizing.
#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
    /// Sheet, task or table the issue belongs to.
    pub source: Option<String>,
    pub subject: Option<String>,
    pub item: Option<String>,
}

impl Issue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            subject: None,
            item: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[must_use]
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item = Some(item.into());
        self
    }

    pub fn severity(&self) -> IssueSeverity {
        self.kind.severity()
    }
}

/// Every issue found in one run, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = Issue>) {
        self.issues.extend(issues);
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == IssueSeverity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == IssueSeverity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == IssueSeverity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_by_severity() {
        let mut report = ValidationReport::new();
        report.push(Issue::new(IssueKind::UnknownItemReference, "testquest99"));
        report.push(
            Issue::new(IssueKind::MissingResponseColumn, "item never collected")
                .with_item("ads12"),
        );
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert!(report.has_errors());
    }

    #[test]
    fn kind_severities() {
        assert_eq!(
            IssueKind::DuplicateSubjectId.severity(),
            IssueSeverity::Error
        );
        assert_eq!(
            IssueKind::MissingResponseColumn.severity(),
            IssueSeverity::Warning
        );
    }
}
