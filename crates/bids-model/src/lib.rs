pub mod definitions;
pub mod error;
pub mod ids;
pub mod issue;
pub mod lookup;
pub mod options;
pub mod sheet;

pub use definitions::{
    DataType, Dataset, ItemDefinition, Levels, ResponseRecord, TaskDefinition, VariableDefinition,
};
pub use error::{ModelError, Result};
pub use ids::{SessionId, SubjectId, TaskName};
pub use issue::{Issue, IssueKind, IssueSeverity, ValidationReport};
pub use lookup::CaseInsensitiveSet;
pub use options::ConvertOptions;
pub use sheet::{Sheet, is_blank};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_definition_invariant_holds_for_categorical() {
        let mut levels = Levels::new();
        levels.insert(0, "female");
        levels.insert(1, "male");
        let variable = VariableDefinition {
            name: "sex".to_string(),
            description: "Biological sex".to_string(),
            data_type: DataType::Categorical,
            levels: Some(levels),
        };
        assert!(variable.is_categorical());
        assert_eq!(
            variable.levels.as_ref().unwrap().label(1),
            Some("male")
        );
    }

    #[test]
    fn report_serializes() {
        let mut report = ValidationReport::new();
        report.push(
            Issue::new(IssueKind::TypeCoercion, "age: not a whole number")
                .with_subject("sub-001")
                .with_item("age"),
        );
        let json = serde_json::to_string(&report).expect("serialize report");
        assert!(json.contains("TypeCoercion"));
        assert!(json.contains("sub-001"));
    }
}
