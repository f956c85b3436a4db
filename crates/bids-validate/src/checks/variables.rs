//! Variable-definition to demographics-column matching.

use tracing::debug;

use bids_model::{CaseInsensitiveSet, Issue, IssueKind, Sheet, VariableDefinition};

/// A definition without a matching demographics column is a warning; the
/// column is synthesized as all-missing downstream. Demographics columns
/// without a definition are tolerated and pass through with a generic
/// description.
pub fn check_variable_columns(
    variables: &[VariableDefinition],
    demographics: &Sheet,
) -> Vec<Issue> {
    let columns = CaseInsensitiveSet::new(demographics.headers.iter());
    let mut issues = Vec::new();
    for variable in variables {
        if !columns.contains(&variable.name) {
            issues.push(
                Issue::new(
                    IssueKind::MissingVariableColumn,
                    format!(
                        "variable {:?} has no matching demographics column",
                        variable.name
                    ),
                )
                .with_source(demographics.name.clone())
                .with_item(variable.name.clone()),
            );
        }
    }

    let defined = CaseInsensitiveSet::new(variables.iter().map(|variable| variable.name.as_str()));
    for header in &demographics.headers {
        if !defined.contains(header) {
            debug!(column = %header, "demographics column has no definition; passed through");
        }
    }
    issues
}
