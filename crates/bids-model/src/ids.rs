#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// A normalized BIDS subject identifier (`sub-<label>`).
///
/// Raw ids arrive in many spellings: bare numbers, `sub-` prefixed labels,
/// or labels with a doubled prefix. Normalization collapses repeated
/// `sub-` runs, zero-pads bare numeric ids to three digits, and prepends
/// the prefix when missing.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidSubjectId(value));
        }
        let collapsed = collapse_sub_prefix(trimmed);
        let normalized = if collapsed.starts_with("sub-") {
            collapsed
        } else if collapsed.chars().all(|ch| ch.is_ascii_digit()) {
            format!("sub-{collapsed:0>3}")
        } else {
            format!("sub-{collapsed}")
        };
        if normalized.len() <= "sub-".len() {
            return Err(ModelError::InvalidSubjectId(value));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The label portion after the `sub-` prefix.
    pub fn label(&self) -> &str {
        &self.0["sub-".len()..]
    }

    /// True when the label is plain alphanumeric as the BIDS standard requires.
    pub fn is_standard_compliant(&self) -> bool {
        !self.label().is_empty() && self.label().chars().all(|ch| ch.is_ascii_alphanumeric())
    }
}

/// Collapse `sub` followed by any run of hyphens (including `sub-sub-`) to a
/// single `sub-` prefix.
fn collapse_sub_prefix(value: &str) -> String {
    let mut rest = value;
    let mut saw_prefix = false;
    loop {
        let Some(stripped) = rest.strip_prefix("sub") else {
            break;
        };
        let after = stripped.trim_start_matches('-');
        if after.len() == stripped.len() {
            // "sub" not followed by a hyphen is part of the label itself.
            break;
        }
        saw_prefix = true;
        rest = after;
    }
    if saw_prefix {
        format!("sub-{rest}")
    } else {
        value.to_string()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A session identifier as it appears in BIDS entity names (`ses-<id>`).
///
/// Numeric sessions are one-based and zero-padded to two digits; free-text
/// session labels are kept verbatim.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidSessionId(value));
        }
        if trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            let index: u64 = trimmed
                .parse()
                .map_err(|_| ModelError::InvalidSessionId(value.clone()))?;
            if index == 0 {
                return Err(ModelError::InvalidSessionId(value));
            }
            return Ok(Self(format!("{index:02}")));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A sanitized task identifier used in file names (`task-<name>`).
///
/// Sanitization strips a trailing spreadsheet extension, removes every
/// non-alphanumeric character and lowercases the rest.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TaskName(String);

impl TaskName {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let mut stem = value.trim();
        for extension in [".xlsx", ".xls", ".csv"] {
            let Some(split) = stem.len().checked_sub(extension.len()) else {
                continue;
            };
            if split > 0
                && stem.is_char_boundary(split)
                && stem[split..].eq_ignore_ascii_case(extension)
            {
                stem = &stem[..split];
                break;
            }
        }
        let sanitized: String = stem
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|ch| ch.to_ascii_lowercase())
            .collect();
        if sanitized.is_empty() {
            return Err(ModelError::InvalidTaskName(value));
        }
        Ok(Self(sanitized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
