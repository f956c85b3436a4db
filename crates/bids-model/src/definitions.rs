use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::{SessionId, SubjectId, TaskName};

/// Declared type of a demographics variable or task item value.
///
/// The declaration is the single source of truth for coercion; value shapes
/// are never inspected to infer a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Integer,
    Float,
    Categorical,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Categorical => "categorical",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    /// Parse a declared type. The legacy categorical spellings `cat_num`
    /// and `cat_string` are accepted as aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" => Ok(DataType::String),
            "integer" | "int" => Ok(DataType::Integer),
            "float" => Ok(DataType::Float),
            "categorical" | "cat_num" | "cat_string" => Ok(DataType::Categorical),
            _ => Err(format!("Unknown data type: {s}")),
        }
    }
}

/// Ordered mapping of integer level codes to human-readable labels.
///
/// Order is the order pairs were declared in; serialization emits a JSON
/// object with stringified codes in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Levels {
    entries: Vec<(i64, String)>,
}

impl Levels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a code/label pair. Returns false (and keeps the existing
    /// pair) when the code is already present.
    pub fn insert(&mut self, code: i64, label: impl Into<String>) -> bool {
        if self.contains(code) {
            return false;
        }
        self.entries.push((code, label.into()));
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, code: i64) -> bool {
        self.entries.iter().any(|(existing, _)| *existing == code)
    }

    pub fn label(&self, code: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == code)
            .map(|(_, label)| label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.entries.iter().map(|(code, label)| (*code, label.as_str()))
    }
}

impl Serialize for Levels {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, label) in &self.entries {
            map.serialize_entry(&code.to_string(), label)?;
        }
        map.end()
    }
}

impl FromIterator<(i64, String)> for Levels {
    fn from_iter<T: IntoIterator<Item = (i64, String)>>(iter: T) -> Self {
        let mut levels = Levels::new();
        for (code, label) in iter {
            levels.insert(code, label);
        }
        levels
    }
}

/// A demographics variable as declared in the variable-definition sheet.
#[derive(Debug, Clone, Serialize)]
pub struct VariableDefinition {
    pub name: String,
    pub description: String,
    pub data_type: DataType,
    /// Present iff `data_type` is [`DataType::Categorical`].
    pub levels: Option<Levels>,
}

impl VariableDefinition {
    pub fn is_categorical(&self) -> bool {
        self.data_type == DataType::Categorical
    }
}

/// A single survey item of a task.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDefinition {
    pub name: String,
    pub description: String,
    /// Number of Likert levels; 0 marks a non-Likert item.
    pub likert_scale: u32,
    pub levels: Levels,
    /// Unit text for non-Likert items that declare one.
    pub units: Option<String>,
}

impl ItemDefinition {
    pub fn is_likert(&self) -> bool {
        self.likert_scale > 0
    }
}

/// A behavioral task: its items in declaration order plus the free-form
/// metadata from the task-description and non-Likert sheets.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDefinition {
    pub name: TaskName,
    pub items: Vec<ItemDefinition>,
    /// Task-level key/value metadata (TaskName, Instructions, ...).
    pub metadata: Vec<(String, String)>,
    /// Description-only entries from the non-Likert sheet.
    pub extra_fields: Vec<(String, String)>,
}

impl TaskDefinition {
    pub fn item(&self, name: &str) -> Option<&ItemDefinition> {
        self.items
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.item(name).is_some()
    }
}

/// One subject's responses for one session: raw cell text keyed by item
/// name. Blank cells are kept so downstream stages apply the missing-value
/// policy uniformly.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseRecord {
    pub subject: SubjectId,
    pub session: SessionId,
    pub values: BTreeMap<String, String>,
}

impl ResponseRecord {
    pub fn value(&self, item: &str) -> Option<&str> {
        self.values.get(item).map(String::as_str)
    }
}

/// The full in-memory model of one conversion run. Built once, read-only
/// after validation succeeds, discarded after emission.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    pub study_name: String,
    /// Variable definitions in sheet order; order fixes output columns.
    pub variables: Vec<VariableDefinition>,
    pub tasks: Vec<TaskDefinition>,
    pub subjects: Vec<SubjectId>,
    pub records: Vec<ResponseRecord>,
    /// Dataset-level key/value metadata in sheet order.
    pub metadata: Vec<(String, String)>,
}

impl Dataset {
    pub fn variable(&self, name: &str) -> Option<&VariableDefinition> {
        self.variables
            .iter()
            .find(|variable| variable.name.eq_ignore_ascii_case(name))
    }

    pub fn task(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks
            .iter()
            .find(|task| task.name.as_str().eq_ignore_ascii_case(name))
    }

    /// The task owning `item`, when exactly one declares it.
    pub fn task_for_item(&self, item: &str) -> Option<&TaskDefinition> {
        let mut owners = self.tasks.iter().filter(|task| task.has_item(item));
        let first = owners.next()?;
        if owners.next().is_some() {
            return None;
        }
        Some(first)
    }
}
