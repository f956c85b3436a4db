//! Per-cell value coercion.
//!
//! Coercion follows the owning definition's declared type; value shapes are
//! never inspected to pick one. Blank cells and cells equal to the
//! configured numeric missing code both normalize to [`NormalizedValue::
//! Missing`]; only the configured sentinel string ever reaches output.

use serde::Serialize;

use bids_model::{ConvertOptions, DataType, IssueKind, Levels};

use crate::text::sanitize_tsv_text;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NormalizedValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Missing,
}

impl NormalizedValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, NormalizedValue::Missing)
    }

    /// Render for a tabular cell. Missing renders as the configured
    /// sentinel string; the numeric missing code is never written.
    pub fn render(&self, options: &ConvertOptions) -> String {
        match self {
            NormalizedValue::Text(text) => text.clone(),
            NormalizedValue::Integer(value) => value.to_string(),
            NormalizedValue::Float(value) => value.to_string(),
            NormalizedValue::Missing => options.missing_value_text.clone(),
        }
    }
}

/// A cell that failed coercion. The caller attaches subject and item
/// context before collecting it.
#[derive(Debug, Clone)]
pub struct CoercionFailure {
    pub kind: IssueKind,
    pub raw: String,
    pub detail: String,
}

pub type CoercionResult = Result<NormalizedValue, CoercionFailure>;

/// Coerce one raw cell according to its declared type.
pub fn normalize_value(
    data_type: DataType,
    levels: Option<&Levels>,
    raw: &str,
    options: &ConvertOptions,
) -> CoercionResult {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(NormalizedValue::Missing);
    }
    match data_type {
        DataType::String => Ok(match sanitize_tsv_text(trimmed) {
            Some(text) if text != options.missing_value_code.to_string() => {
                NormalizedValue::Text(text)
            }
            _ => NormalizedValue::Missing,
        }),
        DataType::Integer => {
            let value = parse_whole_number(trimmed).ok_or_else(|| CoercionFailure {
                kind: IssueKind::TypeCoercion,
                raw: trimmed.to_string(),
                detail: "not a whole number".to_string(),
            })?;
            if value == options.missing_value_code {
                return Ok(NormalizedValue::Missing);
            }
            Ok(NormalizedValue::Integer(value))
        }
        DataType::Float => {
            let value: f64 = trimmed.parse().map_err(|_| CoercionFailure {
                kind: IssueKind::TypeCoercion,
                raw: trimmed.to_string(),
                detail: "not a number".to_string(),
            })?;
            if value == options.missing_value_code as f64 {
                return Ok(NormalizedValue::Missing);
            }
            Ok(NormalizedValue::Float(value))
        }
        DataType::Categorical => {
            let code = parse_whole_number(trimmed).ok_or_else(|| CoercionFailure {
                kind: IssueKind::TypeCoercion,
                raw: trimmed.to_string(),
                detail: "not a level code".to_string(),
            })?;
            if code == options.missing_value_code {
                return Ok(NormalizedValue::Missing);
            }
            let known = levels.map(|levels| levels.contains(code)).unwrap_or(false);
            if !known {
                return Err(CoercionFailure {
                    kind: IssueKind::UnknownLevelCode,
                    raw: trimmed.to_string(),
                    detail: format!("code {code} is not a defined level"),
                });
            }
            Ok(NormalizedValue::Integer(code))
        }
    }
}

/// Whole-number parse that also accepts a float spelling with a zero
/// fraction (`"3.0"` -> 3), the shape spreadsheet exports produce for
/// integer cells.
fn parse_whole_number(text: &str) -> Option<i64> {
    if let Ok(value) = text.parse::<i64>() {
        return Some(value);
    }
    let value: f64 = text.parse().ok()?;
    if value.fract() != 0.0 || !value.is_finite() {
        return None;
    }
    if value < i64::MIN as f64 || value > i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ConvertOptions {
        ConvertOptions::default()
    }

    fn likert_levels() -> Levels {
        let mut levels = Levels::new();
        levels.insert(0, "Rarely");
        levels.insert(1, "Some");
        levels.insert(2, "Occasionally");
        levels.insert(3, "Often");
        levels
    }

    #[test]
    fn blank_cells_are_missing() {
        let value = normalize_value(DataType::Integer, None, "  ", &options()).unwrap();
        assert!(value.is_missing());
        assert_eq!(value.render(&options()), "n/a");
    }

    #[test]
    fn integers_accept_whole_float_spellings() {
        assert_eq!(
            normalize_value(DataType::Integer, None, "3", &options()).unwrap(),
            NormalizedValue::Integer(3)
        );
        assert_eq!(
            normalize_value(DataType::Integer, None, "3.0", &options()).unwrap(),
            NormalizedValue::Integer(3)
        );
    }

    #[test]
    fn non_numeric_integer_cell_fails_coercion() {
        let failure = normalize_value(DataType::Integer, None, "old", &options()).unwrap_err();
        assert_eq!(failure.kind, IssueKind::TypeCoercion);
        assert_eq!(failure.raw, "old");
    }

    #[test]
    fn missing_code_folds_to_missing_without_leaking() {
        let opts = options();
        for (data_type, raw) in [
            (DataType::Integer, "-999"),
            (DataType::Float, "-999"),
            (DataType::Float, "-999.0"),
            (DataType::String, "-999"),
        ] {
            let value = normalize_value(data_type, None, raw, &opts).unwrap();
            assert!(value.is_missing(), "{data_type} {raw}");
            assert_eq!(value.render(&opts), "n/a");
        }
    }

    #[test]
    fn defined_level_codes_pass() {
        let levels = likert_levels();
        let value =
            normalize_value(DataType::Categorical, Some(&levels), "2", &options()).unwrap();
        assert_eq!(value, NormalizedValue::Integer(2));
        assert_eq!(levels.label(2), Some("Occasionally"));
    }

    #[test]
    fn unknown_level_code_is_reported() {
        let levels = likert_levels();
        let failure =
            normalize_value(DataType::Categorical, Some(&levels), "9", &options()).unwrap_err();
        assert_eq!(failure.kind, IssueKind::UnknownLevelCode);
        assert_eq!(failure.raw, "9");
    }

    #[test]
    fn strings_are_sanitized() {
        assert_eq!(
            normalize_value(DataType::String, None, " left\thanded ", &options()).unwrap(),
            NormalizedValue::Text("left handed".to_string())
        );
        assert!(
            normalize_value(DataType::String, None, "NaN", &options())
                .unwrap()
                .is_missing()
        );
    }

    #[test]
    fn float_values_parse() {
        assert_eq!(
            normalize_value(DataType::Float, None, "1.5", &options()).unwrap(),
            NormalizedValue::Float(1.5)
        );
    }
}
