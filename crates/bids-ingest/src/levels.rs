//! Level-Pair Resolver for task item sheets.
//!
//! Item sheets carry a base `levels`/`leveldescription` column pair and
//! zero or more suffixed repeats (`levels1`, `leveldescription1`, ...;
//! the dotted spelling `levels.1` is accepted). Pairs are read
//! positionally per item row; resolution stops at the first pair where
//! both cells are blank. Different items use different numbers of levels,
//! so trailing blank pairs are expected and are not an error.

use bids_model::{Issue, IssueKind, Levels, Sheet, is_blank};

pub const LEVEL_CODE_PREFIX: &str = "levels";
pub const LEVEL_LABEL_PREFIX: &str = "leveldescription";

/// Column indices of the k-th level pair; either side may be absent from
/// the sheet entirely, which reads as an always-blank cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelPairColumns {
    pub code: Option<usize>,
    pub label: Option<usize>,
}

/// Locate all level pair columns of an item sheet, ordered by suffix.
pub fn level_columns(sheet: &Sheet) -> Vec<LevelPairColumns> {
    let mut pairs: Vec<LevelPairColumns> = Vec::new();
    for (index, header) in sheet.headers.iter().enumerate() {
        let normalized = header.trim().to_ascii_lowercase();
        if let Some(k) = pair_index(&normalized, LEVEL_LABEL_PREFIX) {
            ensure_len(&mut pairs, k);
            pairs[k].label = Some(index);
        } else if let Some(k) = pair_index(&normalized, LEVEL_CODE_PREFIX) {
            ensure_len(&mut pairs, k);
            pairs[k].code = Some(index);
        }
    }
    pairs
}

fn ensure_len(pairs: &mut Vec<LevelPairColumns>, k: usize) {
    if pairs.len() <= k {
        pairs.resize(k + 1, LevelPairColumns::default());
    }
}

/// Suffix position of a level column header: `levels` -> 0, `levels1` or
/// `levels.1` -> 1, and so on.
fn pair_index(header: &str, prefix: &str) -> Option<usize> {
    let rest = header.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some(0);
    }
    let digits = rest.trim_start_matches(['.', '_']);
    if digits.is_empty() || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Result of resolving one item row.
#[derive(Debug)]
pub struct ResolvedLevels {
    pub levels: Levels,
    /// Unit text collected for non-Likert items.
    pub units: Option<String>,
    pub issues: Vec<Issue>,
}

/// Resolve the level pairs of one item row.
///
/// For Likert items (`likert_scale` > 0) the resolved pair count must
/// equal the declared scale. Non-Likert items resolve no pairs; a filled
/// base description cell becomes the item's unit text instead.
pub fn resolve_item_levels(
    sheet: &Sheet,
    row: usize,
    columns: &[LevelPairColumns],
    item: &str,
    likert_scale: u32,
) -> ResolvedLevels {
    let mut issues = Vec::new();

    if likert_scale == 0 {
        let units = columns
            .first()
            .and_then(|pair| pair.label)
            .map(|col| sheet.value(row, col).trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        return ResolvedLevels {
            levels: Levels::new(),
            units,
            issues,
        };
    }

    let mut levels = Levels::new();
    let mut pair_failed = false;
    for (k, pair) in columns.iter().enumerate() {
        let code_raw = pair.code.map(|col| sheet.value(row, col)).unwrap_or("");
        let label_raw = pair.label.map(|col| sheet.value(row, col)).unwrap_or("");
        let code_blank = is_blank(code_raw);
        let label_blank = is_blank(label_raw);

        if code_blank && label_blank {
            // Authoritative termination: the row declares no further levels.
            break;
        }
        if code_blank != label_blank {
            let side = if code_blank { "label" } else { "code" };
            issues.push(
                Issue::new(
                    IssueKind::UnmatchedLevelPair,
                    format!("item {item:?} level pair {k} has only its {side} cell filled"),
                )
                .with_source(sheet.name.clone())
                .with_item(item.to_string()),
            );
            pair_failed = true;
            break;
        }

        let Ok(code) = code_raw.trim().parse::<i64>() else {
            issues.push(
                Issue::new(
                    IssueKind::MalformedLevels,
                    format!(
                        "item {item:?} level pair {k} has non-integer code {:?}",
                        code_raw.trim()
                    ),
                )
                .with_source(sheet.name.clone())
                .with_item(item.to_string()),
            );
            pair_failed = true;
            continue;
        };
        if !levels.insert(code, label_raw.trim().to_string()) {
            issues.push(
                Issue::new(
                    IssueKind::DuplicateLevelCode,
                    format!("item {item:?} declares level code {code} more than once"),
                )
                .with_source(sheet.name.clone())
                .with_item(item.to_string()),
            );
            pair_failed = true;
        }
    }

    if !pair_failed && levels.len() != likert_scale as usize {
        issues.push(
            Issue::new(
                IssueKind::LevelCountMismatch,
                format!(
                    "item {item:?} declares likert scale {likert_scale} but resolves {} level pair(s)",
                    levels.len()
                ),
            )
            .with_source(sheet.name.clone())
            .with_item(item.to_string()),
        );
    }

    ResolvedLevels {
        levels,
        units: None,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_sheet(headers: &[&str], row: &[&str]) -> Sheet {
        let mut sheet = Sheet::new(
            "quest_items",
            headers.iter().map(|header| (*header).to_string()).collect(),
        );
        sheet.push_row(row.iter().map(|cell| (*cell).to_string()).collect());
        sheet
    }

    const HEADERS: [&str; 9] = [
        "itemname",
        "itemdescription",
        "likert_scale",
        "levels",
        "leveldescription",
        "levels1",
        "leveldescription1",
        "levels2",
        "leveldescription2",
    ];

    #[test]
    fn locates_pairs_by_suffix() {
        let sheet = item_sheet(&HEADERS, &[]);
        let columns = level_columns(&sheet);
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].code, Some(3));
        assert_eq!(columns[0].label, Some(4));
        assert_eq!(columns[2].label, Some(8));
    }

    #[test]
    fn accepts_dotted_suffixes() {
        let sheet = item_sheet(&["levels", "leveldescription", "levels.1", "leveldescription.1"], &[]);
        let columns = level_columns(&sheet);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].code, Some(2));
        assert_eq!(columns[1].label, Some(3));
    }

    #[test]
    fn resolves_declared_pairs() {
        let sheet = item_sheet(
            &HEADERS,
            &["q1", "First", "3", "0", "never", "1", "sometimes", "2", "often"],
        );
        let resolved = resolve_item_levels(&sheet, 0, &level_columns(&sheet), "q1", 3);
        assert!(resolved.issues.is_empty());
        assert_eq!(resolved.levels.len(), 3);
        assert_eq!(resolved.levels.label(1), Some("sometimes"));
    }

    #[test]
    fn stops_at_first_blank_pair() {
        let sheet = item_sheet(
            &HEADERS,
            &["q1", "First", "2", "0", "no", "1", "yes", "", ""],
        );
        let resolved = resolve_item_levels(&sheet, 0, &level_columns(&sheet), "q1", 2);
        assert!(resolved.issues.is_empty());
        assert_eq!(resolved.levels.len(), 2);
    }

    #[test]
    fn trailing_blank_columns_never_change_the_result() {
        let short = item_sheet(&HEADERS[..7], &["q1", "First", "2", "0", "no", "1", "yes"]);
        let long = item_sheet(
            &HEADERS,
            &["q1", "First", "2", "0", "no", "1", "yes", "", ""],
        );
        let from_short = resolve_item_levels(&short, 0, &level_columns(&short), "q1", 2);
        let from_long = resolve_item_levels(&long, 0, &level_columns(&long), "q1", 2);
        assert_eq!(from_short.levels, from_long.levels);
        assert!(from_short.issues.is_empty() && from_long.issues.is_empty());
    }

    #[test]
    fn half_filled_pair_is_unmatched_not_termination() {
        let sheet = item_sheet(
            &HEADERS,
            &["q1", "First", "2", "0", "no", "1", "", "", ""],
        );
        let resolved = resolve_item_levels(&sheet, 0, &level_columns(&sheet), "q1", 2);
        assert_eq!(resolved.issues.len(), 1);
        assert_eq!(resolved.issues[0].kind, IssueKind::UnmatchedLevelPair);
    }

    #[test]
    fn level_count_mismatch_is_reported() {
        let sheet = item_sheet(
            &HEADERS,
            &["q1", "First", "4", "0", "no", "1", "yes", "", ""],
        );
        let resolved = resolve_item_levels(&sheet, 0, &level_columns(&sheet), "q1", 4);
        assert_eq!(resolved.issues.len(), 1);
        assert_eq!(resolved.issues[0].kind, IssueKind::LevelCountMismatch);
    }

    #[test]
    fn duplicate_code_within_item() {
        let sheet = item_sheet(
            &HEADERS,
            &["q1", "First", "2", "1", "no", "1", "yes", "", ""],
        );
        let resolved = resolve_item_levels(&sheet, 0, &level_columns(&sheet), "q1", 2);
        assert!(resolved
            .issues
            .iter()
            .any(|issue| issue.kind == IssueKind::DuplicateLevelCode));
    }

    #[test]
    fn non_likert_items_collect_units() {
        let sheet = item_sheet(
            &HEADERS,
            &["rt", "Reaction time", "0", "", "milliseconds", "", "", "", ""],
        );
        let resolved = resolve_item_levels(&sheet, 0, &level_columns(&sheet), "rt", 0);
        assert!(resolved.issues.is_empty());
        assert!(resolved.levels.is_empty());
        assert_eq!(resolved.units.as_deref(), Some("milliseconds"));
    }
}
