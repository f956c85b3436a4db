//! Property tests for the levels-string parser.

use std::collections::BTreeMap;

use proptest::prelude::*;

use bids_ingest::parse_levels_string;

proptest! {
    /// Parsed level count equals the number of pairs in the source string,
    /// and every label round-trips through its code.
    #[test]
    fn levels_round_trip(levels in prop::collection::btree_map(
        any::<i32>(),
        "[a-zA-Z][a-zA-Z0-9 ]{0,10}[a-zA-Z0-9]",
        1..8,
    )) {
        let levels: BTreeMap<i64, String> = levels
            .into_iter()
            .map(|(code, label)| (i64::from(code), label))
            .collect();
        let source: Vec<String> = levels
            .iter()
            .map(|(code, label)| format!("{code}:{label}"))
            .collect();
        let source = source.join(";");

        let parsed = parse_levels_string(&source).expect("valid levels string");
        prop_assert_eq!(parsed.len(), levels.len());
        for (code, label) in &levels {
            prop_assert_eq!(parsed.label(*code), Some(label.as_str()));
        }
    }

    /// Whitespace around pairs never changes the outcome.
    #[test]
    fn levels_ignore_padding(code in any::<i16>(), label in "[a-zA-Z]{1,10}") {
        let tight = format!("{code}:{label}");
        let padded = format!("  {code} : {label}  ");
        let from_tight = parse_levels_string(&tight).expect("tight");
        let from_padded = parse_levels_string(&padded).expect("padded");
        prop_assert_eq!(from_tight, from_padded);
    }
}
