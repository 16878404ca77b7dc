//! Property-based tests for heading dedup, continuation joining and parsed
//! table shape.

use std::collections::HashSet;

use ags_triax::data::table::{dedup_headings, join_fragment};
use ags_triax::parse_bytes;
use ags_triax::ParseOptions;
use proptest::prelude::*;

/// Short heading names drawn from a small alphabet so repeats are common.
fn heading_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[A-C]", "[A-C]_[1-2]", "[A-Z]{2,6}",]
}

fn quoted(fields: &[String]) -> String {
    let parts: Vec<String> = fields.iter().map(|f| format!("\"{f}\"")).collect();
    parts.join(",")
}

/// One group in either dialect with arbitrary headings and ragged rows.
fn group_text(ags4: bool, headings: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::new();
    if ags4 {
        lines.push("\"GROUP\",\"TEST\"".to_string());
        let mut heading = vec!["HEADING".to_string()];
        heading.extend(headings.iter().cloned());
        lines.push(quoted(&heading));
        for row in rows {
            let mut data = vec!["DATA".to_string()];
            data.extend(row.iter().cloned());
            lines.push(quoted(&data));
        }
    } else {
        lines.push("\"**TEST\"".to_string());
        let starred: Vec<String> = headings.iter().map(|h| format!("*{h}")).collect();
        lines.push(quoted(&starred));
        for row in rows {
            lines.push(quoted(row));
        }
    }
    lines.join("\n")
}

proptest! {
    #[test]
    fn dedup_yields_unique_headings(headings in prop::collection::vec(heading_strategy(), 0..12)) {
        let out = dedup_headings(&headings);
        prop_assert_eq!(out.len(), headings.len());
        let distinct: HashSet<&String> = out.iter().collect();
        prop_assert_eq!(distinct.len(), out.len());
    }

    #[test]
    fn dedup_keeps_first_occurrence_names(
        headings in prop::collection::vec(heading_strategy(), 1..12)
    ) {
        let out = dedup_headings(&headings);
        prop_assert_eq!(&out[0], &headings[0]);
    }

    #[test]
    fn continuation_is_idempotent(existing in "[a-z0-9]{0,6}", fragment in "[a-z0-9]{0,6}") {
        let once = join_fragment(&existing, &fragment);
        let twice = join_fragment(&once, &fragment);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn continuation_line_applied_twice_matches_once(
        value in "[a-z]{1,6}",
        fragment in "[a-z0-9]{1,6}",
    ) {
        let head = format!(
            "\"GROUP\",\"SAMP\"\n\"HEADING\",\"LOCA_ID\",\"SAMP_DESC\"\n\"DATA\",\"BH1\",\"{value}\"\n"
        );
        let cont = format!("\"<CONT>\",\"\",\"{fragment}\"\n");
        let opts = ParseOptions::default();
        let once = parse_bytes("p.ags", format!("{head}{cont}").as_bytes(), &opts).unwrap();
        let twice = parse_bytes("p.ags", format!("{head}{cont}{cont}").as_bytes(), &opts).unwrap();
        prop_assert_eq!(&once.groups, &twice.groups);
    }

    #[test]
    fn parsed_rows_only_carry_declared_headings(
        ags4 in any::<bool>(),
        headings in prop::collection::vec(heading_strategy(), 1..6),
        rows in prop::collection::vec(prop::collection::vec("[a-z0-9]{1,4}", 0..8), 1..5),
    ) {
        let text = group_text(ags4, &headings, &rows);
        let parsed = parse_bytes("p.ags", text.as_bytes(), &ParseOptions::default()).unwrap();
        prop_assert!(parsed.failures.is_empty());
        for table in parsed.groups.values() {
            let distinct: HashSet<&String> = table.headings.iter().collect();
            prop_assert_eq!(distinct.len(), table.headings.len());
            for row in &table.rows {
                for key in row.keys() {
                    prop_assert!(
                        table.headings.contains(key),
                        "{} not in {:?}",
                        key,
                        table.headings
                    );
                }
            }
        }
    }
}
