use log::debug;

use super::model::GroupTable;

/// Canonical name → spellings folded onto it (compared case-insensitively).
const HEADING_ALIASES: &[(&str, &[&str])] = &[
    ("SPEC_DEPTH", &["SPEC_DPTH", "SPEC_DEPTH"]),
    ("HOLE_ID", &["LOCA_ID", "HOLE_ID"]),
];

/// Canonical spelling for `heading`, if it is a known variant.
pub fn canonical_heading(heading: &str) -> Option<&'static str> {
    HEADING_ALIASES
        .iter()
        .find(|(_, variants)| variants.iter().any(|v| v.eq_ignore_ascii_case(heading)))
        .map(|(canonical, _)| *canonical)
}

/// Rewrite known spelling variants onto their canonical heading. A rename
/// that would collide with an existing heading is skipped.
pub fn normalize_headings(table: &mut GroupTable) {
    let renames: Vec<(String, &'static str)> = table
        .headings
        .iter()
        .filter_map(|h| canonical_heading(h).map(|c| (h.clone(), c)))
        .filter(|(h, c)| h.as_str() != *c)
        .collect();

    for (from, to) in renames {
        if !table.rename_heading(&from, to) {
            debug!("{}: kept {from}, {to} already present", table.name);
        }
    }
}
