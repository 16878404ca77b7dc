use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::Serialize;

use super::expand::{dedup_cells, expand_rows};
use super::parse_number;
use crate::data::model::{GroupTable, Row, SOURCE_COLUMN};
use crate::data::normalize::canonical_heading;
use crate::data::table::drop_sparse_rows;

pub const HOLE_ID: &str = "HOLE_ID";
pub const SPEC_DEPTH: &str = "SPEC_DEPTH";
const JOIN_KEYS: [&str; 2] = [HOLE_ID, SPEC_DEPTH];

/// Result fields and the per-dialect columns they are coalesced from.
const RESULT_FIELDS: &[(&str, &[&str])] = &[
    (HOLE_ID, &["HOLE_ID", "LOCA_ID"]),
    (SPEC_DEPTH, &["SPEC_DEPTH", "SPEC_DPTH"]),
    ("CELL", &["TRIX_CELL", "TRET_CELL"]),
    ("DEVF", &["TRIX_DEVF", "TRET_DEVF"]),
    ("PWPF", &["TRIX_PWPF", "TRET_PWPF"]),
];

/// Provenance of a summary row: sample first, then result, then classification.
const SOURCE_CANDIDATES: &[&str] = &[SOURCE_COLUMN, "SOURCE_FILE_RESULT", "SOURCE_FILE_CLSS"];

/// Columns of the summary table, in output order, when present.
pub const SUMMARY_COLUMNS: &[&str] = &[
    HOLE_ID,
    "SAMP_ID",
    "SAMP_REF",
    "SAMP_TOP",
    "SPEC_REF",
    SPEC_DEPTH,
    "SAMP_DESC",
    "SPEC_DESC",
    "GEOL_STAT",
    "TRIG_TYPE",
    "TREG_TYPE",
    "CELL",
    "DEVF",
    "PWPF",
    SOURCE_COLUMN,
];

// ---------------------------------------------------------------------------
// TriaxialRecord – one summary row with numeric fields parsed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriaxialRecord {
    pub hole_id: String,
    pub spec_depth: Option<f64>,
    pub trig_type: Option<String>,
    pub treg_type: Option<String>,
    pub cell: Option<f64>,
    pub devf: Option<f64>,
    pub pwpf: Option<f64>,
    pub source_file: Option<String>,
    /// Every summary column as text.
    #[serde(skip)]
    pub fields: Row,
}

impl TriaxialRecord {
    pub fn from_row(row: &Row) -> Self {
        let text = |key: &str| row.get(key).map(String::as_str).unwrap_or("");
        let non_empty = |key: &str| {
            Some(text(key).trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        TriaxialRecord {
            hole_id: text(HOLE_ID).to_string(),
            spec_depth: parse_number(text(SPEC_DEPTH)),
            trig_type: non_empty("TRIG_TYPE"),
            treg_type: non_empty("TREG_TYPE"),
            cell: parse_number(text("CELL")),
            devf: parse_number(text("DEVF")),
            pwpf: parse_number(text("PWPF")),
            source_file: non_empty(SOURCE_COLUMN),
            fields: row.clone(),
        }
    }

    /// Effective-stress test type when known, else the total-stress one.
    pub fn test_type(&self) -> Option<&str> {
        self.treg_type.as_deref().or(self.trig_type.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriaxialSummary {
    /// Text view, columns in [`SUMMARY_COLUMNS`] order.
    pub table: GroupTable,
    pub records: Vec<TriaxialRecord>,
}

impl TriaxialSummary {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Key normalization
// ---------------------------------------------------------------------------

/// Join-key text: trimmed, and for depths the canonical number formatting
/// so `"1.50"` and `"1.5"` meet.
pub fn normalize_key(key: &str, value: &str) -> String {
    let trimmed = value.trim();
    if key == SPEC_DEPTH {
        if let Some(depth) = parse_number(trimmed) {
            return format!("{depth}");
        }
    }
    trimmed.to_string()
}

/// Clone a group with key headings renamed to their canonical spelling,
/// `HOLE_ID` guaranteed, and key values normalized.
fn prepare(table: &GroupTable) -> GroupTable {
    let mut table = table.clone();
    let variants: Vec<(String, &'static str)> = table
        .headings
        .iter()
        .filter_map(|h| canonical_heading(h).map(|c| (h.clone(), c)))
        .filter(|(h, c)| JOIN_KEYS.contains(c) && h.as_str() != *c)
        .collect();
    for (from, to) in variants {
        table.rename_heading(&from, to);
    }
    table.ensure_heading(HOLE_ID);
    for row in &mut table.rows {
        for key in JOIN_KEYS {
            if let Some(value) = row.get_mut(key) {
                *value = normalize_key(key, value);
            }
        }
    }
    table
}

/// First candidate column holding a non-blank value in `row`.
pub fn coalesce<'a>(row: &'a Row, candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| row.get(*c))
        .map(String::as_str)
        .find(|v| !v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Outer join
// ---------------------------------------------------------------------------

/// Full outer join on the key columns both sides carry.
///
/// Matches are many-to-many in left order; unmatched right rows follow in
/// right order. Right-hand non-key columns that collide with a left heading
/// get `suffix` appended.
pub fn outer_join(left: &GroupTable, right: &GroupTable, suffix: &str) -> GroupTable {
    let keys: Vec<&str> = JOIN_KEYS
        .iter()
        .copied()
        .filter(|k| left.has_heading(k) && right.has_heading(k))
        .collect();

    let mut out = GroupTable::new(left.name.clone(), left.headings.clone());
    let right_names: Vec<(&String, String)> = right
        .headings
        .iter()
        .map(|h| {
            let name = if !keys.contains(&h.as_str()) && left.has_heading(h) {
                format!("{h}{suffix}")
            } else {
                h.clone()
            };
            (h, name)
        })
        .collect();
    for (_, name) in &right_names {
        out.ensure_heading(name);
    }

    let key_of = |row: &Row| -> Vec<String> {
        keys.iter()
            .map(|k| row.get(*k).cloned().unwrap_or_default())
            .collect()
    };
    let renamed = |row: &Row| -> Row {
        right_names
            .iter()
            .filter_map(|(from, to)| row.get(*from).map(|v| (to.clone(), v.clone())))
            .collect()
    };

    let mut index: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows.iter().enumerate() {
        index.entry(key_of(row)).or_default().push(i);
    }

    let mut matched = vec![false; right.rows.len()];
    for left_row in &left.rows {
        match index.get(&key_of(left_row)) {
            Some(hits) => {
                for &i in hits {
                    matched[i] = true;
                    let mut row = left_row.clone();
                    row.extend(renamed(&right.rows[i]));
                    out.rows.push(row);
                }
            }
            None => out.rows.push(left_row.clone()),
        }
    }
    for (row, _) in right.rows.iter().zip(&matched).filter(|(_, m)| !**m) {
        out.rows.push(renamed(row));
    }

    debug!(
        "joined {} on {:?}: {} + {} rows -> {}",
        right.name,
        keys,
        left.len(),
        right.len(),
        out.len()
    );
    out
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Concatenate the AGS3 and AGS4 result groups and coalesce each row onto
/// `HOLE_ID, SPEC_DEPTH, CELL, DEVF, PWPF` (+ `SOURCE_FILE`).
fn result_table(trix: Option<&GroupTable>, tret: Option<&GroupTable>) -> GroupTable {
    let mut headings: Vec<String> = RESULT_FIELDS.iter().map(|(f, _)| f.to_string()).collect();
    let tagged = [trix, tret]
        .into_iter()
        .flatten()
        .any(|t| t.has_heading(SOURCE_COLUMN));
    if tagged {
        headings.push(SOURCE_COLUMN.to_string());
    }

    let mut out = GroupTable::new("RESULT", headings);
    for table in [trix, tret].into_iter().flatten() {
        for row in &table.rows {
            let mut coalesced = Row::new();
            for (field, candidates) in RESULT_FIELDS {
                let value = coalesce(row, candidates).unwrap_or("");
                coalesced.insert(field.to_string(), normalize_key(field, value));
            }
            if let Some(source) = row.get(SOURCE_COLUMN) {
                coalesced.insert(SOURCE_COLUMN.to_string(), source.clone());
            }
            out.rows.push(coalesced);
        }
    }
    out
}

/// Build the triaxial summary from merged groups.
///
/// `SAMP` anchors the chain; `CLSS`, the test-type columns of `TRIG` and
/// `TREG`, and the coalesced `TRIX`/`TRET` results are outer-joined onto it
/// in that order. Multi-valued cells are deduplicated and expanded into
/// rows, sparse rows dropped, and numeric fields parsed.
pub fn generate_triaxial_table(groups: &BTreeMap<String, GroupTable>) -> TriaxialSummary {
    let get = |name: &str| groups.get(name).filter(|t| !t.is_empty()).map(prepare);

    let samp = get("SAMP");
    let clss = get("CLSS");
    let trig = get("TRIG");
    let treg = get("TREG");
    let trix = get("TRIX");
    let tret = get("TRET");

    let mut merged = samp.unwrap_or_else(|| GroupTable::new("TRIAXIAL", vec![HOLE_ID.to_string()]));
    merged.name = "TRIAXIAL".to_string();

    if let Some(clss) = &clss {
        merged = outer_join(&merged, clss, "_CLSS");
    }
    for (table, column, suffix) in [(&trig, "TRIG_TYPE", "_TRIG"), (&treg, "TREG_TYPE", "_TREG")] {
        if let Some(table) = table {
            let types = table.project(&[HOLE_ID, SPEC_DEPTH, column]);
            merged = outer_join(&merged, &types, suffix);
        }
    }
    if trix.is_some() || tret.is_some() {
        let results = result_table(trix.as_ref(), tret.as_ref());
        merged = outer_join(&merged, &results, "_RESULT");
    }

    if SOURCE_CANDIDATES.iter().any(|c| merged.has_heading(c)) {
        merged.ensure_heading(SOURCE_COLUMN);
        for row in &mut merged.rows {
            if let Some(source) = coalesce(row, SOURCE_CANDIDATES).map(str::to_string) {
                row.insert(SOURCE_COLUMN.to_string(), source);
            }
        }
    }

    let mut summary = merged.project(SUMMARY_COLUMNS);
    dedup_cells(&mut summary);
    let mut table = expand_rows(&summary);
    drop_sparse_rows(&mut table, &[SOURCE_COLUMN]);

    let records = table.rows.iter().map(TriaxialRecord::from_row).collect();
    TriaxialSummary { table, records }
}
