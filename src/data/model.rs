use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Provenance column stamped on every row by the multi-file merge.
pub const SOURCE_COLUMN: &str = "SOURCE_FILE";

/// Separator placed between fragments joined from continuation lines.
pub const FRAGMENT_SEPARATOR: &str = " | ";

/// One row of a group: heading → text value.
pub type Row = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Dialect – AGS3 vs AGS4 line typing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dialect {
    /// `**GROUP` / `*HEADING` prefixed lines.
    Ags3,
    /// `GROUP` / `HEADING` / `UNIT` / `TYPE` / `DATA` descriptors.
    Ags4,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Ags3 => write!(f, "AGS3"),
            Dialect::Ags4 => write!(f, "AGS4"),
        }
    }
}

/// Result of fingerprinting one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatReport {
    /// `None` when no group declaration line was found.
    pub dialect: Option<Dialect>,
    /// Informational only: the hole-location group (`**HOLE` / `LOCA`) is present.
    pub has_location_group: bool,
}

// ---------------------------------------------------------------------------
// GroupTable – one named table section
// ---------------------------------------------------------------------------

/// A finalized group: ordered headings plus rows keyed by heading.
///
/// Every key of every row is one of `headings`, and `headings` holds no
/// duplicates. Missing keys read as empty text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTable {
    pub name: String,
    pub headings: Vec<String>,
    pub rows: Vec<Row>,
}

impl GroupTable {
    pub fn new(name: impl Into<String>, headings: Vec<String>) -> Self {
        GroupTable {
            name: name.into(),
            headings,
            rows: Vec::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_heading(&self, heading: &str) -> bool {
        self.headings.iter().any(|h| h == heading)
    }

    /// Append `heading` to the heading sequence unless already present.
    pub fn ensure_heading(&mut self, heading: &str) {
        if !self.has_heading(heading) {
            self.headings.push(heading.to_string());
        }
    }

    /// Append a row, registering any key the table has not seen yet.
    pub fn push_row(&mut self, row: Row) {
        for key in row.keys() {
            if !self.has_heading(key) {
                self.headings.push(key.clone());
            }
        }
        self.rows.push(row);
    }

    /// Text of `heading` in row `index`, empty when absent.
    pub fn value(&self, index: usize, heading: &str) -> &str {
        self.rows
            .get(index)
            .and_then(|row| row.get(heading))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Rename a heading in place, rows included. Returns `false` when `from`
    /// is missing or `to` already names a different heading.
    pub fn rename_heading(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.has_heading(from);
        }
        if self.has_heading(to) {
            return false;
        }
        let Some(slot) = self.headings.iter_mut().find(|h| *h == from) else {
            return false;
        };
        *slot = to.to_string();
        for row in &mut self.rows {
            if let Some(v) = row.remove(from) {
                row.insert(to.to_string(), v);
            }
        }
        true
    }

    /// Keep only the listed headings (in the given order) that the table has.
    pub fn project(&self, headings: &[&str]) -> GroupTable {
        let kept: Vec<String> = headings
            .iter()
            .filter(|h| self.has_heading(h))
            .map(|h| h.to_string())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|(k, _)| kept.contains(k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .collect();
        GroupTable {
            name: self.name.clone(),
            headings: kept,
            rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// A group that could not be assembled into a rectangular table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupFailure {
    pub group: String,
    pub reason: String,
}

impl fmt::Display for GroupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.group, self.reason)
    }
}

// ---------------------------------------------------------------------------
// ParsedFile – everything one file produced
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ParsedFile {
    /// Caller-supplied identifier, usually the file name.
    pub source: String,
    pub dialect: Dialect,
    /// The hole-location group (`**HOLE` / `LOCA`) was declared.
    pub has_location_group: bool,
    /// Non-empty groups by name.
    pub groups: BTreeMap<String, GroupTable>,
    /// Groups dropped while building, with reasons.
    pub failures: Vec<GroupFailure>,
}

impl ParsedFile {
    /// Group name → finalized heading sequence, used to restore column
    /// order when writing tables back out.
    pub fn headings(&self) -> BTreeMap<String, Vec<String>> {
        self.groups
            .iter()
            .map(|(name, table)| (name.clone(), table.headings.clone()))
            .collect()
    }

    pub fn report(&self) -> FormatReport {
        FormatReport {
            dialect: Some(self.dialect),
            has_location_group: self.has_location_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn push_row_registers_new_headings() {
        let mut table = GroupTable::new("HOLE", vec!["HOLE_ID".into()]);
        table.push_row(row(&[("HOLE_ID", "BH1"), ("HOLE_TYPE", "CP")]));
        assert_eq!(table.headings, vec!["HOLE_ID", "HOLE_TYPE"]);
        assert_eq!(table.value(0, "HOLE_TYPE"), "CP");
        assert_eq!(table.value(0, "MISSING"), "");
        assert_eq!(table.value(7, "HOLE_ID"), "");
    }

    #[test]
    fn rename_refuses_collisions() {
        let mut table = GroupTable::new("SAMP", vec!["LOCA_ID".into(), "HOLE_ID".into()]);
        table.push_row(row(&[("LOCA_ID", "A"), ("HOLE_ID", "B")]));
        assert!(!table.rename_heading("LOCA_ID", "HOLE_ID"));
        assert!(table.rename_heading("LOCA_ID", "SITE_ID"));
        assert_eq!(table.headings, vec!["SITE_ID", "HOLE_ID"]);
        assert_eq!(table.value(0, "SITE_ID"), "A");
    }

    #[test]
    fn project_keeps_requested_order() {
        let mut table = GroupTable::new("T", vec!["A".into(), "B".into(), "C".into()]);
        table.push_row(row(&[("A", "1"), ("B", "2"), ("C", "3")]));
        let p = table.project(&["C", "X", "A"]);
        assert_eq!(p.headings, vec!["C", "A"]);
        assert_eq!(p.rows[0].len(), 2);
    }
}
