use std::collections::{HashMap, HashSet};

use log::debug;

use super::model::{GroupFailure, GroupTable, Row, FRAGMENT_SEPARATOR};

// ---------------------------------------------------------------------------
// RawGroup – what a dialect parser hands to the builder
// ---------------------------------------------------------------------------

/// Storage accumulated by a line-type parser for one group.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBody {
    /// AGS3: one value list per heading, aligned by position.
    Columns(Vec<Vec<String>>),
    /// AGS4: rows zipped against the headings as they arrive.
    Rows(Vec<Row>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawGroup {
    pub name: String,
    /// Post-dedup heading sequence.
    pub headings: Vec<String>,
    pub body: RawBody,
    /// Set by the parser when the group's lines were structurally unusable.
    pub fault: Option<String>,
}

impl RawGroup {
    pub fn columns(name: impl Into<String>) -> Self {
        RawGroup {
            name: name.into(),
            headings: Vec::new(),
            body: RawBody::Columns(Vec::new()),
            fault: None,
        }
    }

    pub fn rows(name: impl Into<String>) -> Self {
        RawGroup {
            name: name.into(),
            headings: Vec::new(),
            body: RawBody::Rows(Vec::new()),
            fault: None,
        }
    }

    /// Record the first structural fault; later ones add nothing useful.
    pub fn mark_faulty(&mut self, reason: impl Into<String>) {
        if self.fault.is_none() {
            self.fault = Some(reason.into());
        }
    }

    pub fn row_count(&self) -> usize {
        match &self.body {
            RawBody::Columns(columns) => columns.first().map_or(0, Vec::len),
            RawBody::Rows(rows) => rows.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Heading dedup
// ---------------------------------------------------------------------------

/// Rename repeated headings: the first occurrence keeps its name, later ones
/// get `_1`, `_2`, … counted per name. A suffix that is itself a heading is
/// skipped, so the result never repeats.
pub fn dedup_headings<S: AsRef<str>>(headings: &[S]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    headings
        .iter()
        .map(|heading| {
            let heading = heading.as_ref();
            let count = seen.entry(heading).or_insert(0);
            let mut name = if *count == 0 {
                heading.to_string()
            } else {
                format!("{heading}_{count}")
            };
            while used.contains(&name) {
                *count += 1;
                name = format!("{heading}_{count}");
            }
            *count += 1;
            used.insert(name.clone());
            name
        })
        .collect()
}

/// Pad with empty values or truncate so `fields` lines up with `width`
/// headings.
pub fn fit_fields(group: &str, mut fields: Vec<String>, width: usize) -> Vec<String> {
    if fields.len() != width {
        debug!(
            "{group}: row has {} fields for {width} headings, padding/truncating",
            fields.len()
        );
        fields.resize(width, String::new());
    }
    fields
}

/// Join a continuation fragment onto an existing value.
///
/// Parts already present (compared trimmed, split on `" | "`) are skipped,
/// so applying the same continuation twice changes nothing.
pub fn join_fragment(existing: &str, fragment: &str) -> String {
    let present: Vec<&str> = split_parts(existing).collect();
    let mut out = existing.to_string();
    let mut added: Vec<&str> = Vec::new();
    for part in split_parts(fragment) {
        if present.contains(&part) || added.contains(&part) {
            continue;
        }
        if !out.is_empty() {
            out.push_str(FRAGMENT_SEPARATOR);
        }
        out.push_str(part);
        added.push(part);
    }
    out
}

fn split_parts(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(FRAGMENT_SEPARATOR)
        .map(str::trim)
        .filter(|p| !p.is_empty())
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Turn a parser's raw storage into a finalized table, or a named failure
/// when it cannot be made rectangular.
pub fn build_group(raw: RawGroup) -> Result<GroupTable, GroupFailure> {
    let RawGroup {
        name,
        headings,
        body,
        fault,
    } = raw;

    if let Some(reason) = fault {
        return Err(GroupFailure {
            group: name,
            reason,
        });
    }

    match body {
        RawBody::Columns(columns) => {
            if columns.len() != headings.len() {
                return Err(GroupFailure {
                    group: name,
                    reason: format!(
                        "{} column lists for {} headings",
                        columns.len(),
                        headings.len()
                    ),
                });
            }
            let height = columns.first().map_or(0, Vec::len);
            if let Some((heading, column)) = headings
                .iter()
                .zip(&columns)
                .find(|(_, column)| column.len() != height)
            {
                return Err(GroupFailure {
                    group: name,
                    reason: format!(
                        "column {heading} has {} values, expected {height}",
                        column.len()
                    ),
                });
            }

            let mut table = GroupTable::new(name, headings);
            for i in 0..height {
                let row: Row = table
                    .headings
                    .iter()
                    .zip(&columns)
                    .map(|(heading, column)| (heading.clone(), column[i].clone()))
                    .collect();
                table.rows.push(row);
            }
            Ok(table)
        }
        RawBody::Rows(rows) => {
            if let Some(key) = rows
                .iter()
                .flat_map(|row| row.keys())
                .find(|key| !headings.contains(key))
            {
                return Err(GroupFailure {
                    reason: format!("row value for undeclared heading {key}"),
                    group: name,
                });
            }
            Ok(GroupTable {
                name,
                headings,
                rows,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Sparse-row removal
// ---------------------------------------------------------------------------

/// Count of non-blank values in `row`, not counting the `ignore` columns.
pub fn populated_count(row: &Row, ignore: &[&str]) -> usize {
    row.iter()
        .filter(|(k, v)| !ignore.contains(&k.as_str()) && !v.trim().is_empty())
        .count()
}

/// Drop rows carrying at most one populated value outside `ignore`.
pub fn drop_sparse_rows(table: &mut GroupTable, ignore: &[&str]) {
    let before = table.rows.len();
    table.rows.retain(|row| populated_count(row, ignore) > 1);
    if table.rows.len() != before {
        debug!(
            "{}: dropped {} sparse rows",
            table.name,
            before - table.rows.len()
        );
    }
}
