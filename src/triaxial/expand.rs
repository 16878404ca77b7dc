use crate::data::model::{GroupTable, Row, FRAGMENT_SEPARATOR};

/// Trim the `" | "` parts of a cell and drop empty and repeated ones.
pub fn dedup_cell(cell: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in cell.split(FRAGMENT_SEPARATOR).map(str::trim) {
        if !part.is_empty() && !parts.contains(&part) {
            parts.push(part);
        }
    }
    parts.join(FRAGMENT_SEPARATOR)
}

pub fn dedup_cells(table: &mut GroupTable) {
    for row in &mut table.rows {
        for value in row.values_mut() {
            if value.contains(FRAGMENT_SEPARATOR) || value.as_str() != value.trim() {
                let cleaned = dedup_cell(value);
                *value = cleaned;
            }
        }
    }
}

/// Split multi-valued cells into separate rows.
///
/// A row whose longest cell holds N parts becomes N rows; part `i` of each
/// cell goes to row `i` and shorter cells are padded with empty text.
pub fn expand_rows(table: &GroupTable) -> GroupTable {
    let mut out = GroupTable::new(table.name.clone(), table.headings.clone());
    for row in &table.rows {
        let split: Vec<(&String, Vec<&str>)> = table
            .headings
            .iter()
            .map(|h| {
                let value = row.get(h).map(String::as_str).unwrap_or("");
                (h, value.split(FRAGMENT_SEPARATOR).collect())
            })
            .collect();
        let height = split.iter().map(|(_, parts)| parts.len()).max().unwrap_or(1);

        for i in 0..height {
            let new_row: Row = split
                .iter()
                .map(|(h, parts)| {
                    let part = parts.get(i).copied().unwrap_or("");
                    ((*h).clone(), part.to_string())
                })
                .collect();
            out.rows.push(new_row);
        }
    }
    out
}
