use std::collections::BTreeMap;

use super::model::{GroupTable, ParsedFile, SOURCE_COLUMN};
use super::table::drop_sparse_rows;

/// Union same-named groups across files, stamping each row with its source.
///
/// Files are taken in order and each table keeps its own row order. The
/// merged heading sequence is the first-seen order of every heading with
/// `SOURCE_FILE` last. Rows left with at most one populated value besides
/// the source tag are dropped.
pub fn merge_groups<'a, I>(files: I) -> BTreeMap<String, GroupTable>
where
    I: IntoIterator<Item = (&'a str, &'a BTreeMap<String, GroupTable>)>,
{
    let mut merged: BTreeMap<String, GroupTable> = BTreeMap::new();

    for (source, groups) in files {
        for (name, table) in groups {
            if table.is_empty() {
                continue;
            }
            let target = merged
                .entry(name.clone())
                .or_insert_with(|| GroupTable::new(name.clone(), Vec::new()));
            for heading in &table.headings {
                if heading != SOURCE_COLUMN {
                    target.ensure_heading(heading);
                }
            }
            for row in &table.rows {
                let mut row = row.clone();
                row.insert(SOURCE_COLUMN.to_string(), source.to_string());
                target.rows.push(row);
            }
        }
    }

    for table in merged.values_mut() {
        table.headings.retain(|h| h != SOURCE_COLUMN);
        table.headings.push(SOURCE_COLUMN.to_string());
        drop_sparse_rows(table, &[SOURCE_COLUMN]);
    }
    merged
}

/// [`merge_groups`] over parsed files, tagging rows with each file's source.
pub fn merge_files(files: &[ParsedFile]) -> BTreeMap<String, GroupTable> {
    merge_groups(files.iter().map(|f| (f.source.as_str(), &f.groups)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;

    fn hole_table(ids: &[&str]) -> BTreeMap<String, GroupTable> {
        let mut table = GroupTable::new("HOLE", vec!["HOLE_ID".into(), "HOLE_TYPE".into()]);
        for id in ids {
            let row: Row = [("HOLE_ID", *id), ("HOLE_TYPE", "CP")]
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            table.rows.push(row);
        }
        BTreeMap::from([("HOLE".to_string(), table)])
    }

    #[test]
    fn rows_are_concatenated_in_file_order_with_source() {
        let a = hole_table(&["BH1", "BH2", "BH3"]);
        let b = hole_table(&["BH4", "BH5"]);
        let merged = merge_groups([("a.ags", &a), ("b.ags", &b)]);

        let hole = &merged["HOLE"];
        assert_eq!(hole.len(), 5);
        assert_eq!(hole.headings, vec!["HOLE_ID", "HOLE_TYPE", "SOURCE_FILE"]);
        let sources: Vec<&str> = (0..5).map(|i| hole.value(i, SOURCE_COLUMN)).collect();
        assert_eq!(sources, vec!["a.ags", "a.ags", "a.ags", "b.ags", "b.ags"]);
        assert_eq!(hole.value(3, "HOLE_ID"), "BH4");
    }

    #[test]
    fn sparse_rows_are_removed_after_tagging() {
        let mut a = hole_table(&["BH1"]);
        let mut lonely = Row::new();
        lonely.insert("HOLE_ID".into(), "BH9".into());
        a.get_mut("HOLE").unwrap().rows.push(lonely);

        let merged = merge_groups([("a.ags", &a)]);
        assert_eq!(merged["HOLE"].len(), 1);
    }

    #[test]
    fn headings_are_unioned() {
        let a = hole_table(&["BH1"]);
        let mut b = hole_table(&["BH2"]);
        let table = b.get_mut("HOLE").unwrap();
        table.headings.push("HOLE_GL".into());
        table.rows[0].insert("HOLE_GL".into(), "12.5".into());

        let merged = merge_groups([("a.ags", &a), ("b.ags", &b)]);
        assert_eq!(
            merged["HOLE"].headings,
            vec!["HOLE_ID", "HOLE_TYPE", "HOLE_GL", "SOURCE_FILE"]
        );
        assert_eq!(merged["HOLE"].value(0, "HOLE_GL"), "");
    }
}
