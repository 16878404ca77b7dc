use super::model::{Dialect, GroupTable, ParsedFile};

/// Write a parsed file back to AGS text in its own dialect.
///
/// Column order comes from each table's heading sequence. Continuation
/// lines are not reconstructed; joined values are written as one field.
///
/// Parsing the output gives back the same tables except for AGS3 rows whose
/// first value begins with `*` or is a continuation token (they read back as
/// headings or continuations), and single-column AGS3 rows holding an empty
/// value (they read back as a group break).
pub fn render_ags(parsed: &ParsedFile) -> String {
    render_tables(parsed.dialect, parsed.groups.values())
}

pub fn render_tables<'a, I>(dialect: Dialect, tables: I) -> String
where
    I: IntoIterator<Item = &'a GroupTable>,
{
    let mut out = String::new();
    for table in tables {
        if !out.is_empty() {
            out.push_str("\r\n");
        }
        match dialect {
            Dialect::Ags3 => render_ags3(table, &mut out),
            Dialect::Ags4 => render_ags4(table, &mut out),
        }
    }
    out
}

fn render_ags3(table: &GroupTable, out: &mut String) {
    push_line(out, [format!("**{}", table.name)]);
    push_line(out, table.headings.iter().map(|h| format!("*{h}")));
    for i in 0..table.len() {
        push_line(out, table.headings.iter().map(|h| table.value(i, h).to_string()));
    }
}

fn render_ags4(table: &GroupTable, out: &mut String) {
    let blanks = || std::iter::repeat(String::new()).take(table.headings.len());

    push_line(out, ["GROUP".to_string(), table.name.clone()]);
    push_line(
        out,
        std::iter::once("HEADING".to_string()).chain(table.headings.iter().cloned()),
    );
    push_line(out, std::iter::once("UNIT".to_string()).chain(blanks()));
    push_line(out, std::iter::once("TYPE".to_string()).chain(blanks()));
    for i in 0..table.len() {
        push_line(
            out,
            std::iter::once("DATA".to_string())
                .chain(table.headings.iter().map(|h| table.value(i, h).to_string())),
        );
    }
}

fn push_line<I>(out: &mut String, fields: I)
where
    I: IntoIterator<Item = String>,
{
    let quoted: Vec<String> = fields
        .into_iter()
        .map(|f| format!("\"{}\"", f.replace('"', "\"\"")))
        .collect();
    out.push_str(&quoted.join(","));
    out.push_str("\r\n");
}
