use super::model::{Dialect, FormatReport};
use super::tokenizer::{tokenize, Line};

/// Fingerprint a decoded file.
///
/// The first line declaring a group decides the dialect: a bare `GROUP`
/// descriptor means AGS4, a `**` prefixed name means AGS3. The scan then
/// continues only to look for the hole-location group, which never
/// influences parsing.
pub fn detect_format(text: &str) -> FormatReport {
    let mut dialect = None;
    let mut has_location_group = false;

    for raw in text.lines() {
        let trimmed = raw.trim_start();
        if !looks_like_group_line(trimmed) {
            continue;
        }
        let Line::Fields(fields) = tokenize(trimmed) else {
            continue;
        };
        let Some(first) = fields.first().map(String::as_str) else {
            continue;
        };

        let line_dialect = if first == "GROUP" {
            Dialect::Ags4
        } else if first.starts_with("**") {
            Dialect::Ags3
        } else {
            continue;
        };

        let current = *dialect.get_or_insert(line_dialect);
        if current != line_dialect {
            continue;
        }
        has_location_group = has_location_group
            || match current {
                Dialect::Ags3 => first == "**HOLE",
                Dialect::Ags4 => fields.get(1).map(String::as_str) == Some("LOCA"),
            };
        if has_location_group {
            break;
        }
    }

    FormatReport {
        dialect,
        has_location_group,
    }
}

fn looks_like_group_line(line: &str) -> bool {
    line.starts_with("\"GROUP\"")
        || line.starts_with("GROUP")
        || line.starts_with("\"**")
        || line.starts_with("**")
}
