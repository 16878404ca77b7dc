/// A physical line after tokenizing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Zero length after trimming: a group break.
    Blank,
    Fields(Vec<String>),
}

impl Line {
    pub fn fields(&self) -> &[String] {
        match self {
            Line::Blank => &[],
            Line::Fields(fields) => fields,
        }
    }
}

/// Split one line into unquoted fields.
///
/// The canonical `"a","b","c"` form is split on the `","` boundary with
/// doubled quotes decoded. Anything else goes through a CSV reader so that
/// quoted commas stay inside their field.
pub fn tokenize(raw: &str) -> Line {
    let line = raw.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    if is_canonical(line) {
        Line::Fields(split_canonical(line))
    } else {
        Line::Fields(split_fallback(line))
    }
}

fn is_canonical(line: &str) -> bool {
    line.len() >= 2 && line.starts_with('"') && line.ends_with('"') && line.contains("\",\"")
}

fn split_canonical(line: &str) -> Vec<String> {
    line[1..line.len() - 1]
        .split("\",\"")
        .map(|field| field.replace("\"\"", "\""))
        .collect()
}

fn split_fallback(line: &str) -> Vec<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => record.iter().map(clean_field).collect(),
        _ => line.split(',').map(clean_field).collect(),
    }
}

fn clean_field(field: &str) -> String {
    field.trim().trim_matches('"').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(line: &str) -> Vec<String> {
        tokenize(line).fields().to_vec()
    }

    #[test]
    fn canonical_line_splits_on_quote_comma_quote() {
        assert_eq!(fields(r#""a","b","c""#), vec!["a", "b", "c"]);
        assert_eq!(
            fields(r#""HEADING","LOCA_ID","""quoted""""#),
            vec!["HEADING", "LOCA_ID", "\"quoted\""]
        );
    }

    #[test]
    fn canonical_line_keeps_inner_commas() {
        assert_eq!(fields(r#""CLAY, soft","1.5""#), vec!["CLAY, soft", "1.5"]);
    }

    #[test]
    fn fallback_respects_quoted_commas() {
        assert_eq!(fields(r#"DATA,"soft, grey",2"#), vec!["DATA", "soft, grey", "2"]);
        assert_eq!(fields("GROUP,LOCA"), vec!["GROUP", "LOCA"]);
        assert_eq!(fields(r#""a", "b""#), vec!["a", "b"]);
    }

    #[test]
    fn single_quoted_field() {
        assert_eq!(fields(r#""**PROJ""#), vec!["**PROJ"]);
    }

    #[test]
    fn blank_lines_are_group_breaks() {
        assert_eq!(tokenize(""), Line::Blank);
        assert_eq!(tokenize("   \t"), Line::Blank);
        assert!(tokenize("\r").fields().is_empty());
    }

    #[test]
    fn trailing_whitespace_is_ignored() {
        assert_eq!(fields("\"x\",\"y\"\r"), vec!["x", "y"]);
    }
}
