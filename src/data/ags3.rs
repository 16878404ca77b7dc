use log::warn;

use super::table::{dedup_headings, fit_fields, RawBody, RawGroup};
use super::tokenizer::{tokenize, Line};

/// Continuation token shared by both dialects.
pub const CONTINUATION: &str = "<CONT>";

/// HTML-escaped spelling of the continuation token seen in some exports.
const ESCAPED_CONTINUATION: &str = "&lt;CONT&gt;";

/// Whether a first field is the continuation token, literal or escaped.
pub fn is_continuation(field: &str) -> bool {
    let field = field.trim();
    field.eq_ignore_ascii_case(CONTINUATION) || field.eq_ignore_ascii_case(ESCAPED_CONTINUATION)
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// An AGS3 line, classified by its first field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ags3Line {
    /// `**NAME`
    Group(String),
    /// `*H1`, `*H2`, … with the star stripped.
    Heading(Vec<String>),
    /// Fields after the `<CONT>` token.
    Continuation(Vec<String>),
    Break,
    Data(Vec<String>),
}

pub fn classify(line: Line) -> Ags3Line {
    let fields = match line {
        Line::Blank => return Ags3Line::Break,
        Line::Fields(fields) => fields,
    };
    let first = fields.first().map(String::as_str).unwrap_or("");

    if let Some(name) = first.strip_prefix("**") {
        Ags3Line::Group(name.to_string())
    } else if first.starts_with('*') {
        Ags3Line::Heading(
            fields
                .iter()
                .map(|f| f.strip_prefix('*').unwrap_or(f).to_string())
                .collect(),
        )
    } else if is_continuation(first) {
        Ags3Line::Continuation(fields[1..].to_vec())
    } else if fields.len() == 1 && first.is_empty() {
        Ags3Line::Break
    } else {
        Ags3Line::Data(fields)
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Parser state carried from one line to the next.
#[derive(Debug, Default)]
pub struct Ags3Parser {
    current_group: Option<String>,
    /// Headings as declared, before dedup; grows across split header lines.
    declared_headings: Vec<String>,
    header_row_count: usize,
    groups: Vec<RawGroup>,
}

impl Ags3Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_group(&self) -> Option<&str> {
        self.current_group.as_deref()
    }

    pub fn header_row_count(&self) -> usize {
        self.header_row_count
    }

    /// Apply one classified line.
    pub fn step(&mut self, line: Ags3Line) {
        match line {
            Ags3Line::Group(name) => self.begin_group(name),
            Ags3Line::Heading(names) => self.add_headings(names),
            Ags3Line::Continuation(values) => self.continue_row(values),
            Ags3Line::Break => {}
            Ags3Line::Data(values) => self.push_data(values),
        }
    }

    /// Groups in the order they were declared.
    pub fn finish(self) -> Vec<RawGroup> {
        self.groups
    }

    fn begin_group(&mut self, name: String) {
        if let Some(pos) = self.groups.iter().position(|g| g.name == name) {
            warn!("AGS3 group {name} declared again, earlier rows discarded");
            self.groups.remove(pos);
        }
        self.groups.push(RawGroup::columns(name.clone()));
        self.current_group = Some(name);
        self.declared_headings.clear();
        self.header_row_count = 0;
    }

    fn current_mut(&mut self) -> Option<&mut RawGroup> {
        let name = self.current_group.as_deref()?;
        self.groups.iter_mut().rev().find(|g| g.name == name)
    }

    fn add_headings(&mut self, names: Vec<String>) {
        if self.current_group.is_none() {
            warn!("AGS3 heading line outside any group ignored");
            return;
        }
        self.header_row_count += 1;
        if self.header_row_count == 1 {
            self.declared_headings = names;
        } else {
            self.declared_headings.extend(names);
        }
        let headings = dedup_headings(&self.declared_headings);

        let Some(group) = self.current_mut() else {
            return;
        };
        if group.row_count() > 0 {
            group.mark_faulty("heading line after data rows");
            return;
        }
        group.body = RawBody::Columns(vec![Vec::new(); headings.len()]);
        group.headings = headings;
    }

    fn push_data(&mut self, values: Vec<String>) {
        let Some(group) = self.current_mut() else {
            warn!("AGS3 data line outside any group ignored");
            return;
        };
        if group.headings.is_empty() {
            group.mark_faulty("data row before heading line");
            return;
        }
        let values = fit_fields(&group.name, values, group.headings.len());
        if let RawBody::Columns(columns) = &mut group.body {
            for (column, value) in columns.iter_mut().zip(values) {
                column.push(value);
            }
        }
    }

    /// Field `i` after the token extends heading `i + 1`; the token itself
    /// occupies the first column.
    fn continue_row(&mut self, values: Vec<String>) {
        let Some(group) = self.current_mut() else {
            warn!("AGS3 continuation outside any group ignored");
            return;
        };
        if group.row_count() == 0 {
            warn!("{}: continuation line with no preceding row ignored", group.name);
            return;
        }
        if let RawBody::Columns(columns) = &mut group.body {
            for (column, value) in columns.iter_mut().skip(1).zip(values) {
                if let Some(last) = column.last_mut() {
                    last.push_str(&value);
                }
            }
        }
    }
}

/// Run the AGS3 state machine over decoded text.
pub fn parse(text: &str) -> Vec<RawGroup> {
    let mut parser = Ags3Parser::new();
    for raw in text.lines() {
        parser.step(classify(tokenize(raw)));
    }
    parser.finish()
}
