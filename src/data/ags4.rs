use log::{debug, warn};

use super::ags3::{is_continuation, CONTINUATION};
use super::model::Row;
use super::table::{dedup_headings, fit_fields, join_fragment, RawBody, RawGroup};
use super::tokenizer::{tokenize, Line};

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// An AGS4 line, classified by its descriptor. Payloads exclude the
/// descriptor itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ags4Line {
    Group(String),
    Heading(Vec<String>),
    Unit,
    Type,
    Data(Vec<String>),
    Continuation(Vec<String>),
    /// No recognised descriptor: a candidate raw data row.
    Other(Vec<String>),
    Blank,
}

pub fn classify(line: Line) -> Ags4Line {
    let fields = match line {
        Line::Blank => return Ags4Line::Blank,
        Line::Fields(fields) => fields,
    };
    let descriptor = fields
        .first()
        .map(|f| normalize_descriptor(f))
        .unwrap_or_default();

    match descriptor.as_str() {
        "GROUP" => Ags4Line::Group(fields.get(1).cloned().unwrap_or_default()),
        "HEADING" => Ags4Line::Heading(tail(fields)),
        "UNIT" => Ags4Line::Unit,
        "TYPE" => Ags4Line::Type,
        "DATA" => Ags4Line::Data(tail(fields)),
        CONTINUATION => Ags4Line::Continuation(tail(fields)),
        "" if fields.len() <= 1 => Ags4Line::Blank,
        _ => Ags4Line::Other(fields),
    }
}

fn tail(mut fields: Vec<String>) -> Vec<String> {
    if !fields.is_empty() {
        fields.remove(0);
    }
    fields
}

/// Upper-case the descriptor and fold the escaped continuation token onto
/// the literal one.
fn normalize_descriptor(field: &str) -> String {
    if is_continuation(field) {
        CONTINUATION.to_string()
    } else {
        field.trim().to_ascii_uppercase()
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Ags4Parser {
    current_group: Option<String>,
    headings: Vec<String>,
    groups: Vec<RawGroup>,
}

impl Ags4Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_group(&self) -> Option<&str> {
        self.current_group.as_deref()
    }

    pub fn headings(&self) -> &[String] {
        &self.headings
    }

    pub fn step(&mut self, line: Ags4Line) {
        match line {
            Ags4Line::Group(name) => self.begin_group(name),
            Ags4Line::Heading(names) => self.set_headings(names),
            Ags4Line::Unit | Ags4Line::Type | Ags4Line::Blank => {}
            Ags4Line::Data(values) => self.push_data(values),
            Ags4Line::Continuation(values) => self.continue_row(values),
            Ags4Line::Other(values) => self.push_fallback(values),
        }
    }

    pub fn finish(self) -> Vec<RawGroup> {
        self.groups
    }

    fn begin_group(&mut self, name: String) {
        self.headings.clear();
        if name.is_empty() {
            warn!("AGS4 GROUP line without a name ignored");
            self.current_group = None;
            return;
        }
        if !self.groups.iter().any(|g| g.name == name) {
            self.groups.push(RawGroup::rows(name.clone()));
        }
        self.current_group = Some(name);
    }

    fn current_mut(&mut self) -> Option<&mut RawGroup> {
        let name = self.current_group.as_deref()?;
        self.groups.iter_mut().find(|g| g.name == name)
    }

    fn set_headings(&mut self, names: Vec<String>) {
        let headings = dedup_headings(&names);
        let Some(group) = self.current_mut() else {
            warn!("AGS4 HEADING line outside any group ignored");
            return;
        };
        // A group declared twice keeps one heading sequence.
        for heading in &headings {
            if !group.headings.contains(heading) {
                group.headings.push(heading.clone());
            }
        }
        self.headings = headings;
    }

    fn push_data(&mut self, values: Vec<String>) {
        let headings = self.headings.clone();
        let Some(group) = self.current_mut() else {
            warn!("AGS4 DATA line outside any group ignored");
            return;
        };
        if headings.is_empty() {
            group.mark_faulty("DATA row before HEADING line");
            return;
        }
        let values = fit_fields(&group.name, values, headings.len());
        push_row(group, zip_row(&headings, values));
    }

    fn push_fallback(&mut self, values: Vec<String>) {
        let headings = self.headings.clone();
        let Some(group) = self.current_mut() else {
            debug!("unrecognised line outside any group skipped");
            return;
        };
        if headings.is_empty() || values.len() < headings.len() {
            debug!(
                "{}: unrecognised line with {} fields skipped",
                group.name,
                values.len()
            );
            return;
        }
        push_row(group, zip_row(&headings, values));
    }

    fn continue_row(&mut self, values: Vec<String>) {
        let headings = self.headings.clone();
        let Some(group) = self.current_mut() else {
            warn!("AGS4 continuation outside any group ignored");
            return;
        };
        let name = group.name.clone();
        let last = match &mut group.body {
            RawBody::Rows(rows) => rows.last_mut(),
            RawBody::Columns(_) => None,
        };
        let Some(last) = last.filter(|_| !headings.is_empty()) else {
            warn!("{name}: continuation line with no preceding row ignored");
            return;
        };
        for (heading, value) in headings.iter().zip(values) {
            if value.is_empty() {
                continue;
            }
            let existing = last.get(heading).map(String::as_str).unwrap_or("");
            let joined = join_fragment(existing, &value);
            last.insert(heading.clone(), joined);
        }
    }
}

fn zip_row(headings: &[String], values: Vec<String>) -> Row {
    headings.iter().cloned().zip(values).collect()
}

fn push_row(group: &mut RawGroup, row: Row) {
    if let RawBody::Rows(rows) = &mut group.body {
        rows.push(row);
    }
}

/// Run the AGS4 state machine over decoded text.
pub fn parse(text: &str) -> Vec<RawGroup> {
    let mut parser = Ags4Parser::new();
    for raw in text.lines() {
        parser.step(classify(tokenize(raw)));
    }
    parser.finish()
}
