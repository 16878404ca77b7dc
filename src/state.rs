use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};
use serde::Serialize;

use crate::data::filter::{filtered_indices, init_filter_state, unique_values, FilterState};
use crate::data::loader::{parse_bytes, ParseOptions};
use crate::data::merge::merge_files;
use crate::data::model::{FormatReport, GroupFailure, GroupTable, ParsedFile};
use crate::triaxial::{
    compute_s_t, generate_triaxial_table, StressMode, StressPoint, TriaxialSummary,
};

// ---------------------------------------------------------------------------
// Per-file outcome
// ---------------------------------------------------------------------------

/// What happened to one input file. `error` is set only when the file was
/// not parsed at all.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub source: String,
    pub report: Option<FormatReport>,
    pub failures: Vec<GroupFailure>,
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// A batch of files and everything derived from them, independent of how it
/// is presented.
#[derive(Debug, Default)]
pub struct Session {
    pub options: ParseOptions,

    /// Which mean stress the `s` column reports.
    pub mode: StressMode,

    /// Successfully parsed files, in upload order.
    pub files: Vec<ParsedFile>,

    /// One entry per `add_file` call, including rejected files.
    pub reports: Vec<FileReport>,

    merged: BTreeMap<String, GroupTable>,
    summary: Option<TriaxialSummary>,
    points: Vec<StressPoint>,

    /// Ticked values per categorical column of the stress points.
    pub filters: FilterState,

    /// Stress points shown under `filters`; kept in step by `refilter`.
    pub visible_indices: Vec<usize>,
}

impl Session {
    pub fn new(options: ParseOptions, mode: StressMode) -> Self {
        Self {
            options,
            mode,
            ..Self::default()
        }
    }

    /// Parse one file and fold it into the batch. A file in an unknown
    /// format is recorded in `reports` and otherwise ignored.
    pub fn add_file(&mut self, source: &str, bytes: &[u8]) {
        match parse_bytes(source, bytes, &self.options) {
            Ok(parsed) => {
                info!(
                    "{source}: {} groups, {} faulty",
                    parsed.groups.len(),
                    parsed.failures.len()
                );
                self.reports.push(FileReport {
                    source: source.to_string(),
                    report: Some(parsed.report()),
                    failures: parsed.failures.clone(),
                    error: None,
                });
                self.files.push(parsed);
                self.rebuild();
            }
            Err(e) => {
                warn!("{e}");
                self.reports.push(FileReport {
                    source: source.to_string(),
                    report: None,
                    failures: Vec::new(),
                    error: Some(e.to_string()),
                });
            }
        }
    }

    pub fn merged(&self) -> &BTreeMap<String, GroupTable> {
        &self.merged
    }

    /// `None` until at least one file was parsed.
    pub fn triaxial(&self) -> Option<&TriaxialSummary> {
        self.summary.as_ref()
    }

    pub fn stress_points(&self) -> &[StressPoint] {
        &self.points
    }

    pub fn visible_points(&self) -> impl Iterator<Item = &StressPoint> {
        self.visible_indices.iter().filter_map(|&i| self.points.get(i))
    }

    /// Recompute merge, summary and points from `files`. Filters are reset
    /// to "everything selected".
    fn rebuild(&mut self) {
        self.merged = merge_files(&self.files);
        let summary = generate_triaxial_table(&self.merged);
        self.points = compute_s_t(&summary.records, self.mode);
        self.summary = Some(summary);
        self.filters = init_filter_state(&self.points);
        self.visible_indices = (0..self.points.len()).collect();
    }

    /// Switch between total and effective `s`; filters are kept.
    pub fn set_mode(&mut self, mode: StressMode) {
        self.mode = mode;
        if let Some(summary) = &self.summary {
            self.points = compute_s_t(&summary.records, mode);
        }
        self.refilter();
    }

    /// Re-evaluate which stress points `filters` lets through.
    pub fn refilter(&mut self) {
        self.visible_indices = filtered_indices(&self.points, &self.filters);
    }

    /// Tick or untick one hole, test type or source file.
    pub fn toggle_filter_value(&mut self, column: &str, value: &str) {
        let selected = self.filters.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Tick every value of `column` present among the stress points.
    pub fn select_all(&mut self, column: &str) {
        if let Some(all_vals) = unique_values(&self.points).remove(column) {
            self.filters.insert(column.to_string(), all_vals);
            self.refilter();
        }
    }

    /// Untick `column` entirely, hiding every point.
    pub fn select_none(&mut self, column: &str) {
        self.filters.insert(column.to_string(), BTreeSet::new());
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\"GROUP\",\"SAMP\"\n\
\"HEADING\",\"LOCA_ID\",\"SAMP_ID\",\"SPEC_DPTH\"\n\
\"DATA\",\"BH1\",\"S1\",\"1.5\"\n\
\"DATA\",\"BH2\",\"S2\",\"2.0\"\n\
\"GROUP\",\"TREG\"\n\
\"HEADING\",\"LOCA_ID\",\"SPEC_DPTH\",\"TREG_TYPE\"\n\
\"DATA\",\"BH1\",\"1.5\",\"CU\"\n\
\"DATA\",\"BH2\",\"2.0\",\"CD\"\n\
\"GROUP\",\"TRET\"\n\
\"HEADING\",\"LOCA_ID\",\"SPEC_DPTH\",\"TRET_CELL\",\"TRET_DEVF\",\"TRET_PWPF\"\n\
\"DATA\",\"BH1\",\"1.5\",\"100\",\"40\",\"20\"\n\
\"DATA\",\"BH2\",\"2.0\",\"200\",\"80\",\"50\"\n";

    fn session() -> Session {
        let mut s = Session::default();
        s.add_file("site.ags", SAMPLE.as_bytes());
        s
    }

    #[test]
    fn add_file_builds_points() {
        let s = session();
        assert_eq!(s.reports.len(), 1);
        assert!(s.reports[0].error.is_none());
        assert_eq!(s.stress_points().len(), 2);
        assert_eq!(s.visible_indices, vec![0, 1]);
        let bh1 = &s.stress_points()[0];
        assert_eq!(bh1.test_type.as_deref(), Some("CU"));
        assert_eq!(bh1.s, Some(100.0));
        assert_eq!(bh1.t, Some(20.0));
    }

    #[test]
    fn rejected_file_is_reported_not_merged() {
        let mut s = session();
        s.add_file("readme.txt", b"no groups here\n");
        assert_eq!(s.reports.len(), 2);
        assert!(s.reports[1].error.is_some());
        assert_eq!(s.files.len(), 1);
        assert_eq!(s.stress_points().len(), 2);
    }

    #[test]
    fn mode_switch_recomputes_s() {
        let mut s = session();
        s.set_mode(StressMode::Total);
        assert_eq!(s.stress_points()[0].s, Some(120.0));
        assert_eq!(s.visible_indices.len(), 2);
    }

    #[test]
    fn filter_toggles() {
        let mut s = session();
        s.toggle_filter_value("HOLE_ID", "BH1");
        let holes: Vec<_> = s.visible_points().map(|p| p.hole_id.as_str()).collect();
        assert_eq!(holes, vec!["BH2"]);

        s.select_none("TEST_TYPE");
        assert!(s.visible_indices.is_empty());

        s.select_all("TEST_TYPE");
        s.select_all("HOLE_ID");
        assert_eq!(s.visible_indices, vec![0, 1]);
    }
}
