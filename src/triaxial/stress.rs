use std::fmt;

use serde::{Deserialize, Serialize};

use super::join::TriaxialRecord;

/// Which mean stress `s` reports.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StressMode {
    /// s' = (σ3 − u) + q/2
    #[default]
    Effective,
    /// s = σ3 + q/2
    Total,
}

impl fmt::Display for StressMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StressMode::Effective => write!(f, "effective"),
            StressMode::Total => write!(f, "total"),
        }
    }
}

// ---------------------------------------------------------------------------
// StressValues – the three derived quantities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StressValues {
    pub t: Option<f64>,
    pub s_total: Option<f64>,
    pub s_effective: Option<f64>,
}

impl StressValues {
    /// `t = DEVF / 2`, `s_total = CELL + t`, `s_effective = (CELL − PWPF) + t`.
    /// Each value is missing when any of its inputs is.
    pub fn compute(cell: Option<f64>, devf: Option<f64>, pwpf: Option<f64>) -> Self {
        let t = devf.map(|q| q / 2.0);
        let s_total = cell.zip(t).map(|(sigma3, t)| sigma3 + t);
        let s_effective = cell
            .zip(pwpf)
            .zip(t)
            .map(|((sigma3, u), t)| (sigma3 - u) + t);
        StressValues {
            t,
            s_total,
            s_effective,
        }
    }

    pub fn s(&self, mode: StressMode) -> Option<f64> {
        match mode {
            StressMode::Effective => self.s_effective,
            StressMode::Total => self.s_total,
        }
    }
}

// ---------------------------------------------------------------------------
// StressPoint – one plotted test
// ---------------------------------------------------------------------------

/// Serialized column names follow the AGS summary convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressPoint {
    #[serde(rename = "HOLE_ID")]
    pub hole_id: String,
    #[serde(rename = "SPEC_DEPTH")]
    pub spec_depth: Option<f64>,
    #[serde(rename = "TEST_TYPE")]
    pub test_type: Option<String>,
    #[serde(rename = "CELL")]
    pub cell: Option<f64>,
    #[serde(rename = "PWPF")]
    pub pwpf: Option<f64>,
    #[serde(rename = "DEVF")]
    pub devf: Option<f64>,
    pub s_total: Option<f64>,
    pub s_effective: Option<f64>,
    pub s: Option<f64>,
    pub t: Option<f64>,
    #[serde(rename = "SOURCE_FILE")]
    pub source_file: Option<String>,
}

impl StressPoint {
    pub fn from_record(record: &TriaxialRecord, mode: StressMode) -> Self {
        let values = StressValues::compute(record.cell, record.devf, record.pwpf);
        StressPoint {
            hole_id: record.hole_id.clone(),
            spec_depth: record.spec_depth,
            test_type: record.test_type().map(str::to_string),
            cell: record.cell,
            pwpf: record.pwpf,
            devf: record.devf,
            s_total: values.s_total,
            s_effective: values.s_effective,
            s: values.s(mode),
            t: values.t,
            source_file: record.source_file.clone(),
        }
    }

    /// Text of a categorical column, for filtering.
    pub fn column_value(&self, column: &str) -> Option<&str> {
        match column {
            "HOLE_ID" => Some(self.hole_id.as_str()),
            "TEST_TYPE" => self.test_type.as_deref(),
            "SOURCE_FILE" => self.source_file.as_deref(),
            _ => None,
        }
    }
}

pub fn compute_s_t(records: &[TriaxialRecord], mode: StressMode) -> Vec<StressPoint> {
    records
        .iter()
        .map(|r| StressPoint::from_record(r, mode))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;

    fn record(cell: Option<f64>, devf: Option<f64>, pwpf: Option<f64>) -> TriaxialRecord {
        TriaxialRecord {
            hole_id: "BH1".into(),
            spec_depth: Some(1.5),
            trig_type: Some("UU".into()),
            treg_type: None,
            cell,
            devf,
            pwpf,
            source_file: Some("a.ags".into()),
            fields: Row::new(),
        }
    }

    #[test]
    fn stress_path_values() {
        let v = StressValues::compute(Some(100.0), Some(40.0), Some(20.0));
        assert_eq!(v.t, Some(20.0));
        assert_eq!(v.s_total, Some(120.0));
        assert_eq!(v.s_effective, Some(100.0));
        assert_eq!(v.s(StressMode::Effective), Some(100.0));
        assert_eq!(v.s(StressMode::Total), Some(120.0));
    }

    #[test]
    fn missing_inputs_propagate() {
        let no_pwp = StressValues::compute(Some(100.0), Some(40.0), None);
        assert_eq!(no_pwp.t, Some(20.0));
        assert_eq!(no_pwp.s_total, Some(120.0));
        assert_eq!(no_pwp.s_effective, None);

        let no_devf = StressValues::compute(Some(100.0), None, Some(20.0));
        assert_eq!(no_devf, StressValues::default());
    }

    #[test]
    fn points_follow_mode() {
        let records = vec![record(Some(100.0), Some(40.0), Some(20.0))];
        let eff = compute_s_t(&records, StressMode::Effective);
        let tot = compute_s_t(&records, StressMode::Total);
        assert_eq!(eff[0].s, Some(100.0));
        assert_eq!(tot[0].s, Some(120.0));
        assert_eq!(eff[0].test_type.as_deref(), Some("UU"));
        assert_eq!(eff[0].column_value("SOURCE_FILE"), Some("a.ags"));
        assert_eq!(eff[0].column_value("CELL"), None);
    }
}
