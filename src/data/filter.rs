use std::collections::{BTreeMap, BTreeSet};

use crate::triaxial::StressPoint;

/// Categorical columns a stress plot can be filtered on.
pub const FILTER_COLUMNS: [&str; 3] = ["HOLE_ID", "TEST_TYPE", "SOURCE_FILE"];

// ---------------------------------------------------------------------------
// Stress-point selection by hole, test type and source file
// ---------------------------------------------------------------------------

/// Selected values of each categorical stress-point column. A point with no
/// value in a column is matched by the empty string.
pub type FilterState = BTreeMap<String, BTreeSet<String>>;

/// Distinct values of each filter column across `points`.
pub fn unique_values(points: &[StressPoint]) -> FilterState {
    FILTER_COLUMNS
        .iter()
        .map(|col| {
            let values = points
                .iter()
                .map(|p| p.column_value(col).unwrap_or("").to_string())
                .collect();
            (col.to_string(), values)
        })
        .collect()
}

/// Selection where every hole, test type and source file is ticked.
pub fn init_filter_state(points: &[StressPoint]) -> FilterState {
    unique_values(points)
}

/// Positions of the stress points a plot should show.
///
/// Columns missing from `filters`, or whose selection covers every value in
/// `points`, do not constrain. An empty selection hides every point.
pub fn filtered_indices(points: &[StressPoint], filters: &FilterState) -> Vec<usize> {
    let all = unique_values(points);
    points
        .iter()
        .enumerate()
        .filter(|(_, point)| {
            for (col, selected) in filters {
                if selected.is_empty() {
                    return false;
                }
                if all.get(col).is_some_and(|vals| vals.is_subset(selected)) {
                    continue;
                }
                let value = point.column_value(col).unwrap_or("");
                if !selected.contains(value) {
                    return false;
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}
