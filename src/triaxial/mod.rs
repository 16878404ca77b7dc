//! Triaxial summary and s–t stress-path derivation.
//!
//! ```text
//!  merged groups (SAMP, CLSS, TRIG, TREG, TRIX, TRET)
//!        │  key normalization, outer join chain, result coalescing
//!        ▼
//!   summary table ──► cell dedup ──► row expansion ──► sparse-row drop
//!        │
//!        ▼
//!   TriaxialRecord (numeric CELL / DEVF / PWPF)
//!        │
//!        ▼
//!   StressPoint (t, s_total, s_effective, s)
//! ```

pub mod expand;
pub mod join;
pub mod stress;

pub use join::{generate_triaxial_table, TriaxialRecord, TriaxialSummary};
pub use stress::{compute_s_t, StressMode, StressPoint, StressValues};

/// Parse a cell as a finite number. Blank or non-numeric text is `None`.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_is_fallible_not_panicking() {
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("kPa"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }
}
