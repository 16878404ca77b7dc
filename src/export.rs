//! CSV output for merged groups and stress points.

use std::io::Write;

use anyhow::Result;

use crate::data::model::GroupTable;
use crate::triaxial::StressPoint;

/// Header of [`write_stress_csv`], matching `StressPoint`'s serialized names.
pub const STRESS_COLUMNS: [&str; 11] = [
    "HOLE_ID",
    "SPEC_DEPTH",
    "TEST_TYPE",
    "CELL",
    "PWPF",
    "DEVF",
    "s_total",
    "s_effective",
    "s",
    "t",
    "SOURCE_FILE",
];

pub fn write_group_csv<W: Write>(table: &GroupTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.headings)?;
    for i in 0..table.len() {
        wtr.write_record(table.headings.iter().map(|h| table.value(i, h)))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Missing numbers are written as empty fields. The header is written even
/// when there are no points.
pub fn write_stress_csv<'a, W, I>(points: I, writer: W) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a StressPoint>,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(STRESS_COLUMNS)?;
    for point in points {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    Ok(())
}
