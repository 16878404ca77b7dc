use anyhow::{Context, Result};

use ags_triax::data::writer::render_tables;
use ags_triax::{Dialect, GroupTable, Row};

/// Minimal deterministic PRNG (splitmix64)
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[lo, hi)`.
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + (hi - lo) * unit
    }
}

fn table(name: &str, headings: &[&str]) -> GroupTable {
    GroupTable::new(name, headings.iter().map(|h| h.to_string()).collect())
}

fn row(pairs: &[(&str, String)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let holes = ["BH01", "BH02", "BH03"];
    let depths = [1.5, 3.0, 4.5, 6.0];
    let test_types = ["UU", "CU", "CD"];

    let mut proj = table("PROJ", &["PROJ_ID", "PROJ_NAME"]);
    proj.push_row(row(&[
        ("PROJ_ID", "P001".to_string()),
        ("PROJ_NAME", "Sample triaxial campaign".to_string()),
    ]));

    let mut loca = table("LOCA", &["LOCA_ID", "LOCA_TYPE", "LOCA_FDEP"]);
    let mut samp = table(
        "SAMP",
        &["LOCA_ID", "SAMP_TOP", "SAMP_REF", "SAMP_ID", "SPEC_DPTH", "SAMP_DESC"],
    );
    let mut treg = table("TREG", &["LOCA_ID", "SPEC_DPTH", "TREG_TYPE"]);
    let mut tret = table(
        "TRET",
        &["LOCA_ID", "SPEC_DPTH", "TRET_CELL", "TRET_DEVF", "TRET_PWPF"],
    );

    let mut n = 0;
    for (h, hole) in holes.iter().enumerate() {
        loca.push_row(row(&[
            ("LOCA_ID", hole.to_string()),
            ("LOCA_TYPE", "CP".to_string()),
            ("LOCA_FDEP", "10.00".to_string()),
        ]));

        for (d, &depth) in depths.iter().enumerate() {
            let spec_depth = format!("{depth:.2}");
            samp.push_row(row(&[
                ("LOCA_ID", hole.to_string()),
                ("SAMP_TOP", format!("{:.2}", depth - 0.25)),
                ("SAMP_REF", format!("U{}", d + 1)),
                ("SAMP_ID", format!("S{:03}", n + 1)),
                ("SPEC_DPTH", spec_depth.clone()),
                ("SAMP_DESC", "Firm grey silty CLAY".to_string()),
            ]));

            let test_type = test_types[(h + d) % test_types.len()];
            treg.push_row(row(&[
                ("LOCA_ID", hole.to_string()),
                ("SPEC_DPTH", spec_depth.clone()),
                ("TREG_TYPE", test_type.to_string()),
            ]));

            // Cell pressure grows with depth; pore pressure only for drained
            // and consolidated-undrained tests.
            let cell = 20.0 * depth + rng.range(-5.0, 5.0);
            let devf = cell * rng.range(0.8, 1.6);
            let pwpf = match test_type {
                "UU" => String::new(),
                _ => format!("{:.1}", cell * rng.range(0.2, 0.6)),
            };
            tret.push_row(row(&[
                ("LOCA_ID", hole.to_string()),
                ("SPEC_DPTH", spec_depth),
                ("TRET_CELL", format!("{cell:.1}")),
                ("TRET_DEVF", format!("{devf:.1}")),
                ("TRET_PWPF", pwpf),
            ]));
            n += 1;
        }
    }

    let text = render_tables(Dialect::Ags4, [&proj, &loca, &samp, &treg, &tret]);

    let output_path = "sample_triaxial.ags";
    std::fs::write(output_path, text)
        .with_context(|| format!("writing {output_path}"))?;

    println!("Wrote {n} triaxial specimens ({} holes) to {output_path}", holes.len());
    Ok(())
}
