use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use ags_triax::config::{load_config, Config};
use ags_triax::data::loader::read_source;
use ags_triax::export::{write_group_csv, write_stress_csv};
use ags_triax::{Session, StressMode};

/// Merge AGS3/AGS4 files and derive triaxial s–t stress paths.
#[derive(Parser, Debug)]
#[command(name = "ags-triax", version, about)]
struct Cli {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mean stress reported as `s`
    #[arg(long, value_enum)]
    mode: Option<StressMode>,

    /// Output directory for CSV files
    #[arg(long)]
    out: Option<PathBuf>,

    /// Keep only these holes (repeatable)
    #[arg(long = "hole")]
    holes: Vec<String>,

    /// Keep only these test types (repeatable)
    #[arg(long = "test-type")]
    test_types: Vec<String>,

    /// Print the filtered stress points as JSON
    #[arg(long)]
    json: bool,

    /// AGS files to read
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    let mode = cli.mode.unwrap_or(config.stress.mode);
    let out_dir = cli.out.clone().unwrap_or_else(|| config.output.dir.clone());

    let mut session = Session::new(config.parse.options(), mode);
    for path in &cli.files {
        match read_source(path) {
            Ok((name, bytes)) => session.add_file(&name, &bytes),
            Err(e) => warn!("skipping {}: {e:#}", path.display()),
        }
    }

    for report in &session.reports {
        match (&report.error, &report.report) {
            (Some(err), _) => println!("{}: {err}", report.source),
            (None, Some(fmt)) => {
                let dialect = fmt.dialect.map(|d| d.to_string()).unwrap_or_default();
                let loca = if fmt.has_location_group { ", location group" } else { "" };
                println!("{}: {dialect}{loca}", report.source);
            }
            (None, None) => {}
        }
        for failure in &report.failures {
            println!("  group {failure}");
        }
    }

    if session.files.is_empty() {
        anyhow::bail!("no AGS file could be parsed");
    }

    apply_filter(&mut session, "HOLE_ID", &cli.holes);
    apply_filter(&mut session, "TEST_TYPE", &cli.test_types);

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    for (name, table) in session.merged() {
        let path = out_dir.join(format!("{name}.csv"));
        write_group_csv(table, BufWriter::new(create(&path)?))?;
    }
    if let Some(summary) = session.triaxial() {
        let path = out_dir.join("triaxial_summary.csv");
        write_group_csv(&summary.table, BufWriter::new(create(&path)?))?;
    }
    let path = out_dir.join("s_t_values.csv");
    write_stress_csv(session.visible_points(), BufWriter::new(create(&path)?))?;

    info!(
        "{} groups, {} of {} stress points written to {}",
        session.merged().len(),
        session.visible_indices.len(),
        session.stress_points().len(),
        out_dir.display()
    );

    if cli.json {
        let points: Vec<_> = session.visible_points().collect();
        println!("{}", serde_json::to_string_pretty(&points)?);
    }
    Ok(())
}

/// Narrow `column` to `values`; no values means no constraint.
fn apply_filter(session: &mut Session, column: &str, values: &[String]) {
    if values.is_empty() {
        return;
    }
    let selected: BTreeSet<String> = values.iter().cloned().collect();
    session.filters.insert(column.to_string(), selected);
    session.refilter();
}

fn create(path: &std::path::Path) -> Result<File> {
    File::create(path).with_context(|| format!("creating {}", path.display()))
}
