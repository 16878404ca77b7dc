//! Loading files from disk.

use std::fs;

use ags_triax::config::load_config;
use ags_triax::data::loader::read_source;
use ags_triax::{load_file, AgsError, Encoding, ParseOptions, StressMode};
use tempfile::TempDir;

#[test]
fn loads_ags_file_by_name() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("site.ags");
    fs::write(
        &path,
        "\"GROUP\",\"LOCA\"\r\n\"HEADING\",\"LOCA_ID\",\"LOCA_TYPE\"\r\n\"DATA\",\"BH1\",\"CP\"\r\n",
    )
    .unwrap();

    let parsed = load_file(&path, &ParseOptions::default()).unwrap();
    assert_eq!(parsed.source, "site.ags");
    assert_eq!(parsed.groups["LOCA"].value(0, "HOLE_ID"), "BH1");
}

#[test]
fn latin1_file_decodes_degree_sign() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.AGS");
    let mut bytes = b"\"**HOLE\"\n\"*HOLE_ID\",\"*HOLE_REM\"\n\"BH1\",\"dip 45".to_vec();
    bytes.push(0xB0);
    bytes.extend_from_slice(b"\"\n");
    fs::write(&path, bytes).unwrap();

    let options = ParseOptions {
        encoding: Encoding::Latin1,
        ..ParseOptions::default()
    };
    let parsed = load_file(&path, &options).unwrap();
    assert_eq!(parsed.groups["HOLE"].value(0, "HOLE_REM"), "dip 45°");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = read_source(&dir.path().join("absent.ags")).unwrap_err();
    assert!(matches!(err.downcast_ref::<AgsError>(), Some(AgsError::Io { .. })));
}

#[test]
fn wrong_extension_is_refused_before_reading() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.xlsx");
    fs::write(&path, b"\"GROUP\",\"LOCA\"\n").unwrap();
    let err = load_file(&path, &ParseOptions::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AgsError>(),
        Some(AgsError::UnsupportedExtension { ext }) if ext == "xlsx"
    ));
}

#[test]
fn config_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ags-triax.toml");
    fs::write(&path, "[stress]\nmode = \"total\"\n").unwrap();
    let config = load_config(&path).unwrap();
    assert_eq!(config.stress.mode, StressMode::Total);
    assert!(config.parse.normalize_headings);

    assert!(load_config(&dir.path().join("nope.toml")).is_err());
}
