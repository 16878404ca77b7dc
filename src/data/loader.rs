use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use log::{info, warn};
use serde::Deserialize;

use super::model::{Dialect, ParsedFile};
use super::normalize::normalize_headings;
use super::table::build_group;
use super::{ags3, ags4, detect};
use crate::error::AgsError;

/// Extensions accepted by [`load_file`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["ags", "ags4", "txt", "csv", "dat"];

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Byte → text decoding. Neither variant can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// UTF-8, undecodable bytes become U+FFFD.
    #[default]
    Utf8,
    /// Every byte maps to the code point of the same value.
    Latin1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub encoding: Encoding,
    /// Fold known heading spellings (`LOCA_ID`, `SPEC_DPTH`) onto one name.
    pub normalize_headings: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            normalize_headings: true,
        }
    }
}

/// Decode file bytes. A leading UTF-8 byte-order mark is dropped.
pub fn decode(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Utf8 => {
            let text = String::from_utf8_lossy(bytes);
            text.strip_prefix('\u{FEFF}').unwrap_or(&text).to_string()
        }
        Encoding::Latin1 => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse one file's bytes. Only an undetectable format is fatal; faulty
/// groups are collected on the result.
pub fn parse_bytes(
    source: &str,
    bytes: &[u8],
    options: &ParseOptions,
) -> std::result::Result<ParsedFile, AgsError> {
    let text = decode(bytes, options.encoding);
    let report = detect::detect_format(&text);
    let Some(dialect) = report.dialect else {
        return Err(AgsError::UnknownFormat {
            source_name: source.to_string(),
        });
    };
    info!("{source}: detected {dialect}");

    let raw_groups = match dialect {
        Dialect::Ags3 => ags3::parse(&text),
        Dialect::Ags4 => ags4::parse(&text),
    };

    let mut groups = BTreeMap::new();
    let mut failures = Vec::new();
    for raw in raw_groups {
        match build_group(raw) {
            Ok(mut table) => {
                if table.is_empty() {
                    continue;
                }
                if options.normalize_headings {
                    normalize_headings(&mut table);
                }
                groups.insert(table.name.clone(), table);
            }
            Err(failure) => {
                warn!("{source}: group {failure} not exported");
                failures.push(failure);
            }
        }
    }

    Ok(ParsedFile {
        source: source.to_string(),
        dialect,
        has_location_group: report.has_location_group,
        groups,
        failures,
    })
}

/// Read a file from disk, refusing extensions that are not AGS text.
pub fn read_source(path: &Path) -> Result<(String, Vec<u8>)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(AgsError::UnsupportedExtension { ext }.into());
    }

    let bytes = std::fs::read(path).map_err(|source| AgsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, bytes))
}

/// Load and parse one file from disk.
pub fn load_file(path: &Path, options: &ParseOptions) -> Result<ParsedFile> {
    let (name, bytes) = read_source(path)?;
    Ok(parse_bytes(&name, &bytes, options)?)
}
