use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::loader::{Encoding, ParseOptions};
use crate::triaxial::StressMode;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub parse: ParseConfig,
    #[serde(default)]
    pub stress: StressConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ParseConfig {
    #[serde(default)]
    pub encoding: Encoding,
    #[serde(default = "default_normalize_headings")]
    pub normalize_headings: bool,
}

fn default_normalize_headings() -> bool {
    true
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            normalize_headings: default_normalize_headings(),
        }
    }
}

impl ParseConfig {
    pub fn options(&self) -> ParseOptions {
        ParseOptions {
            encoding: self.encoding,
            normalize_headings: self.normalize_headings,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct StressConfig {
    #[serde(default)]
    pub mode: StressMode,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("ags_out")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.output.dir.as_os_str().is_empty() {
        anyhow::bail!("output.dir must not be empty");
    }

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.parse.options(), ParseOptions::default());
        assert_eq!(config.stress.mode, StressMode::Effective);
        assert_eq!(config.output.dir, PathBuf::from("ags_out"));
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse_config(
            r#"
[parse]
encoding = "latin1"
normalize_headings = false

[stress]
mode = "total"

[output]
dir = "results"
"#,
        )
        .unwrap();
        assert_eq!(config.parse.encoding, Encoding::Latin1);
        assert!(!config.parse.normalize_headings);
        assert_eq!(config.stress.mode, StressMode::Total);
        assert_eq!(config.output.dir, PathBuf::from("results"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(parse_config("[stress]\nmode = \"peak\"\n").is_err());
        assert!(parse_config("[parse]\nencoding = \"utf16\"\n").is_err());
        assert!(parse_config("[output]\ndir = \"\"\n").is_err());
    }
}
