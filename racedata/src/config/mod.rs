use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings read from a YAML config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RaceDataConfig {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub sort: SortConfig,
}

/// Where and how text reports are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_filename")]
    pub filename: String,
    #[serde(default)]
    pub overwrite: bool,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    #[serde(default)]
    pub descending: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            output_dir: default_output_dir(),
            filename: default_filename(),
            overwrite: false,
            top_n: default_top_n(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_filename() -> String {
    "report.md".to_string()
}

fn default_top_n() -> usize {
    10
}

/// Parse a YAML config file
pub fn parse_config(path: &Path) -> Result<RaceDataConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config_str(&content)
}

/// Parse a YAML config string. An empty document yields the defaults.
pub fn parse_config_str(content: &str) -> Result<RaceDataConfig> {
    if content.trim().is_empty() {
        return Ok(RaceDataConfig::default());
    }
    let config: RaceDataConfig = serde_yaml::from_str(content)?;
    Ok(config)
}
