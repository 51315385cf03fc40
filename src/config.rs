//! Configuration file handling.
//!
//! This module handles loading `.procurement-insight.toml` files and
//! merging them with command-line arguments.

use crate::errors::InsightError;
use crate::report::DEFAULT_TITLE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".procurement-insight.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Input dataset settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory report files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// DashScope API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds, per question.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "qwen-max".to_string()
}

fn default_base_url() -> String {
    "https://dashscope.aliyuncs.com".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Input dataset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path of the procurement CSV.
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    /// Rows included in the context sent with each question.
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            sample_rows: default_sample_rows(),
        }
    }
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("Procurement KPI Analysis Dataset.csv")
}

fn default_sample_rows() -> usize {
    5
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// First line of every text report.
    #[serde(default = "default_title")]
    pub title: String,

    /// Write one file per section plus an all-sections file.
    #[serde(default)]
    pub split_sections: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            split_sections: false,
        }
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load `CONFIG_FILE_NAME` from `dir`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let default_path = dir.join(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(&default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.dataset.path = input.clone();
        }
        if let Some(rows) = args.sample_rows {
            self.dataset.sample_rows = rows;
        }

        if let Some(ref dir) = args.output_dir {
            self.general.output_dir = dir.clone();
        }

        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.base_url {
            self.model.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        if let Some(ref title) = args.title {
            self.report.title = title.clone();
        }
        if args.split {
            self.report.split_sections = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Resolve the API credential. A missing or blank key is a fatal
/// configuration error.
pub fn require_api_key(api_key: Option<&str>) -> Result<String, InsightError> {
    match api_key.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(InsightError::Config(
            "DASHSCOPE_API_KEY is not set; export it or pass --api-key".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "qwen-max");
        assert_eq!(config.model.timeout_seconds, 120);
        assert_eq!(
            config.dataset.path,
            PathBuf::from("Procurement KPI Analysis Dataset.csv")
        );
        assert_eq!(config.report.title, "采购KPI分析结果汇总");
        assert!(!config.report.split_sections);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_dir = "reports"

[model]
name = "qwen-plus"
timeout_seconds = 30

[dataset]
path = "orders.csv"

[report]
split_sections = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, PathBuf::from("reports"));
        assert_eq!(config.model.name, "qwen-plus");
        assert_eq!(config.model.base_url, "https://dashscope.aliyuncs.com");
        assert_eq!(config.model.timeout_seconds, 30);
        assert_eq!(config.dataset.path, PathBuf::from("orders.csv"));
        assert_eq!(config.dataset.sample_rows, 5);
        assert!(config.report.split_sections);
    }

    #[test]
    fn test_merge_only_overrides_given_args() {
        let mut config = Config::default();
        config.model.name = "from-file".to_string();

        let mut args = make_args();
        args.timeout = Some(10);
        args.split = true;
        config.merge_with_args(&args);

        assert_eq!(config.model.name, "from-file");
        assert_eq!(config.model.timeout_seconds, 10);
        assert!(config.report.split_sections);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[dataset]"));
        assert!(toml_str.contains("[report]"));
    }

    #[test]
    fn test_load_from_dir_without_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_from_dir_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[dataset]\npath = \"orders.csv\"\n",
        )
        .unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.dataset.path, PathBuf::from("orders.csv"));
    }

    #[test]
    fn test_load_from_dir_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[model\nname = ").unwrap();

        let err = Config::load_from_dir(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_require_api_key() {
        assert_eq!(require_api_key(Some(" sk-1 ")).unwrap(), "sk-1");
        assert!(matches!(require_api_key(None), Err(InsightError::Config(_))));
        assert!(matches!(require_api_key(Some("")), Err(InsightError::Config(_))));
    }
}
