//! Application configuration for notecraft.
//!
//! User config lives at `~/.notecraft/notecraft.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NotecraftError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "notecraft.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".notecraft";

// ---------------------------------------------------------------------------
// Config structs (matching notecraft.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Keyword lists and caps driving concept/pitfall extraction.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Self-review thresholds.
    #[serde(default)]
    pub review: ReviewConfig,

    /// Topic category rules, checked in order.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryRule>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            extraction: ExtractionConfig::default(),
            review: ReviewConfig::default(),
            categories: default_categories(),
        }
    }
}

/// How a finished note leaves the save workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveMode {
    /// Write the merged note straight into the note store.
    #[default]
    DirectCommit,
    /// Produce the note plus a change-request summary; the caller applies it.
    SummaryThenSave,
}

impl std::str::FromStr for SaveMode {
    type Err = NotecraftError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "direct-commit" | "direct" => Ok(Self::DirectCommit),
            "summary-then-save" | "summary" => Ok(Self::SummaryThenSave),
            other => Err(NotecraftError::config(format!("unknown save mode '{other}'"))),
        }
    }
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Root directory of the local notes checkout.
    #[serde(default = "default_notes_dir")]
    pub notes_dir: String,

    /// Default save workflow.
    #[serde(default)]
    pub save_mode: SaveMode,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            notes_dir: default_notes_dir(),
            save_mode: SaveMode::default(),
        }
    }
}

fn default_notes_dir() -> String {
    "~/interview-notes".into()
}

/// `[extraction]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Concept keywords in priority order.
    #[serde(default = "default_concept_keywords")]
    pub concept_keywords: Vec<String>,

    /// Pitfall keywords in priority order.
    #[serde(default = "default_pitfall_keywords")]
    pub pitfall_keywords: Vec<String>,

    #[serde(default = "default_five")]
    pub max_concepts: usize,

    #[serde(default = "default_five")]
    pub max_pitfalls: usize,

    #[serde(default = "default_five")]
    pub max_key_points: usize,

    #[serde(default = "default_max_code_samples")]
    pub max_code_samples: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            concept_keywords: default_concept_keywords(),
            pitfall_keywords: default_pitfall_keywords(),
            max_concepts: default_five(),
            max_pitfalls: default_five(),
            max_key_points: default_five(),
            max_code_samples: default_max_code_samples(),
        }
    }
}

fn default_concept_keywords() -> Vec<String> {
    [
        "原理", "机制", "算法", "模型", "架构", "设计", "模式", "原理是", "机制是", "核心是",
        "本质是", "关键在于",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_pitfall_keywords() -> Vec<String> {
    [
        "注意", "小心", "避免", "错误", "误区", "坑", "陷阱", "容易", "常见问题", "不要", "切忌",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_five() -> usize {
    5
}
fn default_max_code_samples() -> usize {
    3
}

/// `[review]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Notes shorter than this many characters are flagged critical.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Markers that indicate unfinished content.
    #[serde(default = "default_placeholder_markers")]
    pub placeholder_markers: Vec<String>,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            placeholder_markers: default_placeholder_markers(),
        }
    }
}

fn default_min_length() -> usize {
    100
}
fn default_placeholder_markers() -> Vec<String> {
    vec!["TBD".into(), "TODO".into(), "待补充".into()]
}

/// `[[categories]]` entry: maps topics to a notes subdirectory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Directory name for matching topics.
    pub name: String,
    /// Case-insensitive substrings that select this category.
    pub keywords: Vec<String>,
}

impl CategoryRule {
    fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

fn default_categories() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("java", &["jvm", "java", "spring", "并发", "多线程", "集合"]),
        CategoryRule::new("mysql", &["mysql", "sql", "数据库", "索引", "事务", "锁"]),
        CategoryRule::new("redis", &["redis", "缓存", "cache"]),
        CategoryRule::new("mq", &["kafka", "mq", "消息队列", "rabbitmq"]),
        CategoryRule::new("os", &["linux", "操作系统", "os"]),
        CategoryRule::new("network", &["网络", "tcp", "http", "ip", "socket"]),
        CategoryRule::new("algorithm", &["算法", "数据结构", "leetcode", "排序"]),
        CategoryRule::new("devops", &["docker", "k8s", "kubernetes", "devops", "ci/cd"]),
    ]
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.notecraft/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| NotecraftError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.notecraft/notecraft.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NotecraftError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        NotecraftError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| NotecraftError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| NotecraftError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| NotecraftError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("notes_dir"));
        assert!(toml_str.contains("direct-commit"));
        assert!(toml_str.contains("原理"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.extraction, ExtractionConfig::default());
        assert_eq!(parsed.review.min_length, 100);
        assert_eq!(parsed.categories.len(), 8);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[defaults]
notes_dir = "/tmp/notes"
save_mode = "summary-then-save"

[extraction]
concept_keywords = ["principle", "mechanism"]
max_key_points = 3

[[categories]]
name = "rust"
keywords = ["rust", "cargo"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.save_mode, SaveMode::SummaryThenSave);
        assert_eq!(config.extraction.concept_keywords, vec!["principle", "mechanism"]);
        assert_eq!(config.extraction.max_key_points, 3);
        assert_eq!(config.extraction.max_concepts, 5);
        assert_eq!(config.extraction.pitfall_keywords[0], "注意");
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.categories[0].name, "rust");
    }

    #[test]
    fn save_mode_from_str() {
        assert_eq!("direct".parse::<SaveMode>().unwrap(), SaveMode::DirectCommit);
        assert_eq!(
            "summary-then-save".parse::<SaveMode>().unwrap(),
            SaveMode::SummaryThenSave
        );
        assert!("push".parse::<SaveMode>().is_err());
    }
}
