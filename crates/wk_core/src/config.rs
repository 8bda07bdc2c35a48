use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;
use crate::{Error, Result};

pub const DEFAULT_LANGUAGE: &str = "ja";
pub const DEFAULT_API_URL: &str = "https://{lang}.wikipedia.org/w/api.php";
pub const DEFAULT_USER_AGENT: &str = "wikisnap/0.1";

/// Section titles containing any of these (case-insensitively) count as a references section.
pub const DEFAULT_REFERENCE_KEYWORDS: &[&str] = &[
    "参考",
    "脚注",
    "出典",
    "references",
    "notes",
    "further reading",
    "bibliography",
    "sources",
    "external links",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub language: String,
    pub output_dir: PathBuf,
    pub user_agent: String,
    /// Endpoint template, `{lang}` is replaced by the language code
    pub api_url: String,
    pub reference_keywords: Vec<String>,
    pub concurrency: usize,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            output_dir: PathBuf::from("./output"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            reference_keywords: DEFAULT_REFERENCE_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            concurrency: 1,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Loads a JSON config file. Missing keys fall back to their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(Error::Config("language must not be empty".to_string()));
        }
        if self.concurrency == 0 {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        self.api_endpoint(&self.language)?;
        Ok(())
    }

    pub fn api_endpoint(&self, language: &str) -> Result<Url> {
        let raw = self.api_url.replace("{lang}", language);
        Url::parse(&raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))
    }
}
