use crate::core::content::ContentPaths;
use crate::core::notify::ToastTiming;
use crate::utils::error::{Result, SiteError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub content: ContentConfig,
    pub storage: StorageConfig,
    pub timing: TimingConfig,
    pub submission: SubmissionConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Web root: an http(s) URL or a local directory.
    pub base: String,
    pub programs_path: String,
    pub news_path: String,
    pub translations_dir: String,
    pub news_limit: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            base: ".".to_string(),
            programs_path: "data/programs.json".to_string(),
            news_path: "data/news.json".to_string(),
            translations_dir: "translations".to_string(),
            news_limit: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the key-value store; in-memory when unset.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub loading_ms: u64,
    pub chat_delay_ms: u64,
    pub toast_ms: u64,
    pub toast_fade_ms: u64,
    pub counter_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            loading_ms: 1000,
            chat_delay_ms: 1000,
            toast_ms: 4000,
            toast_fade_ms: 300,
            counter_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Where accepted applications are POSTed; only logged when unset.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    /// `compact` or `json`.
    pub log_format: String,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_format: "compact".to_string(),
        }
    }
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SiteError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| SiteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CONTENT_BASE}); unknown variables stay as written.
    fn substitute_env_vars(content: &str) -> String {
        let re = match Regex::new(r"\$\{([^}]+)\}") {
            Ok(re) => re,
            Err(_) => return content.to_string(),
        };

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn content_is_remote(&self) -> bool {
        let base = self.content.base.as_str();
        base.starts_with("http://") || base.starts_with("https://")
    }

    pub fn content_paths(&self) -> ContentPaths {
        ContentPaths {
            programs: self.content.programs_path.clone(),
            news: self.content.news_path.clone(),
            news_limit: self.content.news_limit,
        }
    }

    pub fn toast_timing(&self) -> ToastTiming {
        ToastTiming {
            display: Duration::from_millis(self.timing.toast_ms),
            fade: Duration::from_millis(self.timing.toast_fade_ms),
        }
    }

    pub fn loading_delay(&self) -> Duration {
        Duration::from_millis(self.timing.loading_ms)
    }

    pub fn chat_delay(&self) -> Duration {
        Duration::from_millis(self.timing.chat_delay_ms)
    }

    pub fn counter_duration(&self) -> Duration {
        Duration::from_millis(self.timing.counter_ms)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring.log_format == "json"
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        if self.content_is_remote() {
            validate_url("content.base", &self.content.base)?;
        } else {
            validate_path("content.base", &self.content.base)?;
        }
        validate_non_empty_string("content.programs_path", &self.content.programs_path)?;
        validate_non_empty_string("content.news_path", &self.content.news_path)?;
        validate_non_empty_string("content.translations_dir", &self.content.translations_dir)?;

        if let Some(path) = &self.storage.path {
            validate_path("storage.path", path)?;
        }
        if let Some(endpoint) = &self.submission.endpoint {
            validate_url("submission.endpoint", endpoint)?;
        }

        validate_positive_number("timing.toast_ms", self.timing.toast_ms, 1)?;
        validate_positive_number("timing.counter_ms", self.timing.counter_ms, 16)?;

        let valid_formats = ["compact", "json"];
        if !valid_formats.contains(&self.monitoring.log_format.as_str()) {
            return Err(SiteError::InvalidConfigValueError {
                field: "monitoring.log_format".to_string(),
                value: self.monitoring.log_format.clone(),
                reason: format!("Unsupported format. Valid formats: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}
