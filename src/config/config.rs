use crate::api::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::export::writer::DEFAULT_JSON_INDENT;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base address every endpoint path is appended to
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// API key, used only when neither --api-key nor DEHASHED_API_KEY is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Indentation for pretty-printed JSON
    pub json_indent: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            api_key: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_indent: DEFAULT_JSON_INDENT,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load config from the default location. A missing file yields the
    /// defaults and is not created.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Like [`Config::load_from`], but a file that fails to load yields the
    /// defaults and a warning instead of an error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            warn!(target: "config", "ignoring unreadable config: {:#}", e);
            Self::default()
        })
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("dehashed-cli").join("config.toml"))
    }

    /// Copy of the config safe to print: the API key, if any, is masked.
    pub fn masked(&self) -> Self {
        let mut config = self.clone();
        if let Some(key) = &config.api.api_key {
            config.api.api_key = Some(mask_key(key));
        }
        config
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# DeHashed CLI Configuration File
# Location: ~/.config/dehashed-cli/config.toml (Linux)
#           ~/Library/Application Support/dehashed-cli/config.toml (macOS)
#           %APPDATA%\dehashed-cli\config.toml (Windows)

[api]
# Base address of the API; endpoint paths such as /search are appended
base_url = "https://api.dehashed.com/v2"

# Give up on a request after this many seconds
timeout_secs = 30

# API key. Prefer the DEHASHED_API_KEY environment variable or --api-key;
# this value is only used when neither is set.
# api_key = "your-api-key"

[output]
# Indentation for pretty-printed JSON (stdout and .json files)
json_indent = 2
"#
        .to_string()
    }

    /// Initialize config with a setup wizard
    pub fn init_wizard() -> Result<Self> {
        println!("DeHashed CLI Configuration Setup");
        println!("================================");

        let path = Self::get_config_path()?;
        let mut config = Self::load_or_default(&path);

        print!("API base URL [{}]: ", config.api.base_url);
        std::io::Write::flush(&mut std::io::stdout())?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().is_empty() {
            config.api.base_url = input.trim().to_string();
        }

        print!("Request timeout in seconds [{}]: ", config.api.timeout_secs);
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().is_empty() {
            config.api.timeout_secs = input
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Timeout must be a whole number of seconds"))?;
        }

        print!("Store an API key in the config file? Leave empty to skip: ");
        std::io::Write::flush(&mut std::io::stdout())?;
        input.clear();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().is_empty() {
            config.api.api_key = Some(input.trim().to_string());
        }

        config.save_to(&path)?;

        println!("\nConfiguration saved to: {:?}", path);
        println!("You can edit this file directly to customize further.");

        Ok(config)
    }
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    if key.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.dehashed.com/v2");
        assert_eq!(config.api.timeout(), Duration::from_secs(30));
        assert!(config.api.api_key.is_none());
        assert_eq!(config.output.json_indent, 2);
    }

    #[test]
    fn test_commented_default_parses_to_default() {
        let parsed: Config = toml::from_str(&Config::create_default_with_comments()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str("[api]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(parsed.api.timeout_secs, 5);
        assert_eq!(parsed.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(parsed.output, OutputConfig::default());
    }

    #[test]
    fn test_config_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.api.api_key = Some("abcdef123".to_string());
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(!dir.path().join("absent.toml").exists());
    }

    #[test]
    fn test_broken_file_is_an_error_unless_lenient() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api\nbase_url = ").unwrap();

        assert!(Config::load_from(&path).is_err());
        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn test_masked_hides_key() {
        let mut config = Config::default();
        config.api.api_key = Some("abcdef123".to_string());
        assert_eq!(config.masked().api.api_key.as_deref(), Some("abcd****"));

        config.api.api_key = Some("abc".to_string());
        assert_eq!(config.masked().api.api_key.as_deref(), Some("****"));
    }
}
