//! Bootstrap configuration loading and root folder resolution
//!
//! Settings sources, highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! Provider credentials are resolved by the service crate on top of the
//! values loaded here, since they also have environment overrides.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "FOODCRAFT_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "foodcraft.db";

const CONFIG_DIR_NAME: &str = "foodcraft";
const CONFIG_FILE_NAME: &str = "foodcraft.toml";

/// Bootstrap configuration loaded from TOML
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding the SQLite database
    pub root_folder: Option<PathBuf>,
    /// HTTP server port
    pub port: u16,
    /// Interface to bind
    pub bind_address: String,
    /// Origin used when building shareable save links
    pub public_base_url: String,
    pub logging: LoggingConfig,
    pub text_provider: TextProviderConfig,
    pub image_provider: ImageProviderConfig,
    pub retention: RetentionConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: 5790,
            bind_address: "127.0.0.1".to_string(),
            public_base_url: "http://localhost:5790".to_string(),
            logging: LoggingConfig::default(),
            text_provider: TextProviderConfig::default(),
            image_provider: ImageProviderConfig::default(),
            retention: RetentionConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins when set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Response family of the text-generation provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextProviderFamily {
    /// `choices[0].message.content` (OpenAI, OpenRouter, most proxies)
    OpenAi,
    /// `candidates[0].content.parts[0].text`
    Gemini,
}

/// Text-generation provider settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextProviderConfig {
    pub family: TextProviderFamily,
    /// Full completions URL (OpenAI family) or models base URL (Gemini family)
    pub endpoint: String,
    pub model: String,
    /// Ordered credentials: the first is primary, the rest are rate-limit fallbacks
    pub api_keys: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for TextProviderConfig {
    fn default() -> Self {
        Self {
            family: TextProviderFamily::OpenAi,
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "meta-llama/llama-3.1-8b-instruct:free".to_string(),
            api_keys: Vec::new(),
            timeout_secs: 30,
        }
    }
}

/// Response family of the image provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageProviderFamily {
    /// JSON body with `artifacts[0].base64`
    StabilityJson,
    /// Raw image bytes in the response body
    RawBytes,
}

/// Image provider settings (image generation is skipped without a key)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageProviderConfig {
    pub family: ImageProviderFamily,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ImageProviderConfig {
    fn default() -> Self {
        Self {
            family: ImageProviderFamily::StabilityJson,
            endpoint: "https://api.stability.ai/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image"
                .to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

/// Game state retention
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Saves idle longer than this are deleted
    pub max_idle_days: u32,
    pub sweep_interval_hours: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_idle_days: 30,
            sweep_interval_hours: 24,
        }
    }
}

impl RetentionConfig {
    pub fn max_idle(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.max_idle_days) * 24 * 60 * 60)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        // Zero would make tokio::time::interval panic
        let hours = u64::from(self.sweep_interval_hours.max(1));
        std::time::Duration::from_secs(hours * 60 * 60)
    }
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load the explicit file if given (it must exist), else the platform
    /// default file if present, else built-in defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            info!("Loading configuration from {}", path.display());
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            _ => {
                debug!("No configuration file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// Platform configuration file location (`~/.config/foodcraft/foodcraft.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Root folder resolution: CLI argument, environment variable, TOML, OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(CONFIG_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./foodcraft_data"))
}

/// Database file inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}
