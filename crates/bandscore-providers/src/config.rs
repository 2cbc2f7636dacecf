//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use bandscore_core::traits::FeedbackProvider;
use bandscore_core::OrchestratorConfig;

use crate::openai::{GatewaySettings, OpenAiFeedbackProvider};

/// Configuration for a single feedback provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
        }
    }
}

/// Top-level bandscore configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandscoreConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Provider used for writing and speaking feedback.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_writing_max_tokens")]
    pub writing_max_tokens: u32,
    #[serde(default = "default_speaking_max_tokens")]
    pub speaking_max_tokens: u32,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra feedback attempts after a provider outage.
    #[serde(default)]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Directory holding the JSON record store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    crate::openai::DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f64 {
    0.2
}
fn default_writing_max_tokens() -> u32 {
    1500
}
fn default_speaking_max_tokens() -> u32 {
    1200
}
fn default_timeout_secs() -> u64 {
    crate::openai::DEFAULT_TIMEOUT_SECS
}
fn default_retry_delay() -> u64 {
    1000
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("./bandscore-data")
}

impl Default for BandscoreConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
            writing_max_tokens: default_writing_max_tokens(),
            speaking_max_tokens: default_speaking_max_tokens(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            retry_delay_ms: default_retry_delay(),
            data_dir: default_data_dir(),
        }
    }
}

impl BandscoreConfig {
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings {
            model: self.model.clone(),
            temperature: self.temperature,
            writing_max_tokens: self.writing_max_tokens,
            speaking_max_tokens: self.speaking_max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            max_feedback_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    /// Build the configured default provider.
    pub fn default_feedback_provider(&self) -> Result<Arc<dyn FeedbackProvider>> {
        let provider = self.providers.get(&self.default_provider).with_context(|| {
            format!(
                "provider '{}' is not configured (run `bandscore init` or set BANDSCORE_OPENAI_KEY)",
                self.default_provider
            )
        })?;
        create_provider(&self.default_provider, provider, self)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
    }
    result
}

fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
            org_id: org_id.as_deref().map(resolve_env_vars),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `bandscore.toml` in the current directory
/// 2. `~/.config/bandscore/config.toml`
///
/// Environment variable override: `BANDSCORE_OPENAI_KEY`.
pub fn load_config() -> Result<BandscoreConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<BandscoreConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("bandscore.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<BandscoreConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => BandscoreConfig::default(),
    };

    if let Ok(key) = std::env::var("BANDSCORE_OPENAI_KEY") {
        let entry = config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        let ProviderConfig::OpenAI { api_key, .. } = entry;
        *api_key = key;
    }

    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("bandscore"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(
    name: &str,
    config: &ProviderConfig,
    settings: &BandscoreConfig,
) -> Result<Arc<dyn FeedbackProvider>> {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => {
            if api_key.trim().is_empty() {
                anyhow::bail!("provider '{name}' has an empty api_key");
            }
            let provider = OpenAiFeedbackProvider::new(
                api_key,
                base_url.clone(),
                org_id.clone(),
                settings.gateway_settings(),
            )
            .with_context(|| format!("failed to create provider '{name}'"))?;
            Ok(Arc::new(provider))
        }
    }
}
