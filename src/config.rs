use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{GatewayError, GatewayResult};
use crate::grounding::parser::ModelVariant;
use crate::grounding::prompt::PromptProfile;
use crate::grounding::resize::ResizeLimits;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub resize: ResizeLimits,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub script: ScriptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for the multipart body (screenshot + instruction).
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_upload_mb() -> usize {
    32
}

/// Connection settings for the OpenAI-compatible endpoint serving the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Full chat-completions URL, e.g. `http://localhost:8001/v1/chat/completions`.
    #[serde(default)]
    pub api_base: String,
    #[serde(default)]
    pub model: String,
    /// Optional API key (falls back to env var TARS_GATEWAY_API_KEY).
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub stream: bool,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub variant: ModelVariant,
    #[serde(default = "default_coordinate_divisor")]
    pub coordinate_divisor: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            model: String::new(),
            api_key: None,
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            stream: false,
            request_timeout_secs: default_request_timeout(),
            variant: ModelVariant::default(),
            coordinate_divisor: default_coordinate_divisor(),
        }
    }
}

fn default_max_tokens() -> u32 {
    128
}

fn default_request_timeout() -> u64 {
    120
}

fn default_coordinate_divisor() -> f64 {
    1000.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    #[serde(default)]
    pub profile: PromptProfile,
    /// Language the model should use in its `Thought` part.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            profile: PromptProfile::default(),
            language: default_language(),
        }
    }
}

fn default_language() -> String {
    "English".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Ratio between the control surface and the screenshot (HiDPI displays).
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
    /// Paste typed text through the clipboard instead of simulating keystrokes.
    #[serde(default = "default_true")]
    pub input_swap: bool,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            scale_factor: default_scale_factor(),
            input_swap: true,
        }
    }
}

fn default_scale_factor() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

const CONFIG_FILE: &str = "config.toml";

fn resolve_config_path() -> GatewayResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join(CONFIG_FILE);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join(CONFIG_FILE);
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    if let Some(dir) = dirs::config_dir() {
        let candidate = dir.join("tars-gateway").join(CONFIG_FILE);
        if candidate.exists() {
            tracing::debug!(path = %candidate.display(), "config found in user config dir");
            return Ok(candidate);
        }
    }

    Err(GatewayError::Config(
        "config.toml not found next to executable, in working directory or user config dir".into(),
    ))
}

pub fn parse_config(content: &str) -> GatewayResult<AppConfig> {
    let mut config: AppConfig = toml::from_str(content)?;
    if let Ok(key) = std::env::var("TARS_GATEWAY_API_KEY") {
        if !key.is_empty() {
            config.model.api_key = Some(key);
        }
    }
    Ok(config)
}

pub fn load_config() -> GatewayResult<AppConfig> {
    let path = resolve_config_path()?;
    let content = std::fs::read_to_string(&path)?;
    let config = parse_config(&content)?;
    tracing::info!(
        path = %path.display(),
        model = %config.model.model,
        variant = ?config.model.variant,
        "config loaded"
    );
    Ok(config)
}
