mod defaults;


use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DoormanError;
use defaults::*;

/// Placeholder for the member's display name in the welcome template.
pub const PLACEHOLDER_USERNAME: &str = "{username}";
/// Placeholder for the avatar description in the welcome template.
pub const PLACEHOLDER_AVATAR: &str = "{avatar-description}";

/// Top-level Doorman configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub doorman: DoormanConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub chats: ChatConfig,
    #[serde(default)]
    pub welcome: WelcomeConfig,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoormanConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DoormanConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
}

/// OpenAI collaborator config (vision description + image generation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_image_size")]
    pub image_size: String,
    /// Token cap on the avatar description.
    #[serde(default = "default_describe_max_tokens")]
    pub describe_max_tokens: u32,
    /// Per-request timeout. Starved requests count as transient failures.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            vision_model: default_vision_model(),
            image_model: default_image_model(),
            image_size: default_image_size(),
            describe_max_tokens: default_describe_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Target chats, by numeric id only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatConfig {
    /// Group whose joins trigger welcomes.
    #[serde(default)]
    pub group_chat_id: i64,
    /// Where welcome images are posted.
    #[serde(default)]
    pub welcome_chat_id: i64,
    /// Where profile-picture suggestions for avatar-less members go.
    #[serde(default)]
    pub general_chat_id: i64,
    /// Admin/log chat; pipeline events are mirrored here, and operator
    /// commands are accepted here.
    #[serde(default)]
    pub admin_chat_id: i64,
}

/// Welcome pipeline settings. The runtime-mutable knobs here are seed
/// values only; see [`crate::runtime::RuntimeConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeConfig {
    /// Prompt template for the avatar-derived strategy. Must contain
    /// `{username}` and `{avatar-description}` exactly once each.
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,
    /// PNG composited onto generated images. Missing file disables
    /// watermarking.
    #[serde(default)]
    pub watermark_path: Option<String>,
    /// Initial wildcard chance, percent in [0, 99].
    #[serde(default)]
    pub wildcard_chance: u8,
    /// Whether non-admins may use `!pfp`.
    #[serde(default)]
    pub pfp_anyone: bool,
    /// Ask the vision model not to guess gender.
    #[serde(default)]
    pub gender_sensitive: bool,
    /// Delay before posting the welcome image, in seconds.
    #[serde(default)]
    pub posting_delay_secs: u64,
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: u32,
    #[serde(default = "default_retry_base_delay_secs")]
    pub retry_base_delay_secs: u64,
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            prompt_template: default_prompt_template(),
            watermark_path: None,
            wildcard_chance: 0,
            pfp_anyone: false,
            gender_sensitive: false,
            posting_delay_secs: 0,
            max_generation_attempts: default_max_generation_attempts(),
            retry_base_delay_secs: default_retry_base_delay_secs(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Check that the welcome template carries each placeholder exactly once.
///
/// A missing or duplicated placeholder is a configuration mistake that would
/// otherwise only surface (silently, as a malformed prompt) at call time.
pub fn validate_template(template: &str) -> Result<(), DoormanError> {
    for placeholder in [PLACEHOLDER_USERNAME, PLACEHOLDER_AVATAR] {
        match template.matches(placeholder).count() {
            1 => {}
            0 => {
                return Err(DoormanError::Config(format!(
                    "prompt_template is missing the {placeholder} placeholder"
                )))
            }
            n => {
                return Err(DoormanError::Config(format!(
                    "prompt_template contains {placeholder} {n} times, expected once"
                )))
            }
        }
    }
    Ok(())
}

impl Config {
    /// Validate settings that must be caught at startup, not at call time.
    pub fn validate(&self) -> Result<(), DoormanError> {
        validate_template(&self.welcome.prompt_template)?;
        if self.welcome.wildcard_chance > 99 {
            return Err(DoormanError::Config(format!(
                "wildcard_chance must be in [0, 99], got {}",
                self.welcome.wildcard_chance
            )));
        }
        Ok(())
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, DoormanError> {
    let path = Path::new(path);
    if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        let config = Config {
            doorman: DoormanConfig::default(),
            telegram: TelegramConfig::default(),
            openai: OpenAiConfig::default(),
            chats: ChatConfig::default(),
            welcome: WelcomeConfig::default(),
        };
        config.validate()?;
        return Ok(config);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| DoormanError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| DoormanError::Config(format!("failed to parse config: {}", e)))?;

    config.validate()?;
    Ok(config)
}
