//! OpenAI collaborators: vision description and image generation.

use async_trait::async_trait;
use base64::Engine;
use doorman_core::{
    config::OpenAiConfig,
    error::DoormanError,
    traits::{ImageGenerator, VisionDescriber},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const DESCRIBE_INSTRUCTION: &str =
    "This image is used as a profile pic, describe the main feature (and if \
     there is one other notable aspect, that too) in one concise sentence \
     fragment without any preamble, in the form of '<description>'.";

const GENDER_SENSITIVE_SUFFIX: &str =
    " Do not guess or mention the gender of any person in the image.";

/// Client for the OpenAI vision and image endpoints.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    vision_model: String,
    image_model: String,
    image_size: String,
    describe_max_tokens: u32,
}

impl OpenAiClient {
    /// Create from config values. The per-request timeout lives on the
    /// client; a starved request surfaces as a transient failure.
    pub fn from_config(cfg: &OpenAiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            vision_model: cfg.vision_model.clone(),
            image_model: cfg.image_model.clone(),
            image_size: cfg.image_size.clone(),
            describe_max_tokens: cfg.describe_max_tokens,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<VisionMessage>,
    pub max_tokens: u32,
}

#[derive(Serialize)]
pub(crate) struct VisionMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
pub(crate) struct ImageUrl {
    pub url: String,
}

#[derive(Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
pub(crate) struct ChatChoice {
    pub message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
pub(crate) struct ChatResponseMessage {
    pub content: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

#[derive(Deserialize)]
pub(crate) struct ImageGenerationResponse {
    pub data: Option<Vec<GeneratedImage>>,
}

#[derive(Deserialize)]
pub(crate) struct GeneratedImage {
    pub url: Option<String>,
}

#[async_trait]
impl VisionDescriber for OpenAiClient {
    async fn describe(
        &self,
        image: &[u8],
        gender_sensitive: bool,
    ) -> Result<String, DoormanError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let mut instruction = DESCRIBE_INSTRUCTION.to_string();
        if gender_sensitive {
            instruction.push_str(GENDER_SENSITIVE_SUFFIX);
        }

        let body = ChatCompletionRequest {
            model: self.vision_model.clone(),
            messages: vec![VisionMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text { text: instruction },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{encoded}"),
                        },
                    },
                ],
            }],
            max_tokens: self.describe_max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!("openai: POST {url} model={}", self.vision_model);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| DoormanError::DescriptionFailed(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(DoormanError::DescriptionFailed(format!(
                "openai returned {status}: {text}"
            )));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| DoormanError::DescriptionFailed(format!("bad response: {e}")))?;

        parsed
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| DoormanError::DescriptionFailed("empty description".into()))
    }
}

#[async_trait]
impl ImageGenerator for OpenAiClient {
    /// Single generation attempt. HTTP 504 and request timeouts are
    /// classified transient; everything else fails immediately.
    async fn generate(&self, prompt: &str) -> Result<String, DoormanError> {
        let body = ImageGenerationRequest {
            model: self.image_model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: self.image_size.clone(),
        };

        let url = format!("{}/images/generations", self.base_url);
        debug!("openai: POST {url} model={}", self.image_model);

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| DoormanError::Generation {
                message: format!("request failed: {e}"),
                transient: e.is_timeout(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DoormanError::Generation {
                message: format!("openai returned {status}: {text}"),
                transient: status == reqwest::StatusCode::GATEWAY_TIMEOUT,
            });
        }

        let parsed: ImageGenerationResponse = resp.json().await.map_err(|e| {
            DoormanError::Generation {
                message: format!("bad response: {e}"),
                transient: false,
            }
        })?;

        parsed
            .data
            .as_ref()
            .and_then(|d| d.first())
            .and_then(|img| img.url.clone())
            .ok_or_else(|| DoormanError::Generation {
                message: "response contained no image url".into(),
                transient: false,
            })
    }
}
