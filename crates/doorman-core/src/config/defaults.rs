//! Serde default functions for config fields.

pub(super) fn default_data_dir() -> String {
    "~/.doorman".to_string()
}

pub(super) fn default_log_level() -> String {
    "info".to_string()
}

pub(super) fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub(super) fn default_vision_model() -> String {
    "gpt-4o".to_string()
}

pub(super) fn default_image_model() -> String {
    "dall-e-3".to_string()
}

pub(super) fn default_image_size() -> String {
    "1024x1024".to_string()
}

pub(super) fn default_describe_max_tokens() -> u32 {
    30
}

pub(super) fn default_request_timeout_secs() -> u64 {
    120
}

pub(super) fn default_max_generation_attempts() -> u32 {
    3
}

pub(super) fn default_retry_base_delay_secs() -> u64 {
    2
}

pub(super) fn default_prompt_template() -> String {
    "Create a vibrant welcome image for the new member \"{username}\". \
     Their profile picture shows {avatar-description}; let that inspire \
     the scene. Add a short greeting with their name to the image."
        .to_string()
}
