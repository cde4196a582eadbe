//! Telegram Bot API deserialization types.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
    pub new_chat_members: Option<Vec<TgUser>>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl TgUser {
    /// Human-readable display name: full name, falling back to @username.
    pub(crate) fn display_name(&self) -> String {
        match &self.last_name {
            Some(ln) => format!("{} {ln}", self.first_name),
            None if !self.first_name.is_empty() => self.first_name.clone(),
            None => self
                .username
                .as_ref()
                .map(|u| format!("@{u}"))
                .unwrap_or_else(|| "member".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgChat {
    pub id: i64,
    /// Chat type: "private", "group", "supergroup", or "channel".
    #[serde(default, rename = "type")]
    pub chat_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgChatMember {
    /// "creator", "administrator", "member", "restricted", "left", "kicked".
    pub status: String,
    pub user: TgUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUserProfilePhotos {
    pub total_count: i64,
    /// Outer vec: photos; inner vec: sizes, smallest first.
    pub photos: Vec<Vec<TgPhotoSize>>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgPhotoSize {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgFile {
    pub file_path: Option<String>,
}
