//! Outbound Bot API calls and member/avatar lookups.

use super::types::{TgChatMember, TgFile, TgResponse, TgUserProfilePhotos};
use super::TelegramChannel;
use doorman_core::{error::DoormanError, member::Member};
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

impl TelegramChannel {
    /// Send a text message to a specific chat.
    pub(crate) async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), DoormanError> {
        let url = format!("{}/sendMessage", self.base_url);
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        let resp = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| DoormanError::Channel(format!("telegram send failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(DoormanError::Channel(format!(
                "telegram sendMessage got {status}: {error_text}"
            )));
        }
        Ok(())
    }

    /// Send a photo (PNG bytes) with a caption to a chat.
    ///
    /// A failed send here is a delivery failure, not a channel hiccup to
    /// swallow: the caller decides what a lost welcome image means.
    pub(crate) async fn send_photo_bytes(
        &self,
        chat_id: i64,
        image: &[u8],
        caption: &str,
    ) -> Result<(), DoormanError> {
        let url = format!("{}/sendPhoto", self.base_url);

        let part = reqwest::multipart::Part::bytes(image.to_vec())
            .file_name("welcome.png")
            .mime_str("image/png")
            .map_err(|e| DoormanError::Channel(format!("mime error: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", part);

        let resp = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DoormanError::Delivery(format!("telegram sendPhoto failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(DoormanError::Delivery(format!(
                "telegram sendPhoto got {status}: {error_text}"
            )));
        }
        Ok(())
    }

    /// Whether the user is an administrator (or the creator) of the chat.
    pub(crate) async fn is_chat_admin(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<bool, DoormanError> {
        let member = self.get_chat_member(chat_id, user_id).await?;
        Ok(matches!(member.status.as_str(), "administrator" | "creator"))
    }

    pub(crate) async fn get_chat_member(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<TgChatMember, DoormanError> {
        let url = format!(
            "{}/getChatMember?chat_id={chat_id}&user_id={user_id}",
            self.base_url
        );
        let resp: TgResponse<TgChatMember> = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| DoormanError::Channel(format!("telegram getChatMember failed: {e}")))?
            .json()
            .await
            .map_err(|e| {
                DoormanError::Channel(format!("telegram getChatMember parse failed: {e}"))
            })?;

        if !resp.ok {
            return Err(DoormanError::Channel(format!(
                "telegram getChatMember error: {}",
                resp.description.unwrap_or_default()
            )));
        }
        resp.result
            .ok_or_else(|| DoormanError::Channel("getChatMember returned no member".into()))
    }

    /// Resolve the download URL of a user's current profile photo at the
    /// highest available resolution. `None` when the user has no photo.
    pub(crate) async fn profile_photo_url(
        &self,
        user_id: i64,
    ) -> Result<Option<String>, DoormanError> {
        let url = format!(
            "{}/getUserProfilePhotos?user_id={user_id}&limit=1",
            self.base_url
        );
        let resp: TgResponse<TgUserProfilePhotos> = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                DoormanError::Channel(format!("telegram getUserProfilePhotos failed: {e}"))
            })?
            .json()
            .await
            .map_err(|e| {
                DoormanError::Channel(format!("telegram getUserProfilePhotos parse failed: {e}"))
            })?;

        let photos = match resp.result {
            Some(p) if p.total_count > 0 => p.photos,
            _ => return Ok(None),
        };

        // Sizes are ordered smallest first; take the largest of the newest photo.
        let file_id = match photos.first().and_then(|sizes| sizes.last()) {
            Some(size) => size.file_id.clone(),
            None => return Ok(None),
        };

        let file_url = self.resolve_file_url(&file_id).await?;
        debug!("resolved profile photo for user {user_id}");
        Ok(Some(file_url))
    }

    /// Turn a file_id into a direct download URL via `getFile`.
    async fn resolve_file_url(&self, file_id: &str) -> Result<String, DoormanError> {
        let url = format!("{}/getFile?file_id={file_id}", self.base_url);
        let resp: TgResponse<TgFile> = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| DoormanError::Channel(format!("telegram getFile failed: {e}")))?
            .json()
            .await
            .map_err(|e| DoormanError::Channel(format!("telegram getFile parse failed: {e}")))?;

        let file_path = resp
            .result
            .and_then(|f| f.file_path)
            .ok_or_else(|| DoormanError::Channel("telegram getFile returned no file_path".into()))?;

        Ok(format!(
            "https://api.telegram.org/file/bot{}/{file_path}",
            self.config.bot_token
        ))
    }

    /// Build a [`Member`] from a chat member lookup, resolving the avatar.
    pub(crate) async fn member_from_lookup(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<Member, DoormanError> {
        let chat_member = self.get_chat_member(chat_id, user_id).await?;
        let avatar_url = self.profile_photo_url(user_id).await?;
        Ok(Member {
            id: chat_member.user.id,
            display_name: chat_member.user.display_name(),
            avatar_url,
            // Telegram does not expose account creation time.
            account_created_at: None,
        })
    }
}
