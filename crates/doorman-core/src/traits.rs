use crate::{error::DoormanError, member::Event, member::Member};
use async_trait::async_trait;

/// Messaging channel trait — the bot's connection to the chat platform.
///
/// The platform integration (Telegram, etc.) implements this to deliver
/// join events and operator commands, and to send messages and photos
/// back into chats. All chat references are numeric ids.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for events.
    /// Returns a receiver that yields joins and commands.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<Event>, DoormanError>;

    /// Send a text message to a chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DoormanError>;

    /// Send a photo (PNG bytes) to a chat with a caption.
    async fn send_photo(&self, chat_id: i64, image: &[u8], caption: &str)
        -> Result<(), DoormanError>;

    /// Look up a chat member by user id, resolving their avatar URL.
    async fn fetch_member(&self, chat_id: i64, user_id: i64) -> Result<Member, DoormanError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), DoormanError>;
}

/// Vision collaborator — turns an avatar image into a short description.
#[async_trait]
pub trait VisionDescriber: Send + Sync {
    /// Describe an image in one short sentence fragment. `gender_sensitive`
    /// asks the model not to guess the subject's gender.
    async fn describe(
        &self,
        image: &[u8],
        gender_sensitive: bool,
    ) -> Result<String, DoormanError>;
}

/// Image-generation collaborator — turns a prompt into an image URL.
///
/// Implementations classify gateway-timeout-class failures as transient
/// (`DoormanError::Generation { transient: true, .. }`) so the retry policy
/// can tell them apart from permanent errors.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, DoormanError>;
}
