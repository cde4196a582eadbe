//! Shared mocks for gateway tests.

use async_trait::async_trait;
use doorman_core::{
    error::DoormanError,
    member::{Event, Member},
    traits::{Channel, VisionDescriber},
};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::{mpsc, Mutex};

/// In-memory channel that records everything sent through it.
#[derive(Default)]
pub(crate) struct MockChannel {
    pub photos: Mutex<Vec<(i64, Vec<u8>, String)>>,
    pub texts: Mutex<Vec<(i64, String)>>,
    pub member: Mutex<Option<Member>>,
    fail_sends: bool,
}

impl MockChannel {
    /// A channel whose sends all fail.
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    /// Preload the member returned by `fetch_member`.
    pub async fn set_member(&self, member: Member) {
        *self.member.lock().await = Some(member);
    }
}

#[async_trait]
impl Channel for MockChannel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn start(&self) -> Result<mpsc::Receiver<Event>, DoormanError> {
        let (_tx, rx) = mpsc::channel(1);
        Ok(rx)
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DoormanError> {
        if self.fail_sends {
            return Err(DoormanError::Channel("mock send_text failure".into()));
        }
        self.texts.lock().await.push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        image: &[u8],
        caption: &str,
    ) -> Result<(), DoormanError> {
        if self.fail_sends {
            return Err(DoormanError::Delivery("mock send_photo failure".into()));
        }
        self.photos
            .lock()
            .await
            .push((chat_id, image.to_vec(), caption.to_string()));
        Ok(())
    }

    async fn fetch_member(&self, _chat_id: i64, user_id: i64) -> Result<Member, DoormanError> {
        self.member
            .lock()
            .await
            .clone()
            .ok_or_else(|| DoormanError::Channel(format!("no such member: {user_id}")))
    }

    async fn stop(&self) -> Result<(), DoormanError> {
        Ok(())
    }
}

/// Describer that returns a fixed description (or fails) and counts calls.
pub(crate) struct MockDescriber {
    pub calls: AtomicU32,
    description: Option<String>,
}

impl MockDescriber {
    pub fn with_description(description: &str) -> Self {
        Self {
            calls: AtomicU32::new(0),
            description: Some(description.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicU32::new(0),
            description: None,
        }
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionDescriber for MockDescriber {
    async fn describe(
        &self,
        _image: &[u8],
        _gender_sensitive: bool,
    ) -> Result<String, DoormanError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.description
            .clone()
            .ok_or_else(|| DoormanError::DescriptionFailed("mock describe failure".into()))
    }
}
