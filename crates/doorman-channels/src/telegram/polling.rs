//! Long-polling update loop and Channel trait implementation.

use super::types::{TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use doorman_core::{
    error::DoormanError,
    member::{CommandEvent, Event, JoinEvent, Member},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

impl Clone for TelegramChannel {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            chats: self.chats.clone(),
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            last_update_id: self.last_update_id.clone(),
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<Event>, DoormanError> {
        let (tx, rx) = mpsc::channel(64);
        let chan = self.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let last = chan.last_update_id.lock().await;
                let offset = last.map(|id| id + 1);
                drop(last);

                let mut url = format!("{}/getUpdates?timeout=30", chan.base_url);
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match chan
                    .client
                    .get(&url)
                    .timeout(std::time::Duration::from_secs(35))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                // Successful poll -- reset backoff.
                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *chan.last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let msg = match update.message {
                        Some(m) => m,
                        None => continue,
                    };

                    // --- Member joins ---
                    if let Some(ref joined) = msg.new_chat_members {
                        if chan.chats.group_chat_id != 0 && msg.chat.id != chan.chats.group_chat_id
                        {
                            debug!("ignoring join in unwatched chat {}", msg.chat.id);
                            continue;
                        }
                        for user in joined.iter().filter(|u| !u.is_bot) {
                            let avatar_url = match chan.profile_photo_url(user.id).await {
                                Ok(url) => url,
                                Err(e) => {
                                    warn!("avatar lookup failed for {}: {e}", user.id);
                                    None
                                }
                            };
                            let event = Event::Join(JoinEvent {
                                chat_id: msg.chat.id,
                                member: Member {
                                    id: user.id,
                                    display_name: user.display_name(),
                                    avatar_url,
                                    account_created_at: None,
                                },
                                timestamp: chrono::Utc::now(),
                            });
                            if tx.send(event).await.is_err() {
                                info!("telegram channel receiver dropped, stopping poll");
                                return;
                            }
                        }
                        continue;
                    }

                    // --- Operator commands ---
                    let (text, user) = match (msg.text.as_ref(), msg.from.as_ref()) {
                        (Some(t), Some(u)) => (t, u),
                        _ => continue,
                    };
                    if !text.starts_with('!') {
                        continue;
                    }
                    // Commands are only accepted from the admin and general chats.
                    if msg.chat.id != chan.chats.admin_chat_id
                        && msg.chat.id != chan.chats.general_chat_id
                    {
                        debug!("ignoring command in unwatched chat {}", msg.chat.id);
                        continue;
                    }

                    let sender_is_admin =
                        match chan.is_chat_admin(chan.chats.group_chat_id, user.id).await {
                            Ok(admin) => admin,
                            Err(e) => {
                                warn!("admin lookup failed for {}: {e}", user.id);
                                false
                            }
                        };

                    let event = Event::Command(CommandEvent {
                        chat_id: msg.chat.id,
                        sender_id: user.id,
                        sender_name: user.display_name(),
                        sender_is_admin,
                        text: text.clone(),
                    });
                    if tx.send(event).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), DoormanError> {
        self.send_message(chat_id, text).await
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        image: &[u8],
        caption: &str,
    ) -> Result<(), DoormanError> {
        self.send_photo_bytes(chat_id, image, caption).await
    }

    async fn fetch_member(&self, chat_id: i64, user_id: i64) -> Result<Member, DoormanError> {
        self.member_from_lookup(chat_id, user_id).await
    }

    async fn stop(&self) -> Result<(), DoormanError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}
