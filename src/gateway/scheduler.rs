//! Deferred artifact delivery.
//!
//! Delivery is the counting point: the welcome counter is incremented only
//! after the channel send succeeds, so a crash during a delay window never
//! inflates the count for an undelivered welcome.

use doorman_core::{counter::CounterStore, traits::Channel};
use doorman_media::PipelineArtifact;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Schedules (possibly deferred) sends of finished artifacts.
#[derive(Clone)]
pub struct DeliveryScheduler {
    channel: Arc<dyn Channel>,
    counter: Arc<CounterStore>,
    admin_chat_id: i64,
}

/// Handle to a deferred delivery; lets tests (and shutdown paths) await
/// the actual send instead of racing a wall clock.
pub struct DeliveryHandle {
    handle: JoinHandle<()>,
}

impl DeliveryHandle {
    pub async fn wait(self) {
        let _ = self.handle.await;
    }
}

/// What `schedule` resolved to.
pub enum DeliveryOutcome {
    /// Sent synchronously; the counter already reflects this welcome
    /// (unless persisting failed, which is logged, not unwound).
    Delivered { welcomed_total: Option<u64> },
    /// Deferred; the send and the counter increment happen later.
    Scheduled(DeliveryHandle),
}

impl DeliveryScheduler {
    pub fn new(channel: Arc<dyn Channel>, counter: Arc<CounterStore>, admin_chat_id: i64) -> Self {
        Self {
            channel,
            counter,
            admin_chat_id,
        }
    }

    /// Deliver `artifact` to `chat_id`, now or after `delay`.
    ///
    /// `count` marks the delivery as a completed welcome: profile-picture
    /// suggestions requested via `!pfp` are delivered the same way but do
    /// not advance the welcome counter.
    ///
    /// With a zero delay the send happens inline and the outcome carries
    /// the updated count. Otherwise the call returns immediately once the
    /// delivery task is scheduled; the task survives the caller returning.
    pub async fn schedule(
        &self,
        chat_id: i64,
        caption: String,
        artifact: PipelineArtifact,
        delay: Duration,
        count: bool,
    ) -> DeliveryOutcome {
        if delay.is_zero() {
            let total = self.deliver(chat_id, &caption, artifact, count).await;
            return DeliveryOutcome::Delivered {
                welcomed_total: total,
            };
        }

        info!(
            "delivery to chat {chat_id} deferred by {}s",
            delay.as_secs()
        );
        let this = self.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.deliver(chat_id, &caption, artifact, count).await;
        });
        DeliveryOutcome::Scheduled(DeliveryHandle { handle })
    }

    /// Send the artifact and, on success, count the welcome and discard
    /// the local file. Send failures are logged; there is no retry and no
    /// rollback of admin notes already sent.
    async fn deliver(
        &self,
        chat_id: i64,
        caption: &str,
        artifact: PipelineArtifact,
        count: bool,
    ) -> Option<u64> {
        let bytes = match artifact.bytes() {
            Ok(b) => b,
            Err(e) => {
                error!("could not read artifact for delivery: {e}");
                artifact.discard();
                return None;
            }
        };

        if let Err(e) = self.channel.send_photo(chat_id, &bytes, caption).await {
            error!("delivery to chat {chat_id} failed: {e}");
            self.admin_note(&format!("Delivery to chat {chat_id} failed: {e}"))
                .await;
            artifact.discard();
            return None;
        }

        artifact.discard();

        if !count {
            return None;
        }

        match self.counter.increment().await {
            Ok(total) => {
                self.admin_note(&format!("Total members welcomed: {total}"))
                    .await;
                Some(total)
            }
            Err(e) => {
                // The member was welcomed; a persist failure must not undo that.
                error!("welcome counter not persisted: {e}");
                None
            }
        }
    }

    async fn admin_note(&self, text: &str) {
        if self.admin_chat_id == 0 {
            return;
        }
        if let Err(e) = self.channel.send_text(self.admin_chat_id, text).await {
            warn!("admin note failed: {e}");
        }
    }
}
