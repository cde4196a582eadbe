//! Gateway — the event loop connecting the chat channel to the welcome
//! pipeline.
//!
//! Each member join spawns an independent invocation; operator commands
//! are dispatched inline. Failures are isolated per invocation and never
//! crash the process.

pub mod prompt;
pub mod scheduler;
mod welcome;

#[cfg(test)]
pub(crate) mod testutil;
#[cfg(test)]
mod tests;

use doorman_core::{
    config::ChatConfig,
    counter::CounterStore,
    member::Event,
    runtime::RuntimeConfig,
    traits::{Channel, VisionDescriber},
};
use doorman_media::MediaPipeline;
use scheduler::DeliveryScheduler;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// The central gateway routing events into welcome invocations.
pub struct Gateway {
    pub(crate) channel: Arc<dyn Channel>,
    pub(crate) describer: Arc<dyn VisionDescriber>,
    pub(crate) media: MediaPipeline,
    pub(crate) runtime: Arc<RuntimeConfig>,
    pub(crate) counter: Arc<CounterStore>,
    pub(crate) chats: ChatConfig,
    pub(crate) prompt_template: String,
    pub(crate) scheduler: DeliveryScheduler,
    /// Members with an in-flight invocation. A second trigger for the same
    /// member while one is pending is skipped, not queued.
    pub(crate) in_flight: Mutex<HashSet<i64>>,
}

impl Gateway {
    pub fn new(
        channel: Arc<dyn Channel>,
        describer: Arc<dyn VisionDescriber>,
        media: MediaPipeline,
        runtime: Arc<RuntimeConfig>,
        counter: Arc<CounterStore>,
        chats: ChatConfig,
        prompt_template: String,
    ) -> Self {
        let scheduler = DeliveryScheduler::new(channel.clone(), counter.clone(), chats.admin_chat_id);
        Self {
            channel,
            describer,
            media,
            runtime,
            counter,
            chats,
            prompt_template,
            scheduler,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Run the main event loop.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Doorman gateway running | channel: {} | welcome chat: {}",
            self.channel.name(),
            self.chats.welcome_chat_id,
        );

        let mut rx = self
            .channel
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start channel: {e}"))?;

        while let Some(event) = rx.recv().await {
            match event {
                Event::Join(join) => {
                    info!(
                        "member joined chat {}: {} ({})",
                        join.chat_id, join.member.display_name, join.member.id
                    );
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.handle_join(join.member, false).await;
                    });
                }
                Event::Command(cmd) => {
                    let gw = self.clone();
                    tokio::spawn(async move {
                        crate::commands::handle(&gw, cmd).await;
                    });
                }
            }
        }

        info!("event stream ended, shutting down");
        self.channel.stop().await.ok();
        Ok(())
    }

    /// Mirror a notable event to the admin chat. Best-effort: a lost admin
    /// note never affects the pipeline.
    pub(crate) async fn admin_note(&self, text: &str) {
        info!("{text}");
        if self.chats.admin_chat_id == 0 {
            return;
        }
        if let Err(e) = self.channel.send_text(self.chats.admin_chat_id, text).await {
            warn!("admin note failed: {e}");
        }
    }

    /// Claim an in-flight slot for a member. Returns false if an invocation
    /// for them is already pending.
    pub(crate) async fn begin_invocation(&self, member_id: i64) -> bool {
        self.in_flight.lock().await.insert(member_id)
    }

    pub(crate) async fn finish_invocation(&self, member_id: i64) {
        self.in_flight.lock().await.remove(&member_id);
    }
}
