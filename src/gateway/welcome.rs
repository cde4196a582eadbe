//! The welcome orchestrator — one state machine per triggered member:
//! Selecting → Generating → Delivering → Completed | Failed.

use super::prompt::{self, Strategy};
use super::scheduler::DeliveryOutcome;
use super::Gateway;
use doorman_core::{error::DoormanError, member::Member, runtime::RuntimeSettings};
use rand::Rng;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

impl Gateway {
    /// Run one welcome invocation for a member. `force_pfp` is the
    /// operator override: generate a profile picture from the name alone
    /// regardless of avatar presence, deliver it as a suggestion, and do
    /// not count it as a welcome.
    ///
    /// Errors never escape: every failure is logged with the member and
    /// stage, mirrored to the admin chat, and ends only this invocation.
    pub(crate) async fn handle_join(&self, member: Member, force_pfp: bool) {
        if !self.begin_invocation(member.id).await {
            info!(
                "invocation already in flight for member {}, skipping",
                member.id
            );
            self.admin_note(&format!(
                "Skipping re-trigger for \"{}\": a welcome is already in progress.",
                member.display_name
            ))
            .await;
            return;
        }

        self.welcome_member(&member, force_pfp).await;
        self.finish_invocation(member.id).await;
    }

    async fn welcome_member(&self, member: &Member, force_pfp: bool) {
        let invocation = Uuid::new_v4();
        let settings = self.runtime.snapshot();

        let age = match member.account_age_years(chrono::Utc::now()) {
            Some(years) => format!(" - account is {years} years old"),
            None => String::new(),
        };
        self.admin_note(&format!(
            "Triggering welcome for \"{}\"{age}.",
            member.display_name
        ))
        .await;

        // --- Selecting ---
        let (prompt_text, strategy) = self.build_prompt(member, &settings, force_pfp).await;
        info!(
            %invocation,
            member = member.id,
            strategy = strategy.as_str(),
            "prompt selected"
        );
        self.admin_note(&format!("Prompt: {prompt_text}")).await;

        // --- Generating ---
        let artifact = match self.media.produce(&prompt_text, &member.display_name).await {
            Ok(artifact) => artifact,
            Err(e) => {
                self.fail(invocation, member, "generating", &e).await;
                return;
            }
        };

        // --- Delivering ---
        let (target_chat, caption) = self.route(member, strategy);
        let delay = Duration::from_secs(settings.posting_delay_secs);
        let count = !force_pfp;
        match self
            .scheduler
            .schedule(target_chat, caption, artifact, delay, count)
            .await
        {
            DeliveryOutcome::Delivered { welcomed_total } => {
                info!(
                    %invocation,
                    member = member.id,
                    total = welcomed_total,
                    "welcome completed"
                );
            }
            DeliveryOutcome::Scheduled(_handle) => {
                info!(
                    %invocation,
                    member = member.id,
                    delay_secs = settings.posting_delay_secs,
                    "welcome delivery scheduled"
                );
            }
        }
    }

    /// Build the final prompt, degrading gracefully when the avatar cannot
    /// be fetched or described: a failed vision step falls back to the
    /// name-only wildcard prompt instead of aborting the welcome.
    pub(crate) async fn build_prompt(
        &self,
        member: &Member,
        settings: &RuntimeSettings,
        force_pfp: bool,
    ) -> (String, Strategy) {
        let roll: u8 = rand::thread_rng().gen_range(0..100);
        let strategy = prompt::choose(member, settings, roll, force_pfp);

        match strategy {
            Strategy::NoAvatar => (prompt::profile_pic_prompt(&member.display_name), strategy),
            Strategy::Wildcard => (prompt::wildcard_prompt(&member.display_name), strategy),
            Strategy::AvatarDerived => {
                match self
                    .avatar_description(member, settings.gender_sensitive)
                    .await
                {
                    Ok(description) => (
                        prompt::render_template(
                            &self.prompt_template,
                            &member.display_name,
                            &description,
                        ),
                        strategy,
                    ),
                    Err(e) => {
                        warn!(
                            member = member.id,
                            "avatar description failed, using name-only prompt: {e}"
                        );
                        self.admin_note(&format!(
                            "Could not describe the avatar of \"{}\" ({e}), \
                             falling back to a name-only prompt.",
                            member.display_name
                        ))
                        .await;
                        (
                            prompt::wildcard_prompt(&member.display_name),
                            Strategy::Wildcard,
                        )
                    }
                }
            }
        }
    }

    async fn avatar_description(
        &self,
        member: &Member,
        gender_sensitive: bool,
    ) -> Result<String, DoormanError> {
        let url = member
            .avatar_url
            .as_deref()
            .ok_or_else(|| DoormanError::DescriptionFailed("member has no avatar".into()))?;
        let bytes = self.media.fetch(url).await?;
        self.describer.describe(&bytes, gender_sensitive).await
    }

    /// Route by strategy: profile-picture suggestions go to the general
    /// chat, welcome images to the welcome chat.
    fn route(&self, member: &Member, strategy: Strategy) -> (i64, String) {
        match strategy {
            Strategy::NoAvatar => {
                let chat = if self.chats.general_chat_id != 0 {
                    self.chats.general_chat_id
                } else {
                    self.chats.welcome_chat_id
                };
                (
                    chat,
                    format!(
                        "Hey {}, you don't have a profile pic yet - do you want to \
                         use this one we made for you, based on your username?",
                        member.display_name
                    ),
                )
            }
            Strategy::Wildcard | Strategy::AvatarDerived => (
                self.chats.welcome_chat_id,
                format!("Welcome, {}!", member.display_name),
            ),
        }
    }

    async fn fail(&self, invocation: Uuid, member: &Member, stage: &str, e: &DoormanError) {
        error!(%invocation, member = member.id, stage, "welcome failed: {e}");
        self.admin_note(&format!(
            "Welcome for \"{}\" failed while {stage}: {e}",
            member.display_name
        ))
        .await;
    }
}
