//! Prompt selection — which of the three strategies greets this member,
//! and the final prompt text for each.

use doorman_core::{
    config::{PLACEHOLDER_AVATAR, PLACEHOLDER_USERNAME},
    member::Member,
    runtime::RuntimeSettings,
};

/// Which prompt-generation path an invocation takes. Also routes delivery:
/// `NoAvatar` artifacts are offered as profile pictures in the general
/// chat, the others are posted to the welcome chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Member has no profile photo (or an operator forced this path):
    /// generate a profile picture from the name alone.
    NoAvatar,
    /// Randomly selected name-only welcome image, skipping the
    /// avatar-description call.
    Wildcard,
    /// Welcome image derived from a vision description of the avatar.
    AvatarDerived,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAvatar => "no-avatar",
            Self::Wildcard => "wildcard",
            Self::AvatarDerived => "avatar-derived",
        }
    }
}

/// Pick the strategy for one invocation.
///
/// `roll` is a uniform draw from [0, 100). The wildcard comparison is
/// strict (`roll < chance`), so chance 0 never fires and chance 99 fires
/// 99 times in 100, never always.
pub fn choose(member: &Member, settings: &RuntimeSettings, roll: u8, force_pfp: bool) -> Strategy {
    if force_pfp || !member.has_avatar() {
        return Strategy::NoAvatar;
    }
    if roll < settings.wildcard_chance {
        Strategy::Wildcard
    } else {
        Strategy::AvatarDerived
    }
}

/// Name-only profile picture prompt, for members without one.
pub fn profile_pic_prompt(display_name: &str) -> String {
    format!(
        "To the best of your ability, create a profile picture for the user \
         \"{display_name}\" inspired by their name. Image only, no text. \
         Circular to ease cropping."
    )
}

/// Name-only welcome image prompt.
pub fn wildcard_prompt(display_name: &str) -> String {
    format!(
        "Generate a welcome image for the user \"{display_name}\", be inspired \
         by that username to create an image that represents that username to \
         the best of your abilities. Add the text \"Welcome {display_name}\" \
         to the image."
    )
}

/// Splice the member name and avatar description into the configured
/// template. The template is validated at startup to carry each
/// placeholder exactly once.
pub fn render_template(template: &str, display_name: &str, description: &str) -> String {
    template
        .replace(PLACEHOLDER_USERNAME, display_name)
        .replace(PLACEHOLDER_AVATAR, description)
}
