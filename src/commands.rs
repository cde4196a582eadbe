//! Operator commands — `!`-prefixed text in the admin or general chat.

use crate::gateway::Gateway;
use doorman_core::member::CommandEvent;
use std::sync::Arc;
use tracing::{info, warn};

/// Known operator commands.
pub enum Command {
    /// Show the current wildcard chance.
    WildcardShow,
    /// Set the wildcard chance (admin only).
    WildcardSet(String),
    /// Toggle whether anyone may use `!pfp` (admin only).
    PfpAnyone,
    /// Generate a profile picture for a member by user id.
    Pfp(String),
    /// Manually welcome a member by user id (admin only).
    Welcome(String),
    Help,
}

impl Command {
    /// Parse a command from message text. Returns `None` for unknown `!`
    /// prefixes, which are silently ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let cmd = parts.next()?;
        let arg = parts.next().map(str::to_string);
        match (cmd, arg) {
            ("!wildcard", None) => Some(Self::WildcardShow),
            ("!wildcard", Some(value)) => Some(Self::WildcardSet(value)),
            ("!pfp-anyone", _) => Some(Self::PfpAnyone),
            ("!pfp", Some(user)) => Some(Self::Pfp(user)),
            ("!pfp", None) => Some(Self::Help),
            ("!welcome", Some(user)) => Some(Self::Welcome(user)),
            ("!welcome", None) => Some(Self::Help),
            ("!help", _) => Some(Self::Help),
            _ => None,
        }
    }
}

/// Handle one inbound command event. Replies go back to the chat the
/// command was typed in.
pub async fn handle(gw: &Arc<Gateway>, ev: CommandEvent) {
    let Some(cmd) = Command::parse(&ev.text) else {
        return;
    };
    info!(
        "command from {} ({}, admin: {}): {}",
        ev.sender_name, ev.sender_id, ev.sender_is_admin, ev.text
    );

    match cmd {
        Command::WildcardShow => {
            let chance = gw.runtime.snapshot().wildcard_chance;
            reply(gw, ev.chat_id, &format!("Wildcard chance is {chance}%.")).await;
        }
        Command::WildcardSet(value) => handle_wildcard_set(gw, &ev, &value).await,
        Command::PfpAnyone => {
            if !ev.sender_is_admin {
                reply(gw, ev.chat_id, "Only admins can change that.").await;
                return;
            }
            let enabled = gw.runtime.toggle_pfp_anyone();
            let state = if enabled { "enabled" } else { "disabled" };
            reply(gw, ev.chat_id, &format!("!pfp for everyone is now {state}.")).await;
        }
        Command::Pfp(user) => handle_trigger(gw, &ev, &user, true).await,
        Command::Welcome(user) => handle_trigger(gw, &ev, &user, false).await,
        Command::Help => reply(gw, ev.chat_id, HELP_TEXT).await,
    }
}

async fn handle_wildcard_set(gw: &Arc<Gateway>, ev: &CommandEvent, value: &str) {
    if !ev.sender_is_admin {
        reply(gw, ev.chat_id, "Only admins can change that.").await;
        return;
    }
    let parsed = value.parse::<u8>().ok();
    let accepted = match parsed {
        Some(v) => gw.runtime.set_wildcard_chance(v).is_ok(),
        None => false,
    };
    if accepted {
        reply(
            gw,
            ev.chat_id,
            &format!("Wildcard chance set to {value}%."),
        )
        .await;
    } else {
        reply(gw, ev.chat_id, "Wildcard value must be between 0 and 99.").await;
    }
}

/// Resolve the target member and run the welcome pipeline for them.
/// `!pfp` forces the name-only profile-picture path and is open to
/// everyone when the pfp-anyone toggle is on; `!welcome` is admin only.
async fn handle_trigger(gw: &Arc<Gateway>, ev: &CommandEvent, user: &str, force_pfp: bool) {
    let allowed = if force_pfp {
        ev.sender_is_admin || gw.runtime.snapshot().pfp_anyone
    } else {
        ev.sender_is_admin
    };
    if !allowed {
        reply(gw, ev.chat_id, "You are not allowed to do that.").await;
        return;
    }

    let Ok(user_id) = user.parse::<i64>() else {
        reply(gw, ev.chat_id, "Give me a numeric user id.").await;
        return;
    };

    let member = match gw.channel.fetch_member(gw.chats.group_chat_id, user_id).await {
        Ok(m) => m,
        Err(e) => {
            warn!("member lookup for {user_id} failed: {e}");
            reply(gw, ev.chat_id, &format!("Could not find user {user_id}.")).await;
            return;
        }
    };

    reply(
        gw,
        ev.chat_id,
        &format!("On it - generating for {}.", member.display_name),
    )
    .await;
    gw.handle_join(member, force_pfp).await;
}

async fn reply(gw: &Arc<Gateway>, chat_id: i64, text: &str) {
    if let Err(e) = gw.channel.send_text(chat_id, text).await {
        warn!("command reply failed: {e}");
    }
}

const HELP_TEXT: &str = "Commands:\n\
    !wildcard - show the wildcard chance\n\
    !wildcard <0-99> - set the wildcard chance (admin)\n\
    !pfp-anyone - toggle !pfp for everyone (admin)\n\
    !pfp <user-id> - generate a profile picture for a member\n\
    !welcome <user-id> - welcome a member manually (admin)\n\
    !help - this message";
