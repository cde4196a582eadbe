use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat-platform member. Read-only input to the welcome pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Stable platform user id.
    pub id: i64,
    /// Human-readable display name.
    pub display_name: String,
    /// Download URL for the member's current profile photo, highest
    /// resolution available. `None` when the member has no photo.
    pub avatar_url: Option<String>,
    /// Account creation time, when the platform exposes it.
    pub account_created_at: Option<DateTime<Utc>>,
}

impl Member {
    pub fn has_avatar(&self) -> bool {
        self.avatar_url.is_some()
    }

    /// Account age in years, one decimal, if the creation time is known.
    pub fn account_age_years(&self, now: DateTime<Utc>) -> Option<f64> {
        let created = self.account_created_at?;
        let days = (now - created).num_days() as f64;
        Some((days / 365.0 * 10.0).round() / 10.0)
    }
}

/// A member joined a group chat.
#[derive(Debug, Clone)]
pub struct JoinEvent {
    /// Chat the member joined.
    pub chat_id: i64,
    pub member: Member,
    pub timestamp: DateTime<Utc>,
}

/// An inbound operator command (`!`-prefixed text in a watched chat).
#[derive(Debug, Clone)]
pub struct CommandEvent {
    /// Chat the command was typed in; replies go back here.
    pub chat_id: i64,
    pub sender_id: i64,
    pub sender_name: String,
    /// Whether the sender is an administrator of the chat.
    pub sender_is_admin: bool,
    pub text: String,
}

/// Events delivered by a channel to the gateway.
#[derive(Debug, Clone)]
pub enum Event {
    Join(JoinEvent),
    Command(CommandEvent),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_account_age_years() {
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let m = Member {
            id: 1,
            display_name: "ada".into(),
            avatar_url: None,
            account_created_at: Some(created),
        };
        assert_eq!(m.account_age_years(now), Some(3.0));
    }

    #[test]
    fn test_account_age_unknown() {
        let m = Member {
            id: 1,
            display_name: "ada".into(),
            avatar_url: None,
            account_created_at: None,
        };
        assert_eq!(m.account_age_years(Utc::now()), None);
        assert!(!m.has_avatar());
    }
}
