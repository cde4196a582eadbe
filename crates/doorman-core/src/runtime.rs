//! Runtime-mutable settings shared across concurrent invocations.
//!
//! Operators tune these through chat commands while the bot runs. Every
//! mutation goes through a validated setter; out-of-range values are
//! rejected and the prior value kept. Readers take a [`RuntimeSettings`]
//! snapshot — changes are not retroactive to invocations that already
//! captured one.

use crate::config::WelcomeConfig;
use crate::error::DoormanError;
use std::sync::RwLock;

/// A consistent point-in-time copy of the runtime knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Chance in percent ([0, 99]) that an avatar-holding member gets the
    /// name-only wildcard prompt instead of the avatar-derived one.
    pub wildcard_chance: u8,
    /// Whether non-admins may use `!pfp`.
    pub pfp_anyone: bool,
    /// Ask the vision model not to guess gender.
    pub gender_sensitive: bool,
    /// Delay before posting the welcome image, in seconds.
    pub posting_delay_secs: u64,
}

/// Process-wide runtime configuration.
///
/// The lock is never held across an await point; mutation is atomic with
/// respect to concurrent snapshots.
pub struct RuntimeConfig {
    inner: RwLock<RuntimeSettings>,
}

impl RuntimeConfig {
    /// Seed from the static config.
    pub fn from_config(welcome: &WelcomeConfig) -> Self {
        Self {
            inner: RwLock::new(RuntimeSettings {
                wildcard_chance: welcome.wildcard_chance,
                pfp_anyone: welcome.pfp_anyone,
                gender_sensitive: welcome.gender_sensitive,
                posting_delay_secs: welcome.posting_delay_secs,
            }),
        }
    }

    /// Current settings, as one consistent copy.
    pub fn snapshot(&self) -> RuntimeSettings {
        *self.inner.read().expect("runtime settings lock poisoned")
    }

    /// Set the wildcard chance. Values above 99 are rejected; 99 is the
    /// ceiling so the avatar-derived path can never be starved entirely.
    pub fn set_wildcard_chance(&self, value: u8) -> Result<(), DoormanError> {
        if value > 99 {
            return Err(DoormanError::ConfigValidation {
                setting: "wildcard_chance".to_string(),
                reason: format!("must be between 0 and 99, got {value}"),
            });
        }
        self.inner
            .write()
            .expect("runtime settings lock poisoned")
            .wildcard_chance = value;
        Ok(())
    }

    /// Toggle `pfp_anyone`; returns the new value.
    pub fn toggle_pfp_anyone(&self) -> bool {
        let mut guard = self.inner.write().expect("runtime settings lock poisoned");
        guard.pfp_anyone = !guard.pfp_anyone;
        guard.pfp_anyone
    }

    pub fn set_gender_sensitive(&self, value: bool) {
        self.inner
            .write()
            .expect("runtime settings lock poisoned")
            .gender_sensitive = value;
    }

    pub fn set_posting_delay_secs(&self, value: u64) {
        self.inner
            .write()
            .expect("runtime settings lock poisoned")
            .posting_delay_secs = value;
    }
}
