//! # doorman-channels
//!
//! Chat platform integrations. Currently Telegram, via Bot API long polling.

pub mod telegram;

pub use telegram::TelegramChannel;
