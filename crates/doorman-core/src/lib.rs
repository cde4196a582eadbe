//! # doorman-core
//!
//! Core types, traits, configuration, and error handling for the Doorman bot.

pub mod config;
pub mod counter;
pub mod error;
pub mod member;
pub mod runtime;
pub mod traits;
