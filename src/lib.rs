//! Advent Bot - Conversational reminder extraction.
//!
//! This crate turns free-form chat turns into structured reminders by running
//! an ask/final dialogue against a YandexGPT completion service, and delivers a
//! daily digest of due reminders to every active conversation.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
