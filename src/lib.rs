//! # AI Reply Telegram Bot
//!
//! A Telegram bot that answers commands, shows an order menu and forwards
//! free text to a remote text-generation service, falling back to canned
//! replies when the service cannot help.

pub mod bot;
pub mod config;
pub mod dialogue;
pub mod inference;
pub mod inference_errors;
pub mod localization;
pub mod resolver;
