//! SaveMedia: a Telegram bot that turns YouTube and Instagram links into
//! downloadable media.
//!
//! The flow is link in, preview card out, then an inline button press runs
//! yt-dlp in a scratch directory and delivers the result back to the chat.
//! Modules:
//!
//! - [`classify`]: link extraction and platform detection
//! - [`storage`]: the in-memory ledger of pending download requests
//! - [`download`]: probing, fetching, size gating and delivery
//! - [`telegram`]: bot setup, dispatcher schema and presentation
//! - [`core`]: configuration, errors, logging and small text helpers

pub mod classify;
pub mod core;
pub mod download;
pub mod storage;
pub mod telegram;

pub use core::error::{AppError, AppResult};
