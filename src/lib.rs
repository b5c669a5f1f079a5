//! Instagram media relay bot for Telegram.
//!
//! Accepts an Instagram link in a private message, downloads the linked media
//! through `yt-dlp`, and sends the resulting files back to the requester.

/// Telegram surface: handlers, delivery pipeline, resilient messaging
pub mod bot;
/// Configuration and settings management
pub mod config;
/// Download core: URL classification, extraction, resolution, cleanup
pub mod download;
/// Text and size formatting helpers, Telegram retry
pub mod utils;
