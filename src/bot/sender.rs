//! Outbound transport seam for the delivery pipeline.
//!
//! The pipeline talks to Telegram through [`MediaSender`] so tests can
//! substitute an in-memory double.

use crate::bot::resilient;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, MessageId};

/// Everything the delivery pipeline sends to the requester.
#[async_trait]
pub trait MediaSender: Send + Sync {
    /// Send an image file with a caption.
    async fn send_photo(&self, path: &Path, caption: &str) -> Result<()>;

    /// Send a video file with a caption, streamable in the client.
    async fn send_video(&self, path: &Path, caption: &str) -> Result<()>;

    /// Send any other file as a generic document with a caption.
    async fn send_document(&self, path: &Path, caption: &str) -> Result<()>;

    /// Send a plain text message (per-item failure notices).
    async fn send_text(&self, text: &str) -> Result<()>;

    /// Edit the progress message in place. Best-effort; returns whether the
    /// edit was applied.
    async fn edit_status(&self, text: &str) -> bool;

    /// Delete the progress message. Best-effort.
    async fn delete_status(&self);
}

/// [`MediaSender`] over the Telegram Bot API, bound to one chat and one
/// progress message.
pub struct TelegramSender {
    bot: Bot,
    chat_id: ChatId,
    status_id: MessageId,
}

impl TelegramSender {
    /// Bind a sender to the chat and the progress message it will mutate.
    #[must_use]
    pub const fn new(bot: Bot, chat_id: ChatId, status_id: MessageId) -> Self {
        Self {
            bot,
            chat_id,
            status_id,
        }
    }
}

#[async_trait]
impl MediaSender for TelegramSender {
    async fn send_photo(&self, path: &Path, caption: &str) -> Result<()> {
        self.bot
            .send_photo(self.chat_id, InputFile::file(path))
            .caption(caption)
            .await?;
        Ok(())
    }

    async fn send_video(&self, path: &Path, caption: &str) -> Result<()> {
        self.bot
            .send_video(self.chat_id, InputFile::file(path))
            .caption(caption)
            .supports_streaming(true)
            .await?;
        Ok(())
    }

    async fn send_document(&self, path: &Path, caption: &str) -> Result<()> {
        self.bot
            .send_document(self.chat_id, InputFile::file(path))
            .caption(caption)
            .await?;
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }

    async fn edit_status(&self, text: &str) -> bool {
        resilient::edit_message_safe_resilient(&self.bot, self.chat_id, self.status_id, text).await
    }

    async fn delete_status(&self) {
        resilient::delete_message_safe(&self.bot, self.chat_id, self.status_id).await;
    }
}
