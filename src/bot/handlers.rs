//! Command and message handlers.

use crate::bot::pipeline::{self, DownloadRequest};
use crate::bot::resilient;
use crate::bot::sender::TelegramSender;
use crate::download::{cleanup, url, Extractor};
use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;
use tracing::{error, info};

/// Supported bot commands
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    #[command(description = "Start the bot.")]
    Start,
    #[command(description = "How to use the bot.")]
    Help,
}

const WELCOME_TEXT: &str = "👋 <b>Welcome to Instagram Downloader Bot!</b>\n\n\
📹 Send me an Instagram link and I'll download it for you.\n\n\
<b>Supported content:</b>\n\
• Posts (videos &amp; photos)\n\
• Reels\n\
• Stories (requires cookies)\n\
• Carousels (multiple items)\n\n\
<b>Just send me a link!</b>\n\n\
⚠️ Note: For private stories, set the <code>COOKIES_CONTENT</code> env var.";

const HELP_TEXT: &str = "ℹ️ <b>How to use this bot:</b>\n\n\
1️⃣ Copy an Instagram link (post, reel, or story)\n\
2️⃣ Send it to me\n\
3️⃣ Receive your media!\n\n\
<b>Supported formats:</b>\n\
• https://www.instagram.com/p/...\n\
• https://www.instagram.com/reel/...\n\
• https://www.instagram.com/stories/...\n\n\
<b>Setup:</b>\n\
If stories fail, provide a fresh <code>COOKIES_CONTENT</code> value.";

const INVALID_LINK_TEXT: &str = "❌ Please send me a valid Instagram link.\n\
Use /help to see supported formats.";

const MEDIA_REJECTION_TEXT: &str = "ℹ️ I can't process media directly.\n\
Please send me an Instagram link instead!\n\n\
Use /help to see how to use this bot.";

const STATUS_DOWNLOADING_TEXT: &str = "⏳ Downloading content... Please wait.";

const GENERIC_FAILURE_TEXT: &str = "❌ <b>An error occurred.</b>\n\n\
Please try again or contact support.";

/// Requesting user id, or 0 when the update carries none.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Handle /start
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn start(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, WELCOME_TEXT)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Handle /help
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn help(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, HELP_TEXT)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Reject messages carrying media attachments.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn reject_media(bot: Bot, msg: Message) -> Result<()> {
    bot.send_message(msg.chat.id, MEDIA_REJECTION_TEXT).await?;
    Ok(())
}

/// Handle a private text message: classify the link and run the pipeline.
///
/// Extraction and resolution failures edit the progress message with a
/// classified cause; anything a failed run left on disk is swept.
///
/// # Errors
///
/// Returns an error only when replying to the user is impossible.
pub async fn handle_text(bot: Bot, msg: Message, extractor: Arc<Extractor>) -> Result<()> {
    let text = msg.text().unwrap_or("");
    let Some(link) = url::extract_link(text) else {
        bot.send_message(msg.chat.id, INVALID_LINK_TEXT).await?;
        return Ok(());
    };

    let request = DownloadRequest::new(link.to_string(), get_user_id_safe(&msg));
    let status =
        resilient::send_message_resilient(&bot, msg.chat.id, STATUS_DOWNLOADING_TEXT, None).await?;
    let sender = TelegramSender::new(bot.clone(), msg.chat.id, status.id);

    match pipeline::run(&sender, extractor.as_ref(), &request).await {
        Ok(report) => {
            info!(
                user_id = request.user_id,
                run = %request.run,
                delivered = report.delivered,
                failed = report.failed.len(),
                oversize = report.oversize.is_some(),
                "Request processed"
            );
        }
        Err(e) => {
            error!(user_id = request.user_id, run = %request.run, error = %e, "Download failed");
            resilient::edit_message_safe_resilient(
                &bot,
                msg.chat.id,
                status.id,
                &e.user_message(),
            )
            .await;
            // A killed or failed extraction can still leave partial files
            cleanup::sweep_run(extractor.download_dir(), request.run).await;
        }
    }

    Ok(())
}

/// Last-resort reply for faults the pipeline did not classify.
///
/// # Errors
///
/// Returns an error if the reply cannot be sent.
pub async fn report_unexpected_failure(bot: Bot, chat_id: ChatId) -> Result<()> {
    bot.send_message(chat_id, GENERIC_FAILURE_TEXT)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
