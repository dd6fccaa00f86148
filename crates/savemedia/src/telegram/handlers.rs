//! Dispatcher schema and update handlers.
//!
//! The handler tree mirrors the bot's surface: commands, link messages,
//! media echoes, a usage fallback for plain text, and callback queries for
//! the inline buttons. Branch order matters; the usage fallback must come
//! after commands and links so it only catches leftovers.

use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, InputFile, Message, ParseMode};

use crate::classify::{self, LinkScan};
use crate::download::{self, metadata, DownloadMode};
use crate::storage::RequestLedger;
use crate::telegram::bot::Command;
use crate::telegram::preview;

/// Error type handlers report to the dispatcher.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies shared by all handlers.
#[derive(Clone)]
pub struct HandlerDeps {
    pub ledger: Arc<RequestLedger>,
}

/// Builds the complete handler tree. The same schema is used in production
/// and can be plugged into a test dispatcher.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_links = deps.clone();
    let deps_callbacks = deps;

    dptree::entry()
        .branch(command_handler())
        .branch(link_message_handler(deps_links))
        .branch(media_echo_handler())
        .branch(fallback_text_handler())
        .branch(callback_handler(deps_callbacks))
}

/// Handler for /start and /help.
fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("Received command {:?} from chat {}", cmd, msg.chat.id);
            match cmd {
                Command::Start => {
                    let _ = bot
                        .send_message(msg.chat.id, preview::START_TEXT)
                        .reply_markup(preview::start_keyboard())
                        .await;
                }
                Command::Help => {
                    send_usage(&bot, msg.chat.id).await;
                }
            }
            Ok(())
        },
    ))
}

/// Handler for messages that contain a URL.
fn link_message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|text| classify::extract_url(text).is_some()).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Some(text) = msg.text() {
                    handle_link_message(&bot, msg.chat.id, text, &deps).await;
                }
                Ok(())
            }
        })
}

async fn handle_link_message(bot: &Bot, chat_id: ChatId, text: &str, deps: &HandlerDeps) {
    match classify::scan(text) {
        LinkScan::Supported(url, platform) => {
            log::info!("Classified {} link from chat {}: {}", platform.display_name(), chat_id, url);
            let notice = preview::send_probing_notice(bot, chat_id, platform).await;

            let info = metadata::probe(&url).await;
            let request_id = deps.ledger.create(url, platform).await;
            preview::send_preview(bot, chat_id, platform, info.as_ref(), &request_id).await;

            if let Some(notice) = notice {
                let _ = bot.delete_message(chat_id, notice.id).await;
            }
        }
        LinkScan::Unsupported(url) => {
            log::debug!("Unsupported link from chat {}: {}", chat_id, url);
            let _ = bot.send_message(chat_id, preview::UNSUPPORTED_TEXT).await;
        }
        // The branch filter only admits messages with a URL; kept so a
        // filter change cannot silently drop the reply.
        LinkScan::NoUrl => {
            let _ = bot.send_message(chat_id, "Send a valid link.").await;
        }
    }
}

/// Handler that echoes received media back by file id.
fn media_echo_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.video().is_some() || msg.photo().is_some() || msg.document().is_some())
        .endpoint(|bot: Bot, msg: Message| async move {
            echo_media(&bot, &msg).await;
            Ok(())
        })
}

async fn echo_media(bot: &Bot, msg: &Message) {
    let chat_id = msg.chat.id;
    if let Some(video) = msg.video() {
        let _ = bot
            .send_video(chat_id, InputFile::file_id(video.file.id.clone()))
            .caption("Saved video")
            .await;
    } else if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        let _ = bot
            .send_photo(chat_id, InputFile::file_id(photo.file.id.clone()))
            .caption("Saved photo")
            .await;
    } else if let Some(document) = msg.document() {
        let _ = bot
            .send_document(chat_id, InputFile::file_id(document.file.id.clone()))
            .caption("Saved document")
            .await;
    }
}

/// Handler for any remaining text: shows the usage card.
fn fallback_text_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(|bot: Bot, msg: Message| async move {
            send_usage(&bot, msg.chat.id).await;
            Ok(())
        })
}

async fn send_usage(bot: &Bot, chat_id: ChatId) {
    if let Err(e) = bot
        .send_message(chat_id, preview::USAGE_TEXT)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(preview::usage_keyboard())
        .await
    {
        log::warn!("Markdown usage message rejected: {}, sending plain text", e);
        let _ = bot
            .send_message(chat_id, preview::USAGE_TEXT)
            .reply_markup(preview::usage_keyboard())
            .await;
    }
}

/// Handler for inline keyboard presses.
fn callback_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
        let deps = deps.clone();
        async move {
            handle_callback(bot, q, deps).await;
            Ok(())
        }
    })
}

async fn handle_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) {
    let callback_id = q.id.clone();
    let Some(data) = q.data else {
        let _ = bot.answer_callback_query(callback_id).await;
        return;
    };
    let chat_id = q.message.as_ref().map(|m| m.chat().id);

    if let Some(code) = data.strip_prefix("lang|") {
        let _ = bot.answer_callback_query(callback_id).await;
        if let Some(chat_id) = chat_id {
            let _ = bot.send_message(chat_id, preview::language_confirmation(code)).await;
        }
    } else if data == "select_lang" {
        let _ = bot.answer_callback_query(callback_id).await;
        if let Some(chat_id) = chat_id {
            let _ = bot
                .send_message(chat_id, "🌐 Select Language")
                .reply_markup(preview::language_keyboard())
                .await;
        }
    } else if data.starts_with("download|") {
        handle_download_callback(bot, callback_id, chat_id, &data, deps).await;
    } else {
        // Buttons from old bot versions land here; just stop the spinner.
        log::debug!("Ignoring unknown callback payload: {}", data);
        let _ = bot.answer_callback_query(callback_id).await;
    }
}

/// Parses a `download|<id>|<mode>` payload. Returns `None` for anything
/// malformed: wrong segment count, empty id, unknown mode.
pub fn parse_download_payload(data: &str) -> Option<(&str, DownloadMode)> {
    let parts: Vec<&str> = data.split('|').collect();
    match parts.as_slice() {
        ["download", request_id, mode] if !request_id.is_empty() => {
            DownloadMode::parse(mode).map(|parsed| (*request_id, parsed))
        }
        _ => None,
    }
}

async fn handle_download_callback(
    bot: Bot,
    callback_id: CallbackQueryId,
    chat_id: Option<ChatId>,
    data: &str,
    deps: HandlerDeps,
) {
    let Some((request_id, mode)) = parse_download_payload(data) else {
        log::warn!("Malformed download payload: {}", data);
        let _ = bot.answer_callback_query(callback_id).text("Invalid request.").await;
        return;
    };

    let Some(chat_id) = chat_id else {
        // The source message is gone or inaccessible; nowhere to reply.
        let _ = bot.answer_callback_query(callback_id).await;
        return;
    };

    match deps.ledger.consume(request_id).await {
        None => {
            let _ = bot
                .answer_callback_query(callback_id)
                .text("Request expired. Send link again.")
                .await;
        }
        Some(entry) => {
            let _ = bot.answer_callback_query(callback_id).text("Starting download...").await;
            download::spawn_download(bot, chat_id, request_id.to_string(), entry, mode, Arc::clone(&deps.ledger));
        }
    }
}
