//! Preview cards, welcome screens and their inline keyboards.
//!
//! Text builders are kept free of Telegram I/O so the exact strings can be
//! asserted in tests; the send helpers degrade from photo to Markdown text
//! to plain text rather than losing a message.

use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, Message, ParseMode};

use crate::classify::Platform;
use crate::core::config;
use crate::core::utils::{extract_hashtags, format_duration, truncate_description};
use crate::download::MediaInfo;

/// Greeting for /start.
pub const START_TEXT: &str = "Welcome — send an Instagram or YouTube link to start.";

/// Guidance for unsupported links.
pub const UNSUPPORTED_TEXT: &str = "Unsupported link. Send Instagram or YouTube public link.";

/// Reply to messages that carry no link at all, and to /help.
pub const USAGE_TEXT: &str = "📩 *Welcome to SaveMedia Bot!*\n\n\
Send me any of the following links:\n\
▶️ YouTube video → I'll give you *Video or Audio* download options.\n\
🎞 Instagram Reel → I'll fetch *video, caption, and hashtags*.\n\n\
💡 Example Links:\n\
https://www.youtube.com/watch?v=abcd1234\n\
https://www.instagram.com/reel/xyz987/\n\n\
👇 Choose your language or check for updates below.";

/// Preview card text for a YouTube link. Falls back to a generic title and
/// an empty duration line when the probe came back empty.
pub fn youtube_preview_text(info: Option<&MediaInfo>) -> String {
    let title = info
        .and_then(|i| i.title.as_deref())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("YouTube Video");
    let duration = info
        .and_then(|i| i.duration_secs)
        .map(format_duration)
        .unwrap_or_default();
    format!("*{}*\n{}\n\nChoose download type:", title, duration)
}

/// Preview card text for an Instagram link: bold title, caption snippet and
/// the deduplicated hashtag line. Degrades to a fixed notice when nothing
/// useful was probed.
pub fn instagram_preview_text(info: Option<&MediaInfo>) -> String {
    let mut text = String::new();

    if let Some(info) = info {
        if let Some(title) = info.title.as_deref().filter(|t| !t.trim().is_empty()) {
            text.push_str(&format!("*{}*\n", title));
        }
        if let Some(description) = info.description.as_deref().filter(|d| !d.trim().is_empty()) {
            text.push_str(&format!("\n{}\n", truncate_description(description)));
            let hashtags = extract_hashtags(description);
            if !hashtags.is_empty() {
                text.push('\n');
                text.push_str(&hashtags.join(" "));
            }
        }
    }

    if text.trim().is_empty() {
        text = "Instagram post found.".to_string();
    }
    text
}

/// Download buttons under a preview card. YouTube offers both modes,
/// Instagram only the video.
pub fn preview_keyboard(platform: Platform, request_id: &str) -> InlineKeyboardMarkup {
    let video = format!("download|{}|video", request_id);
    match platform {
        Platform::YouTube => {
            let audio = format!("download|{}|audio", request_id);
            InlineKeyboardMarkup::new(vec![vec![
                InlineKeyboardButton::callback("🎥 Download Video", video),
                InlineKeyboardButton::callback("🎧 Download Audio", audio),
            ]])
        }
        Platform::Instagram => InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
            "▶️ Download Video",
            video,
        )]]),
    }
}

/// Keyboard under the /start greeting: optional updates link plus the
/// language choice.
pub fn start_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    if let Some(button) = updates_button("🔗 Updates") {
        rows.push(vec![button]);
    }
    rows.push(language_buttons());
    InlineKeyboardMarkup::new(rows)
}

/// Keyboard under the usage text: language picker entry point plus the
/// optional updates link.
pub fn usage_keyboard() -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> =
        vec![vec![InlineKeyboardButton::callback("🌐 Select Language", "select_lang")]];
    if let Some(button) = updates_button("🔁 Update Bot") {
        rows.push(vec![button]);
    }
    InlineKeyboardMarkup::new(rows)
}

/// The two-language picker row as its own keyboard.
pub fn language_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![language_buttons()])
}

fn language_buttons() -> Vec<InlineKeyboardButton> {
    vec![
        InlineKeyboardButton::callback("English 🇬🇧", "lang|en"),
        InlineKeyboardButton::callback("हिन्दी 🇮🇳", "lang|hi"),
    ]
}

/// Confirmation text after picking a language.
pub fn language_confirmation(code: &str) -> &'static str {
    match code {
        "hi" => "भाषा हिन्दी सेट हुई। अब Instagram या YouTube लिंक भेजें।",
        _ => "Language set to English. Send an Instagram or YouTube link.",
    }
}

fn updates_button(label: &str) -> Option<InlineKeyboardButton> {
    let link = config::UPDATE_LINK.as_ref()?;
    match url::Url::parse(link) {
        Ok(parsed) => Some(InlineKeyboardButton::url(label, parsed)),
        Err(e) => {
            log::warn!("Ignoring invalid UPDATE_LINK {}: {}", link, e);
            None
        }
    }
}

/// Posts the "fetching info" notice shown while the probe runs. Best effort;
/// the caller deletes it once the preview is out.
pub async fn send_probing_notice(bot: &Bot, chat_id: ChatId, platform: Platform) -> Option<Message> {
    bot.send_message(chat_id, format!("🔎 Fetching {} info...", platform.display_name()))
        .await
        .ok()
}

/// Sends the preview card. Tries thumbnail photo with caption first, then a
/// Markdown text message, then plain text, so a bad thumbnail URL or broken
/// markup in a title never swallows the preview.
pub async fn send_preview(
    bot: &Bot,
    chat_id: ChatId,
    platform: Platform,
    info: Option<&MediaInfo>,
    request_id: &str,
) {
    let text = match platform {
        Platform::YouTube => youtube_preview_text(info),
        Platform::Instagram => instagram_preview_text(info),
    };
    let keyboard = preview_keyboard(platform, request_id);

    if let Some(thumbnail) = info.and_then(|i| i.thumbnail_url.as_deref()) {
        if let Ok(photo_url) = url::Url::parse(thumbnail) {
            match bot
                .send_photo(chat_id, InputFile::url(photo_url))
                .caption(&text)
                .parse_mode(ParseMode::Markdown)
                .reply_markup(keyboard.clone())
                .await
            {
                Ok(_) => return,
                Err(e) => {
                    log::warn!("Failed to send preview photo: {}, falling back to text", e);
                }
            }
        }
    }

    if let Err(e) = bot
        .send_message(chat_id, &text)
        .parse_mode(ParseMode::Markdown)
        .reply_markup(keyboard.clone())
        .await
    {
        log::warn!("Markdown preview rejected: {}, sending plain text", e);
        let _ = bot.send_message(chat_id, &text).reply_markup(keyboard).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use teloxide::types::InlineKeyboardButtonKind;

    fn callback_data(button: &InlineKeyboardButton) -> Option<&str> {
        match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => Some(data),
            _ => None,
        }
    }

    fn info(title: &str, duration: Option<u64>, description: Option<&str>) -> MediaInfo {
        MediaInfo {
            title: Some(title.to_string()),
            duration_secs: duration,
            thumbnail_url: None,
            uploader: None,
            description: description.map(|d| d.to_string()),
        }
    }

    #[test]
    fn test_youtube_preview_with_metadata() {
        let info = info("Some Song", Some(212), None);
        assert_eq!(
            youtube_preview_text(Some(&info)),
            "*Some Song*\n3m32s\n\nChoose download type:"
        );
    }

    #[test]
    fn test_youtube_preview_degrades_to_placeholder() {
        assert_eq!(youtube_preview_text(None), "*YouTube Video*\n\n\nChoose download type:");
    }

    #[test]
    fn test_instagram_preview_carries_snippet_and_hashtags() {
        let info = info("Beach reel", None, Some("Great day! #Sun #sun #Fun"));
        let text = instagram_preview_text(Some(&info));
        assert!(text.starts_with("*Beach reel*\n"));
        assert!(text.contains("Great day! #Sun #sun #Fun"));
        assert!(text.ends_with("#Sun #Fun"));
    }

    #[test]
    fn test_instagram_preview_truncates_long_captions() {
        let long = "x".repeat(900);
        let info = info("Reel", None, Some(long.as_str()));
        let text = instagram_preview_text(Some(&info));
        assert!(text.contains(&format!("{}...", "x".repeat(800))));
        assert!(!text.contains(&"x".repeat(801)));
    }

    #[test]
    fn test_instagram_preview_without_metadata() {
        assert_eq!(instagram_preview_text(None), "Instagram post found.");
        let empty = MediaInfo::default();
        assert_eq!(instagram_preview_text(Some(&empty)), "Instagram post found.");
    }

    #[test]
    fn test_youtube_keyboard_offers_both_modes() {
        let keyboard = preview_keyboard(Platform::YouTube, "abc12345");
        let rows = &keyboard.inline_keyboard;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(callback_data(&rows[0][0]), Some("download|abc12345|video"));
        assert_eq!(callback_data(&rows[0][1]), Some("download|abc12345|audio"));
    }

    #[test]
    fn test_instagram_keyboard_offers_video_only() {
        let keyboard = preview_keyboard(Platform::Instagram, "abc12345");
        let rows = &keyboard.inline_keyboard;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
        assert_eq!(callback_data(&rows[0][0]), Some("download|abc12345|video"));
    }

    #[test]
    fn test_language_keyboard_payloads() {
        let keyboard = language_keyboard();
        let row = &keyboard.inline_keyboard[0];
        assert_eq!(callback_data(&row[0]), Some("lang|en"));
        assert_eq!(callback_data(&row[1]), Some("lang|hi"));
    }

    #[test]
    fn test_language_confirmation_defaults_to_english() {
        assert!(language_confirmation("en").starts_with("Language set to English"));
        assert!(language_confirmation("hi").contains("हिन्दी"));
        assert!(language_confirmation("??").starts_with("Language set to English"));
    }
}
