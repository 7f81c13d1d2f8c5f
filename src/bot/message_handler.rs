//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::io::Write;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::dialogue::{BotDialogue, BotDialogueState};
use crate::gluten_scanner::normalize_ocr_text;
use crate::localization::t;
use crate::ocr::OcrService;
use crate::ocr_errors::OcrError;

use super::commands::Command;
use super::diagnosis_handler::{cancel_diagnosis, handle_diagnosis_answer, start_diagnosis};
use super::ui_builder::{format_help, format_scan_result, format_welcome, ScanSource};
use super::BotContext;

/// Download a Telegram file into a temporary file.
///
/// The file is deleted when the returned handle is dropped.
pub async fn download_file(bot: &Bot, file_id: FileId) -> Result<NamedTempFile, OcrError> {
    let file = bot
        .get_file(file_id)
        .await
        .map_err(|e| OcrError::Download(format!("getFile failed: {e}")))?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    // reqwest errors embed the URL, which carries the bot token
    let response = reqwest::get(&url)
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| OcrError::Download(e.without_url().to_string()))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| OcrError::Download(e.without_url().to_string()))?;

    let mut temp_file = NamedTempFile::new().map_err(|e| OcrError::Download(e.to_string()))?;
    temp_file
        .write_all(&bytes)
        .and_then(|_| temp_file.flush())
        .map_err(|e| OcrError::Download(e.to_string()))?;

    debug!(bytes = bytes.len(), temp_path = %temp_file.path().display(), "Image downloaded");
    Ok(temp_file)
}

/// Download the image and run OCR on it
pub async fn read_image_text(
    bot: &Bot,
    file_id: FileId,
    file_size: u32,
    ocr: &OcrService,
) -> Result<String, OcrError> {
    let max_file_size = ocr.config().max_file_size;
    if u64::from(file_size) > max_file_size {
        return Err(OcrError::Validation(format!(
            "file is {file_size} bytes, limit is {max_file_size}"
        )));
    }

    let temp_file = download_file(bot, file_id).await?;
    ocr.extract_text(temp_file.path()).await
}

async fn scan_image(
    bot: &Bot,
    chat_id: ChatId,
    file_id: FileId,
    file_size: u32,
    context: &BotContext,
) -> Result<()> {
    bot.send_message(chat_id, t("processing-photo")).await?;

    match read_image_text(bot, file_id, file_size, &context.ocr).await {
        Ok(text) if text.is_empty() => {
            warn!(user_id = %chat_id, "OCR extraction returned empty text");
            bot.send_message(chat_id, t("error-no-text-found")).await?;
        }
        Ok(text) => {
            debug!(user_id = %chat_id, ocr_text = %text, "OCR text");
            let found = context.vocabulary.scan(&normalize_ocr_text(&text));
            info!(user_id = %chat_id, matches_found = found.len(), "Image scanned for gluten");
            bot.send_message(chat_id, format_scan_result(&found, ScanSource::Image))
                .await?;
        }
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "Error processing image");
            bot.send_message(chat_id, t("error-image-processing")).await?;
        }
    }
    Ok(())
}

async fn handle_command(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    state: BotDialogueState,
    command: Command,
) -> Result<()> {
    let chat_id = msg.chat.id;
    match command {
        Command::Start => {
            let first_name = msg
                .from
                .as_ref()
                .map(|user| user.first_name.as_str())
                .unwrap_or("there");
            bot.send_message(chat_id, format_welcome(first_name)).await?;
        }
        Command::Help => {
            bot.send_message(chat_id, format_help()).await?;
        }
        Command::Scan => {
            bot.send_message(chat_id, t("scan-prompt")).await?;
        }
        Command::Diagnose => start_diagnosis(bot, chat_id, dialogue).await?,
        Command::Cancel => cancel_diagnosis(bot, chat_id, dialogue, state).await?,
        Command::Unknown(name) => {
            debug!(user_id = %chat_id, command = %name, "Unknown command");
            bot.send_message(chat_id, t("unknown-command")).await?;
        }
    }
    Ok(())
}

async fn handle_text_message(
    bot: &Bot,
    msg: &Message,
    dialogue: BotDialogue,
    context: &BotContext,
    text: &str,
) -> Result<()> {
    let chat_id = msg.chat.id;
    debug!(user_id = %chat_id, message_length = text.len(), "Received text message from user");

    let state = dialogue.get().await?.unwrap_or_default();
    let command = Command::parse(text);

    match (state, command) {
        // An active questionnaire only reacts to these two commands
        (state, Some(command @ (Command::Cancel | Command::Diagnose))) => {
            handle_command(bot, msg, dialogue, state, command).await
        }
        (BotDialogueState::Diagnosing(session), _) => {
            handle_diagnosis_answer(bot, chat_id, dialogue, session, text).await
        }
        (state @ BotDialogueState::Idle, Some(command)) => {
            handle_command(bot, msg, dialogue, state, command).await
        }
        (BotDialogueState::Idle, None) => {
            let found = context.vocabulary.scan(text);
            info!(user_id = %chat_id, matches_found = found.len(), "Text scanned for gluten");
            bot.send_message(chat_id, format_scan_result(&found, ScanSource::Text))
                .await?;
            Ok(())
        }
    }
}

async fn handle_photo_message(bot: &Bot, msg: &Message, context: &BotContext) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received photo message from user");

    // Telegram lists sizes smallest first
    if let Some(largest_photo) = msg.photo().and_then(|photos| photos.last()) {
        scan_image(
            bot,
            msg.chat.id,
            largest_photo.file.id.clone(),
            largest_photo.file.size,
            context,
        )
        .await?;
    }
    Ok(())
}

async fn handle_document_message(bot: &Bot, msg: &Message, context: &BotContext) -> Result<()> {
    let Some(doc) = msg.document() else {
        return Ok(());
    };

    let is_image = doc
        .mime_type
        .as_ref()
        .is_some_and(|mime| mime.type_() == "image");

    if is_image {
        debug!(user_id = %msg.chat.id, "Received image document from user");
        scan_image(bot, msg.chat.id, doc.file.id.clone(), doc.file.size, context).await?;
    } else {
        debug!(user_id = %msg.chat.id, mime_type = ?doc.mime_type, "Received non-image document from user");
        bot.send_message(msg.chat.id, t("error-unsupported-format")).await?;
    }
    Ok(())
}

async fn handle_unsupported_message(bot: &Bot, msg: &Message) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received unsupported message type from user");
    bot.send_message(msg.chat.id, t("unsupported-message")).await?;
    Ok(())
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: BotDialogue,
    context: Arc<BotContext>,
) -> Result<()> {
    if let Some(text) = msg.text() {
        handle_text_message(&bot, &msg, dialogue, &context, text).await?;
    } else if msg.photo().is_some() {
        handle_photo_message(&bot, &msg, &context).await?;
    } else if msg.document().is_some() {
        handle_document_message(&bot, &msg, &context).await?;
    } else {
        handle_unsupported_message(&bot, &msg).await?;
    }

    Ok(())
}
