//! Diagnosis handler: drives a chat's [`DiagnosisSession`] and renders each
//! transition back to Telegram.

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::KeyboardRemove;
use tracing::{debug, info};

use crate::diagnosis::{DiagnosisSession, Question, Transition};
use crate::dialogue::{BotDialogue, BotDialogueState};
use crate::localization::t;

use super::ui_builder::{create_answer_keyboard, format_conclusion, format_invalid_answer, format_question};

async fn ask(bot: &Bot, chat_id: ChatId, question: Question) -> Result<()> {
    bot.send_message(chat_id, format_question(question))
        .reply_markup(create_answer_keyboard(question))
        .await?;
    Ok(())
}

/// Begin a fresh questionnaire, replacing any session already in progress
pub async fn start_diagnosis(bot: &Bot, chat_id: ChatId, dialogue: BotDialogue) -> Result<()> {
    let session = DiagnosisSession::start();
    info!(user_id = %chat_id, "Starting diagnosis");
    ask(bot, chat_id, session.question()).await?;
    dialogue.update(BotDialogueState::Diagnosing(session)).await?;
    Ok(())
}

/// Apply one text reply to the chat's session
pub async fn handle_diagnosis_answer(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: BotDialogue,
    session: DiagnosisSession,
    text: &str,
) -> Result<()> {
    match session.answer(text) {
        Transition::Ask(next) => {
            ask(bot, chat_id, next.question()).await?;
            dialogue.update(BotDialogueState::Diagnosing(next)).await?;
        }
        Transition::Rejected(same) => {
            debug!(user_id = %chat_id, question = %same.question(), "Re-asking after invalid answer");
            bot.send_message(chat_id, format_invalid_answer(same.question()))
                .reply_markup(create_answer_keyboard(same.question()))
                .await?;
        }
        Transition::Concluded(assessment) => {
            info!(
                user_id = %chat_id,
                score = assessment.score.value(),
                tier = %assessment.tier,
                "Sending diagnosis conclusion"
            );
            dialogue.exit().await?;
            bot.send_message(chat_id, format_conclusion(&assessment))
                .reply_markup(KeyboardRemove::new())
                .await?;
        }
        Transition::Cancelled => {
            dialogue.exit().await?;
        }
    }
    Ok(())
}

/// Handle `/cancel`: drop the session unscored if there is one
pub async fn cancel_diagnosis(
    bot: &Bot,
    chat_id: ChatId,
    dialogue: BotDialogue,
    state: BotDialogueState,
) -> Result<()> {
    match state {
        BotDialogueState::Diagnosing(session) => {
            session.cancel();
            dialogue.exit().await?;
            info!(user_id = %chat_id, "Diagnosis cancelled by user");
            bot.send_message(chat_id, t("assessment-cancelled"))
                .reply_markup(KeyboardRemove::new())
                .await?;
        }
        BotDialogueState::Idle => {
            bot.send_message(chat_id, t("no-active-assessment")).await?;
        }
    }
    Ok(())
}
