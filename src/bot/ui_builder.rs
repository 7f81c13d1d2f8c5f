//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::diagnosis::{Assessment, Question};
use crate::gluten_scanner::ScanResult;
use crate::localization::{t, t_args};

/// Where the scanned text came from; the two flows word their replies differently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSource {
    Image,
    Text,
}

/// One-row reply keyboard holding the question's answer choices
pub fn create_answer_keyboard(question: Question) -> KeyboardMarkup {
    let row: Vec<KeyboardButton> = question
        .choices()
        .iter()
        .map(|choice| KeyboardButton::new(*choice))
        .collect();

    KeyboardMarkup::new(vec![row])
        .one_time_keyboard()
        .resize_keyboard()
}

pub fn format_question(question: Question) -> String {
    t(question.prompt_key())
}

/// Re-prompt after an answer outside the choice set
pub fn format_invalid_answer(question: Question) -> String {
    format!("{}\n\n{}", t("invalid-answer"), format_question(question))
}

pub fn format_conclusion(assessment: &Assessment) -> String {
    t(assessment.tier.message_key())
}

/// Format the found keywords as a dashed list under the matching headline
pub fn format_scan_result(found: &ScanResult, source: ScanSource) -> String {
    if found.is_empty() {
        return match source {
            ScanSource::Image => format!("{}\n{}", t("image-no-gluten"), t("image-no-gluten-reminder")),
            ScanSource::Text => t("text-no-gluten"),
        };
    }

    let list = found
        .iter()
        .map(|keyword| format!("- {keyword}"))
        .collect::<Vec<_>>()
        .join("\n");

    match source {
        ScanSource::Image => format!(
            "{}\n{}\n\n{}",
            t("image-gluten-found"),
            list,
            t("image-gluten-warning")
        ),
        ScanSource::Text => format!("{}\n{}", t("text-gluten-found"), list),
    }
}

fn format_command_list() -> String {
    [
        t("command-start"),
        t("command-scan"),
        t("command-diagnose"),
        t("command-cancel"),
        t("command-help"),
    ]
    .join("\n")
}

pub fn format_welcome(first_name: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        t_args("welcome-greeting", &[("name", first_name)]),
        t("welcome-intro"),
        t("commands-title"),
        format_command_list()
    )
}

pub fn format_help() -> String {
    format!("{}\n{}", t("help-title"), format_command_list())
}
