//! Per-chat conversation state kept in teloxide dialogue storage.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::diagnosis::DiagnosisSession;

/// Represents the conversation state for one chat
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotDialogueState {
    #[default]
    Idle,
    Diagnosing(DiagnosisSession),
}

impl BotDialogueState {
    pub fn is_diagnosing(&self) -> bool {
        matches!(self, BotDialogueState::Diagnosing(_))
    }
}

/// Type alias for our bot dialogue
pub type BotDialogue = Dialogue<BotDialogueState, InMemStorage<BotDialogueState>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::Question;

    #[test]
    fn test_default_state_is_idle() {
        let state = BotDialogueState::default();
        assert_eq!(state, BotDialogueState::Idle);
        assert!(!state.is_diagnosing());
    }

    #[test]
    fn test_diagnosing_state_starts_at_first_question() {
        let state = BotDialogueState::Diagnosing(DiagnosisSession::start());
        assert!(state.is_diagnosing());
        match state {
            BotDialogueState::Diagnosing(session) => {
                assert_eq!(session.question(), Question::Symptoms)
            }
            BotDialogueState::Idle => panic!("Unexpected dialogue state"),
        }
    }
}
