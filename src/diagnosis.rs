//! # Diagnosis Module
//!
//! The celiac risk questionnaire as an explicit finite-state machine.
//!
//! A [`DiagnosisSession`] asks the [`Question`]s in a fixed order. Each answer
//! is validated against the question's choices before it is recorded; the
//! transition table in [`next_question`] decides what comes next. When the
//! last question is answered the session is consumed and an [`Assessment`]
//! is produced. Cancelling consumes the session without scoring it.
//!
//! Scoring is a pure function of [`SessionAnswers`]:
//!
//! | Answer | Points |
//! |---|---|
//! | symptoms Yes / Sometimes | 1 |
//! | diet Yes / Sometimes | 1 |
//! | family history Yes | 1 |
//! | blood test Positive | 2 |
//! | blood test Borderline | 1 |

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// A closed set of answer labels shown on a reply keyboard
pub trait Choice: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    /// Exact match against a label, ignoring surrounding whitespace
    fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.iter().copied().find(|choice| choice.label() == text)
    }
}

/// Answer to the symptoms and diet questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Yes,
    No,
    Sometimes,
}

impl Choice for Frequency {
    const ALL: &'static [Self] = &[Frequency::Yes, Frequency::No, Frequency::Sometimes];

    fn label(self) -> &'static str {
        match self {
            Frequency::Yes => "Yes",
            Frequency::No => "No",
            Frequency::Sometimes => "Sometimes",
        }
    }
}

impl Frequency {
    fn weight(self) -> u8 {
        match self {
            Frequency::Yes | Frequency::Sometimes => 1,
            Frequency::No => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FamilyHistory {
    Yes,
    No,
    Unknown,
}

impl Choice for FamilyHistory {
    const ALL: &'static [Self] = &[FamilyHistory::Yes, FamilyHistory::No, FamilyHistory::Unknown];

    fn label(self) -> &'static str {
        match self {
            FamilyHistory::Yes => "Yes",
            FamilyHistory::No => "No",
            FamilyHistory::Unknown => "Unknown",
        }
    }
}

impl FamilyHistory {
    fn weight(self) -> u8 {
        match self {
            FamilyHistory::Yes => 1,
            FamilyHistory::No | FamilyHistory::Unknown => 0,
        }
    }
}

/// Raw answer to "have you had a blood test?"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodTestAnswer {
    Yes,
    No,
    NotTested,
}

impl Choice for BloodTestAnswer {
    const ALL: &'static [Self] = &[BloodTestAnswer::Yes, BloodTestAnswer::No, BloodTestAnswer::NotTested];

    fn label(self) -> &'static str {
        match self {
            BloodTestAnswer::Yes => "Yes",
            BloodTestAnswer::No => "No",
            BloodTestAnswer::NotTested => "Not tested",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TestResult {
    Positive,
    Negative,
    Borderline,
}

impl Choice for TestResult {
    const ALL: &'static [Self] = &[TestResult::Positive, TestResult::Negative, TestResult::Borderline];

    fn label(self) -> &'static str {
        match self {
            TestResult::Positive => "Positive",
            TestResult::Negative => "Negative",
            TestResult::Borderline => "Borderline",
        }
    }
}

impl TestResult {
    fn weight(self) -> u8 {
        match self {
            TestResult::Positive => 2,
            TestResult::Borderline => 1,
            TestResult::Negative => 0,
        }
    }
}

/// Recorded blood-test status.
///
/// A test result can only be stored under `Taken`, so answers never carry a
/// result for a test the user did not have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodTest {
    /// `result` stays `None` until the results question is answered
    Taken { result: Option<TestResult> },
    NotTaken,
    NotTested,
}

impl From<BloodTestAnswer> for BloodTest {
    fn from(answer: BloodTestAnswer) -> Self {
        match answer {
            BloodTestAnswer::Yes => BloodTest::Taken { result: None },
            BloodTestAnswer::No => BloodTest::NotTaken,
            BloodTestAnswer::NotTested => BloodTest::NotTested,
        }
    }
}

/// Answers collected so far in one user's questionnaire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionAnswers {
    pub symptoms: Option<Frequency>,
    pub diet: Option<Frequency>,
    pub family_history: Option<FamilyHistory>,
    pub blood_test: Option<BloodTest>,
}

impl SessionAnswers {
    pub fn test_result(&self) -> Option<TestResult> {
        match self.blood_test {
            Some(BloodTest::Taken { result }) => result,
            _ => None,
        }
    }

    /// Store a validated answer under its question's field.
    ///
    /// A test result arriving without a prior "Yes" to the blood test is
    /// dropped.
    fn record(&mut self, answer: Answer) {
        match answer {
            Answer::Symptoms(value) => self.symptoms = Some(value),
            Answer::Diet(value) => self.diet = Some(value),
            Answer::FamilyHistory(value) => self.family_history = Some(value),
            Answer::BloodTest(value) => self.blood_test = Some(value.into()),
            Answer::TestResults(value) => {
                if let Some(BloodTest::Taken { result }) = &mut self.blood_test {
                    *result = Some(value);
                }
            }
        }
    }
}

/// The question a session is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Question {
    Symptoms,
    Diet,
    FamilyHistory,
    BloodTest,
    TestResults,
}

const FREQUENCY_CHOICES: &[&str] = &["Yes", "No", "Sometimes"];
const FAMILY_HISTORY_CHOICES: &[&str] = &["Yes", "No", "Unknown"];
const BLOOD_TEST_CHOICES: &[&str] = &["Yes", "No", "Not tested"];
const TEST_RESULT_CHOICES: &[&str] = &["Positive", "Negative", "Borderline"];

impl Question {
    pub const FIRST: Question = Question::Symptoms;

    /// Labels accepted for this question, in keyboard order
    pub fn choices(self) -> &'static [&'static str] {
        match self {
            Question::Symptoms | Question::Diet => FREQUENCY_CHOICES,
            Question::FamilyHistory => FAMILY_HISTORY_CHOICES,
            Question::BloodTest => BLOOD_TEST_CHOICES,
            Question::TestResults => TEST_RESULT_CHOICES,
        }
    }

    /// Message catalog key of the prompt
    pub fn prompt_key(self) -> &'static str {
        match self {
            Question::Symptoms => "question-symptoms",
            Question::Diet => "question-diet",
            Question::FamilyHistory => "question-family-history",
            Question::BloodTest => "question-blood-test",
            Question::TestResults => "question-test-results",
        }
    }

    /// Field name the answer is stored under
    pub fn answer_key(self) -> &'static str {
        match self {
            Question::Symptoms => "symptoms",
            Question::Diet => "diet",
            Question::FamilyHistory => "family_history",
            Question::BloodTest => "blood_test",
            Question::TestResults => "test_results",
        }
    }

    /// Validate raw input for this question
    pub fn parse(self, text: &str) -> Option<Answer> {
        match self {
            Question::Symptoms => Frequency::from_label(text).map(Answer::Symptoms),
            Question::Diet => Frequency::from_label(text).map(Answer::Diet),
            Question::FamilyHistory => FamilyHistory::from_label(text).map(Answer::FamilyHistory),
            Question::BloodTest => BloodTestAnswer::from_label(text).map(Answer::BloodTest),
            Question::TestResults => TestResult::from_label(text).map(Answer::TestResults),
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.answer_key())
    }
}

/// A validated answer, tagged with the question it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Symptoms(Frequency),
    Diet(Frequency),
    FamilyHistory(FamilyHistory),
    BloodTest(BloodTestAnswer),
    TestResults(TestResult),
}

/// Transition table: the question that follows `question` once `answer` is
/// recorded, or `None` when the questionnaire is complete.
pub fn next_question(question: Question, answer: &Answer) -> Option<Question> {
    match (question, answer) {
        (Question::Symptoms, _) => Some(Question::Diet),
        (Question::Diet, _) => Some(Question::FamilyHistory),
        (Question::FamilyHistory, _) => Some(Question::BloodTest),
        (Question::BloodTest, Answer::BloodTest(BloodTestAnswer::Yes)) => Some(Question::TestResults),
        (Question::BloodTest, _) => None,
        (Question::TestResults, _) => None,
    }
}

/// Numeric risk score in `0..=RiskScore::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RiskScore(u8);

impl RiskScore {
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Score answers. Missing answers contribute nothing, so this is total over
/// partial sessions too.
pub fn risk_score(answers: &SessionAnswers) -> RiskScore {
    let symptoms = answers.symptoms.map_or(0, Frequency::weight);
    let diet = answers.diet.map_or(0, Frequency::weight);
    let family = answers.family_history.map_or(0, FamilyHistory::weight);
    let blood = answers.test_result().map_or(0, TestResult::weight);
    RiskScore(symptoms + diet + family + blood)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    High,
    Possible,
    Low,
}

impl RiskTier {
    pub fn from_score(score: RiskScore) -> Self {
        match score.value() {
            0 => RiskTier::Low,
            1 | 2 => RiskTier::Possible,
            _ => RiskTier::High,
        }
    }

    /// Message catalog key of the conclusion text
    pub fn message_key(self) -> &'static str {
        match self {
            RiskTier::High => "conclusion-high",
            RiskTier::Possible => "conclusion-possible",
            RiskTier::Low => "conclusion-low",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskTier::High => "High likelihood",
            RiskTier::Possible => "Possible risk",
            RiskTier::Low => "Low likelihood",
        };
        f.write_str(name)
    }
}

/// Final result of a completed questionnaire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assessment {
    pub score: RiskScore,
    pub tier: RiskTier,
}

impl Assessment {
    pub fn from_answers(answers: &SessionAnswers) -> Self {
        let score = risk_score(answers);
        Self {
            score,
            tier: RiskTier::from_score(score),
        }
    }
}

/// One user's questionnaire in progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisSession {
    question: Question,
    answers: SessionAnswers,
}

/// Outcome of feeding input to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Answer accepted; ask the session's next question
    Ask(DiagnosisSession),
    /// Input did not match the current question's choices; ask it again
    Rejected(DiagnosisSession),
    /// Last answer accepted; the session is finished
    Concluded(Assessment),
    /// Session abandoned; answers were discarded unscored
    Cancelled,
}

impl DiagnosisSession {
    pub fn start() -> Self {
        Self {
            question: Question::FIRST,
            answers: SessionAnswers::default(),
        }
    }

    pub fn question(&self) -> Question {
        self.question
    }

    pub fn answers(&self) -> &SessionAnswers {
        &self.answers
    }

    /// Feed one user reply to the session.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use celiac_bot::diagnosis::{DiagnosisSession, Question, Transition};
    ///
    /// let session = DiagnosisSession::start();
    /// match session.answer("Sometimes") {
    ///     Transition::Ask(next) => assert_eq!(next.question(), Question::Diet),
    ///     other => panic!("unexpected transition: {other:?}"),
    /// }
    /// ```
    pub fn answer(mut self, text: &str) -> Transition {
        let Some(answer) = self.question.parse(text) else {
            debug!(question = %self.question, "Rejected answer outside the choice set");
            return Transition::Rejected(self);
        };

        self.answers.record(answer);
        match next_question(self.question, &answer) {
            Some(next) => {
                debug!(from = %self.question, to = %next, "Diagnosis advanced");
                self.question = next;
                Transition::Ask(self)
            }
            None => {
                let assessment = Assessment::from_answers(&self.answers);
                info!(
                    score = assessment.score.value(),
                    tier = %assessment.tier,
                    "Diagnosis concluded"
                );
                Transition::Concluded(assessment)
            }
        }
    }

    pub fn cancel(self) -> Transition {
        debug!(question = %self.question, "Diagnosis cancelled");
        Transition::Cancelled
    }
}

impl Default for DiagnosisSession {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_labels_round_trip_with_question_choices() {
        for question in [
            Question::Symptoms,
            Question::Diet,
            Question::FamilyHistory,
            Question::BloodTest,
            Question::TestResults,
        ] {
            for label in question.choices() {
                assert!(question.parse(label).is_some(), "{question} should accept {label}");
            }
        }
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(Question::Symptoms.parse(" Yes "), Some(Answer::Symptoms(Frequency::Yes)));
        assert_eq!(Question::Symptoms.parse("yes"), None);
        assert_eq!(Question::Symptoms.parse("Unknown"), None);
        assert_eq!(Question::FamilyHistory.parse("Sometimes"), None);
    }

    #[test]
    fn test_transition_table() {
        let yes = Answer::BloodTest(BloodTestAnswer::Yes);
        let no = Answer::BloodTest(BloodTestAnswer::No);
        assert_eq!(next_question(Question::BloodTest, &yes), Some(Question::TestResults));
        assert_eq!(next_question(Question::BloodTest, &no), None);
        assert_eq!(
            next_question(Question::TestResults, &Answer::TestResults(TestResult::Negative)),
            None
        );
    }

    #[test]
    fn test_result_requires_taken_blood_test() {
        let mut answers = SessionAnswers::default();
        answers.record(Answer::BloodTest(BloodTestAnswer::No));
        answers.record(Answer::TestResults(TestResult::Positive));
        assert_eq!(answers.test_result(), None);
        assert_eq!(risk_score(&answers).value(), 0);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskTier::from_score(RiskScore(0)), RiskTier::Low);
        assert_eq!(RiskTier::from_score(RiskScore(1)), RiskTier::Possible);
        assert_eq!(RiskTier::from_score(RiskScore(2)), RiskTier::Possible);
        assert_eq!(RiskTier::from_score(RiskScore(3)), RiskTier::High);
        assert_eq!(RiskTier::from_score(RiskScore(5)), RiskTier::High);
    }

    #[test]
    fn test_empty_answers_score_zero() {
        assert_eq!(Assessment::from_answers(&SessionAnswers::default()).tier, RiskTier::Low);
    }
}
