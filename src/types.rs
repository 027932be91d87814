use serde::{Deserialize, Serialize};

/// Player identifier as submitted by the button clients. Not authenticated.
pub type PlayerName = String;

/// Number of answer buttons the wire protocol supports, independent of how
/// many options a particular question actually has.
pub const CHOICE_COUNT: u32 = 4;

/// Seconds a round stays open before the close timer fires.
pub const ROUND_SECONDS: u64 = 15;

/// Index reported by `/current` when no question is selected.
pub const NO_QUESTION_INDEX: i64 = -1;

/// Text shown in the answer key when `correct_option` points past the
/// parsed options.
pub const MISSING_OPTION_PLACEHOLDER: &str = "—";

/// A single quiz question. Created in bulk when a bank is loaded and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    /// Nominally four entries, but the grammar tolerates fewer (or none).
    pub options: Vec<String>,
    /// 1-based index of the correct option. Always >= 1, not guaranteed to
    /// be in range of `options` for malformed input.
    pub correct_option: u32,
}

impl Question {
    /// Text of the correct option, if `correct_option` is in range.
    pub fn correct_text(&self) -> Option<&str> {
        let idx = (self.correct_option as usize).checked_sub(1)?;
        self.options.get(idx).map(String::as_str)
    }
}

/// Position of the session within the loaded bank.
///
/// Invariant: `At(i)` implies `i < items.len()`; load and advance both
/// mutate cursor and items under the same write lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    NotStarted,
    At(usize),
    Exhausted,
}

/// The loaded question bank plus the session cursor into it.
#[derive(Debug, Default)]
pub struct QuestionBank {
    pub items: Vec<Question>,
    pub cursor: Cursor,
}

/// Result of asking for the next question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Opened(RoundSnapshot),
    NoBankLoaded,
    EndOfBank,
}

/// What the moderator sees when a round opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSnapshot {
    pub question_index: usize,
    pub question: String,
    pub options: Vec<String>,
    /// Full time budget of the round in seconds.
    pub time: u64,
}

/// Side-effect-free view of the currently selected question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentSnapshot {
    /// Raw cursor position, or [`NO_QUESTION_INDEX`] when nothing is selected.
    pub question_index: i64,
    pub question: Option<String>,
    pub options: Vec<String>,
}

/// The moderator's answer key for the selected question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerKey {
    /// 1-based index as parsed from the bank.
    pub correct: u32,
    pub text: String,
}

/// Why an answer submission was not scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoPlayer,
    NoQuestion,
    InvalidChoice,
}

/// Outcome of one answer submission, as reported back to the button client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Correct,
    Wrong,
    Rejected(RejectReason),
}

impl SubmitOutcome {
    /// Fixed plain-text codes understood by the embedded clients.
    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Wrong => "wrong",
            Self::Rejected(RejectReason::NoPlayer) => "no_player",
            Self::Rejected(RejectReason::NoQuestion) => "no_question",
            Self::Rejected(RejectReason::InvalidChoice) => "invalid_choice",
        }
    }
}
