//! Parser for the shared question-bank text format.
//!
//! Uploaded documents and generated text use the same grammar: blocks
//! delimited by a `Question:` keyword, option lines like `1) ...` or
//! `b. ...`, and an `Answer:` line whose digits give the 1-based correct
//! option.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::Question;

/// Keyword that opens each question block. Matched case-insensitively
/// anywhere in the text, mid-line included.
pub const QUESTION_DELIMITER: &str = "Question:";

/// Named default policy: applied when the answer line is absent, carries no
/// digits, or its digits parse to 0.
pub const DEFAULT_CORRECT_OPTION: u32 = 1;

/// Prompt used when a block somehow yields no usable first line.
const UNTITLED_PROMPT: &str = "Untitled question";

static BLOCK_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)question:").expect("block delimiter regex"));

/// One leading letter or digit, a `)` or `.`, then the option text.
static OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{Alphabetic}0-9][).]\s*(.+)$").expect("option regex"));

static ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^answer\s*:").expect("answer marker regex"));

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("no recognizable questions in the text")]
    NoQuestions,
}

/// Parse raw text into a question bank.
///
/// All-or-nothing: either at least one block parses and every parsed block
/// is returned, or `ParseError::NoQuestions`. Blocks without any option
/// lines are still valid questions. Text before the first delimiter is
/// preamble and is ignored; input without any delimiter at all is
/// unrecognizable.
pub fn parse_bank(raw: &str) -> Result<Vec<Question>, ParseError> {
    let text = raw.replace('\r', "");

    let questions: Vec<Question> = BLOCK_SPLIT_RE
        .split(&text)
        .skip(1)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(parse_block)
        .collect();

    if questions.is_empty() {
        return Err(ParseError::NoQuestions);
    }
    Ok(questions)
}

fn parse_block(block: &str) -> Question {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let prompt = lines.first().copied().unwrap_or(UNTITLED_PROMPT).to_string();

    // Every matching line counts, the prompt line included.
    let options = lines
        .iter()
        .filter_map(|line| OPTION_RE.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .collect();

    let correct_option = lines
        .iter()
        .find(|line| ANSWER_RE.is_match(line))
        .map(|line| digits_in(line))
        .unwrap_or(DEFAULT_CORRECT_OPTION);

    Question {
        prompt,
        options,
        correct_option,
    }
}

/// All ASCII digits of the line, concatenated and parsed; falls back to the
/// default policy on no digits, overflow, or a parsed 0.
fn digits_in(line: &str) -> u32 {
    let digits: String = line.chars().filter(char::is_ascii_digit).collect();
    digits
        .parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
        .unwrap_or(DEFAULT_CORRECT_OPTION)
}
