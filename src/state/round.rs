use super::AppState;
use crate::types::*;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Live round bookkeeping.
///
/// The epoch ties every scheduled close timer to the round that armed it.
/// Superseding a round bumps the epoch and aborts the pending handle, so a
/// timer that already slipped past the abort still finds a mismatched epoch
/// and does nothing. At most one timer is pending at any instant.
#[derive(Debug, Default)]
pub struct RoundState {
    pub(crate) active: bool,
    pub(crate) epoch: u64,
    pub(crate) timer: Option<JoinHandle<()>>,
}

impl RoundState {
    /// Invalidate and cancel whatever timer is pending; returns the new
    /// epoch for the caller to arm a fresh one.
    pub(crate) fn supersede(&mut self) -> u64 {
        self.epoch += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.epoch
    }
}

impl AppState {
    /// Open the next round: step the cursor, publish the question, arm a
    /// fresh close timer. At the end of the bank the cursor parks on
    /// `Exhausted` and stays there until a reload or reset.
    pub async fn advance(&self) -> AdvanceOutcome {
        let mut bank = self.bank.write().await;
        if bank.items.is_empty() {
            return AdvanceOutcome::NoBankLoaded;
        }

        let next = match bank.cursor {
            Cursor::NotStarted => 0,
            Cursor::At(i) => i + 1,
            Cursor::Exhausted => bank.items.len(),
        };

        if next >= bank.items.len() {
            bank.cursor = Cursor::Exhausted;
            drop(bank);

            let mut round = self.round.write().await;
            round.supersede();
            round.active = false;
            return AdvanceOutcome::EndOfBank;
        }

        bank.cursor = Cursor::At(next);
        let question = bank.items[next].clone();
        drop(bank);

        let mut round = self.round.write().await;
        let epoch = round.supersede();
        round.active = true;
        round.timer = Some(self.spawn_close_timer(epoch));
        drop(round);

        tracing::info!(index = next, "round opened");

        AdvanceOutcome::Opened(RoundSnapshot {
            question_index: next,
            question: question.prompt,
            options: question.options,
            time: ROUND_SECONDS,
        })
    }

    /// Single-shot task that closes the round when the time budget runs out.
    /// It only clears the active flag; the cursor is never touched.
    fn spawn_close_timer(&self, epoch: u64) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(ROUND_SECONDS)).await;

            let mut round = state.round.write().await;
            if round.epoch != epoch {
                // A later advance or reset superseded this timer while it
                // slept.
                return;
            }
            round.active = false;
            round.timer = None;
            tracing::info!("round closed by timer");
        })
    }

    /// Side-effect-free view of the selected question. Safe to call at any
    /// time, including before the first advance.
    pub async fn current(&self) -> CurrentSnapshot {
        let bank = self.bank.read().await;
        match bank.cursor {
            Cursor::At(i) => match bank.items.get(i) {
                Some(q) => CurrentSnapshot {
                    question_index: i as i64,
                    question: Some(q.prompt.clone()),
                    options: q.options.clone(),
                },
                None => CurrentSnapshot {
                    question_index: NO_QUESTION_INDEX,
                    question: None,
                    options: Vec::new(),
                },
            },
            _ => CurrentSnapshot {
                question_index: NO_QUESTION_INDEX,
                question: None,
                options: Vec::new(),
            },
        }
    }

    /// Answer key for the selected question, or `None` when nothing is
    /// selected. An out-of-range correct index yields the placeholder text
    /// instead of an error.
    pub async fn answer_key(&self) -> Option<AnswerKey> {
        let bank = self.bank.read().await;
        let Cursor::At(i) = bank.cursor else {
            return None;
        };
        let question = bank.items.get(i)?;

        Some(AnswerKey {
            correct: question.correct_option,
            text: question
                .correct_text()
                .unwrap_or(MISSING_OPTION_PLACEHOLDER)
                .to_string(),
        })
    }

    /// Whether the round timer is still running.
    pub async fn is_accepting(&self) -> bool {
        self.round.read().await.active
    }
}
