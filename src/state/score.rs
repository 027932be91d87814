use super::AppState;
use crate::types::*;
use std::collections::HashMap;

impl AppState {
    /// Validate and score one answer submission.
    ///
    /// Checks short-circuit in a fixed order so each failure maps to a
    /// stable wire code: missing player, then missing question, then
    /// out-of-protocol choice. `choice` is `None` when the client sent
    /// something that is not a number; that fails the same check as an
    /// out-of-range ordinal.
    ///
    /// Two behaviors are intentional and load-bearing for the deployed
    /// button clients: submissions are accepted until the next advance even
    /// after the round timer has closed, and repeat submissions from the
    /// same player are scored again rather than deduplicated.
    pub async fn submit_answer(&self, player: &str, choice: Option<u32>) -> SubmitOutcome {
        let player = player.trim();
        if player.is_empty() {
            return SubmitOutcome::Rejected(RejectReason::NoPlayer);
        }

        let bank = self.bank.read().await;
        let question = match bank.cursor {
            Cursor::At(i) => bank.items.get(i).cloned(),
            _ => None,
        };
        drop(bank);

        let Some(question) = question else {
            return SubmitOutcome::Rejected(RejectReason::NoQuestion);
        };

        let Some(choice) = choice.filter(|c| (1..=CHOICE_COUNT).contains(c)) else {
            return SubmitOutcome::Rejected(RejectReason::InvalidChoice);
        };

        let correct = choice == question.correct_option;

        // One write-lock section covers the read-modify-write, so two
        // concurrent submissions for the same player cannot lose an
        // increment. A wrong answer still creates the zero entry.
        let mut scores = self.scores.write().await;
        let entry = scores.entry(player.to_string()).or_insert(0);
        if correct {
            *entry += 1;
        }
        drop(scores);

        tracing::info!(player, choice, correct, "answer received");

        if correct {
            SubmitOutcome::Correct
        } else {
            SubmitOutcome::Wrong
        }
    }

    /// Snapshot of the full score table.
    pub async fn get_scores(&self) -> HashMap<PlayerName, u32> {
        self.scores.read().await.clone()
    }
}
