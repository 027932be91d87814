use super::AppState;
use crate::types::Cursor;

impl AppState {
    /// Restart the session: wipe scores and round progress, keep the loaded
    /// bank. Any pending close timer is superseded so a late firing cannot
    /// touch a round opened after the reset.
    pub async fn reset(&self) {
        self.scores.write().await.clear();

        let mut bank = self.bank.write().await;
        bank.cursor = Cursor::NotStarted;
        drop(bank);

        let mut round = self.round.write().await;
        round.supersede();
        round.active = false;
        drop(round);

        tracing::info!("session reset");
    }
}
