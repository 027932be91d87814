use super::AppState;
use crate::bank::{parse_bank, ParseError};
use crate::types::Cursor;

impl AppState {
    /// Replace the loaded bank wholesale and reset the cursor.
    ///
    /// Parsing happens before the lock is taken; on failure the previous
    /// bank and cursor are left exactly as they were. There is no partial
    /// replacement.
    pub async fn load_bank(&self, raw_text: &str) -> Result<usize, ParseError> {
        let questions = parse_bank(raw_text)?;
        let count = questions.len();

        let mut bank = self.bank.write().await;
        bank.items = questions;
        bank.cursor = Cursor::NotStarted;
        drop(bank);

        tracing::info!(count, "question bank replaced");
        Ok(count)
    }

    pub async fn bank_size(&self) -> usize {
        self.bank.read().await.items.len()
    }
}
