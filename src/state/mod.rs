mod bank;
mod round;
mod score;
mod session;

pub use round::RoundState;

use crate::ingest::{PlainTextExtractor, TextExtractor};
use crate::llm::LlmManager;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared session state.
///
/// One active session, one active question. Handlers never hold two of the
/// locks at once: each operation acquires a lock, copies what it needs, and
/// releases before touching the next field.
#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<RwLock<QuestionBank>>,
    pub round: Arc<RwLock<RoundState>>,
    pub scores: Arc<RwLock<HashMap<PlayerName, u32>>>,
    /// Generation backend chain; `None` when no provider is configured.
    pub generator: Option<Arc<LlmManager>>,
    /// Upload ingestion seam.
    pub extractor: Arc<dyn TextExtractor>,
}

impl AppState {
    pub fn new() -> Self {
        Self::new_with_llm(None)
    }

    pub fn new_with_llm(manager: Option<LlmManager>) -> Self {
        Self {
            bank: Arc::new(RwLock::new(QuestionBank::default())),
            round: Arc::new(RwLock::new(RoundState::default())),
            scores: Arc::new(RwLock::new(HashMap::new())),
            generator: manager.map(Arc::new),
            extractor: Arc::new(PlainTextExtractor),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
