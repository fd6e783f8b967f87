use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fusion::FusionResult;
use crate::models::EmotionFlow;

/// One user turn as handed to the analyzer, in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnInput {
    pub turn_id: String,
    pub ordinal: usize,
    /// Raw facial classifier payload (JSON), if the classifier has finished.
    pub facial_payload: Option<String>,
    /// Raw text classifier payload (JSON), if the classifier has finished.
    pub text_payload: Option<String>,
    /// Whether the store still holds this turn's fusion result from the
    /// last saved analysis.
    pub fusion_stored: bool,
}

impl TurnInput {
    /// A turn takes part in analysis once at least one classifier reported.
    pub fn is_analyzable(&self) -> bool {
        self.facial_payload.is_some() || self.text_payload.is_some()
    }
}

/// Per-turn fusion output persisted for downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnFusion {
    pub turn_id: String,
    #[serde(flatten)]
    pub result: FusionResult,
}

#[derive(Debug, Error)]
pub enum FlowStoreError {
    #[error("conversation not found: {0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type FlowStoreFuture<T> = Pin<Box<dyn Future<Output = Result<T, FlowStoreError>> + Send>>;

/// Persistence collaborator of the analyzer.
///
/// `save_analysis` must replace the conversation's flow and every listed
/// turn's fusion result atomically. A turn's `fusion_stored` flag must turn
/// false whenever its fusion result is cleared.
pub trait FlowStore: Send + Sync {
    /// Ordered user turns of a conversation; `NotFound` if it does not exist.
    fn load_turns(&self, conversation_id: String) -> FlowStoreFuture<Vec<TurnInput>>;

    fn load_flow(&self, conversation_id: String) -> FlowStoreFuture<Option<EmotionFlow>>;

    fn save_analysis(
        &self,
        conversation_id: String,
        fusions: Vec<TurnFusion>,
        flow: EmotionFlow,
    ) -> FlowStoreFuture<()>;
}
