pub mod metrics;
pub mod pipeline;
pub mod provenance;
pub mod store;

pub use pipeline::{FlowAnalysis, FlowAnalyzer, RefreshOutcome};
pub use provenance::{input_hash, SENTINEL_HASH};
pub use store::{FlowStore, FlowStoreError, FlowStoreFuture, TurnFusion, TurnInput};
