use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::emotion::{Distribution, EmotionLabel};
use crate::flow::metrics::compute_metrics;
use crate::flow::provenance::{input_hash, SENTINEL_HASH};
use crate::flow::store::{FlowStore, FlowStoreError, TurnFusion, TurnInput};
use crate::fusion::{facial_observation, fuse, text_observation, FusionConfig};
use crate::models::{EmotionFlow, FlowMetrics, FlowParams, Segment};
use crate::segmentation::{segment_conversation, smooth, SegmentationConfig};
use crate::settings::AnalysisSettings;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::log_info;

/// Everything computed for one conversation, minus the generation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowAnalysis {
    pub fusions: Vec<TurnFusion>,
    pub segments: Vec<Segment>,
    pub metrics: FlowMetrics,
    pub params: FlowParams,
    pub input_hash: String,
}

impl FlowAnalysis {
    pub fn to_flow(&self, generated_at: DateTime<Utc>) -> EmotionFlow {
        EmotionFlow {
            segments: self.segments.clone(),
            metrics: self.metrics.clone(),
            params: self.params.clone(),
            input_hash: self.input_hash.clone(),
            generated_at,
        }
    }

    /// Whether `stored` was produced from the same inputs and parameters.
    pub fn matches(&self, stored: &EmotionFlow) -> bool {
        stored.input_hash == self.input_hash && stored.params == self.params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The stored result was current and nothing was written.
    Unchanged(EmotionFlow),
    Recomputed(EmotionFlow),
}

impl RefreshOutcome {
    pub fn flow(&self) -> &EmotionFlow {
        match self {
            RefreshOutcome::Unchanged(flow) | RefreshOutcome::Recomputed(flow) => flow,
        }
    }

    pub fn was_recomputed(&self) -> bool {
        matches!(self, RefreshOutcome::Recomputed(_))
    }
}

/// Runs the fuse -> smooth -> segment -> metrics pipeline.
///
/// Holds configuration only, so one analyzer can serve any number of
/// conversations concurrently.
#[derive(Debug, Clone, Default)]
pub struct FlowAnalyzer {
    fusion: FusionConfig,
    segmentation: SegmentationConfig,
}

impl FlowAnalyzer {
    pub fn new(fusion: FusionConfig, segmentation: SegmentationConfig) -> Self {
        Self {
            fusion,
            segmentation,
        }
    }

    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self::new(settings.fusion.clone(), settings.segmentation.clone())
    }

    /// Pure analysis of a conversation's turns. Turns without any classifier
    /// payload are skipped; the rest are analyzed in ordinal order and
    /// segment indices refer to positions in that sequence.
    pub fn analyze(&self, conversation_id: &str, turns: &[TurnInput]) -> FlowAnalysis {
        let params = FlowParams::from(&self.segmentation);

        let mut analyzable: Vec<&TurnInput> =
            turns.iter().filter(|turn| turn.is_analyzable()).collect();
        analyzable.sort_by_key(|turn| turn.ordinal);

        // Edge case: nothing analyzable
        if analyzable.is_empty() {
            return FlowAnalysis {
                fusions: Vec::new(),
                segments: Vec::new(),
                metrics: FlowMetrics::empty(),
                params,
                input_hash: SENTINEL_HASH.to_string(),
            };
        }

        let fusions: Vec<TurnFusion> = analyzable
            .iter()
            .map(|turn| {
                let face = facial_observation(turn.facial_payload.as_deref(), &self.fusion);
                let text = text_observation(turn.text_payload.as_deref(), &self.fusion);
                TurnFusion {
                    turn_id: turn.turn_id.clone(),
                    result: fuse(&text, &face, &self.fusion),
                }
            })
            .collect();

        let fused: Vec<Distribution> = fusions.iter().map(|f| f.result.distribution).collect();
        let confidences: Vec<f64> = fusions.iter().map(|f| f.result.confidence).collect();

        let smoothed = smooth(&fused, self.segmentation.smoothing_beta);
        let segments = segment_conversation(&smoothed, &confidences, &self.segmentation);

        let labels: Vec<EmotionLabel> = smoothed.iter().map(|d| d.argmax().0).collect();
        let metrics = compute_metrics(&labels);

        let input_hash = input_hash(
            conversation_id,
            fusions
                .iter()
                .map(|f| (f.turn_id.as_str(), &f.result.distribution)),
        );

        FlowAnalysis {
            fusions,
            segments,
            metrics,
            params,
            input_hash,
        }
    }

    /// Analyze a stored conversation and overwrite its result.
    pub async fn recompute<S>(
        &self,
        store: &S,
        conversation_id: &str,
    ) -> Result<EmotionFlow, FlowStoreError>
    where
        S: FlowStore + ?Sized,
    {
        let turns = store.load_turns(conversation_id.to_string()).await?;
        let analysis = self.analyze(conversation_id, &turns);
        self.persist(store, conversation_id, analysis).await
    }

    /// Like [`FlowAnalyzer::recompute`], but leaves the stored result alone
    /// when it was produced from the same inputs and parameters and every
    /// analyzed turn still has its fusion result stored.
    pub async fn refresh<S>(
        &self,
        store: &S,
        conversation_id: &str,
    ) -> Result<RefreshOutcome, FlowStoreError>
    where
        S: FlowStore + ?Sized,
    {
        let turns = store.load_turns(conversation_id.to_string()).await?;
        let analysis = self.analyze(conversation_id, &turns);

        let fusions_intact = turns
            .iter()
            .filter(|turn| turn.is_analyzable())
            .all(|turn| turn.fusion_stored);

        if let Some(stored) = store.load_flow(conversation_id.to_string()).await? {
            if fusions_intact && analysis.matches(&stored) {
                log_info!(
                    "emotion flow for conversation {} is current ({})",
                    conversation_id,
                    stored.input_hash
                );
                return Ok(RefreshOutcome::Unchanged(stored));
            }
        }

        self.persist(store, conversation_id, analysis)
            .await
            .map(RefreshOutcome::Recomputed)
    }

    async fn persist<S>(
        &self,
        store: &S,
        conversation_id: &str,
        analysis: FlowAnalysis,
    ) -> Result<EmotionFlow, FlowStoreError>
    where
        S: FlowStore + ?Sized,
    {
        let flow = analysis.to_flow(Utc::now());
        let turn_count = analysis.fusions.len();

        store
            .save_analysis(conversation_id.to_string(), analysis.fusions, flow.clone())
            .await?;

        log_info!(
            "Stored emotion flow for conversation {}: {} turns, {} segments, pattern {}",
            conversation_id,
            turn_count,
            flow.segments.len(),
            flow.metrics.pattern.as_str()
        );

        Ok(flow)
    }
}
