use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::conversations::conversation_exists;
use crate::db::connection::Database;
use crate::flow::{FlowStore, FlowStoreError, FlowStoreFuture, TurnFusion, TurnInput};
use crate::models::EmotionFlow;

impl Database {
    /// Replace the stored analysis of a conversation in one transaction:
    /// fusion columns of all its turns are reset, the listed turns get their
    /// new result and the flow row is upserted.
    ///
    /// Returns `false` without writing when the conversation does not exist.
    pub async fn replace_analysis(
        &self,
        conversation_id: &str,
        fusions: Vec<TurnFusion>,
        flow: EmotionFlow,
    ) -> Result<bool> {
        let conversation_id = conversation_id.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            if !conversation_exists(&tx, &conversation_id)? {
                return Ok(false);
            }

            let fused_at = flow.generated_at.to_rfc3339();
            let flow_json = serde_json::to_string(&flow).context("failed to encode flow")?;

            tx.execute(
                "UPDATE turns
                 SET fused_distribution = NULL,
                     fused_label = NULL,
                     fused_confidence = NULL,
                     fused_at = NULL
                 WHERE conversation_id = ?1",
                params![conversation_id],
            )?;

            {
                let mut stmt = tx.prepare(
                    "UPDATE turns
                     SET fused_distribution = ?1,
                         fused_label = ?2,
                         fused_confidence = ?3,
                         fused_at = ?4
                     WHERE id = ?5 AND conversation_id = ?6",
                )?;
                for fusion in &fusions {
                    let distribution = serde_json::to_string(&fusion.result.distribution)
                        .context("failed to encode fused distribution")?;
                    stmt.execute(params![
                        distribution,
                        fusion.result.label.as_str(),
                        fusion.result.confidence,
                        fused_at,
                        fusion.turn_id,
                        conversation_id,
                    ])?;
                }
            }

            tx.execute(
                "INSERT INTO emotion_flows (
                    conversation_id, flow_json, input_hash, pattern, generated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(conversation_id) DO UPDATE SET
                    flow_json = excluded.flow_json,
                    input_hash = excluded.input_hash,
                    pattern = excluded.pattern,
                    generated_at = excluded.generated_at",
                params![
                    conversation_id,
                    flow_json,
                    flow.input_hash,
                    flow.metrics.pattern.as_str(),
                    fused_at,
                ],
            )?;

            tx.commit()?;
            Ok(true)
        })
        .await
    }

    pub async fn get_emotion_flow(&self, conversation_id: &str) -> Result<Option<EmotionFlow>> {
        let conversation_id = conversation_id.to_string();
        self.execute(move |conn| {
            let flow_json: Option<String> = conn
                .query_row(
                    "SELECT flow_json FROM emotion_flows WHERE conversation_id = ?1",
                    params![conversation_id],
                    |row| row.get(0),
                )
                .optional()?;

            flow_json
                .map(|json| {
                    serde_json::from_str(&json).with_context(|| {
                        format!("failed to decode emotion flow of conversation {conversation_id}")
                    })
                })
                .transpose()
        })
        .await
    }
}

fn storage_error(err: anyhow::Error) -> FlowStoreError {
    FlowStoreError::Storage(format!("{err:#}"))
}

impl FlowStore for Database {
    fn load_turns(&self, conversation_id: String) -> FlowStoreFuture<Vec<TurnInput>> {
        let db = self.clone();
        Box::pin(async move {
            db.get_turns_for_analysis(&conversation_id)
                .await
                .map_err(storage_error)?
                .ok_or(FlowStoreError::NotFound(conversation_id))
        })
    }

    fn load_flow(&self, conversation_id: String) -> FlowStoreFuture<Option<EmotionFlow>> {
        let db = self.clone();
        Box::pin(async move {
            db.get_emotion_flow(&conversation_id)
                .await
                .map_err(storage_error)
        })
    }

    fn save_analysis(
        &self,
        conversation_id: String,
        fusions: Vec<TurnFusion>,
        flow: EmotionFlow,
    ) -> FlowStoreFuture<()> {
        let db = self.clone();
        Box::pin(async move {
            let saved = db
                .replace_analysis(&conversation_id, fusions, flow)
                .await
                .map_err(storage_error)?;
            if saved {
                Ok(())
            } else {
                Err(FlowStoreError::NotFound(conversation_id))
            }
        })
    }
}
