use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Row};

use super::conversations::conversation_exists;
use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_label, parse_speaker, to_i64, to_u64},
    models::{Turn, TurnFusionRecord},
};
use crate::flow::TurnInput;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = false;

use crate::log_info;

fn row_to_turn(row: &Row) -> Result<Turn> {
    let ordinal: i64 = row.get("ordinal")?;
    let speaker: String = row.get("speaker")?;
    let created_at: String = row.get("created_at")?;

    Ok(Turn {
        id: row.get("id")?,
        conversation_id: row.get("conversation_id")?,
        ordinal: to_u64(ordinal, "ordinal")?,
        speaker: parse_speaker(&speaker)?,
        content: row.get("content")?,
        facial_payload: row.get("facial_payload")?,
        text_payload: row.get("text_payload")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn row_to_turn_input(row: &Row) -> Result<TurnInput> {
    let ordinal: i64 = row.get("ordinal")?;
    let ordinal = usize::try_from(to_u64(ordinal, "ordinal")?)
        .map_err(|_| anyhow!("ordinal {ordinal} does not fit in usize"))?;

    Ok(TurnInput {
        turn_id: row.get("id")?,
        ordinal,
        facial_payload: row.get("facial_payload")?,
        text_payload: row.get("text_payload")?,
        fusion_stored: row.get("fusion_stored")?,
    })
}

fn row_to_fusion_record(row: &Row) -> Result<TurnFusionRecord> {
    let ordinal: i64 = row.get("ordinal")?;
    let distribution: String = row.get("fused_distribution")?;
    let label: String = row.get("fused_label")?;
    let fused_at: String = row.get("fused_at")?;

    Ok(TurnFusionRecord {
        turn_id: row.get("id")?,
        ordinal: to_u64(ordinal, "ordinal")?,
        distribution: serde_json::from_str(&distribution)
            .context("failed to decode fused_distribution")?,
        label: parse_label(&label, "fused_label")?,
        confidence: row.get("fused_confidence")?,
        fused_at: parse_datetime(&fused_at, "fused_at")?,
    })
}

impl Database {
    pub async fn insert_turn(&self, turn: &Turn) -> Result<()> {
        let record = turn.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO turns (
                    id, conversation_id, ordinal, speaker, content,
                    facial_payload, text_payload, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.conversation_id,
                    to_i64(record.ordinal)?,
                    record.speaker.as_str(),
                    record.content,
                    record.facial_payload,
                    record.text_payload,
                    record.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_turns(&self, conversation_id: &str) -> Result<Vec<Turn>> {
        let conversation_id = conversation_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, ordinal, speaker, content,
                        facial_payload, text_payload, created_at
                 FROM turns
                 WHERE conversation_id = ?1
                 ORDER BY ordinal ASC",
            )?;

            let mut rows = stmt.query(params![conversation_id])?;
            let mut turns = Vec::new();
            while let Some(row) = rows.next()? {
                turns.push(row_to_turn(row)?);
            }
            Ok(turns)
        })
        .await
    }

    /// Store the facial classifier output of a turn. Any previous fusion
    /// result of the turn is cleared since it no longer reflects the inputs.
    pub async fn attach_facial_payload(&self, turn_id: &str, payload: &str) -> Result<()> {
        self.attach_payload(turn_id, "facial_payload", payload).await
    }

    /// Store the text classifier output of a turn, clearing its stale fusion.
    pub async fn attach_text_payload(&self, turn_id: &str, payload: &str) -> Result<()> {
        self.attach_payload(turn_id, "text_payload", payload).await
    }

    async fn attach_payload(
        &self,
        turn_id: &str,
        column: &'static str,
        payload: &str,
    ) -> Result<()> {
        let turn_id = turn_id.to_string();
        let payload = payload.to_string();
        self.execute(move |conn| {
            let sql = format!(
                "UPDATE turns
                 SET {column} = ?1,
                     fused_distribution = NULL,
                     fused_label = NULL,
                     fused_confidence = NULL,
                     fused_at = NULL
                 WHERE id = ?2"
            );
            let affected = conn.execute(&sql, params![payload, turn_id])?;
            if affected == 0 {
                bail!("turn {turn_id} not found");
            }
            log_info!("Attached {column} to turn {turn_id}");
            Ok(())
        })
        .await
    }

    /// User turns of a conversation in ordinal order, shaped for analysis.
    /// Returns `None` when the conversation does not exist.
    pub async fn get_turns_for_analysis(
        &self,
        conversation_id: &str,
    ) -> Result<Option<Vec<TurnInput>>> {
        let conversation_id = conversation_id.to_string();
        self.execute(move |conn| {
            if !conversation_exists(conn, &conversation_id)? {
                return Ok(None);
            }

            let mut stmt = conn.prepare(
                "SELECT id, ordinal, facial_payload, text_payload,
                        fused_distribution IS NOT NULL AS fusion_stored
                 FROM turns
                 WHERE conversation_id = ?1 AND speaker = 'user'
                 ORDER BY ordinal ASC",
            )?;

            let mut rows = stmt.query(params![conversation_id])?;
            let mut turns = Vec::new();
            while let Some(row) = rows.next()? {
                turns.push(row_to_turn_input(row)?);
            }
            Ok(Some(turns))
        })
        .await
    }

    /// Stored per-turn fusion results of a conversation, in ordinal order.
    /// Turns that were never fused (or whose fusion went stale) are omitted.
    pub async fn get_turn_fusions(&self, conversation_id: &str) -> Result<Vec<TurnFusionRecord>> {
        let conversation_id = conversation_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, ordinal, fused_distribution, fused_label, fused_confidence, fused_at
                 FROM turns
                 WHERE conversation_id = ?1 AND fused_distribution IS NOT NULL
                 ORDER BY ordinal ASC",
            )?;

            let mut rows = stmt.query(params![conversation_id])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(row_to_fusion_record(row)?);
            }
            Ok(records)
        })
        .await
    }
}
