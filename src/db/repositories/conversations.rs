use anyhow::Result;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{connection::Database, helpers::parse_datetime, models::Conversation};

fn row_to_conversation(row: &Row) -> Result<Conversation> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Conversation {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

impl Database {
    pub async fn insert_conversation(&self, conversation: &Conversation) -> Result<()> {
        let record = conversation.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO conversations (id, user_id, title, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.user_id,
                    record.title,
                    record.created_at.to_rfc3339(),
                    record.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        let conversation_id = conversation_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, title, created_at, updated_at
                 FROM conversations
                 WHERE id = ?1",
            )?;

            let mut rows = stmt.query(params![conversation_id])?;
            let conversation = match rows.next()? {
                Some(row) => Some(row_to_conversation(row)?),
                None => None,
            };
            Ok(conversation)
        })
        .await
    }
}

pub(crate) fn conversation_exists(
    conn: &rusqlite::Connection,
    conversation_id: &str,
) -> Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM conversations WHERE id = ?1",
            params![conversation_id],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}
