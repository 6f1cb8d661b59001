use crate::database::models::MessageRecord;
use anyhow::Result;
use rusqlite::{params, Connection};

pub(super) struct SqliteMessageRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::MessageRepository for SqliteMessageRepository<'conn> {
    fn create(&self, record: &MessageRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO messages (id, pitch_id, sender_id, receiver_id, content, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.pitch_id,
                record.sender_id,
                record.receiver_id,
                record.content,
                record.created_at
            ],
        )?;
        Ok(())
    }

    fn list_for_participant(
        &self,
        pitch_id: &str,
        participant_id: &str,
    ) -> Result<Vec<MessageRecord>> {
        // rowid breaks creation-time ties so same-instant sends keep insert order.
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, pitch_id, sender_id, receiver_id, content, created_at
            FROM messages
            WHERE pitch_id = ?1 AND (sender_id = ?2 OR receiver_id = ?2)
            ORDER BY created_at ASC, rowid ASC
            "#,
        )?;
        let rows = stmt.query_map(params![pitch_id, participant_id], |row| {
            Ok(MessageRecord {
                id: row.get(0)?,
                pitch_id: row.get(1)?,
                sender_id: row.get(2)?,
                receiver_id: row.get(3)?,
                content: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;
        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }
}
