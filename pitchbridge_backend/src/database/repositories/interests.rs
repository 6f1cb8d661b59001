use crate::database::models::InterestRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqliteInterestRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<InterestRecord> {
    Ok(InterestRecord {
        pitch_id: row.get(0)?,
        investor_id: row.get(1)?,
        status: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

impl<'conn> super::InterestRepository for SqliteInterestRepository<'conn> {
    fn create(&self, record: &InterestRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO investor_interests (pitch_id, investor_id, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.pitch_id,
                record.investor_id,
                record.status,
                record.created_at,
                record.updated_at
            ],
        )?;
        Ok(())
    }

    fn get(&self, pitch_id: &str, investor_id: &str) -> Result<Option<InterestRecord>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT pitch_id, investor_id, status, created_at, updated_at
                FROM investor_interests
                WHERE pitch_id = ?1 AND investor_id = ?2
                "#,
                params![pitch_id, investor_id],
                map_row,
            )
            .optional()?;
        Ok(result)
    }

    fn set_status(
        &self,
        pitch_id: &str,
        investor_id: &str,
        status: &str,
        updated_at: &str,
    ) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE investor_interests
            SET status = ?1, updated_at = ?2
            WHERE pitch_id = ?3 AND investor_id = ?4
            "#,
            params![status, updated_at, pitch_id, investor_id],
        )?;
        Ok(())
    }

    fn delete(&self, pitch_id: &str, investor_id: &str) -> Result<()> {
        self.conn.execute(
            r#"
            DELETE FROM investor_interests
            WHERE pitch_id = ?1 AND investor_id = ?2
            "#,
            params![pitch_id, investor_id],
        )?;
        Ok(())
    }

    fn list_for_pitch(&self, pitch_id: &str) -> Result<Vec<InterestRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT pitch_id, investor_id, status, created_at, updated_at
            FROM investor_interests
            WHERE pitch_id = ?1
            ORDER BY created_at ASC
            "#,
        )?;
        let rows = stmt.query_map(params![pitch_id], map_row)?;
        let mut interests = Vec::new();
        for row in rows {
            interests.push(row?);
        }
        Ok(interests)
    }

    fn list_for_investor(&self, investor_id: &str) -> Result<Vec<InterestRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT pitch_id, investor_id, status, created_at, updated_at
            FROM investor_interests
            WHERE investor_id = ?1
            ORDER BY created_at ASC
            "#,
        )?;
        let rows = stmt.query_map(params![investor_id], map_row)?;
        let mut interests = Vec::new();
        for row in rows {
            interests.push(row?);
        }
        Ok(interests)
    }
}
