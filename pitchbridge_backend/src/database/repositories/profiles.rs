use crate::database::models::ProfileRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

pub(super) struct SqliteProfileRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::ProfileRepository for SqliteProfileRepository<'conn> {
    fn create(&self, record: &ProfileRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO profiles (id, name, role, avatar_url, bio, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                record.id,
                record.name,
                record.role,
                record.avatar_url,
                record.bio,
                record.created_at
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<ProfileRecord>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT id, name, role, avatar_url, bio, created_at
                FROM profiles
                WHERE id = ?1
                "#,
                params![id],
                |row| {
                    Ok(ProfileRecord {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        role: row.get(2)?,
                        avatar_url: row.get(3)?,
                        bio: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }

    fn update(&self, record: &ProfileRecord) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE profiles
            SET name = ?1, avatar_url = ?2, bio = ?3
            WHERE id = ?4
            "#,
            params![record.name, record.avatar_url, record.bio, record.id],
        )?;
        Ok(())
    }
}
