use crate::database::models::UploadRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

pub(super) struct SqliteUploadRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::UploadRepository for SqliteUploadRepository<'conn> {
    fn create(&self, record: &UploadRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO uploads (id, namespace, path, original_name, mime, size_bytes, checksum, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                record.id,
                record.namespace,
                record.path,
                record.original_name,
                record.mime,
                record.size_bytes,
                record.checksum,
                record.created_at
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<UploadRecord>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT id, namespace, path, original_name, mime, size_bytes, checksum, created_at
                FROM uploads
                WHERE id = ?1
                "#,
                params![id],
                |row| {
                    Ok(UploadRecord {
                        id: row.get(0)?,
                        namespace: row.get(1)?,
                        path: row.get(2)?,
                        original_name: row.get(3)?,
                        mime: row.get(4)?,
                        size_bytes: row.get(5)?,
                        checksum: row.get(6)?,
                        created_at: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(result)
    }
}
