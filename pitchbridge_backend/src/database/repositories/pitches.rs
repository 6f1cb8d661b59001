use crate::database::models::PitchRecord;
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) struct SqlitePitchRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

const PITCH_COLUMNS: &str = "id, founder_id, title, tagline, description, problem, solution, \
     market_size, business_model, funding_goal, current_funding_status, equity_offered, \
     video_url, tags, pitch_deck_url, product_screenshots, company_logo_url, team_bios, \
     financial_projections, created_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<PitchRecord> {
    Ok(PitchRecord {
        id: row.get(0)?,
        founder_id: row.get(1)?,
        title: row.get(2)?,
        tagline: row.get(3)?,
        description: row.get(4)?,
        problem: row.get(5)?,
        solution: row.get(6)?,
        market_size: row.get(7)?,
        business_model: row.get(8)?,
        funding_goal: row.get(9)?,
        current_funding_status: row.get(10)?,
        equity_offered: row.get(11)?,
        video_url: row.get(12)?,
        tags: row.get(13)?,
        pitch_deck_url: row.get(14)?,
        product_screenshots: row.get(15)?,
        company_logo_url: row.get(16)?,
        team_bios: row.get(17)?,
        financial_projections: row.get(18)?,
        created_at: row.get(19)?,
    })
}

impl<'conn> super::PitchRepository for SqlitePitchRepository<'conn> {
    fn create(&self, record: &PitchRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO pitches (
                id, founder_id, title, tagline, description, problem, solution,
                market_size, business_model, funding_goal, current_funding_status,
                equity_offered, video_url, tags, pitch_deck_url, product_screenshots,
                company_logo_url, team_bios, financial_projections, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)
            "#,
            params![
                record.id,
                record.founder_id,
                record.title,
                record.tagline,
                record.description,
                record.problem,
                record.solution,
                record.market_size,
                record.business_model,
                record.funding_goal,
                record.current_funding_status,
                record.equity_offered,
                record.video_url,
                record.tags,
                record.pitch_deck_url,
                record.product_screenshots,
                record.company_logo_url,
                record.team_bios,
                record.financial_projections,
                record.created_at
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<PitchRecord>> {
        let sql = format!("SELECT {PITCH_COLUMNS} FROM pitches WHERE id = ?1");
        let result = self
            .conn
            .query_row(&sql, params![id], map_row)
            .optional()?;
        Ok(result)
    }

    fn update(&self, record: &PitchRecord) -> Result<()> {
        self.conn.execute(
            r#"
            UPDATE pitches SET
                title = ?1, tagline = ?2, description = ?3, problem = ?4, solution = ?5,
                market_size = ?6, business_model = ?7, funding_goal = ?8,
                current_funding_status = ?9, equity_offered = ?10, video_url = ?11,
                tags = ?12, pitch_deck_url = ?13, product_screenshots = ?14,
                company_logo_url = ?15, team_bios = ?16, financial_projections = ?17
            WHERE id = ?18
            "#,
            params![
                record.title,
                record.tagline,
                record.description,
                record.problem,
                record.solution,
                record.market_size,
                record.business_model,
                record.funding_goal,
                record.current_funding_status,
                record.equity_offered,
                record.video_url,
                record.tags,
                record.pitch_deck_url,
                record.product_screenshots,
                record.company_logo_url,
                record.team_bios,
                record.financial_projections,
                record.id
            ],
        )?;
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<()> {
        // Dependent interests and messages go with it via ON DELETE CASCADE.
        self.conn
            .execute("DELETE FROM pitches WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn list_by_founder(&self, founder_id: &str) -> Result<Vec<PitchRecord>> {
        let sql = format!(
            "SELECT {PITCH_COLUMNS} FROM pitches WHERE founder_id = ?1 ORDER BY created_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![founder_id], map_row)?;
        let mut pitches = Vec::new();
        for row in rows {
            pitches.push(row?);
        }
        Ok(pitches)
    }

    fn list_all(&self) -> Result<Vec<PitchRecord>> {
        let sql = format!("SELECT {PITCH_COLUMNS} FROM pitches ORDER BY created_at DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_row)?;
        let mut pitches = Vec::new();
        for row in rows {
            pitches.push(row?);
        }
        Ok(pitches)
    }
}
