pub mod models;
pub mod repositories;

use crate::config::PitchbridgePaths;
use anyhow::{anyhow, Result};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub(crate) const MIGRATIONS: &str = r#"
    PRAGMA journal_mode = WAL;
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('founder', 'investor')),
        avatar_url TEXT,
        bio TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS pitches (
        id TEXT PRIMARY KEY,
        founder_id TEXT NOT NULL,
        title TEXT NOT NULL,
        tagline TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        problem TEXT NOT NULL DEFAULT '',
        solution TEXT NOT NULL DEFAULT '',
        market_size TEXT NOT NULL DEFAULT '',
        business_model TEXT NOT NULL DEFAULT '',
        funding_goal REAL NOT NULL DEFAULT 0,
        current_funding_status REAL NOT NULL DEFAULT 0,
        equity_offered REAL NOT NULL DEFAULT 0,
        video_url TEXT,
        tags TEXT NOT NULL DEFAULT '[]',
        pitch_deck_url TEXT,
        product_screenshots TEXT NOT NULL DEFAULT '[]',
        company_logo_url TEXT,
        team_bios TEXT NOT NULL DEFAULT '[]',
        financial_projections TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        FOREIGN KEY (founder_id) REFERENCES profiles(id)
    );

    CREATE TABLE IF NOT EXISTS investor_interests (
        pitch_id TEXT NOT NULL,
        investor_id TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'interested'
            CHECK (status IN ('interested', 'accepted', 'rejected')),
        created_at TEXT NOT NULL,
        updated_at TEXT,
        PRIMARY KEY (pitch_id, investor_id),
        FOREIGN KEY (pitch_id) REFERENCES pitches(id) ON DELETE CASCADE,
        FOREIGN KEY (investor_id) REFERENCES profiles(id)
    );

    CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        pitch_id TEXT NOT NULL,
        sender_id TEXT NOT NULL,
        receiver_id TEXT NOT NULL,
        content TEXT NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY (pitch_id) REFERENCES pitches(id) ON DELETE CASCADE,
        FOREIGN KEY (sender_id) REFERENCES profiles(id),
        FOREIGN KEY (receiver_id) REFERENCES profiles(id)
    );

    CREATE TABLE IF NOT EXISTS uploads (
        id TEXT PRIMARY KEY,
        namespace TEXT NOT NULL,
        path TEXT NOT NULL,
        original_name TEXT,
        mime TEXT,
        size_bytes INTEGER,
        checksum TEXT,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_pitches_founder ON pitches(founder_id);
    CREATE INDEX IF NOT EXISTS idx_interests_investor ON investor_interests(investor_id);
    CREATE INDEX IF NOT EXISTS idx_messages_pitch ON messages(pitch_id, created_at);
"#;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    newly_created: bool,
}

impl Database {
    pub fn connect(paths: &PitchbridgePaths) -> Result<Self> {
        let newly_created = !paths.db_path.exists();
        let conn = Connection::open(&paths.db_path)?;
        Ok(Self::from_connection(conn, newly_created))
    }

    pub fn from_connection(conn: Connection, newly_created: bool) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            newly_created,
        }
    }

    pub fn ensure_migrations(&self) -> Result<bool> {
        self.with_conn(|conn| {
            conn.execute_batch(MIGRATIONS)?;
            Ok(())
        })?;
        Ok(self.newly_created)
    }

    pub fn with_repositories<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(repositories::SqliteRepositories<'_>) -> Result<T>,
    {
        self.with_conn(|conn| {
            let repos = repositories::SqliteRepositories::new(conn);
            f(repos)
        })
    }

    fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))?;
        f(&guard)
    }
}
