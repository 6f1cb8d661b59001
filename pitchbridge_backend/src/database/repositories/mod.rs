mod interests;
mod messages;
mod pitches;
mod profiles;
mod uploads;

use super::models::{InterestRecord, MessageRecord, PitchRecord, ProfileRecord, UploadRecord};
use anyhow::Result;
use rusqlite::Connection;

pub trait ProfileRepository {
    fn create(&self, record: &ProfileRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<ProfileRecord>>;
    fn update(&self, record: &ProfileRecord) -> Result<()>;
}

pub trait PitchRepository {
    fn create(&self, record: &PitchRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<PitchRecord>>;
    fn update(&self, record: &PitchRecord) -> Result<()>;
    fn delete(&self, id: &str) -> Result<()>;
    fn list_by_founder(&self, founder_id: &str) -> Result<Vec<PitchRecord>>;
    fn list_all(&self) -> Result<Vec<PitchRecord>>;
}

pub trait InterestRepository {
    fn create(&self, record: &InterestRecord) -> Result<()>;
    fn get(&self, pitch_id: &str, investor_id: &str) -> Result<Option<InterestRecord>>;
    fn set_status(
        &self,
        pitch_id: &str,
        investor_id: &str,
        status: &str,
        updated_at: &str,
    ) -> Result<()>;
    fn delete(&self, pitch_id: &str, investor_id: &str) -> Result<()>;
    fn list_for_pitch(&self, pitch_id: &str) -> Result<Vec<InterestRecord>>;
    fn list_for_investor(&self, investor_id: &str) -> Result<Vec<InterestRecord>>;
}

pub trait MessageRepository {
    fn create(&self, record: &MessageRecord) -> Result<()>;
    fn list_for_participant(
        &self,
        pitch_id: &str,
        participant_id: &str,
    ) -> Result<Vec<MessageRecord>>;
}

pub trait UploadRepository {
    fn create(&self, record: &UploadRecord) -> Result<()>;
    fn get(&self, id: &str) -> Result<Option<UploadRecord>>;
}

pub struct SqliteRepositories<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepositories<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn profiles(&self) -> impl ProfileRepository + '_ {
        profiles::SqliteProfileRepository { conn: self.conn }
    }

    pub fn pitches(&self) -> impl PitchRepository + '_ {
        pitches::SqlitePitchRepository { conn: self.conn }
    }

    pub fn interests(&self) -> impl InterestRepository + '_ {
        interests::SqliteInterestRepository { conn: self.conn }
    }

    pub fn messages(&self) -> impl MessageRepository + '_ {
        messages::SqliteMessageRepository { conn: self.conn }
    }

    pub fn uploads(&self) -> impl UploadRepository + '_ {
        uploads::SqliteUploadRepository { conn: self.conn }
    }
}
