//! The interest ledger: one record per (investor, pitch) pair with a small
//! status machine. `interested` is the only live state; `accepted` and
//! `rejected` are terminal and only the pitch owner can reach them.

use crate::database::models::InterestRecord;
use crate::database::repositories::{InterestRepository, PitchRepository};
use crate::database::Database;
use crate::error::{DomainError, DomainResult};
use crate::profiles::{ProfileService, Role};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestStatus {
    Interested,
    Accepted,
    Rejected,
}

impl InterestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestStatus::Interested => "interested",
            InterestStatus::Accepted => "accepted",
            InterestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        match raw {
            "interested" => Ok(InterestStatus::Interested),
            "accepted" => Ok(InterestStatus::Accepted),
            "rejected" => Ok(InterestStatus::Rejected),
            other => Err(DomainError::validation(format!(
                "unknown interest status {other:?}"
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InterestStatus::Accepted | InterestStatus::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestView {
    pub pitch_id: String,
    pub investor_id: String,
    pub status: InterestStatus,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl InterestView {
    fn from_record(record: InterestRecord) -> DomainResult<Self> {
        let status = InterestStatus::parse(&record.status)?;
        Ok(Self {
            pitch_id: record.pitch_id,
            investor_id: record.investor_id,
            status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct InterestService {
    database: Database,
}

impl InterestService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn express_interest(
        &self,
        investor_id: &str,
        pitch_id: &str,
    ) -> DomainResult<InterestView> {
        ProfileService::new(self.database.clone()).require_role(investor_id, Role::Investor)?;
        self.ensure_pitch_exists(pitch_id)?;

        let existing = self
            .database
            .with_repositories(|repos| repos.interests().get(pitch_id, investor_id))?;
        if existing.is_some() {
            return Err(DomainError::AlreadyExists(format!(
                "interest of {investor_id} in pitch {pitch_id}"
            )));
        }

        let record = InterestRecord {
            pitch_id: pitch_id.to_string(),
            investor_id: investor_id.to_string(),
            status: InterestStatus::Interested.as_str().to_string(),
            created_at: now_utc_iso(),
            updated_at: None,
        };
        self.database
            .with_repositories(|repos| repos.interests().create(&record))?;
        tracing::info!(pitch_id, investor_id, "interest expressed");
        InterestView::from_record(record)
    }

    /// Removes the record entirely. Only legal while the status is still
    /// `interested`; a terminal record stays as the pitch owner left it.
    pub fn withdraw(&self, investor_id: &str, pitch_id: &str) -> DomainResult<()> {
        let record = self
            .database
            .with_repositories(|repos| repos.interests().get(pitch_id, investor_id))?
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "interest of {investor_id} in pitch {pitch_id}"
                ))
            })?;
        let status = InterestStatus::parse(&record.status)?;
        if status.is_terminal() {
            return Err(DomainError::InvalidTransition(format!(
                "interest is already {} and can no longer be withdrawn",
                status.as_str()
            )));
        }
        self.database
            .with_repositories(|repos| repos.interests().delete(pitch_id, investor_id))?;
        tracing::info!(pitch_id, investor_id, "interest withdrawn");
        Ok(())
    }

    pub fn set_status(
        &self,
        pitch_id: &str,
        investor_id: &str,
        new_status: InterestStatus,
        acting_founder_id: &str,
    ) -> DomainResult<InterestView> {
        if !new_status.is_terminal() {
            return Err(DomainError::validation(
                "status may only be set to \"accepted\" or \"rejected\"",
            ));
        }

        let pitch = self
            .database
            .with_repositories(|repos| repos.pitches().get(pitch_id))?
            .ok_or_else(|| DomainError::not_found(format!("pitch {pitch_id}")))?;
        if pitch.founder_id != acting_founder_id {
            return Err(DomainError::forbidden(format!(
                "pitch {pitch_id} is not owned by {acting_founder_id}"
            )));
        }

        let record = self
            .database
            .with_repositories(|repos| repos.interests().get(pitch_id, investor_id))?
            .ok_or_else(|| {
                DomainError::not_found(format!(
                    "interest of {investor_id} in pitch {pitch_id}"
                ))
            })?;
        let current = InterestStatus::parse(&record.status)?;
        if current.is_terminal() {
            return Err(DomainError::InvalidTransition(format!(
                "interest is already {}",
                current.as_str()
            )));
        }

        let updated_at = now_utc_iso();
        self.database.with_repositories(|repos| {
            repos
                .interests()
                .set_status(pitch_id, investor_id, new_status.as_str(), &updated_at)
        })?;
        tracing::info!(pitch_id, investor_id, status = new_status.as_str(), "interest resolved");
        InterestView::from_record(InterestRecord {
            status: new_status.as_str().to_string(),
            updated_at: Some(updated_at),
            ..record
        })
    }

    pub fn list_for_pitch(&self, pitch_id: &str) -> DomainResult<Vec<InterestView>> {
        self.ensure_pitch_exists(pitch_id)?;
        let records = self
            .database
            .with_repositories(|repos| repos.interests().list_for_pitch(pitch_id))?;
        records.into_iter().map(InterestView::from_record).collect()
    }

    /// The cheap lookup investors use to mark pitches they already follow.
    pub fn list_for_investor(&self, investor_id: &str) -> DomainResult<HashSet<String>> {
        let records = self
            .database
            .with_repositories(|repos| repos.interests().list_for_investor(investor_id))?;
        Ok(records.into_iter().map(|r| r.pitch_id).collect())
    }

    fn ensure_pitch_exists(&self, pitch_id: &str) -> DomainResult<()> {
        let exists = self
            .database
            .with_repositories(|repos| repos.pitches().get(pitch_id))?
            .is_some();
        if !exists {
            return Err(DomainError::not_found(format!("pitch {pitch_id}")));
        }
        Ok(())
    }
}
