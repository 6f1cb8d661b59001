//! Profile registration and maintenance. The role is fixed at registration;
//! the update path deliberately carries no role field.

use crate::database::models::ProfileRecord;
use crate::database::repositories::ProfileRepository;
use crate::database::Database;
use crate::error::{DomainError, DomainResult};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Founder,
    Investor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Founder => "founder",
            Role::Investor => "investor",
        }
    }

    pub fn parse(raw: &str) -> DomainResult<Self> {
        match raw {
            "founder" => Ok(Role::Founder),
            "investor" => Ok(Role::Investor),
            other => Err(DomainError::validation(format!(
                "unknown role {other:?}, expected \"founder\" or \"investor\""
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
}

impl ProfileView {
    fn from_record(record: ProfileRecord) -> DomainResult<Self> {
        let role = Role::parse(&record.role)?;
        Ok(Self {
            id: record.id,
            name: record.name,
            role,
            avatar_url: record.avatar_url,
            bio: record.bio,
            created_at: record.created_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterProfileInput {
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
}

#[derive(Clone)]
pub struct ProfileService {
    database: Database,
}

impl ProfileService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn register(&self, input: RegisterProfileInput) -> DomainResult<ProfileView> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("profile name may not be empty"));
        }
        let record = ProfileRecord {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            role: input.role.as_str().to_string(),
            avatar_url: input.avatar_url,
            bio: input.bio,
            created_at: now_utc_iso(),
        };
        self.database
            .with_repositories(|repos| repos.profiles().create(&record))?;
        tracing::info!(profile_id = %record.id, role = %record.role, "profile registered");
        ProfileView::from_record(record)
    }

    pub fn get(&self, id: &str) -> DomainResult<ProfileView> {
        let record = self
            .database
            .with_repositories(|repos| repos.profiles().get(id))?
            .ok_or_else(|| DomainError::not_found(format!("profile {id}")))?;
        ProfileView::from_record(record)
    }

    /// Profiles are self-service: only the owner may change them, and only
    /// the mutable fields.
    pub fn update(
        &self,
        id: &str,
        acting_id: &str,
        patch: ProfilePatch,
    ) -> DomainResult<ProfileView> {
        if acting_id != id {
            return Err(DomainError::forbidden(
                "profiles may only be edited by their owner",
            ));
        }
        let mut record = self
            .database
            .with_repositories(|repos| repos.profiles().get(id))?
            .ok_or_else(|| DomainError::not_found(format!("profile {id}")))?;

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("profile name may not be empty"));
            }
            record.name = name.trim().to_string();
        }
        if let Some(avatar_url) = patch.avatar_url {
            record.avatar_url = Some(avatar_url);
        }
        if let Some(bio) = patch.bio {
            record.bio = Some(bio);
        }

        self.database
            .with_repositories(|repos| repos.profiles().update(&record))?;
        ProfileView::from_record(record)
    }

    /// Looks a profile up and checks it carries the expected role. Used by
    /// the pitch and interest services as their authorization precondition.
    pub(crate) fn require_role(&self, id: &str, expected: Role) -> DomainResult<ProfileView> {
        let profile = self.get(id)?;
        if profile.role != expected {
            return Err(DomainError::forbidden(format!(
                "profile {id} is not a {}",
                expected.as_str()
            )));
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup_service() -> ProfileService {
        let conn = Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");
        ProfileService::new(db)
    }

    #[test]
    fn register_and_fetch_round_trip() {
        let service = setup_service();
        let profile = service
            .register(RegisterProfileInput {
                name: "Ada".into(),
                role: Role::Founder,
                avatar_url: None,
                bio: Some("building things".into()),
            })
            .expect("register");
        let fetched = service.get(&profile.id).expect("get");
        assert_eq!(fetched.name, "Ada");
        assert_eq!(fetched.role, Role::Founder);
        assert_eq!(fetched.bio.as_deref(), Some("building things"));
    }

    #[test]
    fn update_is_owner_only() {
        let service = setup_service();
        let profile = service
            .register(RegisterProfileInput {
                name: "Ada".into(),
                role: Role::Investor,
                avatar_url: None,
                bio: None,
            })
            .expect("register");

        let err = service
            .update(
                &profile.id,
                "someone-else",
                ProfilePatch {
                    name: Some("Mallory".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let updated = service
            .update(
                &profile.id,
                &profile.id,
                ProfilePatch {
                    bio: Some("angel investor".into()),
                    ..Default::default()
                },
            )
            .expect("self update");
        assert_eq!(updated.bio.as_deref(), Some("angel investor"));
        // Role survives untouched; there is no way to patch it.
        assert_eq!(updated.role, Role::Investor);
    }

    #[test]
    fn missing_profile_is_not_found() {
        let service = setup_service();
        let err = service.get("nope").unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
