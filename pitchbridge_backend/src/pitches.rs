//! Pitch lifecycle: the structured startup profile founders publish and
//! maintain. Owns the normalization rules for the list-valued fields and the
//! ownership checks on every mutation.

use crate::database::models::PitchRecord;
use crate::database::repositories::PitchRepository;
use crate::database::Database;
use crate::error::{DomainError, DomainResult};
use crate::profiles::{ProfileService, Role};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    pub bio: String,
}

/// A projection row as stored and returned. `profit` is always derived from
/// `revenue - expenses` at write time, never taken from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProjection {
    pub year: i32,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinancialProjectionInput {
    pub year: i32,
    pub revenue: f64,
    pub expenses: f64,
    /// Ignored; recomputed server-side.
    #[serde(default)]
    pub profit: Option<f64>,
}

/// The legacy edit form submitted team bios as a JSON-encoded string while
/// the create form sent a structured list. Both shapes are accepted at the
/// boundary and collapse to `Vec<TeamMember>` exactly once, here.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TeamBiosInput {
    Members(Vec<TeamMember>),
    Json(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct PitchDraft {
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub market_size: String,
    #[serde(default)]
    pub business_model: String,
    #[serde(default)]
    pub funding_goal: f64,
    #[serde(default)]
    pub current_funding_status: f64,
    #[serde(default)]
    pub equity_offered: f64,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Comma-separated, as typed into the form.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub pitch_deck_url: Option<String>,
    #[serde(default)]
    pub product_screenshots: Vec<String>,
    #[serde(default)]
    pub company_logo_url: Option<String>,
    #[serde(default)]
    pub team_bios: Option<TeamBiosInput>,
    #[serde(default)]
    pub financial_projections: Vec<FinancialProjectionInput>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PitchPatch {
    pub title: Option<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    pub problem: Option<String>,
    pub solution: Option<String>,
    pub market_size: Option<String>,
    pub business_model: Option<String>,
    pub funding_goal: Option<f64>,
    pub current_funding_status: Option<f64>,
    pub equity_offered: Option<f64>,
    /// Absent leaves the URL alone; an explicit `null` clears it.
    #[serde(default, deserialize_with = "clearable")]
    pub video_url: Option<Option<String>>,
    pub tags: Option<String>,
    #[serde(default, deserialize_with = "clearable")]
    pub pitch_deck_url: Option<Option<String>>,
    pub product_screenshots: Option<Vec<String>>,
    #[serde(default, deserialize_with = "clearable")]
    pub company_logo_url: Option<Option<String>>,
    pub team_bios: Option<TeamBiosInput>,
    pub financial_projections: Option<Vec<FinancialProjectionInput>>,
}

/// Wraps a nullable patch field so a missing key and `null` stay
/// distinguishable after deserialization.
fn clearable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchView {
    pub id: String,
    pub founder_id: String,
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub problem: String,
    pub solution: String,
    pub market_size: String,
    pub business_model: String,
    pub funding_goal: f64,
    pub current_funding_status: f64,
    pub equity_offered: f64,
    pub video_url: Option<String>,
    pub tags: Vec<String>,
    pub pitch_deck_url: Option<String>,
    pub product_screenshots: Vec<String>,
    pub company_logo_url: Option<String>,
    pub team_bios: Vec<TeamMember>,
    pub financial_projections: Vec<FinancialProjection>,
    pub created_at: String,
}

impl PitchView {
    fn from_record(record: PitchRecord) -> DomainResult<Self> {
        Ok(Self {
            tags: from_json(&record.tags)?,
            product_screenshots: from_json(&record.product_screenshots)?,
            team_bios: from_json(&record.team_bios)?,
            financial_projections: from_json(&record.financial_projections)?,
            id: record.id,
            founder_id: record.founder_id,
            title: record.title,
            tagline: record.tagline,
            description: record.description,
            problem: record.problem,
            solution: record.solution,
            market_size: record.market_size,
            business_model: record.business_model,
            funding_goal: record.funding_goal,
            current_funding_status: record.current_funding_status,
            equity_offered: record.equity_offered,
            video_url: record.video_url,
            pitch_deck_url: record.pitch_deck_url,
            company_logo_url: record.company_logo_url,
            created_at: record.created_at,
        })
    }
}

/// Splits a comma-separated tag string, trims each entry, and drops empties.
/// Applied identically on create and update.
pub fn normalize_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn parse_team_bios(input: TeamBiosInput) -> DomainResult<Vec<TeamMember>> {
    match input {
        TeamBiosInput::Members(members) => Ok(members),
        TeamBiosInput::Json(raw) => {
            if raw.trim().is_empty() {
                return Ok(Vec::new());
            }
            serde_json::from_str(&raw).map_err(|err| {
                DomainError::validation(format!("team bios must be a valid JSON list: {err}"))
            })
        }
    }
}

fn recompute_projections(rows: Vec<FinancialProjectionInput>) -> Vec<FinancialProjection> {
    rows.into_iter()
        .map(|row| FinancialProjection {
            year: row.year,
            revenue: row.revenue,
            expenses: row.expenses,
            profit: row.revenue - row.expenses,
        })
        .collect()
}

fn check_amount(name: &str, value: f64) -> DomainResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DomainError::validation(format!(
            "{name} must be a non-negative amount"
        )));
    }
    Ok(())
}

fn check_equity(value: f64) -> DomainResult<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(DomainError::validation(
            "equity_offered must be a percentage between 0 and 100",
        ));
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> DomainResult<String> {
    serde_json::to_string(value)
        .map_err(|err| DomainError::Upstream(anyhow::Error::new(err)))
}

fn from_json<T: for<'de> Deserialize<'de>>(raw: &str) -> DomainResult<T> {
    serde_json::from_str(raw).map_err(|err| DomainError::Upstream(anyhow::Error::new(err)))
}

#[derive(Clone)]
pub struct PitchService {
    database: Database,
}

impl PitchService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn profiles(&self) -> ProfileService {
        ProfileService::new(self.database.clone())
    }

    pub fn create(&self, draft: PitchDraft, founder_id: &str) -> DomainResult<PitchView> {
        self.profiles().require_role(founder_id, Role::Founder)?;

        if draft.title.trim().is_empty() {
            return Err(DomainError::validation("pitch title may not be empty"));
        }
        check_amount("funding_goal", draft.funding_goal)?;
        check_amount("current_funding_status", draft.current_funding_status)?;
        check_equity(draft.equity_offered)?;

        let team_bios = match draft.team_bios {
            Some(input) => parse_team_bios(input)?,
            None => Vec::new(),
        };
        let projections = recompute_projections(draft.financial_projections);

        let record = PitchRecord {
            id: Uuid::new_v4().to_string(),
            founder_id: founder_id.to_string(),
            title: draft.title.trim().to_string(),
            tagline: draft.tagline,
            description: draft.description,
            problem: draft.problem,
            solution: draft.solution,
            market_size: draft.market_size,
            business_model: draft.business_model,
            funding_goal: draft.funding_goal,
            current_funding_status: draft.current_funding_status,
            equity_offered: draft.equity_offered,
            video_url: draft.video_url,
            tags: to_json(&normalize_tags(&draft.tags))?,
            pitch_deck_url: draft.pitch_deck_url,
            product_screenshots: to_json(&draft.product_screenshots)?,
            company_logo_url: draft.company_logo_url,
            team_bios: to_json(&team_bios)?,
            financial_projections: to_json(&projections)?,
            created_at: now_utc_iso(),
        };

        self.database
            .with_repositories(|repos| repos.pitches().create(&record))?;
        tracing::info!(pitch_id = %record.id, founder_id, "pitch created");
        PitchView::from_record(record)
    }

    pub fn update(
        &self,
        id: &str,
        founder_id: &str,
        patch: PitchPatch,
    ) -> DomainResult<PitchView> {
        let mut record = self.fetch_owned(id, founder_id)?;

        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(DomainError::validation("pitch title may not be empty"));
            }
            record.title = title.trim().to_string();
        }
        if let Some(tagline) = patch.tagline {
            record.tagline = tagline;
        }
        if let Some(description) = patch.description {
            record.description = description;
        }
        if let Some(problem) = patch.problem {
            record.problem = problem;
        }
        if let Some(solution) = patch.solution {
            record.solution = solution;
        }
        if let Some(market_size) = patch.market_size {
            record.market_size = market_size;
        }
        if let Some(business_model) = patch.business_model {
            record.business_model = business_model;
        }
        if let Some(funding_goal) = patch.funding_goal {
            check_amount("funding_goal", funding_goal)?;
            record.funding_goal = funding_goal;
        }
        if let Some(current_funding_status) = patch.current_funding_status {
            check_amount("current_funding_status", current_funding_status)?;
            record.current_funding_status = current_funding_status;
        }
        if let Some(equity_offered) = patch.equity_offered {
            check_equity(equity_offered)?;
            record.equity_offered = equity_offered;
        }
        if let Some(video_url) = patch.video_url {
            record.video_url = video_url;
        }
        if let Some(tags) = patch.tags {
            record.tags = to_json(&normalize_tags(&tags))?;
        }
        if let Some(pitch_deck_url) = patch.pitch_deck_url {
            record.pitch_deck_url = pitch_deck_url;
        }
        if let Some(screenshots) = patch.product_screenshots {
            record.product_screenshots = to_json(&screenshots)?;
        }
        if let Some(company_logo_url) = patch.company_logo_url {
            record.company_logo_url = company_logo_url;
        }
        if let Some(team_bios) = patch.team_bios {
            record.team_bios = to_json(&parse_team_bios(team_bios)?)?;
        }
        if let Some(projections) = patch.financial_projections {
            record.financial_projections = to_json(&recompute_projections(projections))?;
        }

        self.database
            .with_repositories(|repos| repos.pitches().update(&record))?;
        PitchView::from_record(record)
    }

    /// Irreversible. Interests and messages referencing the pitch are removed
    /// with it (foreign-key cascade).
    pub fn delete(&self, id: &str, founder_id: &str) -> DomainResult<()> {
        self.fetch_owned(id, founder_id)?;
        self.database
            .with_repositories(|repos| repos.pitches().delete(id))?;
        tracing::info!(pitch_id = %id, founder_id, "pitch deleted");
        Ok(())
    }

    pub fn get(&self, id: &str) -> DomainResult<PitchView> {
        let record = self
            .database
            .with_repositories(|repos| repos.pitches().get(id))?
            .ok_or_else(|| DomainError::not_found(format!("pitch {id}")))?;
        PitchView::from_record(record)
    }

    pub fn list_by_founder(&self, founder_id: &str) -> DomainResult<Vec<PitchView>> {
        let records = self
            .database
            .with_repositories(|repos| repos.pitches().list_by_founder(founder_id))?;
        records.into_iter().map(PitchView::from_record).collect()
    }

    pub fn list_all(&self) -> DomainResult<Vec<PitchView>> {
        let records = self
            .database
            .with_repositories(|repos| repos.pitches().list_all())?;
        records.into_iter().map(PitchView::from_record).collect()
    }

    /// Loads the pitch and enforces ownership, the precondition shared by
    /// update and delete.
    fn fetch_owned(&self, id: &str, founder_id: &str) -> DomainResult<PitchRecord> {
        let record = self
            .database
            .with_repositories(|repos| repos.pitches().get(id))?
            .ok_or_else(|| DomainError::not_found(format!("pitch {id}")))?;
        if record.founder_id != founder_id {
            return Err(DomainError::forbidden(format!(
                "pitch {id} is not owned by {founder_id}"
            )));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{ProfileService, RegisterProfileInput, Role};

    fn setup() -> (Database, PitchService, String) {
        let conn = rusqlite::Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");
        let founder = ProfileService::new(db.clone())
            .register(RegisterProfileInput {
                name: "Founder".into(),
                role: Role::Founder,
                avatar_url: None,
                bio: None,
            })
            .expect("register founder");
        (db.clone(), PitchService::new(db), founder.id)
    }

    fn minimal_draft(title: &str) -> PitchDraft {
        PitchDraft {
            title: title.into(),
            tagline: String::new(),
            description: String::new(),
            problem: String::new(),
            solution: String::new(),
            market_size: String::new(),
            business_model: String::new(),
            funding_goal: 0.0,
            current_funding_status: 0.0,
            equity_offered: 0.0,
            video_url: None,
            tags: String::new(),
            pitch_deck_url: None,
            product_screenshots: Vec::new(),
            company_logo_url: None,
            team_bios: None,
            financial_projections: Vec::new(),
        }
    }

    #[test]
    fn profit_is_recomputed_on_create() {
        let (_db, service, founder_id) = setup();
        let mut draft = minimal_draft("Acme");
        draft.funding_goal = 100_000.0;
        draft.financial_projections = vec![FinancialProjectionInput {
            year: 2024,
            revenue: 50_000.0,
            expenses: 20_000.0,
            profit: Some(999_999.0),
        }];
        let pitch = service.create(draft, &founder_id).expect("create");
        let fetched = service.get(&pitch.id).expect("get");
        assert_eq!(fetched.financial_projections.len(), 1);
        assert_eq!(fetched.financial_projections[0].profit, 30_000.0);
    }

    #[test]
    fn tags_are_trimmed_and_empties_dropped() {
        let (_db, service, founder_id) = setup();
        let mut draft = minimal_draft("Tagged");
        draft.tags = "tech, , AI ,  ".into();
        let pitch = service.create(draft, &founder_id).expect("create");
        assert_eq!(pitch.tags, vec!["tech".to_string(), "AI".to_string()]);

        let updated = service
            .update(
                &pitch.id,
                &founder_id,
                PitchPatch {
                    tags: Some("saas, ,  fintech".into()),
                    ..Default::default()
                },
            )
            .expect("update");
        assert_eq!(updated.tags, vec!["saas".to_string(), "fintech".to_string()]);
    }

    #[test]
    fn team_bios_accepts_both_shapes() {
        let (_db, service, founder_id) = setup();
        let mut draft = minimal_draft("Team");
        draft.team_bios = Some(TeamBiosInput::Json(
            r#"[{"name":"Ada","role":"CTO","bio":"ships"}]"#.into(),
        ));
        let pitch = service.create(draft, &founder_id).expect("create");
        assert_eq!(pitch.team_bios.len(), 1);
        assert_eq!(pitch.team_bios[0].name, "Ada");

        let updated = service
            .update(
                &pitch.id,
                &founder_id,
                PitchPatch {
                    team_bios: Some(TeamBiosInput::Members(vec![TeamMember {
                        name: "Grace".into(),
                        role: "CEO".into(),
                        bio: "leads".into(),
                    }])),
                    ..Default::default()
                },
            )
            .expect("update");
        assert_eq!(updated.team_bios[0].name, "Grace");

        let err = service
            .update(
                &pitch.id,
                &founder_id,
                PitchPatch {
                    team_bios: Some(TeamBiosInput::Json("not json".into())),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn update_and_delete_require_ownership() {
        let (db, service, founder_id) = setup();
        let other = ProfileService::new(db)
            .register(RegisterProfileInput {
                name: "Other".into(),
                role: Role::Founder,
                avatar_url: None,
                bio: None,
            })
            .expect("second founder");
        let pitch = service
            .create(minimal_draft("Owned"), &founder_id)
            .expect("create");

        let err = service
            .update(
                &pitch.id,
                &other.id,
                PitchPatch {
                    title: Some("Hijacked".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let err = service.delete(&pitch.id, &other.id).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        service.delete(&pitch.id, &founder_id).expect("owner delete");
        let err = service.get(&pitch.id).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn create_rejects_unknown_and_investor_founders() {
        let (db, service, _founder_id) = setup();
        let err = service
            .create(minimal_draft("Ghost"), "missing-profile")
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let investor = ProfileService::new(db)
            .register(RegisterProfileInput {
                name: "Investor".into(),
                role: Role::Investor,
                avatar_url: None,
                bio: None,
            })
            .expect("register investor");
        let err = service
            .create(minimal_draft("Wrong role"), &investor.id)
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn equity_and_amounts_are_validated() {
        let (_db, service, founder_id) = setup();
        let mut draft = minimal_draft("Bad equity");
        draft.equity_offered = 150.0;
        let err = service.create(draft, &founder_id).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let mut draft = minimal_draft("Bad goal");
        draft.funding_goal = -1.0;
        let err = service.create(draft, &founder_id).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn url_fields_clear_on_explicit_null() {
        let (_db, service, founder_id) = setup();
        let mut draft = minimal_draft("Linked");
        draft.video_url = Some("https://example.com/demo.mp4".into());
        let pitch = service.create(draft, &founder_id).expect("create");

        // A patch without the key leaves the URL untouched.
        let patch: PitchPatch = serde_json::from_str("{}").expect("empty patch");
        let unchanged = service.update(&pitch.id, &founder_id, patch).expect("noop");
        assert_eq!(
            unchanged.video_url.as_deref(),
            Some("https://example.com/demo.mp4")
        );

        // An explicit null clears it.
        let patch: PitchPatch =
            serde_json::from_str(r#"{"video_url": null}"#).expect("null patch");
        let cleared = service.update(&pitch.id, &founder_id, patch).expect("clear");
        assert_eq!(cleared.video_url, None);
    }

    #[test]
    fn list_all_returns_newest_first() {
        let (_db, service, founder_id) = setup();
        let first = service
            .create(minimal_draft("First"), &founder_id)
            .expect("first");
        // Same-second timestamps sort lexicographically on the RFC3339
        // string, which has sub-second precision.
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = service
            .create(minimal_draft("Second"), &founder_id)
            .expect("second");

        let all = service.list_all().expect("list");
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }
}
