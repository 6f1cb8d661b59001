//! Per-pitch, two-party message log with realtime push. Messages are
//! append-only; delivery to live subscribers goes through a per-pitch
//! broadcast channel after the row is persisted.

use crate::database::models::MessageRecord;
use crate::database::repositories::{MessageRepository, PitchRepository, ProfileRepository};
use crate::database::Database;
use crate::error::{DomainError, DomainResult};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub id: String,
    pub pitch_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub created_at: String,
}

impl MessageView {
    fn from_record(record: MessageRecord) -> Self {
        Self {
            id: record.id,
            pitch_id: record.pitch_id,
            sender_id: record.sender_id,
            receiver_id: record.receiver_id,
            content: record.content,
            created_at: record.created_at,
        }
    }
}

/// Fan-out hub keyed by pitch id. Channels are created lazily on first
/// subscription and dropped again once their last receiver is gone, so the
/// map only holds pitches somebody is currently listening to. Ordering
/// holds within one pitch's channel only.
#[derive(Clone, Default)]
pub struct ChatBus {
    channels: Arc<Mutex<HashMap<String, broadcast::Sender<MessageView>>>>,
}

impl ChatBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, pitch_id: &str) -> broadcast::Receiver<MessageView> {
        let mut channels = self.channels.lock().unwrap_or_else(|p| p.into_inner());
        channels.retain(|_, sender| sender.receiver_count() > 0);
        channels
            .entry(pitch_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    fn publish(&self, message: &MessageView) {
        let mut channels = self.channels.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(sender) = channels.get(&message.pitch_id) {
            // Err means the last subscriber already hung up.
            if sender.send(message.clone()).is_err() {
                channels.remove(&message.pitch_id);
            }
        }
    }
}

#[derive(Clone)]
pub struct MessageService {
    database: Database,
    bus: ChatBus,
}

impl MessageService {
    pub fn new(database: Database, bus: ChatBus) -> Self {
        Self { database, bus }
    }

    pub fn send(
        &self,
        pitch_id: &str,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
    ) -> DomainResult<MessageView> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::validation("message content may not be empty"));
        }

        if self
            .database
            .with_repositories(|repos| repos.pitches().get(pitch_id))?
            .is_none()
        {
            return Err(DomainError::not_found(format!("pitch {pitch_id}")));
        }
        for participant in [sender_id, receiver_id] {
            if self
                .database
                .with_repositories(|repos| repos.profiles().get(participant))?
                .is_none()
            {
                return Err(DomainError::not_found(format!("profile {participant}")));
            }
        }

        let record = MessageRecord {
            id: Uuid::new_v4().to_string(),
            pitch_id: pitch_id.to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            content: content.to_string(),
            created_at: now_utc_iso(),
        };
        self.database
            .with_repositories(|repos| repos.messages().create(&record))?;

        let view = MessageView::from_record(record);
        self.bus.publish(&view);
        tracing::debug!(pitch_id, sender_id, receiver_id, "message stored");
        Ok(view)
    }

    /// Returns the messages the participant is party to, creation order.
    /// A third profile asking about someone else's conversation gets an
    /// empty history, not the channel contents.
    pub fn history(&self, pitch_id: &str, participant_id: &str) -> DomainResult<Vec<MessageView>> {
        let records = self.database.with_repositories(|repos| {
            repos.messages().list_for_participant(pitch_id, participant_id)
        })?;
        Ok(records.into_iter().map(MessageView::from_record).collect())
    }

    /// Live feed of newly created messages for one pitch. Dropping the
    /// receiver ends delivery.
    pub fn subscribe(&self, pitch_id: &str) -> broadcast::Receiver<MessageView> {
        self.bus.subscribe(pitch_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitches::{PitchDraft, PitchService};
    use crate::profiles::{ProfileService, RegisterProfileInput, Role};

    struct Fixture {
        service: MessageService,
        pitch_id: String,
        founder_id: String,
        investor_id: String,
        db: Database,
    }

    fn setup() -> Fixture {
        let conn = rusqlite::Connection::open_in_memory().expect("in-memory db");
        let db = Database::from_connection(conn, true);
        db.ensure_migrations().expect("migrations");

        let profiles = ProfileService::new(db.clone());
        let founder = profiles
            .register(RegisterProfileInput {
                name: "Founder".into(),
                role: Role::Founder,
                avatar_url: None,
                bio: None,
            })
            .expect("founder");
        let investor = profiles
            .register(RegisterProfileInput {
                name: "Investor".into(),
                role: Role::Investor,
                avatar_url: None,
                bio: None,
            })
            .expect("investor");
        let pitch = PitchService::new(db.clone())
            .create(
                PitchDraft {
                    title: "Chat pitch".into(),
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
                },
                &founder.id,
            )
            .expect("pitch");

        Fixture {
            service: MessageService::new(db.clone(), ChatBus::new()),
            pitch_id: pitch.id,
            founder_id: founder.id,
            investor_id: investor.id,
            db,
        }
    }

    #[test]
    fn history_preserves_send_order() {
        let fx = setup();
        fx.service
            .send(&fx.pitch_id, &fx.investor_id, &fx.founder_id, "hello")
            .expect("first");
        fx.service
            .send(&fx.pitch_id, &fx.investor_id, &fx.founder_id, "world")
            .expect("second");

        let history = fx
            .service
            .history(&fx.pitch_id, &fx.investor_id)
            .expect("history");
        let bodies: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(bodies, vec!["hello", "world"]);
    }

    #[test]
    fn history_is_two_party_only() {
        let fx = setup();
        fx.service
            .send(&fx.pitch_id, &fx.investor_id, &fx.founder_id, "private")
            .expect("send");

        let outsider = ProfileService::new(fx.db.clone())
            .register(RegisterProfileInput {
                name: "Outsider".into(),
                role: Role::Investor,
                avatar_url: None,
                bio: None,
            })
            .expect("outsider");
        let history = fx
            .service
            .history(&fx.pitch_id, &outsider.id)
            .expect("history");
        assert!(history.is_empty());
    }

    #[test]
    fn empty_content_is_rejected() {
        let fx = setup();
        let err = fx
            .service
            .send(&fx.pitch_id, &fx.investor_id, &fx.founder_id, "   ")
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn unknown_pitch_or_participant_is_not_found() {
        let fx = setup();
        let err = fx
            .service
            .send("no-such-pitch", &fx.investor_id, &fx.founder_id, "hi")
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = fx
            .service
            .send(&fx.pitch_id, "ghost", &fx.founder_id, "hi")
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn subscribers_receive_new_messages_in_order() {
        let fx = setup();
        let mut rx = fx.service.subscribe(&fx.pitch_id);

        fx.service
            .send(&fx.pitch_id, &fx.investor_id, &fx.founder_id, "first")
            .expect("first");
        fx.service
            .send(&fx.pitch_id, &fx.investor_id, &fx.founder_id, "second")
            .expect("second");

        let got = rx.recv().await.expect("first delivery");
        assert_eq!(got.content, "first");
        let got = rx.recv().await.expect("second delivery");
        assert_eq!(got.content, "second");
    }

    #[tokio::test]
    async fn channels_are_isolated_per_pitch() {
        let fx = setup();
        let mut other_rx = fx.service.subscribe("some-other-pitch");
        fx.service
            .send(&fx.pitch_id, &fx.investor_id, &fx.founder_id, "hello")
            .expect("send");
        assert!(matches!(
            other_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn bus_drops_channels_once_all_receivers_are_gone() {
        let bus = ChatBus::new();
        for i in 0..100 {
            drop(bus.subscribe(&format!("ghost-{i}")));
        }

        // The next subscription sweeps out every channel with no receivers.
        let live = bus.subscribe("live");
        {
            let channels = bus.channels.lock().expect("channel map");
            assert_eq!(channels.len(), 1);
            assert!(channels.contains_key("live"));
        }

        // A publish into a channel whose last receiver hung up removes it.
        drop(live);
        bus.publish(&MessageView {
            id: "m1".into(),
            pitch_id: "live".into(),
            sender_id: "a".into(),
            receiver_id: "b".into(),
            content: "anyone there".into(),
            created_at: now_utc_iso(),
        });
        let channels = bus.channels.lock().expect("channel map");
        assert!(channels.is_empty());
    }

    #[test]
    fn deleting_the_pitch_cascades_to_messages() {
        let fx = setup();
        fx.service
            .send(&fx.pitch_id, &fx.investor_id, &fx.founder_id, "hello")
            .expect("send");
        PitchService::new(fx.db.clone())
            .delete(&fx.pitch_id, &fx.founder_id)
            .expect("delete pitch");

        let history = fx
            .service
            .history(&fx.pitch_id, &fx.investor_id)
            .expect("history");
        assert!(history.is_empty());
    }
}
