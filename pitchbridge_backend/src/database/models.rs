use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub name: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: String,
}

/// One row of the `pitches` table. The list-valued columns (`tags`,
/// `product_screenshots`, `team_bios`, `financial_projections`) hold JSON
/// text; the pitch service owns encoding and decoding them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitchRecord {
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
    pub tags: String,
    pub pitch_deck_url: Option<String>,
    pub product_screenshots: String,
    pub company_logo_url: Option<String>,
    pub team_bios: String,
    pub financial_projections: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestRecord {
    pub pitch_id: String,
    pub investor_id: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    pub pitch_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: String,
    pub namespace: String,
    pub path: String,
    pub original_name: Option<String>,
    pub mime: Option<String>,
    pub size_bytes: Option<i64>,
    pub checksum: Option<String>,
    pub created_at: String,
}
