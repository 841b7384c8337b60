use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished, playable clip: synthesized and wrapped in the jingles, or
/// uploaded as-is. The backing file under the clip directory belongs to this
/// record and is removed with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub title: String,
    pub audio_url: String,
    pub created_at: DateTime<Utc>,
}

/// Body for POST /api/tts/generate.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
    pub title: Option<String>,
}
