use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Backend timestamps arrive naive (`2026-03-01T08:30:00.123456`) or with an
/// offset (`...+00:00`, `...Z`) depending on the database. Offset forms are
/// normalized to UTC.
fn parse_backend_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .or_else(|_| raw.parse::<NaiveDateTime>())
        .ok()
}

fn deserialize_backend_datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_backend_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
}

fn deserialize_optional_backend_datetime<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            parse_backend_datetime(&raw)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{raw}`")))
        })
        .transpose()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    #[serde(deserialize_with = "deserialize_backend_datetime")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: Option<&'a str>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.bio.is_none()
            && self.location.is_none()
            && self.avatar_url.is_none()
    }
}

/// Severity score computed by the backend alongside a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityScore {
    pub score: u8,
    pub level: String,
    pub color: String,
    pub urgency: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisResult {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub disease_name: Option<String>,
    pub confidence: Option<f64>,
    pub crop_type: Option<String>,
    #[serde(default)]
    pub recommendations: Option<String>,
    pub is_healthy: bool,
    #[serde(default, deserialize_with = "deserialize_optional_backend_datetime")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub severity: Option<SeverityScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub query: String,
    pub result_type: Option<String>,
    pub result_summary: Option<String>,
    pub image_url: Option<String>,
    #[serde(deserialize_with = "deserialize_backend_datetime")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(deserialize_with = "deserialize_backend_datetime")]
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(deserialize_with = "deserialize_backend_datetime")]
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatStatus {
    pub mode: String,
    pub model: String,
    pub status: String,
    #[serde(default)]
    pub kb_entries: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub content: String,
    pub author: User,
    #[serde(deserialize_with = "deserialize_backend_datetime")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub tags: Option<String>,
    pub likes_count: i64,
    pub author: User,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(deserialize_with = "deserialize_backend_datetime")]
    pub created_at: NaiveDateTime,
}

impl Post {
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment<'a> {
    pub content: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketPrice {
    pub crop: String,
    #[serde(default)]
    pub emoji: Option<String>,
    pub unit: String,
    pub price: f64,
    pub change_pct: f64,
    pub trend: Trend,
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mover {
    pub crop: String,
    pub change_pct: f64,
    pub trend: Trend,
    pub price: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopMovers {
    pub gainers: Vec<Mover>,
    pub losers: Vec<Mover>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SoilInput {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
    pub top_n: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct FertilizerRequest {
    pub crop: String,
    pub area_hectares: f64,
    pub soil_type: String,
    pub soil_ph: f64,
    pub organic_matter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TipSummary {
    pub id: i64,
    pub crop: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikeCount {
    pub likes_count: i64,
}
