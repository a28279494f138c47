use serde::{Deserialize, Serialize};

/// Upstream catalog identifier
pub type MediaId = i64;

/// Airing status as reported by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaStatus {
    Releasing,
    Finished,
    NotYetReleased,
    Cancelled,
    Hiatus,
}

impl MediaStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MediaStatus::Releasing => "Releasing",
            MediaStatus::Finished => "Finished",
            MediaStatus::NotYetReleased => "Upcoming",
            MediaStatus::Cancelled => "Cancelled",
            MediaStatus::Hiatus => "On hiatus",
        }
    }
}

/// Next scheduled episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextAiring {
    pub episode: u32,
    /// Epoch seconds
    pub airing_at: i64,
}

impl NextAiring {
    pub fn seconds_until(&self, now_secs: i64) -> i64 {
        self.airing_at - now_secs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaTitle {
    #[serde(default)]
    pub romaji: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub native: Option<String>,
}

impl MediaTitle {
    pub fn romaji(title: impl Into<String>) -> Self {
        Self {
            romaji: Some(title.into()),
            ..Self::default()
        }
    }

    /// Display title: romaji, then english, then native.
    pub fn preferred(&self) -> &str {
        [&self.romaji, &self.english, &self.native]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|t| !t.trim().is_empty())
            .unwrap_or("Anime")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    #[serde(default)]
    pub extra_large: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
}

/// Search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaSummary {
    pub id: MediaId,
    #[serde(default)]
    pub title: MediaTitle,
    #[serde(default)]
    pub cover_image: Option<CoverImage>,
    #[serde(default)]
    pub status: Option<MediaStatus>,
    #[serde(default)]
    pub next_airing_episode: Option<NextAiring>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub season_year: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub average_score: Option<u32>,
}

/// Status-only record returned by a bulk refresh
///
/// Every field except `id` may come back null from upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialRecord {
    pub id: MediaId,
    #[serde(default)]
    pub status: Option<MediaStatus>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub next_airing_episode: Option<NextAiring>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub url: String,
    pub site: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEpisode {
    pub episode: u32,
    pub airing_at: i64,
}

/// Full detail record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDetails {
    pub id: MediaId,
    pub title: MediaTitle,
    pub description: Option<String>,
    pub cover_image: Option<CoverImage>,
    pub banner_image: Option<String>,
    pub status: Option<MediaStatus>,
    pub episodes: Option<u32>,
    pub next_airing_episode: Option<NextAiring>,
    /// Upcoming episodes, at most five
    pub airing_schedule: Vec<ScheduledEpisode>,
    pub external_links: Vec<ExternalLink>,
    pub season: Option<String>,
    pub season_year: Option<i32>,
    pub start_date: Option<FuzzyDate>,
    pub end_date: Option<FuzzyDate>,
    pub genres: Vec<String>,
    pub average_score: Option<u32>,
    pub studios: Vec<String>,
}

/// Canonical item data supplied by the caller when adding to the watchlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrackedItem {
    pub id: MediaId,
    #[serde(default)]
    pub title: MediaTitle,
    #[serde(default)]
    pub cover_image: Option<CoverImage>,
    pub status: MediaStatus,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub next_airing_episode: Option<NextAiring>,
    /// Defaults to enabled
    #[serde(default)]
    pub notifications_enabled: Option<bool>,
}

/// Watchlist entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    pub id: MediaId,
    pub title: MediaTitle,
    #[serde(default)]
    pub cover_image: Option<CoverImage>,
    pub status: MediaStatus,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub next_airing_episode: Option<NextAiring>,
    /// Epoch millis, immutable after creation
    pub added_at: i64,
    /// Epoch millis of the last successful refresh
    pub last_checked_at: i64,
    pub notifications_enabled: bool,
}

impl TrackedItem {
    pub fn from_new(item: NewTrackedItem, now_millis: i64) -> Self {
        Self {
            id: item.id,
            title: item.title,
            cover_image: item.cover_image,
            status: item.status,
            episodes: item.episodes,
            next_airing_episode: item.next_airing_episode,
            added_at: now_millis,
            last_checked_at: now_millis,
            notifications_enabled: item.notifications_enabled.unwrap_or(true),
        }
    }

    /// Overlay the refreshable fields. Identity and metadata are left alone.
    pub fn apply_refresh(&mut self, record: &PartialRecord, now_millis: i64) {
        if let Some(status) = record.status {
            self.status = status;
        }
        self.episodes = record.episodes;
        self.next_airing_episode = record.next_airing_episode;
        self.last_checked_at = now_millis;
    }

    pub fn display_title(&self) -> &str {
        self.title.preferred()
    }

    pub fn icon(&self) -> Option<&str> {
        self.cover_image.as_ref().and_then(|c| c.medium.as_deref())
    }
}

/// GraphQL request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlRequest {
    pub query: String,
    pub variables: serde_json::Value,
}

/// Raw transport reply
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Content handed to the notification display capability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub icon: String,
}
