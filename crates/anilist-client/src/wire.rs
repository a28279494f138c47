// Catalog response envelopes

use airing_core::{
    CoverImage, ExternalLink, FuzzyDate, MediaDetails, MediaStatus, MediaTitle, NextAiring,
    ScheduledEpisode,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageData<T> {
    #[serde(rename = "Page")]
    pub page: Option<MediaPage<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaPage<T> {
    #[serde(default = "Vec::new")]
    pub media: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MediaData {
    #[serde(rename = "Media")]
    pub media: Option<DetailsWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Nodes<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudioNode {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DetailsWire {
    pub id: i64,
    #[serde(default)]
    pub title: MediaTitle,
    pub description: Option<String>,
    pub cover_image: Option<CoverImage>,
    pub banner_image: Option<String>,
    pub status: Option<MediaStatus>,
    pub episodes: Option<u32>,
    pub next_airing_episode: Option<NextAiring>,
    pub airing_schedule: Option<Nodes<ScheduledEpisode>>,
    pub external_links: Option<Vec<ExternalLink>>,
    pub season: Option<String>,
    pub season_year: Option<i32>,
    pub start_date: Option<FuzzyDate>,
    pub end_date: Option<FuzzyDate>,
    pub genres: Option<Vec<String>>,
    pub average_score: Option<u32>,
    pub studios: Option<Nodes<StudioNode>>,
}

impl From<DetailsWire> for MediaDetails {
    fn from(w: DetailsWire) -> Self {
        MediaDetails {
            id: w.id,
            title: w.title,
            description: w.description,
            cover_image: w.cover_image,
            banner_image: w.banner_image,
            status: w.status,
            episodes: w.episodes,
            next_airing_episode: w.next_airing_episode,
            airing_schedule: w.airing_schedule.map(|s| s.nodes).unwrap_or_default(),
            external_links: w.external_links.unwrap_or_default(),
            season: w.season,
            season_year: w.season_year,
            start_date: w.start_date,
            end_date: w.end_date,
            genres: w.genres.unwrap_or_default(),
            average_score: w.average_score,
            studios: w
                .studios
                .map(|s| s.nodes.into_iter().map(|n| n.name).collect())
                .unwrap_or_default(),
        }
    }
}
