//! GraphQL documents sent to the catalog.

pub const SEARCH_PAGE_SIZE: u32 = 10;

pub const SEARCH_QUERY: &str = r#"
query ($search: String, $perPage: Int) {
  Page(page: 1, perPage: $perPage) {
    media(search: $search, type: ANIME) {
      id
      title { romaji english native }
      coverImage { large medium }
      status
      nextAiringEpisode { airingAt episode }
      episodes
      season
      seasonYear
      genres
      averageScore
    }
  }
}
"#;

pub const DETAILS_QUERY: &str = r#"
query ($id: Int) {
  Media(id: $id, type: ANIME) {
    id
    title { romaji english native }
    description
    coverImage { extraLarge large medium }
    bannerImage
    status
    episodes
    nextAiringEpisode { airingAt timeUntilAiring episode }
    airingSchedule(notYetAired: true, perPage: 5) {
      nodes { episode airingAt }
    }
    externalLinks { url site }
    season
    seasonYear
    startDate { year month day }
    endDate { year month day }
    genres
    averageScore
    studios(isMain: true) {
      nodes { name }
    }
  }
}
"#;

pub const BULK_STATUS_QUERY: &str = r#"
query ($ids: [Int], $perPage: Int) {
  Page(page: 1, perPage: $perPage) {
    media(id_in: $ids, type: ANIME) {
      id
      status
      episodes
      nextAiringEpisode { airingAt timeUntilAiring episode }
    }
  }
}
"#;
