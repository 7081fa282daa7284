use serde::{Deserialize, Serialize};

/// Default strings substituted when a raw payload carries no usable value
pub const UNKNOWN_TITLE: &str = "Unknown Podcast";
pub const UNKNOWN_DESCRIPTION: &str = "No description available";
pub const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";

/// A podcast in standardized form
///
/// Every semantic field is guaranteed non-empty after standardization, so
/// the scoring pipeline never has to re-check for missing text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Podcast {
    pub id: String,
    pub title: String,
    pub description: String,
    pub publisher: String,
    pub genre_ids: Vec<u32>,
    pub thumbnail_url: String,
    pub website_url: String,
    pub explicit: bool,
}

/// Raw podcast payload as it arrives from the catalog or the client
///
/// Catalog endpoints disagree on field names: search results use
/// `title_original` / `description_original` / `publisher_original`, while
/// curated listings use the plain names. Both spellings are accepted here
/// and resolved during standardization.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPodcast {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_original: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_original: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub publisher_original: Option<String>,
    #[serde(default)]
    pub genre_ids: Option<Vec<u32>>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub explicit_content: Option<bool>,
}

impl RawPodcast {
    /// Converts a raw payload into a standardized [`Podcast`]
    ///
    /// Returns `None` when the payload has no id: deduplication and
    /// favorite exclusion are keyed by id, so an id-less record cannot
    /// participate in the pipeline.
    pub fn standardize(self) -> Option<Podcast> {
        let id = self.id.filter(|id| !id.trim().is_empty())?;

        Some(Podcast {
            id,
            title: pick(self.title, self.title_original, UNKNOWN_TITLE),
            description: pick(
                self.description,
                self.description_original,
                UNKNOWN_DESCRIPTION,
            ),
            publisher: pick(self.publisher, self.publisher_original, UNKNOWN_PUBLISHER),
            genre_ids: self.genre_ids.unwrap_or_default(),
            thumbnail_url: pick(self.thumbnail, self.image, ""),
            website_url: pick(self.website, None, ""),
            explicit: self.explicit_content.unwrap_or(false),
        })
    }
}

/// Picks the first non-empty value, falling back to a fixed default
fn pick(primary: Option<String>, alternate: Option<String>, default: &str) -> String {
    primary
        .filter(|s| !s.trim().is_empty())
        .or_else(|| alternate.filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| default.to_string())
}

impl From<Podcast> for RawPodcast {
    fn from(podcast: Podcast) -> Self {
        RawPodcast {
            id: Some(podcast.id),
            title: Some(podcast.title),
            description: Some(podcast.description),
            publisher: Some(podcast.publisher),
            genre_ids: Some(podcast.genre_ids),
            thumbnail: Some(podcast.thumbnail_url),
            website: Some(podcast.website_url),
            explicit_content: Some(podcast.explicit),
            ..RawPodcast::default()
        }
    }
}

/// Standardizes a batch of raw favorites, dropping id-less records
///
/// Standardization happens once, at pipeline entry. Running it again over
/// already-standardized data is a no-op.
pub fn standardize_favorites(raw: Vec<RawPodcast>) -> Vec<Podcast> {
    raw.into_iter().filter_map(RawPodcast::standardize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standardize_prefers_primary_fields() {
        let raw = RawPodcast {
            id: Some("abc".to_string()),
            title: Some("Hardcore History".to_string()),
            title_original: Some("ignored".to_string()),
            description: Some("In-depth history".to_string()),
            publisher: Some("Dan Carlin".to_string()),
            genre_ids: Some(vec![125]),
            ..RawPodcast::default()
        };

        let podcast = raw.standardize().unwrap();
        assert_eq!(podcast.title, "Hardcore History");
        assert_eq!(podcast.description, "In-depth history");
        assert_eq!(podcast.publisher, "Dan Carlin");
        assert_eq!(podcast.genre_ids, vec![125]);
    }

    #[test]
    fn test_standardize_falls_back_to_original_fields() {
        let raw = RawPodcast {
            id: Some("abc".to_string()),
            title_original: Some("Radiolab".to_string()),
            description_original: Some("Science and curiosity".to_string()),
            publisher_original: Some("WNYC".to_string()),
            thumbnail: None,
            image: Some("https://img.example/radiolab.jpg".to_string()),
            ..RawPodcast::default()
        };

        let podcast = raw.standardize().unwrap();
        assert_eq!(podcast.title, "Radiolab");
        assert_eq!(podcast.description, "Science and curiosity");
        assert_eq!(podcast.publisher, "WNYC");
        assert_eq!(podcast.thumbnail_url, "https://img.example/radiolab.jpg");
    }

    #[test]
    fn test_standardize_empty_payload_uses_defaults() {
        let raw = RawPodcast {
            id: Some("abc".to_string()),
            ..RawPodcast::default()
        };

        let podcast = raw.standardize().unwrap();
        assert_eq!(podcast.title, UNKNOWN_TITLE);
        assert_eq!(podcast.description, UNKNOWN_DESCRIPTION);
        assert_eq!(podcast.publisher, UNKNOWN_PUBLISHER);
        assert_eq!(podcast.thumbnail_url, "");
        assert!(!podcast.explicit);
        assert!(podcast.genre_ids.is_empty());
    }

    #[test]
    fn test_standardize_whitespace_counts_as_missing() {
        let raw = RawPodcast {
            id: Some("abc".to_string()),
            title: Some("   ".to_string()),
            title_original: Some("Actual Title".to_string()),
            ..RawPodcast::default()
        };

        let podcast = raw.standardize().unwrap();
        assert_eq!(podcast.title, "Actual Title");
    }

    #[test]
    fn test_standardize_drops_missing_id() {
        let raw = RawPodcast {
            title: Some("No Id".to_string()),
            ..RawPodcast::default()
        };
        assert!(raw.standardize().is_none());

        let blank = RawPodcast {
            id: Some("  ".to_string()),
            ..RawPodcast::default()
        };
        assert!(blank.standardize().is_none());
    }

    #[test]
    fn test_standardize_is_idempotent() {
        let raw = RawPodcast {
            id: Some("abc".to_string()),
            title_original: Some("Radiolab".to_string()),
            ..RawPodcast::default()
        };

        let once = raw.standardize().unwrap();
        let twice = RawPodcast::from(once.clone()).standardize().unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_standardize_favorites_from_json() {
        let json = r#"[
            {"id": "p1", "title_original": "Serial", "publisher_original": "This American Life"},
            {"title": "dropped, no id"},
            {"id": "p2"}
        ]"#;

        let raw: Vec<RawPodcast> = serde_json::from_str(json).unwrap();
        let favorites = standardize_favorites(raw);

        assert_eq!(favorites.len(), 2);
        assert_eq!(favorites[0].title, "Serial");
        assert_eq!(favorites[1].title, UNKNOWN_TITLE);
    }
}
