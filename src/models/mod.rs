pub mod podcast;
pub mod recommendation;

pub use podcast::{standardize_favorites, Podcast, RawPodcast};
pub use recommendation::{PairScore, Recommendation, ScoredCandidate, Topic};
