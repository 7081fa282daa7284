pub mod candidates;
pub mod providers;
pub mod queries;
pub mod recommendations;
pub mod similarity;
pub mod text_features;

pub use candidates::collect_candidates;
pub use recommendations::generate_recommendations;
pub use similarity::SimilarityEngine;
