// Core algorithm exports
pub mod filters;
pub mod matcher;
pub mod scoring;
pub mod similarity;

pub use filters::{is_candidate, orient, passes_threshold};
pub use matcher::{Matcher, TOP_K_MATCHES};
pub use scoring::calculate_match_score;
pub use similarity::{category_match, cosine_similarity};
