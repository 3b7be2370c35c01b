//! Builder configuration
//!
//! Defaults are exposed as named constants so tests can assert against them.

use serde::{Deserialize, Serialize};

/// Descendant generations walked below the root profile.
pub const DEFAULT_GENERATION_LIMIT: usize = 5;

/// Spacing between private ids of different ancestor branches.
pub const DEFAULT_PRIVATE_ID_OFFSET: i64 = 1000;

/// Minimum Sørensen–Dice similarity for a married surname to match a spouse.
pub const DEFAULT_SURNAME_SIMILARITY: f64 = 0.75;

/// Maximum keys per `get_relatives` call.
pub const DEFAULT_RELATIVES_BATCH_SIZE: usize = 100;

pub const DEFAULT_PROFILE_URL_BASE: &str = "https://www.wikitree.com/wiki/";
pub const DEFAULT_IMAGE_URL_BASE: &str = "https://www.wikitree.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub generation_limit: usize,
    pub private_id_offset: i64,
    pub surname_similarity_threshold: f64,
    pub relatives_batch_size: usize,
    pub profile_url_base: String,
    pub image_url_base: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            generation_limit: DEFAULT_GENERATION_LIMIT,
            private_id_offset: DEFAULT_PRIVATE_ID_OFFSET,
            surname_similarity_threshold: DEFAULT_SURNAME_SIMILARITY,
            relatives_batch_size: DEFAULT_RELATIVES_BATCH_SIZE,
            profile_url_base: DEFAULT_PROFILE_URL_BASE.to_string(),
            image_url_base: DEFAULT_IMAGE_URL_BASE.to_string(),
        }
    }
}

impl BuilderConfig {
    /// Parse a (possibly partial) JSON config; missing fields keep their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn profile_url(&self, name: &str) -> String {
        format!("{}{}", self.profile_url_base, name)
    }
}
