//! Error taxonomy for graph construction
//!
//! Every variant carries a stable code plus named interpolation arguments so
//! a front end can localize the message instead of showing raw prose.

use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum GenealogyError {
    #[error("profile {key} not found")]
    ProfileNotFound { key: String },
    #[error("profile {key} is not accessible")]
    ProfileNotAccessible { key: String },
    #[error("no profile id provided")]
    IdNotProvided,
    #[error("input contained {individuals} individuals and {families} families")]
    ReadFailed { individuals: usize, families: usize },
    #[error("fetch failed: {0}")]
    FetchFailed(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl GenealogyError {
    /// Stable code used as the localization key.
    pub fn code(&self) -> &'static str {
        match self {
            GenealogyError::ProfileNotFound { .. } => "PROFILE_NOT_FOUND",
            GenealogyError::ProfileNotAccessible { .. } => "PROFILE_NOT_ACCESSIBLE",
            GenealogyError::IdNotProvided => "ID_NOT_PROVIDED",
            GenealogyError::ReadFailed { .. } => "READ_FAILED",
            GenealogyError::FetchFailed(_) => "FETCH_FAILED",
            GenealogyError::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    /// Interpolation arguments for the localized message.
    pub fn args(&self) -> BTreeMap<&'static str, String> {
        let mut args = BTreeMap::new();
        match self {
            GenealogyError::ProfileNotFound { key } | GenealogyError::ProfileNotAccessible { key } => {
                args.insert("id", key.clone());
            }
            GenealogyError::ReadFailed {
                individuals,
                families,
            } => {
                args.insert("individuals", individuals.to_string());
                args.insert("families", families.to_string());
            }
            GenealogyError::FetchFailed(message) | GenealogyError::InvalidInput(message) => {
                args.insert("message", message.clone());
            }
            GenealogyError::IdNotProvided => {}
        }
        args
    }
}

impl From<serde_json::Error> for GenealogyError {
    fn from(e: serde_json::Error) -> Self {
        GenealogyError::InvalidInput(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenealogyError>;
