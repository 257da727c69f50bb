//! Engine error taxonomy
//!
//! Only conditions the caller must act on are errors. An empty result is a
//! [`crate::recommendation::RecommendationStatus::NoCandidates`] status, and
//! imputed inputs travel as warnings on each recommendation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which record a missing or imputed field belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Subject {
    Farm(String),
    Seed(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Farm(id) => write!(f, "farm '{}'", id),
            Subject::Seed(id) => write!(f, "seed '{}'", id),
        }
    }
}

/// Fields every downstream component depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Location,
    CropType,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredField::Location => f.write_str("location"),
            RequiredField::CropType => f.write_str("crop_type"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A hard-required field is missing. Fatal for the request.
    #[error("incomplete profile: {subject} is missing required field '{field}'")]
    IncompleteProfile {
        subject: Subject,
        field: RequiredField,
    },

    #[error("unknown farm '{0}'")]
    UnknownFarm(String),

    #[error("unknown recommendation '{0}'")]
    UnknownRecommendation(String),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("recommendation store failure: {0}")]
    Storage(String),
}

impl EngineError {
    pub fn incomplete(subject: Subject, field: RequiredField) -> Self {
        EngineError::IncompleteProfile { subject, field }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
