use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Component errors
// ---------------------------------------------------------------------------

/// A query the model could not turn into a profit estimate.
#[derive(Debug, Error, PartialEq)]
pub enum PredictionError {
    #[error("'{field}' must be a finite, non-negative amount (got {value})")]
    InvalidAmount { field: &'static str, value: f64 },
    #[error("State label is empty")]
    MissingState,
    #[error("State '{0}' was not seen when the model was trained")]
    UnknownCategory(String),
    #[error("model produced a non-finite estimate ({0})")]
    NonFinite(f64),
    #[error("model rejected the input: {0}")]
    Rejected(String),
}

/// An artifact exists on disk but is not a usable model.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("reading artifact: {0}")]
    Io(#[from] io::Error),
    #[error("decoding artifact: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("artifact is inconsistent: {0}")]
    Invalid(String),
}

/// Fewer dataset rows than neighbors requested.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("requested {requested} similar records but the dataset only has {available}")]
pub struct InsufficientData {
    pub requested: usize,
    pub available: usize,
}

// ---------------------------------------------------------------------------
// Service-level taxonomy surfaced to the presentation layer
// ---------------------------------------------------------------------------

/// Every failure the core reports. None of them should end the process.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("dataset not found at {}", path.display())]
    DataUnavailable { path: PathBuf },

    #[error("model artifact not found at {}", path.display())]
    ModelUnavailable { path: PathBuf },

    #[error("failed to load model from {}: {source}", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: ModelLoadError,
    },

    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictionError),

    #[error(transparent)]
    InsufficientData(#[from] InsufficientData),

    #[error("failed to store model at {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ServiceError {
    /// Actionable text for the user, one per error kind.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::DataUnavailable { path } => format!(
                "Dataset file could not be found: {}. Check the data path.",
                path.display()
            ),
            ServiceError::ModelUnavailable { path } => format!(
                "No trained model at {}. Upload a model artifact to enable predictions.",
                path.display()
            ),
            ServiceError::ModelLoad { source, .. } => format!(
                "The model artifact could not be loaded ({source}). Re-upload a valid artifact."
            ),
            ServiceError::Prediction(e) => {
                format!("Prediction failed: {e}. Adjust the input values and try again.")
            }
            ServiceError::InsufficientData(e) => {
                format!("Similar records unavailable: {e}. Showing a random sample instead.")
            }
            ServiceError::Write { source, .. } => format!(
                "Upload failed ({source}). The previous model was kept; try the upload again."
            ),
        }
    }

    /// Whether the presentation layer should ask for a model upload.
    pub fn needs_upload(&self) -> bool {
        matches!(
            self,
            ServiceError::ModelUnavailable { .. } | ServiceError::ModelLoad { .. }
        )
    }
}
