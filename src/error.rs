//! Error types for the data layer.

use thiserror::Error;

/// Failure of one of the three data fetches.
///
/// A province id with no matching boundary (or the other way round) is not
/// an error; the join treats it as zero population.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("request to {url} failed: {reason}")]
    NetworkFailure { url: String, reason: String },

    #[error("malformed data from {url}: {reason}")]
    MalformedData { url: String, reason: String },
}

impl DataError {
    pub fn network(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::NetworkFailure {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedData {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Short label for the status bar
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NetworkFailure { .. } => "network failure",
            Self::MalformedData { .. } => "malformed data",
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
