//! Error types.
//!
//! - `FeatureError` is what the library returns. Each variant is one failure
//!   class of the feature engineering pipeline; none of them is recovered from
//!   locally.
//! - `AppError` is what the binary prints: a message plus a process exit code.

use chrono::NaiveDate;
use thiserror::Error;

use crate::decomp::DecompositionError;
use crate::domain::ColumnRole;

/// Failure of the feature engineering pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// A column declared in the data specification is absent from the raw dataset.
    #[error("Missing column `{column}` (declared as {role})")]
    MissingColumn { column: String, role: ColumnRole },

    /// Structurally inconsistent holiday spec, hyperparameter registry or data spec.
    #[error("Invalid specification: {0}")]
    InvalidSpecification(String),

    /// The raw data cannot be turned into a canonical frame.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Duplicate date {date} in the raw dataset")]
    DuplicateDate { date: NaiveDate },

    /// Failure reported by the decomposition model, passed through untouched.
    #[error(transparent)]
    Decomposition(#[from] DecompositionError),
}

impl FeatureError {
    pub fn spec(message: impl Into<String>) -> Self {
        FeatureError::InvalidSpecification(message.into())
    }

    pub fn data(message: impl Into<String>) -> Self {
        FeatureError::InvalidData(message.into())
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FeatureError> for AppError {
    fn from(err: FeatureError) -> Self {
        let exit_code = match &err {
            FeatureError::MissingColumn { .. } | FeatureError::InvalidSpecification(_) => 2,
            FeatureError::InvalidData(_) | FeatureError::DuplicateDate { .. } => 3,
            FeatureError::Decomposition(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
