use thiserror::Error;

use super::state::DatasetStage;
use crate::core::descriptors::assembler::FeatureError;
use crate::core::io::records::RecordLoadError;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Cannot {operation} a dataset that is {current}; it must be {required}")]
    Precedence {
        operation: &'static str,
        required: DatasetStage,
        current: DatasetStage,
    },

    #[error("Feature selection failed: {source}")]
    Feature {
        #[from]
        source: FeatureError,
    },

    #[error("Failed to load records: {source}")]
    Source {
        #[from]
        source: RecordLoadError,
    },

    #[error("Dataset is empty: {0}")]
    Empty(String),

    #[error("Feature vector has {found} columns, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("Feature column {column} is '{found}', but the scaler was fitted on '{expected}'")]
    FeatureNameMismatch {
        column: usize,
        expected: String,
        found: String,
    },
}
