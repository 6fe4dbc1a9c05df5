//! Outreach-specific error types

use shared::{SharedError, StrategyKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutreachError {
    #[error("{strategy} strategy failed: {reason}")]
    StrategyError { strategy: StrategyKind, reason: String },

    #[error("Campaign log storage failed: {operation}: {reason}")]
    StorageError { operation: String, reason: String },

    #[error("Contact directory error: {reason}")]
    DirectoryError { reason: String },

    #[error("Outreach channel error: {reason}")]
    ChannelError { reason: String },

    #[error("Browser navigation failed during {step}: {reason}")]
    NavigationError { step: String, reason: String },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Schedule error: {reason}")]
    ScheduleError { reason: String },

    #[error("Invalid campaign transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl OutreachError {
    pub fn strategy(strategy: StrategyKind, reason: impl Into<String>) -> Self {
        Self::StrategyError {
            strategy,
            reason: reason.into(),
        }
    }

    pub fn storage(operation: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::StorageError {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    pub fn directory(reason: impl std::fmt::Display) -> Self {
        Self::DirectoryError {
            reason: reason.to_string(),
        }
    }

    pub fn channel(reason: impl std::fmt::Display) -> Self {
        Self::ChannelError {
            reason: reason.to_string(),
        }
    }

    pub fn navigation(step: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::NavigationError {
            step: step.into(),
            reason: reason.to_string(),
        }
    }

    pub fn config(field: impl Into<String>) -> Self {
        Self::ConfigurationError { field: field.into() }
    }

    pub fn schedule(reason: impl std::fmt::Display) -> Self {
        Self::ScheduleError {
            reason: reason.to_string(),
        }
    }

    /// Storage failures put the rate ledger at risk and must stop the current company
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageError { .. })
    }
}

pub type OutreachResult<T> = Result<T, OutreachError>;
