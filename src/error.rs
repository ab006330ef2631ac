//! Error types for the panel coordination core.
//!
//! These errors are serializable so the host can forward them to the
//! rendering layer verbatim. No error from this crate is allowed to
//! propagate as a panic; panels convert failures to local state.

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the panel coordination subsystem.
///
/// All variants serialize to a structured JSON object for host consumption.
#[derive(Debug, Clone, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum PanelError {
    /// An externally-fetched data slice failed to load or refresh.
    ///
    /// Displayed verbatim; recovery is always user-initiated via refresh.
    #[error("Data fetch error: {message}")]
    DataFetch {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        slice: Option<String>,
    },

    /// A coordination action (task creation, reaction, comment) was
    /// reported failed by the external collaborator.
    #[error("Coordination error: {message}")]
    Coordination {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        action: Option<String>,
    },

    /// Host storage read/write failed (hidden-message persistence).
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Invalid input provided to an operation.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        field: Option<String>,
    },

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PanelError {
    /// Create a data-fetch error.
    pub fn data_fetch(message: impl Into<String>) -> Self {
        Self::DataFetch {
            message: message.into(),
            slice: None,
        }
    }

    /// Create a data-fetch error tagged with the slice name.
    pub fn data_fetch_for_slice(message: impl Into<String>, slice: impl Into<String>) -> Self {
        Self::DataFetch {
            message: message.into(),
            slice: Some(slice.into()),
        }
    }

    /// Create a coordination error.
    pub fn coordination(message: impl Into<String>) -> Self {
        Self::Coordination {
            message: message.into(),
            action: None,
        }
    }

    /// Create a coordination error tagged with the action name.
    pub fn coordination_for_action(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Coordination {
            message: message.into(),
            action: Some(action.into()),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: None,
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PanelError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for PanelError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}
