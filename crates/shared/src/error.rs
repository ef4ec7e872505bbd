use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NO_FILES_SELECTED_MESSAGE: &str = "Please select at least one file.";
pub const GENERIC_FAILURE_MESSAGE: &str = "An error occurred while processing the files.";
pub const MALFORMED_RESPONSE_MESSAGE: &str =
    "Received an invalid response from the analysis service.";
pub const INTERRUPTED_MESSAGE: &str = "The request was interrupted before a response arrived.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Transport,
    Server,
    MalformedResponse,
    Interrupted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no files selected")]
    NoFilesSelected,
    #[error("transport failure: {message}")]
    Transport { message: String },
    #[error("server responded with {status}: {message}")]
    Server { status: u16, message: String },
    #[error("malformed analysis response: {message}")]
    MalformedResponse { message: String },
    #[error("request interrupted before a response arrived")]
    Interrupted,
}

impl AnalysisError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoFilesSelected => ErrorKind::Validation,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Server { .. } => ErrorKind::Server,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// Text shown in the error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoFilesSelected => NO_FILES_SELECTED_MESSAGE.to_string(),
            Self::Transport { message } if message.trim().is_empty() => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            Self::Transport { message } => message.clone(),
            Self::Server { message, .. } => message.clone(),
            Self::MalformedResponse { .. } => MALFORMED_RESPONSE_MESSAGE.to_string(),
            Self::Interrupted => INTERRUPTED_MESSAGE.to_string(),
        }
    }
}
