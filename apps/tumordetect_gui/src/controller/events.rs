//! UI/backend events and error modeling for the desktop tool page.

use client_core::SelectedFile;
use shared::{
    domain::RequestTicket,
    error::{AnalysisError, ErrorKind},
    protocol::AnalysisResult,
};
use url::Url;

use crate::media::PreviewImage;

pub enum UiEvent {
    Info(String),
    Error(UiError),
    FilesSelected(Vec<SelectedFile>),
    SelectionFailed(String),
    AnalysisCompleted {
        ticket: RequestTicket,
        outcome: Result<AnalysisResult, AnalysisError>,
    },
    ImageLoaded {
        url: Url,
        image: PreviewImage,
    },
    ImageFailed {
        url: Url,
        reason: String,
    },
    ServiceHealth(Result<String, AnalysisError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Transport,
    Server,
    Unknown,
}

impl UiErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Validation => "Check your selection",
            Self::Transport => "Connection problem",
            Self::Server => "Analysis service error",
            Self::Unknown => "Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    FileSelection,
    HealthCheck,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("no such file")
            || message_lower.contains("select at least")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else if message_lower.contains("server error") {
            UiErrorCategory::Server
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_analysis(context: UiErrorContext, err: &AnalysisError) -> Self {
        let category = match err.kind() {
            ErrorKind::Validation => UiErrorCategory::Validation,
            ErrorKind::Transport => UiErrorCategory::Transport,
            ErrorKind::Server | ErrorKind::MalformedResponse => UiErrorCategory::Server,
            ErrorKind::Interrupted => UiErrorCategory::Unknown,
        };
        Self {
            category,
            context,
            message: err.user_message(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
