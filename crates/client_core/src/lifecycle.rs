//! Request lifecycle: `Idle -> Loading -> {Succeeded, Failed} -> Loading -> ...`

use shared::{domain::RequestTicket, error::AnalysisError, protocol::AnalysisResult};
use tracing::{debug, info, warn};

use crate::selection::FileSelection;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded(AnalysisResult),
    Failed(AnalysisError),
}

impl RequestStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error().map(AnalysisError::user_message)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    /// Status moved to `Failed`; nothing was sent.
    NoFiles,
    /// Another request is still outstanding; status unchanged.
    InFlight(RequestTicket),
}

#[derive(Debug, Default)]
pub struct RequestLifecycle {
    status: RequestStatus,
    in_flight: Option<RequestTicket>,
    last_ticket: RequestTicket,
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    pub fn in_flight(&self) -> Option<RequestTicket> {
        self.in_flight
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Enters `Loading` and hands out the ticket the completion must carry.
    /// Any previous result or error is discarded.
    pub fn begin(&mut self, selection: &FileSelection) -> Result<RequestTicket, SubmitRejected> {
        if let Some(ticket) = self.in_flight {
            debug!(ticket = ticket.0, "submit ignored while a request is in flight");
            return Err(SubmitRejected::InFlight(ticket));
        }
        if selection.is_empty() {
            warn!("submit rejected: no files selected");
            self.status = RequestStatus::Failed(AnalysisError::NoFilesSelected);
            return Err(SubmitRejected::NoFiles);
        }

        let ticket = self.last_ticket.next();
        self.last_ticket = ticket;
        self.in_flight = Some(ticket);
        self.status = RequestStatus::Loading;
        debug!(ticket = ticket.0, files = selection.len(), "request in flight");
        Ok(ticket)
    }

    /// Resolves the in-flight request. Returns `false` and changes nothing
    /// when `ticket` is not the one currently in flight.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        if self.in_flight != Some(ticket) {
            debug!(ticket = ticket.0, "discarding stale completion");
            return false;
        }
        self.in_flight = None;
        self.status = match outcome {
            Ok(result) => {
                info!(
                    ticket = ticket.0,
                    tumor_type = %result.tumor_type,
                    probability = result.probability,
                    "analysis succeeded"
                );
                RequestStatus::Succeeded(result)
            }
            Err(err) => {
                warn!(ticket = ticket.0, kind = ?err.kind(), error = %err, "analysis failed");
                RequestStatus::Failed(err)
            }
        };
        true
    }

    /// Returns a `Failed` machine to `Idle`. Other states are untouched.
    pub fn clear_error(&mut self) {
        if matches!(self.status, RequestStatus::Failed(_)) {
            self.status = RequestStatus::Idle;
        }
    }
}

#[cfg(test)]
#[path = "tests/lifecycle_tests.rs"]
mod tests;
