//! Upload form controller: file selection, submission and result state.

use shared::{domain::RequestTicket, error::AnalysisError, protocol::AnalysisResult};
use tracing::{info, warn};
use url::Url;

use crate::{
    lifecycle::{RequestLifecycle, RequestStatus},
    render::{self, EnlargedImage, ToolView},
    selection::{FileSelection, SelectedFile},
    transport::AnalysisApi,
    viewer::ImageViewer,
};

/// A request that has entered `Loading` and still has to be sent.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub ticket: RequestTicket,
    pub files: Vec<SelectedFile>,
}

pub struct UploadController<A> {
    api: A,
    selection: FileSelection,
    lifecycle: RequestLifecycle,
    viewer: ImageViewer,
}

impl<A: AnalysisApi> UploadController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            selection: FileSelection::default(),
            lifecycle: RequestLifecycle::new(),
            viewer: ImageViewer::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    pub fn status(&self) -> &RequestStatus {
        self.lifecycle.status()
    }

    pub fn is_loading(&self) -> bool {
        self.lifecycle.is_loading()
    }

    pub fn in_flight(&self) -> Option<RequestTicket> {
        self.lifecycle.in_flight()
    }

    /// Replaces the selection wholesale and clears any displayed error.
    pub fn select_files(&mut self, files: Vec<SelectedFile>) {
        info!(files = files.len(), "file selection replaced");
        self.selection.replace(files);
        self.lifecycle.clear_error();
    }

    /// Synchronous half of a submission for callers that send the request
    /// themselves. The returned ticket must be passed back to [`Self::complete`].
    pub fn begin_submit(&mut self) -> Option<PendingUpload> {
        let ticket = self.lifecycle.begin(&self.selection).ok()?;
        Some(PendingUpload {
            ticket,
            files: self.selection.files().to_vec(),
        })
    }

    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> bool {
        self.lifecycle.complete(ticket, outcome)
    }

    /// Validates, sends the selection and records the outcome.
    ///
    /// Loading is released on every exit path, including when this future is
    /// dropped or the API panics mid-request.
    pub async fn submit(&mut self) -> &RequestStatus {
        let Ok(ticket) = self.lifecycle.begin(&self.selection) else {
            return self.lifecycle.status();
        };

        let guard = InFlightGuard {
            lifecycle: &mut self.lifecycle,
            ticket,
            resolved: false,
        };
        let outcome = self.api.analyze(self.selection.files()).await;
        guard.resolve(outcome);

        self.lifecycle.status()
    }

    /// Enlarges the thumbnail at `index` of the current result.
    pub fn open_image(&mut self, index: usize) -> bool {
        let Some(url) = self.thumbnail_url(index) else {
            return false;
        };
        self.viewer.open(url);
        true
    }

    pub fn close_viewer(&mut self) {
        self.viewer.close();
    }

    pub fn viewer(&self) -> &ImageViewer {
        &self.viewer
    }

    pub fn view(&self) -> ToolView {
        render::render(self.lifecycle.status(), self.api.config())
    }

    pub fn enlarged_image(&self) -> Option<EnlargedImage> {
        render::render_viewer(&self.viewer)
    }

    fn thumbnail_url(&self, index: usize) -> Option<Url> {
        let result = self.lifecycle.status().result()?;
        render::render_gallery(&result.processed_images, self.api.config())
            .thumbnails()
            .get(index)
            .map(|thumbnail| thumbnail.url.clone())
    }
}

struct InFlightGuard<'a> {
    lifecycle: &'a mut RequestLifecycle,
    ticket: RequestTicket,
    resolved: bool,
}

impl InFlightGuard<'_> {
    fn resolve(mut self, outcome: Result<AnalysisResult, AnalysisError>) {
        self.lifecycle.complete(self.ticket, outcome);
        self.resolved = true;
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            warn!(ticket = self.ticket.0, "request abandoned before a response arrived");
            self.lifecycle
                .complete(self.ticket, Err(AnalysisError::Interrupted));
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
