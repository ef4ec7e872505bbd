//! Framework-neutral view model of the tool page.
//!
//! The desktop app paints exactly what [`render`] returns, so everything the
//! user can see for a given [`RequestStatus`] is decided (and tested) here.

use shared::{domain::RiskSeverity, error::ErrorKind, protocol::AnalysisResult};
use url::Url;

use crate::{config::ApiConfig, lifecycle::RequestStatus, viewer::ImageViewer};

pub const SUBMIT_LABEL: &str = "Upload and Analyze";
pub const PROCESSING_LABEL: &str = "Processing...";
pub const LOADING_MESSAGE: &str = "Processing your files...";
pub const NO_IMAGES_NOTICE: &str = "No processed images available.";
pub const WARNING_INDICATOR: &str = "\u{26a0}";

#[derive(Debug, Clone, PartialEq)]
pub struct ToolView {
    pub submit: SubmitButton,
    pub loading_message: Option<&'static str>,
    pub body: ToolBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: &'static str,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolBody {
    Empty,
    Error(ErrorBanner),
    Results(ResultsPanel),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub indicator: &'static str,
    pub message: String,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPanel {
    pub tumor_type: String,
    pub risk_level: String,
    pub severity: RiskSeverity,
    pub probability: String,
    pub gallery: Gallery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gallery {
    Thumbnails(Vec<Thumbnail>),
    Empty { notice: &'static str },
}

impl Gallery {
    pub fn thumbnails(&self) -> &[Thumbnail] {
        match self {
            Self::Thumbnails(thumbnails) => thumbnails,
            Self::Empty { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub index: usize,
    pub url: Url,
    pub alt: String,
}

/// Props of the enlarged-image overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnlargedImage {
    pub url: Url,
}

pub fn render(status: &RequestStatus, config: &ApiConfig) -> ToolView {
    let loading = status.is_loading();
    let submit = SubmitButton {
        label: if loading { PROCESSING_LABEL } else { SUBMIT_LABEL },
        enabled: !loading,
    };
    let body = match status {
        RequestStatus::Idle | RequestStatus::Loading => ToolBody::Empty,
        RequestStatus::Failed(err) => ToolBody::Error(ErrorBanner {
            indicator: WARNING_INDICATOR,
            message: err.user_message(),
            kind: err.kind(),
        }),
        RequestStatus::Succeeded(result) => ToolBody::Results(render_results(result, config)),
    };

    ToolView {
        submit,
        loading_message: loading.then_some(LOADING_MESSAGE),
        body,
    }
}

pub fn render_results(result: &AnalysisResult, config: &ApiConfig) -> ResultsPanel {
    ResultsPanel {
        tumor_type: result.tumor_type.clone(),
        risk_level: result.risk_label().to_string(),
        severity: result.severity(),
        probability: result.probability_label(),
        gallery: render_gallery(&result.processed_images, config),
    }
}

/// Entries that do not resolve to a URL are left out; if none remain the
/// gallery shows the "no images" notice.
pub fn render_gallery(processed_images: &[String], config: &ApiConfig) -> Gallery {
    let thumbnails: Vec<Thumbnail> = processed_images
        .iter()
        .filter_map(|path| config.processed_image_url(path))
        .enumerate()
        .map(|(index, url)| Thumbnail {
            index,
            url,
            alt: format!("Processed Image {}", index + 1),
        })
        .collect();

    if thumbnails.is_empty() {
        Gallery::Empty {
            notice: NO_IMAGES_NOTICE,
        }
    } else {
        Gallery::Thumbnails(thumbnails)
    }
}

pub fn render_viewer(viewer: &ImageViewer) -> Option<EnlargedImage> {
    viewer
        .selected()
        .map(|url| EnlargedImage { url: url.clone() })
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
