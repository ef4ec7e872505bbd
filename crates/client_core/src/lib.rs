//! Client side of the TumorDetect analysis tool: configuration, the HTTP
//! client for the analysis service, and the upload/analyze/display state.

pub mod config;
pub mod controller;
pub mod lifecycle;
pub mod render;
pub mod selection;
pub mod transport;
pub mod viewer;

pub use config::{load_settings, ApiConfig, ConfigError, Settings};
pub use controller::{PendingUpload, UploadController};
pub use lifecycle::{RequestLifecycle, RequestStatus, SubmitRejected};
pub use selection::{FileSelection, SelectedFile};
pub use transport::{AnalysisApi, HttpAnalysisClient};
pub use viewer::ImageViewer;
