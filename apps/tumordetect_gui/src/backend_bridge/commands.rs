//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use client_core::SelectedFile;
use shared::domain::RequestTicket;
use url::Url;

pub enum BackendCommand {
    LoadSelection {
        paths: Vec<PathBuf>,
    },
    Analyze {
        ticket: RequestTicket,
        files: Vec<SelectedFile>,
    },
    FetchImage {
        url: Url,
    },
    CheckHealth,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoadSelection { .. } => "load_selection",
            Self::Analyze { .. } => "analyze",
            Self::FetchImage { .. } => "fetch_image",
            Self::CheckHealth => "check_health",
        }
    }
}
