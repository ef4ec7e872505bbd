//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{AnalysisApi, SelectedFile};
use crossbeam_channel::{Receiver, Sender};
use shared::error::AnalysisError;
use tracing::{debug, error, info, warn};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{UiError, UiErrorContext, UiEvent},
    media,
};

/// Spawns the backend worker thread. Each command runs as its own task so a
/// slow analysis never holds up image fetches or selection reads.
pub fn launch<A>(api: Arc<A>, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>)
where
    A: AnalysisApi + 'static,
{
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                return;
            }
        };

        runtime.block_on(async move {
            info!(api_base = api.config().api_base(), "backend worker ready");
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                debug!(command = cmd.name(), "backend command received");
                tokio::spawn(handle_command(Arc::clone(&api), cmd, ui_tx.clone()));
            }
            info!("backend command queue closed; worker exiting");
        });
    });
}

pub async fn handle_command<A>(api: Arc<A>, cmd: BackendCommand, ui_tx: Sender<UiEvent>)
where
    A: AnalysisApi + 'static,
{
    let event = match cmd {
        BackendCommand::LoadSelection { paths } => {
            let mut files = Vec::with_capacity(paths.len());
            let mut failure = None;
            for path in &paths {
                match SelectedFile::read_from_path(path).await {
                    Ok(file) => files.push(file),
                    Err(err) => {
                        warn!(path = %path.display(), "failed to read selected file: {err:#}");
                        failure = Some(format!("{err:#}"));
                        break;
                    }
                }
            }
            match failure {
                Some(reason) => UiEvent::SelectionFailed(reason),
                None => UiEvent::FilesSelected(files),
            }
        }
        BackendCommand::Analyze { ticket, files } => {
            let outcome = run_analysis(api, files).await;
            UiEvent::AnalysisCompleted { ticket, outcome }
        }
        BackendCommand::FetchImage { url } => match api.fetch_image(&url).await {
            Ok(bytes) => match media::decode_preview_image(&bytes) {
                Ok(image) => UiEvent::ImageLoaded { url, image },
                Err(reason) => {
                    warn!(%url, "failed to decode processed image: {reason}");
                    UiEvent::ImageFailed { url, reason }
                }
            },
            Err(err) => UiEvent::ImageFailed {
                url,
                reason: err.user_message(),
            },
        },
        BackendCommand::CheckHealth => UiEvent::ServiceHealth(api.health().await),
    };

    // Completions must not be dropped, or the page would stay in Loading.
    if ui_tx.send(event).is_err() {
        debug!("ui event queue closed; dropping backend result");
    }
}

// The request runs in its own task so a panic inside the client surfaces as
// an interrupted request instead of a lost completion.
async fn run_analysis<A>(
    api: Arc<A>,
    files: Vec<SelectedFile>,
) -> Result<shared::protocol::AnalysisResult, AnalysisError>
where
    A: AnalysisApi + 'static,
{
    let request = tokio::spawn(async move { api.analyze(&files).await });
    match request.await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("analysis task ended abnormally: {err}");
            Err(AnalysisError::Interrupted)
        }
    }
}

#[cfg(test)]
#[path = "../tests/runtime_tests.rs"]
mod tests;
