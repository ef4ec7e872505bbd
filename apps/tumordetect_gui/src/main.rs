use std::sync::Arc;

mod backend_bridge;
mod controller;
mod media;
mod ui;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use client_core::{load_settings, ApiConfig, HttpAnalysisClient, UploadController};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::{
    backend_bridge::commands::BackendCommand, controller::events::UiEvent, ui::ToolsApp,
};

#[derive(Parser, Debug)]
#[command(name = "tumordetect", about = "Upload MRI/CT scans for tumor analysis")]
struct Args {
    /// Base URL of the analysis service; overrides config file and environment.
    #[arg(long)]
    api_base: Option<String>,
    /// Give up on an analysis request after this many seconds.
    #[arg(long)]
    request_timeout_secs: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(api_base) = args.api_base {
        settings.api_base = api_base;
    }
    if let Some(secs) = args.request_timeout_secs {
        settings.request_timeout_secs = Some(secs);
    }
    let config = ApiConfig::from_settings(&settings)
        .with_context(|| format!("invalid analysis service url '{}'", settings.api_base))?;
    tracing::info!(
        api_base = config.api_base(),
        timeout = ?config.request_timeout().map(|timeout| timeout.as_secs()),
        "starting tumordetect"
    );
    let api = Arc::new(HttpAnalysisClient::new(config)?);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(Arc::clone(&api), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("TumorDetect")
            .with_inner_size([960.0, 760.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "TumorDetect",
        options,
        Box::new(|_cc| {
            Ok(Box::new(ToolsApp::new(
                UploadController::new(api),
                cmd_tx,
                ui_rx,
            )))
        }),
    )
    .map_err(|err| anyhow!("failed to run desktop app: {err}"))
}
