//! Tool page: file picker, submission, progress, error banner, results and the
//! processed image viewer.

use std::{collections::HashMap, path::PathBuf, sync::Arc, time::Duration};

use client_core::{
    render::{Gallery, ResultsPanel, Thumbnail, ToolBody, ToolView},
    AnalysisApi, HttpAnalysisClient, UploadController,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{domain::RiskSeverity, error::AnalysisError};
use url::Url;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{UiError, UiErrorContext, UiEvent},
        orchestration::dispatch_backend_command,
    },
    media::{self, PreviewImage},
    ui::{
        image_viewer::{show_image_viewer, ImageViewerProps, ViewerImage},
        theme,
    },
};

pub const PAGE_TITLE: &str = "Tumor Awareness";
pub const PAGE_INTRO: &str = "Upload your MRI or CT scan reports for analysis.";
const REPORT_EXTENSIONS: &[&str] = &["pdf", "dcm"];

pub enum ProcessedImageState {
    Loading,
    Ready(egui::TextureHandle),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceHealth {
    Checking,
    Reachable(String),
    Unreachable(String),
}

pub fn server_environment_label(server_url: &str) -> &'static str {
    let server = server_url.to_ascii_lowercase();
    if server.contains("127.0.0.1") || server.contains("localhost") {
        "Local"
    } else if server.contains("staging") {
        "Staging"
    } else {
        "Production"
    }
}

pub struct ToolsApp {
    controller: UploadController<Arc<HttpAnalysisClient>>,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    images: HashMap<Url, ProcessedImageState>,
    selection_loading: bool,
    status: String,
    status_banner: Option<UiError>,
    service_health: ServiceHealth,
}

impl ToolsApp {
    pub fn new(
        controller: UploadController<Arc<HttpAnalysisClient>>,
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
    ) -> Self {
        let mut app = Self {
            controller,
            cmd_tx,
            ui_rx,
            images: HashMap::new(),
            selection_loading: false,
            status: String::new(),
            status_banner: None,
            service_health: ServiceHealth::Checking,
        };
        dispatch_backend_command(&app.cmd_tx, BackendCommand::CheckHealth, &mut app.status);
        app
    }

    pub fn queue_selection(&mut self, paths: Vec<PathBuf>) {
        if paths.is_empty() {
            return;
        }
        self.selection_loading = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::LoadSelection { paths },
            &mut self.status,
        );
    }

    pub fn submit(&mut self) {
        let Some(pending) = self.controller.begin_submit() else {
            return;
        };
        let ticket = pending.ticket;
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Analyze {
                ticket,
                files: pending.files,
            },
            &mut self.status,
        );
        if !queued {
            let reason = AnalysisError::transport(self.status.clone());
            self.controller.complete(ticket, Err(reason));
        }
    }

    pub fn open_image(&mut self, index: usize) -> bool {
        self.controller.open_image(index)
    }

    pub fn close_viewer(&mut self) {
        self.controller.close_viewer();
    }

    pub fn process_ui_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(ctx, event);
        }
    }

    fn apply_event(&mut self, ctx: &egui::Context, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::Error(err) => {
                tracing::warn!(context = ?err.context(), "{}", err.message());
                self.status = err.message().to_string();
                self.status_banner = Some(err);
            }
            UiEvent::FilesSelected(files) => {
                self.selection_loading = false;
                self.status = format!("{} file(s) selected", files.len());
                self.controller.select_files(files);
            }
            UiEvent::SelectionFailed(reason) => {
                self.selection_loading = false;
                self.status_banner = Some(UiError::from_message(
                    UiErrorContext::FileSelection,
                    format!("Could not read the selected files: {reason}"),
                ));
            }
            UiEvent::AnalysisCompleted { ticket, outcome } => {
                if !self.controller.complete(ticket, outcome) {
                    return;
                }
                let enlarged = self.controller.viewer().selected().cloned();
                self.images.retain(|url, _| enlarged.as_ref() == Some(url));
                self.status = format!("Analysis {}", self.controller.status().name());
                self.queue_image_fetches();
            }
            UiEvent::ImageLoaded { url, image } => {
                let Some(state) = self.images.get_mut(&url) else {
                    return;
                };
                *state = ProcessedImageState::Ready(load_texture(ctx, &url, &image));
            }
            UiEvent::ImageFailed { url, reason } => {
                tracing::warn!(%url, "processed image unavailable: {reason}");
                if let Some(state) = self.images.get_mut(&url) {
                    *state = ProcessedImageState::Failed(reason);
                }
            }
            UiEvent::ServiceHealth(outcome) => {
                self.service_health = match outcome {
                    Ok(status) => ServiceHealth::Reachable(status),
                    Err(err) => {
                        let err = UiError::from_analysis(UiErrorContext::HealthCheck, &err);
                        ServiceHealth::Unreachable(err.message().to_string())
                    }
                };
            }
        }
    }

    fn queue_image_fetches(&mut self) {
        let ToolBody::Results(panel) = self.controller.view().body else {
            return;
        };
        for thumbnail in panel.gallery.thumbnails() {
            self.images.insert(thumbnail.url.clone(), ProcessedImageState::Loading);
            let queued = dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::FetchImage {
                    url: thumbnail.url.clone(),
                },
                &mut self.status,
            );
            if !queued {
                self.images.insert(
                    thumbnail.url.clone(),
                    ProcessedImageState::Failed(self.status.clone()),
                );
            }
        }
    }

    fn pick_files(&mut self) {
        let scans: Vec<&str> = media::SCAN_EXTENSIONS
            .iter()
            .chain(REPORT_EXTENSIONS)
            .copied()
            .collect();
        if let Some(paths) = rfd::FileDialog::new()
            .add_filter("Scans and reports", &scans)
            .pick_files()
        {
            self.queue_selection(paths);
        }
    }

    fn show_tool_page(&mut self, ctx: &egui::Context) {
        let view = self.controller.view();

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_max_width(theme::PAGE_MAX_WIDTH);
                ui.heading(PAGE_TITLE);
                ui.label(PAGE_INTRO);
                ui.add_space(6.0);
                self.show_endpoint(ui);
                self.show_status_banner(ui);
                ui.separator();

                self.show_selection(ui, &view);
                ui.add_space(8.0);

                if let Some(message) = view.loading_message {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(message);
                    });
                }

                match &view.body {
                    ToolBody::Empty => {}
                    ToolBody::Error(banner) => {
                        let (fill, stroke) = theme::error_banner_colors();
                        egui::Frame::NONE
                            .fill(fill)
                            .stroke(stroke)
                            .corner_radius(8.0)
                            .inner_margin(egui::Margin::symmetric(10, 8))
                            .show(ui, |ui| {
                                ui.label(
                                    egui::RichText::new(format!(
                                        "{} {}",
                                        banner.indicator, banner.message
                                    ))
                                    .color(egui::Color32::WHITE),
                                );
                            });
                    }
                    ToolBody::Results(panel) => self.show_results(ui, panel),
                }

                if !self.status.is_empty() {
                    ui.add_space(8.0);
                    ui.weak(&self.status);
                }
            });
        });
    }

    fn show_endpoint(&self, ui: &mut egui::Ui) {
        let api_base = self.controller.api().config().api_base();
        ui.horizontal_wrapped(|ui| {
            ui.weak(format!(
                "Analysis service: {api_base} ({})",
                server_environment_label(api_base)
            ));
            match &self.service_health {
                ServiceHealth::Checking => {
                    ui.weak("checking...");
                }
                ServiceHealth::Reachable(status) => {
                    ui.colored_label(theme::severity_color(RiskSeverity::Low), status);
                }
                ServiceHealth::Unreachable(reason) => {
                    ui.weak(format!("unreachable: {reason}"));
                }
            }
        });
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        let Some(banner) = self.status_banner.clone() else {
            return;
        };
        let (fill, stroke) = theme::error_banner_colors();
        egui::Frame::NONE
            .fill(fill)
            .stroke(stroke)
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{}: {}",
                            banner.category().label(),
                            banner.message()
                        ))
                        .color(egui::Color32::WHITE),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.status_banner = None;
                        }
                    });
                });
            });
    }

    fn show_selection(&mut self, ui: &mut egui::Ui, view: &ToolView) {
        ui.horizontal(|ui| {
            let picker_enabled = !self.selection_loading;
            if ui
                .add_enabled(picker_enabled, egui::Button::new("Choose files..."))
                .clicked()
            {
                self.pick_files();
            }
            if self.selection_loading {
                ui.spinner();
            }

            let selection = self.controller.selection();
            if selection.is_empty() {
                ui.weak("No files selected");
            } else {
                ui.label(format!(
                    "{} file(s), {}",
                    selection.len(),
                    media::human_readable_bytes(selection.total_bytes())
                ));
            }
        });

        for file in self.controller.selection().files() {
            ui.weak(format!(
                "{} ({})",
                file.name,
                media::human_readable_bytes(file.size_bytes())
            ));
        }

        ui.add_space(6.0);
        if ui
            .add_enabled(view.submit.enabled, egui::Button::new(view.submit.label))
            .clicked()
        {
            self.submit();
        }
    }

    fn show_results(&mut self, ui: &mut egui::Ui, panel: &ResultsPanel) {
        let mut clicked = None;
        egui::Frame::NONE
            .fill(theme::card_fill(ui.visuals().panel_fill))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(12, 10))
            .show(ui, |ui| {
                ui.heading("Analysis Results");
                egui::Grid::new("analysis-results")
                    .num_columns(2)
                    .spacing([16.0, 6.0])
                    .show(ui, |ui| {
                        ui.strong("Tumor Type:");
                        ui.label(&panel.tumor_type);
                        ui.end_row();

                        ui.strong("Risk Level:");
                        ui.colored_label(theme::severity_color(panel.severity), &panel.risk_level);
                        ui.end_row();

                        ui.strong("Probability:");
                        ui.label(&panel.probability);
                        ui.end_row();
                    });

                ui.add_space(8.0);
                ui.strong("Processed Images");
                match &panel.gallery {
                    Gallery::Empty { notice } => {
                        ui.weak(*notice);
                    }
                    Gallery::Thumbnails(thumbnails) => {
                        ui.horizontal_wrapped(|ui| {
                            for thumbnail in thumbnails {
                                let state = self.images.get(&thumbnail.url);
                                let response = show_thumbnail(ui, thumbnail, state);
                                if response.on_hover_text(&thumbnail.alt).clicked() {
                                    clicked = Some(thumbnail.index);
                                }
                            }
                        });
                    }
                }
            });

        if let Some(index) = clicked {
            self.open_image(index);
        }
    }

    fn show_viewer(&mut self, ctx: &egui::Context) {
        let Some(enlarged) = self.controller.enlarged_image() else {
            return;
        };
        let image = match self.images.get(&enlarged.url) {
            Some(ProcessedImageState::Ready(texture)) => ViewerImage::Ready(texture),
            Some(ProcessedImageState::Failed(reason)) => ViewerImage::Failed(reason),
            Some(ProcessedImageState::Loading) | None => ViewerImage::Loading,
        };
        let closed = show_image_viewer(
            ctx,
            ImageViewerProps {
                url: &enlarged.url,
                image,
            },
        );
        if closed {
            self.close_viewer();
        }
    }
}

impl eframe::App for ToolsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events(ctx);
        self.show_tool_page(ctx);
        self.show_viewer(ctx);

        // Backend results arrive over a channel, so keep polling while work is outstanding.
        let waiting = self.controller.is_loading()
            || self.selection_loading
            || self
                .images
                .values()
                .any(|state| matches!(state, ProcessedImageState::Loading))
            || self.service_health == ServiceHealth::Checking;
        if waiting {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

fn show_thumbnail(
    ui: &mut egui::Ui,
    thumbnail: &Thumbnail,
    state: Option<&ProcessedImageState>,
) -> egui::Response {
    let placeholder = |suffix: &str| {
        egui::Button::new(format!("{} ({suffix})", thumbnail.alt)).min_size(egui::vec2(
            theme::THUMBNAIL_WIDTH,
            theme::THUMBNAIL_WIDTH * 0.75,
        ))
    };
    match state {
        Some(ProcessedImageState::Ready(texture)) => ui.add(
            egui::Image::new(texture)
                .max_width(theme::THUMBNAIL_WIDTH)
                .sense(egui::Sense::click()),
        ),
        Some(ProcessedImageState::Failed(_)) => ui.add(placeholder("unavailable")),
        Some(ProcessedImageState::Loading) | None => ui.add(placeholder("loading")),
    }
}

fn load_texture(ctx: &egui::Context, url: &Url, image: &PreviewImage) -> egui::TextureHandle {
    let color_image =
        egui::ColorImage::from_rgba_unmultiplied([image.width, image.height], &image.rgba);
    ctx.load_texture(
        format!("processed-image:{url}"),
        color_image,
        egui::TextureOptions::LINEAR,
    )
}

#[cfg(test)]
#[path = "../tests/app_tests.rs"]
mod tests;
