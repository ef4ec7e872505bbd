use super::*;

use client_core::{ApiConfig, RequestStatus, SelectedFile};
use crossbeam_channel::{bounded, Receiver};
use shared::{domain::RequestTicket, protocol::AnalysisResult};

struct Harness {
    app: ToolsApp,
    ctx: egui::Context,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
}

impl Harness {
    fn new() -> Self {
        let config = ApiConfig::new("http://localhost:5000").expect("config");
        let api = Arc::new(HttpAnalysisClient::new(config).expect("client"));
        let (cmd_tx, cmd_rx) = bounded(16);
        let (ui_tx, ui_rx) = bounded(16);
        let app = ToolsApp::new(UploadController::new(api), cmd_tx, ui_rx);
        let harness = Self {
            app,
            ctx: egui::Context::default(),
            cmd_rx,
            ui_tx,
        };
        assert_eq!(harness.drain_commands(), vec!["check_health"]);
        harness
    }

    fn deliver(&mut self, event: UiEvent) {
        self.ui_tx.send(event).expect("deliver");
        self.app.process_ui_events(&self.ctx);
    }

    fn drain_commands(&self) -> Vec<&'static str> {
        self.cmd_rx.try_iter().map(|cmd| cmd.name()).collect()
    }

    fn select_scans(&mut self) {
        self.deliver(UiEvent::FilesSelected(vec![
            SelectedFile::from_bytes("mri_1.png", b"one".to_vec()),
            SelectedFile::from_bytes("mri_2.png", b"two".to_vec()),
        ]));
    }

    fn submit_and_take_ticket(&mut self) -> RequestTicket {
        self.app.submit();
        match self.cmd_rx.try_recv().expect("analyze queued") {
            BackendCommand::Analyze { ticket, files } => {
                assert_eq!(files.len(), 2);
                ticket
            }
            other => panic!("unexpected command {}", other.name()),
        }
    }
}

fn glioma() -> AnalysisResult {
    AnalysisResult {
        tumor_type: "Glioma".to_string(),
        risk_level: Some("High".to_string()),
        probability: 87.5,
        processed_images: vec!["out/a.png".to_string(), "out\\b.png".to_string()],
    }
}

fn image_url(name: &str) -> Url {
    Url::parse(&format!("http://localhost:5000/processed_images/{name}")).expect("url")
}

fn preview() -> PreviewImage {
    PreviewImage {
        width: 1,
        height: 1,
        rgba: vec![255, 0, 0, 255],
    }
}

#[test]
fn submitting_without_files_fails_locally() {
    let mut harness = Harness::new();
    harness.app.submit();

    assert_eq!(
        harness.app.controller.status(),
        &RequestStatus::Failed(AnalysisError::NoFilesSelected)
    );
    assert!(harness.drain_commands().is_empty());
}

#[test]
fn picking_paths_queues_a_backend_read() {
    let mut harness = Harness::new();
    harness.app.queue_selection(Vec::new());
    assert!(harness.drain_commands().is_empty());

    harness
        .app
        .queue_selection(vec![PathBuf::from("/scans/mri_1.png")]);
    assert_eq!(harness.drain_commands(), vec!["load_selection"]);
}

#[test]
fn submit_enters_loading_and_queues_analysis() {
    let mut harness = Harness::new();
    harness.select_scans();

    let ticket = harness.submit_and_take_ticket();
    assert!(harness.app.controller.is_loading());
    assert_eq!(harness.app.controller.in_flight(), Some(ticket));

    harness.app.submit();
    assert!(harness.drain_commands().is_empty());
}

#[test]
fn accepted_result_fetches_each_processed_image() {
    let mut harness = Harness::new();
    harness.select_scans();
    let ticket = harness.submit_and_take_ticket();

    harness.deliver(UiEvent::AnalysisCompleted {
        ticket,
        outcome: Ok(glioma()),
    });

    assert_eq!(
        harness.app.controller.status(),
        &RequestStatus::Succeeded(glioma())
    );
    assert_eq!(harness.drain_commands(), vec!["fetch_image", "fetch_image"]);
    assert!(matches!(
        harness.app.images.get(&image_url("a.png")),
        Some(ProcessedImageState::Loading)
    ));

    harness.deliver(UiEvent::ImageLoaded {
        url: image_url("a.png"),
        image: preview(),
    });
    harness.deliver(UiEvent::ImageFailed {
        url: image_url("b.png"),
        reason: "not found".to_string(),
    });
    harness.deliver(UiEvent::ImageLoaded {
        url: image_url("other.png"),
        image: preview(),
    });

    assert!(matches!(
        harness.app.images.get(&image_url("a.png")),
        Some(ProcessedImageState::Ready(_))
    ));
    assert!(matches!(
        harness.app.images.get(&image_url("b.png")),
        Some(ProcessedImageState::Failed(reason)) if reason == "not found"
    ));
    assert!(harness.app.images.get(&image_url("other.png")).is_none());
}

#[test]
fn stale_completion_is_ignored() {
    let mut harness = Harness::new();
    harness.select_scans();
    let first = harness.submit_and_take_ticket();
    harness.deliver(UiEvent::AnalysisCompleted {
        ticket: first,
        outcome: Err(AnalysisError::transport("connection reset")),
    });
    let second = harness.submit_and_take_ticket();

    harness.deliver(UiEvent::AnalysisCompleted {
        ticket: first,
        outcome: Ok(glioma()),
    });
    assert!(harness.app.controller.is_loading());
    assert!(harness.drain_commands().is_empty());

    harness.deliver(UiEvent::AnalysisCompleted {
        ticket: second,
        outcome: Err(AnalysisError::server(400, "bad file")),
    });
    assert_eq!(
        harness.app.controller.status().error_message().as_deref(),
        Some("bad file")
    );
}

#[test]
fn unreachable_backend_fails_the_request_instead_of_hanging() {
    let config = ApiConfig::new("http://localhost:5000").expect("config");
    let api = Arc::new(HttpAnalysisClient::new(config).expect("client"));
    let (cmd_tx, cmd_rx) = bounded(16);
    let (_ui_tx, ui_rx) = bounded(16);
    drop(cmd_rx);
    let mut app = ToolsApp::new(UploadController::new(api), cmd_tx, ui_rx);
    let ctx = egui::Context::default();
    app.process_ui_events(&ctx);

    app.controller.select_files(vec![SelectedFile::from_bytes("a.png", b"a".to_vec())]);
    app.submit();

    assert!(!app.controller.is_loading());
    assert_eq!(
        app.controller.status().error().map(AnalysisError::kind),
        Some(shared::error::ErrorKind::Transport)
    );
}

#[test]
fn viewer_opens_on_thumbnail_and_closes_without_touching_results() {
    let mut harness = Harness::new();
    harness.select_scans();
    let ticket = harness.submit_and_take_ticket();
    harness.deliver(UiEvent::AnalysisCompleted {
        ticket,
        outcome: Ok(glioma()),
    });

    assert!(harness.app.open_image(1));
    assert_eq!(
        harness.app.controller.viewer().selected(),
        Some(&image_url("b.png"))
    );
    harness.app.close_viewer();
    assert!(!harness.app.controller.viewer().is_open());
    assert_eq!(
        harness.app.controller.status(),
        &RequestStatus::Succeeded(glioma())
    );
}

#[test]
fn selection_failure_shows_dismissible_banner() {
    let mut harness = Harness::new();
    harness.deliver(UiEvent::SelectionFailed(
        "failed to read '/scans/a.png'".to_string(),
    ));
    let banner = harness.app.status_banner.as_ref().expect("banner");
    assert_eq!(banner.context(), UiErrorContext::FileSelection);
    assert_eq!(harness.app.controller.status(), &RequestStatus::Idle);
}

#[test]
fn health_probe_result_is_recorded() {
    let mut harness = Harness::new();
    assert_eq!(&harness.app.service_health, &ServiceHealth::Checking);

    harness.deliver(UiEvent::ServiceHealth(Ok("healthy".to_string())));
    assert_eq!(
        &harness.app.service_health,
        &ServiceHealth::Reachable("healthy".to_string())
    );

    harness.deliver(UiEvent::ServiceHealth(Err(AnalysisError::transport(
        "connection refused",
    ))));
    assert_eq!(
        &harness.app.service_health,
        &ServiceHealth::Unreachable("connection refused".to_string())
    );
}

#[test]
fn environment_label_follows_endpoint_host() {
    assert_eq!(server_environment_label("http://localhost:5000"), "Local");
    assert_eq!(server_environment_label("http://127.0.0.1:5000"), "Local");
    assert_eq!(
        server_environment_label("https://staging.tumordetect.example"),
        "Staging"
    );
    assert_eq!(
        server_environment_label("https://api.tumordetect.example"),
        "Production"
    );
}

const SCREEN: egui::Vec2 = egui::vec2(800.0, 600.0);

fn viewer_frame(harness: &mut Harness, time: f64, events: Vec<egui::Event>) {
    let input = egui::RawInput {
        screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, SCREEN)),
        time: Some(time),
        events,
        ..Default::default()
    };
    let ctx = harness.ctx.clone();
    let app = &mut harness.app;
    let _ = ctx.run(input, |ctx| app.show_viewer(ctx));
}

fn pointer_button(pos: egui::Pos2, pressed: bool) -> egui::Event {
    egui::Event::PointerButton {
        pos,
        button: egui::PointerButton::Primary,
        pressed,
        modifiers: egui::Modifiers::NONE,
    }
}

fn harness_with_open_viewer() -> Harness {
    let mut harness = Harness::new();
    harness.select_scans();
    let ticket = harness.submit_and_take_ticket();
    harness.deliver(UiEvent::AnalysisCompleted {
        ticket,
        outcome: Ok(glioma()),
    });
    harness.drain_commands();
    assert!(harness.app.open_image(0));

    viewer_frame(&mut harness, 0.0, Vec::new());
    viewer_frame(&mut harness, 0.1, Vec::new());
    assert!(harness.app.controller.viewer().is_open());
    harness
}

#[test]
fn clicking_outside_the_viewer_dismisses_it() {
    let mut harness = harness_with_open_viewer();
    let before = harness.app.controller.status().clone();
    let outside = egui::pos2(5.0, 5.0);

    viewer_frame(
        &mut harness,
        0.2,
        vec![egui::Event::PointerMoved(outside), pointer_button(outside, true)],
    );
    viewer_frame(&mut harness, 0.25, vec![pointer_button(outside, false)]);

    assert!(!harness.app.controller.viewer().is_open());
    assert_eq!(harness.app.controller.status(), &before);
}

#[test]
fn escape_dismisses_the_viewer() {
    let mut harness = harness_with_open_viewer();
    viewer_frame(
        &mut harness,
        0.2,
        vec![egui::Event::Key {
            key: egui::Key::Escape,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }],
    );

    assert!(!harness.app.controller.viewer().is_open());
    assert_eq!(
        harness.app.controller.status(),
        &RequestStatus::Succeeded(glioma())
    );
}

#[test]
fn new_result_leaves_the_viewer_open_with_its_image() {
    let mut harness = Harness::new();
    harness.select_scans();
    let ticket = harness.submit_and_take_ticket();
    harness.deliver(UiEvent::AnalysisCompleted {
        ticket,
        outcome: Ok(glioma()),
    });
    harness.deliver(UiEvent::ImageLoaded {
        url: image_url("a.png"),
        image: preview(),
    });
    assert!(harness.app.open_image(0));
    harness.drain_commands();

    let pending = harness.app.controller.begin_submit().expect("pending");
    let mut next = glioma();
    next.processed_images = vec!["c.png".to_string()];
    harness.deliver(UiEvent::AnalysisCompleted {
        ticket: pending.ticket,
        outcome: Ok(next),
    });

    assert_eq!(
        harness.app.controller.viewer().selected(),
        Some(&image_url("a.png"))
    );
    assert!(matches!(
        harness.app.images.get(&image_url("a.png")),
        Some(ProcessedImageState::Ready(_))
    ));
    assert!(harness.app.images.get(&image_url("b.png")).is_none());
    assert_eq!(harness.drain_commands(), vec!["fetch_image"]);
}
