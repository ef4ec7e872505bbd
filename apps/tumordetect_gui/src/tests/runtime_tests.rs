use super::*;

use std::{path::PathBuf, time::Duration};

use async_trait::async_trait;
use client_core::ApiConfig;
use crossbeam_channel::bounded;
use shared::{domain::RequestTicket, protocol::AnalysisResult};
use url::Url;

struct FakeApi {
    config: ApiConfig,
    panic_on_analyze: bool,
    image: Result<Vec<u8>, AnalysisError>,
}

impl FakeApi {
    fn new() -> Self {
        Self {
            config: ApiConfig::new("http://localhost:5000").expect("config"),
            panic_on_analyze: false,
            image: Ok(png_bytes()),
        }
    }
}

#[async_trait]
impl AnalysisApi for FakeApi {
    fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn analyze(&self, files: &[SelectedFile]) -> Result<AnalysisResult, AnalysisError> {
        if self.panic_on_analyze {
            panic!("client exploded");
        }
        Ok(AnalysisResult {
            tumor_type: format!("{} scans", files.len()),
            risk_level: Some("Low".to_string()),
            probability: 12.0,
            processed_images: Vec::new(),
        })
    }

    async fn fetch_image(&self, _url: &Url) -> Result<Vec<u8>, AnalysisError> {
        self.image.clone()
    }

    async fn health(&self) -> Result<String, AnalysisError> {
        Ok("healthy".to_string())
    }
}

fn png_bytes() -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

fn image_url() -> Url {
    Url::parse("http://localhost:5000/processed_images/a.png").expect("url")
}

async fn run(api: FakeApi, cmd: BackendCommand) -> UiEvent {
    let (ui_tx, ui_rx) = bounded(4);
    handle_command(Arc::new(api), cmd, ui_tx).await;
    ui_rx.try_recv().expect("event emitted")
}

fn scratch_file(name: &str, contents: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tumordetect-runtime-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("scratch dir");
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("scratch file");
    path
}

#[tokio::test]
async fn analyze_reports_completion_with_ticket() {
    let files = vec![SelectedFile::from_bytes("a.png", b"a".to_vec())];
    let event = run(
        FakeApi::new(),
        BackendCommand::Analyze {
            ticket: RequestTicket(7),
            files,
        },
    )
    .await;

    let UiEvent::AnalysisCompleted { ticket, outcome } = event else {
        panic!("expected analysis completion");
    };
    assert_eq!(ticket, RequestTicket(7));
    assert_eq!(outcome.expect("result").tumor_type, "1 scans");
}

#[tokio::test]
async fn panicking_client_still_completes_as_interrupted() {
    let api = FakeApi {
        panic_on_analyze: true,
        ..FakeApi::new()
    };
    let event = run(
        api,
        BackendCommand::Analyze {
            ticket: RequestTicket(3),
            files: vec![SelectedFile::from_bytes("a.png", b"a".to_vec())],
        },
    )
    .await;

    let UiEvent::AnalysisCompleted { ticket, outcome } = event else {
        panic!("expected analysis completion");
    };
    assert_eq!(ticket, RequestTicket(3));
    assert_eq!(outcome, Err(AnalysisError::Interrupted));
}

#[tokio::test]
async fn fetched_images_are_decoded_for_display() {
    let event = run(FakeApi::new(), BackendCommand::FetchImage { url: image_url() }).await;
    let UiEvent::ImageLoaded { url, image } = event else {
        panic!("expected decoded image");
    };
    assert_eq!(url, image_url());
    assert_eq!((image.width, image.height), (2, 2));
}

#[tokio::test]
async fn image_fetch_and_decode_failures_are_reported_per_url() {
    let api = FakeApi {
        image: Err(AnalysisError::server(404, "not found")),
        ..FakeApi::new()
    };
    let event = run(api, BackendCommand::FetchImage { url: image_url() }).await;
    assert!(matches!(event, UiEvent::ImageFailed { ref reason, .. } if reason == "not found"));

    let api = FakeApi {
        image: Ok(b"not an image".to_vec()),
        ..FakeApi::new()
    };
    let event = run(api, BackendCommand::FetchImage { url: image_url() }).await;
    assert!(matches!(event, UiEvent::ImageFailed { url, .. } if url == image_url()));
}

#[tokio::test]
async fn selection_is_read_from_disk() {
    let first = scratch_file("mri_1.png", b"first scan");
    let second = scratch_file("report.pdf", b"%PDF");

    let event = run(
        FakeApi::new(),
        BackendCommand::LoadSelection {
            paths: vec![first, second],
        },
    )
    .await;

    let UiEvent::FilesSelected(files) = event else {
        panic!("expected selected files");
    };
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "mri_1.png");
    assert_eq!(files[0].mime_type, "image/png");
    assert_eq!(files[0].bytes, b"first scan");
    assert_eq!(files[1].mime_type, "application/pdf");
}

#[tokio::test]
async fn unreadable_selection_reports_failure() {
    let missing = std::env::temp_dir().join("tumordetect-runtime-missing/none.png");
    let event = run(
        FakeApi::new(),
        BackendCommand::LoadSelection {
            paths: vec![missing],
        },
    )
    .await;
    assert!(matches!(event, UiEvent::SelectionFailed(_)));
}

#[tokio::test]
async fn health_probe_reports_service_status() {
    let event = run(FakeApi::new(), BackendCommand::CheckHealth).await;
    assert!(matches!(event, UiEvent::ServiceHealth(Ok(ref status)) if status == "healthy"));
}

#[test]
fn launched_worker_answers_commands() {
    let (cmd_tx, cmd_rx) = bounded(4);
    let (ui_tx, ui_rx) = bounded(8);
    launch(Arc::new(FakeApi::new()), cmd_rx, ui_tx);

    cmd_tx.send(BackendCommand::CheckHealth).expect("queue");
    let mut saw_health = false;
    for _ in 0..2 {
        match ui_rx.recv_timeout(Duration::from_secs(5)).expect("event") {
            UiEvent::ServiceHealth(status) => {
                assert_eq!(status.as_deref(), Ok("healthy"));
                saw_health = true;
            }
            UiEvent::Info(_) => {}
            _ => panic!("unexpected event"),
        }
        if saw_health {
            break;
        }
    }
    assert!(saw_health);
}
