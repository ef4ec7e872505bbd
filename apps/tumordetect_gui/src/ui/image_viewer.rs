//! Enlarged view of one processed image, drawn over the tool page.

use eframe::egui;
use url::Url;

pub const VIEWER_ID: &str = "processed-image-viewer";
const VIEWER_MAX_SIZE: egui::Vec2 = egui::vec2(900.0, 700.0);

pub enum ViewerImage<'a> {
    Loading,
    Ready(&'a egui::TextureHandle),
    Failed(&'a str),
}

pub struct ImageViewerProps<'a> {
    pub url: &'a Url,
    pub image: ViewerImage<'a>,
}

/// Draws the viewer over a dimmed backdrop and returns `true` once the user
/// dismissed it: a click outside the image, the close button, or Escape.
pub fn show_image_viewer(ctx: &egui::Context, props: ImageViewerProps<'_>) -> bool {
    let modal = egui::Modal::new(egui::Id::new(VIEWER_ID)).show(ctx, |ui| {
        match props.image {
            ViewerImage::Ready(texture) => {
                let max_size = ctx.content_rect().size().min(VIEWER_MAX_SIZE);
                let mut size = texture.size_vec2();
                let scale = (max_size.x / size.x).min(max_size.y / size.y).min(1.0);
                size *= scale;
                ui.add(egui::Image::new(texture).fit_to_exact_size(size));
            }
            ViewerImage::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading image...");
                });
            }
            ViewerImage::Failed(reason) => {
                ui.label(format!("Image could not be loaded: {reason}"));
            }
        }
        ui.small(props.url.as_str());
        ui.add_space(6.0);
        ui.button("Close").clicked()
    });

    modal.inner || modal.should_close()
}
