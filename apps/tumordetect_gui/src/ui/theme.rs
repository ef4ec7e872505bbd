use eframe::egui::{Color32, Stroke};
use shared::domain::RiskSeverity;

pub const PAGE_MAX_WIDTH: f32 = 760.0;
pub const THUMBNAIL_WIDTH: f32 = 160.0;

pub fn severity_color(severity: RiskSeverity) -> Color32 {
    match severity {
        RiskSeverity::Low => Color32::from_rgb(46, 160, 67),
        RiskSeverity::Moderate => Color32::from_rgb(219, 154, 4),
        RiskSeverity::High => Color32::from_rgb(207, 34, 46),
        RiskSeverity::Unknown => Color32::from_rgb(128, 128, 128),
    }
}

/// Fill and stroke of the error banner.
pub fn error_banner_colors() -> (Color32, Stroke) {
    (
        Color32::from_rgb(111, 53, 53),
        Stroke::new(1.0, Color32::from_rgb(175, 96, 96)),
    )
}

pub fn card_fill(panel_fill: Color32) -> Color32 {
    lighten_color(panel_fill, 0.04)
}

pub fn lighten_color(c: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |channel: u8| -> u8 {
        let channel = channel as f32;
        (channel + (255.0 - channel) * t).round().clamp(0.0, 255.0) as u8
    };
    Color32::from_rgba_unmultiplied(mix(c.r()), mix(c.g()), mix(c.b()), c.a())
}
