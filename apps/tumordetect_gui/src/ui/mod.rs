//! UI layer: tool page shell, image viewer overlay, and theme colors.

pub mod app;
pub mod image_viewer;
pub mod theme;

pub use app::ToolsApp;
