//! UI layer for the desktop GUI: app shell, pages, and image thumbnails.

pub mod app;
pub mod thumbnails;

pub use app::PostboardApp;
