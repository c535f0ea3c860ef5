//! UI screens.

mod app;
mod backend;
mod gallery_screen;

pub use app::App;
pub use backend::{Action, Backend, BackendCommand};
pub use gallery_screen::{GalleryKeyResult, GalleryScreen, GalleryScreenState};
