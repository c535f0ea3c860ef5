pub mod checkin_format;
pub mod image_feed;
pub mod viewer;

pub use image_feed::{DEFAULT_LOAD_THRESHOLD, ImageFeed, PageOutcome, PageRequest, ScrollMetrics};
pub use viewer::{Viewer, ViewerMove};
