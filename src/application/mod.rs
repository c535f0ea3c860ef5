//! Application layer with feed and viewer state.

/// Application services.
pub mod services;

pub use services::{ImageFeed, PageOutcome, PageRequest, ScrollMetrics, Viewer, ViewerMove};
