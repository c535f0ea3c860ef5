//! Beer Gallery - A terminal gallery for beer check-in photos.
//!
//! This crate pages through a remote image listing and shows it as a
//! thumbnail grid with a full-screen viewer, drawing images through the
//! terminal's graphics protocol.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing feed and viewer state.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing UI components and event handling.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "beer-gallery";
