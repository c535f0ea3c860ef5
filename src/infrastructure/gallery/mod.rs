//! Image listing service adapter.

pub mod client;
pub mod dto;

pub use client::GalleryClient;
