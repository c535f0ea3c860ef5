//! Domain entity definitions.

mod checkin;
mod image;
mod rating;

pub use checkin::{AT_HOME_VENUE, CheckinMetadata, GalleryImage, ImagePage};
pub use image::{ImageId, ImageSource, ImageStatus, ImageVariant, LoadedImage};
pub use rating::{DEFAULT_MAX_STARS, StarRating};
