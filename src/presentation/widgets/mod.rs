mod footer_bar;
mod image_card;
mod image_grid;
mod image_modal;
mod image_state;
mod star_rating;
mod status_bar;

pub use footer_bar::{FooterBar, FooterBarStyle, ViewMode};
pub use image_card::{ImageCard, ImageCardStyle, truncate};
pub use image_grid::{GridLayout, GridViewState, ImageGrid, MIN_CARD_WIDTH};
pub use image_modal::{ImageModal, ImageModalStyle};
pub use image_state::{CardImage, LOAD_BUFFER, ThumbnailManager};
pub use star_rating::{EMPTY_STAR, FULL_STAR, PARTIAL_STAR, StarRatingWidget};
pub use status_bar::{StatusBar, StatusLevel};
