//! Image decoding pipeline for the cutout editor.
//!
//! This module provides functionality for:
//! - Decoding uploaded photos (PNG, JPEG, WebP) to straight RGBA
//! - Correcting EXIF orientation so phone photos load upright
//! - Downscaling oversized uploads to the editor's maximum edge
//!
//! # Architecture
//!
//! Decoding is synchronous. Hosts that decode on a worker hand the finished
//! bytes to [`crate::session::EditSession::load`], which swaps state only once
//! the whole image is ready.

mod load;
mod resize;
mod types;

pub use load::{decode_image, decode_image_no_orientation, get_orientation};
pub use resize::{calculate_fit_dimensions, resize, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};

/// Longest edge the editing canvas accepts before uploads are downscaled.
pub const DEFAULT_MAX_EDGE: u32 = 1600;
