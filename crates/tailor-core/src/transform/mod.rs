//! Placement of cutouts in scene space.
//!
//! # Coordinate System
//!
//! - Image space: pixels of one asset's bitmap, origin top-left
//! - Scene space: pixels of the template canvas, origin top-left
//! - Rotation angles are in degrees; with y pointing down a positive angle
//!   turns clockwise on screen
//! - Every asset rotates and scales around its own image center, which is
//!   pinned to the scene center plus the asset's offset

mod placement;
mod sample;

pub use placement::{OffsetDrag, TransformModel, MAX_SCALE, MIN_SCALE};
pub use sample::{sample, sample_bilinear, sample_nearest, Sampling, Texels};
