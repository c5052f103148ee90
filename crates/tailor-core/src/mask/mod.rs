//! Hand-corrected transparency masks.
//!
//! A cutout's visible alpha is the base alpha (from the upload or from
//! background removal) plus a signed correction painted with a soft brush:
//!
//! ```text
//! composited[i] = clamp(base[i] + correction[i], 0, 255)
//! ```
//!
//! ## Pieces
//!
//! - [`AlphaBuffer`] / [`CorrectionBuffer`]: the two per-pixel buffers
//! - [`StrokeRecorder`] / [`Stroke`]: one brush gesture
//! - [`rasterizer`]: paints dots and segments into a correction buffer
//! - [`MaskEngine`]: owns the buffers plus undo/redo history
//!
//! ## Falloff
//!
//! The brush is a linear ramp. With softness `k` (as a fraction), pixels
//! closer than `(1 - k) * radius` get full strength and strength falls
//! linearly to zero at the radius. Softness 0 is a hard disc.

mod buffer;
mod engine;
pub mod rasterizer;
mod stroke;

pub use buffer::{composite_alpha, AlphaBuffer, CorrectionBuffer, CORRECTION_LIMIT};
pub use engine::MaskEngine;
pub use stroke::{BrushSettings, Stroke, StrokeRecorder, Tool, MAX_RADIUS, MIN_RADIUS};

/// Brush strength at normalized distance `t = d / radius`.
///
/// # Arguments
/// * `t` - Distance from the dot center divided by the radius (0.0 to 1.0)
/// * `softness_pct` - Soft edge width as a percentage (0 to 100)
///
/// # Returns
/// Strength between 0.0 and 1.0
#[inline]
pub fn brush_falloff(t: f64, softness_pct: f64) -> f64 {
    if softness_pct <= 0.0 {
        return 1.0;
    }
    let k = (softness_pct / 100.0).min(1.0);
    (1.0 - (t - (1.0 - k)) / k).clamp(0.0, 1.0)
}
