//! Scene compositing.
//!
//! Every frame is drawn in a fixed order onto a square [`Surface`]:
//!
//! 1. Template background and measurement guides
//! 2. Each [`SceneLayer`] in caller order, cutout or placeholder
//! 3. The optional "show original" overlay
//!
//! Preview and export go through the same [`Compositor`], so what the user
//! sees is what gets exported.

mod scene;
mod surface;

pub use scene::{sort_by_stacking, Compositor, Cutout, SceneLayer, DEFAULT_OVERLAY_OPACITY};
pub use surface::Surface;
