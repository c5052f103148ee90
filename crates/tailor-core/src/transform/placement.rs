//! Rigid placement of an asset in scene space.
//!
//! For rotation angle θ, uniform scale s and offset o around the scene anchor
//! c, an image point `(u, v)` of a `W x H` image maps to:
//!
//! ```text
//! x = c.x + o.x + s * (cos θ * (u - W/2) - sin θ * (v - H/2))
//! y = c.y + o.y + s * (sin θ * (u - W/2) + cos θ * (v - H/2))
//! ```
//!
//! The inverse routes pointer input back into image space for painting and
//! drives per-pixel sampling in the compositor.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Scale limits accepted by [`TransformModel::set_scale`].
pub const MIN_SCALE: f64 = 0.01;
pub const MAX_SCALE: f64 = 100.0;

/// Rotation, scale and offset of one placed asset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformModel {
    angle_deg: f64,
    scale: f64,
    offset: Point,
    anchor: Point,
}

impl TransformModel {
    /// Identity placement around `anchor` (the scene center).
    pub fn identity(anchor: Point) -> Self {
        Self {
            angle_deg: 0.0,
            scale: 1.0,
            offset: Point::ORIGIN,
            anchor,
        }
    }

    /// Build a placement, normalizing the angle and clamping the scale.
    pub fn new(anchor: Point, angle_deg: f64, scale: f64, offset: Point) -> Self {
        let mut model = Self::identity(anchor);
        model.set_angle(angle_deg);
        model.set_scale(scale);
        model.set_offset(offset);
        model
    }

    /// Rotation in degrees, in `[0, 360)`.
    pub fn angle_deg(&self) -> f64 {
        self.angle_deg
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Set the rotation; any finite angle is wrapped into `[0, 360)`.
    pub fn set_angle(&mut self, angle_deg: f64) {
        if angle_deg.is_finite() {
            let wrapped = angle_deg.rem_euclid(360.0);
            // rem_euclid can round up to exactly 360 for tiny negatives
            self.angle_deg = if wrapped >= 360.0 { 0.0 } else { wrapped };
        }
    }

    /// Set the uniform scale, clamped to `[MIN_SCALE, MAX_SCALE]`.
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
    }

    pub fn set_offset(&mut self, offset: Point) {
        if offset.is_finite() {
            self.offset = offset;
        }
    }

    /// Move the anchor, e.g. when the template canvas is resized.
    pub fn set_anchor(&mut self, anchor: Point) {
        if anchor.is_finite() {
            self.anchor = anchor;
        }
    }

    /// Back to `{0°, 1.0, (0, 0)}`, keeping the anchor.
    pub fn reset(&mut self) {
        *self = Self::identity(self.anchor);
    }

    pub fn is_identity(&self) -> bool {
        self.angle_deg == 0.0 && self.scale == 1.0 && self.offset == Point::ORIGIN
    }

    #[inline]
    fn sin_cos(&self) -> (f64, f64) {
        self.angle_deg.to_radians().sin_cos()
    }

    /// Map an image-space point to scene space.
    pub fn forward(&self, p: Point, dims: (u32, u32)) -> Point {
        let (sin, cos) = self.sin_cos();
        let du = p.x - dims.0 as f64 / 2.0;
        let dv = p.y - dims.1 as f64 / 2.0;
        Point {
            x: self.anchor.x + self.offset.x + self.scale * (cos * du - sin * dv),
            y: self.anchor.y + self.offset.y + self.scale * (sin * du + cos * dv),
        }
    }

    /// Map a scene-space point back to image space.
    pub fn inverse(&self, p: Point, dims: (u32, u32)) -> Point {
        let (sin, cos) = self.sin_cos();
        // cos(-θ) = cos θ, sin(-θ) = -sin θ
        let dx = p.x - self.anchor.x - self.offset.x;
        let dy = p.y - self.anchor.y - self.offset.y;
        Point {
            x: (dx * cos + dy * sin) / self.scale + dims.0 as f64 / 2.0,
            y: (-dx * sin + dy * cos) / self.scale + dims.1 as f64 / 2.0,
        }
    }

    /// Axis-aligned scene bounds `(min, max)` of the placed image rectangle.
    pub fn scene_bounds(&self, dims: (u32, u32)) -> (Point, Point) {
        let (w, h) = (dims.0 as f64, dims.1 as f64);
        let corners = [
            self.forward(Point::new(0.0, 0.0), dims),
            self.forward(Point::new(w, 0.0), dims),
            self.forward(Point::new(0.0, h), dims),
            self.forward(Point::new(w, h), dims),
        ];

        let mut min = corners[0];
        let mut max = corners[0];
        for c in &corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        (min, max)
    }
}

/// An in-flight drag of a placed asset. Only ever changes the offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetDrag {
    start_pointer: Point,
    initial_offset: Point,
}

impl OffsetDrag {
    /// Capture the pointer position and current offset at drag start.
    pub fn begin(pointer: Point, transform: &TransformModel) -> Self {
        Self {
            start_pointer: pointer,
            initial_offset: transform.offset(),
        }
    }

    /// Offset for the current pointer position.
    pub fn offset_for(&self, pointer: Point) -> Point {
        self.initial_offset + (pointer - self.start_pointer)
    }

    /// Apply the drag to `transform`.
    pub fn update(&self, pointer: Point, transform: &mut TransformModel) {
        transform.set_offset(self.offset_for(pointer));
    }
}
