//! Soft circular brush rasterization into a correction buffer.
//!
//! # Algorithm
//!
//! A dot touches every pixel whose integer coordinate lies within `radius` of
//! the dot center. Its contribution is `round(255 * falloff) * sign`, where
//! the falloff is a linear ramp controlled by softness (see
//! [`super::brush_falloff`]). Values accumulate with clamping to `[-255, 255]`.
//!
//! Segments are drawn as a run of dots spaced at most `radius * 0.5 + 1`
//! pixels apart so a fast drag leaves no gaps.
//!
//! Live painting and history replay both go through [`paint_stroke_start`]
//! and [`paint_segment`] in the same order, which keeps a rebuilt buffer
//! bit-identical to the one painted interactively.

use super::{brush_falloff, CorrectionBuffer, Stroke};
use crate::geometry::Point;

/// Paint a single soft dot centered at `center`.
pub fn paint_dot(
    buffer: &mut CorrectionBuffer,
    center: Point,
    radius: f64,
    softness_pct: f64,
    sign: i16,
) {
    if !(radius > 0.0) || !center.is_finite() || buffer.is_empty() {
        return;
    }

    let max_x = buffer.width() as i64 - 1;
    let max_y = buffer.height() as i64 - 1;

    let x0 = ((center.x - radius).floor() as i64).max(0);
    let y0 = ((center.y - radius).floor() as i64).max(0);
    let x1 = ((center.x + radius).ceil() as i64).min(max_x);
    let y1 = ((center.y + radius).ceil() as i64).min(max_y);

    if x0 > x1 || y0 > y1 {
        return;
    }

    let r2 = radius * radius;

    for y in y0..=y1 {
        let dy = y as f64 - center.y;
        for x in x0..=x1 {
            let dx = x as f64 - center.x;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 {
                continue;
            }

            let t = d2.sqrt() / radius;
            let delta = (255.0 * brush_falloff(t, softness_pct)).round() as i16 * sign;
            if delta != 0 {
                buffer.accumulate(x as u32, y as u32, delta);
            }
        }
    }
}

/// Number of dots used between two stroke points.
#[inline]
pub fn segment_steps(from: Point, to: Point, radius: f64) -> usize {
    let spacing = radius * 0.5 + 1.0;
    let steps = (from.distance_to(to) / spacing).ceil();
    if steps.is_finite() && steps >= 1.0 {
        steps as usize
    } else {
        1
    }
}

/// Paint the interpolated segment from `from` to `to`, both ends included.
pub fn paint_segment(
    buffer: &mut CorrectionBuffer,
    from: Point,
    to: Point,
    radius: f64,
    softness_pct: f64,
    sign: i16,
) {
    let steps = segment_steps(from, to, radius);
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        paint_dot(buffer, from.lerp(to, t), radius, softness_pct, sign);
    }
}

/// Paint the opening dot of a stroke.
#[inline]
pub fn paint_stroke_start(
    buffer: &mut CorrectionBuffer,
    point: Point,
    radius: f64,
    softness_pct: f64,
    sign: i16,
) {
    paint_dot(buffer, point, radius, softness_pct, sign);
}

/// Replay a whole committed stroke.
pub fn paint_stroke(buffer: &mut CorrectionBuffer, stroke: &Stroke) {
    let points = stroke.points();
    let Some(&first) = points.first() else {
        return;
    };

    let (radius, softness, sign) = (stroke.radius(), stroke.softness(), stroke.sign());
    paint_stroke_start(buffer, first, radius, softness, sign);
    for pair in points.windows(2) {
        paint_segment(buffer, pair[0], pair[1], radius, softness, sign);
    }
}
