//! Texel sampling for transformed drawing.
//!
//! Sample positions are continuous image coordinates where pixel `(x, y)`
//! covers `[x, x+1) x [y, y+1)`. Both samplers return `None` outside the
//! image so callers can skip the pixel entirely.

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;

/// Interpolation used when drawing a cutout into the scene.
///
/// Preview and export always use the same value so they match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sampling {
    /// Nearest texel. Reproduces the composited alpha exactly.
    #[default]
    Nearest,
    /// Bilinear blend of the four nearest texels (premultiplied).
    Bilinear,
}

/// Anything that can hand out straight RGBA texels.
pub trait Texels {
    fn dimensions(&self) -> (u32, u32);

    /// Texel at `(x, y)`; callers must stay in bounds.
    fn texel(&self, x: u32, y: u32) -> [u8; 4];
}

impl Texels for DecodedImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        self.rgba(x, y)
    }
}

/// Sample `source` at continuous image coordinates `(u, v)`.
pub fn sample<T: Texels + ?Sized>(source: &T, u: f64, v: f64, sampling: Sampling) -> Option<[u8; 4]> {
    match sampling {
        Sampling::Nearest => sample_nearest(source, u, v),
        Sampling::Bilinear => sample_bilinear(source, u, v),
    }
}

/// Nearest-texel lookup.
pub fn sample_nearest<T: Texels + ?Sized>(source: &T, u: f64, v: f64) -> Option<[u8; 4]> {
    let (w, h) = source.dimensions();
    if !(u >= 0.0 && v >= 0.0 && u < w as f64 && v < h as f64) {
        return None;
    }
    let x = (u.floor() as u32).min(w - 1);
    let y = (v.floor() as u32).min(h - 1);
    Some(source.texel(x, y))
}

/// Bilinear interpolation of the four texels around `(u, v)`.
///
/// Color is weighted by alpha so fully transparent texels do not bleed their
/// (meaningless) RGB into the edge of the cutout.
pub fn sample_bilinear<T: Texels + ?Sized>(source: &T, u: f64, v: f64) -> Option<[u8; 4]> {
    let (w, h) = source.dimensions();
    if !(u >= 0.0 && v >= 0.0 && u < w as f64 && v < h as f64) {
        return None;
    }

    // Texel centers sit at +0.5
    let x = (u - 0.5).clamp(0.0, (w - 1) as f64);
    let y = (v - 0.5).clamp(0.0, (h - 1) as f64);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let taps = [
        (source.texel(x0, y0), (1.0 - fx) * (1.0 - fy)),
        (source.texel(x1, y0), fx * (1.0 - fy)),
        (source.texel(x0, y1), (1.0 - fx) * fy),
        (source.texel(x1, y1), fx * fy),
    ];

    let mut premul = [0.0f64; 3];
    let mut alpha = 0.0f64;
    for (px, weight) in taps {
        let a = px[3] as f64 * weight;
        premul[0] += px[0] as f64 * a;
        premul[1] += px[1] as f64 * a;
        premul[2] += px[2] as f64 * a;
        alpha += a;
    }

    if alpha <= f64::EPSILON {
        return Some([0, 0, 0, 0]);
    }

    let mut result = [0u8; 4];
    for i in 0..3 {
        result[i] = (premul[i] / alpha).clamp(0.0, 255.0).round() as u8;
    }
    result[3] = alpha.clamp(0.0, 255.0).round() as u8;
    Some(result)
}
