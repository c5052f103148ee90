//! RGBA8 drawing surface for the scene.

use crate::geometry::Point;

/// A straight-alpha RGBA8 raster, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let count = (width as usize) * (height as usize);
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x < self.width && y < self.height {
            let i = self.index(x, y);
            self.pixels[i..i + 4].copy_from_slice(&color);
        }
    }

    /// Source-over blend of a straight-alpha color onto `(x, y)`.
    pub fn blend_pixel(&mut self, x: u32, y: u32, src: [u8; 4]) {
        if x >= self.width || y >= self.height || src[3] == 0 {
            return;
        }
        let i = self.index(x, y);
        if src[3] == 255 {
            self.pixels[i..i + 4].copy_from_slice(&src);
            return;
        }

        let sa = src[3] as f64 / 255.0;
        let da = self.pixels[i + 3] as f64 / 255.0;
        let out_a = sa + da * (1.0 - sa);

        for c in 0..3 {
            let s = src[c] as f64;
            let d = self.pixels[i + c] as f64;
            let v = (s * sa + d * da * (1.0 - sa)) / out_a;
            self.pixels[i + c] = v.round().clamp(0.0, 255.0) as u8;
        }
        self.pixels[i + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Overwrite with a two-tone checkerboard of `cell`-sized squares.
    pub fn fill_checkerboard(&mut self, cell: u32, light: [u8; 4], dark: [u8; 4]) {
        let cell = cell.max(1);
        for y in 0..self.height {
            for x in 0..self.width {
                let color = if ((x / cell) + (y / cell)) % 2 == 0 {
                    light
                } else {
                    dark
                };
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Inclusive pixel range `(x0, y0, x1, y1)` that may have centers inside
    /// `[min, max]`, clipped to the surface.
    pub(crate) fn clip(&self, min: Point, max: Point) -> Option<(u32, u32, u32, u32)> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(self.width as f64 - 1.0);
        let y1 = max.y.ceil().min(self.height as f64 - 1.0);
        if !(x0 <= x1 && y0 <= y1) {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Blend `color` onto every pixel whose center satisfies `inside`.
    fn blend_where(&mut self, min: Point, max: Point, color: [u8; 4], inside: impl Fn(Point) -> bool) {
        let Some((x0, y0, x1, y1)) = self.clip(min, max) else {
            return;
        };
        for y in y0..=y1 {
            for x in x0..=x1 {
                if inside(Point::new(x as f64 + 0.5, y as f64 + 0.5)) {
                    self.blend_pixel(x, y, color);
                }
            }
        }
    }

    pub fn fill_circle(&mut self, center: Point, radius: f64, color: [u8; 4]) {
        if !(radius > 0.0) {
            return;
        }
        let r = Point::new(radius, radius);
        self.blend_where(center - r, center + r, color, |p| {
            p.distance_to(center) <= radius
        });
    }

    /// Ring of `thickness` pixels straddling `radius`.
    pub fn stroke_circle(&mut self, center: Point, radius: f64, thickness: f64, color: [u8; 4]) {
        if !(radius > 0.0 && thickness > 0.0) {
            return;
        }
        let half = thickness / 2.0;
        let r = Point::new(radius + half, radius + half);
        self.blend_where(center - r, center + r, color, |p| {
            (p.distance_to(center) - radius).abs() <= half
        });
    }

    /// Axis-aligned rectangle of `size` centered on `center`.
    pub fn fill_rect(&mut self, center: Point, size: Point, color: [u8; 4]) {
        if !(size.x > 0.0 && size.y > 0.0) {
            return;
        }
        let half = Point::new(size.x / 2.0, size.y / 2.0);
        let (min, max) = (center - half, center + half);
        self.blend_where(min, max, color, |p| {
            p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
        });
    }

    /// Outline of an axis-aligned rectangle, drawn inward from its edge.
    pub fn stroke_rect(&mut self, center: Point, size: Point, thickness: f64, color: [u8; 4]) {
        if !(size.x > 0.0 && size.y > 0.0 && thickness > 0.0) {
            return;
        }
        let half = Point::new(size.x / 2.0, size.y / 2.0);
        let (min, max) = (center - half, center + half);
        self.blend_where(min, max, color, |p| {
            let inside = p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y;
            let edge = p.x - min.x < thickness
                || max.x - p.x < thickness
                || p.y - min.y < thickness
                || max.y - p.y < thickness;
            inside && edge
        });
    }
}
