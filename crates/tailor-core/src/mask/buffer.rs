//! Per-pixel alpha buffers.
//!
//! [`AlphaBuffer`] holds the base opacity sampled at load time (or produced by
//! background removal). [`CorrectionBuffer`] holds the signed brush
//! adjustments layered on top. The visible alpha of a pixel is always
//! `clamp(base + correction, 0, 255)`.

/// Largest magnitude a correction value may reach.
pub const CORRECTION_LIMIT: i16 = 255;

/// Combine a base alpha and a correction into the visible alpha.
#[inline]
pub fn composite_alpha(base: u8, correction: i16) -> u8 {
    (base as i16 + correction).clamp(0, 255) as u8
}

/// Base opacity, one byte per pixel. Replaced wholesale, never painted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaBuffer {
    width: u32,
    height: u32,
    values: Vec<u8>,
}

impl AlphaBuffer {
    /// Wrap existing alpha values. Returns `None` if the length does not
    /// match `width * height`.
    pub fn from_values(width: u32, height: u32, values: Vec<u8>) -> Option<Self> {
        if values.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
        })
    }

    /// A buffer where every pixel has the same opacity.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            values: vec![value; (width as usize) * (height as usize)],
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Signed per-pixel adjustment in `[-255, 255]`.
///
/// Only the rasterizer writes into it; everything else reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionBuffer {
    width: u32,
    height: u32,
    values: Vec<i16>,
}

impl CorrectionBuffer {
    /// A zero-filled buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            values: vec![0; (width as usize) * (height as usize)],
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

    pub fn values(&self) -> &[i16] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `(x, y)`, or `None` outside the buffer.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<i16> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.values[(y as usize) * (self.width as usize) + x as usize])
    }

    /// Add `delta` at `(x, y)`, saturating to the correction range.
    #[inline]
    pub(crate) fn accumulate(&mut self, x: u32, y: u32, delta: i16) {
        let idx = (y as usize) * (self.width as usize) + x as usize;
        let value = self.values[idx].saturating_add(delta);
        self.values[idx] = value.clamp(-CORRECTION_LIMIT, CORRECTION_LIMIT);
    }

    /// Zero every value in place.
    pub fn clear(&mut self) {
        self.values.fill(0);
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0)
    }

    /// Visible alpha for every pixel given a base buffer of the same size.
    pub fn composite(&self, base: &AlphaBuffer) -> Vec<u8> {
        debug_assert_eq!(self.dimensions(), base.dimensions());
        base.values
            .iter()
            .zip(&self.values)
            .map(|(&b, &c)| composite_alpha(b, c))
            .collect()
    }
}
