//! WASM-compatible wrapper types for rendered frames and exports.
//!
//! This module provides JavaScript-friendly types that wrap the core Tailor
//! types, handling the conversion between Rust and JavaScript data
//! representations.

use tailor_core::composite::Surface;
use tailor_core::encode::ExportArtifact;
use wasm_bindgen::prelude::*;

/// A rendered scene frame for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`, ready for `new ImageData(...)`.
#[wasm_bindgen]
pub struct JsSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsSurface {
    /// Get the frame width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the frame height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4 for RGBA)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsSurface {
    pub(crate) fn from_surface(surface: Surface) -> Self {
        Self {
            width: surface.width(),
            height: surface.height(),
            pixels: surface.into_pixels(),
        }
    }
}

/// An exported cutout: PNG bytes plus placement metadata JSON.
#[wasm_bindgen]
pub struct JsExportArtifact {
    png: Vec<u8>,
    metadata_json: String,
}

#[wasm_bindgen]
impl JsExportArtifact {
    /// PNG bytes (RGBA, composited alpha) as Uint8Array
    pub fn png(&self) -> Vec<u8> {
        self.png.clone()
    }

    /// Placement metadata as a JSON string
    #[wasm_bindgen(getter)]
    pub fn metadata_json(&self) -> String {
        self.metadata_json.clone()
    }
}

impl JsExportArtifact {
    pub(crate) fn from_artifact(artifact: ExportArtifact) -> Result<Self, String> {
        let metadata_json = artifact.metadata_json().map_err(|e| e.to_string())?;
        Ok(Self {
            png: artifact.png,
            metadata_json,
        })
    }
}
