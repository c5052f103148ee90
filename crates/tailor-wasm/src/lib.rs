//! Tailor WASM - WebAssembly bindings for the Tailor cutout editor
//!
//! This crate provides WASM bindings to expose the tailor-core editing session
//! to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `session` - The editing session (load, brush, placement, render, export)
//! - `background` - Background-removal providers backed by JS functions
//! - `types` - WASM-compatible wrapper types for frames and exports
//! - `logging` - Forwards `log` records to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditSession } from '@tailor/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const session = new JsEditSession(undefined, 'movements', { diameterMm: 25.6 });
//! session.load(new Uint8Array(await file.arrayBuffer()));
//! const frame = session.render();
//! console.log(`Scene ${frame.width}x${frame.height}`);
//! ```

use wasm_bindgen::prelude::*;

mod background;
mod logging;
mod session;
mod types;

// Re-export public types
pub use logging::{init_logging, set_log_level, LoggingConfig};
pub use session::JsEditSession;
pub use types::{JsExportArtifact, JsSurface};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    init_logging(LoggingConfig::default());
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
