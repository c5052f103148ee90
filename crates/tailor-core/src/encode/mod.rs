//! Export encoding.
//!
//! This module provides functionality for:
//! - Encoding RGBA pixels to PNG
//! - Flattening a cutout (source RGB + composited alpha) for export
//! - Describing the placement of the cutout as JSON metadata
//!
//! Exports are reproducible: encoding the same state twice yields identical
//! bytes.

mod export;
mod png;

pub use export::{
    export_cutout, export_scene, AssetHint, CanvasMetadata, ExportArtifact, ExportEncoder,
    PlacementMetadata, TransformMetadata,
};
pub use png::{encode_png, EncodeError};
