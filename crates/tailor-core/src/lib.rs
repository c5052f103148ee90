//! Tailor Core - cutout editing library
//!
//! This crate provides the core of the Tailor part editor: decoding uploaded
//! photos of watch parts, hand-correcting their transparency masks with a
//! soft brush (with exact undo/redo), placing the cutout against a
//! dimensioned template, and exporting the result as PNG plus placement
//! metadata.
//!
//! Everything is synchronous and single-threaded; an [`EditSession`] owns
//! all editing state for one asset.

pub mod background;
pub mod composite;
pub mod decode;
pub mod encode;
pub mod geometry;
pub mod mask;
pub mod session;
pub mod template;
pub mod transform;

pub use background::{BackgroundError, BackgroundRemover, ProviderChain, ProviderError};
pub use composite::{Compositor, SceneLayer, Surface};
pub use decode::{DecodeError, DecodedImage};
pub use encode::{EncodeError, ExportArtifact, PlacementMetadata};
pub use geometry::Point;
pub use mask::{BrushSettings, MaskEngine, Tool};
pub use session::{EditSession, EditorConfig, InteractionMode, SessionError};
pub use template::{PartDimensions, PartKind, TemplateGeometry};
pub use transform::{Sampling, TransformModel};
