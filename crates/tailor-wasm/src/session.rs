//! Editing session WASM bindings.
//!
//! `JsEditSession` wraps the core `EditSession`. Pointer coordinates are in
//! scene pixels (the rendered frame), exactly as reported by the canvas.
//!
//! # Example
//!
//! ```typescript
//! import { JsEditSession } from '@tailor/wasm';
//!
//! const session = new JsEditSession({ maxEdge: 1600 }, 'dials', { diameterMm: 30 });
//! session.load(new Uint8Array(await file.arrayBuffer()));
//! session.set_brush({ tool: 'erase', radius: 25, softness: 50 });
//!
//! canvas.onpointerdown = (e) => session.pointer_down(e.offsetX, e.offsetY);
//! canvas.onpointermove = (e) => session.pointer_move(e.offsetX, e.offsetY);
//! canvas.onpointerup = () => session.pointer_up();
//!
//! const frame = session.render();
//! ctx.putImageData(new ImageData(new Uint8ClampedArray(frame.pixels()), frame.width), 0, 0);
//! ```

use js_sys::Array;
use tailor_core::geometry::Point;
use tailor_core::mask::{BrushSettings, Tool};
use tailor_core::session::{EditSession, EditorConfig, InteractionMode};
use tailor_core::template::{PartDimensions, PartKind};
use wasm_bindgen::prelude::*;

use crate::background::chain_from_array;
use crate::types::{JsExportArtifact, JsSurface};

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Deserialize an optional plain object, falling back to the default.
fn from_optional<T>(value: JsValue) -> Result<T, JsValue>
where
    T: Default + serde::de::DeserializeOwned,
{
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(to_js_error)
}

fn parse_part_kind(name: &str) -> Result<PartKind, String> {
    PartKind::parse(name).ok_or_else(|| format!("Unknown part type: {}", name))
}

fn parse_tool(name: &str) -> Result<Tool, String> {
    match name {
        "restore" => Ok(Tool::Restore),
        "erase" => Ok(Tool::Erase),
        _ => Err(format!("Unknown tool: {}", name)),
    }
}

fn parse_mode(name: &str) -> Result<InteractionMode, String> {
    match name {
        "paint" => Ok(InteractionMode::Paint),
        "move" => Ok(InteractionMode::Move),
        _ => Err(format!("Unknown interaction mode: {}", name)),
    }
}

/// Editing session for one part asset.
#[wasm_bindgen]
pub struct JsEditSession {
    inner: EditSession,
}

#[wasm_bindgen]
impl JsEditSession {
    /// Create a session.
    ///
    /// # Arguments
    /// * `config` - `EditorConfig` object (camelCase fields, all optional) or undefined
    /// * `part_kind` - "cases", "movements", "dials", "hands", "straps" or "crowns"
    /// * `dimensions` - `PartDimensions` object in millimeters or undefined
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, part_kind: &str, dimensions: JsValue) -> Result<JsEditSession, JsValue> {
        let config: EditorConfig = from_optional(config)?;
        let kind = parse_part_kind(part_kind).map_err(to_js_error)?;
        let dims: PartDimensions = from_optional(dimensions)?;
        Ok(Self {
            inner: EditSession::new(config, kind, dims),
        })
    }

    /// Decode and install an uploaded image (PNG, JPEG or WebP).
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.load(bytes).map(|_| ()).map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.has_image()
    }

    /// Editing width in pixels (0 when no image is loaded)
    #[wasm_bindgen(getter)]
    pub fn image_width(&self) -> u32 {
        self.inner.asset().map_or(0, |a| a.image().width)
    }

    /// Editing height in pixels (0 when no image is loaded)
    #[wasm_bindgen(getter)]
    pub fn image_height(&self) -> u32 {
        self.inner.asset().map_or(0, |a| a.image().height)
    }

    /// Side of the square scene canvas in pixels
    #[wasm_bindgen(getter)]
    pub fn canvas_size(&self) -> u32 {
        self.inner.template().canvas_px()
    }

    /// Switch part type or dimensions; rebuilds the template guides.
    pub fn set_part(&mut self, part_kind: &str, dimensions: JsValue) -> Result<(), JsValue> {
        let kind = parse_part_kind(part_kind).map_err(to_js_error)?;
        let dims: PartDimensions = from_optional(dimensions)?;
        self.inner.set_part(kind, dims);
        Ok(())
    }

    /// Set brush from `{ tool, radius, softness }` (missing fields use defaults).
    pub fn set_brush(&mut self, brush: JsValue) -> Result<(), JsValue> {
        let brush: BrushSettings = from_optional(brush)?;
        self.inner.set_brush(brush);
        Ok(())
    }

    /// Current brush as a plain object.
    pub fn brush(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.brush()).map_err(to_js_error)
    }

    /// "restore" or "erase"
    pub fn set_tool(&mut self, tool: &str) -> Result<(), JsValue> {
        let tool = parse_tool(tool).map_err(to_js_error)?;
        self.inner.set_tool(tool);
        Ok(())
    }

    /// "paint" or "move"
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = parse_mode(mode).map_err(to_js_error)?;
        self.inner.set_mode(mode);
        Ok(())
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.inner.pointer_down(Point::new(x, y));
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.inner.pointer_move(Point::new(x, y));
    }

    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }

    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    pub fn reset_mask(&mut self) {
        self.inner.reset_mask();
    }

    /// Rotation in degrees (0 when no image is loaded)
    #[wasm_bindgen(getter)]
    pub fn angle(&self) -> f64 {
        self.inner.transform().map_or(0.0, |t| t.angle_deg())
    }

    #[wasm_bindgen(setter)]
    pub fn set_angle(&mut self, degrees: f64) {
        self.inner.set_angle(degrees);
    }

    /// Uniform scale (1 when no image is loaded)
    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.inner.transform().map_or(1.0, |t| t.scale())
    }

    #[wasm_bindgen(setter)]
    pub fn set_scale(&mut self, scale: f64) {
        self.inner.set_scale(scale);
    }

    pub fn set_offset(&mut self, x: f64, y: f64) {
        self.inner.set_offset(Point::new(x, y));
    }

    pub fn reset_transform(&mut self) {
        self.inner.reset_transform();
    }

    /// Overlay the untouched upload at reduced opacity.
    pub fn set_show_original(&mut self, show: bool) {
        self.inner.set_show_original(show);
    }

    /// Tint areas by missing alpha.
    pub fn set_show_heatmap(&mut self, show: bool) {
        self.inner.set_show_heatmap(show);
    }

    /// Draw the current scene.
    pub fn render(&self) -> JsSurface {
        JsSurface::from_surface(self.inner.render())
    }

    /// The editing bitmap as PNG, for an asynchronous segmentation model.
    pub fn source_png(&self) -> Result<Vec<u8>, JsValue> {
        self.inner.source_png().map_err(to_js_error)
    }

    /// Reseed the base alpha from a finished model output (PNG/WebP with alpha).
    pub fn apply_cutout(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.apply_cutout(bytes).map_err(to_js_error)
    }

    /// Run synchronous providers `[{ name, remove }]` in order.
    pub fn remove_background(&mut self, providers: Array) -> Result<(), JsValue> {
        let chain = chain_from_array(&providers)?;
        self.inner.remove_background(&chain).map_err(to_js_error)
    }

    /// Cutout PNG plus placement metadata.
    pub fn export(&self) -> Result<JsExportArtifact, JsValue> {
        let artifact = self.inner.export().map_err(to_js_error)?;
        JsExportArtifact::from_artifact(artifact).map_err(to_js_error)
    }

    /// PNG of the rendered scene.
    pub fn export_scene(&self) -> Result<Vec<u8>, JsValue> {
        self.inner.export_scene().map_err(to_js_error)
    }
}
