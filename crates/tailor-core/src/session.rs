//! Editing session: the single owner of one asset's editing state.
//!
//! A session holds the loaded bitmap, its mask engine, its placement and the
//! template it is placed against. Pointer input arrives in scene space and is
//! routed either to the brush (mapped into image space) or to the placement
//! drag, depending on the interaction mode.
//!
//! Fallible work (decode, background removal) is completed before any state
//! is replaced, so a failure leaves the session exactly as it was.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::background::{alpha_from_output, BackgroundError, ProviderChain};
use crate::composite::{Compositor, Cutout, SceneLayer, Surface, DEFAULT_OVERLAY_OPACITY};
use crate::decode::{
    decode_image, resize_to_fit, DecodeError, DecodedImage, FilterType, DEFAULT_MAX_EDGE,
};
use crate::encode::{encode_png, export_scene, EncodeError, ExportArtifact, ExportEncoder};
use crate::geometry::Point;
use crate::mask::{AlphaBuffer, BrushSettings, MaskEngine, Tool};
use crate::template::{
    PartDimensions, PartKind, TemplateGeometry, DEFAULT_BASELINE_MM, DEFAULT_MM_PER_PX,
};
use crate::transform::{OffsetDrag, Sampling, TransformModel};

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Background(#[from] BackgroundError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The operation needs a loaded image.
    #[error("No image loaded")]
    NoImage,
}

/// Editor-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Longest edge of the editing canvas; larger uploads are downscaled.
    pub max_edge: u32,
    pub mm_per_px: f64,
    /// Minimum physical side of the template canvas.
    pub baseline_mm: f64,
    /// Opacity of the "show original" overlay, 0..=1.
    pub overlay_opacity: f64,
    pub sampling: Sampling,
    pub resize_filter: FilterType,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_edge: DEFAULT_MAX_EDGE,
            mm_per_px: DEFAULT_MM_PER_PX,
            baseline_mm: DEFAULT_BASELINE_MM,
            overlay_opacity: DEFAULT_OVERLAY_OPACITY,
            sampling: Sampling::default(),
            resize_filter: FilterType::default(),
        }
    }
}

impl EditorConfig {
    /// Replace unusable values with their defaults.
    pub fn sanitized(self) -> Self {
        let positive = |v: f64, default: f64| if v.is_finite() && v > 0.0 { v } else { default };
        let overlay_opacity = if self.overlay_opacity.is_finite() {
            self.overlay_opacity.clamp(0.0, 1.0)
        } else {
            DEFAULT_OVERLAY_OPACITY
        };
        Self {
            max_edge: if self.max_edge == 0 {
                DEFAULT_MAX_EDGE
            } else {
                self.max_edge
            },
            mm_per_px: positive(self.mm_per_px, DEFAULT_MM_PER_PX),
            baseline_mm: positive(self.baseline_mm, DEFAULT_BASELINE_MM),
            overlay_opacity,
            ..self
        }
    }
}

/// What pointer events drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Brush strokes on the mask.
    #[default]
    Paint,
    /// Dragging the placed asset.
    Move,
}

/// A decoded upload with its mask and placement.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    image: DecodedImage,
    mask: MaskEngine,
    transform: TransformModel,
}

impl LoadedAsset {
    fn new(image: DecodedImage, anchor: Point) -> Result<Self, DecodeError> {
        let base = AlphaBuffer::from_values(image.width, image.height, image.alpha_channel())
            .ok_or_else(|| DecodeError::CorruptedFile("pixel buffer size mismatch".to_string()))?;
        Ok(Self {
            image,
            mask: MaskEngine::new(base),
            transform: TransformModel::identity(anchor),
        })
    }

    pub fn image(&self) -> &DecodedImage {
        &self.image
    }

    pub fn mask(&self) -> &MaskEngine {
        &self.mask
    }

    pub fn transform(&self) -> &TransformModel {
        &self.transform
    }
}

/// Swap in a new base alpha, failing when its size does not match the mask.
fn reseed(mask: &mut MaskEngine, base: AlphaBuffer) -> Result<(), BackgroundError> {
    let expected = mask.dimensions();
    let actual = base.dimensions();
    if mask.replace_base(base) {
        return Ok(());
    }
    log::warn!(
        "background mask is {}x{}, expected {}x{}",
        actual.0,
        actual.1,
        expected.0,
        expected.1
    );
    Err(BackgroundError::InvalidOutput(DecodeError::CorruptedFile(format!(
        "mask is {}x{}, expected {}x{}",
        actual.0, actual.1, expected.0, expected.1
    ))))
}

/// Editing state for one part.
#[derive(Debug, Clone)]
pub struct EditSession {
    config: EditorConfig,
    compositor: Compositor,
    kind: PartKind,
    dims: PartDimensions,
    template: TemplateGeometry,
    asset: Option<LoadedAsset>,
    brush: BrushSettings,
    mode: InteractionMode,
    drag: Option<OffsetDrag>,
    show_original: bool,
    show_heatmap: bool,
}

impl EditSession {
    pub fn new(config: EditorConfig, kind: PartKind, dims: PartDimensions) -> Self {
        let config = config.sanitized();
        let template = TemplateGeometry::for_part(kind, &dims, config.baseline_mm, config.mm_per_px);
        Self {
            compositor: Compositor::new(config.sampling, config.overlay_opacity),
            config,
            kind,
            dims,
            template,
            asset: None,
            brush: BrushSettings::default(),
            mode: InteractionMode::default(),
            drag: None,
            show_original: false,
            show_heatmap: false,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn template(&self) -> &TemplateGeometry {
        &self.template
    }

    pub fn part_kind(&self) -> PartKind {
        self.kind
    }

    pub fn part_dimensions(&self) -> &PartDimensions {
        &self.dims
    }

    pub fn asset(&self) -> Option<&LoadedAsset> {
        self.asset.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.asset.is_some()
    }

    /// Decode and install an upload, replacing any previous asset.
    ///
    /// The image is oriented per EXIF, converted to RGBA and downscaled to
    /// `max_edge`. Its own alpha channel becomes the base alpha. Returns the
    /// editing dimensions.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(u32, u32), SessionError> {
        let decoded = decode_image(bytes).inspect_err(|e| log::warn!("load failed: {}", e))?;
        let fitted = resize_to_fit(&decoded, self.config.max_edge, self.config.resize_filter)?;
        let asset = LoadedAsset::new(fitted, self.template.center())?;

        let dims = asset.image.dimensions();
        self.asset = Some(asset);
        self.drag = None;
        log::debug!("session loaded {}x{} {}", dims.0, dims.1, self.kind.as_str());
        Ok(dims)
    }

    /// Switch part kind or dimensions and rebuild the template.
    ///
    /// The placed asset keeps its angle, scale and offset; its anchor moves
    /// to the new scene center.
    pub fn set_part(&mut self, kind: PartKind, dims: PartDimensions) {
        self.template =
            TemplateGeometry::for_part(kind, &dims, self.config.baseline_mm, self.config.mm_per_px);
        self.kind = kind;
        self.dims = dims;
        let center = self.template.center();
        if let Some(asset) = self.asset.as_mut() {
            asset.transform.set_anchor(center);
        }
        log::debug!(
            "template rebuilt for {}: {} px",
            kind.as_str(),
            self.template.canvas_px()
        );
    }

    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    /// Brush used by the next stroke. An open stroke keeps its own settings.
    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.brush = brush.sanitized();
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.brush.tool = tool;
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Change what pointer events drive, finishing any in-flight interaction.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.finish_interaction();
        self.mode = mode;
    }

    fn finish_interaction(&mut self) {
        self.drag = None;
        if let Some(asset) = self.asset.as_mut() {
            asset.mask.commit_stroke();
        }
    }

    /// Scene point to image space for the current asset.
    pub fn scene_to_image(&self, scene: Point) -> Option<Point> {
        self.asset
            .as_ref()
            .map(|a| a.transform.inverse(scene, a.image.dimensions()))
    }

    /// Pointer pressed at a scene position.
    pub fn pointer_down(&mut self, scene: Point) {
        let brush = self.brush;
        let Some(asset) = self.asset.as_mut() else {
            return;
        };
        match self.mode {
            InteractionMode::Paint => {
                let p = asset.transform.inverse(scene, asset.image.dimensions());
                asset.mask.start_stroke(p, brush);
            }
            InteractionMode::Move => {
                self.drag = Some(OffsetDrag::begin(scene, &asset.transform));
            }
        }
    }

    /// Pointer moved to a scene position. Ignored unless an interaction is
    /// in flight.
    pub fn pointer_move(&mut self, scene: Point) {
        let Some(asset) = self.asset.as_mut() else {
            return;
        };
        match self.mode {
            InteractionMode::Paint => {
                if asset.mask.is_stroking() {
                    let p = asset.transform.inverse(scene, asset.image.dimensions());
                    asset.mask.extend_stroke(p);
                }
            }
            InteractionMode::Move => {
                if let Some(drag) = &self.drag {
                    drag.update(scene, &mut asset.transform);
                }
            }
        }
    }

    /// Pointer released (or left the canvas).
    pub fn pointer_up(&mut self) {
        self.finish_interaction();
    }

    pub fn can_undo(&self) -> bool {
        self.asset.as_ref().is_some_and(|a| a.mask.can_undo())
    }

    pub fn can_redo(&self) -> bool {
        self.asset.as_ref().is_some_and(|a| a.mask.can_redo())
    }

    pub fn undo(&mut self) -> bool {
        self.asset.as_mut().is_some_and(|a| a.mask.undo())
    }

    pub fn redo(&mut self) -> bool {
        self.asset.as_mut().is_some_and(|a| a.mask.redo())
    }

    /// Drop every mask edit, keeping the base alpha.
    pub fn reset_mask(&mut self) {
        if let Some(asset) = self.asset.as_mut() {
            asset.mask.reset();
        }
    }

    pub fn transform(&self) -> Option<TransformModel> {
        self.asset.as_ref().map(|a| a.transform)
    }

    pub fn set_angle(&mut self, angle_deg: f64) {
        if let Some(asset) = self.asset.as_mut() {
            asset.transform.set_angle(angle_deg);
        }
    }

    pub fn set_scale(&mut self, scale: f64) {
        if let Some(asset) = self.asset.as_mut() {
            asset.transform.set_scale(scale);
        }
    }

    pub fn set_offset(&mut self, offset: Point) {
        if let Some(asset) = self.asset.as_mut() {
            asset.transform.set_offset(offset);
        }
    }

    pub fn reset_transform(&mut self) {
        if let Some(asset) = self.asset.as_mut() {
            asset.transform.reset();
        }
        self.drag = None;
    }

    pub fn show_original(&self) -> bool {
        self.show_original
    }

    pub fn set_show_original(&mut self, show: bool) {
        self.show_original = show;
    }

    pub fn show_heatmap(&self) -> bool {
        self.show_heatmap
    }

    pub fn set_show_heatmap(&mut self, show: bool) {
        self.show_heatmap = show;
    }

    /// Composited alpha of the current asset (live while a stroke is open).
    pub fn composited_alpha(&self) -> Option<Vec<u8>> {
        self.asset.as_ref().map(|a| a.mask.composited_alpha())
    }

    /// The editing bitmap encoded as PNG, for handing to a segmentation model.
    pub fn source_png(&self) -> Result<Vec<u8>, SessionError> {
        let asset = self.asset.as_ref().ok_or(SessionError::NoImage)?;
        let image = &asset.image;
        Ok(encode_png(&image.pixels, image.width, image.height)?)
    }

    /// Run the provider chain and reseed the base alpha from its output.
    pub fn remove_background(&mut self, providers: &ProviderChain) -> Result<(), SessionError> {
        let source = self.source_png()?;
        let output = providers.remove(&source)?;
        self.apply_cutout(&output)
    }

    /// Reseed the base alpha from a finished model output.
    ///
    /// The output's alpha becomes the new base alpha (resized to the
    /// editing dimensions if needed) and mask edits, including an open
    /// stroke, are cleared. On error the session is unchanged.
    pub fn apply_cutout(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let filter = self.config.resize_filter;
        let asset = self.asset.as_mut().ok_or(SessionError::NoImage)?;
        let (width, height) = asset.image.dimensions();

        let base = alpha_from_output(bytes, width, height, filter)?;
        reseed(&mut asset.mask, base)?;
        Ok(())
    }

    fn layer<'a>(&self, asset: &'a LoadedAsset, alpha: &'a [u8]) -> SceneLayer<'a> {
        match Cutout::new(&asset.image, alpha) {
            Some(cutout) => {
                let layer = SceneLayer::with_cutout(self.kind, asset.transform, cutout);
                if self.show_original {
                    layer.with_original(&asset.image)
                } else {
                    layer
                }
            }
            None => SceneLayer::placeholder(self.kind, asset.transform),
        }
    }

    /// Draw the scene as currently edited.
    pub fn render(&self) -> Surface {
        let Some(asset) = self.asset.as_ref() else {
            let placeholder =
                SceneLayer::placeholder(self.kind, TransformModel::identity(self.template.center()));
            return self.compositor.render(&self.template, &[placeholder]);
        };

        let alpha = asset.mask.composited_alpha();
        let mut surface = self
            .compositor
            .render(&self.template, &[self.layer(asset, &alpha)]);
        if self.show_heatmap {
            self.compositor.draw_heatmap(
                &mut surface,
                asset.image.dimensions(),
                &alpha,
                &asset.transform,
            );
        }
        surface
    }

    /// Cutout PNG plus placement metadata.
    pub fn export(&self) -> Result<ExportArtifact, SessionError> {
        let asset = self.asset.as_ref().ok_or(SessionError::NoImage)?;
        let alpha = asset.mask.composited_alpha();
        let encoder = ExportEncoder::new(&self.template, self.kind, &self.dims);
        Ok(encoder.encode(&asset.image, &alpha, &asset.transform)?)
    }

    /// PNG of the rendered scene.
    pub fn export_scene(&self) -> Result<Vec<u8>, SessionError> {
        Ok(export_scene(&self.render())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::{BackgroundRemover, ProviderError};
    use crate::template::MAX_CANVAS_PX;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let pixels = rgba.repeat((width * height) as usize);
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&pixels, width, height, ExtendedColorType::Rgba8)
            .unwrap();
        out
    }

    fn dial_session() -> EditSession {
        let dims = PartDimensions {
            diameter_mm: Some(30.0),
            ..Default::default()
        };
        EditSession::new(EditorConfig::default(), PartKind::Dial, dims)
    }

    fn loaded(width: u32, height: u32, alpha: u8) -> EditSession {
        let mut session = dial_session();
        session.load(&png_bytes(width, height, [200, 100, 50, alpha])).unwrap();
        session
    }

    /// Scene point over image pixel `(x, y)` for the session's placement.
    fn scene_of(session: &EditSession, x: f64, y: f64) -> Point {
        let asset = session.asset().unwrap();
        asset.transform().forward(Point::new(x, y), asset.image().dimensions())
    }

    struct FixedOutput(Vec<u8>);

    impl BackgroundRemover for FixedOutput {
        fn name(&self) -> &str {
            "fixed"
        }

        fn remove(&self, _image: &[u8]) -> Result<Vec<u8>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    struct Offline;

    impl BackgroundRemover for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        fn remove(&self, _image: &[u8]) -> Result<Vec<u8>, ProviderError> {
            Err(ProviderError::Unavailable("no network".into()))
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.max_edge, 1600);
        assert_eq!(config.mm_per_px, 0.25);
        assert_eq!(config.baseline_mm, 60.0);
        assert_eq!(config.overlay_opacity, 0.35);
        assert_eq!(config.sampling, Sampling::Nearest);
        assert_eq!(config.resize_filter, FilterType::Lanczos3);
    }

    #[test]
    fn test_config_partial_json() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"maxEdge": 800, "sampling": "bilinear"}"#).unwrap();
        assert_eq!(config.max_edge, 800);
        assert_eq!(config.sampling, Sampling::Bilinear);
        assert_eq!(config.mm_per_px, 0.25);
    }

    #[test]
    fn test_zero_max_edge_falls_back() {
        let config: EditorConfig = serde_json::from_str(r#"{"maxEdge": 0}"#).unwrap();
        let mut session = EditSession::new(config, PartKind::Hands, PartDimensions::default());
        assert_eq!(session.config().max_edge, DEFAULT_MAX_EDGE);

        let dims = session.load(&png_bytes(8, 4, [1, 2, 3, 255])).unwrap();
        assert_eq!(dims, (8, 4));
    }

    #[test]
    fn test_config_sanitized() {
        let config = EditorConfig {
            mm_per_px: -1.0,
            baseline_mm: f64::NAN,
            overlay_opacity: 4.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(config.mm_per_px, DEFAULT_MM_PER_PX);
        assert_eq!(config.baseline_mm, DEFAULT_BASELINE_MM);
        assert_eq!(config.overlay_opacity, 1.0);
    }

    #[test]
    fn test_load_installs_asset() {
        let session = loaded(40, 20, 255);
        let asset = session.asset().unwrap();
        assert_eq!(asset.image().dimensions(), (40, 20));
        assert!(asset.mask().base().values().iter().all(|&a| a == 255));
        assert!(asset.transform().is_identity());
        assert_eq!(asset.transform().anchor(), Point::new(120.0, 120.0));
    }

    #[test]
    fn test_load_keeps_upload_alpha() {
        let session = loaded(4, 4, 77);
        assert_eq!(session.composited_alpha().unwrap(), vec![77u8; 16]);
    }

    #[test]
    fn test_load_downscales_to_max_edge() {
        let config = EditorConfig {
            max_edge: 32,
            ..Default::default()
        };
        let mut session = EditSession::new(config, PartKind::Hands, PartDimensions::default());
        let dims = session.load(&png_bytes(64, 16, [1, 2, 3, 255])).unwrap();
        assert_eq!(dims, (32, 8));
    }

    #[test]
    fn test_failed_load_keeps_previous_asset() {
        let mut session = loaded(10, 10, 255);
        let err = session.load(b"garbage").unwrap_err();
        assert!(matches!(err, SessionError::Decode(DecodeError::InvalidFormat)));
        assert_eq!(session.asset().unwrap().image().dimensions(), (10, 10));
    }

    #[test]
    fn test_load_resets_transform() {
        let mut session = loaded(10, 10, 255);
        session.set_angle(45.0);
        session.set_offset(Point::new(3.0, 4.0));
        session.load(&png_bytes(8, 8, [0, 0, 0, 255])).unwrap();
        assert!(session.transform().unwrap().is_identity());
    }

    #[test]
    fn test_paint_routes_through_inverse_transform() {
        let mut session = loaded(100, 100, 0);
        session.set_angle(90.0);
        session.set_brush(BrushSettings::new(Tool::Restore, 5.0, 0.0));

        let target = scene_of(&session, 20.0, 70.0);
        session.pointer_down(target);
        session.pointer_up();

        let mask = session.asset().unwrap().mask();
        assert_eq!(mask.history().len(), 1);
        assert_eq!(mask.composited_at(20, 70), Some(255));
        assert_eq!(mask.composited_at(70, 20), Some(0));
    }

    #[test]
    fn test_stroke_is_live_before_commit() {
        let mut session = loaded(50, 50, 0);
        session.set_brush(BrushSettings::new(Tool::Restore, 4.0, 0.0));

        session.pointer_down(scene_of(&session, 10.0, 10.0));
        session.pointer_move(scene_of(&session, 30.0, 10.0));
        let mask = session.asset().unwrap().mask();
        assert!(mask.is_stroking());
        assert_eq!(mask.composited_at(20, 10), Some(255));

        session.pointer_up();
        let mask = session.asset().unwrap().mask();
        assert!(!mask.is_stroking());
        assert_eq!(mask.composited_at(20, 10), Some(255));
    }

    #[test]
    fn test_move_mode_drags_offset_only() {
        let mut session = loaded(20, 20, 255);
        session.set_mode(InteractionMode::Move);
        session.pointer_down(Point::new(100.0, 100.0));
        session.pointer_move(Point::new(110.0, 95.0));
        session.pointer_up();

        let t = session.transform().unwrap();
        assert_eq!(t.offset(), Point::new(10.0, -5.0));
        assert_eq!(t.scale(), 1.0);
        assert!(!session.can_undo());

        // Moves after release do nothing
        session.pointer_move(Point::new(0.0, 0.0));
        assert_eq!(session.transform().unwrap().offset(), Point::new(10.0, -5.0));
    }

    #[test]
    fn test_mode_switch_commits_open_stroke() {
        let mut session = loaded(30, 30, 0);
        session.pointer_down(scene_of(&session, 15.0, 15.0));
        session.set_mode(InteractionMode::Move);

        assert!(!session.asset().unwrap().mask().is_stroking());
        assert!(session.can_undo());
    }

    #[test]
    fn test_undo_redo_through_session() {
        let mut session = loaded(60, 60, 0);
        session.set_brush(BrushSettings::new(Tool::Restore, 10.0, 50.0));
        session.pointer_down(scene_of(&session, 20.0, 20.0));
        session.pointer_move(scene_of(&session, 40.0, 30.0));
        session.pointer_up();
        let after = session.composited_alpha().unwrap();

        assert!(session.undo());
        assert!(session.composited_alpha().unwrap().iter().all(|&a| a == 0));
        assert!(session.redo());
        assert_eq!(session.composited_alpha().unwrap(), after);
        assert!(!session.redo());
    }

    #[test]
    fn test_operations_without_image() {
        let mut session = dial_session();
        session.pointer_down(Point::new(1.0, 1.0));
        session.pointer_up();
        assert!(!session.undo());
        assert!(!session.can_redo());
        assert!(matches!(session.export(), Err(SessionError::NoImage)));
        assert!(matches!(session.apply_cutout(&[]), Err(SessionError::NoImage)));

        let surface = session.render();
        assert_eq!(surface.dimensions(), (240, 240));
    }

    #[test]
    fn test_remove_background_reseeds_base() {
        let mut session = loaded(8, 8, 255);
        session.pointer_down(scene_of(&session, 4.0, 4.0));
        session.pointer_up();

        let providers = ProviderChain::new()
            .with(Offline)
            .with(FixedOutput(png_bytes(4, 4, [0, 0, 0, 0])));
        session.remove_background(&providers).unwrap();

        let mask = session.asset().unwrap().mask();
        assert!(mask.base().values().iter().all(|&a| a == 0));
        assert!(!mask.can_undo());
        assert!(mask.correction().is_zero());
    }

    #[test]
    fn test_background_failure_keeps_mask() {
        let mut session = loaded(16, 16, 0);
        session.pointer_down(scene_of(&session, 8.0, 8.0));
        session.pointer_up();
        let before = session.composited_alpha().unwrap();

        let err = session
            .remove_background(&ProviderChain::new().with(Offline))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Background(BackgroundError::ModelUnavailable { .. })
        ));

        let err = session.apply_cutout(b"not an image").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Background(BackgroundError::InvalidOutput(_))
        ));

        assert_eq!(session.composited_alpha().unwrap(), before);
        assert!(session.can_undo());
    }

    #[test]
    fn test_reseed_rejects_mismatched_size() {
        let mut mask = MaskEngine::new(AlphaBuffer::filled(4, 4, 200));
        let err = reseed(&mut mask, AlphaBuffer::filled(3, 3, 0)).unwrap_err();
        assert!(matches!(err, BackgroundError::InvalidOutput(_)));
        assert!(mask.base().values().iter().all(|&a| a == 200));

        reseed(&mut mask, AlphaBuffer::filled(4, 4, 0)).unwrap();
        assert!(mask.base().values().iter().all(|&a| a == 0));
    }

    #[test]
    fn test_extreme_part_dimensions_render() {
        let strap = PartDimensions {
            width_mm: Some(22.0),
            length_mm: Some(1e12),
            ..Default::default()
        };
        let session = EditSession::new(EditorConfig::default(), PartKind::Strap, strap);
        assert_eq!(session.template().canvas_px(), MAX_CANVAS_PX);

        let surface = session.render();
        assert_eq!(surface.dimensions(), (MAX_CANVAS_PX, MAX_CANVAS_PX));
    }

    #[test]
    fn test_set_part_rebuilds_template_and_anchor() {
        let mut session = loaded(10, 10, 255);
        session.set_offset(Point::new(2.0, 2.0));
        let strap = PartDimensions {
            width_mm: Some(20.0),
            length_mm: Some(120.0),
            ..Default::default()
        };
        session.set_part(PartKind::Strap, strap);

        assert_eq!(session.template().canvas_px(), 600);
        let t = session.transform().unwrap();
        assert_eq!(t.anchor(), Point::new(300.0, 300.0));
        assert_eq!(t.offset(), Point::new(2.0, 2.0));
        assert_eq!(session.part_kind(), PartKind::Strap);
    }

    #[test]
    fn test_render_matches_export_alpha() {
        let mut session = loaded(20, 20, 255);
        session.set_tool(Tool::Erase);
        session.pointer_down(scene_of(&session, 5.0, 5.0));
        session.pointer_up();

        let surface = session.render();
        let alpha = session.composited_alpha().unwrap();
        // Identity placement: image pixel (x, y) sits at scene (110 + x, 110 + y)
        for (x, y) in [(5u32, 5u32), (15, 15)] {
            let scene = surface.pixel(110 + x, 110 + y);
            let a = alpha[(y * 20 + x) as usize];
            if a == 255 {
                assert_eq!(scene, [200, 100, 50, 255]);
            } else {
                assert_ne!(scene, [200, 100, 50, 255]);
            }
        }

        let artifact = session.export().unwrap();
        let decoded = image::load_from_memory(&artifact.png).unwrap().to_rgba8();
        let exported: Vec<u8> = decoded.pixels().map(|p| p.0[3]).collect();
        assert_eq!(exported, alpha);
    }

    #[test]
    fn test_export_reproducible() {
        let mut session = loaded(12, 12, 128);
        session.set_scale(1.25);
        session.pointer_down(scene_of(&session, 6.0, 6.0));
        session.pointer_up();

        let first = session.export().unwrap();
        let second = session.export().unwrap();
        assert_eq!(first.png, second.png);
        assert_eq!(first.metadata_json().unwrap(), second.metadata_json().unwrap());
        assert_eq!(first.metadata.transform.scale, 1.25);
        assert_eq!(session.export_scene().unwrap(), session.export_scene().unwrap());
    }

    #[test]
    fn test_overlay_and_heatmap_change_render() {
        let mut session = loaded(20, 20, 0);
        let plain = session.render();

        session.set_show_original(true);
        let with_original = session.render();
        assert_ne!(plain, with_original);

        session.set_show_original(false);
        session.set_show_heatmap(true);
        let with_heat = session.render();
        assert_ne!(plain, with_heat);

        session.set_show_heatmap(false);
        assert_eq!(session.render(), plain);
    }
}
