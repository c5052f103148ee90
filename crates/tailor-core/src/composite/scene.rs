//! Scene rendering: template, placed cutouts and debug overlays.

use crate::decode::DecodedImage;
use crate::geometry::Point;
use crate::template::{GuideShape, PartKind, TemplateGeometry};
use crate::transform::{sample, Sampling, Texels, TransformModel};

use super::Surface;

const CHECKER_CELL: u32 = 10;
const CHECKER_LIGHT: [u8; 4] = [255, 255, 255, 255];
const CHECKER_DARK: [u8; 4] = [236, 236, 236, 255];
const GUIDE_COLOR: [u8; 4] = [110, 110, 110, 255];
const GUIDE_THICKNESS: f64 = 2.0;
const PLACEHOLDER_COLOR: [u8; 4] = [90, 90, 90, 64];
const HEATMAP_TINT: [u8; 3] = [30, 120, 255];

/// Default opacity of the "show original" overlay.
pub const DEFAULT_OVERLAY_OPACITY: f64 = 0.35;

/// Source RGB paired with the composited alpha of a mask.
#[derive(Debug, Clone, Copy)]
pub struct Cutout<'a> {
    image: &'a DecodedImage,
    alpha: &'a [u8],
}

impl<'a> Cutout<'a> {
    /// `None` when `alpha` does not have one value per pixel.
    pub fn new(image: &'a DecodedImage, alpha: &'a [u8]) -> Option<Self> {
        (alpha.len() == image.pixel_count()).then_some(Self { image, alpha })
    }

    pub fn alpha(&self) -> &'a [u8] {
        self.alpha
    }

    /// Flatten into RGBA8 with the composited alpha in place of the source's.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = self.image.pixels.clone();
        for (px, &a) in out.chunks_exact_mut(4).zip(self.alpha) {
            px[3] = a;
        }
        out
    }
}

impl Texels for Cutout<'_> {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let [r, g, b, _] = self.image.rgba(x, y);
        let a = self.alpha[(y as usize) * (self.image.width as usize) + (x as usize)];
        [r, g, b, a]
    }
}

/// Tints pixels by how much alpha is missing.
struct MissingAlpha<'a> {
    dims: (u32, u32),
    alpha: &'a [u8],
}

impl Texels for MissingAlpha<'_> {
    fn dimensions(&self) -> (u32, u32) {
        self.dims
    }

    fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let a = self.alpha[(y as usize) * (self.dims.0 as usize) + (x as usize)];
        let strength = ((255 - a) as f64 * 0.5).round() as u8;
        [HEATMAP_TINT[0], HEATMAP_TINT[1], HEATMAP_TINT[2], strength]
    }
}

/// Source RGB at full alpha, so the overlay also shows what the mask hides.
struct Opaque<'a>(&'a DecodedImage);

impl Texels for Opaque<'_> {
    fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let [r, g, b, _] = self.0.rgba(x, y);
        [r, g, b, 255]
    }
}

/// One part placed in the scene.
#[derive(Debug, Clone, Copy)]
pub struct SceneLayer<'a> {
    pub kind: PartKind,
    pub transform: TransformModel,
    /// Drawn through `transform`; a placeholder is drawn when absent.
    pub cutout: Option<Cutout<'a>>,
    /// Source RGB drawn on top at reduced opacity, ignoring its alpha.
    pub original: Option<&'a DecodedImage>,
}

impl<'a> SceneLayer<'a> {
    pub fn placeholder(kind: PartKind, transform: TransformModel) -> Self {
        Self {
            kind,
            transform,
            cutout: None,
            original: None,
        }
    }

    pub fn with_cutout(kind: PartKind, transform: TransformModel, cutout: Cutout<'a>) -> Self {
        Self {
            kind,
            transform,
            cutout: Some(cutout),
            original: None,
        }
    }

    /// Enable the "show original" overlay for this layer.
    pub fn with_original(mut self, original: &'a DecodedImage) -> Self {
        self.original = Some(original);
        self
    }
}

/// Reorder layers back-to-front by part kind.
pub fn sort_by_stacking(layers: &mut [SceneLayer<'_>]) {
    layers.sort_by_key(|l| l.kind.stacking_index());
}

/// Draws scenes. Holds no per-frame state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compositor {
    sampling: Sampling,
    overlay_opacity: f64,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(Sampling::default(), DEFAULT_OVERLAY_OPACITY)
    }
}

impl Compositor {
    pub fn new(sampling: Sampling, overlay_opacity: f64) -> Self {
        let overlay_opacity = if overlay_opacity.is_finite() {
            overlay_opacity.clamp(0.0, 1.0)
        } else {
            DEFAULT_OVERLAY_OPACITY
        };
        Self {
            sampling,
            overlay_opacity,
        }
    }

    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    pub fn overlay_opacity(&self) -> f64 {
        self.overlay_opacity
    }

    /// Render one frame: template, layers in the given order, then overlays.
    pub fn render(&self, template: &TemplateGeometry, layers: &[SceneLayer<'_>]) -> Surface {
        let side = template.canvas_px();
        let mut surface = Surface::new(side, side);
        self.draw_template(&mut surface, template);

        for layer in layers {
            match &layer.cutout {
                Some(cutout) => self.draw_texels(&mut surface, cutout, &layer.transform, 1.0),
                None => self.draw_placeholder(&mut surface, template, layer),
            }
        }

        for layer in layers {
            if let Some(original) = layer.original {
                let opaque = Opaque(original);
                self.draw_texels(&mut surface, &opaque, &layer.transform, self.overlay_opacity);
            }
        }

        surface
    }

    /// Checkerboard background plus one outline per guide.
    pub fn draw_template(&self, surface: &mut Surface, template: &TemplateGeometry) {
        surface.fill_checkerboard(CHECKER_CELL, CHECKER_LIGHT, CHECKER_DARK);

        let center = template.center();
        for guide in template.guides() {
            match guide.shape {
                GuideShape::Circle { diameter_mm } => {
                    let radius = template.mm_to_scene(diameter_mm) / 2.0;
                    surface.stroke_circle(center, radius, GUIDE_THICKNESS, GUIDE_COLOR);
                }
                GuideShape::Rect {
                    width_mm,
                    height_mm,
                } => {
                    let size = Point::new(template.mm_to_scene(width_mm), template.mm_to_scene(height_mm));
                    surface.stroke_rect(center, size, GUIDE_THICKNESS, GUIDE_COLOR);
                }
            }
        }
    }

    fn draw_placeholder(&self, surface: &mut Surface, template: &TemplateGeometry, layer: &SceneLayer<'_>) {
        let Some(guide) = template.guide_for(layer.kind) else {
            return;
        };
        let center = layer.transform.anchor() + layer.transform.offset();
        match guide.shape {
            GuideShape::Circle { diameter_mm } => {
                let radius = template.mm_to_scene(diameter_mm) / 2.0;
                surface.fill_circle(center, radius, PLACEHOLDER_COLOR);
            }
            GuideShape::Rect {
                width_mm,
                height_mm,
            } => {
                let size = Point::new(template.mm_to_scene(width_mm), template.mm_to_scene(height_mm));
                surface.fill_rect(center, size, PLACEHOLDER_COLOR);
            }
        }
    }

    /// Tint the cutout area by missing alpha (`255 - composited`) at half
    /// strength.
    pub fn draw_heatmap(
        &self,
        surface: &mut Surface,
        dims: (u32, u32),
        composited: &[u8],
        transform: &TransformModel,
    ) {
        if composited.len() != (dims.0 as usize) * (dims.1 as usize) {
            log::warn!(
                "heatmap skipped: {} alpha values for {}x{} image",
                composited.len(),
                dims.0,
                dims.1
            );
            return;
        }
        let heat = MissingAlpha {
            dims,
            alpha: composited,
        };
        self.draw_texels(surface, &heat, transform, 1.0);
    }

    /// Draw `source` through `transform`, sampling at each scene pixel
    /// center and scaling alpha by `opacity`.
    pub fn draw_texels<T: Texels + ?Sized>(
        &self,
        surface: &mut Surface,
        source: &T,
        transform: &TransformModel,
        opacity: f64,
    ) {
        let dims = source.dimensions();
        if dims.0 == 0 || dims.1 == 0 || opacity <= 0.0 {
            return;
        }

        let (min, max) = transform.scene_bounds(dims);
        let Some((x0, y0, x1, y1)) = surface.clip(min, max) else {
            return;
        };

        for y in y0..=y1 {
            for x in x0..=x1 {
                let scene = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let p = transform.inverse(scene, dims);
                let Some(mut texel) = sample(source, p.x, p.y, self.sampling) else {
                    continue;
                };
                if opacity < 1.0 {
                    texel[3] = (texel[3] as f64 * opacity).round() as u8;
                }
                surface.blend_pixel(x, y, texel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Guide, PartDimensions};

    const RED: [u8; 4] = [255, 0, 0, 255];

    fn solid(width: u32, height: u32, color: [u8; 4]) -> DecodedImage {
        DecodedImage::new(width, height, color.repeat((width * height) as usize))
    }

    #[test]
    fn test_cutout_rejects_wrong_alpha_len() {
        let img = solid(2, 2, RED);
        assert!(Cutout::new(&img, &[255; 3]).is_none());
        assert!(Cutout::new(&img, &[255; 4]).is_some());
    }

    #[test]
    fn test_cutout_rgba_uses_composited_alpha() {
        let img = solid(2, 1, RED);
        let alpha = [10, 200];
        let cutout = Cutout::new(&img, &alpha).unwrap();
        assert_eq!(cutout.to_rgba(), vec![255, 0, 0, 10, 255, 0, 0, 200]);
        assert_eq!(cutout.texel(1, 0), [255, 0, 0, 200]);
    }

    #[test]
    fn test_identity_draws_centered() {
        let img = solid(4, 4, RED);
        let alpha = [255u8; 16];
        let cutout = Cutout::new(&img, &alpha).unwrap();
        let mut surface = Surface::new(8, 8);
        let t = TransformModel::identity(Point::new(4.0, 4.0));

        Compositor::default().draw_texels(&mut surface, &cutout, &t, 1.0);

        for y in 0..8 {
            for x in 0..8 {
                let inside = (2..6).contains(&x) && (2..6).contains(&y);
                let expected = if inside { RED } else { [0, 0, 0, 0] };
                assert_eq!(surface.pixel(x, y), expected, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_zero_alpha_leaves_background() {
        let img = solid(4, 4, RED);
        let alpha = [0u8; 16];
        let cutout = Cutout::new(&img, &alpha).unwrap();
        let mut surface = Surface::filled(8, 8, [1, 2, 3, 255]);
        let t = TransformModel::identity(Point::new(4.0, 4.0));

        Compositor::default().draw_texels(&mut surface, &cutout, &t, 1.0);
        assert!(surface.pixels().chunks(4).all(|p| p == [1, 2, 3, 255]));
    }

    #[test]
    fn test_quarter_turn_rotates_clockwise() {
        // 2x2 image with a distinct color per texel
        let img = DecodedImage::new(
            2,
            2,
            vec![
                1, 0, 0, 255, 2, 0, 0, 255, // top row
                3, 0, 0, 255, 4, 0, 0, 255, // bottom row
            ],
        );
        let mut surface = Surface::new(4, 4);
        let t = TransformModel::new(Point::new(2.0, 2.0), 90.0, 1.0, Point::ORIGIN);

        Compositor::default().draw_texels(&mut surface, &img, &t, 1.0);

        assert_eq!(surface.pixel(2, 1)[0], 1);
        assert_eq!(surface.pixel(2, 2)[0], 2);
        assert_eq!(surface.pixel(1, 1)[0], 3);
        assert_eq!(surface.pixel(1, 2)[0], 4);
        assert_eq!(surface.pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_opacity_scales_alpha() {
        let img = solid(2, 2, RED);
        let mut surface = Surface::new(2, 2);
        let t = TransformModel::identity(Point::new(1.0, 1.0));

        Compositor::default().draw_texels(&mut surface, &img, &t, 0.35);
        assert_eq!(surface.pixel(0, 0), [255, 0, 0, 89]);
    }

    #[test]
    fn test_render_empty_template() {
        let template = TemplateGeometry::default();
        let surface = Compositor::default().render(&template, &[]);
        assert_eq!(surface.dimensions(), (240, 240));
        assert_eq!(surface.pixel(0, 0), CHECKER_LIGHT);
        assert_eq!(surface.pixel(CHECKER_CELL, 0), CHECKER_DARK);
    }

    #[test]
    fn test_render_dial_guide_ring() {
        let dims = PartDimensions {
            diameter_mm: Some(30.0),
            ..Default::default()
        };
        let template = TemplateGeometry::for_part(PartKind::Dial, &dims, 60.0, 0.25);
        let surface = Compositor::default().render(&template, &[]);

        // 30 mm => 120 px diameter around (120, 120)
        assert_eq!(surface.pixel(180, 120), GUIDE_COLOR);
        assert_eq!(surface.pixel(120, 60), GUIDE_COLOR);
        assert_ne!(surface.pixel(150, 120), GUIDE_COLOR);
    }

    #[test]
    fn test_render_placeholder_without_cutout() {
        let mut template = TemplateGeometry::default();
        template.add_guide(Guide {
            kind: PartKind::Dial,
            shape: GuideShape::Circle { diameter_mm: 30.0 },
        });
        let t = TransformModel::identity(template.center());
        let empty = Compositor::default().render(&template, &[]);
        let with_placeholder =
            Compositor::default().render(&template, &[SceneLayer::placeholder(PartKind::Dial, t)]);

        assert_ne!(with_placeholder.pixel(125, 125), empty.pixel(125, 125));
        assert_eq!(with_placeholder.pixel(5, 5), empty.pixel(5, 5));
    }

    #[test]
    fn test_render_overlay_shows_original() {
        let template = TemplateGeometry::default();
        let img = solid(20, 20, RED);
        let alpha = vec![0u8; 400];
        let cutout = Cutout::new(&img, &alpha).unwrap();
        let t = TransformModel::identity(template.center());

        let layer = SceneLayer::with_cutout(PartKind::Case, t, cutout);
        let plain = Compositor::default().render(&template, &[layer]);
        let overlaid = Compositor::default().render(&template, &[layer.with_original(&img)]);

        assert_eq!(plain.pixel(120, 120), CHECKER_LIGHT);
        let p = overlaid.pixel(120, 120);
        assert_eq!(p[0], 255);
        assert!(p[1] < 255);
    }

    #[test]
    fn test_overlay_ignores_source_alpha() {
        let template = TemplateGeometry::default();
        let img = solid(20, 20, [255, 0, 0, 0]);
        let alpha = vec![0u8; 400];
        let cutout = Cutout::new(&img, &alpha).unwrap();
        let t = TransformModel::identity(template.center());
        let layer = SceneLayer::with_cutout(PartKind::Case, t, cutout).with_original(&img);

        let surface = Compositor::default().render(&template, &[layer]);

        // 0.35 of opaque red over the light checker cell
        assert_eq!(surface.pixel(120, 120), [255, 166, 166, 255]);
        assert_eq!(surface.pixel(5, 5), CHECKER_LIGHT);
    }

    #[test]
    fn test_later_layer_wins_overlap() {
        let template = TemplateGeometry::default();
        let red = solid(4, 4, RED);
        let blue = solid(4, 4, [0, 0, 255, 255]);
        let alpha = [255u8; 16];
        let center = template.center();
        let red_layer = SceneLayer::with_cutout(
            PartKind::Case,
            TransformModel::identity(center),
            Cutout::new(&red, &alpha).unwrap(),
        );
        let blue_layer = SceneLayer::with_cutout(
            PartKind::Dial,
            TransformModel::new(center, 0.0, 1.0, Point::new(2.0, 0.0)),
            Cutout::new(&blue, &alpha).unwrap(),
        );
        let compositor = Compositor::default();

        // red covers x 118..122, blue covers x 120..124
        let blue_on_top = compositor.render(&template, &[red_layer, blue_layer]);
        assert_eq!(blue_on_top.pixel(121, 120), [0, 0, 255, 255]);
        assert_eq!(blue_on_top.pixel(118, 120), RED);
        assert_eq!(blue_on_top.pixel(123, 120), [0, 0, 255, 255]);

        let red_on_top = compositor.render(&template, &[blue_layer, red_layer]);
        assert_eq!(red_on_top.pixel(121, 120), RED);
        assert_eq!(red_on_top.pixel(118, 120), RED);
        assert_eq!(red_on_top.pixel(123, 120), [0, 0, 255, 255]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let template = TemplateGeometry::default();
        let img = solid(30, 10, [10, 200, 30, 255]);
        let alpha: Vec<u8> = (0..300).map(|i| (i % 256) as u8).collect();
        let cutout = Cutout::new(&img, &alpha).unwrap();
        let t = TransformModel::new(template.center(), 33.0, 1.7, Point::new(5.0, -8.0));
        let layers = [SceneLayer::with_cutout(PartKind::Strap, t, cutout)];

        let c = Compositor::new(Sampling::Bilinear, 0.35);
        assert_eq!(c.render(&template, &layers), c.render(&template, &layers));
    }

    #[test]
    fn test_heatmap_tints_missing_alpha() {
        let alpha = [0u8, 255];
        let mut surface = Surface::filled(2, 1, [255, 255, 255, 255]);
        let t = TransformModel::identity(Point::new(1.0, 0.5));

        Compositor::default().draw_heatmap(&mut surface, (2, 1), &alpha, &t);

        let missing = surface.pixel(0, 0);
        assert!(missing[0] < 255);
        assert_eq!(missing[2], 255);
        assert_eq!(surface.pixel(1, 0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_sort_by_stacking() {
        let t = TransformModel::identity(Point::ORIGIN);
        let mut layers = [
            SceneLayer::placeholder(PartKind::Crown, t),
            SceneLayer::placeholder(PartKind::Dial, t),
            SceneLayer::placeholder(PartKind::Case, t),
        ];
        sort_by_stacking(&mut layers);
        let kinds: Vec<_> = layers.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![PartKind::Case, PartKind::Dial, PartKind::Crown]);
    }

    #[test]
    fn test_overlay_opacity_clamped() {
        assert_eq!(Compositor::new(Sampling::Nearest, 3.0).overlay_opacity(), 1.0);
        assert_eq!(
            Compositor::new(Sampling::Nearest, f64::NAN).overlay_opacity(),
            DEFAULT_OVERLAY_OPACITY
        );
    }
}
