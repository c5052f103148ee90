//! Export artifacts: cutout PNG plus placement metadata.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::composite::{Cutout, Surface};
use crate::decode::DecodedImage;
use crate::geometry::Point;
use crate::template::{PartDimensions, PartKind, TemplateGeometry};
use crate::transform::TransformModel;

use super::{encode_png, EncodeError};

/// Encode the source RGB with `composited` as its alpha channel.
pub fn export_cutout(image: &DecodedImage, composited: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let cutout = Cutout::new(image, composited).ok_or(EncodeError::InvalidPixelData {
        expected: image.pixel_count(),
        actual: composited.len(),
    })?;
    encode_png(&cutout.to_rgba(), image.width, image.height)
}

/// Encode a rendered scene as-is.
pub fn export_scene(surface: &Surface) -> Result<Vec<u8>, EncodeError> {
    encode_png(surface.pixels(), surface.width(), surface.height())
}

/// Where the asset sits relative to the template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformMetadata {
    pub angle_deg: f64,
    pub scale: f64,
    pub offset_px: Point,
    /// Rotation and scale pivot; always the image center.
    pub anchor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasMetadata {
    pub width: u32,
    pub height: u32,
    pub mm_per_px: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetHint {
    #[serde(rename = "type")]
    pub kind: PartKind,
    pub relevant_dimensions_mm: BTreeMap<String, f64>,
}

/// Metadata shipped alongside the exported PNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementMetadata {
    pub transform: TransformMetadata,
    pub template_canvas: CanvasMetadata,
    pub asset_hint: AssetHint,
}

impl PlacementMetadata {
    pub fn new(
        transform: &TransformModel,
        template: &TemplateGeometry,
        kind: PartKind,
        dims: &PartDimensions,
    ) -> Self {
        let side = template.canvas_px();
        Self {
            transform: TransformMetadata {
                angle_deg: transform.angle_deg(),
                scale: transform.scale(),
                offset_px: transform.offset(),
                anchor: "center".to_string(),
            },
            template_canvas: CanvasMetadata {
                width: side,
                height: side,
                mm_per_px: template.mm_per_px(),
            },
            asset_hint: AssetHint {
                kind,
                relevant_dimensions_mm: dims.relevant(kind),
            },
        }
    }
}

/// Finished export, ready for upload by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub png: Vec<u8>,
    pub metadata: PlacementMetadata,
}

impl ExportArtifact {
    pub fn metadata_json(&self) -> Result<String, EncodeError> {
        serde_json::to_string(&self.metadata).map_err(|e| EncodeError::Metadata(e.to_string()))
    }
}

/// Builds export artifacts for one part against one template.
#[derive(Debug, Clone, Copy)]
pub struct ExportEncoder<'a> {
    template: &'a TemplateGeometry,
    kind: PartKind,
    dims: &'a PartDimensions,
}

impl<'a> ExportEncoder<'a> {
    pub fn new(template: &'a TemplateGeometry, kind: PartKind, dims: &'a PartDimensions) -> Self {
        Self {
            template,
            kind,
            dims,
        }
    }

    /// Cutout PNG (source RGB, composited alpha) plus placement metadata.
    pub fn encode(
        &self,
        image: &DecodedImage,
        composited: &[u8],
        transform: &TransformModel,
    ) -> Result<ExportArtifact, EncodeError> {
        let png = export_cutout(image, composited)?;
        let metadata = PlacementMetadata::new(transform, self.template, self.kind, self.dims);
        log::debug!(
            "exported {}x{} {} cutout ({} bytes)",
            image.width,
            image.height,
            self.kind.as_str(),
            png.len()
        );
        Ok(ExportArtifact { png, metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 10) as u8, (y * 10) as u8, 77, 255]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_export_cutout_alpha_and_rgb() {
        let img = gradient_image(4, 3);
        let composited: Vec<u8> = (0..12).map(|i| (i * 20) as u8).collect();

        let png = export_cutout(&img, &composited).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();

        assert_eq!(decoded.dimensions(), (4, 3));
        for (i, px) in decoded.pixels().enumerate() {
            let x = (i % 4) as u32;
            let y = (i / 4) as u32;
            let src = img.rgba(x, y);
            assert_eq!(px.0, [src[0], src[1], src[2], composited[i]]);
        }
    }

    #[test]
    fn test_export_cutout_rejects_wrong_alpha() {
        let img = gradient_image(4, 3);
        let result = export_cutout(&img, &[0u8; 5]);
        assert!(matches!(
            result,
            Err(EncodeError::InvalidPixelData {
                expected: 12,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_export_scene() {
        let surface = Surface::filled(5, 7, [1, 2, 3, 4]);
        let png = export_scene(&surface).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (5, 7));
        assert_eq!(decoded.get_pixel(4, 6).0, [1, 2, 3, 4]);
    }

    #[test]
    fn test_metadata_json_shape() {
        let template = TemplateGeometry::default();
        let transform = TransformModel::new(template.center(), 90.0, 1.5, Point::new(12.0, -4.0));
        let dims = PartDimensions {
            width_mm: Some(40.0),
            lug_to_lug_mm: Some(47.5),
            thickness_mm: Some(11.0),
            diameter_mm: Some(99.0),
            ..Default::default()
        };
        let metadata = PlacementMetadata::new(&transform, &template, PartKind::Case, &dims);
        let json: serde_json::Value = serde_json::to_value(&metadata).unwrap();

        assert_eq!(json["transform"]["angleDeg"], 90.0);
        assert_eq!(json["transform"]["scale"], 1.5);
        assert_eq!(json["transform"]["offsetPx"]["x"], 12.0);
        assert_eq!(json["transform"]["offsetPx"]["y"], -4.0);
        assert_eq!(json["transform"]["anchor"], "center");
        assert_eq!(json["templateCanvas"]["width"], 240);
        assert_eq!(json["templateCanvas"]["height"], 240);
        assert_eq!(json["templateCanvas"]["mmPerPx"], 0.25);
        assert_eq!(json["assetHint"]["type"], "cases");

        let relevant = json["assetHint"]["relevantDimensionsMm"].as_object().unwrap();
        let keys: Vec<_> = relevant.keys().cloned().collect();
        assert_eq!(keys, vec!["lugToLug", "thickness", "width"]);
    }

    #[test]
    fn test_export_is_reproducible() {
        let template = TemplateGeometry::default();
        let dims = PartDimensions {
            diameter_mm: Some(30.0),
            ..Default::default()
        };
        let img = gradient_image(8, 8);
        let composited: Vec<u8> = (0..64).map(|i| (i * 4) as u8).collect();
        let transform = TransformModel::new(template.center(), 12.5, 0.8, Point::new(3.0, 3.0));

        let encoder = ExportEncoder::new(&template, PartKind::Dial, &dims);
        let first = encoder.encode(&img, &composited, &transform).unwrap();
        let second = encoder.encode(&img, &composited, &transform).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.metadata_json().unwrap(), second.metadata_json().unwrap());
    }
}
