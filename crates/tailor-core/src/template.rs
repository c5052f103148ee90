//! Dimensioned template the cutouts are placed against.
//!
//! Physical sizes come from the part form in millimeters and are converted
//! with a fixed mm-per-pixel constant. The template is read-only while an
//! asset is being edited; it only changes through an explicit rebuild.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Default scale: 0.25 mm per pixel (about 96 DPI).
pub const DEFAULT_MM_PER_PX: f64 = 0.25;

/// Default physical side length of the scene canvas.
pub const DEFAULT_BASELINE_MM: f64 = 60.0;

/// Room left around the largest guide when it outgrows the baseline.
const GUIDE_MARGIN: f64 = 1.25;

/// Largest scene canvas side. Bigger templates are drawn at a coarser scale.
pub const MAX_CANVAS_PX: u32 = 4096;

/// Convert millimeters to whole pixels.
pub fn mm_to_px(mm: f64, mm_per_px: f64) -> u32 {
    if !(mm.is_finite() && mm_per_px.is_finite() && mm > 0.0 && mm_per_px > 0.0) {
        return 0;
    }
    (mm / mm_per_px).round() as u32
}

/// Convert pixels to millimeters.
pub fn px_to_mm(px: f64, mm_per_px: f64) -> f64 {
    px * mm_per_px
}

/// Kinds of watch part an asset can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PartKind {
    #[serde(rename = "cases")]
    Case,
    #[serde(rename = "movements")]
    Movement,
    #[serde(rename = "dials")]
    Dial,
    #[serde(rename = "hands")]
    Hands,
    #[serde(rename = "straps")]
    Strap,
    #[serde(rename = "crowns")]
    Crown,
}

impl PartKind {
    /// Back-to-front drawing order used when composing a full watch.
    pub const STACKING_ORDER: [PartKind; 6] = [
        PartKind::Case,
        PartKind::Movement,
        PartKind::Dial,
        PartKind::Hands,
        PartKind::Strap,
        PartKind::Crown,
    ];

    /// Identifier used in metadata and by the part form.
    pub fn as_str(self) -> &'static str {
        match self {
            PartKind::Case => "cases",
            PartKind::Movement => "movements",
            PartKind::Dial => "dials",
            PartKind::Hands => "hands",
            PartKind::Strap => "straps",
            PartKind::Crown => "crowns",
        }
    }

    /// Inverse of [`PartKind::as_str`].
    pub fn parse(name: &str) -> Option<PartKind> {
        Self::STACKING_ORDER
            .into_iter()
            .find(|kind| kind.as_str() == name)
    }

    /// Position of this kind in [`PartKind::STACKING_ORDER`].
    pub fn stacking_index(self) -> usize {
        Self::STACKING_ORDER
            .iter()
            .position(|&k| k == self)
            .unwrap_or(Self::STACKING_ORDER.len())
    }
}

/// Physical dimensions entered on the part form. All optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PartDimensions {
    pub diameter_mm: Option<f64>,
    pub height_mm: Option<f64>,
    pub width_mm: Option<f64>,
    pub lug_to_lug_mm: Option<f64>,
    pub thickness_mm: Option<f64>,
    pub length_mm: Option<f64>,
}

impl PartDimensions {
    /// Dimensions that matter for `kind`, keyed by name. Missing or
    /// non-positive values are left out.
    pub fn relevant(&self, kind: PartKind) -> BTreeMap<String, f64> {
        let fields: &[(&str, Option<f64>)] = match kind {
            PartKind::Movement => &[("diameter", self.diameter_mm), ("height", self.height_mm)],
            PartKind::Case => &[
                ("width", self.width_mm),
                ("lugToLug", self.lug_to_lug_mm),
                ("thickness", self.thickness_mm),
            ],
            PartKind::Dial => &[("diameter", self.diameter_mm)],
            PartKind::Strap => &[("width", self.width_mm), ("length", self.length_mm)],
            PartKind::Hands | PartKind::Crown => &[],
        };

        fields
            .iter()
            .filter_map(|&(name, value)| {
                value
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .map(|v| (name.to_string(), v))
            })
            .collect()
    }
}

/// Shape of a measurement guide, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum GuideShape {
    Circle { diameter_mm: f64 },
    Rect { width_mm: f64, height_mm: f64 },
}

/// A guide outline centered on the scene center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub kind: PartKind,
    pub shape: GuideShape,
}

impl Guide {
    /// Guide for a part, if its dimensions describe an outline.
    pub fn for_part(kind: PartKind, dims: &PartDimensions) -> Option<Guide> {
        let positive = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0);
        let shape = match kind {
            PartKind::Movement | PartKind::Dial => GuideShape::Circle {
                diameter_mm: positive(dims.diameter_mm)?,
            },
            PartKind::Case => match (positive(dims.width_mm), positive(dims.lug_to_lug_mm)) {
                (Some(width), Some(lug)) => GuideShape::Rect {
                    width_mm: width,
                    height_mm: lug,
                },
                (Some(width), None) => GuideShape::Circle { diameter_mm: width },
                (None, _) => return None,
            },
            PartKind::Strap => GuideShape::Rect {
                width_mm: positive(dims.width_mm)?,
                height_mm: positive(dims.length_mm)?,
            },
            PartKind::Hands | PartKind::Crown => return None,
        };
        Some(Guide { kind, shape })
    }

    /// Largest physical extent of the outline.
    pub fn extent_mm(&self) -> f64 {
        match self.shape {
            GuideShape::Circle { diameter_mm } => diameter_mm,
            GuideShape::Rect {
                width_mm,
                height_mm,
            } => width_mm.max(height_mm),
        }
    }
}

/// Scene canvas size and guides, derived from physical dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateGeometry {
    mm_per_px: f64,
    baseline_mm: f64,
    guides: Vec<Guide>,
}

impl Default for TemplateGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE_MM, DEFAULT_MM_PER_PX)
    }
}

impl TemplateGeometry {
    /// Empty template with a square canvas `baseline_mm` on a side.
    pub fn new(baseline_mm: f64, mm_per_px: f64) -> Self {
        let mm_per_px = if mm_per_px.is_finite() && mm_per_px > 0.0 {
            mm_per_px
        } else {
            DEFAULT_MM_PER_PX
        };
        let baseline_mm = if baseline_mm.is_finite() && baseline_mm > 0.0 {
            baseline_mm
        } else {
            DEFAULT_BASELINE_MM
        };
        Self {
            mm_per_px,
            baseline_mm,
            guides: Vec::new(),
        }
    }

    /// Template for one part, with its guide when the dimensions allow.
    pub fn for_part(kind: PartKind, dims: &PartDimensions, baseline_mm: f64, mm_per_px: f64) -> Self {
        let mut template = Self::new(baseline_mm, mm_per_px);
        if let Some(guide) = Guide::for_part(kind, dims) {
            template.add_guide(guide);
        }
        template
    }

    /// Add a guide, growing the canvas if the guide would not fit.
    pub fn add_guide(&mut self, guide: Guide) {
        self.guides.retain(|g| g.kind != guide.kind);
        let needed = guide.extent_mm() * GUIDE_MARGIN;
        if needed.is_finite() {
            self.baseline_mm = self.baseline_mm.max(needed);
        }
        self.guides.push(guide);
        self.guides.sort_by_key(|g| g.kind.stacking_index());
    }

    /// Scene scale. Coarser than requested once the canvas hits
    /// [`MAX_CANVAS_PX`].
    pub fn mm_per_px(&self) -> f64 {
        self.mm_per_px.max(self.baseline_mm / MAX_CANVAS_PX as f64)
    }

    pub fn baseline_mm(&self) -> f64 {
        self.baseline_mm
    }

    /// Side length of the square scene canvas in pixels.
    pub fn canvas_px(&self) -> u32 {
        mm_to_px(self.baseline_mm, self.mm_per_px()).clamp(1, MAX_CANVAS_PX)
    }

    /// Scene center, the anchor of every placed asset.
    pub fn center(&self) -> Point {
        let side = self.canvas_px() as f64;
        Point::new(side / 2.0, side / 2.0)
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    pub fn guide_for(&self, kind: PartKind) -> Option<&Guide> {
        self.guides.iter().find(|g| g.kind == kind)
    }

    /// Convert a physical length to scene pixels (fractional).
    pub fn mm_to_scene(&self, mm: f64) -> f64 {
        mm / self.mm_per_px()
    }
}
