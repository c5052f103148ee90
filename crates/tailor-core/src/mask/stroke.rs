//! Brush strokes and the recorder that captures one gesture.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Smallest and largest brush radius in image pixels.
pub const MIN_RADIUS: f64 = 1.0;
pub const MAX_RADIUS: f64 = 500.0;

/// Which way a stroke pushes the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Adds opacity back (sign +1).
    #[default]
    Restore,
    /// Removes opacity (sign -1).
    Erase,
}

impl Tool {
    #[inline]
    pub fn sign(self) -> i16 {
        match self {
            Tool::Restore => 1,
            Tool::Erase => -1,
        }
    }
}

/// Brush state selected by the user; copied into each stroke at its start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    pub tool: Tool,
    /// Radius in image pixels.
    pub radius: f64,
    /// Width of the soft edge, 0 (hard) to 100 (ramp from the center).
    pub softness: f64,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            tool: Tool::Restore,
            radius: 40.0,
            softness: 65.0,
        }
    }
}

impl BrushSettings {
    pub fn new(tool: Tool, radius: f64, softness: f64) -> Self {
        Self {
            tool,
            radius,
            softness,
        }
        .sanitized()
    }

    /// Clamp radius and softness into their valid ranges.
    pub fn sanitized(self) -> Self {
        let radius = if self.radius.is_finite() {
            self.radius.clamp(MIN_RADIUS, MAX_RADIUS)
        } else {
            BrushSettings::default().radius
        };
        let softness = if self.softness.is_finite() {
            self.softness.clamp(0.0, 100.0)
        } else {
            BrushSettings::default().softness
        };
        Self {
            tool: self.tool,
            radius,
            softness,
        }
    }
}

/// One committed brush gesture. Immutable once it enters history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    tool: Tool,
    radius: f64,
    softness: f64,
    points: Vec<Point>,
}

impl Stroke {
    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn sign(&self) -> i16 {
        self.tool.sign()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn softness(&self) -> f64 {
        self.softness
    }

    /// Ordered image-space path; never empty.
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// Captures a gesture from pointer-down to pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeRecorder {
    brush: BrushSettings,
    points: Vec<Point>,
}

impl StrokeRecorder {
    /// Start recording at `point` with the given brush.
    pub fn begin(point: Point, brush: BrushSettings) -> Self {
        Self {
            brush: brush.sanitized(),
            points: vec![point],
        }
    }

    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    /// Append a point, returning the previous one (the segment start).
    pub fn push(&mut self, point: Point) -> Point {
        let previous = self.last();
        self.points.push(point);
        previous
    }

    pub fn last(&self) -> Point {
        // `begin` guarantees at least one point
        self.points[self.points.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Freeze the recorded gesture into a stroke.
    pub fn finish(self) -> Stroke {
        Stroke {
            tool: self.brush.tool,
            radius: self.brush.radius,
            softness: self.brush.softness,
            points: self.points,
        }
    }
}
