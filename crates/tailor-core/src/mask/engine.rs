//! Mask editing with exact undo/redo.
//!
//! Painting clamps, so a stroke cannot be removed by subtracting its
//! contribution. Undo and redo instead rebuild the correction buffer from
//! zero by replaying every stroke still in history, in order.

use super::rasterizer::{paint_segment, paint_stroke, paint_stroke_start};
use super::{composite_alpha, AlphaBuffer, BrushSettings, CorrectionBuffer, Stroke, StrokeRecorder};
use crate::geometry::Point;

/// Stroke currently being drawn, with its live-painted buffer.
#[derive(Debug, Clone)]
struct OpenStroke {
    recorder: StrokeRecorder,
    working: CorrectionBuffer,
}

/// Owns the base alpha, the correction buffer and the stroke history.
///
/// All mutation goes through its methods; other components only get
/// read-only views.
#[derive(Debug, Clone)]
pub struct MaskEngine {
    base: AlphaBuffer,
    correction: CorrectionBuffer,
    history: Vec<Stroke>,
    redo: Vec<Stroke>,
    open: Option<OpenStroke>,
}

impl MaskEngine {
    /// Create an engine over `base` with an empty history.
    pub fn new(base: AlphaBuffer) -> Self {
        let (width, height) = base.dimensions();
        Self {
            base,
            correction: CorrectionBuffer::new(width, height),
            history: Vec::new(),
            redo: Vec::new(),
            open: None,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.base.dimensions()
    }

    pub fn base(&self) -> &AlphaBuffer {
        &self.base
    }

    /// The correction currently in effect, including an open stroke's paint.
    pub fn correction(&self) -> &CorrectionBuffer {
        match &self.open {
            Some(open) => &open.working,
            None => &self.correction,
        }
    }

    /// Committed strokes in replay order.
    pub fn history(&self) -> &[Stroke] {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn is_stroking(&self) -> bool {
        self.open.is_some()
    }

    /// Open a stroke at `point` and paint its first dot.
    ///
    /// If a stroke is already open it is abandoned and replaced.
    pub fn start_stroke(&mut self, point: Point, brush: BrushSettings) {
        if self.open.take().is_some() {
            log::debug!("replacing unfinished stroke");
        }

        let recorder = StrokeRecorder::begin(point, brush);
        let brush = recorder.brush();
        let mut working = self.correction.clone();
        paint_stroke_start(
            &mut working,
            point,
            brush.radius,
            brush.softness,
            brush.tool.sign(),
        );

        self.open = Some(OpenStroke { recorder, working });
    }

    /// Append `point` to the open stroke and paint the segment to it.
    ///
    /// No-op when no stroke is open.
    pub fn extend_stroke(&mut self, point: Point) {
        let Some(open) = self.open.as_mut() else {
            return;
        };

        let brush = open.recorder.brush();
        let previous = open.recorder.push(point);
        paint_segment(
            &mut open.working,
            previous,
            point,
            brush.radius,
            brush.softness,
            brush.tool.sign(),
        );
    }

    /// Commit the open stroke into history and rebuild the correction.
    ///
    /// Returns `false` if there was no stroke to commit.
    pub fn commit_stroke(&mut self) -> bool {
        let Some(open) = self.open.take() else {
            return false;
        };

        let stroke = open.recorder.finish();
        log::debug!(
            "committing {:?} stroke with {} points",
            stroke.tool(),
            stroke.points().len()
        );

        self.history.push(stroke);
        self.redo.clear();
        self.rebuild();
        debug_assert_eq!(self.correction, open.working);
        true
    }

    /// Abandon the open stroke, discarding its paint.
    pub fn cancel_stroke(&mut self) {
        self.open = None;
    }

    /// Move the most recent stroke to the redo stack.
    pub fn undo(&mut self) -> bool {
        self.cancel_stroke();
        let Some(stroke) = self.history.pop() else {
            return false;
        };
        self.redo.push(stroke);
        self.rebuild();
        true
    }

    /// Restore the most recently undone stroke.
    pub fn redo(&mut self) -> bool {
        self.cancel_stroke();
        let Some(stroke) = self.redo.pop() else {
            return false;
        };
        self.history.push(stroke);
        self.rebuild();
        true
    }

    /// Clear history and correction. The base alpha is untouched.
    pub fn reset(&mut self) {
        self.open = None;
        self.history.clear();
        self.redo.clear();
        self.correction.clear();
    }

    /// Swap in a new base alpha of the same size and reset all edits.
    ///
    /// Returns `false` (leaving everything unchanged) on a size mismatch.
    pub fn replace_base(&mut self, base: AlphaBuffer) -> bool {
        if base.dimensions() != self.base.dimensions() {
            return false;
        }
        self.base = base;
        self.reset();
        true
    }

    /// Recompute the correction from zero by replaying history.
    pub fn rebuild(&mut self) {
        self.correction.clear();
        for stroke in &self.history {
            paint_stroke(&mut self.correction, stroke);
        }
        log::debug!("rebuilt correction from {} strokes", self.history.len());
    }

    /// Visible alpha for every pixel.
    pub fn composited_alpha(&self) -> Vec<u8> {
        self.correction().composite(&self.base)
    }

    /// Visible alpha at `(x, y)`, or `None` outside the mask.
    pub fn composited_at(&self, x: u32, y: u32) -> Option<u8> {
        let correction = self.correction().get(x, y)?;
        let idx = (y as usize) * (self.base.dimensions().0 as usize) + x as usize;
        Some(composite_alpha(self.base.values()[idx], correction))
    }
}
