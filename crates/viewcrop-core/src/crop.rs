//! Interactive crop selection.
//!
//! The selection lives in surface pixel space: pointer positions are mapped
//! through [`CoordinateMapper::to_surface`](crate::mapper::CoordinateMapper::to_surface)
//! before they reach the engine, and the committed rectangle is read from a
//! surface rendered with the same geometry. Preview and commit therefore see
//! the same pixels.
//!
//! # States
//!
//! ```text
//! Idle --pointer down--> Selecting --pointer move--> Selecting
//! Selecting --pointer up / leave--> Idle (selection retained)
//! Idle | Selecting --commit--> Idle (selection consumed)
//! ```

use serde::{Deserialize, Serialize};

use crate::bitmap::PixelRect;
use crate::mapper::{Point, RectF};

/// A drag rectangle anchored at the pointer-down position.
///
/// `width` and `height` follow the drag direction and may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionRect {
    pub start_x: f64,
    pub start_y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    /// Zero-size selection at `origin`.
    pub fn at(origin: Point) -> Self {
        Self {
            start_x: origin.x,
            start_y: origin.y,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Rectangle with non-negative width and height covering the same area.
    pub fn normalized(&self) -> RectF {
        RectF {
            x: self.start_x.min(self.start_x + self.width),
            y: self.start_y.min(self.start_y + self.height),
            width: self.width.abs(),
            height: self.height.abs(),
        }
    }

    /// Whole pixels covered on a `surface_width` x `surface_height` surface.
    ///
    /// Edges round to the nearest pixel boundary and the result is clipped to
    /// the surface. Returns `None` when no pixel remains.
    pub fn to_pixels(&self, surface_width: u32, surface_height: u32) -> Option<PixelRect> {
        let rect = self.normalized();
        if !(rect.x.is_finite() && rect.y.is_finite() && rect.width.is_finite() && rect.height.is_finite()) {
            return None;
        }

        let edge = |v: f64, max: u32| v.round().clamp(0.0, max as f64) as u32;
        let left = edge(rect.x, surface_width);
        let top = edge(rect.y, surface_height);
        let right = edge(rect.x + rect.width, surface_width);
        let bottom = edge(rect.y + rect.height, surface_height);

        let pixels = PixelRect::new(left, top, right - left, bottom - top);
        if pixels.is_empty() {
            None
        } else {
            Some(pixels)
        }
    }
}

/// Whether a drag is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CropPhase {
    #[default]
    Idle,
    Selecting,
}

/// Owns the selection lifecycle.
#[derive(Debug, Clone, Default)]
pub struct CropEngine {
    phase: CropPhase,
    selection: Option<SelectionRect>,
}

impl CropEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CropPhase {
        self.phase
    }

    /// The raw selection, if any.
    pub fn selection(&self) -> Option<SelectionRect> {
        self.selection
    }

    /// Start a new drag at `at` (surface space). Any previous selection is
    /// replaced.
    pub fn begin(&mut self, at: Point) {
        self.phase = CropPhase::Selecting;
        self.selection = Some(SelectionRect::at(at));
    }

    /// Extend the drag to `to`. Returns true when the selection changed and
    /// the preview needs repainting. Ignored unless selecting.
    pub fn update(&mut self, to: Point) -> bool {
        if self.phase != CropPhase::Selecting {
            return false;
        }
        let Some(sel) = self.selection.as_mut() else {
            return false;
        };
        let width = to.x - sel.start_x;
        let height = to.y - sel.start_y;
        if width == sel.width && height == sel.height {
            return false;
        }
        sel.width = width;
        sel.height = height;
        true
    }

    /// Pointer released or left the surface. The selection is kept until it
    /// is committed or replaced.
    pub fn end(&mut self) {
        self.phase = CropPhase::Idle;
    }

    /// Drop the selection entirely.
    pub fn cancel(&mut self) {
        self.phase = CropPhase::Idle;
        self.selection = None;
    }

    /// Normalized rectangle to draw as the preview overlay.
    pub fn overlay(&self) -> Option<RectF> {
        self.selection.map(|s| s.normalized())
    }

    /// Pixel rectangle a commit would extract, or `None` for a missing or
    /// degenerate selection. Does not change state.
    pub fn commit_rect(&self, surface_width: u32, surface_height: u32) -> Option<PixelRect> {
        self.selection?.to_pixels(surface_width, surface_height)
    }

    /// Consume the selection after a successful commit.
    pub fn finish_commit(&mut self) {
        self.cancel();
    }
}
