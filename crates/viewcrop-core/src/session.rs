//! Viewer session.
//!
//! A [`Session`] owns the working bitmap, its [`TransformState`], the
//! rendering surface and the crop selection. Every change that affects the
//! picture marks the session dirty; [`Session::render_if_dirty`] repaints.
//!
//! # Loading
//!
//! Decoding happens outside the session. Call [`Session::begin_load`] when an
//! upload starts and hand the decoded result to [`Session::complete_load`]
//! together with the ticket. Only the most recently issued ticket can install
//! a bitmap; older completions are discarded.

use thiserror::Error;
use tracing::{debug, warn};

use crate::bitmap::Bitmap;
use crate::color::ColorFilter;
use crate::config::ViewerConfig;
use crate::crop::CropEngine;
use crate::decode::DecodeError;
use crate::encode::{encode, EncodeError, ExportFormat};
use crate::mapper::{CoordinateMapper, DisplayRect, Point};
use crate::render::{fit_surface, render, render_geometry, PixelSurface, Surface};
use crate::transform::{reduce, Action, TransformState};
use crate::viewport::{checked_surface_size, fit_scale, ViewportError, ViewportExtent};

/// Errors surfaced by [`Session`] operations. State is unchanged whenever
/// one of these is returned.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation needs a loaded bitmap.
    #[error("No image loaded")]
    NoImage,

    /// Pointer input arrived before the surface was rendered for the
    /// current geometry.
    #[error("Surface is out of date; render before mapping pointer input")]
    StaleSurface,

    #[error(transparent)]
    Viewport(#[from] ViewportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Handle for one in-flight load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of [`Session::complete_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The bitmap is now the working bitmap.
    Installed { width: u32, height: u32 },
    /// A newer load was started; the result was dropped.
    Stale,
}

/// Interactive viewer state for one working bitmap.
#[derive(Debug)]
pub struct Session {
    config: ViewerConfig,
    bitmap: Option<Bitmap>,
    state: TransformState,
    fit: f64,
    surface: PixelSurface,
    crop: CropEngine,
    dirty: bool,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl Session {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            bitmap: None,
            state: TransformState::new(),
            fit: 1.0,
            surface: PixelSurface::empty().with_filter(config.sample_filter),
            crop: CropEngine::new(),
            dirty: false,
            generation: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }

    pub fn state(&self) -> &TransformState {
        &self.state
    }

    pub fn crop(&self) -> &CropEngine {
        &self.crop
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    /// Fit-to-container scale of the current bitmap.
    pub fn fit_scale(&self) -> f64 {
        self.fit
    }

    /// Surface pixels per bitmap pixel: fit scale times logical zoom.
    pub fn render_scale(&self) -> f64 {
        self.fit * self.state.scale
    }

    /// Surface extent for the current bitmap and state. `None` without a
    /// bitmap or when the extent is past the surface limits.
    pub fn extent(&self) -> Option<ViewportExtent> {
        self.checked_extent().ok()
    }

    fn checked_extent(&self) -> Result<ViewportExtent, SessionError> {
        let bitmap = self.bitmap.as_ref().ok_or(SessionError::NoImage)?;
        let extent = checked_surface_size(
            bitmap.width,
            bitmap.height,
            self.state.rotation,
            self.render_scale(),
        )?;
        Ok(extent)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Generation of the most recently issued load ticket.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Start a load. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation = self.generation.wrapping_add(1);
        debug!(generation = self.generation, "load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Whether `ticket` is the most recently issued one. Lets a caller skip
    /// decoding an upload that has already been superseded.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Finish the load identified by `ticket`.
    ///
    /// A stale ticket is dropped whatever its result. A decode failure or a
    /// zero-sized bitmap leaves the previous bitmap in place and is returned
    /// as an error.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Bitmap, DecodeError>,
    ) -> Result<LoadOutcome, SessionError> {
        if !self.is_current(ticket) {
            warn!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded load"
            );
            return Ok(LoadOutcome::Stale);
        }

        let bitmap = result.inspect_err(|e| warn!(error = %e, "decode failed"))?;
        let fit = fit_scale(
            self.config.container_width,
            self.config.container_height,
            bitmap.width,
            bitmap.height,
        )
        .inspect_err(|e| warn!(error = %e, "rejecting loaded bitmap"))?;

        let (width, height) = bitmap.dimensions();
        debug!(generation = ticket.generation, width, height, fit, "load completed");

        self.bitmap = Some(bitmap);
        self.state = TransformState::new();
        self.fit = fit;
        self.crop.cancel();
        self.dirty = true;
        Ok(LoadOutcome::Installed { width, height })
    }

    /// Install an already decoded bitmap, superseding any load in flight.
    pub fn load_bitmap(&mut self, bitmap: Bitmap) -> Result<LoadOutcome, SessionError> {
        let ticket = self.begin_load();
        self.complete_load(ticket, Ok(bitmap))
    }

    // ------------------------------------------------------------------
    // Transform
    // ------------------------------------------------------------------

    /// Apply `action` to the transform state. Returns true if the state
    /// changed.
    ///
    /// A geometry change invalidates the selection, since it no longer marks
    /// the same pixels.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let next = reduce(self.state, action);
        if next == self.state {
            return false;
        }
        if action.affects_geometry() {
            self.crop.cancel();
        }
        self.state = next;
        self.dirty = true;
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.dispatch(Action::ZoomIn(self.config.effective_zoom_step()))
    }

    pub fn zoom_out(&mut self) -> bool {
        self.dispatch(Action::ZoomOut(self.config.effective_zoom_step()))
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Repaint if anything changed since the last render. Returns true if a
    /// render happened.
    pub fn render_if_dirty(&mut self) -> Result<bool, SessionError> {
        if !self.dirty || self.bitmap.is_none() {
            return Ok(false);
        }
        self.render()?;
        Ok(true)
    }

    /// Paint the bitmap with colour, then the selection outline if any.
    ///
    /// When the view would exceed the surface limits the previous frame and
    /// the dirty flag are kept, and the caller can dispatch a smaller scale.
    pub fn render(&mut self) -> Result<ViewportExtent, SessionError> {
        let scale = self.render_scale();
        let bitmap = self.bitmap.as_ref().ok_or(SessionError::NoImage)?;

        let extent = fit_surface(&mut self.surface, bitmap, &self.state, scale)?;
        render(&mut self.surface, bitmap, &self.state, scale);
        if let Some(rect) = self.crop.commit_rect(extent.width, extent.height) {
            self.surface.stroke_outline(rect, self.config.overlay_dash);
        }

        self.dirty = false;
        Ok(extent)
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    /// Mapper for the rendered surface shown at `display`.
    ///
    /// The display ratio is taken against the surface buffer the host is
    /// showing, so a geometry change must be rendered before pointer input
    /// is mapped again; until then this returns [`SessionError::StaleSurface`].
    pub fn mapper(&self, display: DisplayRect) -> Result<CoordinateMapper, SessionError> {
        let bitmap = self.bitmap.as_ref().ok_or(SessionError::NoImage)?;
        let extent = self.checked_extent()?;
        let mapper = CoordinateMapper::new(
            display,
            extent,
            bitmap.width,
            bitmap.height,
            &self.state,
            self.render_scale(),
        )?;
        if self.surface.pixel_size() != (extent.width, extent.height) {
            return Err(SessionError::StaleSurface);
        }
        Ok(mapper)
    }

    /// Pointer pressed at display position `at`. Starts a new selection if
    /// the position is on the surface; returns whether it did.
    pub fn pointer_down(&mut self, at: Point, display: DisplayRect) -> Result<bool, SessionError> {
        let mapper = self.mapper(display)?;
        let p = mapper.to_surface(at);
        let (width, height) = self.surface.pixel_size();
        let inside = p.x >= 0.0 && p.y >= 0.0 && p.x <= width as f64 && p.y <= height as f64;
        if !inside {
            return Ok(false);
        }
        self.crop.begin(p);
        self.dirty = true;
        Ok(true)
    }

    /// Pointer moved. Extends the selection while a drag is active.
    pub fn pointer_move(&mut self, at: Point, display: DisplayRect) -> Result<bool, SessionError> {
        let mapper = self.mapper(display)?;
        let changed = self.crop.update(mapper.to_surface(at));
        if changed {
            self.dirty = true;
        }
        Ok(changed)
    }

    /// Pointer released. The selection stays until committed or replaced.
    pub fn pointer_up(&mut self) {
        self.crop.end();
    }

    /// Pointer left the surface. Same as a release.
    pub fn pointer_leave(&mut self) {
        self.crop.end();
    }

    /// Drop the selection without cropping.
    pub fn cancel_selection(&mut self) {
        if self.crop.selection().is_some() {
            self.dirty = true;
        }
        self.crop.cancel();
    }

    // ------------------------------------------------------------------
    // Crop
    // ------------------------------------------------------------------

    /// Replace the working bitmap with the selected part of the view.
    ///
    /// The region is read from a geometry-only render so the colour filter,
    /// which stays in the transform state, is not applied twice. Afterwards
    /// geometry is back at identity and the bitmap is re-fitted.
    ///
    /// Returns `Ok(false)` without touching any state when there is nothing
    /// to crop (no image, no selection, or a zero-area selection).
    pub fn commit_crop(&mut self) -> Result<bool, SessionError> {
        let Some(bitmap) = self.bitmap.as_ref() else {
            return Ok(false);
        };
        if self.crop.selection().is_none() {
            return Ok(false);
        }
        let scale = self.render_scale();
        let extent = checked_surface_size(bitmap.width, bitmap.height, self.state.rotation, scale)?;
        let Some(rect) = self.crop.commit_rect(extent.width, extent.height) else {
            debug!("ignoring degenerate crop");
            return Ok(false);
        };

        let mut scratch = PixelSurface::empty().with_filter(self.config.sample_filter);
        fit_surface(&mut scratch, bitmap, &self.state, scale)?;
        render_geometry(&mut scratch, bitmap, &self.state, scale);
        let Some(cropped) = scratch.read_region(rect) else {
            return Ok(false);
        };

        let fit = fit_scale(
            self.config.container_width,
            self.config.container_height,
            cropped.width,
            cropped.height,
        )?;

        debug!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            "crop committed"
        );

        self.bitmap = Some(cropped);
        self.state = self.state.with_identity_geometry();
        self.fit = fit;
        self.crop.finish_commit();
        self.dirty = true;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Encode the working bitmap. With `bake_color` the colour adjustments
    /// are applied to the exported pixels; geometry is never applied since
    /// it only describes the view.
    pub fn export(&self, format: ExportFormat, bake_color: bool) -> Result<Vec<u8>, SessionError> {
        let bitmap = self.bitmap.as_ref().ok_or(SessionError::NoImage)?;
        let filter = ColorFilter::from_adjustments(&self.state.color);

        let bytes = if bake_color && !filter.is_identity() {
            let mut baked = bitmap.clone();
            filter.apply_in_place(&mut baked.pixels);
            encode(&baked, format, self.config.jpeg_quality)?
        } else {
            encode(bitmap, format, self.config.jpeg_quality)?
        };
        Ok(bytes)
    }
}
