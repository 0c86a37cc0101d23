//! Rendering of the working bitmap into a surface.
//!
//! The [`Surface`] trait is the seam to whatever actually holds pixels: the
//! bundled [`PixelSurface`] software buffer, or a browser canvas on the
//! other side of the bindings.
//!
//! # Render Steps
//!
//! 1. Clear the surface
//! 2. Resolve the colour filter chain
//! 3. Translate to the surface centre
//! 4. Scale by `render_scale * flip` on each axis
//! 5. Rotate by the quadrant
//! 6. Draw the bitmap centred on the origin

mod surface;

pub use surface::{InterpolationFilter, PixelSurface};

use tracing::{debug, warn};

use crate::bitmap::{Bitmap, PixelRect};
use crate::color::ColorFilter;
use crate::transform::{view_matrix, Affine, TransformState};
use crate::viewport::{checked_surface_size, ViewportError, ViewportExtent};

/// A pixel surface the renderer can paint into.
pub trait Surface {
    /// Size of the underlying pixel buffer.
    fn pixel_size(&self) -> (u32, u32);

    /// Reallocate the buffer. Contents are discarded. On error the old
    /// buffer is kept.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), ViewportError>;

    /// Make every pixel transparent.
    fn clear(&mut self);

    /// Paint `bitmap` through `matrix` (bitmap pixels to surface pixels),
    /// filtering colour with `filter`.
    fn draw_transformed(&mut self, bitmap: &Bitmap, matrix: &Affine, filter: &ColorFilter);

    /// Copy a rectangle out of the surface, clamped to its bounds.
    fn read_region(&self, rect: PixelRect) -> Option<Bitmap>;

    /// Stroke a dashed one-pixel outline just inside `rect`.
    fn stroke_outline(&mut self, rect: PixelRect, dash: u32);
}

/// Resize `surface` to the extent required by `state` if it differs.
/// Returns the extent in effect afterwards.
///
/// Fails with [`ViewportError::SurfaceTooLarge`] and leaves the surface
/// untouched when the extent is past the surface limits.
pub fn fit_surface<S: Surface>(
    surface: &mut S,
    bitmap: &Bitmap,
    state: &TransformState,
    render_scale: f64,
) -> Result<ViewportExtent, ViewportError> {
    let extent = checked_surface_size(bitmap.width, bitmap.height, state.rotation, render_scale)
        .inspect_err(|e| warn!(error = %e, "cannot size rendering surface"))?;
    if surface.pixel_size() != (extent.width, extent.height) {
        debug!(
            width = extent.width,
            height = extent.height,
            "resize rendering surface"
        );
        surface.resize(extent.width, extent.height)?;
    }
    Ok(extent)
}

/// Paint `bitmap` into `surface` under `state`, colour filter included.
///
/// `render_scale` is the full scale in surface pixels per bitmap pixel.
pub fn render<S: Surface>(
    surface: &mut S,
    bitmap: &Bitmap,
    state: &TransformState,
    render_scale: f64,
) {
    let filter = ColorFilter::from_adjustments(&state.color);
    paint(surface, bitmap, state, render_scale, &filter);
}

/// Paint geometry only, leaving colour untouched.
pub fn render_geometry<S: Surface>(
    surface: &mut S,
    bitmap: &Bitmap,
    state: &TransformState,
    render_scale: f64,
) {
    paint(surface, bitmap, state, render_scale, &ColorFilter::identity());
}

fn paint<S: Surface>(
    surface: &mut S,
    bitmap: &Bitmap,
    state: &TransformState,
    render_scale: f64,
    filter: &ColorFilter,
) {
    surface.clear();
    let (surface_width, surface_height) = surface.pixel_size();
    let matrix = view_matrix(
        state,
        bitmap.width,
        bitmap.height,
        surface_width,
        surface_height,
        render_scale,
    );
    surface.draw_transformed(bitmap, &matrix, filter);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{reduce, Action, ColorParam};

    /// Bitmap where each pixel encodes its own position.
    fn test_bitmap(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 100, 255]);
            }
        }
        Bitmap::new(width, height, pixels)
    }

    fn rendered(bitmap: &Bitmap, state: &TransformState, scale: f64) -> Bitmap {
        let mut surface = PixelSurface::empty();
        fit_surface(&mut surface, bitmap, state, scale).unwrap();
        render(&mut surface, bitmap, state, scale);
        surface.bitmap().clone()
    }

    #[test]
    fn test_identity_render_reproduces_bitmap() {
        let bmp = test_bitmap(7, 5);
        assert_eq!(rendered(&bmp, &TransformState::new(), 1.0), bmp);
    }

    #[test]
    fn test_fit_surface_resizes_only_on_change() {
        let bmp = test_bitmap(8, 4);
        let state = reduce(TransformState::new(), Action::Rotate);
        let mut surface = PixelSurface::empty();
        let extent = fit_surface(&mut surface, &bmp, &state, 0.5).unwrap();
        assert_eq!(extent, ViewportExtent::new(2, 4));
        assert_eq!(surface.pixel_size(), (2, 4));
    }

    #[test]
    fn test_fit_surface_rejects_oversized_extent() {
        let bmp = test_bitmap(8, 4);
        let state = TransformState::new();
        let mut surface = PixelSurface::empty();
        fit_surface(&mut surface, &bmp, &state, 1.0).unwrap();

        let err = fit_surface(&mut surface, &bmp, &state, 1e6);
        assert!(matches!(err, Err(ViewportError::SurfaceTooLarge { .. })));
        assert_eq!(surface.pixel_size(), (8, 4));
    }

    #[test]
    fn test_half_scale_samples_every_other_pixel() {
        let bmp = test_bitmap(8, 6);
        let out = rendered(&bmp, &TransformState::new(), 0.5);
        assert_eq!(out.dimensions(), (4, 3));
        assert_eq!(out.pixel(0, 0), Some([1, 1, 100, 255]));
        assert_eq!(out.pixel(3, 2), Some([7, 5, 100, 255]));
    }

    #[test]
    fn test_rotate_90_clockwise() {
        let bmp = test_bitmap(4, 2);
        let state = reduce(TransformState::new(), Action::Rotate);
        let out = rendered(&bmp, &state, 1.0);
        assert_eq!(out.dimensions(), (2, 4));
        // Source (0, 1) is bottom-left; after a clockwise quarter turn it is top-left
        assert_eq!(out.pixel(0, 0), Some([0, 1, 100, 255]));
        assert_eq!(out.pixel(1, 0), Some([0, 0, 100, 255]));
        assert_eq!(out.pixel(1, 3), Some([3, 0, 100, 255]));
    }

    #[test]
    fn test_rotate_180() {
        let bmp = test_bitmap(3, 2);
        let state = reduce(reduce(TransformState::new(), Action::Rotate), Action::Rotate);
        let out = rendered(&bmp, &state, 1.0);
        assert_eq!(out.pixel(0, 0), Some([2, 1, 100, 255]));
        assert_eq!(out.pixel(2, 1), Some([0, 0, 100, 255]));
    }

    #[test]
    fn test_flip_horizontal_mirrors() {
        let bmp = test_bitmap(5, 3);
        let state = reduce(TransformState::new(), Action::FlipHorizontal);
        let out = rendered(&bmp, &state, 1.0);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(out.pixel(x, y), bmp.pixel(4 - x, y));
            }
        }
    }

    #[test]
    fn test_flip_vertical_mirrors() {
        let bmp = test_bitmap(5, 3);
        let state = reduce(TransformState::new(), Action::FlipVertical);
        let out = rendered(&bmp, &state, 1.0);
        assert_eq!(out.pixel(0, 0), bmp.pixel(0, 2));
    }

    #[test]
    fn test_flip_then_rotate_differs_from_rotate_then_flip_on_screen() {
        // Scale-with-flip is applied before the rotation, so a horizontal
        // flip of a rotated image mirrors the screen, not the source
        let bmp = test_bitmap(4, 2);
        let rotated = reduce(TransformState::new(), Action::Rotate);
        let flipped = reduce(rotated, Action::FlipHorizontal);
        let a = rendered(&bmp, &rotated, 1.0);
        let b = rendered(&bmp, &flipped, 1.0);
        for y in 0..4 {
            for x in 0..2 {
                assert_eq!(b.pixel(x, y), a.pixel(1 - x, y));
            }
        }
    }

    #[test]
    fn test_double_flip_is_bit_exact() {
        let bmp = test_bitmap(9, 4);
        let state = reduce(TransformState::new(), Action::Rotate);
        let twice = reduce(reduce(state, Action::FlipHorizontal), Action::FlipHorizontal);
        assert_eq!(rendered(&bmp, &state, 0.75), rendered(&bmp, &twice, 0.75));
    }

    #[test]
    fn test_color_is_applied_in_render_but_not_geometry_pass() {
        let bmp = Bitmap::filled(2, 2, [200, 100, 50, 255]);
        let state = reduce(
            TransformState::new(),
            Action::SetColor(ColorParam::Brightness, 50.0),
        );

        let mut surface = PixelSurface::new(2, 2).unwrap();
        render(&mut surface, &bmp, &state, 1.0);
        assert_eq!(surface.pixel(0, 0), Some([100, 50, 25, 255]));

        render_geometry(&mut surface, &bmp, &state, 1.0);
        assert_eq!(surface.pixel(0, 0), Some([200, 100, 50, 255]));
    }

    #[test]
    fn test_render_clears_previous_frame() {
        let mut surface = PixelSurface::new(4, 4).unwrap();
        render(&mut surface, &Bitmap::filled(4, 4, [9, 9, 9, 255]), &TransformState::new(), 1.0);
        // A smaller bitmap centred leaves a transparent border
        render(&mut surface, &Bitmap::filled(2, 2, [1, 1, 1, 255]), &TransformState::new(), 1.0);
        assert_eq!(surface.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(1, 1), Some([1, 1, 1, 255]));
    }
}
