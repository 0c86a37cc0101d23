//! Viewport sizing.
//!
//! Computes the initial fit-to-container scale for a freshly loaded bitmap and
//! the pixel extent of the rendering surface for a given rotation and scale.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::transform::Quadrant;

/// Largest surface side in pixels, matching the canvas limit of common browsers.
pub const MAX_SURFACE_DIM: u32 = 32_767;

/// Largest surface area in pixels (16384 x 16384).
pub const MAX_SURFACE_AREA: u64 = 268_435_456;

/// Precondition failures for operations that divide by a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ViewportError {
    /// The container has no area.
    #[error("Invalid container size: {width}x{height}")]
    ZeroContainer { width: u32, height: u32 },

    /// The bitmap has no area.
    #[error("Invalid bitmap size: {width}x{height}")]
    ZeroBitmap { width: u32, height: u32 },

    /// The rendering surface has no pixels.
    #[error("Invalid surface size: {width}x{height}")]
    ZeroSurface { width: u32, height: u32 },

    /// The on-screen rectangle of the surface has no area.
    #[error("Invalid display size: {width}x{height}")]
    ZeroDisplay { width: f64, height: f64 },

    /// The render scale collapses the view matrix.
    #[error("Invalid render scale: {0}")]
    InvalidScale(f64),

    /// The requested surface exceeds [`MAX_SURFACE_DIM`] or [`MAX_SURFACE_AREA`].
    #[error("Surface too large: {width}x{height}")]
    SurfaceTooLarge { width: f64, height: f64 },
}

/// Rendering surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewportExtent {
    pub width: u32,
    pub height: u32,
}

impl ViewportExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Largest scale <= 1 at which the bitmap fits inside the container.
///
/// Never upscales: a bitmap smaller than the container gets `1.0`.
pub fn fit_scale(
    container_width: u32,
    container_height: u32,
    bitmap_width: u32,
    bitmap_height: u32,
) -> Result<f64, ViewportError> {
    if container_width == 0 || container_height == 0 {
        return Err(ViewportError::ZeroContainer {
            width: container_width,
            height: container_height,
        });
    }
    if bitmap_width == 0 || bitmap_height == 0 {
        return Err(ViewportError::ZeroBitmap {
            width: bitmap_width,
            height: bitmap_height,
        });
    }

    let scale_x = container_width as f64 / bitmap_width as f64;
    let scale_y = container_height as f64 / bitmap_height as f64;
    Ok(scale_x.min(scale_y).min(1.0))
}

/// Surface extent for a bitmap drawn at `scale` with the given rotation.
///
/// Dimensions past `u32::MAX` saturate; use [`checked_surface_size`] before
/// allocating anything of this size.
///
/// Width and height swap for 90 and 270 degrees, then both are multiplied by
/// `scale` and rounded to the nearest pixel. The rounding can shift the
/// reconstructed position by at most one pixel; that drift is accepted.
/// A non-empty bitmap never yields an empty surface.
pub fn surface_size(
    bitmap_width: u32,
    bitmap_height: u32,
    rotation: Quadrant,
    scale: f64,
) -> ViewportExtent {
    let (w, h) = if rotation.swaps_axes() {
        (bitmap_height, bitmap_width)
    } else {
        (bitmap_width, bitmap_height)
    };

    let scaled = |len: u32| -> u32 {
        if len == 0 {
            return 0;
        }
        ((len as f64 * scale).round() as u32).max(1)
    };

    ViewportExtent::new(scaled(w), scaled(h))
}

/// [`surface_size`], rejecting extents a surface could not hold.
pub fn checked_surface_size(
    bitmap_width: u32,
    bitmap_height: u32,
    rotation: Quadrant,
    scale: f64,
) -> Result<ViewportExtent, ViewportError> {
    let (w, h) = if rotation.swaps_axes() {
        (bitmap_height, bitmap_width)
    } else {
        (bitmap_width, bitmap_height)
    };
    let width = w as f64 * scale;
    let height = h as f64 * scale;
    let too_large = || ViewportError::SurfaceTooLarge { width, height };

    // NaN fails every comparison, so test for "within bounds" and negate
    let max = MAX_SURFACE_DIM as f64 + 0.5;
    if !(width < max && height < max) {
        return Err(too_large());
    }

    let extent = surface_size(bitmap_width, bitmap_height, rotation, scale);
    if extent.width as u64 * extent.height as u64 > MAX_SURFACE_AREA {
        return Err(too_large());
    }
    Ok(extent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_scale_downscales() {
        assert_eq!(fit_scale(400, 300, 800, 600).unwrap(), 0.5);
    }

    #[test]
    fn test_fit_scale_uses_tighter_axis() {
        // 1000x250 into 500x500: width is the constraint
        assert_eq!(fit_scale(500, 500, 1000, 250).unwrap(), 0.5);
        assert_eq!(fit_scale(500, 500, 250, 2000).unwrap(), 0.25);
    }

    #[test]
    fn test_fit_scale_never_upscales() {
        assert_eq!(fit_scale(600, 400, 100, 50).unwrap(), 1.0);
        assert_eq!(fit_scale(600, 400, 600, 400).unwrap(), 1.0);
    }

    #[test]
    fn test_fit_scale_rejects_zero_dimensions() {
        assert_eq!(
            fit_scale(0, 300, 800, 600),
            Err(ViewportError::ZeroContainer {
                width: 0,
                height: 300
            })
        );
        assert_eq!(
            fit_scale(400, 300, 800, 0),
            Err(ViewportError::ZeroBitmap {
                width: 800,
                height: 0
            })
        );
    }

    #[test]
    fn test_surface_size_scenario() {
        let extent = surface_size(800, 600, Quadrant::Deg0, 0.5);
        assert_eq!(extent, ViewportExtent::new(400, 300));

        let rotated = surface_size(800, 600, Quadrant::Deg90, 0.5);
        assert_eq!(rotated, ViewportExtent::new(300, 400));
    }

    #[test]
    fn test_surface_size_swaps_only_for_90_and_270() {
        assert_eq!(surface_size(30, 20, Quadrant::Deg0, 1.0), ViewportExtent::new(30, 20));
        assert_eq!(surface_size(30, 20, Quadrant::Deg90, 1.0), ViewportExtent::new(20, 30));
        assert_eq!(surface_size(30, 20, Quadrant::Deg180, 1.0), ViewportExtent::new(30, 20));
        assert_eq!(surface_size(30, 20, Quadrant::Deg270, 1.0), ViewportExtent::new(20, 30));
    }

    #[test]
    fn test_surface_size_rounds_to_nearest() {
        // 101 * 0.5 = 50.5 rounds up, 99 * 0.5 = 49.5 rounds up
        assert_eq!(surface_size(101, 99, Quadrant::Deg0, 0.5), ViewportExtent::new(51, 50));
        // 10 * 1.1 = 11.000000000000002
        assert_eq!(surface_size(10, 10, Quadrant::Deg0, 1.1), ViewportExtent::new(11, 11));
    }

    #[test]
    fn test_checked_surface_size_limits() {
        assert_eq!(
            checked_surface_size(800, 600, Quadrant::Deg90, 0.5),
            Ok(ViewportExtent::new(300, 400))
        );
        assert_eq!(
            checked_surface_size(MAX_SURFACE_DIM, 1, Quadrant::Deg0, 1.0),
            Ok(ViewportExtent::new(MAX_SURFACE_DIM, 1))
        );
        assert!(matches!(
            checked_surface_size(MAX_SURFACE_DIM + 1, 1, Quadrant::Deg0, 1.0),
            Err(ViewportError::SurfaceTooLarge { .. })
        ));
        // Each side fits but the area does not
        assert!(matches!(
            checked_surface_size(16_384, 16_385, Quadrant::Deg0, 1.0),
            Err(ViewportError::SurfaceTooLarge { .. })
        ));
        // 1000x800 zoomed 100x
        assert!(matches!(
            checked_surface_size(1000, 800, Quadrant::Deg0, 100.0),
            Err(ViewportError::SurfaceTooLarge { .. })
        ));
        assert!(checked_surface_size(100, 100, Quadrant::Deg0, 1e9).is_err());
    }

    #[test]
    fn test_surface_size_minimum_one_pixel() {
        assert_eq!(surface_size(10, 10, Quadrant::Deg0, 0.01), ViewportExtent::new(1, 1));
        assert!(surface_size(0, 10, Quadrant::Deg0, 1.0).is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
