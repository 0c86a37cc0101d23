//! Coordinate mapping between display, surface and image space.
//!
//! Three spaces are involved:
//!
//! - **Display space**: pointer coordinates as delivered by the input source
//!   (client pixels). The surface occupies [`DisplayRect`] in this space and
//!   may be drawn larger or smaller than its pixel buffer.
//! - **Surface space**: pixels of the rendering surface buffer. Selections
//!   and crops live here.
//! - **Image space**: pixels of the working bitmap before any transform.
//!
//! Display to surface only undoes the display ratio. Surface to image
//! additionally inverts the view matrix (translate, scale with flip, rotate).

use serde::{Deserialize, Serialize};

use crate::transform::{view_matrix, Affine, TransformState};
use crate::viewport::{ViewportError, ViewportExtent};

/// A point in any of the three spaces.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// On-screen bounds of the rendering surface, in display coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl DisplayRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A display rect drawn at exactly the surface's pixel size.
    pub fn unscaled(extent: ViewportExtent) -> Self {
        Self::new(0.0, 0.0, extent.width as f64, extent.height as f64)
    }
}

/// An axis-aligned rectangle with float coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Converts points between display, surface and image space for one
/// frame's geometry.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    display: DisplayRect,
    ratio_x: f64,
    ratio_y: f64,
    view: Affine,
    inverse: Affine,
}

impl CoordinateMapper {
    /// Build a mapper for a surface of `surface` pixels shown at `display`,
    /// holding a `bitmap_width` x `bitmap_height` bitmap rendered under `state`
    /// at `render_scale`.
    ///
    /// Fails instead of producing NaN or infinity when any dimension is zero.
    pub fn new(
        display: DisplayRect,
        surface: ViewportExtent,
        bitmap_width: u32,
        bitmap_height: u32,
        state: &TransformState,
        render_scale: f64,
    ) -> Result<Self, ViewportError> {
        if surface.is_empty() {
            return Err(ViewportError::ZeroSurface {
                width: surface.width,
                height: surface.height,
            });
        }
        if !(display.width > 0.0 && display.height > 0.0)
            || !display.width.is_finite()
            || !display.height.is_finite()
        {
            return Err(ViewportError::ZeroDisplay {
                width: display.width,
                height: display.height,
            });
        }
        if bitmap_width == 0 || bitmap_height == 0 {
            return Err(ViewportError::ZeroBitmap {
                width: bitmap_width,
                height: bitmap_height,
            });
        }

        let view = view_matrix(
            state,
            bitmap_width,
            bitmap_height,
            surface.width,
            surface.height,
            render_scale,
        );
        let inverse = view.invert().ok_or(ViewportError::InvalidScale(render_scale))?;

        Ok(Self {
            display,
            ratio_x: display.width / surface.width as f64,
            ratio_y: display.height / surface.height as f64,
            view,
            inverse,
        })
    }

    /// Display-to-pixel ratio `(x, y)`: display units per surface pixel.
    pub fn display_ratio(&self) -> (f64, f64) {
        (self.ratio_x, self.ratio_y)
    }

    /// Pointer position to surface pixel coordinates.
    pub fn to_surface(&self, pointer: Point) -> Point {
        Point::new(
            (pointer.x - self.display.left) / self.ratio_x,
            (pointer.y - self.display.top) / self.ratio_y,
        )
    }

    /// Surface pixel coordinates back to a display position.
    pub fn to_display(&self, surface: Point) -> Point {
        Point::new(
            surface.x * self.ratio_x + self.display.left,
            surface.y * self.ratio_y + self.display.top,
        )
    }

    /// Surface pixel coordinates to source bitmap coordinates.
    pub fn surface_to_image(&self, surface: Point) -> Point {
        let (x, y) = self.inverse.apply(surface.x, surface.y);
        Point::new(x, y)
    }

    /// Source bitmap coordinates to surface pixel coordinates.
    pub fn image_to_surface(&self, image: Point) -> Point {
        let (x, y) = self.view.apply(image.x, image.y);
        Point::new(x, y)
    }

    /// Pointer position straight to source bitmap coordinates.
    pub fn to_image(&self, pointer: Point) -> Point {
        self.surface_to_image(self.to_surface(pointer))
    }

    /// Source bitmap coordinates to a display position.
    pub fn from_image(&self, image: Point) -> Point {
        self.to_display(self.image_to_surface(image))
    }

    /// Bounds in image space of a surface rectangle. Under quadrant rotation
    /// and flips the mapping is exact, so the result is the same rectangle
    /// seen from the source bitmap.
    pub fn surface_rect_to_image(&self, rect: RectF) -> RectF {
        let (min_x, min_y, max_x, max_y) =
            self.inverse.map_bounds(rect.x, rect.y, rect.width, rect.height);
        RectF {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{reduce, Action};

    fn assert_close(actual: Point, expected: Point) {
        assert!(
            (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    fn identity_mapper(display: DisplayRect, extent: ViewportExtent) -> CoordinateMapper {
        CoordinateMapper::new(
            display,
            extent,
            extent.width,
            extent.height,
            &TransformState::new(),
            1.0,
        )
        .unwrap()
    }

    #[test]
    fn test_unscaled_display_subtracts_offset_only() {
        let m = identity_mapper(
            DisplayRect::new(10.0, 20.0, 400.0, 300.0),
            ViewportExtent::new(400, 300),
        );
        assert_close(m.to_surface(Point::new(60.0, 70.0)), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_display_ratio_is_divided_out() {
        // Surface buffer 400x300 shown at 200x150 on screen
        let m = identity_mapper(
            DisplayRect::new(0.0, 0.0, 200.0, 150.0),
            ViewportExtent::new(400, 300),
        );
        assert_eq!(m.display_ratio(), (0.5, 0.5));
        assert_close(m.to_surface(Point::new(50.0, 30.0)), Point::new(100.0, 60.0));
        assert_close(m.to_display(Point::new(100.0, 60.0)), Point::new(50.0, 30.0));
    }

    #[test]
    fn test_scaled_image_mapping() {
        // 800x600 bitmap at half scale on a 400x300 surface
        let m = CoordinateMapper::new(
            DisplayRect::unscaled(ViewportExtent::new(400, 300)),
            ViewportExtent::new(400, 300),
            800,
            600,
            &TransformState::new(),
            0.5,
        )
        .unwrap();
        assert_close(m.to_image(Point::new(100.0, 50.0)), Point::new(200.0, 100.0));
        assert_close(m.from_image(Point::new(200.0, 100.0)), Point::new(100.0, 50.0));
    }

    #[test]
    fn test_rotated_image_mapping() {
        // 800x600 bitmap rotated 90 degrees at half scale: 300x400 surface
        let state = reduce(TransformState::new(), Action::Rotate);
        let m = CoordinateMapper::new(
            DisplayRect::unscaled(ViewportExtent::new(300, 400)),
            ViewportExtent::new(300, 400),
            800,
            600,
            &state,
            0.5,
        )
        .unwrap();
        // Surface top-right corner is the source top-left
        assert_close(m.surface_to_image(Point::new(300.0, 0.0)), Point::new(0.0, 0.0));
        // Surface top-left corner is the source bottom-left
        assert_close(m.surface_to_image(Point::new(0.0, 0.0)), Point::new(0.0, 600.0));
    }

    #[test]
    fn test_flipped_image_mapping() {
        let state = reduce(TransformState::new(), Action::FlipHorizontal);
        let m = CoordinateMapper::new(
            DisplayRect::unscaled(ViewportExtent::new(100, 50)),
            ViewportExtent::new(100, 50),
            100,
            50,
            &state,
            1.0,
        )
        .unwrap();
        assert_close(m.to_image(Point::new(10.0, 5.0)), Point::new(90.0, 5.0));
    }

    #[test]
    fn test_surface_rect_to_image() {
        let state = reduce(TransformState::new(), Action::Rotate);
        let m = CoordinateMapper::new(
            DisplayRect::unscaled(ViewportExtent::new(20, 40)),
            ViewportExtent::new(20, 40),
            40,
            20,
            &state,
            1.0,
        )
        .unwrap();
        let r = m.surface_rect_to_image(RectF {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 5.0,
        });
        assert_eq!((r.x, r.y, r.width, r.height), (0.0, 10.0, 5.0, 10.0));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let state = TransformState::new();
        let display = DisplayRect::new(0.0, 0.0, 100.0, 100.0);

        assert!(matches!(
            CoordinateMapper::new(display, ViewportExtent::new(0, 10), 10, 10, &state, 1.0),
            Err(ViewportError::ZeroSurface { .. })
        ));
        assert!(matches!(
            CoordinateMapper::new(
                DisplayRect::new(0.0, 0.0, 0.0, 100.0),
                ViewportExtent::new(10, 10),
                10,
                10,
                &state,
                1.0
            ),
            Err(ViewportError::ZeroDisplay { .. })
        ));
        assert!(matches!(
            CoordinateMapper::new(display, ViewportExtent::new(10, 10), 0, 10, &state, 1.0),
            Err(ViewportError::ZeroBitmap { .. })
        ));
        assert!(matches!(
            CoordinateMapper::new(display, ViewportExtent::new(10, 10), 10, 10, &state, 0.0),
            Err(ViewportError::InvalidScale(_))
        ));
    }
}
