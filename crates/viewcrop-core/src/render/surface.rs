//! Software rendering surface.
//!
//! [`PixelSurface`] is an RGBA buffer that behaves like a 2D canvas for the
//! operations the viewer needs. Drawing uses inverse mapping: for each
//! destination pixel centre we find the source position under the inverse
//! matrix and sample it.

use serde::{Deserialize, Serialize};

use super::Surface;
use crate::bitmap::{Bitmap, PixelRect};
use crate::color::ColorFilter;
use crate::transform::Affine;
use crate::viewport::ViewportError;

/// Sampling used when drawing a bitmap through a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationFilter {
    /// Nearest source pixel. Exact for quadrant rotations and flips.
    #[default]
    Nearest,
    /// Four-tap bilinear, smoother when zoomed.
    Bilinear,
}

/// An RGBA pixel buffer implementing [`Surface`].
#[derive(Debug, Clone, PartialEq)]
pub struct PixelSurface {
    buffer: Bitmap,
    filter: InterpolationFilter,
}

impl PixelSurface {
    /// A transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self, ViewportError> {
        Ok(Self {
            buffer: allocate(width, height)?,
            filter: InterpolationFilter::default(),
        })
    }

    /// A zero-sized surface, resized on first render.
    pub fn empty() -> Self {
        Self {
            buffer: Bitmap::new(0, 0, Vec::new()),
            filter: InterpolationFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: InterpolationFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn interpolation(&self) -> InterpolationFilter {
        self.filter
    }

    /// Current contents.
    pub fn bitmap(&self) -> &Bitmap {
        &self.buffer
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.buffer.pixel(x, y)
    }
}

fn allocate(width: u32, height: u32) -> Result<Bitmap, ViewportError> {
    Bitmap::transparent(width, height).ok_or(ViewportError::SurfaceTooLarge {
        width: width as f64,
        height: height as f64,
    })
}

impl Surface for PixelSurface {
    fn pixel_size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), ViewportError> {
        // Like assigning canvas.width: contents are discarded even if unchanged
        self.buffer = allocate(width, height)?;
        Ok(())
    }

    fn clear(&mut self) {
        self.buffer.pixels.fill(0);
    }

    fn draw_transformed(&mut self, bitmap: &Bitmap, matrix: &Affine, filter: &ColorFilter) {
        if bitmap.is_empty() || self.buffer.is_empty() {
            return;
        }
        let Some(inverse) = matrix.invert() else {
            return;
        };

        // Colour is resolved in image space before any geometry
        let filtered;
        let source = if filter.is_identity() {
            bitmap
        } else {
            let mut copy = bitmap.clone();
            filter.apply_in_place(&mut copy.pixels);
            filtered = copy;
            &filtered
        };

        let (dst_w, dst_h) = self.buffer.dimensions();
        let (min_x, min_y, max_x, max_y) =
            matrix.map_bounds(0.0, 0.0, source.width as f64, source.height as f64);
        let x_start = min_x.floor().max(0.0) as u32;
        let y_start = min_y.floor().max(0.0) as u32;
        let x_end = (max_x.ceil().max(0.0) as u32).min(dst_w);
        let y_end = (max_y.ceil().max(0.0) as u32).min(dst_h);

        for dst_y in y_start..y_end {
            for dst_x in x_start..x_end {
                let (src_x, src_y) = inverse.apply(dst_x as f64 + 0.5, dst_y as f64 + 0.5);

                let sample = match self.filter {
                    InterpolationFilter::Nearest => sample_nearest(source, src_x, src_y),
                    InterpolationFilter::Bilinear => sample_bilinear(source, src_x, src_y),
                };

                if let Some(src) = sample {
                    if let Some(dst) = self.buffer.pixel(dst_x, dst_y) {
                        self.buffer.set_pixel(dst_x, dst_y, source_over(src, dst));
                    }
                }
            }
        }
    }

    fn read_region(&self, rect: PixelRect) -> Option<Bitmap> {
        self.buffer.region(rect)
    }

    fn stroke_outline(&mut self, rect: PixelRect, dash: u32) {
        let rect = rect.clamp_to(self.buffer.width, self.buffer.height);
        if rect.is_empty() {
            return;
        }
        let dash = dash.max(1);
        let right = rect.x + rect.width - 1;
        let bottom = rect.y + rect.height - 1;

        // Alternate black and white so the outline reads on any content
        let colour = |step: u32| {
            if (step / dash) % 2 == 0 {
                [0, 0, 0, 255]
            } else {
                [255, 255, 255, 255]
            }
        };

        for x in rect.x..=right {
            let c = colour(x - rect.x);
            self.buffer.set_pixel(x, rect.y, c);
            self.buffer.set_pixel(x, bottom, c);
        }
        for y in rect.y..=bottom {
            let c = colour(y - rect.y);
            self.buffer.set_pixel(rect.x, y, c);
            self.buffer.set_pixel(right, y, c);
        }
    }
}

/// Sample the pixel containing `(x, y)`, or `None` outside the bitmap.
#[inline]
fn sample_nearest(image: &Bitmap, x: f64, y: f64) -> Option<[u8; 4]> {
    if x < 0.0 || y < 0.0 || x >= image.width as f64 || y >= image.height as f64 {
        return None;
    }
    image.pixel(x.floor() as u32, y.floor() as u32)
}

/// Sample a pixel using bilinear interpolation.
///
/// Pixel centres sit at half-integer positions. Near the border the
/// neighbours are clamped to the edge, so edge pixels keep their colour.
fn sample_bilinear(image: &Bitmap, x: f64, y: f64) -> Option<[u8; 4]> {
    if x < 0.0 || y < 0.0 || x >= image.width as f64 || y >= image.height as f64 {
        return None;
    }

    let fx = (x - 0.5).max(0.0);
    let fy = (y - 0.5).max(0.0);
    let max_x = image.width - 1;
    let max_y = image.height - 1;

    let x0 = (fx.floor() as u32).min(max_x);
    let y0 = (fy.floor() as u32).min(max_y);
    let x1 = (x0 + 1).min(max_x);
    let y1 = (y0 + 1).min(max_y);

    // Fractional distances
    let tx = (fx - x0 as f64).clamp(0.0, 1.0);
    let ty = (fy - y0 as f64).clamp(0.0, 1.0);

    let p00 = image.pixel(x0, y0)?;
    let p10 = image.pixel(x1, y0)?;
    let p01 = image.pixel(x0, y1)?;
    let p11 = image.pixel(x1, y1)?;

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] as f64 * (1.0 - tx) * (1.0 - ty)
            + p10[i] as f64 * tx * (1.0 - ty)
            + p01[i] as f64 * (1.0 - tx) * ty
            + p11[i] as f64 * tx * ty;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    Some(result)
}

/// Straight-alpha source-over compositing.
#[inline]
fn source_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    if src[3] == 255 || dst[3] == 0 {
        return src;
    }
    if src[3] == 0 {
        return dst;
    }

    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        out[i] = c.clamp(0.0, 255.0).round() as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    out
}
