//! Colour filter chain.
//!
//! Applies the four colour controls to RGBA pixel data using the CSS Filter
//! Effects definitions, so software output matches a browser canvas with
//! `ctx.filter` set to the same values.
//!
//! ## Pass Order
//! 1. Brightness
//! 2. Saturate
//! 3. Contrast
//! 4. Hue-rotate
//!
//! Each pass clamps to [0, 1] before the next one runs, which is why the
//! order is observable.

use crate::transform::ColorAdjustments;

/// A single filter pass. Amounts are fractions (1.0 = unchanged) except
/// hue, which is in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorPass {
    Brightness(f32),
    Saturate(f32),
    Contrast(f32),
    HueRotate(f32),
}

impl ColorPass {
    /// Resolve the pass into per-pixel coefficients.
    fn prepare(&self) -> PreparedPass {
        match *self {
            ColorPass::Brightness(amount) => PreparedPass::Linear {
                slope: amount,
                intercept: 0.0,
            },
            ColorPass::Contrast(amount) => PreparedPass::Linear {
                slope: amount,
                intercept: 0.5 - 0.5 * amount,
            },
            ColorPass::Saturate(amount) => PreparedPass::Matrix(saturate_matrix(amount)),
            ColorPass::HueRotate(degrees) => PreparedPass::Matrix(hue_rotate_matrix(degrees)),
        }
    }
}

enum PreparedPass {
    Linear { slope: f32, intercept: f32 },
    Matrix([[f32; 3]; 3]),
}

/// Ordered colour filter chain built from [`ColorAdjustments`].
///
/// Passes whose control sits at its default are left out, so an all-default
/// chain is empty and leaves pixels bit-for-bit untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColorFilter {
    passes: Vec<ColorPass>,
}

impl ColorFilter {
    /// The empty chain.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_adjustments(adj: &ColorAdjustments) -> Self {
        let mut passes = Vec::with_capacity(4);
        if adj.brightness != 100.0 {
            passes.push(ColorPass::Brightness((adj.brightness / 100.0) as f32));
        }
        if adj.saturation != 100.0 {
            passes.push(ColorPass::Saturate((adj.saturation / 100.0) as f32));
        }
        if adj.contrast != 100.0 {
            passes.push(ColorPass::Contrast((adj.contrast / 100.0) as f32));
        }
        if adj.hue != 0.0 {
            passes.push(ColorPass::HueRotate(adj.hue as f32));
        }
        Self { passes }
    }

    pub fn passes(&self) -> &[ColorPass] {
        &self.passes
    }

    pub fn is_identity(&self) -> bool {
        self.passes.is_empty()
    }

    /// Filter a single RGBA pixel. Alpha is passed through.
    pub fn apply_pixel(&self, rgba: [u8; 4]) -> [u8; 4] {
        if self.is_identity() {
            return rgba;
        }
        let prepared = self.prepare();
        let mut out = rgba;
        run_passes(&prepared, &mut out);
        out
    }

    /// Filter RGBA pixel data in place.
    pub fn apply_in_place(&self, pixels: &mut [u8]) {
        if self.is_identity() {
            return;
        }
        let prepared = self.prepare();
        for chunk in pixels.chunks_exact_mut(4) {
            run_passes(&prepared, chunk);
        }
    }

    fn prepare(&self) -> Vec<PreparedPass> {
        self.passes.iter().map(ColorPass::prepare).collect()
    }

    /// The equivalent CSS `filter` value, for front ends that let the browser
    /// do the filtering.
    pub fn to_css(adj: &ColorAdjustments) -> String {
        format!(
            "brightness({}%) saturate({}%) contrast({}%) hue-rotate({}deg)",
            adj.brightness, adj.saturation, adj.contrast, adj.hue
        )
    }
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v * 255.0).round() as u8
}

/// Run prepared passes over the RGB channels of one RGBA pixel.
#[inline]
fn run_passes(prepared: &[PreparedPass], px: &mut [u8]) {
    let mut r = px[0] as f32 / 255.0;
    let mut g = px[1] as f32 / 255.0;
    let mut b = px[2] as f32 / 255.0;

    for pass in prepared {
        (r, g, b) = match pass {
            // Brightness is slope only; contrast pivots around mid grey
            PreparedPass::Linear { slope, intercept } => (
                r * slope + intercept,
                g * slope + intercept,
                b * slope + intercept,
            ),
            PreparedPass::Matrix(m) => apply_matrix(m, r, g, b),
        };
        (r, g, b) = (r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0));
    }

    px[0] = to_u8(r);
    px[1] = to_u8(g);
    px[2] = to_u8(b);
}

#[inline]
fn apply_matrix(m: &[[f32; 3]; 3], r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    (
        m[0][0] * r + m[0][1] * g + m[0][2] * b,
        m[1][0] * r + m[1][1] * g + m[1][2] * b,
        m[2][0] * r + m[2][1] * g + m[2][2] * b,
    )
}

fn saturate_matrix(s: f32) -> [[f32; 3]; 3] {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> [[f32; 3]; 3] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}
