//! Geometric and colour transform state.
//!
//! # Transform Order
//!
//! A render applies the state in this fixed order:
//! 1. Colour filter (brightness, saturate, contrast, hue-rotate)
//! 2. Translate to the surface centre
//! 3. Scale, with the flip signs folded into the scale factors
//! 4. Rotate by the quadrant
//! 5. Draw the bitmap centred on the origin
//!
//! Swapping steps 3 and 4 gives different output for non-square bitmaps.
//!
//! # Coordinate System
//!
//! - Rotation is in 90 degree steps, positive = clockwise on screen
//! - Origin is the top-left corner, y grows downward

mod affine;
mod state;

pub use affine::Affine;
pub use state::{
    reduce, Action, ColorAdjustments, ColorParam, Flip, Quadrant, TransformState, MIN_SCALE,
};

/// Build the matrix mapping bitmap pixels onto a `surface_width` x
/// `surface_height` surface for the given state and render scale.
///
/// `render_scale` is the full scale (fit scale times logical zoom).
pub fn view_matrix(
    state: &TransformState,
    bitmap_width: u32,
    bitmap_height: u32,
    surface_width: u32,
    surface_height: u32,
    render_scale: f64,
) -> Affine {
    Affine::IDENTITY
        .translate(surface_width as f64 / 2.0, surface_height as f64 / 2.0)
        .scale(
            render_scale * state.flip_horizontal.sign(),
            render_scale * state.flip_vertical.sign(),
        )
        .rotate(state.rotation)
        .translate(-(bitmap_width as f64) / 2.0, -(bitmap_height as f64) / 2.0)
}
