//! Viewcrop Core - interactive transform and crop engine
//!
//! This crate holds everything the viewer does with pixels: the transform
//! state and its reducer, viewport sizing, the colour filter chain, software
//! rendering, coordinate mapping between display, surface and image space,
//! and the destructive crop. Decoding and export adapt the `image` crate.
//!
//! The [`session::Session`] type ties these together for a front end.

pub mod bitmap;
pub mod color;
pub mod config;
pub mod crop;
pub mod decode;
pub mod encode;
pub mod mapper;
pub mod render;
pub mod session;
pub mod transform;
pub mod viewport;

pub use bitmap::{Bitmap, PixelRect};
pub use color::ColorFilter;
pub use config::ViewerConfig;
pub use crop::{CropEngine, CropPhase, SelectionRect};
pub use decode::{DecodeError, ImageDecoder, StandardDecoder};
pub use encode::{EncodeError, ExportFormat};
pub use mapper::{CoordinateMapper, DisplayRect, Point, RectF};
pub use render::{InterpolationFilter, PixelSurface, Surface};
pub use session::{LoadOutcome, LoadTicket, Session, SessionError};
pub use transform::{reduce, Action, ColorParam, Quadrant, TransformState};
pub use viewport::{
    checked_surface_size, fit_scale, surface_size, ViewportError, ViewportExtent, MAX_SURFACE_AREA,
    MAX_SURFACE_DIM,
};
