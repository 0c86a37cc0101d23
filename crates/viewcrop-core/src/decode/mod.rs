//! Image decoding.
//!
//! Turns file bytes into a [`Bitmap`]. The session never calls a decoder
//! directly: the caller decodes (possibly off the UI thread) and hands the
//! result back together with the load ticket it was issued.

mod standard;
mod types;

pub use standard::{decode_image, decode_image_no_orientation, get_orientation, StandardDecoder};
pub use types::{DecodeError, Orientation};

use crate::bitmap::Bitmap;

/// Something that can turn encoded bytes into a bitmap.
pub trait ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Bitmap, DecodeError>;
}
