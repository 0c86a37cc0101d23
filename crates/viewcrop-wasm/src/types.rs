//! WASM-compatible wrapper types for image data.

use viewcrop_core::bitmap::Bitmap;
use wasm_bindgen::prelude::*;

/// An RGBA bitmap wrapper for JavaScript.
///
/// The pixel layout matches `ImageData`, so `pixels()` can be handed straight
/// to `new ImageData(new Uint8ClampedArray(pixels), width, height)`.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsBitmap {
    /// Create a bitmap from dimensions and RGBA pixel data (4 bytes per pixel).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsBitmap {
        JsBitmap {
            width,
            height,
            pixels,
        }
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGBA pixel data as Uint8Array (copied).
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsBitmap {
    pub(crate) fn from_bitmap(bitmap: Bitmap) -> Self {
        Self {
            width: bitmap.width,
            height: bitmap.height,
            pixels: bitmap.pixels,
        }
    }

    /// Convert to a core bitmap, or `None` if the buffer length does not
    /// match the dimensions.
    pub(crate) fn to_bitmap(&self) -> Option<Bitmap> {
        if Bitmap::buffer_len(self.width, self.height) != Some(self.pixels.len()) {
            return None;
        }
        Some(Bitmap::new(self.width, self.height, self.pixels.clone()))
    }
}

/// Error message for a pixel buffer that does not match its dimensions.
pub(crate) fn size_mismatch(image: &JsBitmap) -> String {
    format!(
        "Pixel buffer of {} bytes does not match {}x{} RGBA",
        image.pixels.len(),
        image.width,
        image.height
    )
}
