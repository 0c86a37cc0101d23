//! Image encoding WASM bindings.
//!
//! # Example
//!
//! ```typescript
//! import { encode_png, encode_jpeg } from '@viewcrop/wasm';
//!
//! const png = encode_png(image);
//! const jpeg = encode_jpeg(image, 90);
//! ```

use crate::types::{size_mismatch, JsBitmap};
use viewcrop_core::encode::{self, ExportFormat};
use wasm_bindgen::prelude::*;

/// Encode a bitmap to PNG bytes.
#[wasm_bindgen]
pub fn encode_png(image: &JsBitmap) -> Result<Vec<u8>, JsValue> {
    encode_as(image, ExportFormat::Png, 100)
}

/// Encode a bitmap to JPEG bytes. Alpha is flattened onto white.
///
/// `quality` is 1-100; out-of-range values are clamped.
#[wasm_bindgen]
pub fn encode_jpeg(image: &JsBitmap, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode_as(image, ExportFormat::Jpeg, quality)
}

fn encode_as(image: &JsBitmap, format: ExportFormat, quality: u8) -> Result<Vec<u8>, JsValue> {
    let bitmap = image
        .to_bitmap()
        .ok_or_else(|| JsValue::from_str(&size_mismatch(image)))?;
    encode::encode(&bitmap, format, quality).map_err(|e| JsValue::from_str(&e.to_string()))
}
