//! Viewcrop WASM - WebAssembly bindings for Viewcrop
//!
//! This crate exposes the viewcrop-core viewer session, decoding and export
//! to JavaScript/TypeScript front ends.
//!
//! # Module Structure
//!
//! - `session` - Interactive viewer session (transform, render, pointer input, crop)
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding bindings
//! - `encode` - Image encoding bindings (PNG and JPEG export)
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsViewerSession } from '@viewcrop/wasm';
//!
//! await init();
//! const session = new JsViewerSession(undefined);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod encode;
mod session;
mod types;

// Re-export public types
pub use decode::{decode_image, get_orientation};
pub use encode::{encode_jpeg, encode_png};
pub use session::{JsLoadTicket, JsViewerSession};
pub use types::JsBitmap;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::log_1(&JsValue::from_str(&format!(
        "viewcrop-wasm {} ready",
        version()
    )));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
