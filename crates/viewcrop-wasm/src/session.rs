//! Viewer session WASM bindings.
//!
//! The front end owns the canvas and the file input. It forwards user
//! actions and pointer events here, then paints `surface_pixels()` into the
//! canvas whenever `render_if_dirty()` reports a repaint.
//!
//! # Example
//!
//! ```typescript
//! import { JsViewerSession } from '@viewcrop/wasm';
//!
//! const session = new JsViewerSession({ container_width: 600, container_height: 400 });
//! const ticket = session.begin_load();
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! session.complete_load(ticket, bytes);
//!
//! if (session.render_if_dirty()) {
//!   canvas.width = session.surface_width;
//!   canvas.height = session.surface_height;
//!   ctx.putImageData(new ImageData(
//!     session.surface_image_data(),
//!     session.surface_width,
//!     session.surface_height,
//!   ), 0, 0);
//! }
//! ```

use crate::types::{size_mismatch, JsBitmap};
use viewcrop_core::bitmap::Bitmap;
use viewcrop_core::color::ColorFilter;
use viewcrop_core::decode::{DecodeError, ImageDecoder, StandardDecoder};
use viewcrop_core::encode::ExportFormat;
use viewcrop_core::mapper::{DisplayRect, Point};
use viewcrop_core::render::Surface;
use viewcrop_core::session::{LoadOutcome, LoadTicket, Session, SessionError};
use viewcrop_core::transform::{Action, ColorParam};
use viewcrop_core::ViewerConfig;
use wasm_bindgen::prelude::*;

fn to_js_error(e: SessionError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse an export format name. Accepts `png`, `jpeg` and `jpg`.
pub(crate) fn parse_format(name: &str) -> Option<ExportFormat> {
    match name.to_ascii_lowercase().as_str() {
        "png" => Some(ExportFormat::Png),
        "jpeg" | "jpg" => Some(ExportFormat::Jpeg),
        _ => None,
    }
}

/// Ticket identifying one upload. Pass it back to `complete_load`.
#[wasm_bindgen]
pub struct JsLoadTicket {
    inner: LoadTicket,
}

#[wasm_bindgen]
impl JsLoadTicket {
    /// Load generation, increasing with every `begin_load`.
    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> f64 {
        self.inner.generation() as f64
    }
}

/// An interactive viewer session for JavaScript.
#[wasm_bindgen]
pub struct JsViewerSession {
    inner: Session,
}

#[wasm_bindgen]
impl JsViewerSession {
    /// Create a session. `config` may be `undefined` or a partial
    /// `ViewerConfig` object; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsViewerSession, JsValue> {
        let config: ViewerConfig = if config.is_undefined() || config.is_null() {
            ViewerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self::with_config(config))
    }

    // --- loading ---

    /// Start an upload. Earlier tickets become stale.
    pub fn begin_load(&mut self) -> JsLoadTicket {
        JsLoadTicket {
            inner: self.inner.begin_load(),
        }
    }

    /// Decode `bytes` and install them if `ticket` is still current.
    ///
    /// Returns `true` if installed, `false` if the ticket was stale. A decode
    /// failure throws and keeps the previous image. Stale uploads are not
    /// decoded.
    pub fn complete_load(&mut self, ticket: &JsLoadTicket, bytes: &[u8]) -> Result<bool, JsValue> {
        if !self.inner.is_current(ticket.inner) {
            return Ok(false);
        }
        let decoded = StandardDecoder::new().decode(bytes);
        self.finish_load(ticket.inner, decoded)
    }

    /// Install an image decoded elsewhere (for example in a worker).
    ///
    /// A stale ticket returns `false` even when the buffer is malformed.
    pub fn complete_load_bitmap(
        &mut self,
        ticket: &JsLoadTicket,
        image: &JsBitmap,
    ) -> Result<bool, JsValue> {
        let bitmap = image
            .to_bitmap()
            .ok_or_else(|| DecodeError::CorruptedFile(size_mismatch(image)));
        self.finish_load(ticket.inner, bitmap)
    }

    // --- transform ---

    pub fn rotate(&mut self) -> bool {
        self.inner.dispatch(Action::Rotate)
    }

    pub fn flip_horizontal(&mut self) -> bool {
        self.inner.dispatch(Action::FlipHorizontal)
    }

    pub fn flip_vertical(&mut self) -> bool {
        self.inner.dispatch(Action::FlipVertical)
    }

    pub fn set_scale(&mut self, scale: f64) -> bool {
        self.inner.dispatch(Action::SetScale(scale))
    }

    pub fn zoom_in(&mut self) -> bool {
        self.inner.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.inner.zoom_out()
    }

    pub fn set_brightness(&mut self, value: f64) -> bool {
        self.inner.dispatch(Action::SetColor(ColorParam::Brightness, value))
    }

    pub fn set_saturation(&mut self, value: f64) -> bool {
        self.inner.dispatch(Action::SetColor(ColorParam::Saturation, value))
    }

    pub fn set_contrast(&mut self, value: f64) -> bool {
        self.inner.dispatch(Action::SetColor(ColorParam::Contrast, value))
    }

    pub fn set_hue(&mut self, value: f64) -> bool {
        self.inner.dispatch(Action::SetColor(ColorParam::Hue, value))
    }

    pub fn reset_geometry(&mut self) -> bool {
        self.inner.dispatch(Action::ResetGeometry)
    }

    pub fn reset_color(&mut self) -> bool {
        self.inner.dispatch(Action::ResetColor)
    }

    /// Current transform state as a plain object.
    pub fn state(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(self.inner.state())?)
    }

    /// CSS `filter` string equivalent to the colour adjustments, for hosts
    /// that draw with a hardware canvas.
    pub fn css_filter(&self) -> String {
        ColorFilter::to_css(&self.inner.state().color)
    }

    // --- rendering ---

    /// Repaint if needed. Returns `true` when the surface changed.
    pub fn render_if_dirty(&mut self) -> Result<bool, JsValue> {
        self.inner.render_if_dirty().map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn dirty(&self) -> bool {
        self.inner.is_dirty()
    }

    #[wasm_bindgen(getter)]
    pub fn surface_width(&self) -> u32 {
        self.inner.surface().pixel_size().0
    }

    #[wasm_bindgen(getter)]
    pub fn surface_height(&self) -> u32 {
        self.inner.surface().pixel_size().1
    }

    /// RGBA contents of the rendering surface (copied).
    pub fn surface_pixels(&self) -> Vec<u8> {
        self.inner.surface().bitmap().pixels.clone()
    }

    /// Surface contents as a `Uint8ClampedArray`, ready for `new ImageData`.
    pub fn surface_image_data(&self) -> js_sys::Uint8ClampedArray {
        js_sys::Uint8ClampedArray::from(self.inner.surface().bitmap().pixels.as_slice())
    }

    /// The working bitmap, if one is loaded.
    pub fn bitmap(&self) -> Option<JsBitmap> {
        self.inner.bitmap().cloned().map(JsBitmap::from_bitmap)
    }

    // --- pointer input ---
    //
    // `left`, `top`, `width`, `height` are the canvas bounding client rect.
    // After rotating or zooming, call `render_if_dirty` and repaint before
    // forwarding pointer events; until then they throw.

    pub fn pointer_down(
        &mut self,
        x: f64,
        y: f64,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Result<bool, JsValue> {
        self.inner
            .pointer_down(Point::new(x, y), DisplayRect::new(left, top, width, height))
            .map_err(to_js_error)
    }

    pub fn pointer_move(
        &mut self,
        x: f64,
        y: f64,
        left: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Result<bool, JsValue> {
        self.inner
            .pointer_move(Point::new(x, y), DisplayRect::new(left, top, width, height))
            .map_err(to_js_error)
    }

    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.inner.pointer_leave();
    }

    pub fn cancel_selection(&mut self) {
        self.inner.cancel_selection();
    }

    /// Crop to the current selection. Returns `false` when there is nothing
    /// to crop.
    pub fn commit_crop(&mut self) -> Result<bool, JsValue> {
        self.inner.commit_crop().map_err(to_js_error)
    }

    // --- export ---

    /// Encode the working bitmap as `"png"` or `"jpeg"`.
    pub fn export(&self, format: &str, bake_color: bool) -> Result<Vec<u8>, JsValue> {
        let format = parse_format(format)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown export format: {}", format)))?;
        self.inner.export(format, bake_color).map_err(to_js_error)
    }
}

impl JsViewerSession {
    pub(crate) fn with_config(config: ViewerConfig) -> Self {
        Self {
            inner: Session::new(config),
        }
    }

    fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Bitmap, DecodeError>,
    ) -> Result<bool, JsValue> {
        match self.inner.complete_load(ticket, result).map_err(to_js_error)? {
            LoadOutcome::Installed { .. } => Ok(true),
            LoadOutcome::Stale => Ok(false),
        }
    }
}
