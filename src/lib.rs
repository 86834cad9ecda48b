pub mod codec;
mod document;
pub mod error;
pub mod gpx_types;
pub mod options;
pub mod time;
pub mod xml;

use wasm_bindgen::prelude::*;

pub use crate::codec::GpxElement;
pub use crate::error::GpxError;
pub use crate::gpx_types::{
    Document, GpxFeature, Route, RoutePoint, Segment, Track, TrackPoint, Waypoint,
};
pub use crate::options::WriteOptions;

/// Parse a GPX string, returned as a JS object.
#[wasm_bindgen(js_name = parseGpx)]
pub fn parse_gpx(gpx_string: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let document: Document = gpx_string.parse()?;
    serde_wasm_bindgen::to_value(&document).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse a GPX string, returned as a JSON string.
#[wasm_bindgen(js_name = parseGpxToJsonString)]
pub fn parse_gpx_to_json_string(gpx_string: &str) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let document: Document = gpx_string.parse()?;
    serde_json::to_string(&document).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Render a document object (as produced by `parseGpx`) back to GPX text.
#[wasm_bindgen(js_name = writeGpx)]
pub fn write_gpx(document: JsValue, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let document: Document =
        serde_wasm_bindgen::from_value(document).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(document.to_text_with(&opts))
}

fn parse_options(options: JsValue) -> Result<WriteOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(WriteOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
