//! WASM bindings for csgraph.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmDefinitions } from 'csgraph';
//!
//! await init();
//!
//! const defs = new WasmDefinitions(`
//!   instr 1, 2 do
//!     line p2, p2+p3, cpspch(p5), cpspch(p5)
//!   end
//! `);
//!
//! defs.keys();       // ["1", "2"]
//! defs.header() + body + defs.trailer();
//! ```

use wasm_bindgen::prelude::*;

use crate::definitions::Definitions;
use crate::dsl;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Parsed instrument definitions, exposed to JavaScript.
#[wasm_bindgen]
pub struct WasmDefinitions {
    defs: Definitions,
}

#[wasm_bindgen]
impl WasmDefinitions {
    /// Parse score definition source.
    ///
    /// # Returns
    /// The parsed definitions, or the syntax error message.
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str) -> Result<WasmDefinitions, JsValue> {
        let defs = dsl::parse(source).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmDefinitions { defs })
    }

    /// Instrument keys in declaration order.
    pub fn keys(&self) -> Vec<JsValue> {
        self.defs.keys().map(JsValue::from_str).collect()
    }

    /// Number of defined instruments.
    pub fn instrument_count(&self) -> usize {
        self.defs.len()
    }

    /// Number of features declared for an instrument, if it exists.
    pub fn feature_count(&self, key: &str) -> Option<usize> {
        self.defs.get(key).map(|instr| instr.features.len())
    }

    /// Document prologue.
    pub fn header(&self) -> Result<String, JsValue> {
        let mut out = Vec::new();
        self.defs
            .header(&mut out)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        String::from_utf8(out).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Document epilogue.
    pub fn trailer(&self) -> Result<String, JsValue> {
        let mut out = Vec::new();
        self.defs
            .trailer(&mut out)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        String::from_utf8(out).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Canonical source of the definitions.
    pub fn to_source(&self) -> String {
        self.defs.to_source()
    }
}
