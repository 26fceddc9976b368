//! # csgraph
//!
//! Graphic scores for Csound-style instruments.
//!
//! This library provides:
//! - A block-structured DSL that declares, per instrument number, the
//!   features to draw for each score event
//! - An expression model over p-fields, constants and named converters
//! - An ordered definitions container with document framing
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`dsl`] - Lexer, parser and AST for the score definition language
//! - [`converters`] - Converter vocabulary handed to the parser
//! - [`definitions`] - Parse result, header/trailer framing, canonical output
//! - [`error`] - Unified error type
//!
//! Expressions are never evaluated here. Substituting p-field values and
//! applying converter formulas is the job of the renderer that consumes
//! [`Definitions`].
//!
//! ## Usage
//!
//! ### Library
//!
//! ```
//! let defs = csgraph::parse("instr 1, 2 do\n  line p2, p2+p3, cpspch(p5), cpspch(p5)\nend\n")?;
//! assert_eq!(defs.keys().collect::<Vec<_>>(), vec!["1", "2"]);
//!
//! let mut out = Vec::new();
//! defs.header(&mut out)?;
//! defs.trailer(&mut out)?;
//! # Ok::<(), csgraph::CsgError>(())
//! ```
//!
//! ### Native CLI
//!
//! ```bash
//! csgraph score.csg --frame > score.svg
//! ```
//!
//! ### WASM
//!
//! ```javascript
//! import { WasmDefinitions } from 'csgraph';
//!
//! const defs = new WasmDefinitions(source);
//! console.log(defs.keys());
//! ```

pub mod converters;
pub mod definitions;
pub mod dsl;
pub mod error;

// Re-export main types for convenience
pub use converters::{Converter, ConverterSet, UnknownConverterPolicy};
pub use definitions::{Definitions, FrameConfig};
pub use dsl::{parse, parse_with_config, ParserConfig};
pub use error::{CsgError, Result};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmDefinitions;
