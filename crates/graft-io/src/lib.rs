//! graft-io: reading, validating and writing glTF 2.0 assets.
//!
//! This crate is the codec around the `graft-core` asset graph. It reads
//! glTF JSON documents and GLB binary containers, validates completed assets
//! against the specification's cross-referential rules, and serializes
//! assets back to JSON and/or GLB.
//!
//! # Quick Start
//!
//! ```ignore
//! use graft_core::Categories;
//! use graft_io::{GltfParser, GltfExporter, Extensions, ParseOptions, ExportOptions};
//!
//! // Read (auto-detects JSON vs GLB).
//! let mut parser = GltfParser::new(Extensions::KHR_MATERIALS_IOR);
//! let asset = parser.parse(&bytes, Some(base_dir), ParseOptions::empty(), Categories::ALL)?;
//!
//! // Validate independently of parsing.
//! graft_io::validate(&asset)?;
//!
//! // Write back out.
//! let mut exporter = GltfExporter::new();
//! let glb = exporter.export_glb(&asset, ExportOptions::empty())?;
//! ```
//!
//! # Architecture
//!
//! ```text
//! bytes ──> glb (container) ──> serde_json (tokenizer) ──> parse ──> Asset
//!                                                                     │
//!                                              validate <─────────────┤
//!                                                                     │
//! bytes <── glb (container) <── export <──────────────────────────────┘
//! ```
//!
//! Key dispatch throughout the parser goes through [`hash`], a CRC-32C
//! hasher that picks a hardware implementation once per process. Buffer and
//! image locators go through [`uri::Uri`].

pub mod error;
pub mod export;
pub mod glb;
pub mod hash;
pub mod options;
pub mod parse;
pub mod uri;
pub mod validate;

pub use error::{GltfError, Result};
pub use export::{pretty_print_json, Exported, GltfExporter};
pub use options::{
    extension_flag, Base64Decoder, BufferMapper, ExportOptions, Extensions, ExtrasParseHook,
    ExtrasWriteHook, MappedBuffer, ParseOptions, SUPPORTED_EXTENSIONS,
};
pub use parse::{expand_categories, GltfParser};
pub use uri::Uri;
pub use validate::validate;
