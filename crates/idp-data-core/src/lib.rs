//! Streaming import and export of an identity server's persisted state.
//!
//! This crate provides:
//! - [`SectionCodec`], the per-version capability that reads and writes one
//!   data section
//! - [`VersionRegistry`], the immutable identifier-to-codec mapping with a
//!   single current exporter
//! - The import dispatcher ([`import_document`], [`DataImporter`]), which
//!   routes top-level sections to codecs and skips unknown ones
//! - The export composer ([`ExportComposer`]), which writes the metadata
//!   envelope and delegates the data section to the current codec
//!
//! Core invariants:
//! - A document is a single top-level JSON object, processed token by token
//! - Unknown top-level members are skipped, never fatal
//! - Malformed or truncated input aborts the import; nothing is rolled back
//! - Export envelope fields always precede the data section
//!
#![deny(missing_docs)]

/// Per-version section codec trait.
pub mod codec;
/// Error types for registry, import and export operations.
pub mod errors;
/// Export composer and envelope fields.
pub mod export;
/// Import dispatcher and section inspection.
pub mod import;
/// Version registry.
pub mod registry;
/// Supported version identifiers.
pub mod versions;

pub use codec::SectionCodec;
pub use errors::{ExportError, ImportError, RegistryError, TransferError};
pub use export::{
    format_timestamp, Clock, ExportComposer, ExportOutcome, FixedClock, SystemClock,
    EXPORTED_AT, EXPORTED_BY, EXPORTED_FROM, EXPORT_TIMESTAMP_FORMAT,
};
pub use import::{
    import_document, inspect_document, walk_sections, DataImporter, ImportReport, SectionSummary,
};
pub use registry::{RegistryBuilder, VersionRegistry};
pub use versions::{MITREID_CONNECT_1_0, MITREID_CONNECT_1_1, MITREID_CONNECT_1_2, SUPPORTED_VERSIONS};
