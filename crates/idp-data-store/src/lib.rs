//! Reference persisted state for idp-data.
//!
//! This crate provides:
//! - [`Collection`], the entity collections of the server state
//! - [`StateStore`], the storage seam used by the section codecs
//! - [`MemoryStore`], an in-memory store with JSON snapshot files
//! - [`StoreCodec`] and [`default_registry`], binding every supported
//!   version identifier to a codec over one store
//!
#![deny(missing_docs)]

/// Entity collections.
pub mod collection;
/// Store-backed section codecs.
pub mod codec;
/// Error types.
pub mod error;
/// In-memory store implementation.
pub mod memory;
/// Default registry wiring.
pub mod registry;
/// Storage backend traits.
pub mod traits;

/// A single persisted entity, kept as the JSON object it was read from.
pub type EntityJson = serde_json::Value;

pub use codec::StoreCodec;
pub use collection::Collection;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use registry::default_registry;
pub use traits::StateStore;
