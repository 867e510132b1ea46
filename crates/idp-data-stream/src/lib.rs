//! Incremental JSON token streams for server state transfer.
//!
//! This crate provides:
//! - A pull-style [`TokenReader`] that walks one JSON document token by token
//!   over any [`std::io::Read`], without buffering the document
//! - A push-style [`TokenWriter`] that emits tokens to any [`std::io::Write`]
//!   in call order, with optional indentation
//! - Value skipping, so unknown regions can be discarded while keeping the
//!   stream framed for whatever follows
//!
//! ## Quick Start
//!
//! ```rust
//! use idp_data_stream::{TokenKind, TokenReader, TokenWriter};
//!
//! let mut out = Vec::new();
//! let mut writer = TokenWriter::new(&mut out);
//! writer.set_indent("  ");
//! writer.begin_object()?;
//! writer.name("mitreid-connect-1.2")?;
//! writer.begin_object()?;
//! writer.end_object()?;
//! writer.end_object()?;
//! writer.close()?;
//! drop(writer);
//!
//! let mut reader = TokenReader::new(out.as_slice());
//! reader.begin_object()?;
//! while reader.peek()? == TokenKind::Name {
//!     let name = reader.next_name()?;
//!     println!("section: {name}");
//!     reader.skip_value()?;
//! }
//! reader.end_object()?;
//! reader.end_document()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Key Types
//!
//! - [`TokenReader`] - Read tokens from a byte source
//! - [`TokenWriter`] - Write tokens to a byte sink
//! - [`TokenKind`] - Tag returned by [`TokenReader::peek`]
//! - [`StreamError`] - Malformed input, invalid writer state, closed streams

#![deny(missing_docs)]

/// Error types for token stream operations.
pub mod errors;
/// Token stream reader implementation.
pub mod reader;
/// Token kinds, scalars and shared scope tracking.
pub mod token;
/// Token stream writer implementation.
pub mod writer;

pub use errors::StreamError;
pub use reader::TokenReader;
pub use token::{Scalar, TokenKind, MAX_NESTING_DEPTH};
pub use writer::TokenWriter;
