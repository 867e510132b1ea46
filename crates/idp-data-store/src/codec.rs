//! Section codecs backed by a [`StateStore`].

use crate::collection::Collection;
use crate::error::StoreError;
use crate::traits::StateStore;
use idp_data_core::{ExportError, ImportError, SectionCodec};
use idp_data_stream::{TokenKind, TokenReader, TokenWriter};
use std::sync::Arc;
use tracing::debug;

/// Codec that moves whole collections between a data section and a store.
///
/// A data section is an object mapping collection names to arrays of entity
/// objects. Entities are passed through unchanged; their schema belongs to
/// the persistence layer. Members that name no collection known to this
/// version are skipped.
pub struct StoreCodec {
    version: &'static str,
    collections: &'static [Collection],
    exports: bool,
    store: Arc<dyn StateStore>,
}

impl StoreCodec {
    /// Creates an import-only codec.
    pub fn new(
        version: &'static str,
        collections: &'static [Collection],
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            version,
            collections,
            exports: false,
            store,
        }
    }

    /// Enables export for this codec.
    pub fn exporting(mut self) -> Self {
        self.exports = true;
        self
    }

    fn collection(&self, name: &str) -> Option<Collection> {
        Collection::parse(name).filter(|c| self.collections.contains(c))
    }

    fn import_collection(
        &self,
        collection: Collection,
        reader: &mut TokenReader<'_>,
    ) -> Result<(), ImportError> {
        match reader.peek()? {
            TokenKind::BeginArray | TokenKind::EndDocument => reader.begin_array()?,
            kind => {
                return Err(ImportError::InvalidContent(format!(
                    "{collection} must be an array, found {kind}"
                )))
            }
        }
        let mut count = 0usize;
        while reader.has_next()? {
            let kind = reader.peek()?;
            if kind != TokenKind::BeginObject {
                return Err(ImportError::InvalidContent(format!(
                    "{collection} entries must be objects, found {kind}"
                )));
            }
            let entity = reader.read_value()?;
            self.store
                .insert(collection, entity)
                .map_err(|e| ImportError::Persistence(e.to_string()))?;
            count += 1;
        }
        reader.end_array()?;
        debug!(version = self.version, %collection, count, "imported collection");
        Ok(())
    }
}

impl SectionCodec for StoreCodec {
    fn version(&self) -> &str {
        self.version
    }

    fn import_section(&self, reader: &mut TokenReader<'_>) -> Result<(), ImportError> {
        match reader.peek()? {
            TokenKind::BeginObject | TokenKind::EndDocument => reader.begin_object()?,
            kind => {
                return Err(ImportError::InvalidContent(format!(
                    "section {} must be an object, found {kind}",
                    self.version
                )))
            }
        }
        while reader.has_next()? {
            let name = reader.next_name()?;
            match self.collection(&name) {
                Some(collection) => self.import_collection(collection, reader)?,
                None => {
                    reader.skip_value()?;
                    debug!(version = self.version, member = %name, "skipped unrecognized member");
                }
            }
        }
        reader.end_object()?;
        Ok(())
    }

    fn export_section(&self, writer: &mut TokenWriter<'_>) -> Result<(), ExportError> {
        if !self.exports {
            return Err(ExportError::Unsupported {
                version: self.version.to_string(),
            });
        }

        writer.name(self.version)?;
        writer.begin_object()?;
        for &collection in self.collections {
            writer.name(collection.as_str())?;
            writer.begin_array()?;
            self.store
                .visit(collection, &mut |entity| {
                    writer.json_value(entity)?;
                    Ok(())
                })
                .map_err(|e| match e {
                    StoreError::Stream(e) => ExportError::Stream(e),
                    other => ExportError::Persistence(other.to_string()),
                })?;
            writer.end_array()?;
            debug!(
                version = self.version,
                %collection,
                count = self.store.len(collection),
                "exported collection"
            );
        }
        writer.end_object()?;
        Ok(())
    }
}
