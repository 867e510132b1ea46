//! Per-version section codec capability.

use crate::errors::{ExportError, ImportError};
use idp_data_stream::{TokenReader, TokenWriter};

/// Reads and writes the data section for one data format version.
///
/// Implementations are registered in a
/// [`VersionRegistry`](crate::VersionRegistry) under the identifier returned
/// by [`version`](Self::version). Codecs are shared across concurrent calls,
/// so any state they hold must be synchronized.
pub trait SectionCodec: Send + Sync {
    /// Version identifier this codec is bound to.
    fn version(&self) -> &str;

    /// Consumes exactly one JSON value (the section's value) from `reader`
    /// and applies it to persisted state.
    ///
    /// The reader is positioned immediately after the section name. On
    /// success the cursor must sit immediately after the value.
    fn import_section(&self, reader: &mut TokenReader<'_>) -> Result<(), ImportError>;

    /// Writes one or more complete name/value pairs into the open root object.
    ///
    /// Implementations must not close the root object. Codecs that only
    /// support import keep the default, which reports
    /// [`ExportError::Unsupported`].
    fn export_section(&self, writer: &mut TokenWriter<'_>) -> Result<(), ExportError> {
        let _ = writer;
        Err(ExportError::Unsupported {
            version: self.version().to_string(),
        })
    }
}
