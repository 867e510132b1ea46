use idp_data_stream::StreamError;
use thiserror::Error;

/// Errors raised by a section codec while importing a section.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The section's tokens could not be read.
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// The section is well-formed JSON but invalid for its version.
    #[error("invalid section content: {0}")]
    InvalidContent(String),
    /// The persistence layer rejected the imported data.
    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Errors raised by a section codec while exporting.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The output stream failed or was closed.
    #[error(transparent)]
    Stream(#[from] StreamError),
    /// The codec can only import; it has no exporter role.
    #[error("version {version} does not support export")]
    Unsupported {
        /// Version identifier of the codec.
        version: String,
    },
    /// The persistence layer could not produce the data to export.
    #[error("persistence error: {0}")]
    Persistence(String),
}

/// Configuration errors detected while building a version registry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Two codecs claim the same version identifier.
    #[error("version identifier '{0}' is registered more than once")]
    DuplicateVersion(String),
    /// No current exporter was designated.
    #[error("no current export version designated")]
    MissingCurrent,
    /// The designated current exporter is not a registered version.
    #[error("current export version '{0}' is not registered")]
    UnknownCurrent(String),
}

/// Errors surfaced by an import or export call.
#[derive(Error, Debug)]
pub enum TransferError {
    /// The document is not well-formed (including truncated input), or the
    /// output stream failed.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),
    /// A recognized section failed to import; the remaining document was not processed.
    #[error("import of section '{section}' failed: {source}")]
    Import {
        /// Section name that failed.
        section: String,
        /// Codec error.
        source: ImportError,
    },
    /// The current exporter failed.
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
}

impl TransferError {
    /// Returns true if the error was caused by malformed input.
    pub fn is_malformed(&self) -> bool {
        match self {
            TransferError::Stream(e) => e.is_malformed(),
            TransferError::Import {
                source: ImportError::Stream(e),
                ..
            } => e.is_malformed(),
            _ => false,
        }
    }
}
