//! Export composer: metadata envelope around the current version's data.

use crate::errors::TransferError;
use crate::registry::VersionRegistry;
use chrono::{DateTime, Utc};
use idp_data_stream::TokenWriter;
use std::io::Write;
use std::sync::Arc;
use tracing::{error, info};

/// Envelope field holding the export timestamp.
pub const EXPORTED_AT: &str = "exported-at";
/// Envelope field holding the issuer the data was exported from.
pub const EXPORTED_FROM: &str = "exported-from";
/// Envelope field holding the principal that ran the export.
pub const EXPORTED_BY: &str = "exported-by";

/// `chrono` pattern for [`EXPORTED_AT`], e.g. `2015-06-01T12:00:00+0000`.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Source of the current time for the export envelope.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Formats an instant for the [`EXPORTED_AT`] field.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(EXPORT_TIMESTAMP_FORMAT).to_string()
}

/// Result of a best-effort export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The whole document was written and the writer closed.
    Completed,
    /// Writing stopped partway; the sink holds an incomplete document.
    Aborted {
        /// Description of the failure.
        reason: String,
    },
}

impl ExportOutcome {
    /// Returns true if the export completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, ExportOutcome::Completed)
    }
}

/// Writes export documents: envelope fields first, then the data section of
/// the registry's current version.
///
/// # Example
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use idp_data_core::{
///     ExportComposer, ExportError, FixedClock, ImportError, SectionCodec, VersionRegistry,
/// };
/// use idp_data_stream::{TokenReader, TokenWriter};
/// use std::sync::Arc;
///
/// struct Empty;
///
/// impl SectionCodec for Empty {
///     fn version(&self) -> &str {
///         "mitreid-connect-1.2"
///     }
///
///     fn import_section(&self, reader: &mut TokenReader<'_>) -> Result<(), ImportError> {
///         Ok(reader.skip_value()?)
///     }
///
///     fn export_section(&self, writer: &mut TokenWriter<'_>) -> Result<(), ExportError> {
///         writer.name(self.version())?;
///         writer.begin_object()?;
///         writer.end_object()?;
///         Ok(())
///     }
/// }
///
/// let registry = VersionRegistry::builder()
///     .register(Arc::new(Empty))
///     .current("mitreid-connect-1.2")
///     .build()?;
/// let clock = FixedClock(Utc.with_ymd_and_hms(2015, 6, 1, 12, 0, 0).unwrap());
/// let composer = ExportComposer::new(Arc::new(registry), "https://idp.test/")
///     .with_clock(Arc::new(clock))
///     .with_indent("");
///
/// let mut out = Vec::new();
/// assert!(composer.export(&mut out, "alice").is_completed());
/// assert_eq!(
///     String::from_utf8(out)?,
///     r#"{"exported-at":"2015-06-01T12:00:00+0000","exported-from":"https://idp.test/","exported-by":"alice","mitreid-connect-1.2":{}}"#
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ExportComposer {
    registry: Arc<VersionRegistry>,
    issuer: String,
    clock: Arc<dyn Clock>,
    indent: String,
}

impl ExportComposer {
    /// Default indentation of exported documents.
    pub const DEFAULT_INDENT: &'static str = "  ";

    /// Creates a composer for `issuer` using the wall clock.
    pub fn new(registry: Arc<VersionRegistry>, issuer: impl Into<String>) -> Self {
        Self {
            registry,
            issuer: issuer.into(),
            clock: Arc::new(SystemClock),
            indent: Self::DEFAULT_INDENT.to_string(),
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the indentation; an empty string produces compact output.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Returns the issuer written to [`EXPORTED_FROM`].
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Writes a complete document to `writer` and closes it.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] if the writer fails or the current exporter
    /// fails. The sink then holds a partial document.
    pub fn compose(&self, writer: &mut TokenWriter<'_>, principal: &str) -> Result<(), TransferError> {
        writer.begin_object()?;

        writer.name(EXPORTED_AT)?;
        writer.value(format_timestamp(self.clock.now()))?;

        writer.name(EXPORTED_FROM)?;
        writer.value(self.issuer.as_str())?;

        writer.name(EXPORTED_BY)?;
        writer.value(principal)?;

        self.registry.exporter().export_section(writer)?;

        writer.end_object()?;
        writer.close()?;
        Ok(())
    }

    /// Writes a complete document to `sink`, best effort.
    ///
    /// Failures are logged and reported as [`ExportOutcome::Aborted`]; they
    /// are never returned as errors, because the sink has already received
    /// part of the document.
    pub fn export<W: Write>(&self, sink: W, principal: &str) -> ExportOutcome {
        let version = self.registry.current_version();
        let mut writer = TokenWriter::new(sink);
        writer.set_indent(&self.indent);

        match self.compose(&mut writer, principal) {
            Ok(()) => {
                info!(version, principal, "export completed");
                ExportOutcome::Completed
            }
            Err(e) => {
                error!(version, principal, error = %e, "export aborted; output is incomplete");
                ExportOutcome::Aborted {
                    reason: e.to_string(),
                }
            }
        }
    }
}
