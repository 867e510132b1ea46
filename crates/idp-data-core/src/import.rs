//! Import dispatcher: routes top-level sections to versioned codecs.

use crate::errors::TransferError;
use crate::registry::VersionRegistry;
use idp_data_stream::{StreamError, TokenKind, TokenReader};
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a successful import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Recognized section names, in document order, one entry per importer call.
    pub imported: Vec<String>,
    /// Unrecognized section names that were skipped, in document order.
    pub skipped: Vec<String>,
}

/// Summary of one top-level section, produced by [`inspect_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSummary {
    /// Member name.
    pub name: String,
    /// Whether a codec is registered for the name.
    pub recognized: bool,
    /// Kind of the section's value.
    pub kind: TokenKind,
}

/// Walks the members of the document's top-level object.
///
/// `visit` is called with each member name while the reader is positioned
/// on the member's value; it must consume exactly that value. Fails with
/// [`StreamError::Malformed`] if the input ends before the closing `}` or
/// if anything follows the top-level object.
pub fn walk_sections<F>(reader: &mut TokenReader<'_>, mut visit: F) -> Result<(), TransferError>
where
    F: FnMut(String, &mut TokenReader<'_>) -> Result<(), TransferError>,
{
    reader.begin_object()?;
    loop {
        match reader.peek()? {
            TokenKind::Name => {
                let name = reader.next_name()?;
                visit(name, reader)?;
            }
            TokenKind::EndObject => {
                reader.end_object()?;
                break;
            }
            TokenKind::EndDocument => {
                return Err(StreamError::Malformed {
                    offset: reader.position(),
                    reason: "document ended before its closing '}'".to_string(),
                }
                .into());
            }
            kind => {
                return Err(StreamError::Malformed {
                    offset: reader.position(),
                    reason: format!("expected a section name but found {kind}"),
                }
                .into());
            }
        }
    }
    reader.end_document()?;
    Ok(())
}

/// Imports a whole document.
///
/// Every recognized section is handed to its codec; every other member
/// (including the export envelope fields) is skipped and recorded in
/// [`ImportReport::skipped`]. Sections may appear in any order and a
/// repeated section name triggers one codec call per occurrence.
///
/// Nothing is rolled back on failure: sections imported before the error
/// stay applied.
///
/// # Errors
///
/// - [`TransferError::Stream`] if the document is malformed or truncated
/// - [`TransferError::Import`] if a codec rejects its section
pub fn import_document(
    registry: &VersionRegistry,
    reader: &mut TokenReader<'_>,
) -> Result<ImportReport, TransferError> {
    let mut report = ImportReport::default();

    walk_sections(reader, |name, reader| {
        match registry.importer(&name) {
            Some(codec) => {
                debug!(section = %name, offset = reader.position(), "importing section");
                codec
                    .import_section(reader)
                    .map_err(|source| TransferError::Import {
                        section: name.clone(),
                        source,
                    })?;
                info!(section = %name, "imported section");
                report.imported.push(name);
            }
            None => {
                reader.skip_value()?;
                debug!(section = %name, "skipped unrecognized section");
                report.skipped.push(name);
            }
        }
        Ok(())
    })?;

    Ok(report)
}

/// Lists the top-level sections of a document without applying anything.
pub fn inspect_document(
    registry: &VersionRegistry,
    reader: &mut TokenReader<'_>,
) -> Result<Vec<SectionSummary>, TransferError> {
    let mut sections = Vec::new();
    walk_sections(reader, |name, reader| {
        let kind = reader.peek()?;
        reader.skip_value()?;
        sections.push(SectionSummary {
            recognized: registry.contains(&name),
            name,
            kind,
        });
        Ok(())
    })?;
    Ok(sections)
}

/// Entry point for imports from a byte source.
///
/// # Example
///
/// ```rust
/// use idp_data_core::{DataImporter, ImportError, SectionCodec, VersionRegistry};
/// use idp_data_stream::TokenReader;
/// use std::sync::Arc;
///
/// struct Discard;
///
/// impl SectionCodec for Discard {
///     fn version(&self) -> &str {
///         "mitreid-connect-1.2"
///     }
///
///     fn import_section(&self, reader: &mut TokenReader<'_>) -> Result<(), ImportError> {
///         Ok(reader.skip_value()?)
///     }
/// }
///
/// let registry = VersionRegistry::builder()
///     .register(Arc::new(Discard))
///     .current("mitreid-connect-1.2")
///     .build()?;
/// let importer = DataImporter::new(Arc::new(registry));
///
/// let report = importer.import(r#"{"exported-by": "admin", "mitreid-connect-1.2": {}}"#.as_bytes())?;
/// assert_eq!(report.imported, vec!["mitreid-connect-1.2"]);
/// assert_eq!(report.skipped, vec!["exported-by"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct DataImporter {
    registry: Arc<VersionRegistry>,
}

impl DataImporter {
    /// Creates an importer over a shared registry.
    pub fn new(registry: Arc<VersionRegistry>) -> Self {
        Self { registry }
    }

    /// Imports one document read from `source`.
    pub fn import<R: Read>(&self, source: R) -> Result<ImportReport, TransferError> {
        let mut reader = TokenReader::new(source);
        let report = import_document(&self.registry, &mut reader)?;
        info!(
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            "import completed"
        );
        Ok(report)
    }

    /// Lists the sections of one document read from `source`.
    pub fn inspect<R: Read>(&self, source: R) -> Result<Vec<SectionSummary>, TransferError> {
        let mut reader = TokenReader::new(source);
        inspect_document(&self.registry, &mut reader)
    }
}
